//! Terminal UI rendering with ratatui

use puyors::{Cell, Color as PuyoColor, ColorSource, Engine, Grid, Pair, Pos, Score};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const EMPTY: &str = "  ";
const BLOCK: &str = "()";
const GHOST: &str = "::";

/// Width of the side panel holding the preview and stats
const SIDE_WIDTH: u16 = 16;
/// Rows used by the preview box: two cells per pair plus a gap, and borders
const PREVIEW_HEIGHT: u16 = 8;

/// Map a puyo color onto a terminal color
fn tui_color(color: PuyoColor) -> Color {
    match color {
        PuyoColor::Red => Color::Red,
        PuyoColor::Green => Color::Green,
        PuyoColor::Blue => Color::Blue,
        PuyoColor::Yellow => Color::Yellow,
        PuyoColor::Purple => Color::Magenta,
    }
}

pub fn render_game<S: ColorSource>(frame: &mut Frame, engine: &Engine<S>) {
    let area = frame.area();
    let grid = engine.grid();

    // Board is two characters per cell plus borders
    let board_width = grid.width() as u16 * 2 + 2;
    let board_height = grid.height() as u16 + 2;
    let game_area = center_rect(area, board_width + SIDE_WIDTH, board_height.max(PREVIEW_HEIGHT + 10));

    // Create main layout: board | next + stats
    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(board_width), Constraint::Length(SIDE_WIDTH)])
        .split(game_area);

    render_board(
        frame,
        main_layout[0],
        grid,
        engine.falling_pair(),
        engine.ghost_pair().as_ref(),
    );

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(PREVIEW_HEIGHT), Constraint::Min(6)])
        .split(main_layout[1]);

    render_preview(frame, right_layout[0], &engine.preview());
    render_stats(frame, right_layout[1], engine.stats(), engine.last_report().and_then(Score::describe));

    if engine.is_game_over() {
        render_overlay(frame, area, "GAME OVER", "R to restart, Q to quit");
    } else if engine.is_paused() {
        render_overlay(frame, area, "PAUSED", "Press P to resume");
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the upcoming pairs, satellite above axis as they spawn
fn render_preview(frame: &mut Frame, area: Rect, preview: &[(PuyoColor, PuyoColor)]) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = Vec::new();
    for (i, &(axis, satellite)) in preview.iter().enumerate() {
        if i > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::styled(BLOCK, Style::default().fg(tui_color(satellite))));
        lines.push(Line::styled(BLOCK, Style::default().fg(tui_color(axis))));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

fn render_board(frame: &mut Frame, area: Rect, grid: &Grid, falling: Option<&Pair>, ghost: Option<&Pair>) {
    let block = Block::default()
        .title(" PUYORS ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let color_at = |pair: Option<&Pair>, pos: Pos| {
        pair.and_then(|p| p.cells().into_iter().find(|&(at, _)| at == pos).map(|(_, color)| color))
    };

    let mut lines: Vec<Line> = Vec::with_capacity(grid.height());
    for y in 0..grid.height() as i32 {
        let mut spans = Vec::with_capacity(grid.width());
        for x in 0..grid.width() as i32 {
            let pos = Pos::new(x, y);
            let (text, style) = if let Some(color) = color_at(falling, pos) {
                (BLOCK, Style::default().fg(tui_color(color)).bold())
            } else if let Some(Cell::Filled(color)) = grid.get(pos) {
                (BLOCK, Style::default().fg(tui_color(color)))
            } else if let Some(color) = color_at(ghost, pos) {
                (GHOST, Style::default().fg(tui_color(color)).dim())
            } else {
                (EMPTY, Style::default())
            };
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render stats panel
fn render_stats(frame: &mut Frame, area: Rect, score: &Score, message: Option<String>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let mut lines = vec![
        label("SCORE"),
        Line::styled(score.points.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        label("CHAIN"),
        Line::styled(
            format!("{} (max {})", score.last_chain, score.max_chain),
            Style::default().fg(Color::Cyan),
        ),
        Line::raw(""),
        label("POPPED"),
        Line::styled(score.total_erased.to_string(), Style::default().fg(Color::Green)),
    ];

    if let Some(message) = message {
        lines.push(Line::raw(""));
        lines.push(Line::styled(message, Style::default().fg(Color::Magenta).bold()));
    }

    let paragraph = Paragraph::new(lines);
    frame.render_widget(paragraph, inner);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 26u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
