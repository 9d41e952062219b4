//! PUYORS - A Rusty falling-pair puzzle
//!
//! Terminal shell over the `puyors` engine.

mod input;
mod ui;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use input::{Command, InputHandler};
use puyors::{Engine, GameSnapshot, Settings};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    path::PathBuf,
    time::{Duration, Instant},
};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the puyors temp directory, creating it if needed
fn puyors_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("puyors");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let puyors_dir = puyors_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&puyors_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "puyors=debug".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(filter)
        .with_ansi(false)
        .init();

    tracing::info!(
        "PUYORS starting up, session={:08x}, log={}",
        session_id,
        puyors_dir.join(&log_file).display()
    );

    let settings = Settings::load();
    let seed = settings.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, "Dealing pairs");
    let mut engine = Engine::new(settings.gameplay.clone(), seed);

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_game(&mut terminal, &mut engine, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    match GameSnapshot::capture(&engine).to_json() {
        Ok(json) => tracing::info!("Final state: {}", json),
        Err(e) => tracing::warn!("Could not serialize final state: {}", e),
    }

    let stats = engine.stats();
    println!("\nThanks for playing PUYORS!");
    println!("Final Score: {}", stats.points);
    println!(
        "Max Chain: {} | Popped: {} | Pairs: {}",
        stats.max_chain, stats.total_erased, stats.pairs_placed
    );
    println!("Seed: {}", seed);

    result
}

fn run_game(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    engine: &mut Engine,
    settings: &Settings,
) -> io::Result<()> {
    let mut input = InputHandler::from_settings(settings);
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(|frame| ui::render_game(frame, engine))?;

        if event::poll(FRAME_DURATION)? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => match input.key_down(key) {
                        Some(Command::Quit) => {
                            tracing::info!("Quit requested");
                            return Ok(());
                        }
                        Some(Command::Game(action)) => {
                            tracing::trace!(action = action.as_str(), "key");
                            engine.apply_action(action);
                        }
                        None => {}
                    },
                    KeyEventKind::Release => input.key_up(key),
                }
            }
        }

        for action in input.update() {
            engine.apply_action(action);
        }
        engine.set_soft_drop(input.soft_drop_held());

        let now = Instant::now();
        let delta_ms = now.duration_since(last_frame).as_millis().min(u32::MAX as u128) as u32;
        last_frame = now;
        engine.step(delta_ms);
    }
}
