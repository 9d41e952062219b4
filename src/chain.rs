//! Chain resolution: pop, settle, repeat until the grid is stable

use crate::color::{Cell, Color};
use crate::connectivity::{ERASE_THRESHOLD, find_groups};
use crate::gravity::settle;
use crate::grid::{Grid, Pos};
use crate::score::pass_score;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::trace;

/// One pop-and-settle pass of a resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainStep {
    /// Chain number, starting at 1
    pub chain: u32,
    /// Popped puyos with the color they had
    pub erased: Vec<(Pos, Color)>,
    /// Number of groups popped together
    pub group_count: usize,
    /// Number of distinct colors popped
    pub color_count: usize,
    /// Points earned by this pass
    pub score: u64,
}

/// Everything a single resolution did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainReport {
    pub steps: Vec<ChainStep>,
    /// Total points, including any all-clear bonus
    pub score: u64,
    /// The grid was emptied by this resolution
    pub all_clear: bool,
}

impl ChainReport {
    /// Number of passes that popped something
    pub fn chain_count(&self) -> u32 {
        self.steps.len() as u32
    }

    /// Puyos popped across all passes
    pub fn total_erased(&self) -> usize {
        self.steps.iter().map(|step| step.erased.len()).sum()
    }

    /// True if nothing popped
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Resolve the grid in place until no group remains.
///
/// Every pass pops all current groups at once, settles every column, and
/// scores `popped * 10 * chain_multiplier(chain)`. When at least one pass
/// happened and the grid ends up empty, `all_clear_bonus` is added.
///
/// Each pass removes at least [`ERASE_THRESHOLD`] puyos, so there are at most
/// `area / ERASE_THRESHOLD` passes.
pub fn resolve_in_place(grid: &mut Grid, all_clear_bonus: u64) -> ChainReport {
    let mut report = ChainReport::default();

    loop {
        let groups = find_groups(grid);
        if groups.is_empty() {
            break;
        }

        let chain = report.chain_count() + 1;
        debug_assert!(
            chain as usize <= grid.area() / ERASE_THRESHOLD,
            "resolution exceeded its pass bound"
        );

        let mut erased = Vec::new();
        let mut colors = BTreeSet::new();
        for group in &groups {
            colors.insert(group.color);
            for &pos in &group.positions {
                grid.set(pos, Cell::Empty);
                erased.push((pos, group.color));
            }
        }

        let score = pass_score(erased.len(), chain);
        trace!(
            chain,
            groups = groups.len(),
            erased = erased.len(),
            score,
            "chain pass"
        );

        report.score += score;
        report.steps.push(ChainStep {
            chain,
            erased,
            group_count: groups.len(),
            color_count: colors.len(),
            score,
        });

        settle(grid);
    }

    if !report.is_empty() && grid.is_empty() {
        report.all_clear = true;
        report.score += all_clear_bonus;
    }

    report
}

/// Pure form of [`resolve_in_place`]: returns the stable grid and the report
pub fn resolve(grid: &Grid, all_clear_bonus: u64) -> (Grid, ChainReport) {
    let mut resolved = grid.clone();
    let report = resolve_in_place(&mut resolved, all_clear_bonus);
    (resolved, report)
}
