//! Chain scoring and session totals

use crate::chain::ChainReport;

/// Points per popped puyo before the chain multiplier
pub const BASE_POINTS: u64 = 10;

/// Default bonus for emptying the whole grid
pub const DEFAULT_ALL_CLEAR_BONUS: u64 = 3600;

/// Multiplier by chain number, index 0 = first chain. Later chains reuse the
/// last entry.
pub const CHAIN_MULTIPLIERS: [u64; 8] = [1, 8, 16, 32, 64, 96, 128, 160];

/// Multiplier for the `chain`-th pass of a resolution (1-based).
/// Chain 0 is never scored and maps to 1.
pub fn chain_multiplier(chain: u32) -> u64 {
    let index = (chain.max(1) as usize - 1).min(CHAIN_MULTIPLIERS.len() - 1);
    CHAIN_MULTIPLIERS[index]
}

/// Score for popping `erased` puyos on chain `chain`
pub fn pass_score(erased: usize, chain: u32) -> u64 {
    erased as u64 * BASE_POINTS * chain_multiplier(chain)
}

/// Running totals for one game session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Chain count of the most recent resolution
    pub last_chain: u32,
    /// Longest chain this session
    pub max_chain: u32,
    /// Puyos popped this session
    pub total_erased: u64,
    /// Resolutions that left the grid empty
    pub all_clears: u32,
    /// Pairs locked onto the grid
    pub pairs_placed: u32,
}

impl Score {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one resolution into the totals
    pub fn add_resolution(&mut self, report: &ChainReport) {
        self.points += report.score;
        self.last_chain = report.chain_count();
        self.max_chain = self.max_chain.max(report.chain_count());
        self.total_erased += report.total_erased() as u64;
        if report.all_clear {
            self.all_clears += 1;
        }
    }

    /// Count a locked pair
    pub fn add_placed_pair(&mut self) {
        self.pairs_placed += 1;
    }

    /// Short text describing a resolution, for display
    pub fn describe(report: &ChainReport) -> Option<String> {
        let chain = report.chain_count();
        if chain == 0 {
            return None;
        }
        let mut action = if chain == 1 {
            String::from("Pop!")
        } else {
            format!("{chain} Chain!")
        };
        if report.all_clear {
            action.push_str(" ALL CLEAR!");
        }
        Some(action)
    }
}
