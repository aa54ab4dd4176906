use std::time::Duration;

/// Counters collected over one `find_next_move` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub max_depth: usize,
    pub or_nodes: u64,
    pub and_nodes: u64,
    pub memo_hits: u64,
    pub memo_misses: u64,
    pub leaf_evaluations: u64,
    pub pruned_members: u64,
    pub timed_out: bool,
    pub elapsed: Duration,
    pub values: Vec<f64>,
}

impl SearchStats {
    pub fn memo_hit_rate(&self) -> f64 {
        let lookups = self.memo_hits + self.memo_misses;
        if lookups == 0 {
            0.0
        } else {
            self.memo_hits as f64 / lookups as f64
        }
    }
}
