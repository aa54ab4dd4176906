use std::time::Duration;

/// Depth schedule, pruning and time budget of the AND-OR search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchConfig {
    /// Maximum depth while the engine is young.
    pub shallow_depth: usize,
    /// Maximum depth once `deep_after` searches have run.
    pub deep_depth: usize,
    pub deep_after: u64,
    /// Members of a predicted successor lighter than this are dropped.
    pub prune_threshold: f64,
    /// Wall-clock cap on one `find_next_move`; zero disables it.
    pub time_cap_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            shallow_depth: 2,
            deep_depth: 3,
            deep_after: 600,
            prune_threshold: 0.01,
            time_cap_ms: 0,
        }
    }
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self::from_reader(|key| std::env::var(key).ok())
    }

    pub fn from_reader<F>(mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let shallow_depth = read("FOG_SEARCH_SHALLOW_DEPTH")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .map(|depth| depth.clamp(1, 6))
            .unwrap_or(defaults.shallow_depth);
        let deep_depth = read("FOG_SEARCH_DEEP_DEPTH")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .map(|depth| depth.clamp(1, 6))
            .unwrap_or(defaults.deep_depth)
            .max(shallow_depth);
        let deep_after = read("FOG_SEARCH_DEEP_AFTER")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(defaults.deep_after);
        let prune_threshold = read("FOG_SEARCH_PRUNE")
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(0.0, 0.5))
            .unwrap_or(defaults.prune_threshold);
        let time_cap_ms = read("FOG_SEARCH_TIME_CAP_MS")
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .unwrap_or(defaults.time_cap_ms);

        Self {
            shallow_depth,
            deep_depth,
            deep_after,
            prune_threshold,
            time_cap_ms,
        }
    }

    /// Depth for the search that follows `searches` completed ones.
    pub fn depth_for(&self, searches: u64) -> usize {
        if searches <= self.deep_after {
            self.shallow_depth
        } else {
            self.deep_depth
        }
    }

    pub fn time_cap(&self) -> Option<Duration> {
        (self.time_cap_ms > 0).then(|| Duration::from_millis(self.time_cap_ms))
    }
}
