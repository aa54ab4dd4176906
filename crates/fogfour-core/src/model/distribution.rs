use rand::Rng;

/// Normalized probabilities built from non-negative scores.
///
/// Negative or non-finite scores count as zero. When every score is zero the
/// distribution falls back to uniform so that callers always get a valid mass.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedDistribution {
    probabilities: Vec<f64>,
}

impl WeightedDistribution {
    pub fn new(scores: &[f64]) -> Self {
        let cleaned: Vec<f64> = scores
            .iter()
            .map(|score| if score.is_finite() && *score > 0.0 { *score } else { 0.0 })
            .collect();
        let total: f64 = cleaned.iter().sum();

        let probabilities = if cleaned.is_empty() {
            Vec::new()
        } else if total > 0.0 {
            cleaned.iter().map(|score| score / total).collect()
        } else {
            vec![1.0 / cleaned.len() as f64; cleaned.len()]
        };

        Self { probabilities }
    }

    /// Equal weight for `len` outcomes.
    pub fn uniform(len: usize) -> Self {
        Self::new(&vec![1.0; len])
    }

    pub fn probability(&self, index: usize) -> f64 {
        self.probabilities.get(index).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Draws an index according to the distribution. Returns `None` when empty.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        if self.probabilities.is_empty() {
            return None;
        }
        let target: f64 = rng.gen_range(0.0..1.0);
        let mut cumulative = 0.0;
        for (index, probability) in self.probabilities.iter().enumerate() {
            cumulative += probability;
            if target < cumulative {
                return Some(index);
            }
        }
        // Rounding can leave the cumulative sum a hair below one.
        self.probabilities.iter().rposition(|p| *p > 0.0)
    }
}
