//! Multinomial logit probabilities and Monte Carlo choice.

/// Probabilities over a set of alternatives.  Unavailable (or unsampled)
/// alternatives get probability zero.
#[derive(Clone, Debug, PartialEq)]
pub struct LogitChoice {
    probabilities: Vec<f64>,
    logsum:        f64,
    available:     usize,
}

impl LogitChoice {
    /// `mask[i] == false` excludes alternative `i`.  Utilities of
    /// `-inf` also exclude.
    pub fn from_utilities(utilities: &[f64], mask: &[bool]) -> Self {
        let open = |i: usize| mask.get(i).copied().unwrap_or(false) && utilities[i] > f64::NEG_INFINITY;

        let max = (0..utilities.len())
            .filter(|&i| open(i))
            .map(|i| utilities[i])
            .fold(f64::NEG_INFINITY, f64::max);

        let mut probabilities = vec![0.0; utilities.len()];
        if max == f64::NEG_INFINITY {
            return Self { probabilities, logsum: f64::NEG_INFINITY, available: 0 };
        }

        let mut sum = 0.0;
        let mut available = 0;
        for (i, p) in probabilities.iter_mut().enumerate() {
            if open(i) {
                *p = (utilities[i] - max).exp();
                sum += *p;
                available += 1;
            }
        }
        for p in &mut probabilities {
            *p /= sum;
        }
        Self { probabilities, logsum: max + sum.ln(), available }
    }

    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    pub fn logsum(&self) -> f64 {
        self.logsum
    }

    pub fn available_count(&self) -> usize {
        self.available
    }

    /// Alternative whose cumulative probability first exceeds `rn`.
    /// `None` when nothing is available.
    pub fn choose(&self, rn: f64) -> Option<usize> {
        if self.available == 0 {
            return None;
        }
        let mut cumulative = 0.0;
        let mut last = None;
        for (i, &p) in self.probabilities.iter().enumerate() {
            if p <= 0.0 {
                continue;
            }
            cumulative += p;
            last = Some(i);
            if rn < cumulative {
                return last;
            }
        }
        // rounding left the total a hair below rn
        last
    }
}
