//! Global statistics over every magnitude of a session.

/// Count, sum, sum of squares, minimum and maximum of a value stream.
///
/// Variance is tracked with Welford's update alongside the raw sums, so
/// the standard deviation stays accurate when the mean is large compared
/// to the spread (log magnitudes sit in the thousands with a spread of a
/// few hundred).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub count: u64,
    pub sum: f64,
    pub sum_sq: f64,
    pub min: f64,
    pub max: f64,
    mean: f64,
    m2: f64,
}

impl Default for Statistics {
    fn default() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            mean: 0.0,
            m2: 0.0,
        }
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn extend(&mut self, values: &[f64]) {
        for &v in values {
            self.push(v);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Arithmetic mean; 0 for an empty stream.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation, `sqrt((Σx² − (Σx)²/n) / (n − 1))`.
    ///
    /// 0 when fewer than two values were seen.
    pub fn std_dev(&self) -> f64 {
        if self.count < 2 {
            return 0.0;
        }
        (self.m2.max(0.0) / (self.count - 1) as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_textbook_formula() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let mut stats = Statistics::new();
        stats.extend(&values);

        let n = values.len() as f64;
        let textbook = ((stats.sum_sq - stats.sum * stats.sum / n) / (n - 1.0)).sqrt();
        assert_eq!(stats.count, 8);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
        assert!((stats.mean() - 5.0).abs() < 1e-12);
        assert!((stats.std_dev() - textbook).abs() < 1e-12);
    }

    #[test]
    fn test_large_offset_stays_accurate() {
        let mut stats = Statistics::new();
        for i in 0..10_000 {
            stats.push(1e9 + (i % 2) as f64);
        }
        // Population alternates 1e9 and 1e9 + 1.
        assert!((stats.std_dev() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_degenerate_streams() {
        let empty = Statistics::new();
        assert!(empty.is_empty());
        assert_eq!(empty.std_dev(), 0.0);

        let mut one = Statistics::new();
        one.push(3.0);
        assert_eq!(one.std_dev(), 0.0);

        let mut flat = Statistics::new();
        flat.extend(&[0.0; 100]);
        assert_eq!(flat.std_dev(), 0.0);
        assert_eq!(flat.min, flat.max);
    }
}
