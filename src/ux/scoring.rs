//! Trapezoidal range scoring

/// Ideal band plus the worst-case bounds on either side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub ideal_min: f64,
    pub ideal_max: f64,
    pub worst_low: f64,
    pub worst_high: f64,
}

impl Band {
    pub const fn new(ideal_min: f64, ideal_max: f64, worst_low: f64, worst_high: f64) -> Self {
        Self {
            ideal_min,
            ideal_max,
            worst_low,
            worst_high,
        }
    }

    /// Full marks inside the ideal band, linear decay to zero at the worst bounds
    pub fn score(&self, value: f64, max_points: f64) -> f64 {
        if value >= self.ideal_min && value <= self.ideal_max {
            return max_points;
        }
        if value < self.ideal_min {
            let range = self.ideal_min - self.worst_low;
            if range <= 0.0 {
                return 0.0;
            }
            return (max_points * (1.0 - (self.ideal_min - value) / range)).max(0.0);
        }
        let range = self.worst_high - self.ideal_max;
        if range <= 0.0 {
            return 0.0;
        }
        (max_points * (1.0 - (value - self.ideal_max) / range)).max(0.0)
    }

    /// Whether a value missed the band on the high side
    pub fn is_above(&self, value: f64) -> bool {
        value > self.ideal_max
    }
}

/// Overall text coverage, percent of page
pub const OVERALL_DENSITY: Band = Band::new(10.0, 55.0, 0.0, 90.0);
/// Text coverage of the first viewport, percent
pub const FOLD_DENSITY: Band = Band::new(10.0, 60.0, 0.0, 95.0);
/// White-space ratio, percent of a 48px gap
pub const WHITE_SPACE: Band = Band::new(25.0, 85.0, 0.0, 100.0);
/// Tracked elements per viewport height
pub const COMPLEXITY: Band = Band::new(5.0, 25.0, 0.0, 60.0);

/// Round half away from zero, as a non-negative integer
pub fn round_u32(value: f64) -> u32 {
    value.round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trapezoid_shape() {
        assert_eq!(OVERALL_DENSITY.score(30.0, 100.0), 100.0);
        assert_eq!(OVERALL_DENSITY.score(10.0, 100.0), 100.0);
        assert_eq!(OVERALL_DENSITY.score(5.0, 100.0), 50.0);
        assert_eq!(OVERALL_DENSITY.score(0.0, 100.0), 0.0);
        assert_eq!(OVERALL_DENSITY.score(72.5, 100.0), 50.0);
        assert_eq!(OVERALL_DENSITY.score(120.0, 100.0), 0.0);
    }

    #[test]
    fn test_degenerate_side_scores_zero() {
        let band = Band::new(0.0, 10.0, 0.0, 10.0);
        assert_eq!(band.score(-1.0, 25.0), 0.0);
        assert_eq!(band.score(11.0, 25.0), 0.0);
        assert_eq!(band.score(5.0, 25.0), 25.0);
    }

    #[test]
    fn test_complexity_band() {
        assert_eq!(COMPLEXITY.score(0.0, 25.0), 0.0);
        assert_eq!(COMPLEXITY.score(2.5, 25.0), 12.5);
        assert_eq!(COMPLEXITY.score(42.5, 25.0), 12.5);
    }
}
