/// A closed range `[min, max]` of ray parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Interval from `min` to positive infinity.
    pub fn from_min(min: f32) -> Self {
        Self::new(min, f32::INFINITY)
    }

    /// Both ends are included.
    #[inline]
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Same lower bound, new upper bound. Nearest-hit searches shrink their
    /// range this way as closer hits turn up.
    #[inline]
    pub fn with_max(&self, max: f32) -> Interval {
        Interval::new(self.min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_bounds() {
        let range = Interval::new(0.0, 10.0);

        assert!(range.contains(0.0));
        assert!(range.contains(10.0));
        assert!(range.contains(5.0));
        assert!(!range.contains(-0.1));
        assert!(!range.contains(10.1));
    }

    #[test]
    fn test_tighten() {
        let range = Interval::from_min(0.001).with_max(4.0);
        assert_eq!(range.min, 0.001);
        assert_eq!(range.max, 4.0);
        assert!(!range.contains(4.5));
        assert!(Interval::from_min(0.0).contains(1e30));
    }
}
