//! Wrapping millisecond time.

/// Longest span two timestamps can be apart and still compare correctly
/// with [`Timestamp::has_reached`], about 24.8 days.
pub const MAX_DURATION_MS: u32 = i32::MAX as u32;

/// A point in time in milliseconds.
///
/// The counter is 32 bits wide and wraps, the way a microcontroller's
/// millisecond tick does after ~49 days. Differences use wrapping arithmetic,
/// so a pattern keeps playing across the wrap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamp(u32);

impl Timestamp {
    /// The zero timestamp.
    pub const ZERO: Self = Self(0);

    /// Create a timestamp from a raw millisecond count.
    pub const fn from_millis(ms: u32) -> Self {
        Self(ms)
    }

    /// Raw millisecond count.
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, across a counter wrap.
    pub const fn elapsed_since(self, earlier: Timestamp) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }

    /// This timestamp moved `ms` milliseconds forward.
    pub const fn add_millis(self, ms: u32) -> Self {
        Self(self.0.wrapping_add(ms))
    }

    /// Returns true once `self` is at or past `due`.
    ///
    /// Wrap-aware: valid while the two points are at most
    /// [`MAX_DURATION_MS`] apart.
    pub const fn has_reached(self, due: Timestamp) -> bool {
        (self.0.wrapping_sub(due.0) as i32) >= 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_across_wrap() {
        let start = Timestamp::from_millis(u32::MAX - 9);
        let now = start.add_millis(25);
        assert_eq!(now.as_millis(), 15);
        assert_eq!(now.elapsed_since(start), 25);
    }

    #[test]
    fn has_reached_is_inclusive() {
        let due = Timestamp::from_millis(500);
        assert!(!Timestamp::from_millis(499).has_reached(due));
        assert!(Timestamp::from_millis(500).has_reached(due));
        assert!(Timestamp::from_millis(501).has_reached(due));
    }

    #[test]
    fn has_reached_across_wrap() {
        let due = Timestamp::from_millis(u32::MAX).add_millis(10);
        assert!(!Timestamp::from_millis(u32::MAX - 5).has_reached(due));
        assert!(Timestamp::from_millis(20).has_reached(due));
    }
}
