/*!
Defines [Timestamp], the `(sec, nsec)` pair used throughout the catalog for
ordering snapshots and answering point-in-time queries.
*/

/// A point in time as `(seconds, nanoseconds)` since the epoch.
///
/// Comparison is lexicographic on `(sec, nsec)`, which `derive(Ord)` gives us
/// for free as long as the fields stay declared in that order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp {
    /// Seconds since the epoch.
    pub sec: i64,
    /// Nanoseconds within the second.
    pub nsec: i32,
}

impl Timestamp {
    /// Construct a timestamp from its wire components.
    pub fn new(sec: i64, nsec: i32) -> Self {
        Timestamp { sec, nsec }
    }

    /// Construct a timestamp from the V2 "timeval" wire encoding
    /// (32-bit seconds, 32-bit microseconds).
    pub fn from_timeval(sec: i32, usec: i32) -> Self {
        Timestamp {
            sec: sec as i64,
            nsec: usec.saturating_mul(1000),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Timestamp::new(10, 5) < Timestamp::new(10, 6));
        assert!(Timestamp::new(10, 999) < Timestamp::new(11, 0));
        assert_eq!(Timestamp::new(10, 5), Timestamp::new(10, 5));
    }

    #[test]
    fn timeval_multiplies_usec_to_nsec() {
        assert_eq!(Timestamp::from_timeval(5, 2), Timestamp::new(5, 2000));
    }
}
