//! Subscriber-count watch used to turn periodic samples into connect events.
//!
//! A backend without a native "subscriber connected" notification samples
//! the subscriber count on a timer and feeds each sample to a
//! [`SubscriberCountWatch`]. The watch reports an increase when the new
//! sample is strictly greater than the previous one, and always remembers
//! the latest sample. A decrease followed by an increase is therefore
//! detected relative to the most recent sample, not the historical maximum.
//!
//! Increases happening between two samples are coalesced into one event.
//!
//! ```
//! use roscompat_core::status::SubscriberCountWatch;
//!
//! let mut watch = SubscriberCountWatch::new();
//! let fired: Vec<bool> = [1, 1, 3, 2, 5].into_iter().map(|n| watch.observe(n)).collect();
//! assert_eq!(fired, [true, false, true, false, true]);
//! ```

use std::time::Duration;

/// Default sampling period of the emulated connect notification.
pub const DEFAULT_STATUS_POLL_PERIOD: Duration = Duration::from_millis(500);

/// Last observed subscriber count of one publisher.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberCountWatch {
    last: usize,
}

impl SubscriberCountWatch {
    /// A watch that has observed zero subscribers.
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// Last sample.
    pub fn last(&self) -> usize {
        self.last
    }

    /// Record `count` and report whether it is an increase.
    pub fn observe(&mut self, count: usize) -> bool {
        let increased = count > self.last;
        self.last = count;
        increased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increase_episodes() {
        let mut watch = SubscriberCountWatch::new();
        // 0 -> 1 -> 1 -> 3 -> 2 -> 5
        assert!(watch.observe(1));
        assert!(!watch.observe(1));
        assert!(watch.observe(3));
        assert!(!watch.observe(2));
        assert!(watch.observe(5));
        assert_eq!(watch.last(), 5);
    }

    #[test]
    fn test_never_fires_on_decrease() {
        let mut watch = SubscriberCountWatch::new();
        watch.observe(4);
        for n in (0..4).rev() {
            assert!(!watch.observe(n));
        }
        assert_eq!(watch.last(), 0);
    }

    #[test]
    fn test_relative_to_latest_sample() {
        let mut watch = SubscriberCountWatch::new();
        assert!(watch.observe(3));
        assert!(!watch.observe(1));
        // below the historical maximum, above the latest sample
        assert!(watch.observe(2));
    }

    #[test]
    fn test_zero_stays_quiet() {
        let mut watch = SubscriberCountWatch::new();
        assert!(!watch.observe(0));
        assert!(!watch.observe(0));
    }
}
