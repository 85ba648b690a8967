use crate::interpolation::interpolate_transform;
use crate::time::{Duration, Time};
use crate::transform::RigidTransform;
use log::trace;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A transform sample along with the time it was captured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAndTransform {
    pub time: Time,
    pub transform: RigidTransform,
}

impl TimeAndTransform {
    pub fn new(time: Time, transform: RigidTransform) -> Self {
        Self { time, transform }
    }
}

/// The two samples surrounding a queried time. When the query lands exactly on a sample, or
/// is clamped to the oldest/newest one, `lower` and `upper` are the same sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bracket {
    pub lower: TimeAndTransform,
    pub upper: TimeAndTransform,
}

impl Bracket {
    fn single(sample: TimeAndTransform) -> Self {
        Self {
            lower: sample,
            upper: sample,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.lower.time == self.upper.time
    }

    /// The transform at `time`, interpolated between the bracket bounds.
    pub fn interpolate(&self, time: Time) -> RigidTransform {
        let mut out = RigidTransform::identity();
        interpolate_transform(&mut out, &self.lower, &self.upper, time);
        out
    }
}

/// Ordered history of "child relative to parent" transforms for a single edge of the tree.
///
/// Samples are kept sorted by time with at most one sample per timestamp. After every insert
/// the history is trimmed from the oldest end so that the newest and oldest timestamps are at
/// most `max_storage_time` apart and at most `max_capacity` samples are retained. A non-empty
/// history is never trimmed below one sample.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(from = "HistoryRepr")]
pub struct TransformHistory {
    samples: VecDeque<TimeAndTransform>,
    max_storage_time: Duration,
    max_capacity: usize,
}

/// Deserialized shape of a history. Samples are replayed through
/// [`TransformHistory::insert`] so ordering and limits hold whatever the input looks like.
#[derive(Deserialize)]
struct HistoryRepr {
    samples: Vec<TimeAndTransform>,
    max_storage_time: Duration,
    max_capacity: usize,
}

impl From<HistoryRepr> for TransformHistory {
    fn from(repr: HistoryRepr) -> Self {
        let mut history = TransformHistory::new(repr.max_storage_time, repr.max_capacity);
        for sample in repr.samples {
            history.insert(sample.time, sample.transform);
        }
        history
    }
}

impl TransformHistory {
    pub fn new(max_storage_time: Duration, max_capacity: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            max_storage_time,
            max_capacity,
        }
    }

    pub fn max_storage_time(&self) -> Duration {
        self.max_storage_time
    }

    /// Takes effect on the next insert.
    pub fn set_max_storage_time(&mut self, max_storage_time: Duration) {
        self.max_storage_time = max_storage_time;
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Takes effect on the next insert.
    pub fn set_max_capacity(&mut self, max_capacity: usize) {
        self.max_capacity = max_capacity;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn oldest(&self) -> Option<&TimeAndTransform> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&TimeAndTransform> {
        self.samples.back()
    }

    /// Oldest and newest timestamps, if any sample is stored.
    pub fn time_range(&self) -> Option<(Time, Time)> {
        Some((self.samples.front()?.time, self.samples.back()?.time))
    }

    /// Samples in ascending time order.
    pub fn iter(&self) -> impl Iterator<Item = &TimeAndTransform> + '_ {
        self.samples.iter()
    }

    /// Insert a sample, replacing any sample already stored at the same time, then evict from
    /// the oldest end to honor the storage time and capacity limits.
    pub fn insert(&mut self, time: Time, transform: RigidTransform) {
        let sample = TimeAndTransform::new(time, transform);
        match self.samples.binary_search_by_key(&time, |s| s.time) {
            Ok(index) => self.samples[index] = sample,
            Err(index) => self.samples.insert(index, sample),
        }

        let before = self.samples.len();
        if let Some(newest) = self.samples.back().map(|s| s.time) {
            while self.samples.len() > 1
                && self
                    .samples
                    .front()
                    .is_some_and(|oldest| newest - oldest.time > self.max_storage_time)
            {
                self.samples.pop_front();
            }
        }
        while self.samples.len() > self.max_capacity.max(1) {
            self.samples.pop_front();
        }

        let evicted = before - self.samples.len();
        if evicted > 0 {
            trace!("evicted {evicted} stale transform(s), {} retained", self.samples.len());
        }
    }

    /// Find the samples bracketing `time`.
    ///
    /// - an exact timestamp match returns that sample as both bounds,
    /// - a time between two samples returns the immediate neighbors,
    /// - a time past the newest (or before the oldest) sample is clamped to it when it is at
    ///   most `max_delta` away, and fails otherwise,
    /// - a single stored sample answers any time up to `sample + max_delta`.
    ///
    /// Returns `None` for an empty history or a time outside the tolerance.
    pub fn find_bracket(&self, time: Time, max_delta: Duration) -> Option<Bracket> {
        let count = self.samples.len();
        if count == 0 {
            return None;
        }

        if count == 1 {
            let only = self.samples[0];
            return (time <= only.time + max_delta).then(|| Bracket::single(only));
        }

        let greater_than_index = match self.samples.binary_search_by_key(&time, |s| s.time) {
            Ok(index) => return Some(Bracket::single(self.samples[index])),
            Err(index) => index,
        };

        if greater_than_index >= count {
            let newest = self.samples[count - 1];
            return (time <= newest.time + max_delta).then(|| Bracket::single(newest));
        }

        if greater_than_index == 0 {
            let oldest = self.samples[0];
            return (time + max_delta >= oldest.time).then(|| Bracket::single(oldest));
        }

        Some(Bracket {
            lower: self.samples[greater_than_index - 1],
            upper: self.samples[greater_than_index],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn tx(x: f64) -> RigidTransform {
        RigidTransform::from_translation(DVec3::new(x, 0.0, 0.0))
    }

    fn times(history: &TransformHistory) -> Vec<u64> {
        history.iter().map(|s| s.time.as_nanos()).collect()
    }

    #[test]
    fn test_insert_keeps_order_and_replaces_duplicates() {
        let mut history = TransformHistory::new(Duration::from_secs(100), 100);
        history.insert(Time(2000), tx(2.0));
        history.insert(Time(1000), tx(1.0));
        history.insert(Time(3000), tx(3.0));
        history.insert(Time(2000), tx(20.0));

        assert_eq!(times(&history), vec![1000, 2000, 3000]);
        let bracket = history.find_bracket(Time(2000), Duration::ZERO).unwrap();
        assert_eq!(bracket.lower.transform.translation().x, 20.0);
    }

    #[test]
    fn test_deserialize_replays_inserts() {
        let sample = |t: u64, x: f64| ron::to_string(&TimeAndTransform::new(Time(t), tx(x))).unwrap();
        let samples = [
            sample(5000, 5.0),
            sample(1000, 1.0),
            sample(3000, 3.0),
            sample(3000, 30.0),
        ]
        .join(", ");

        let loose = format!("(samples: [{samples}], max_storage_time: 100000, max_capacity: 10)");
        let history: TransformHistory = ron::from_str(&loose).unwrap();
        assert_eq!(times(&history), vec![1000, 3000, 5000]);
        let bracket = history.find_bracket(Time(3000), Duration::ZERO).unwrap();
        assert_eq!(bracket.lower.transform.translation().x, 30.0);

        let tight = format!("(samples: [{samples}], max_storage_time: 10, max_capacity: 1)");
        let history: TransformHistory = ron::from_str(&tight).unwrap();
        assert_eq!(times(&history), vec![5000]);
        assert!(history.find_bracket(Time(5000), Duration::ZERO).is_some());

        let text = ron::to_string(&history).unwrap();
        let back: TransformHistory = ron::from_str(&text).unwrap();
        assert_eq!(times(&back), vec![5000]);
        assert_eq!(back.max_capacity(), 1);
        assert_eq!(back.max_storage_time(), Duration(10));
    }

    #[test]
    fn test_capacity_limit() {
        let mut history = TransformHistory::new(Duration::from_secs(100), 2);
        history.insert(Time(1000), tx(1.0));
        history.insert(Time(2000), tx(2.0));
        history.insert(Time(3000), tx(3.0));

        assert_eq!(times(&history), vec![2000, 3000]);
        assert_eq!(history.time_range(), Some((Time(2000), Time(3000))));
    }

    #[test]
    fn test_storage_time_limit() {
        let mut history = TransformHistory::new(Duration(1500), 100);
        history.insert(Time(1000), tx(1.0));
        history.insert(Time(2000), tx(2.0));
        history.insert(Time(2500), tx(2.5));
        assert_eq!(times(&history), vec![1000, 2000, 2500]);

        history.insert(Time(3000), tx(3.0));
        assert_eq!(times(&history), vec![2000, 2500, 3000]);

        // a sample far too old for the window is dropped right away
        history.insert(Time(10), tx(0.0));
        assert_eq!(times(&history), vec![2000, 2500, 3000]);
    }

    #[test]
    fn test_never_evicts_last_sample() {
        let mut history = TransformHistory::new(Duration::ZERO, 0);
        history.insert(Time(1000), tx(1.0));
        assert_eq!(history.len(), 1);
        history.insert(Time(5000), tx(5.0));
        assert_eq!(times(&history), vec![5000]);
    }

    #[test]
    fn test_limits_hold_after_random_inserts() {
        let max_storage = Duration(10_000);
        let mut history = TransformHistory::new(max_storage, 7);
        // deterministic scramble of timestamps
        let mut t: u64 = 12_345;
        for i in 0..500 {
            t = (t.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407)) >> 1;
            history.insert(Time(t % 50_000), tx(i as f64));

            let (oldest, newest) = history.time_range().unwrap();
            assert!(newest - oldest <= max_storage);
            assert!(history.len() <= 7);
            let stamps = times(&history);
            assert!(stamps.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_find_bracket_empty() {
        let history = TransformHistory::new(Duration::from_secs(10), 10);
        assert!(history.find_bracket(Time(0), crate::MAX_DURATION).is_none());
    }

    #[test]
    fn test_find_bracket_single_sample() {
        let mut history = TransformHistory::new(Duration::from_secs(10), 10);
        history.insert(Time(1000), tx(1.0));

        let bracket = history.find_bracket(Time(1000), Duration::ZERO).unwrap();
        assert!(bracket.is_exact());
        assert!(history.find_bracket(Time(1001), Duration::ZERO).is_none());
        assert!(history.find_bracket(Time(1500), Duration(500)).is_some());
        assert!(history.find_bracket(Time(1501), Duration(500)).is_none());
        // anything up to the tolerance is accepted, including earlier times
        assert!(history.find_bracket(Time(10), Duration::ZERO).is_some());
    }

    #[test]
    fn test_find_bracket_exact_and_between() {
        let mut history = TransformHistory::new(Duration::from_secs(10), 10);
        history.insert(Time(1000), tx(1.0));
        history.insert(Time(2000), tx(2.0));
        history.insert(Time(3000), tx(3.0));

        let exact = history.find_bracket(Time(2000), Duration::ZERO).unwrap();
        assert_eq!(exact.lower, exact.upper);
        assert_eq!(exact.lower.time, Time(2000));

        let between = history.find_bracket(Time(2250), Duration::ZERO).unwrap();
        assert_eq!(between.lower.time, Time(2000));
        assert_eq!(between.upper.time, Time(3000));
        assert!((between.interpolate(Time(2250)).translation().x - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_find_bracket_clamps_within_tolerance() {
        let mut history = TransformHistory::new(Duration::from_secs(10), 10);
        history.insert(Time(1000), tx(1.0));
        history.insert(Time(2000), tx(2.0));

        let after = history.find_bracket(Time(2400), Duration(500)).unwrap();
        assert_eq!(after.lower.time, Time(2000));
        assert!(after.is_exact());
        assert!(history.find_bracket(Time(2501), Duration(500)).is_none());

        let before = history.find_bracket(Time(600), Duration(500)).unwrap();
        assert_eq!(before.upper.time, Time(1000));
        assert!(before.is_exact());
        assert!(history.find_bracket(Time(499), Duration(500)).is_none());
    }

    #[test]
    fn test_limits_are_mutable() {
        let mut history = TransformHistory::new(Duration::from_secs(10), 10);
        for t in 0..5u64 {
            history.insert(Time(t * 1000), tx(t as f64));
        }
        history.set_max_capacity(2);
        assert_eq!(history.max_capacity(), 2);
        assert_eq!(history.len(), 5);
        history.insert(Time(5000), tx(5.0));
        assert_eq!(times(&history), vec![4000, 5000]);
    }
}
