//! Nearest data point lookup for pointer interactions
//!
//! Two separate searches with different preconditions:
//! - [`nearest_by_euclidean`] scans projected points, no ordering required.
//! - [`nearest_by_time`] bisects a series sorted ascending by its time field.

use chart_interact_shared::{ScreenPosition, TimeKeyed};

pub const DEFAULT_TIME_FIELD: &str = "time";

/// A point found by the euclidean search, with its distance to the pointer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestPoint<'a, P> {
    pub point: &'a P,
    pub index: usize,
    pub distance: f64,
}

/// Maps screen pixels back to time values
pub trait TimeScale {
    fn invert(&self, pixel: f64) -> f64;
}

/// Linear mapping between a time domain and a pixel range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTimeScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearTimeScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn scale(&self, time: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (time - d0) / (d1 - d0) * (r1 - r0)
    }
}

impl TimeScale for LinearTimeScale {
    fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if r1 == r0 {
            return (d0 + d1) / 2.0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }
}

impl<F: Fn(f64) -> f64> TimeScale for F {
    fn invert(&self, pixel: f64) -> f64 {
        self(pixel)
    }
}

/// Closest point to `(pointer_x, pointer_y)` by straight-line distance.
///
/// Ties go to the earliest point in scan order. Points whose distance is not
/// a number (missing coordinates) are skipped.
pub fn nearest_by_euclidean<P: ScreenPosition>(
    pointer_x: f64,
    pointer_y: f64,
    points: &[P],
) -> Option<NearestPoint<'_, P>> {
    let mut best: Option<NearestPoint<'_, P>> = None;

    for (index, point) in points.iter().enumerate() {
        let dx = point.screen_x() - pointer_x;
        let dy = point.screen_y() - pointer_y;
        let distance = (dx * dx + dy * dy).sqrt();

        let closer = match &best {
            Some(current) => distance < current.distance,
            None => distance < f64::INFINITY,
        };
        if closer {
            best = Some(NearestPoint {
                point,
                index,
                distance,
            });
        }
    }

    best
}

/// Closest point in time to the time under `pointer_x`.
///
/// `points` must be sorted ascending by `time_field`. Before the first point
/// the first is returned, after the last the last; in between the nearer of
/// the two neighbours wins, the earlier one on a tie.
pub fn nearest_by_time<'a, P: TimeKeyed, S: TimeScale + ?Sized>(
    pointer_x: f64,
    scale: &S,
    points: &'a [P],
    time_field: &str,
) -> Option<&'a P> {
    let last = points.last()?;
    let target = scale.invert(pointer_x);

    let index = bisect_left(points, target, time_field);
    if index == 0 {
        return points.first();
    }
    if index >= points.len() {
        return Some(last);
    }

    let before = &points[index - 1];
    let after = &points[index];
    let before_gap = target - before.time_key(time_field).unwrap_or(f64::NAN);
    let after_gap = after.time_key(time_field).unwrap_or(f64::NAN) - target;

    if before_gap > after_gap {
        Some(after)
    } else {
        Some(before)
    }
}

/// Index of the first point whose time is not less than `target`
fn bisect_left<P: TimeKeyed>(points: &[P], target: f64, time_field: &str) -> usize {
    points.partition_point(|p| p.time_key(time_field).is_some_and(|t| t < target))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chart_interact_shared::{DataRecord, ScreenPoint};
    use serde_json::json;

    struct Sample {
        time: f64,
        label: &'static str,
    }

    impl TimeKeyed for Sample {
        fn time_key(&self, field: &str) -> Option<f64> {
            (field == DEFAULT_TIME_FIELD).then_some(self.time)
        }
    }

    fn series() -> Vec<Sample> {
        vec![
            Sample { time: 10.0, label: "a" },
            Sample { time: 20.0, label: "b" },
            Sample { time: 30.0, label: "c" },
        ]
    }

    #[test]
    fn test_euclidean_basic() {
        let points = [ScreenPoint::new(0.0, 0.0), ScreenPoint::new(10.0, 0.0)];
        let found = nearest_by_euclidean(1.0, 0.0, &points).unwrap();
        assert_eq!(found.index, 0);
        assert_eq!(found.distance, 1.0);
        assert_eq!(*found.point, points[0]);
    }

    #[test]
    fn test_euclidean_empty() {
        let points: [ScreenPoint; 0] = [];
        assert!(nearest_by_euclidean(1.0, 1.0, &points).is_none());
    }

    #[test]
    fn test_euclidean_tie_keeps_first() {
        let points = [ScreenPoint::new(0.0, 0.0), ScreenPoint::new(2.0, 0.0)];
        let found = nearest_by_euclidean(1.0, 0.0, &points).unwrap();
        assert_eq!(found.index, 0);
    }

    #[test]
    fn test_euclidean_skips_unpositioned_records() {
        let records: Vec<DataRecord> = vec![
            DataRecord::try_from(json!({"label": "no position"})).unwrap(),
            DataRecord::try_from(json!({"x": 5, "y": 5})).unwrap(),
        ];
        let found = nearest_by_euclidean(0.0, 0.0, &records).unwrap();
        assert_eq!(found.index, 1);
    }

    #[test]
    fn test_time_clamps_to_ends() {
        let data = series();
        let identity = |px: f64| px;
        assert_eq!(nearest_by_time(0.0, &identity, &data, "time").unwrap().label, "a");
        assert_eq!(nearest_by_time(10.0, &identity, &data, "time").unwrap().label, "a");
        assert_eq!(nearest_by_time(99.0, &identity, &data, "time").unwrap().label, "c");
    }

    #[test]
    fn test_time_picks_closer_neighbour() {
        let data = series();
        let identity = |px: f64| px;
        assert_eq!(nearest_by_time(14.0, &identity, &data, "time").unwrap().label, "a");
        assert_eq!(nearest_by_time(16.0, &identity, &data, "time").unwrap().label, "b");
        assert_eq!(nearest_by_time(15.0, &identity, &data, "time").unwrap().label, "a");
        assert_eq!(nearest_by_time(20.0, &identity, &data, "time").unwrap().label, "b");
    }

    #[test]
    fn test_time_through_linear_scale() {
        let data = series();
        // 10..30 mapped onto 0..200 pixels
        let scale = LinearTimeScale::new((10.0, 30.0), (0.0, 200.0));
        assert_eq!(scale.scale(20.0), 100.0);
        assert_eq!(nearest_by_time(160.0, &scale, &data, "time").unwrap().label, "c");
        assert_eq!(nearest_by_time(90.0, &scale, &data, "time").unwrap().label, "b");
    }

    #[test]
    fn test_time_empty_and_custom_field() {
        let empty: Vec<Sample> = Vec::new();
        assert!(nearest_by_time(5.0, &|px: f64| px, &empty, "time").is_none());

        let records: Vec<DataRecord> = [
            json!({"pickup_date": "2024-01-01", "trips": 1}),
            json!({"pickup_date": "2024-01-02", "trips": 2}),
        ]
        .into_iter()
        .map(|v| DataRecord::try_from(v).unwrap())
        .collect();
        let day = 86_400_000.0;
        let start = records[0].time_key("pickup_date").unwrap();
        let scale = LinearTimeScale::new((start, start + day), (0.0, 100.0));
        let found = nearest_by_time(80.0, &scale, &records, "pickup_date").unwrap();
        assert_eq!(found.number("trips"), Some(2.0));
    }
}
