//! Back-to-front submission order.

use std::cmp::Ordering;

use crate::pipeline::RenderRecord;

/// Farthest record first; equal distances fall back to descending name.
///
/// `total_cmp` keeps the order total even for NaN distances.
pub fn draw_order(a: &RenderRecord, b: &RenderRecord) -> Ordering {
    b.camera_distance
        .total_cmp(&a.camera_distance)
        .then_with(|| b.name.cmp(&a.name))
}

/// Sorts records into submission order.
pub fn sort_back_to_front(records: &mut [RenderRecord]) {
    records.sort_by(draw_order);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, distance: f32) -> RenderRecord {
        RenderRecord {
            name: name.to_string(),
            camera_distance: distance,
            ..RenderRecord::default()
        }
    }

    fn names(records: &[RenderRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn farthest_first() {
        let mut records = vec![record("a", 5.0), record("b", 2.0), record("c", 8.0)];
        sort_back_to_front(&mut records);
        assert_eq!(names(&records), ["c", "a", "b"]);
    }

    #[test]
    fn ties_break_by_descending_name() {
        let mut records = vec![record("alpha", 3.0), record("gamma", 3.0), record("beta", 3.0)];
        sort_back_to_front(&mut records);
        assert_eq!(names(&records), ["gamma", "beta", "alpha"]);

        records.reverse();
        sort_back_to_front(&mut records);
        assert_eq!(names(&records), ["gamma", "beta", "alpha"]);
    }

    #[test]
    fn distances_never_increase() {
        let mut records: Vec<_> = (0..50)
            .map(|i| record(&format!("r{i}"), ((i * 37) % 23) as f32 * 0.5))
            .collect();
        sort_back_to_front(&mut records);
        assert!(records
            .windows(2)
            .all(|pair| pair[0].camera_distance >= pair[1].camera_distance));
    }
}
