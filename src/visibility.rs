// Visibility decision from a geometry sample: intersection area over total area against a threshold.

use crate::types::*;

/// Judges geometry samples against the viewability threshold. Stateless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityTracker {
    threshold: f32,
}

impl VisibilityTracker {
    pub fn new(threshold: f32) -> Self {
        VisibilityTracker { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Returns `None` while layout has not settled (zero-sized element); the
    /// caller keeps its prior state in that case.
    pub fn sample(&self, sample: &VisibilitySample) -> Option<VisibilityDecision> {
        if sample.total_width == 0 || sample.total_height == 0 {
            return None;
        }

        let Some(visible) = sample.visible_rect else {
            return Some(VisibilityDecision {
                is_visible: false,
                ratio: 0.0,
            });
        };

        let total_area = sample.total_width as f64 * sample.total_height as f64;
        let ratio = (visible.area() / total_area).clamp(0.0, 1.0);

        // Compare in f64, before narrowing the reported ratio.
        Some(VisibilityDecision {
            is_visible: ratio >= self.threshold as f64,
            ratio: ratio as f32,
        })
    }
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        VisibilityTracker::new(TrackerConfig::default().visibility_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn zero_sized_element_gives_no_decision() {
        let tracker = VisibilityTracker::default();
        let sample = VisibilitySample::new(Some(Rect::sized(10, 10)), 0, 250);
        assert_eq!(tracker.sample(&sample), None);
        let sample = VisibilitySample::new(Some(Rect::sized(10, 10)), 300, 0);
        assert_eq!(tracker.sample(&sample), None);
    }

    #[test]
    fn offscreen_is_not_visible() {
        let tracker = VisibilityTracker::default();
        let decision = tracker.sample(&VisibilitySample::offscreen(300, 250)).unwrap();
        assert!(!decision.is_visible);
        assert_eq!(decision.ratio, 0.0);
    }

    #[test]
    fn half_visible_counts() {
        let tracker = VisibilityTracker::default();
        // 100 x 50 of a 100 x 100 element.
        let sample = VisibilitySample::new(Some(Rect::new(0, 50, 100, 100)), 100, 100);
        let decision = tracker.sample(&sample).unwrap();
        assert_eq!(decision.ratio, 0.5);
        assert!(decision.is_visible);
    }

    #[test]
    fn just_under_half_does_not_count() {
        let tracker = VisibilityTracker::default();
        let sample = VisibilitySample::new(Some(Rect::sized(100, 49)), 100, 100);
        let decision = tracker.sample(&sample).unwrap();
        assert!(!decision.is_visible);
        assert!((decision.ratio - 0.49).abs() < 1e-6);
    }

    #[test]
    fn near_miss_on_large_element_does_not_round_up() {
        let tracker = VisibilityTracker::default();
        // 1e8 px total, visible area one pixel short of half.
        let sample = VisibilitySample::new(Some(Rect::sized(1, 49_999_999)), 1, 100_000_000);
        let decision = tracker.sample(&sample).unwrap();
        assert_eq!(decision.ratio, 0.5);
        assert!(!decision.is_visible);
    }

    #[test]
    fn oversized_rect_clamps_to_one() {
        let tracker = VisibilityTracker::default();
        let sample = VisibilitySample::new(Some(Rect::sized(400, 400)), 100, 100);
        assert_eq!(tracker.sample(&sample).unwrap().ratio, 1.0);
    }

    mod property_tests {
        use super::*;

        proptest! {
            /// Visibility is exactly `ratio >= threshold`, and the ratio stays in [0, 1].
            #[test]
            fn visible_iff_ratio_meets_threshold(
                total_w in 1u32..2_000,
                total_h in 1u32..2_000,
                visible_w in 0i32..2_500,
                visible_h in 0i32..2_500
            ) {
                let tracker = VisibilityTracker::default();
                let sample = VisibilitySample::new(
                    Some(Rect::sized(visible_w, visible_h)),
                    total_w,
                    total_h,
                );
                let decision = tracker.sample(&sample).unwrap();
                let exact = visible_w as f64 * visible_h as f64 / (total_w as f64 * total_h as f64);
                prop_assert!((0.0..=1.0).contains(&decision.ratio));
                prop_assert_eq!(decision.is_visible, exact >= 0.5);
            }
        }
    }
}
