// Strong typing over strings. Newtypes for timestamps, geometry in screen pixels, tracker config.
// See DESIGN.md: Data Model

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;

/// Timestamp in milliseconds on the host's monotonic clock. Newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`. Zero if the clock went backwards.
    pub fn saturating_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn plus_millis(&self, ms: u64) -> Self {
        Timestamp(self.0.saturating_add(ms))
    }
}

/// Screen rectangle in absolute pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Rectangle anchored at the origin.
    pub fn sized(width: i32, height: i32) -> Self {
        Rect::new(0, 0, width, height)
    }

    /// Widened to i64 so extreme edges cannot overflow.
    pub fn width(&self) -> u64 {
        (self.right as i64 - self.left as i64).max(0) as u64
    }

    pub fn height(&self) -> u64 {
        (self.bottom as i64 - self.top as i64).max(0) as u64
    }

    pub fn area(&self) -> f64 {
        self.width() as f64 * self.height() as f64
    }
}

/// Kind of media the creative displays. Only video participates in playback tracking.
/// Parsed leniently: case-insensitive, `null` or empty means image, anything unknown is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase", from = "Option<String>")]
pub enum MediaType {
    #[default]
    Image,
    Video,
    Other,
}

impl MediaType {
    /// Creative payloads carry the media type as a free-form string; absent means image.
    pub fn from_creative_type(kind: Option<&str>) -> Self {
        match kind.map(str::trim) {
            None | Some("") => MediaType::Image,
            Some(k) if k.eq_ignore_ascii_case("image") => MediaType::Image,
            Some(k) if k.eq_ignore_ascii_case("video") => MediaType::Video,
            Some(_) => MediaType::Other,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, MediaType::Video)
    }
}

impl From<Option<String>> for MediaType {
    fn from(kind: Option<String>) -> Self {
        MediaType::from_creative_type(kind.as_deref())
    }
}

/// The displayed ad surface. Owned by the hosting widget; trackers only describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TrackedElement {
    pub width_px: u32,
    pub height_px: u32,
    #[serde(default)]
    pub media_type: MediaType,
}

impl TrackedElement {
    pub fn new(width_px: u32, height_px: u32, media_type: MediaType) -> Self {
        TrackedElement {
            width_px,
            height_px,
            media_type,
        }
    }
}

/// Standard slot dimensions in density-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdSize {
    pub width: u32,
    pub height: u32,
}

impl AdSize {
    pub const BANNER: AdSize = AdSize::new(320, 50);
    pub const LARGE_BANNER: AdSize = AdSize::new(320, 100);
    pub const MEDIUM_RECTANGLE: AdSize = AdSize::new(300, 250);
    pub const FULL_BANNER: AdSize = AdSize::new(468, 60);
    pub const LEADERBOARD: AdSize = AdSize::new(728, 90);
    pub const WIDE_SKYSCRAPER: AdSize = AdSize::new(160, 600);
    pub const INVALID: AdSize = AdSize::new(0, 0);

    pub const fn new(width: u32, height: u32) -> Self {
        AdSize { width, height }
    }

    /// Layout attribute index to preset. Unknown indices fall back to a banner.
    pub fn from_index(index: i32) -> Self {
        match index {
            1 => AdSize::LARGE_BANNER,
            2 => AdSize::MEDIUM_RECTANGLE,
            3 => AdSize::FULL_BANNER,
            4 => AdSize::LEADERBOARD,
            5 => AdSize::WIDE_SKYSCRAPER,
            _ => AdSize::BANNER,
        }
    }

    /// Pixel dimensions at the given display density.
    pub fn to_pixels(&self, density: f32) -> (u32, u32) {
        let scale = |dp: u32| {
            if dp == 0 {
                0
            } else {
                (dp as f32 * density) as u32
            }
        };
        (scale(self.width), scale(self.height))
    }
}

impl Default for AdSize {
    fn default() -> Self {
        AdSize::BANNER
    }
}

impl fmt::Display for AdSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fields attached to every analytics event for this ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdContext {
    #[serde(default)]
    pub meta_data: String,
    #[serde(default)]
    pub is_test_mode: bool,
}

impl AdContext {
    pub fn new(meta_data: impl Into<String>, is_test_mode: bool) -> Self {
        AdContext {
            meta_data: meta_data.into(),
            is_test_mode,
        }
    }
}

/// One geometry reading of the tracked element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct VisibilitySample {
    /// Portion of the element currently on screen. `None` when nothing of it is.
    pub visible_rect: Option<Rect>,
    pub total_width: u32,
    pub total_height: u32,
}

impl VisibilitySample {
    pub fn new(visible_rect: Option<Rect>, total_width: u32, total_height: u32) -> Self {
        VisibilitySample {
            visible_rect,
            total_width,
            total_height,
        }
    }

    pub fn offscreen(total_width: u32, total_height: u32) -> Self {
        VisibilitySample::new(None, total_width, total_height)
    }
}

/// Result of judging a sample against the viewability threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityDecision {
    pub is_visible: bool,
    pub ratio: f32,
}

/// A container in the element's ancestor chain, innermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ContainerNode {
    pub top_on_screen: i32,
    #[serde(default)]
    pub scroll_offset: i32,
    #[serde(default)]
    pub scrollable: bool,
}

/// Position of the ad relative to the scroll container that reveals it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub ad_top_on_screen: i32,
    pub container_top_on_screen: i32,
    pub scroll_offset: i32,
}

impl ScrollPosition {
    /// Distance the container had to scroll for the ad's top edge to reach its top.
    pub fn required_scroll(&self) -> i64 {
        self.ad_top_on_screen as i64 - self.container_top_on_screen as i64
    }
}

/// Tracker tuning. Defaults follow the industry viewability definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Minimum on-screen area fraction counted as visible (inclusive).
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
    /// Continuous visible time required for a viewable impression.
    #[serde(default = "default_min_view_time")]
    pub min_view_time_ms: u64,
    /// Dwell poll cadence.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_visibility_threshold() -> f32 {
    0.5
}

fn default_min_view_time() -> u64 {
    1000
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            visibility_threshold: default_visibility_threshold(),
            min_view_time_ms: default_min_view_time(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !(self.visibility_threshold > 0.0 && self.visibility_threshold <= 1.0) {
            return Err(TrackerError::InvalidConfig(format!(
                "visibility_threshold must be in (0, 1], got {}",
                self.visibility_threshold
            )));
        }
        if self.min_view_time_ms == 0 {
            return Err(TrackerError::InvalidConfig(
                "min_view_time_ms must be positive".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(TrackerError::InvalidConfig(
                "poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_arithmetic() {
        let start = Timestamp::from_millis(1_500);
        let later = start.plus_millis(250);
        assert_eq!(later.as_millis(), 1_750);
        assert_eq!(later.saturating_since(start), 250);
        assert_eq!(start.saturating_since(later), 0);
    }

    #[test]
    fn rect_dimensions_never_negative() {
        let rect = Rect::new(10, 10, 5, 40);
        assert_eq!(rect.width(), 0);
        assert_eq!(rect.height(), 30);
        assert_eq!(rect.area(), 0.0);
    }

    #[test]
    fn rect_dimensions_at_extreme_coordinates() {
        let rect = Rect::new(-2_000_000_000, i32::MIN, 2_000_000_000, i32::MAX);
        assert_eq!(rect.width(), 4_000_000_000);
        assert_eq!(rect.height(), u32::MAX as u64);
        assert_eq!(Rect::new(i32::MAX, 0, i32::MIN, 0).width(), 0);
        assert_eq!(rect.area(), 4_000_000_000.0 * u32::MAX as f64);
    }

    #[test]
    fn media_type_parsing() {
        assert_eq!(MediaType::from_creative_type(None), MediaType::Image);
        assert_eq!(MediaType::from_creative_type(Some("video")), MediaType::Video);
        assert_eq!(MediaType::from_creative_type(Some("VIDEO")), MediaType::Video);
        assert_eq!(MediaType::from_creative_type(Some("html5")), MediaType::Other);
    }

    #[test]
    fn media_type_deserializes_leniently() {
        let parse = |json: &str| serde_json::from_str::<TrackedElement>(json).unwrap().media_type;
        assert_eq!(parse(r#"{"width_px": 1, "height_px": 1}"#), MediaType::Image);
        assert_eq!(parse(r#"{"width_px": 1, "height_px": 1, "media_type": null}"#), MediaType::Image);
        assert_eq!(parse(r#"{"width_px": 1, "height_px": 1, "media_type": "VIDEO"}"#), MediaType::Video);
        assert_eq!(parse(r#"{"width_px": 1, "height_px": 1, "media_type": " video "}"#), MediaType::Video);
        assert_eq!(parse(r#"{"width_px": 1, "height_px": 1, "media_type": "html5"}"#), MediaType::Other);
        assert_eq!(serde_json::to_string(&MediaType::Video).unwrap(), r#""video""#);
    }

    #[test]
    fn ad_size_presets() {
        assert_eq!(AdSize::from_index(2), AdSize::MEDIUM_RECTANGLE);
        assert_eq!(AdSize::from_index(42), AdSize::BANNER);
        assert_eq!(AdSize::LEADERBOARD.to_string(), "728x90");
        assert_eq!(AdSize::BANNER.to_pixels(2.0), (640, 100));
        assert_eq!(AdSize::INVALID.to_pixels(3.0), (0, 0));
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let config: TrackerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TrackerConfig::default());
        assert_eq!(config.visibility_threshold, 0.5);
        assert_eq!(config.min_view_time_ms, 1000);
        assert_eq!(config.poll_interval_ms, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_bad_values() {
        let zero_poll = TrackerConfig {
            poll_interval_ms: 0,
            ..TrackerConfig::default()
        };
        assert!(zero_poll.validate().is_err());

        let bad_threshold = TrackerConfig {
            visibility_threshold: 1.5,
            ..TrackerConfig::default()
        };
        assert!(bad_threshold.validate().is_err());
    }

    #[test]
    fn required_scroll_from_positions() {
        let position = ScrollPosition {
            ad_top_on_screen: 900,
            container_top_on_screen: 100,
            scroll_offset: 0,
        };
        assert_eq!(position.required_scroll(), 800);
    }
}
