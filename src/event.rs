// Analytics event model. A closed set of event kinds, each carrying only its own fields.
// Wire shape is a flat record: metaData, isTestMode, type, plus the kind's fields.

use serde::{Deserialize, Serialize};

use crate::error::TrackerError;
use crate::types::AdContext;

/// Type-specific payload of an analytics event. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventKind {
    /// Creative rendered successfully.
    #[serde(rename = "IMPRESSION", rename_all = "camelCase")]
    Impression { render_time: u64 },

    /// Continuous dwell threshold reached.
    #[serde(rename = "VIEW", rename_all = "camelCase")]
    ViewableImpression {
        time_to_visible: u64,
        scroll_depth: f32,
        visibility_ratio: f32,
        view_time: u64,
    },

    #[serde(rename = "CLICK")]
    Click,

    #[serde(rename = "TOTAL_VIEW_TIME", rename_all = "camelCase")]
    TotalViewTime { total_view_time: u64 },

    #[serde(rename = "TOTAL_PLAYBACK_TIME", rename_all = "camelCase")]
    TotalPlaybackTime { total_playback_time: u64 },
}

impl EventKind {
    /// Wire name of the kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::Impression { .. } => "IMPRESSION",
            EventKind::ViewableImpression { .. } => "VIEW",
            EventKind::Click => "CLICK",
            EventKind::TotalViewTime { .. } => "TOTAL_VIEW_TIME",
            EventKind::TotalPlaybackTime { .. } => "TOTAL_PLAYBACK_TIME",
        }
    }
}

/// A built analytics event. Immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    meta_data: String,
    is_test_mode: bool,
    #[serde(flatten)]
    kind: EventKind,
}

impl AnalyticsEvent {
    pub fn new(context: &AdContext, kind: EventKind) -> Self {
        AnalyticsEvent {
            meta_data: context.meta_data.clone(),
            is_test_mode: context.is_test_mode,
            kind,
        }
    }

    pub fn meta_data(&self) -> &str {
        &self.meta_data
    }

    pub fn is_test_mode(&self) -> bool {
        self.is_test_mode
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    /// Flat key-value record for the transport.
    pub fn to_record(&self) -> Result<serde_json::Value, TrackerError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Measurements attached to a viewable impression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewableMetrics {
    pub time_to_visible_ms: u64,
    pub scroll_depth: f32,
    pub visibility_ratio: f32,
    pub view_time_ms: u64,
}

/// Builds events for one ad. Gating is the caller's job; the emitter only constructs.
#[derive(Debug, Clone)]
pub struct EventEmitter {
    context: AdContext,
}

impl EventEmitter {
    pub fn new(context: AdContext) -> Self {
        EventEmitter { context }
    }

    pub fn context(&self) -> &AdContext {
        &self.context
    }

    pub fn impression(&self, render_time_ms: u64) -> AnalyticsEvent {
        self.build(EventKind::Impression {
            render_time: render_time_ms,
        })
    }

    pub fn viewable_impression(&self, metrics: ViewableMetrics) -> AnalyticsEvent {
        self.build(EventKind::ViewableImpression {
            time_to_visible: metrics.time_to_visible_ms,
            scroll_depth: metrics.scroll_depth,
            visibility_ratio: metrics.visibility_ratio,
            view_time: metrics.view_time_ms,
        })
    }

    pub fn click(&self) -> AnalyticsEvent {
        self.build(EventKind::Click)
    }

    /// `None` when nothing was viewed.
    pub fn total_view_time(&self, total_ms: u64) -> Option<AnalyticsEvent> {
        (total_ms > 0).then(|| {
            self.build(EventKind::TotalViewTime {
                total_view_time: total_ms,
            })
        })
    }

    /// `None` when nothing was played.
    pub fn total_playback_time(&self, total_ms: u64) -> Option<AnalyticsEvent> {
        (total_ms > 0).then(|| {
            self.build(EventKind::TotalPlaybackTime {
                total_playback_time: total_ms,
            })
        })
    }

    fn build(&self, kind: EventKind) -> AnalyticsEvent {
        AnalyticsEvent::new(&self.context, kind)
    }
}
