// Batch signal format for the JS side (minimizes JS↔WASM crossings).

use serde::{Deserialize, Serialize};

use crate::event::AnalyticsEvent;
use crate::geometry::GeometrySnapshot;
use crate::listener::AdNotification;
use crate::types::*;

/// Everything needed to build a tracker from JS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerInit {
    pub element: TrackedElement,
    #[serde(default)]
    pub context: AdContext,
    #[serde(default)]
    pub config: TrackerConfig,
    /// Render start on the host clock.
    pub now_ms: Timestamp,
}

/// Inbound signal for one tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Signal {
    /// Widget attached; register observers.
    Start { geometry: GeometrySnapshot },
    /// Container scrolled or layout changed.
    Geometry { geometry: GeometrySnapshot },
    Focus {
        has_focus: bool,
        geometry: GeometrySnapshot,
    },
    /// Poll tick. Without geometry the last reported geometry is used.
    Tick {
        #[serde(default)]
        geometry: Option<GeometrySnapshot>,
    },
    RenderMessage { payload: String },
    VideoMessage { payload: String },
    Click,
    CreativeRendered,
    LoadFailed { reason: String },
    Destroy,
}

/// A signal stamped with the host clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedSignal {
    #[serde(rename = "at_ms")]
    pub at: Timestamp,
    #[serde(flatten)]
    pub signal: Signal,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignalBatch {
    pub signals: Vec<TimedSignal>,
}

/// Events and callbacks produced while processing one batch.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerOutput {
    pub events: Vec<AnalyticsEvent>,
    pub notifications: Vec<AdNotification>,
}
