// viewability_core: ad viewability and engagement tracking engine.
// Native hosts drive `AdTracker` directly; JS hosts use the batch facade below.

mod bridge;
mod clock;
mod error;
mod event;
mod geometry;
mod latch;
mod lifecycle;
mod listener;
mod playback;
mod poll;
mod scroll;
mod signal;
mod types;
mod visibility;

use wasm_bindgen::prelude::*;

pub use bridge::{parse_render_status, parse_video_status, BridgeMessage, VideoStatus};
pub use clock::{DwellReached, EngagementClock, ViewSession};
pub use error::TrackerError;
pub use event::{AnalyticsEvent, EventEmitter, EventKind, ViewableMetrics};
pub use geometry::{GeometryQuery, GeometrySnapshot};
pub use latch::Latch;
pub use lifecycle::AdTracker;
pub use listener::{AdListener, AdNotification, AnalyticsSink, NoopListener, NotificationLog};
pub use playback::{PlaybackState, PlaybackTracker};
pub use poll::RepeatingPoll;
pub use scroll::{find_root_scroll_container, scroll_depth};
pub use signal::{Signal, SignalBatch, TimedSignal, TrackerInit, TrackerOutput};
pub use types::*;
pub use visibility::VisibilityTracker;

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_error(context: &str, err: impl std::fmt::Display) -> JsValue {
    js_sys::Error::new(&format!("{}: {}", context, err)).into()
}

/// Tracker interface exposed to JavaScript.
/// Batch interface to minimize JS↔WASM crossings.
#[wasm_bindgen]
pub struct WasmAdTracker {
    tracker: AdTracker<Vec<AnalyticsEvent>, NotificationLog>,
    last_geometry: GeometrySnapshot,
}

#[wasm_bindgen]
impl WasmAdTracker {
    #[wasm_bindgen(constructor)]
    pub fn new(init_json: &str) -> Result<WasmAdTracker, JsValue> {
        let init: TrackerInit =
            serde_json::from_str(init_json).map_err(|e| js_error("Invalid tracker init", e))?;

        let tracker = AdTracker::new(
            init.element,
            init.context,
            init.config,
            init.now_ms,
            Vec::new(),
            NotificationLog::new(),
        )
        .map_err(|e| js_error("Invalid tracker init", e))?;

        Ok(WasmAdTracker {
            tracker,
            last_geometry: GeometrySnapshot::default(),
        })
    }

    /// Apply a batch of timestamped signals and return what they produced.
    /// Returns JSON `{ events: [...], notifications: [...] }`.
    pub fn process_signals(&mut self, signals_json: &str) -> Result<String, JsValue> {
        let batch: SignalBatch =
            serde_json::from_str(signals_json).map_err(|e| js_error("Invalid signals", e))?;

        for timed in batch.signals {
            self.dispatch(timed);
        }

        let output = TrackerOutput {
            events: std::mem::take(self.tracker.sink_mut()),
            notifications: self.tracker.listener_mut().drain(),
        };

        serde_json::to_string(&output).map_err(|e| js_error("Serialization error", e))
    }

    pub fn total_view_time_ms(&self) -> u64 {
        self.tracker.total_view_time_ms()
    }

    pub fn total_playback_time_ms(&self) -> u64 {
        self.tracker.total_playback_time_ms()
    }

    pub fn is_visible(&self) -> bool {
        self.tracker.is_visible()
    }

    pub fn is_destroyed(&self) -> bool {
        self.tracker.is_destroyed()
    }
}

impl WasmAdTracker {
    fn dispatch(&mut self, timed: TimedSignal) {
        let now = timed.at;
        match timed.signal {
            Signal::Start { geometry } => {
                self.tracker.start(now, &geometry);
                self.last_geometry = geometry;
            }
            Signal::Geometry { geometry } => {
                self.tracker.on_geometry_changed(now, &geometry);
                self.last_geometry = geometry;
            }
            Signal::Focus {
                has_focus,
                geometry,
            } => {
                self.tracker.on_focus_changed(now, has_focus, &geometry);
                self.last_geometry = geometry;
            }
            Signal::Tick { geometry } => {
                if let Some(geometry) = geometry {
                    self.last_geometry = geometry;
                }
                self.tracker.tick(now, &self.last_geometry);
            }
            Signal::RenderMessage { payload } => self.tracker.on_render_message(now, &payload),
            Signal::VideoMessage { payload } => self.tracker.on_video_message(now, &payload),
            Signal::Click => self.tracker.on_click(),
            Signal::CreativeRendered => self.tracker.on_creative_rendered(),
            Signal::LoadFailed { reason } => self.tracker.on_load_failed(&reason),
            Signal::Destroy => self.tracker.destroy(now),
        }
    }
}
