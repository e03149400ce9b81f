// Outbound interfaces: host listener callbacks and the analytics transport.

use serde::{Deserialize, Serialize};

use crate::event::AnalyticsEvent;

/// Host callbacks. Every method defaults to a no-op; override what you need.
pub trait AdListener {
    fn on_ad_loaded(&mut self) {}

    fn on_ad_impression(&mut self) {}

    fn on_ad_clicked(&mut self) {}

    fn on_ad_failed_to_load(&mut self, _reason: &str) {}

    fn on_ad_opened(&mut self) {}

    fn on_ad_closed(&mut self) {}
}

/// Listener that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl AdListener for NoopListener {}

impl<T: AdListener + ?Sized> AdListener for Box<T> {
    fn on_ad_loaded(&mut self) {
        (**self).on_ad_loaded()
    }

    fn on_ad_impression(&mut self) {
        (**self).on_ad_impression()
    }

    fn on_ad_clicked(&mut self) {
        (**self).on_ad_clicked()
    }

    fn on_ad_failed_to_load(&mut self, reason: &str) {
        (**self).on_ad_failed_to_load(reason)
    }

    fn on_ad_opened(&mut self) {
        (**self).on_ad_opened()
    }

    fn on_ad_closed(&mut self) {
        (**self).on_ad_closed()
    }
}

/// Receives built analytics events (network transport lives outside this crate).
pub trait AnalyticsSink {
    fn send(&mut self, event: AnalyticsEvent);
}

impl AnalyticsSink for Vec<AnalyticsEvent> {
    fn send(&mut self, event: AnalyticsEvent) {
        self.push(event);
    }
}

impl<T: AnalyticsSink + ?Sized> AnalyticsSink for Box<T> {
    fn send(&mut self, event: AnalyticsEvent) {
        (**self).send(event)
    }
}

/// A listener callback, recorded as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "callback", rename_all = "snake_case")]
pub enum AdNotification {
    AdLoaded,
    AdImpression,
    AdClicked,
    AdFailedToLoad { reason: String },
    AdOpened,
    AdClosed,
}

/// Records listener callbacks in call order.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    notifications: Vec<AdNotification>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> &[AdNotification] {
        &self.notifications
    }

    pub fn count(&self, notification: &AdNotification) -> usize {
        self.notifications.iter().filter(|n| *n == notification).count()
    }

    /// Removes and returns everything recorded so far.
    pub fn drain(&mut self) -> Vec<AdNotification> {
        std::mem::take(&mut self.notifications)
    }
}

impl AdListener for NotificationLog {
    fn on_ad_loaded(&mut self) {
        self.notifications.push(AdNotification::AdLoaded);
    }

    fn on_ad_impression(&mut self) {
        self.notifications.push(AdNotification::AdImpression);
    }

    fn on_ad_clicked(&mut self) {
        self.notifications.push(AdNotification::AdClicked);
    }

    fn on_ad_failed_to_load(&mut self, reason: &str) {
        self.notifications.push(AdNotification::AdFailedToLoad {
            reason: reason.to_string(),
        });
    }

    fn on_ad_opened(&mut self) {
        self.notifications.push(AdNotification::AdOpened);
    }

    fn on_ad_closed(&mut self) {
        self.notifications.push(AdNotification::AdClosed);
    }
}
