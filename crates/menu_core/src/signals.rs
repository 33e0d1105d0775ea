//! Adapters from live state sources to the read-latest-value traits the controller consumes.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::watch;

use crate::{LocationTracking, RecordingGuard};

/// Creates a recording flag. The recording subsystem owns the sender; the guard only reads.
pub fn recording_signal(initial: bool) -> (watch::Sender<bool>, WatchRecordingGuard) {
    let (tx, rx) = watch::channel(initial);
    (tx, WatchRecordingGuard { rx })
}

#[derive(Clone)]
pub struct WatchRecordingGuard {
    rx: watch::Receiver<bool>,
}

impl RecordingGuard for WatchRecordingGuard {
    fn is_recording_active(&self) -> bool {
        // A dropped sender keeps its last value, which is what the guard should act on.
        *self.rx.borrow()
    }
}

#[derive(Debug, Default)]
pub struct SharedLocationTracking {
    enabled: AtomicBool,
}

impl SharedLocationTracking {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }
}

impl LocationTracking for SharedLocationTracking {
    fn is_tracking_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn set_tracking_enabled(&self, enabled: bool) {
        let previous = self.enabled.swap(enabled, Ordering::AcqRel);
        if previous != enabled {
            tracing::info!(enabled, "background location tracking preference changed");
        }
    }
}
