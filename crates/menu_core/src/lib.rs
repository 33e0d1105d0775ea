//! Contextual action menu for the form entry screen.
//!
//! [`MenuController`] decides which menu items are visible for the loaded form session and runs
//! the side effects of an invoked item against injected collaborators. Hosts translate their
//! toolkit callbacks into `on_menu_created`/`refresh`/`invoke` calls.

use shared::domain::{Destination, ScreenAnswers, WarningKind};

pub mod config;
pub mod controller;
pub mod menu;
pub mod save_queue;
pub mod signals;

pub use config::{load_settings, MenuSettings};
pub use controller::{MenuController, MenuControllerBuilder};
pub use menu::{Menu, MenuItemState};

/// Read and navigation access to the form session currently being filled.
pub trait FormSession: Send + Sync {
    /// Whether the current position allows adding another instance of its repeat group.
    fn can_add_repeat(&self) -> bool;
    fn request_new_repeat_instance(&self);
    /// Translations declared by the form. Empty when the form is untranslated.
    fn languages(&self) -> Vec<String> {
        Vec::new()
    }
    fn uses_background_location(&self) -> bool {
        false
    }
}

/// Harvests the not yet persisted input of the visible screen.
pub trait AnswersProvider: Send + Sync {
    fn current_screen_answers(&self) -> ScreenAnswers;
}

/// Commits screen answers. Calls are fire-and-forget; no acknowledgment is returned.
pub trait SaveCoordinator: Send + Sync {
    fn save_answers_for_screen(&self, answers: ScreenAnswers);
}

pub trait RecordingGuard: Send + Sync {
    fn is_recording_active(&self) -> bool;
}

pub trait LocationTracking: Send + Sync {
    fn is_tracking_enabled(&self) -> bool;
    fn set_tracking_enabled(&self, enabled: bool);
}

/// Host side of the screen: navigation and dialogs.
pub trait HostNavigator: Send + Sync {
    fn navigate_to(&self, destination: Destination);
    fn show_warning(&self, warning: WarningKind);
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
