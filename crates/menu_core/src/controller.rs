//! Menu controller: item visibility per refresh and side-effect ordering per invoked item.

use std::sync::Arc;

use shared::{
    domain::{ActionOutcome, Destination, IgnoreReason, MenuItemId, WarningKind},
    error::MenuError,
};
use tracing::{debug, info};

use crate::{
    menu::{Menu, MenuItemState},
    AnswersProvider, FormSession, HostNavigator, LocationTracking, MenuSettings, RecordingGuard,
    SaveCoordinator,
};

pub struct MenuController {
    settings: MenuSettings,
    session: Option<Arc<dyn FormSession>>,
    answers: Arc<dyn AnswersProvider>,
    saver: Arc<dyn SaveCoordinator>,
    recording: Arc<dyn RecordingGuard>,
    location: Option<Arc<dyn LocationTracking>>,
    navigator: Arc<dyn HostNavigator>,
}

impl MenuController {
    pub fn builder() -> MenuControllerBuilder {
        MenuControllerBuilder::default()
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Replaces the session handle. `None` marks a failed or absent load; visibility only changes
    /// on the next [`refresh`](Self::refresh).
    pub fn attach_session(&mut self, session: Option<Arc<dyn FormSession>>) {
        debug!(loaded = session.is_some(), "form session attached to menu");
        self.session = session;
    }

    /// Populates every item once. Session dependent items start hidden.
    pub fn on_menu_created(&self, menu: &mut Menu) {
        menu.clear();
        for item in MenuItemId::ALL {
            let state = match item {
                MenuItemId::GoTo if self.settings.show_go_to => MenuItemState::shown(),
                MenuItemId::Preferences if self.settings.show_preferences => {
                    MenuItemState::shown()
                }
                _ => MenuItemState::hidden(),
            };
            menu.insert(item, state);
        }
    }

    /// Recomputes visibility from the live session. Idempotent for unchanged state.
    pub fn refresh(&self, menu: &mut Menu) {
        let session = self.session.as_deref();

        menu.set_visible(
            MenuItemId::AddRepeat,
            session.is_some_and(|session| session.can_add_repeat()),
        );
        menu.set_visible(MenuItemId::GoTo, self.settings.show_go_to);
        menu.set_visible(MenuItemId::Preferences, self.settings.show_preferences);
        menu.set_visible(
            MenuItemId::ChangeLanguage,
            session.is_some_and(|session| session.languages().len() > 1),
        );

        match (session, self.location.as_deref()) {
            (Some(session), Some(location)) if session.uses_background_location() => {
                menu.set_visible(MenuItemId::TrackLocation, true);
                menu.set_checked(
                    MenuItemId::TrackLocation,
                    Some(location.is_tracking_enabled()),
                );
            }
            _ => {
                menu.set_visible(MenuItemId::TrackLocation, false);
                menu.set_checked(MenuItemId::TrackLocation, None);
            }
        }
    }

    pub fn invoke(&self, item: MenuItemId) -> ActionOutcome {
        let outcome = match item {
            MenuItemId::AddRepeat => self.add_repeat(),
            MenuItemId::Preferences => self.open_preferences(),
            MenuItemId::GoTo => self.go_to(),
            MenuItemId::ChangeLanguage => self.change_language(),
            MenuItemId::TrackLocation => self.toggle_location_tracking(),
        };
        info!(item = %item, outcome = ?outcome, "menu action handled");
        outcome
    }

    fn add_repeat(&self) -> ActionOutcome {
        let Some(session) = self.session.as_deref() else {
            return ActionOutcome::Ignored(IgnoreReason::NoSessionLoaded);
        };

        // Answers must be handed to the saver before the screen position moves.
        let answers = self.answers.current_screen_answers();
        debug!(answers = answers.len(), "saving screen answers before adding repeat");
        self.saver.save_answers_for_screen(answers);
        session.request_new_repeat_instance();
        ActionOutcome::RepeatRequested
    }

    fn open_preferences(&self) -> ActionOutcome {
        if !self.settings.show_preferences {
            return ActionOutcome::Ignored(IgnoreReason::ItemUnavailable);
        }
        self.navigate_unless_recording(Destination::Preferences)
    }

    fn go_to(&self) -> ActionOutcome {
        if !self.settings.show_go_to {
            return ActionOutcome::Ignored(IgnoreReason::ItemUnavailable);
        }
        self.navigator.navigate_to(Destination::Hierarchy);
        ActionOutcome::Navigated(Destination::Hierarchy)
    }

    fn change_language(&self) -> ActionOutcome {
        if self.session.is_none() {
            return ActionOutcome::Ignored(IgnoreReason::NoSessionLoaded);
        }
        self.navigator.navigate_to(Destination::LanguagePicker);
        ActionOutcome::Navigated(Destination::LanguagePicker)
    }

    /// Mirrors the refresh rule: only forms that ask for background location can toggle it.
    fn toggle_location_tracking(&self) -> ActionOutcome {
        let Some(session) = self.session.as_deref() else {
            return ActionOutcome::Ignored(IgnoreReason::NoSessionLoaded);
        };
        let Some(location) = self.location.as_deref() else {
            return ActionOutcome::Ignored(IgnoreReason::ItemUnavailable);
        };
        if !session.uses_background_location() {
            return ActionOutcome::Ignored(IgnoreReason::ItemUnavailable);
        }

        let enabled = !location.is_tracking_enabled();
        location.set_tracking_enabled(enabled);
        ActionOutcome::LocationToggled { enabled }
    }

    /// The recording flag is read once, strictly before any navigation starts. An active
    /// recording is never cancelled here; the user has to stop it and retry.
    fn navigate_unless_recording(&self, destination: Destination) -> ActionOutcome {
        if self.recording.is_recording_active() {
            self.navigator.show_warning(WarningKind::RecordingInProgress);
            return ActionOutcome::WarningShown(WarningKind::RecordingInProgress);
        }
        self.navigator.navigate_to(destination);
        ActionOutcome::Navigated(destination)
    }
}

#[derive(Default)]
pub struct MenuControllerBuilder {
    settings: MenuSettings,
    answers: Option<Arc<dyn AnswersProvider>>,
    saver: Option<Arc<dyn SaveCoordinator>>,
    recording: Option<Arc<dyn RecordingGuard>>,
    location: Option<Arc<dyn LocationTracking>>,
    navigator: Option<Arc<dyn HostNavigator>>,
}

impl MenuControllerBuilder {
    pub fn settings(mut self, settings: MenuSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn answers_provider(mut self, answers: Arc<dyn AnswersProvider>) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn save_coordinator(mut self, saver: Arc<dyn SaveCoordinator>) -> Self {
        self.saver = Some(saver);
        self
    }

    pub fn recording_guard(mut self, recording: Arc<dyn RecordingGuard>) -> Self {
        self.recording = Some(recording);
        self
    }

    /// Optional. Without it the location tracking item stays hidden.
    pub fn location_tracking(mut self, location: Arc<dyn LocationTracking>) -> Self {
        self.location = Some(location);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn HostNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Fails when a required collaborator was never wired. The controller starts without a
    /// session.
    pub fn build(self) -> Result<MenuController, MenuError> {
        Ok(MenuController {
            settings: self.settings,
            session: None,
            answers: self
                .answers
                .ok_or(MenuError::MissingCollaborator("answers provider"))?,
            saver: self
                .saver
                .ok_or(MenuError::MissingCollaborator("save coordinator"))?,
            recording: self
                .recording
                .ok_or(MenuError::MissingCollaborator("recording guard"))?,
            location: self.location,
            navigator: self
                .navigator
                .ok_or(MenuError::MissingCollaborator("navigator"))?,
        })
    }
}
