use super::*;

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use shared::{
    domain::{ActionOutcome, IgnoreReason, MenuItemId},
    error::MenuError,
};

use crate::signals::{recording_signal, SharedLocationTracking};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    AnswersRequested,
    Saved(ScreenAnswers),
    NewRepeatRequested,
    Navigated(Destination),
    Warned(WarningKind),
}

type CallLog = Arc<Mutex<Vec<Call>>>;

fn calls(log: &CallLog) -> Vec<Call> {
    log.lock().expect("call log").clone()
}

struct TestSession {
    can_add_repeat: AtomicBool,
    languages: Vec<String>,
    uses_background_location: bool,
    log: CallLog,
}

impl TestSession {
    fn new(can_add_repeat: bool, log: &CallLog) -> Self {
        Self {
            can_add_repeat: AtomicBool::new(can_add_repeat),
            languages: Vec::new(),
            uses_background_location: false,
            log: log.clone(),
        }
    }

    fn with_languages(mut self, languages: &[&str]) -> Self {
        self.languages = languages.iter().map(|l| l.to_string()).collect();
        self
    }

    fn with_background_location(mut self) -> Self {
        self.uses_background_location = true;
        self
    }
}

impl FormSession for TestSession {
    fn can_add_repeat(&self) -> bool {
        self.can_add_repeat.load(Ordering::SeqCst)
    }

    fn request_new_repeat_instance(&self) {
        self.log
            .lock()
            .expect("call log")
            .push(Call::NewRepeatRequested);
    }

    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn uses_background_location(&self) -> bool {
        self.uses_background_location
    }
}

struct TestAnswers {
    answers: Mutex<ScreenAnswers>,
    log: CallLog,
}

impl AnswersProvider for TestAnswers {
    fn current_screen_answers(&self) -> ScreenAnswers {
        self.log
            .lock()
            .expect("call log")
            .push(Call::AnswersRequested);
        self.answers.lock().expect("answers").clone()
    }
}

struct TestSaver {
    log: CallLog,
}

impl SaveCoordinator for TestSaver {
    fn save_answers_for_screen(&self, answers: ScreenAnswers) {
        self.log.lock().expect("call log").push(Call::Saved(answers));
    }
}

struct TestNavigator {
    log: CallLog,
}

impl HostNavigator for TestNavigator {
    fn navigate_to(&self, destination: Destination) {
        self.log
            .lock()
            .expect("call log")
            .push(Call::Navigated(destination));
    }

    fn show_warning(&self, warning: WarningKind) {
        self.log.lock().expect("call log").push(Call::Warned(warning));
    }
}

struct Harness {
    controller: MenuController,
    log: CallLog,
    answers: Arc<TestAnswers>,
    recording: tokio::sync::watch::Sender<bool>,
    location: Arc<SharedLocationTracking>,
}

impl Harness {
    fn new() -> Self {
        Self::with_settings(MenuSettings::default())
    }

    fn with_settings(settings: MenuSettings) -> Self {
        let log: CallLog = Arc::new(Mutex::new(Vec::new()));
        let answers = Arc::new(TestAnswers {
            answers: Mutex::new(ScreenAnswers::new()),
            log: log.clone(),
        });
        let (recording, guard) = recording_signal(false);
        let location = Arc::new(SharedLocationTracking::new(false));

        let controller = MenuController::builder()
            .settings(settings)
            .answers_provider(answers.clone())
            .save_coordinator(Arc::new(TestSaver { log: log.clone() }))
            .recording_guard(Arc::new(guard))
            .location_tracking(location.clone())
            .navigator(Arc::new(TestNavigator { log: log.clone() }))
            .build()
            .expect("controller");

        Self {
            controller,
            log,
            answers,
            recording,
            location,
        }
    }

    fn attach(&mut self, session: TestSession) -> Arc<TestSession> {
        let session = Arc::new(session);
        self.controller.attach_session(Some(session.clone()));
        session
    }

    fn set_answers(&self, pairs: &[(&str, &str)]) {
        *self.answers.answers.lock().expect("answers") =
            pairs.iter().map(|(q, v)| (*q, *v)).collect();
    }

    fn prepared_menu(&self) -> Menu {
        let mut menu = Menu::new();
        self.controller.on_menu_created(&mut menu);
        self.controller.refresh(&mut menu);
        menu
    }
}

#[test]
fn refresh_shows_add_repeat_when_session_can_add_repeat() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(true, &log));

    let menu = harness.prepared_menu();
    assert!(menu.is_visible(MenuItemId::AddRepeat));
    assert!(menu.item(MenuItemId::AddRepeat).expect("item").enabled);
}

#[test]
fn refresh_hides_add_repeat_outside_repeat() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(false, &log));

    let menu = harness.prepared_menu();
    assert!(!menu.is_visible(MenuItemId::AddRepeat));
    assert!(!menu.item(MenuItemId::AddRepeat).expect("item").enabled);
}

#[test]
fn refresh_hides_session_items_without_session() {
    let mut harness = Harness::new();
    harness.controller.attach_session(None);

    let menu = harness.prepared_menu();
    assert!(!menu.is_visible(MenuItemId::AddRepeat));
    assert!(!menu.is_visible(MenuItemId::ChangeLanguage));
    assert!(!menu.is_visible(MenuItemId::TrackLocation));
    assert!(menu.is_visible(MenuItemId::GoTo));
    assert!(menu.is_visible(MenuItemId::Preferences));
}

#[test]
fn refresh_follows_live_session_state() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    let session = harness.attach(TestSession::new(false, &log));

    let mut menu = harness.prepared_menu();
    assert!(!menu.is_visible(MenuItemId::AddRepeat));

    session.can_add_repeat.store(true, Ordering::SeqCst);
    harness.controller.refresh(&mut menu);
    assert!(menu.is_visible(MenuItemId::AddRepeat));

    session.can_add_repeat.store(false, Ordering::SeqCst);
    harness.controller.refresh(&mut menu);
    assert!(!menu.is_visible(MenuItemId::AddRepeat));
}

#[test]
fn refresh_after_session_load_failure_hides_add_repeat() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(true, &log));
    let mut menu = harness.prepared_menu();
    assert!(menu.is_visible(MenuItemId::AddRepeat));

    harness.controller.attach_session(None);
    assert!(
        menu.is_visible(MenuItemId::AddRepeat),
        "attaching does not touch the menu until the next refresh"
    );

    harness.controller.refresh(&mut menu);
    assert!(!menu.is_visible(MenuItemId::AddRepeat));
}

#[test]
fn refresh_is_idempotent() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(
        TestSession::new(true, &log)
            .with_languages(&["en", "fr"])
            .with_background_location(),
    );

    let mut menu = harness.prepared_menu();
    let first = menu.clone();
    harness.controller.refresh(&mut menu);
    assert_eq!(menu, first);
    assert!(calls(&log).is_empty(), "refresh must not invoke actions");
}

#[test]
fn menu_created_populates_every_item() {
    let harness = Harness::new();
    let mut menu = Menu::new();
    harness.controller.on_menu_created(&mut menu);

    assert_eq!(menu.iter().count(), MenuItemId::ALL.len());
    assert!(!menu.is_visible(MenuItemId::AddRepeat));
    assert!(menu.is_visible(MenuItemId::GoTo));
    assert!(menu.is_visible(MenuItemId::Preferences));
}

#[test]
fn add_repeat_saves_screen_answers_before_requesting_repeat() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(true, &log));
    harness.set_answers(&[("q1", "5")]);

    let outcome = harness.controller.invoke(MenuItemId::AddRepeat);

    assert_eq!(outcome, ActionOutcome::RepeatRequested);
    let expected: ScreenAnswers = [("q1", "5")].into_iter().collect();
    assert_eq!(
        calls(&log),
        vec![
            Call::AnswersRequested,
            Call::Saved(expected),
            Call::NewRepeatRequested,
        ]
    );
}

#[test]
fn add_repeat_captures_answers_at_invocation_time() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(true, &log));
    harness.set_answers(&[("q1", "5")]);
    let _menu = harness.prepared_menu();

    harness.set_answers(&[("q1", "7"), ("q2", "late")]);
    harness.controller.invoke(MenuItemId::AddRepeat);

    let expected: ScreenAnswers = [("q1", "7"), ("q2", "late")].into_iter().collect();
    assert!(calls(&log).contains(&Call::Saved(expected)));
}

#[test]
fn add_repeat_saves_empty_screen() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(true, &log));

    harness.controller.invoke(MenuItemId::AddRepeat);

    assert_eq!(
        calls(&log),
        vec![
            Call::AnswersRequested,
            Call::Saved(ScreenAnswers::new()),
            Call::NewRepeatRequested,
        ]
    );
}

#[test]
fn add_repeat_without_session_does_nothing() {
    let harness = Harness::new();
    harness.set_answers(&[("q1", "5")]);

    let outcome = harness.controller.invoke(MenuItemId::AddRepeat);

    assert_eq!(outcome, ActionOutcome::Ignored(IgnoreReason::NoSessionLoaded));
    assert!(calls(&harness.log).is_empty());
}

#[test]
fn preferences_while_recording_shows_warning_once() {
    let harness = Harness::new();
    harness.recording.send_replace(true);

    let outcome = harness.controller.invoke(MenuItemId::Preferences);

    assert_eq!(
        outcome,
        ActionOutcome::WarningShown(WarningKind::RecordingInProgress)
    );
    assert_eq!(
        calls(&harness.log),
        vec![Call::Warned(WarningKind::RecordingInProgress)]
    );
}

#[test]
fn preferences_without_recording_navigates() {
    let harness = Harness::new();

    let outcome = harness.controller.invoke(MenuItemId::Preferences);

    assert_eq!(outcome, ActionOutcome::Navigated(Destination::Preferences));
    assert_eq!(
        calls(&harness.log),
        vec![Call::Navigated(Destination::Preferences)]
    );
}

#[test]
fn preferences_retry_after_recording_stops_navigates() {
    let harness = Harness::new();
    harness.recording.send_replace(true);
    harness.controller.invoke(MenuItemId::Preferences);

    harness.recording.send_replace(false);
    harness.controller.invoke(MenuItemId::Preferences);

    assert_eq!(
        calls(&harness.log),
        vec![
            Call::Warned(WarningKind::RecordingInProgress),
            Call::Navigated(Destination::Preferences),
        ]
    );
    assert!(
        !*harness.recording.borrow(),
        "the controller never changes the recording flag"
    );
}

#[test]
fn preferences_work_without_session() {
    let mut harness = Harness::new();
    harness.controller.attach_session(None);

    assert_eq!(
        harness.controller.invoke(MenuItemId::Preferences),
        ActionOutcome::Navigated(Destination::Preferences)
    );
}

#[test]
fn go_to_passes_through_even_while_recording() {
    let harness = Harness::new();
    harness.recording.send_replace(true);

    let outcome = harness.controller.invoke(MenuItemId::GoTo);

    assert_eq!(outcome, ActionOutcome::Navigated(Destination::Hierarchy));
    assert_eq!(
        calls(&harness.log),
        vec![Call::Navigated(Destination::Hierarchy)]
    );
}

#[test]
fn disabled_items_are_hidden_and_ignored() {
    let harness = Harness::with_settings(MenuSettings {
        show_go_to: false,
        show_preferences: false,
        ..MenuSettings::default()
    });

    let menu = harness.prepared_menu();
    assert!(!menu.is_visible(MenuItemId::GoTo));
    assert!(!menu.is_visible(MenuItemId::Preferences));

    assert_eq!(
        harness.controller.invoke(MenuItemId::GoTo),
        ActionOutcome::Ignored(IgnoreReason::ItemUnavailable)
    );
    assert_eq!(
        harness.controller.invoke(MenuItemId::Preferences),
        ActionOutcome::Ignored(IgnoreReason::ItemUnavailable)
    );
    assert!(calls(&harness.log).is_empty());
}

#[test]
fn change_language_needs_multiple_translations() {
    let mut harness = Harness::new();
    let log = harness.log.clone();

    harness.attach(TestSession::new(false, &log).with_languages(&["en"]));
    assert!(!harness.prepared_menu().is_visible(MenuItemId::ChangeLanguage));

    harness.attach(TestSession::new(false, &log).with_languages(&["en", "sw"]));
    assert!(harness.prepared_menu().is_visible(MenuItemId::ChangeLanguage));

    assert_eq!(
        harness.controller.invoke(MenuItemId::ChangeLanguage),
        ActionOutcome::Navigated(Destination::LanguagePicker)
    );
}

#[test]
fn change_language_without_session_is_ignored() {
    let harness = Harness::new();

    assert_eq!(
        harness.controller.invoke(MenuItemId::ChangeLanguage),
        ActionOutcome::Ignored(IgnoreReason::NoSessionLoaded)
    );
    assert!(calls(&harness.log).is_empty());
}

#[test]
fn track_location_reflects_and_toggles_preference() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(false, &log).with_background_location());

    let mut menu = harness.prepared_menu();
    let item = *menu.item(MenuItemId::TrackLocation).expect("item");
    assert!(item.visible);
    assert_eq!(item.checked, Some(false));

    assert_eq!(
        harness.controller.invoke(MenuItemId::TrackLocation),
        ActionOutcome::LocationToggled { enabled: true }
    );
    assert!(harness.location.is_tracking_enabled());

    harness.controller.refresh(&mut menu);
    assert_eq!(
        menu.item(MenuItemId::TrackLocation).expect("item").checked,
        Some(true)
    );
}

#[test]
fn track_location_hidden_when_form_does_not_use_it() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(false, &log));

    let menu = harness.prepared_menu();
    assert!(!menu.is_visible(MenuItemId::TrackLocation));
    assert_eq!(menu.item(MenuItemId::TrackLocation).expect("item").checked, None);
}

#[test]
fn track_location_ignored_when_form_does_not_use_it() {
    let mut harness = Harness::new();
    let log = harness.log.clone();
    harness.attach(TestSession::new(false, &log));

    assert_eq!(
        harness.controller.invoke(MenuItemId::TrackLocation),
        ActionOutcome::Ignored(IgnoreReason::ItemUnavailable)
    );
    assert!(!harness.location.is_tracking_enabled());
}

#[test]
fn track_location_without_collaborator_is_unavailable() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let (_recording, guard) = recording_signal(false);
    let mut controller = MenuController::builder()
        .answers_provider(Arc::new(TestAnswers {
            answers: Mutex::new(ScreenAnswers::new()),
            log: log.clone(),
        }))
        .save_coordinator(Arc::new(TestSaver { log: log.clone() }))
        .recording_guard(Arc::new(guard))
        .navigator(Arc::new(TestNavigator { log: log.clone() }))
        .build()
        .expect("controller");
    controller.attach_session(Some(Arc::new(
        TestSession::new(false, &log).with_background_location(),
    )));

    let mut menu = Menu::new();
    controller.on_menu_created(&mut menu);
    controller.refresh(&mut menu);
    assert!(!menu.is_visible(MenuItemId::TrackLocation));
    assert_eq!(
        controller.invoke(MenuItemId::TrackLocation),
        ActionOutcome::Ignored(IgnoreReason::ItemUnavailable)
    );
}

#[test]
fn build_fails_without_required_collaborators() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));

    let err = MenuController::builder()
        .save_coordinator(Arc::new(TestSaver { log: log.clone() }))
        .build()
        .err()
        .expect("missing answers provider");
    assert!(matches!(err, MenuError::MissingCollaborator("answers provider")));

    let (_recording, guard) = recording_signal(false);
    let err = MenuController::builder()
        .answers_provider(Arc::new(TestAnswers {
            answers: Mutex::new(ScreenAnswers::new()),
            log: log.clone(),
        }))
        .save_coordinator(Arc::new(TestSaver { log: log.clone() }))
        .recording_guard(Arc::new(guard))
        .build()
        .err()
        .expect("missing navigator");
    assert!(matches!(err, MenuError::MissingCollaborator("navigator")));
}

#[test]
fn add_repeat_through_save_queue_delivers_snapshot() {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let (saver, rx) = crate::save_queue::save_queue(4);
    let (_recording, guard) = recording_signal(false);
    let answers = Arc::new(TestAnswers {
        answers: Mutex::new([("q1", "5")].into_iter().collect()),
        log: log.clone(),
    });
    let mut controller = MenuController::builder()
        .answers_provider(answers)
        .save_coordinator(Arc::new(saver))
        .recording_guard(Arc::new(guard))
        .navigator(Arc::new(TestNavigator { log: log.clone() }))
        .build()
        .expect("controller");
    controller.attach_session(Some(Arc::new(TestSession::new(true, &log))));

    controller.invoke(MenuItemId::AddRepeat);

    let request = rx.try_recv().expect("queued save");
    let expected: ScreenAnswers = [("q1", "5")].into_iter().collect();
    assert_eq!(request.answers, expected);
    assert!(calls(&log).contains(&Call::NewRepeatRequested));
}
