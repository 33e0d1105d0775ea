//! Console host: scripted form session, fixed screen answers, and printed navigation.

use std::sync::atomic::{AtomicUsize, Ordering};

use menu_core::{AnswersProvider, FormSession, HostNavigator};
use shared::domain::{AnswerValue, Destination, ScreenAnswers, WarningKind};

pub struct ScriptedSession {
    can_add_repeat: bool,
    languages: Vec<String>,
    background_location: bool,
    repeats_added: AtomicUsize,
}

impl ScriptedSession {
    pub fn new(can_add_repeat: bool, languages: Vec<String>, background_location: bool) -> Self {
        Self {
            can_add_repeat,
            languages,
            background_location,
            repeats_added: AtomicUsize::new(0),
        }
    }

    pub fn repeats_added(&self) -> usize {
        self.repeats_added.load(Ordering::SeqCst)
    }
}

impl FormSession for ScriptedSession {
    fn can_add_repeat(&self) -> bool {
        self.can_add_repeat
    }

    fn request_new_repeat_instance(&self) {
        let instance = self.repeats_added.fetch_add(1, Ordering::SeqCst) + 1;
        println!("session: new repeat instance #{instance} requested");
    }

    fn languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn uses_background_location(&self) -> bool {
        self.background_location
    }
}

/// Answers typed on the visible screen.
pub struct ScreenInput {
    answers: ScreenAnswers,
}

impl ScreenInput {
    pub fn new(answers: ScreenAnswers) -> Self {
        Self { answers }
    }
}

impl AnswersProvider for ScreenInput {
    fn current_screen_answers(&self) -> ScreenAnswers {
        self.answers.clone()
    }
}

pub struct ConsoleNavigator;

impl HostNavigator for ConsoleNavigator {
    fn navigate_to(&self, destination: Destination) {
        let screen = match destination {
            Destination::Preferences => "project preferences",
            Destination::Hierarchy => "question hierarchy",
            Destination::LanguagePicker => "language picker",
        };
        println!("navigate: opening {screen}");
    }

    fn show_warning(&self, warning: WarningKind) {
        match warning {
            WarningKind::RecordingInProgress => {
                println!(
                    "warning: audio recording in progress; \
                     stop recording before leaving this screen"
                )
            }
        }
    }
}

/// Parses `question=value`. Integral values become integer answers.
pub fn parse_answer(raw: &str) -> Result<(String, AnswerValue), String> {
    let (question, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=VALUE, got '{raw}'"))?;
    let question = question.trim();
    if question.is_empty() {
        return Err(format!("missing question id in '{raw}'"));
    }

    let value = match value.trim() {
        "" => AnswerValue::Empty,
        v => v
            .parse::<i64>()
            .map(AnswerValue::Integer)
            .unwrap_or_else(|_| AnswerValue::Text(v.to_string())),
    };
    Ok((question.to_string(), value))
}
