use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(QuestionId);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    Text(String),
    Integer(i64),
    Decimal(f64),
    Choices(Vec<String>),
    Empty,
}

impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Text(text) => f.write_str(text),
            AnswerValue::Integer(value) => write!(f, "{value}"),
            AnswerValue::Decimal(value) => write!(f, "{value}"),
            AnswerValue::Choices(choices) => f.write_str(&choices.join(" ")),
            AnswerValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Integer(value)
    }
}

/// Answers currently entered on the visible screen, keyed by question.
///
/// Built fresh for every action that needs to persist input; never cached between invocations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenAnswers(BTreeMap<QuestionId, AnswerValue>);

impl ScreenAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, question: &QuestionId) -> Option<&AnswerValue> {
        self.0.get(question)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &AnswerValue)> {
        self.0.iter()
    }
}

impl<Q, V> FromIterator<(Q, V)> for ScreenAnswers
where
    Q: Into<QuestionId>,
    V: Into<AnswerValue>,
{
    fn from_iter<I: IntoIterator<Item = (Q, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(question, value)| (question.into(), value.into()))
                .collect(),
        )
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        QuestionId::new(value)
    }
}

impl From<String> for QuestionId {
    fn from(value: String) -> Self {
        QuestionId(value)
    }
}

impl IntoIterator for ScreenAnswers {
    type Item = (QuestionId, AnswerValue);
    type IntoIter = std::collections::btree_map::IntoIter<QuestionId, AnswerValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuItemId {
    AddRepeat,
    GoTo,
    Preferences,
    ChangeLanguage,
    TrackLocation,
}

impl MenuItemId {
    pub const ALL: [MenuItemId; 5] = [
        MenuItemId::AddRepeat,
        MenuItemId::GoTo,
        MenuItemId::Preferences,
        MenuItemId::ChangeLanguage,
        MenuItemId::TrackLocation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MenuItemId::AddRepeat => "add_repeat",
            MenuItemId::GoTo => "go_to",
            MenuItemId::Preferences => "preferences",
            MenuItemId::ChangeLanguage => "change_language",
            MenuItemId::TrackLocation => "track_location",
        }
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    Preferences,
    Hierarchy,
    LanguagePicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    RecordingInProgress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NoSessionLoaded,
    ItemUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ActionOutcome {
    RepeatRequested,
    Navigated(Destination),
    WarningShown(WarningKind),
    LocationToggled { enabled: bool },
    Ignored(IgnoreReason),
}
