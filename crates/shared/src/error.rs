use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MissingCollaborator,
    InvalidSettings,
    SaveFailed,
}

#[derive(Debug, Error)]
pub enum MenuError {
    #[error("menu controller assembled without a {0}")]
    MissingCollaborator(&'static str),
    #[error("invalid menu settings: {0}")]
    InvalidSettings(String),
    #[error("failed to save screen answers: {0}")]
    SaveFailed(String),
}

impl MenuError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MenuError::MissingCollaborator(_) => ErrorCode::MissingCollaborator,
            MenuError::InvalidSettings(_) => ErrorCode::InvalidSettings,
            MenuError::SaveFailed(_) => ErrorCode::SaveFailed,
        }
    }

    pub fn invalid_settings(message: impl Into<String>) -> Self {
        MenuError::InvalidSettings(message.into())
    }
}
