use std::{fs, io, path::Path};

use serde::Deserialize;
use shared::error::MenuError;

pub const ENV_SHOW_GO_TO: &str = "FORM_MENU__SHOW_GO_TO";
pub const ENV_SHOW_PREFERENCES: &str = "FORM_MENU__SHOW_PREFERENCES";
pub const ENV_SAVE_QUEUE_CAPACITY: &str = "FORM_MENU__SAVE_QUEUE_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSettings {
    /// Admin switch for the jump-to-question item.
    pub show_go_to: bool,
    /// Admin switch for the preferences item.
    pub show_preferences: bool,
    pub save_queue_capacity: usize,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            show_go_to: true,
            show_preferences: true,
            save_queue_capacity: 64,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    show_go_to: Option<bool>,
    show_preferences: Option<bool>,
    save_queue_capacity: Option<usize>,
}

/// Defaults, then the TOML file at `path` (a missing file is skipped), then environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<MenuSettings, MenuError> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<MenuSettings, MenuError> {
    let mut settings = MenuSettings::default();

    if let Some(path) = path {
        match fs::read_to_string(path) {
            Ok(raw) => {
                let file_cfg: FileSettings = toml::from_str(&raw).map_err(|err| {
                    MenuError::invalid_settings(format!("{}: {err}", path.display()))
                })?;
                apply_file_settings(&mut settings, file_cfg);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(
                    path = %path.display(),
                    "menu settings file not found; using defaults"
                );
            }
            Err(err) => {
                return Err(MenuError::invalid_settings(format!(
                    "failed to read '{}': {err}",
                    path.display()
                )));
            }
        }
    }

    if let Some(v) = env(ENV_SHOW_GO_TO) {
        settings.show_go_to = parse_env(ENV_SHOW_GO_TO, &v)?;
    }
    if let Some(v) = env(ENV_SHOW_PREFERENCES) {
        settings.show_preferences = parse_env(ENV_SHOW_PREFERENCES, &v)?;
    }
    if let Some(v) = env(ENV_SAVE_QUEUE_CAPACITY) {
        settings.save_queue_capacity = parse_env(ENV_SAVE_QUEUE_CAPACITY, &v)?;
    }

    if settings.save_queue_capacity == 0 {
        return Err(MenuError::invalid_settings(
            "save_queue_capacity must be greater than zero",
        ));
    }

    Ok(settings)
}

fn apply_file_settings(settings: &mut MenuSettings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.show_go_to {
        settings.show_go_to = v;
    }
    if let Some(v) = file_cfg.show_preferences {
        settings.show_preferences = v;
    }
    if let Some(v) = file_cfg.save_queue_capacity {
        settings.save_queue_capacity = v;
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, MenuError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| MenuError::invalid_settings(format!("{key} has unparseable value '{raw}'")))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
