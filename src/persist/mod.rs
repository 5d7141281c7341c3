//! Persistence layer for console settings.
//!
//! Provides RON-based save/load of log settings, input settings and log
//! filters. The log itself and the command history are never written.

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{
    first_token, ConCommand, ConsoleSession, InputSettings, LogFilters, LogSettings, ParamKind,
    ParamSpec,
};

/// Default config file name.
pub const DEFAULT_CONFIG_FILE: &str = "console.ron";

/// Serializable console settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConsoleSettingsFile {
    pub log: LogSettings,
    pub input: InputSettings,
    pub filters: LogFilters,
}

impl ConsoleSettingsFile {
    /// Snapshot the settings of a session.
    pub fn from_session(session: &ConsoleSession) -> Self {
        Self {
            log: session.log().settings().clone(),
            input: session.input_settings().clone(),
            filters: session.log().filters().clone(),
        }
    }

    /// Apply to a session. A changed capacity takes effect next frame.
    pub fn apply_to(&self, session: &mut ConsoleSession) {
        *session.log_mut().settings_mut() = self.log.clone();
        session.set_input_settings(self.input.clone());

        let filters = session.log_mut().filters_mut();
        *filters = self.filters.clone();
        // The lowercase search key isn't stored.
        let search = filters.search().to_string();
        filters.set_search(search);
    }

    /// Load settings from a RON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))?;

        ron::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.display().to_string(), e.to_string()))
    }

    /// Save settings to a RON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::Io(parent.display().to_string(), e.to_string()))?;
            }
        }

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .separate_tuple_members(false)
            .enumerate_arrays(false);

        let contents = ron::ser::to_string_pretty(self, pretty)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, contents)
            .map_err(|e| ConfigError::Io(path.display().to_string(), e.to_string()))
    }

    /// Load settings from file, returning defaults if it can't be read.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }
}

/// Errors that can occur during config operations.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// IO error (path, message).
    Io(String, String),
    /// Parse error (path, message).
    Parse(String, String),
    /// Serialization error.
    Serialize(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, msg) => write!(f, "IO error for '{}': {}", path, msg),
            ConfigError::Parse(path, msg) => write!(f, "Parse error for '{}': {}", path, msg),
            ConfigError::Serialize(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resource tracking the settings file path.
#[derive(Resource, Debug, Clone)]
pub struct ConfigPath(pub String);

impl Default for ConfigPath {
    fn default() -> Self {
        Self(DEFAULT_CONFIG_FILE.to_string())
    }
}

/// System to load settings on startup.
pub fn load_settings_on_startup(mut session: ResMut<ConsoleSession>, config_path: Res<ConfigPath>) {
    let path = &config_path.0;

    if !Path::new(path).exists() {
        info!("No console settings found at '{}', using defaults", path);
        return;
    }

    match ConsoleSettingsFile::load(path) {
        Ok(settings) => {
            settings.apply_to(&mut session);
            info!("Loaded console settings from '{}'", path);
        }
        Err(e) => {
            error!("Failed to load console settings: {}", e);
        }
    }
}

/// Execute each line of a script, skipping blanks and `//` or `#` comments.
///
/// Returns `(executed, failed)`. Nested `exec` lines are skipped.
fn run_script(
    contents: &str,
    session: &mut ConsoleSession,
    targets: &mut dyn crate::core::TargetEnvironment,
) -> (usize, usize) {
    let mut executed = 0;
    let mut failed = 0;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with('#') {
            continue;
        }
        if first_token(line).eq_ignore_ascii_case("exec") {
            warn!("Skipping nested exec: '{}'", line);
            continue;
        }

        executed += 1;
        if !session.execute_line(line, targets).success {
            failed += 1;
        }
    }
    (executed, failed)
}

/// Register persistence-related commands.
pub fn register_commands(session: &mut ConsoleSession) {
    // exec - Execute commands from a file
    session.register(
        ConCommand::new("exec", |args, ctx| {
            let filename = args.raw().trim();
            let contents = fs::read_to_string(filename)?;
            let (executed, failed) = run_script(&contents, ctx.session, &mut *ctx.targets);
            Ok(Some(format!(
                "Executed {} lines from '{}' ({} failed)",
                executed, filename, failed
            )))
        })
        .param(ParamSpec::text("file"))
        .description("Execute commands from a file"),
    );

    // console.save - Write the console settings file
    session.register(
        ConCommand::new("console.save", |args, ctx| {
            let path = match args.text(0) {
                Some(path) => path.to_string(),
                None => ctx
                    .shared::<ConfigPath>()
                    .map(|p| p.0.clone())
                    .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string()),
            };
            ConsoleSettingsFile::from_session(ctx.session).save(&path)?;
            Ok(Some(format!("Saved console settings to '{}'", path)))
        })
        .param(ParamSpec::optional("path", ParamKind::Text))
        .description("Save console settings to a file"),
    );
}
