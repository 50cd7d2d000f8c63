//! Logging
//!
//! `tracing` subscriber setup for the CLI. Level, format and destination come
//! from the `[logging]` config section and CLI flags, and `DRIVE_LOG*`
//! environment variables override both.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Mutex;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::{fmt as layer_fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

const ENV_FILTER: &str = "DRIVE_LOG";
const ENV_FORMAT: &str = "DRIVE_LOG_FORMAT";
const ENV_OUTPUT: &str = "DRIVE_LOG_OUTPUT";
const ENV_MODULES: &str = "DRIVE_LOG_MODULES";
const ENV_FILE: &str = "DRIVE_LOG_FILE";

/// Line format of emitted events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(ApiError::ConfigError(format!(
                "Unknown log format {:?}, expected text or json",
                other
            ))),
        }
    }
}

/// Where events are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogOutput {
    #[serde(rename = "stdout")]
    Stdout,
    #[serde(rename = "stderr")]
    Stderr,
    #[default]
    #[serde(rename = "file")]
    File,
    #[serde(rename = "file+stderr")]
    FileAndStderr,
    #[serde(rename = "both")]
    StdoutAndStderr,
}

impl LogOutput {
    fn writes_file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::FileAndStderr)
    }
}

impl FromStr for LogOutput {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "file+stderr" => Ok(LogOutput::FileAndStderr),
            "both" => Ok(LogOutput::StdoutAndStderr),
            other => Err(ApiError::ConfigError(format!(
                "Unknown log output {:?}, expected stdout, stderr, file, file+stderr or both",
                other
            ))),
        }
    }
}

impl fmt::Display for LogOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogOutput::Stdout => "stdout",
            LogOutput::Stderr => "stderr",
            LogOutput::File => "file",
            LogOutput::FileAndStderr => "file+stderr",
            LogOutput::StdoutAndStderr => "both",
        };
        f.write_str(name)
    }
}

/// `[logging]` config section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `false` installs a subscriber that drops everything.
    pub enabled: bool,
    /// Base level directive: trace, debug, info, warn, error or off.
    pub level: String,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Log file; unset uses the platform state directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// ANSI colors for text output on a terminal.
    pub color: bool,
    /// Per-target levels, e.g. `drive::service = "debug"`.
    pub modules: BTreeMap<String, String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Text,
            output: LogOutput::File,
            file: None,
            color: true,
            modules: BTreeMap::new(),
        }
    }
}

impl LoggingConfig {
    /// Apply `DRIVE_LOG_FORMAT`, `DRIVE_LOG_OUTPUT` and `DRIVE_LOG_FILE`.
    fn with_env_overrides(mut self) -> Result<Self, ApiError> {
        if let Some(format) = non_empty_env(ENV_FORMAT) {
            self.format = format.parse()?;
        }
        if let Some(output) = non_empty_env(ENV_OUTPUT) {
            self.output = output.parse()?;
        }
        if let Some(file) = non_empty_env(ENV_FILE) {
            self.file = Some(PathBuf::from(file));
        }
        Ok(self)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Default log file: `<state dir>/[<workspace path>/]drive.log`.
///
/// Platforms without a state directory use the local data directory.
pub fn default_log_file(workspace: Option<&Path>) -> Result<PathBuf, ApiError> {
    let dirs = directories::ProjectDirs::from("", "drive", "drive").ok_or_else(|| {
        ApiError::ConfigError("No home directory to place the log file in".to_string())
    })?;
    let mut dir = dirs
        .state_dir()
        .unwrap_or_else(|| dirs.data_local_dir())
        .to_path_buf();
    if let Some(workspace) = workspace {
        let canonical = workspace.canonicalize().map_err(|e| {
            ApiError::ConfigError(format!("Cannot resolve workspace {}: {}", workspace.display(), e))
        })?;
        dir.extend(canonical.components().filter_map(|c| match c {
            std::path::Component::Normal(name) => Some(name),
            _ => None,
        }));
    }
    Ok(dir.join("drive.log"))
}

fn parse_directive(directive: &str) -> Result<Directive, ApiError> {
    directive.parse()
        .map_err(|e| ApiError::ConfigError(format!("Bad log directive {:?}: {}", directive, e)))
}

/// Level filter: `DRIVE_LOG` verbatim when set, else the configured level plus
/// per-module directives from config and `DRIVE_LOG_MODULES`.
fn env_filter(config: &LoggingConfig) -> Result<EnvFilter, ApiError> {
    if let Ok(filter) = EnvFilter::try_from_env(ENV_FILTER) {
        return Ok(filter);
    }
    if config.level.trim() == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let from_config = config
        .modules
        .iter()
        .map(|(target, level)| format!("{}={}", target, level));
    let from_env = non_empty_env(ENV_MODULES)
        .map(|directives| {
            directives
                .split(',')
                .map(str::trim)
                .filter(|directive| directive.contains('='))
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    from_config
        .chain(from_env)
        .try_fold(EnvFilter::new(config.level.trim()), |filter, directive| {
            Ok(filter.add_directive(parse_directive(&directive)?))
        })
}

fn open_append(path: &Path) -> Result<std::fs::File, ApiError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ApiError::ConfigError(format!("Cannot create log directory {}: {}", parent.display(), e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ApiError::ConfigError(format!("Cannot open log file {}: {}", path.display(), e)))
}

fn writer_for(output: LogOutput, file: Option<&Path>) -> Result<BoxMakeWriter, ApiError> {
    let log_file = || -> Result<Mutex<std::fs::File>, ApiError> {
        let path = match file {
            Some(path) => path.to_path_buf(),
            None => default_log_file(None)?,
        };
        Ok(Mutex::new(open_append(&path)?))
    };
    Ok(match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::StdoutAndStderr => BoxMakeWriter::new(std::io::stdout.and(std::io::stderr)),
        LogOutput::File => BoxMakeWriter::new(log_file()?),
        LogOutput::FileAndStderr => BoxMakeWriter::new(log_file()?.and(std::io::stderr)),
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ApiError> {
    let installed = if !config.enabled {
        Registry::default()
            .with(EnvFilter::new("off"))
            .with(layer_fmt::layer().with_writer(std::io::sink))
            .try_init()
    } else {
        let config = config.clone().with_env_overrides()?;
        let filter = env_filter(&config)?;
        let writer = writer_for(config.output, config.file.as_deref())?;
        let registry = Registry::default().with(filter);
        match config.format {
            LogFormat::Json => registry
                .with(
                    layer_fmt::layer()
                        .json()
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_writer(writer),
                )
                .try_init(),
            LogFormat::Text => registry
                .with(
                    layer_fmt::layer()
                        .with_timer(ChronoUtc::rfc_3339())
                        .with_ansi(config.color && !config.output.writes_file())
                        .with_writer(writer),
                )
                .try_init(),
        }
    };
    installed.map_err(|e| ApiError::ConfigError(format!("Logger already installed: {}", e)))
}
