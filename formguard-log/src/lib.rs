//! Formguard Logging
//!
//! Structured logging for formguard hosts, controlled by `FORMGUARD_*`
//! environment variables. The validation engine itself never logs; hosts
//! use these macros to record rejected submissions and accepted input.
//!
//! # Usage
//!
//! ```rust
//! use formguard_log::{debug, error, info, trace, warn};
//!
//! debug!("Validating request");
//! info!("Listening on port {}", 8080);
//! warn!("Message table for {} not found", "fr");
//! error!("Rule set is malformed");
//!
//! // With target
//! let path = "/form/login";
//! debug!(target: "formguard::router", "Matching route: {}", path);
//!
//! // With structured fields
//! info!(fields: ["status" => 400, "attribute" => "username"], "Validation failed");
//! ```
//!
//! # Environment Variables
//!
//! - `FORMGUARD_DEBUG=1` - Enable debug logging
//! - `FORMGUARD_LOG_LEVEL=trace|debug|info|warn|error|off` - Set log level
//! - `FORMGUARD_LOG_FORMAT=pretty|json|compact` - Set output format (default `json`)
//! - `FORMGUARD_LOG_COLOR=1|0` - Enable/disable colors (`color` feature)
//! - `FORMGUARD_LOG_TIMESTAMPS=1|0` - Include timestamps (default on)

use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::env;
use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

// ============================================================================
// Log Levels
// ============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[repr(u8)]
pub enum Level {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    /// No logging
    Off = 5,
}

impl Level {
    /// Parse a level name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Some(Level::Trace),
            "debug" => Some(Level::Debug),
            "info" => Some(Level::Info),
            "warn" | "warning" => Some(Level::Warn),
            "error" => Some(Level::Error),
            "off" | "none" => Some(Level::Off),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Off => "OFF",
        }
    }

    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Trace,
            1 => Level::Debug,
            2 => Level::Info,
            3 => Level::Warn,
            4 => Level::Error,
            _ => Level::Off,
        }
    }

    #[cfg(feature = "color")]
    fn colored(&self) -> colored::ColoredString {
        use colored::Colorize;
        match self {
            Level::Trace => "TRACE".magenta(),
            Level::Debug => "DEBUG".blue(),
            Level::Info => "INFO".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERROR".red().bold(),
            Level::Off => "OFF".white(),
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Log Format
// ============================================================================

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Human-readable, multi-column
    Pretty,
    /// Single letter level, short timestamp
    Compact,
    /// One JSON object per line
    Json,
}

impl Format {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Some(Format::Pretty),
            "compact" => Some(Format::Compact),
            "json" => Some(Format::Json),
            _ => None,
        }
    }
}

// ============================================================================
// Global Configuration
// ============================================================================

static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static LOG_LEVEL: AtomicU8 = AtomicU8::new(Level::Info as u8);

static CONFIG: OnceCell<LogConfig> = OnceCell::new();

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub debug: bool,
    pub level: Level,
    pub format: Format,
    pub color: bool,
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            debug: false,
            level: Level::Info,
            format: Format::Json,
            color: false,
            timestamps: true,
        }
    }
}

fn env_flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

impl LogConfig {
    /// Read the `FORMGUARD_*` variables, falling back to defaults.
    pub fn from_env() -> Self {
        let debug = env_flag("FORMGUARD_DEBUG").unwrap_or(false);

        let level = env::var("FORMGUARD_LOG_LEVEL")
            .ok()
            .and_then(|s| Level::parse(&s))
            .unwrap_or(if debug { Level::Debug } else { Level::Info });

        let format = env::var("FORMGUARD_LOG_FORMAT")
            .ok()
            .and_then(|s| Format::parse(&s))
            .unwrap_or(Format::Json);

        let color = env_flag("FORMGUARD_LOG_COLOR")
            .unwrap_or_else(|| env::var("NO_COLOR").is_err() && env::var("TERM").is_ok());

        Self {
            debug,
            level,
            format,
            color: color && format != Format::Json,
            timestamps: env_flag("FORMGUARD_LOG_TIMESTAMPS").unwrap_or(true),
        }
    }

    fn apply(&self) {
        DEBUG_ENABLED.store(self.debug, Ordering::SeqCst);
        LOG_LEVEL.store(self.level as u8, Ordering::SeqCst);
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Initialize from the environment. Called lazily by the first log line.
pub fn init() {
    config();
}

/// Initialize with an explicit configuration.
///
/// Returns `false` when logging was already initialized; the level is still
/// updated in that case.
pub fn init_with(config: LogConfig) -> bool {
    config.apply();
    CONFIG.set(config).is_ok()
}

/// The active configuration.
pub fn config() -> &'static LogConfig {
    CONFIG.get_or_init(|| {
        let config = LogConfig::from_env();
        config.apply();
        config
    })
}

#[inline]
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Check if a line at `level` would be written.
#[inline]
pub fn is_level_enabled(level: Level) -> bool {
    level != Level::Off
        && (level as u8 >= LOG_LEVEL.load(Ordering::Relaxed)
            || (level == Level::Debug && is_debug_enabled()))
}

pub fn current_level() -> Level {
    Level::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

/// Set the level at runtime.
pub fn set_level(level: Level) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Enable or disable debug mode at runtime.
pub fn set_debug(enabled: bool) {
    DEBUG_ENABLED.store(enabled, Ordering::SeqCst);
    if enabled && current_level() > Level::Debug {
        set_level(Level::Debug);
    }
}

// ============================================================================
// Capture
// ============================================================================

thread_local! {
    static CAPTURED: RefCell<Option<Vec<Value>>> = const { RefCell::new(None) };
}

/// Run `f` and return every record it logged on this thread as JSON
/// objects, regardless of the configured level. Nothing is written to
/// stderr while capturing.
///
/// ```rust
/// use formguard_log::{capture, info};
///
/// let records = capture(|| info!(fields: ["status" => 200], "done"));
/// assert_eq!(records[0]["message"], "done");
/// assert_eq!(records[0]["fields"]["status"], 200);
/// ```
pub fn capture<F: FnOnce()>(f: F) -> Vec<Value> {
    let previous = CAPTURED.with(|c| c.borrow_mut().replace(Vec::new()));
    f();
    CAPTURED
        .with(|c| std::mem::replace(&mut *c.borrow_mut(), previous))
        .unwrap_or_default()
}

#[doc(hidden)]
pub fn is_capturing() -> bool {
    CAPTURED.with(|c| c.borrow().is_some())
}

// ============================================================================
// Log Output
// ============================================================================

/// Convert a field value for logging. Values that fail to serialize are
/// logged as `null`.
#[doc(hidden)]
pub fn field_value<T: Serialize + ?Sized>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}

/// Write one record.
#[doc(hidden)]
pub fn log(level: Level, target: &str, message: &str, fields: &[(&str, Value)]) {
    if is_capturing() {
        let record = json_record(level, target, message, fields, false);
        CAPTURED.with(|c| {
            if let Some(records) = c.borrow_mut().as_mut() {
                records.push(record);
            }
        });
        return;
    }

    if !is_level_enabled(level) {
        return;
    }

    let config = config();
    match config.format {
        Format::Pretty => log_pretty(level, target, message, fields, config),
        Format::Compact => log_compact(level, target, message, fields, config),
        Format::Json => {
            let record = json_record(level, target, message, fields, config.timestamps);
            eprintln!("{}", record);
        }
    }
}

fn json_record(
    level: Level,
    target: &str,
    message: &str,
    fields: &[(&str, Value)],
    timestamps: bool,
) -> Value {
    let mut entry = Map::new();
    if timestamps {
        entry.insert("timestamp".into(), chrono::Utc::now().to_rfc3339().into());
    }
    entry.insert("level".into(), level.as_str().into());
    entry.insert("target".into(), target.into());
    entry.insert("message".into(), message.into());
    if !fields.is_empty() {
        let fields: Map<String, Value> = fields
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        entry.insert("fields".into(), Value::Object(fields));
    }
    Value::Object(entry)
}

fn write_fields(out: &mut impl Write, fields: &[(&str, Value)]) {
    for (key, value) in fields {
        let _ = match value {
            Value::String(s) => write!(out, " {}={}", key, s),
            other => write!(out, " {}={}", key, other),
        };
    }
}

fn log_pretty(level: Level, target: &str, message: &str, fields: &[(&str, Value)], config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let now = chrono::Local::now();
        let _ = write!(stderr, "{} ", now.format("%Y-%m-%d %H:%M:%S%.3f"));
    }

    #[cfg(feature = "color")]
    if config.color {
        let _ = write!(stderr, "{:5} ", level.colored());
    } else {
        let _ = write!(stderr, "{:5} ", level.as_str());
    }

    #[cfg(not(feature = "color"))]
    let _ = write!(stderr, "{:5} ", level.as_str());

    if !target.is_empty() {
        let _ = write!(stderr, "[{}] ", target);
    }

    let _ = write!(stderr, "{}", message);
    write_fields(&mut stderr, fields);
    let _ = writeln!(stderr);
}

fn log_compact(level: Level, target: &str, message: &str, fields: &[(&str, Value)], config: &LogConfig) {
    let mut stderr = std::io::stderr().lock();

    if config.timestamps {
        let _ = write!(stderr, "{} ", chrono::Local::now().format("%H:%M:%S"));
    }

    let _ = write!(stderr, "{} ", level.as_str().chars().next().unwrap_or('?'));

    if !target.is_empty() {
        let _ = write!(stderr, "{}: ", target);
    }

    let _ = write!(stderr, "{}", message);
    write_fields(&mut stderr, fields);
    let _ = writeln!(stderr);
}

// ============================================================================
// Macros
// ============================================================================

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($level:expr, target: $target:expr, fields: [$($key:literal => $value:expr),* $(,)?], $($arg:tt)+) => {
        if $crate::is_capturing() || $crate::is_level_enabled($level) {
            $crate::log(
                $level,
                $target,
                &format!($($arg)+),
                &[$(($key, $crate::field_value(&$value))),*],
            );
        }
    };
    ($level:expr, target: $target:expr, $($arg:tt)+) => {
        $crate::__log!($level, target: $target, fields: [], $($arg)+)
    };
    ($level:expr, fields: [$($fields:tt)*], $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), fields: [$($fields)*], $($arg)+)
    };
    ($level:expr, $($arg:tt)+) => {
        $crate::__log!($level, target: module_path!(), fields: [], $($arg)+)
    };
}

/// Log a trace message.
#[macro_export]
macro_rules! trace {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Trace, $($arg)+) };
}

/// Log a debug message.
///
/// Written when `FORMGUARD_DEBUG=1` or the level is `debug` or lower.
///
/// ```rust
/// use formguard_log::debug;
///
/// let attribute = "username";
/// debug!("Attribute {} failed", attribute);
/// debug!(target: "formguard::validation", fields: ["attribute" => attribute], "failed");
/// ```
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Debug, $($arg)+) };
}

/// Log an info message.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Info, $($arg)+) };
}

/// Log a warning message.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Warn, $($arg)+) };
}

/// Log an error message.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => { $crate::__log!($crate::Level::Error, $($arg)+) };
}

// ============================================================================
// Tracing Integration
// ============================================================================

#[cfg(feature = "tracing")]
pub mod tracing_compat {
    //! A `tracing` subscriber that honours the formguard level settings.

    use super::*;

    pub fn subscriber() -> impl tracing::Subscriber {
        use tracing_subscriber::prelude::*;
        use tracing_subscriber::{EnvFilter, fmt};

        let config = config();
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_lowercase()));

        let layer = match config.format {
            Format::Json => fmt::layer().json().boxed(),
            Format::Compact => fmt::layer().compact().with_ansi(config.color).boxed(),
            Format::Pretty => fmt::layer().with_ansi(config.color).boxed(),
        };

        tracing_subscriber::registry().with(filter).with(layer)
    }
}

// ============================================================================
// Tests
// ============================================================================
