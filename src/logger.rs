use chrono::{DateTime, Utc};
use colored::*;
use log::{Level, Metadata, Record};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use uuid::Uuid;

static TRYON_LOGGER: Lazy<ConsoleLogger> = Lazy::new(ConsoleLogger::new);

pub fn init() -> Result<(), String> {
    init_with_config(LoggerConfig::from_env())
}

pub fn init_with_config(config: LoggerConfig) -> Result<(), String> {
    let level = config.min_level;
    TRYON_LOGGER.update_config(config);

    log::set_logger(&*TRYON_LOGGER).map_err(|e| format!("Failed to set logger: {:?}", e))?;
    log::set_max_level(level.to_log_level_filter());
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn color(&self) -> Color {
        match self {
            LogLevel::Trace => Color::Cyan,
            LogLevel::Debug => Color::Blue,
            LogLevel::Info => Color::Green,
            LogLevel::Warn => Color::Yellow,
            LogLevel::Error => Color::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn to_log_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }

    pub fn from_log_level(level: Level) -> Self {
        match level {
            Level::Trace => LogLevel::Trace,
            Level::Debug => LogLevel::Debug,
            Level::Info => LogLevel::Info,
            Level::Warn => LogLevel::Warn,
            Level::Error => LogLevel::Error,
        }
    }
}

/// One emitted log line, also the JSON output shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    pub module: String,
    pub line: u32,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: String, module: String, line: u32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            level,
            message,
            module,
            line,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub show_colors: bool,
    pub show_module: bool,
    pub show_line: bool,
    pub timestamp_format: String,
    pub output_json: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: true,
            show_module: true,
            show_line: false,
            timestamp_format: "%Y-%m-%d %H:%M:%S%.3f".to_string(),
            output_json: false,
        }
    }
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `TRYON_LOG_FORMAT=json` selects the production preset,
    /// `TRYON_LOG_LEVEL` overrides the level of either preset.
    pub fn from_env() -> Self {
        let base = match std::env::var("TRYON_LOG_FORMAT").ok().as_deref() {
            Some("json") => Self::production(),
            _ => Self::development(),
        };
        match std::env::var("TRYON_LOG_LEVEL").ok().as_deref().and_then(LogLevel::parse) {
            Some(level) => base.with_level(level),
            None => base,
        }
    }

    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    pub fn with_colors(mut self, enabled: bool) -> Self {
        self.show_colors = enabled;
        self
    }

    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.output_json = enabled;
        self
    }

    pub fn production() -> Self {
        Self {
            min_level: LogLevel::Info,
            show_colors: false,
            output_json: true,
            ..Default::default()
        }
    }

    pub fn development() -> Self {
        Self {
            min_level: LogLevel::Debug,
            show_colors: true,
            show_line: true,
            output_json: false,
            ..Default::default()
        }
    }
}

pub struct ConsoleLogger {
    config: RwLock<LoggerConfig>,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            config: RwLock::new(LoggerConfig::default()),
        }
    }

    pub fn update_config(&self, new_config: LoggerConfig) {
        if let Ok(mut config) = self.config.write() {
            *config = new_config;
        }
    }

    fn format_line(entry: &LogEntry, config: &LoggerConfig) -> String {
        if config.output_json {
            return serde_json::to_string(entry).unwrap_or_else(|_| entry.message.clone());
        }

        let timestamp = entry.timestamp.format(&config.timestamp_format).to_string();
        let level = format!("{:5}", entry.level.as_str());
        let mut output = if config.show_colors {
            format!(
                "{} [{}] ",
                timestamp.bright_black(),
                level.color(entry.level.color()).bold()
            )
        } else {
            format!("{} [{}] ", timestamp, level)
        };

        if config.show_module && !entry.module.is_empty() {
            let module = if config.show_line {
                format!("{}:{}", entry.module, entry.line)
            } else {
                entry.module.clone()
            };
            if config.show_colors {
                output.push_str(&format!("{} ", module.bright_blue()));
            } else {
                output.push_str(&format!("{} ", module));
            }
        }

        output.push_str(&entry.message);
        output
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        match self.config.read() {
            Ok(config) => LogLevel::from_log_level(metadata.level()) >= config.min_level,
            Err(_) => true,
        }
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry::new(
            LogLevel::from_log_level(record.level()),
            record.args().to_string(),
            record.module_path().unwrap_or("unknown").to_string(),
            record.line().unwrap_or(0),
        );

        if let Ok(config) = self.config.read() {
            let line = Self::format_line(&entry, &config);
            // warnings and errors go to stderr
            if entry.level >= LogLevel::Warn {
                let _ = writeln!(io::stderr(), "{}", line);
            } else {
                let _ = writeln!(io::stdout(), "{}", line);
            }
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

/// Logs how long one request took, tagged with its request id.
pub struct RequestTimer {
    start: Instant,
    name: String,
    request_id: String,
}

impl RequestTimer {
    pub fn new(name: &str, request_id: &str) -> Self {
        log::debug!("[req:{}] Starting {}", request_id, name);
        Self {
            start: Instant::now(),
            name: name.to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        log::info!(
            "[req:{}] {} finished in {}ms",
            self.request_id,
            self.name,
            self.elapsed().as_millis()
        );
    }
}

pub fn log_startup_info(app_name: &str, version: &str, host: &str, port: u16) {
    log::info!("Starting {} v{}", app_name, version);
    log::info!("Relay listening on http://{}:{}", host, port);
}

/// Never prints the credential itself.
pub fn log_config_info(config: &crate::config::Config, catalog_size: usize) {
    log::info!("Configuration loaded:");
    log::info!("   Model: {}", config.gemini.model);
    log::info!("   API base: {}", config.gemini.api_base);
    log::info!(
        "   API key: {}",
        if config.gemini.api_key.is_some() { "set" } else { "missing" }
    );
    log::info!("   Assets dir: {}", config.assets_dir.display());
    log::info!("   Catalog: {} products", catalog_size);
    log::info!("   Max upload: {} bytes", config.max_upload_bytes);
}
