use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use log::{LevelFilter, Log, Metadata, Record};

use crate::AppConfig;

// ログ出力先へのハンドル
// An explicitly constructed logger, passed to every function that logs.
//
// Use it with the `log` macros: `info!(logger: &logger, "...")`.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<dyn Log>,
}

impl Logger {
    pub fn from_dispatch(dispatch: fern::Dispatch) -> Self {
        let (level, inner) = dispatch.into_log();
        // The macros consult the global max level before reaching our handle,
        // so it must be at least as verbose as the most verbose handle.
        if level > log::max_level() {
            log::set_max_level(level);
        }
        Logger {
            inner: Arc::from(inner),
        }
    }

    /// A logger that drops every record.
    pub fn disabled() -> Self {
        Logger::from_dispatch(fern::Dispatch::new().level(LevelFilter::Off))
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        self.inner.log(record)
    }

    fn flush(&self) {
        self.inner.flush()
    }
}

pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info, // default
    }
}

pub fn base_dispatch(level: LevelFilter) -> fern::Dispatch {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] [{}] {}", // [Date Time][Level][Module] Message
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
}

pub fn setup_logging(app_config: &AppConfig) -> Result<Logger> {
    let level = parse_level(app_config.log_level.as_deref().unwrap_or("info"));
    let mut dispatch = base_dispatch(level);

    let should_log_to_stdout = app_config.log_stdout.unwrap_or(true); // Set default to true
    if should_log_to_stdout {
        dispatch = dispatch.chain(std::io::stdout());
    }

    // ログファイル出力が指定されている場合
    // If log file output is specified
    if let Some(log_file) = &app_config.log_file {
        let log_file_path = PathBuf::from(shellexpand::tilde(log_file).into_owned());
        let log_dir = log_file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| std::path::Path::new("."));

        // ログディレクトリが存在しない場合は作成
        // If the log directory does not exist, create it.
        if !log_dir.exists() {
            std::fs::create_dir_all(log_dir).context(format!(
                "Failed to create log directory: {}",
                log_dir.display()
            ))?;
        }

        let file = fern::log_file(&log_file_path).context(format!(
            "Failed to open log file: {}",
            log_file_path.display()
        ))?;
        dispatch = dispatch.chain(file);
    }

    Ok(Logger::from_dispatch(dispatch))
}
