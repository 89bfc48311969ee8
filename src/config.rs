use std::{fmt, path::PathBuf, time::Duration};

use config::{Config, File};
use etcetera::{BaseStrategy, choose_base_strategy};
use serde::Deserialize;
use validator::Validate;
use zeroize::Zeroizing;

use crate::AppError;

pub const DEFAULT_SFTP_PORT: u16 = 22;
pub const DEFAULT_SLEEP_TIMEOUT_MS: u64 = 1000;

// 設定キーと環境変数の対応
// Environment variables that override keys from the config file
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("sftp_host", "SFTP_HOST"),
    ("sftp_port", "SFTP_PORT"),
    ("sftp_username", "SFTP_USERNAME"),
    ("sftp_password", "SFTP_PASSWORD"),
    ("sleep_timeout_ms", "SLEEP_TIMEOUT_MS"),
    ("log_level", "SFTP_SYNC_LOG_LEVEL"),
];

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct AppConfig {
    pub sftp_host: Option<String>,
    pub sftp_port: Option<u16>,
    pub sftp_username: Option<String>,
    pub sftp_password: Option<String>,
    pub sleep_timeout_ms: Option<u64>,
    pub log_level: Option<String>,
    pub log_file: Option<String>,
    pub log_stdout: Option<bool>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("sftp_host", &self.sftp_host)
            .field("sftp_port", &self.sftp_port)
            .field("sftp_username", &self.sftp_username)
            .field("sftp_password", &self.sftp_password.as_ref().map(|_| "<redacted>"))
            .field("sleep_timeout_ms", &self.sleep_timeout_ms)
            .field("log_level", &self.log_level)
            .field("log_file", &self.log_file)
            .field("log_stdout", &self.log_stdout)
            .finish()
    }
}

impl AppConfig {
    /// Loads the configuration file, then applies environment overrides.
    ///
    /// An explicit `path` must exist. Without one,
    /// `<config dir>/sftp-sync-tester/config.yaml` is read when present and
    /// silently skipped otherwise.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, AppError> {
        let mut builder = Config::builder();

        match path {
            Some(path) => {
                let path = PathBuf::from(shellexpand::tilde(path).into_owned());
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(path) = default_config_path() {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        for (key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    // 接続設定を取り出して検証する
    // Extracts and validates the connection settings. The password moves into
    // `SftpSettings`; no plaintext copy stays behind in the config.
    pub fn sftp_settings(&mut self) -> Result<SftpSettings, AppError> {
        let host = self
            .sftp_host
            .clone()
            .ok_or_else(|| AppError::Validation("SFTP host is not configured (SFTP_HOST)".into()))?;
        let username = self.sftp_username.clone().ok_or_else(|| {
            AppError::Validation("SFTP username is not configured (SFTP_USERNAME)".into())
        })?;
        let password = self.sftp_password.take().map(Zeroizing::new).ok_or_else(|| {
            AppError::Validation("SFTP password is not configured (SFTP_PASSWORD)".into())
        })?;

        let settings = SftpSettings {
            host,
            port: self.sftp_port.unwrap_or(DEFAULT_SFTP_PORT),
            username,
            password,
            sleep_timeout_ms: self.sleep_timeout_ms.unwrap_or(DEFAULT_SLEEP_TIMEOUT_MS),
        };

        settings
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid SFTP settings: {}", e)))?;

        Ok(settings)
    }
}

fn default_config_path() -> Option<PathBuf> {
    let strategy = choose_base_strategy().ok()?;
    let mut path = strategy.config_dir();
    path.push("sftp-sync-tester");
    path.push("config.yaml");
    Some(path)
}

#[derive(Clone, Validate)]
pub struct SftpSettings {
    #[validate(length(min = 1, max = 253))]
    pub host: String,

    #[validate(range(min = 1))]
    pub port: u16,

    #[validate(length(min = 1))]
    pub username: String,

    pub password: Zeroizing<String>,

    pub sleep_timeout_ms: u64,
}

impl SftpSettings {
    pub fn sleep_timeout(&self) -> Duration {
        Duration::from_millis(self.sleep_timeout_ms)
    }

    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for SftpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SftpSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("sleep_timeout_ms", &self.sleep_timeout_ms)
            .finish()
    }
}
