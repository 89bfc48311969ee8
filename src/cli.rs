use std::{ffi::OsString, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use log::info;

use crate::{AppConfig, AppError, Logger, Ssh2Connector, TransferRunner};

#[derive(Debug, Parser)]
#[command(name = "sftp-sync-tester", version)]
#[command(about = "SFTP File Transfer Sync Tester: uploads and downloads a file concurrently")]
pub struct Cli {
    #[arg(
        short,
        long = "input_file_path",
        value_name = "PATH",
        help = "Path to input file, including filename - (required)"
    )]
    pub input_file_path: Option<PathBuf>,

    #[arg(
        short,
        long = "upload_file_path",
        value_name = "REMOTE_PATH",
        help = "remote path for upload, including filename - (required)"
    )]
    pub upload_file_path: Option<String>,

    #[arg(
        short,
        long = "output_file_path",
        value_name = "PATH",
        help = "local path for download, including filename - (required)"
    )]
    pub output_file_path: Option<PathBuf>,

    #[arg(short, long, value_name = "FILE", help = "Configuration file (YAML)")]
    pub config: Option<String>,
}

// 引数解析の結果
// What the process should do after looking at its arguments.
#[derive(Debug)]
pub enum CliOutcome {
    Parsed(Cli),
    /// No arguments at all: print help and exit 0.
    ShowHelp,
    /// `--help` / `--version`, printed by clap itself.
    Informational(clap::Error),
    /// Unparseable arguments: print the error and help, exit 0.
    Invalid(clap::Error),
}

/// The three paths a run needs, exactly as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferArgs {
    pub input_file_path: PathBuf,
    pub upload_file_path: String,
    pub output_file_path: PathBuf,
}

impl Cli {
    pub fn parse_args<I, T>(args: I) -> CliOutcome
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if args.len() <= 1 {
            return CliOutcome::ShowHelp;
        }

        match Cli::try_parse_from(args) {
            Ok(cli) => CliOutcome::Parsed(cli),
            Err(e) => match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    CliOutcome::Informational(e)
                }
                _ => CliOutcome::Invalid(e),
            },
        }
    }

    pub fn print_help() {
        let _ = Cli::command().print_help();
        println!();
    }

    // 必須引数と入力ファイルの存在を確認する
    // Checks the required paths are present and the input file exists.
    pub fn validate(&self) -> Result<TransferArgs, AppError> {
        let input_file_path = self.input_file_path.clone().ok_or_else(|| {
            AppError::Usage("Input File is a mandatory argument, see help options".into())
        })?;

        if !input_file_path.is_file() {
            return Err(AppError::Usage(format!(
                "[{}] Input File not found",
                input_file_path.display()
            )));
        }

        let upload_file_path = self.upload_file_path.clone().ok_or_else(|| {
            AppError::Usage("Upload File Path is a mandatory argument, see help options".into())
        })?;

        let output_file_path = self.output_file_path.clone().ok_or_else(|| {
            AppError::Usage("Output File is a mandatory argument, see help options".into())
        })?;

        Ok(TransferArgs {
            input_file_path,
            upload_file_path,
            output_file_path,
        })
    }
}

/// Validates the arguments, then runs both transfers against the configured server.
pub async fn dispatch(
    cli: Cli,
    app_config: &mut AppConfig,
    logger: &Logger,
) -> Result<(), AppError> {
    info!(logger: logger, "SFTP File Transfer Sync Tester");

    // 1. 引数の検証（ネットワークに触れる前）
    let args = cli.validate()?;

    // 2. 接続設定
    let settings = Arc::new(app_config.sftp_settings()?);
    let delay = settings.sleep_timeout();
    let connector = Arc::new(Ssh2Connector::new(settings));

    // 3. 転送実行
    TransferRunner::new(connector, delay, logger.clone())
        .run(&args)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(args: &[&str]) -> Cli {
        match Cli::parse_args(args.iter().copied()) {
            CliOutcome::Parsed(cli) => cli,
            other => panic!("Expected parsed arguments, got {:?}", other),
        }
    }

    #[test]
    fn test_no_arguments_shows_help() {
        assert!(matches!(
            Cli::parse_args(["sftp-sync-tester"]),
            CliOutcome::ShowHelp
        ));
    }

    #[test]
    fn test_unknown_flag_is_invalid() {
        assert!(matches!(
            Cli::parse_args(["sftp-sync-tester", "--bogus"]),
            CliOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_help_is_informational() {
        assert!(matches!(
            Cli::parse_args(["sftp-sync-tester", "--help"]),
            CliOutcome::Informational(_)
        ));
    }

    #[test]
    fn test_short_and_long_flags() {
        let cli = parsed(&[
            "sftp-sync-tester",
            "-i",
            "in.bin",
            "--upload_file_path",
            "upload/in.bin",
            "-o",
            "out.bin",
        ]);
        assert_eq!(cli.input_file_path, Some(PathBuf::from("in.bin")));
        assert_eq!(cli.upload_file_path.as_deref(), Some("upload/in.bin"));
        assert_eq!(cli.output_file_path, Some(PathBuf::from("out.bin")));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_validate_missing_input() {
        let cli = parsed(&["sftp-sync-tester", "-u", "upload/x", "-o", "out"]);
        let result = cli.validate();
        assert!(matches!(result, Err(AppError::Usage(msg)) if msg.contains("Input File")));
    }

    #[test]
    fn test_validate_input_not_found() {
        let cli = parsed(&[
            "sftp-sync-tester",
            "-i",
            "/definitely/not/here.bin",
            "-u",
            "upload/x",
            "-o",
            "out",
        ]);
        let result = cli.validate();
        assert!(matches!(result, Err(AppError::Usage(msg)) if msg.contains("not found")));
    }

    #[test]
    fn test_validate_missing_upload() {
        let input = tempfile::NamedTempFile::new().unwrap();
        let input_path = input.path().to_string_lossy().into_owned();
        let cli = parsed(&["sftp-sync-tester", "-i", &input_path, "-o", "out"]);
        let result = cli.validate();
        assert!(
            matches!(result, Err(AppError::Usage(msg)) if msg.contains("Upload File Path"))
        );
    }

    #[test]
    fn test_validate_missing_output() {
        let input = tempfile::NamedTempFile::new().unwrap();
        let input_path = input.path().to_string_lossy().into_owned();
        let cli = parsed(&["sftp-sync-tester", "-i", &input_path, "-u", "upload/x"]);
        let result = cli.validate();
        assert!(matches!(result, Err(AppError::Usage(msg)) if msg.contains("Output File")));
    }

    #[test]
    fn test_validate_keeps_paths_unchanged() {
        let input = tempfile::NamedTempFile::new().unwrap();
        let input_path = input.path().to_string_lossy().into_owned();
        let cli = parsed(&[
            "sftp-sync-tester",
            "-i",
            &input_path,
            "-u",
            "./upload//x.bin",
            "-o",
            "../out.bin",
        ]);
        let args = cli.validate().unwrap();
        assert_eq!(args.input_file_path, PathBuf::from(&input_path));
        assert_eq!(args.upload_file_path, "./upload//x.bin");
        assert_eq!(args.output_file_path, PathBuf::from("../out.bin"));
    }
}
