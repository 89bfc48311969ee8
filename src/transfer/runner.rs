use std::{path::PathBuf, sync::Arc, time::Duration};

use log::{error, info};
use tokio::task::JoinError;

use crate::{
    AppError, Logger, SessionConnector, TaskFailure, TaskKind, TransferArgs, TransferError,
    download_file, upload_file,
};

/// Runs the upload and the download side by side and waits for both.
///
/// A runner that has not been started is idle; `run` moves it through running
/// to either `Ok(())` (both transfers succeeded) or `AppError::TransferFailed`.
pub struct TransferRunner<C> {
    connector: Arc<C>,
    download_delay: Duration,
    logger: Logger,
}

impl<C: SessionConnector> TransferRunner<C> {
    pub fn new(connector: Arc<C>, download_delay: Duration, logger: Logger) -> Self {
        TransferRunner {
            connector,
            download_delay,
            logger,
        }
    }

    pub async fn run(self, args: &TransferArgs) -> Result<(), AppError> {
        let upload = {
            let connector = Arc::clone(&self.connector);
            let logger = self.logger.clone();
            let local: PathBuf = args.input_file_path.clone();
            let remote = args.upload_file_path.clone();
            tokio::task::spawn_blocking(move || upload_file(&*connector, &logger, &local, &remote))
        };

        let download = {
            let connector = Arc::clone(&self.connector);
            let logger = self.logger.clone();
            let delay = self.download_delay;
            let remote = args.upload_file_path.clone();
            let local: PathBuf = args.output_file_path.clone();
            tokio::task::spawn_blocking(move || {
                download_file(&*connector, &logger, delay, &remote, &local)
            })
        };

        // 両方の完了を待ってから判定する
        // Both results are collected before deciding.
        let (upload_result, download_result) = tokio::join!(upload, download);

        let failures: Vec<TaskFailure> = [
            (TaskKind::Upload, upload_result),
            (TaskKind::Download, download_result),
        ]
        .into_iter()
        .filter_map(|(task, result)| self.failure_of(task, result))
        .collect();

        if failures.is_empty() {
            info!(logger: &self.logger, "Both file transfers completed successfully");
            Ok(())
        } else {
            Err(AppError::TransferFailed { failures })
        }
    }

    fn failure_of(
        &self,
        task: TaskKind,
        result: Result<Result<(), TransferError>, JoinError>,
    ) -> Option<TaskFailure> {
        match result {
            Ok(Ok(())) => None,
            Ok(Err(error)) => Some(TaskFailure { task, error }),
            Err(join_error) => {
                error!(logger: &self.logger, "SFTP file {} task aborted: {}", task, join_error);
                Some(TaskFailure {
                    task,
                    error: TransferError::Aborted(join_error.to_string()),
                })
            }
        }
    }
}
