use std::{fmt, path::Path, thread, time::Duration};

use log::{error, info};

use crate::{Logger, SessionConnector, SftpSession, TransferError, remote_parent_dir};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Upload,
    Download,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskKind::Upload => f.write_str("upload"),
            TaskKind::Download => f.write_str("download"),
        }
    }
}

/// Pushes `local_path` to `remote_path` over a fresh session. Single attempt.
pub fn upload_file<C: SessionConnector>(
    connector: &C,
    logger: &Logger,
    local_path: &Path,
    remote_path: &str,
) -> Result<(), TransferError> {
    info!(
        logger: logger,
        "Starting SFTP transfer of file - {} to Server - {} /{}",
        local_path.display(),
        connector.endpoint(),
        remote_path
    );

    let result = connector.connect(logger).and_then(|mut session| {
        let bytes = session.put(local_path, remote_path)?;
        info!(logger: logger, "SFTP file upload complete ({} bytes)", bytes);
        Ok(())
    });

    if let Err(e) = &result {
        log_failure(logger, TaskKind::Upload, e);
    }
    result
}

/// Waits `delay`, then pulls `remote_path` to `local_path` over a fresh session.
///
/// The directory holding `remote_path` is listed first. The entries are only
/// logged, but a failed listing fails the download like any other error.
pub fn download_file<C: SessionConnector>(
    connector: &C,
    logger: &Logger,
    delay: Duration,
    remote_path: &str,
    local_path: &Path,
) -> Result<(), TransferError> {
    // アップロードが先に終わるよう、設定された時間だけ待機する
    // Give the concurrently started upload a head start.
    thread::sleep(delay);

    let result = connector.connect(logger).and_then(|mut session| {
        let remote_dir = remote_parent_dir(remote_path);
        // 一覧は診断用の出力のみ。失敗した場合はタスク全体が失敗する
        let entries = session.list_dir(remote_dir)?;
        info!(
            logger: logger,
            "Directory listing of '{}'...\n{}\n...",
            remote_dir,
            entries.join("\n")
        );

        info!(
            logger: logger,
            "Starting SFTP transfer of file - {} from Server - {} -> {}",
            remote_path,
            connector.endpoint(),
            local_path.display()
        );
        let bytes = session.get(remote_path, local_path)?;
        info!(logger: logger, "SFTP file download complete ({} bytes)", bytes);
        Ok(())
    });

    if let Err(e) = &result {
        log_failure(logger, TaskKind::Download, e);
    }
    result
}

fn log_failure(logger: &Logger, task: TaskKind, e: &TransferError) {
    error!(logger: logger, "SFTP file {} failed [{}]", task, e.category());
    error!(logger: logger, "Error: \n {} \n", e.chain());
}
