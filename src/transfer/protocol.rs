use std::path::Path;

use crate::{Logger, TransferError};

/// An open SFTP session. Dropping it closes the underlying connection.
pub trait SftpSession {
    /// Writes the local file to `remote_path`, replacing any existing remote file.
    /// Returns the number of bytes written.
    fn put(&mut self, local_path: &Path, remote_path: &str) -> Result<u64, TransferError>;

    /// Names of the entries in `remote_dir`.
    fn list_dir(&mut self, remote_dir: &str) -> Result<Vec<String>, TransferError>;

    /// Copies `remote_path` to the local file, truncating it if it exists.
    /// Returns the number of bytes written.
    fn get(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, TransferError>;
}

/// Opens a fresh session per call. Shared between the two transfer tasks.
pub trait SessionConnector: Send + Sync + 'static {
    type Session: SftpSession;

    fn connect(&self, logger: &Logger) -> Result<Self::Session, TransferError>;

    /// `host:port` of the server, for log lines.
    fn endpoint(&self) -> String;
}

// 対象ファイルを含むリモートディレクトリ
// The remote directory that contains `remote_path`.
pub fn remote_parent_dir(remote_path: &str) -> &str {
    match remote_path.rsplit_once('/') {
        Some(("", _)) => "/",
        Some((parent, _)) => parent,
        None => ".",
    }
}
