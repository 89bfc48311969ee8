use std::{fs::File, io::copy, net::TcpStream, path::Path, sync::Arc};

use log::{debug, warn};
use ssh2::{Session, Sftp};

use crate::{Logger, SessionConnector, SftpSession, SftpSettings, TransferError};

/// Connects with `ssh2` using password authentication.
///
/// The server host key is never checked against a known-hosts file: any key is
/// accepted. A warning is logged for every session opened this way.
pub struct Ssh2Connector {
    settings: Arc<SftpSettings>,
}

impl Ssh2Connector {
    pub fn new(settings: Arc<SftpSettings>) -> Self {
        Ssh2Connector { settings }
    }
}

impl SessionConnector for Ssh2Connector {
    type Session = Ssh2Session;

    fn connect(&self, logger: &Logger) -> Result<Ssh2Session, TransferError> {
        let endpoint = self.settings.endpoint();

        // SSHセッションを開始
        let tcp = TcpStream::connect((self.settings.host.as_str(), self.settings.port))
            .map_err(|e| {
                TransferError::connection(format!("failed to connect to {}", endpoint), e)
            })?;

        let mut session = Session::new()
            .map_err(|e| TransferError::connection("failed to create SSH session", e))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| {
            TransferError::connection(format!("SSH handshake with {} failed", endpoint), e)
        })?;

        if let Some((_, key_type)) = session.host_key() {
            debug!(logger: logger, "Server {} presented a {:?} host key", endpoint, key_type);
        }
        warn!(
            logger: logger,
            "Host key verification is disabled; accepting any host key from {}", endpoint
        );

        session
            .userauth_password(&self.settings.username, &self.settings.password)
            .map_err(|e| TransferError::Authentication {
                context: format!(
                    "password authentication as '{}' failed",
                    self.settings.username
                ),
                source: Some(Box::new(e)),
            })?;

        if !session.authenticated() {
            return Err(TransferError::authentication(format!(
                "server did not authenticate '{}'",
                self.settings.username
            )));
        }

        let sftp = session
            .sftp()
            .map_err(|e| TransferError::protocol("failed to start the SFTP subsystem", e))?;

        Ok(Ssh2Session {
            sftp,
            _session: Disconnect(session),
        })
    }

    fn endpoint(&self) -> String {
        self.settings.endpoint()
    }
}

// フィールドは宣言順に破棄される: SFTP チャネルを閉じてから切断する
// Fields drop in declaration order: the SFTP channel shuts down before the
// SSH session disconnects.
pub struct Ssh2Session {
    sftp: Sftp,
    _session: Disconnect,
}

struct Disconnect(Session);

impl Drop for Disconnect {
    fn drop(&mut self) {
        // Best effort; the socket is closed when the session drops either way.
        let _ = self.0.disconnect(
            Some(ssh2::DisconnectCode::ByApplication),
            "transfer finished",
            None,
        );
    }
}

impl SftpSession for Ssh2Session {
    fn put(&mut self, local_path: &Path, remote_path: &str) -> Result<u64, TransferError> {
        let mut local_file = File::open(local_path).map_err(|e| {
            let context = format!("failed to open local file '{}'", local_path.display());
            TransferError::filesystem(context, e)
        })?;
        // create() opens with WRITE | CREATE | TRUNCATE
        let mut remote_file = self.sftp.create(Path::new(remote_path)).map_err(|e| {
            TransferError::protocol(format!("failed to create remote file '{}'", remote_path), e)
        })?;

        copy(&mut local_file, &mut remote_file).map_err(|e| {
            TransferError::protocol(
                format!("failed to copy '{}' to remote '{}'", local_path.display(), remote_path),
                e,
            )
        })
    }

    fn list_dir(&mut self, remote_dir: &str) -> Result<Vec<String>, TransferError> {
        let entries = self.sftp.readdir(Path::new(remote_dir)).map_err(|e| {
            let context = format!("failed to list remote directory '{}'", remote_dir);
            TransferError::protocol(context, e)
        })?;

        Ok(entries
            .into_iter()
            .filter_map(|(path, _)| path.file_name().map(|n| n.to_string_lossy().into_owned()))
            .collect())
    }

    fn get(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, TransferError> {
        let mut remote_file = self.sftp.open(Path::new(remote_path)).map_err(|e| {
            TransferError::protocol(format!("failed to open remote file '{}'", remote_path), e)
        })?;
        let mut local_file = File::create(local_path).map_err(|e| {
            let context = format!("failed to create local file '{}'", local_path.display());
            TransferError::filesystem(context, e)
        })?;

        copy(&mut remote_file, &mut local_file).map_err(|e| {
            TransferError::protocol(
                format!("failed to copy remote '{}' to '{}'", remote_path, local_path.display()),
                e,
            )
        })
    }
}
