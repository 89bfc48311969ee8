#![allow(dead_code)]

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, mpsc},
    thread,
    time::{Duration, Instant},
};

use log::LevelFilter;
use sftp_sync_tester::{Logger, SessionConnector, SftpSession, TransferError, base_dispatch};

// A "server" that lives in a local directory.
#[derive(Default)]
pub struct LocalConnector {
    pub root: PathBuf,
    pub connect_delay: Duration,
    pub fail_put: bool,
    pub fail_get: bool,
    pub fail_list: bool,
    pub panic_on_put: bool,
    pub connects: Arc<Mutex<Vec<Instant>>>,
    pub listings: Arc<Mutex<Vec<(Instant, String)>>>,
}

impl LocalConnector {
    pub fn new(root: &Path) -> Self {
        LocalConnector {
            root: root.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn remote(&self, remote_path: &str) -> PathBuf {
        self.root.join(remote_path.trim_start_matches('/'))
    }

    pub fn seed(&self, remote_path: &str, contents: &[u8]) {
        let path = self.remote(remote_path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }
}

impl SessionConnector for LocalConnector {
    type Session = LocalSession;

    fn connect(&self, _logger: &Logger) -> Result<LocalSession, TransferError> {
        self.connects.lock().unwrap().push(Instant::now());
        thread::sleep(self.connect_delay);
        Ok(LocalSession {
            root: self.root.clone(),
            fail_put: self.fail_put,
            fail_get: self.fail_get,
            fail_list: self.fail_list,
            panic_on_put: self.panic_on_put,
            listings: Arc::clone(&self.listings),
        })
    }

    fn endpoint(&self) -> String {
        "local:0".to_string()
    }
}

pub struct LocalSession {
    root: PathBuf,
    fail_put: bool,
    fail_get: bool,
    fail_list: bool,
    panic_on_put: bool,
    listings: Arc<Mutex<Vec<(Instant, String)>>>,
}

impl LocalSession {
    fn remote(&self, remote_path: &str) -> PathBuf {
        self.root.join(remote_path.trim_start_matches('/'))
    }
}

impl SftpSession for LocalSession {
    fn put(&mut self, local_path: &Path, remote_path: &str) -> Result<u64, TransferError> {
        if self.panic_on_put {
            panic!("simulated crash during upload");
        }
        if self.fail_put {
            return Err(TransferError::connection(
                "simulated unreachable host",
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        let target = self.remote(remote_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| TransferError::filesystem("failed to create remote dir", e))?;
        }
        fs::copy(local_path, target).map_err(|e| TransferError::filesystem("put failed", e))
    }

    fn list_dir(&mut self, remote_dir: &str) -> Result<Vec<String>, TransferError> {
        self.listings
            .lock()
            .unwrap()
            .push((Instant::now(), remote_dir.to_string()));
        if self.fail_list {
            return Err(TransferError::protocol(
                "simulated unreadable directory",
                io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
            ));
        }
        let mut names: Vec<String> = fs::read_dir(self.remote(remote_dir))
            .map_err(|e| TransferError::protocol("no such directory", e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    fn get(&mut self, remote_path: &str, local_path: &Path) -> Result<u64, TransferError> {
        if self.fail_get {
            return Err(TransferError::protocol(
                "simulated missing remote file",
                io::Error::new(io::ErrorKind::NotFound, "no such file"),
            ));
        }
        fs::copy(self.remote(remote_path), local_path)
            .map_err(|e| TransferError::protocol("get failed", e))
    }
}

pub fn sample_bytes() -> Vec<u8> {
    (0..8192u32).map(|i| (i * 31 % 251) as u8).collect()
}

pub fn capture_logger() -> (Logger, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel();
    let logger = Logger::from_dispatch(base_dispatch(LevelFilter::Debug).chain(tx));
    (logger, rx)
}
