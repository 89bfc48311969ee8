pub mod handler;
pub mod protocol;
pub mod runner;
pub mod sftp;

pub use handler::*;
pub use protocol::*;
pub use runner::*;
pub use sftp::*;
