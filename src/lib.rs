pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod transfer;

pub use cli::*;
pub use config::*;
pub use error::*;
pub use logging::*;
pub use transfer::*;
