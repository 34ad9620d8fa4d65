pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod io;
pub mod logging;
pub mod storage;

pub use config::Config;
pub use domain::*;
pub use storage::Repository;
