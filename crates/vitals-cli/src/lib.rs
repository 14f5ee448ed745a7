pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod import;

pub use db::Database;
pub use error::{Result, VitalsError};
