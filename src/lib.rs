pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod imaging;
pub mod utils;

#[cfg(test)]
mod test_support;

pub use adapters::storage::{InPlaceStorage, LocalStorage};
pub use adapters::xnat::{Credentials, XnatClient};
pub use config::TomlConfig;
pub use crate::core::{batch::BatchBurner, burn::TextBurner, scan_finder::ScanFinder};
pub use imaging::TextRenderer;
pub use utils::error::{Result, TestkitError};
