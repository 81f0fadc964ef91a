pub mod config;
pub mod error;
pub mod history;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use history::{HistoryProvider, HistoryRequest};
pub use types::*;
