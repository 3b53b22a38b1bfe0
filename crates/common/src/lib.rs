pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use store::{BarSource, SignalStore};
pub use types::*;
