pub mod backtest;
pub mod generator;
pub mod store;
pub mod writer;

pub use generator::SignalEngine;
pub use store::{SqliteBarSource, SqliteSignalStore};
pub use writer::SignalWriter;
