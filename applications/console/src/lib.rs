//! Encore Console
//!
//! Terminal front-end for the Encore session registry. Audio is simulated
//! with timers, tracks come from a configured catalog and all output goes
//! to stdout.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod presenter;

pub use backend::SimulatedBackend;
pub use catalog::CatalogResolver;
pub use config::ConsoleConfig;
pub use error::{ConsoleError, Result};
pub use presenter::TerminalPresenter;
