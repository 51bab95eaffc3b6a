pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod git;
pub mod identity;
pub mod metrics;
pub mod model;
pub mod names;
pub mod show;
pub mod store;
pub mod summary;
pub mod util;
pub mod window;

pub use error::{GconcError, Result};
