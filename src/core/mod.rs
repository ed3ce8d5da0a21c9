pub mod config;
pub mod diagnostics;
pub mod error;
pub mod types;

pub use config::AutoResolveConfig;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{AutoResolveError, Result};
