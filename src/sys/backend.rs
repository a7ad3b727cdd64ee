use thiserror::Error;

use crate::model::DisplayConfig;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("unrecognised output line: {0:?}")]
    Parse(String),
}

/// Seam to the display system. `snapshot` enumerates the live outputs into a
/// [`DisplayConfig`], `can_apply` is the validity gate consulted before
/// committing a computed layout, and `apply` commits synchronously.
pub trait Backend {
    fn snapshot(&mut self) -> Result<DisplayConfig, BackendError>;
    fn can_apply(&self, config: &DisplayConfig) -> bool;
    fn apply(&mut self, config: &DisplayConfig) -> Result<(), BackendError>;
}
