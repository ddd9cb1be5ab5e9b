use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a model instance
///
/// `Finalized` is terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelStatus {
    /// No configuration file has been written yet
    Unconfigured,
    /// The configuration file exists and the model process has been started
    Configured,
    /// The model process has been initialized and can be stepped
    Running,
    /// The model process has been released
    Finalized,
}

impl ModelStatus {
    pub fn is_finalized(&self) -> bool {
        matches!(self, ModelStatus::Finalized)
    }
}

impl fmt::Display for ModelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModelStatus::Unconfigured => "unconfigured",
            ModelStatus::Configured => "configured",
            ModelStatus::Running => "running",
            ModelStatus::Finalized => "finalized",
        };
        write!(f, "{}", name)
    }
}
