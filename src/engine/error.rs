use thiserror::Error;

/// Failures surfaced by the triage engine.
///
/// None of these leave the queue or the history partially mutated: state is
/// only committed after the collaborator reports success.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The source folder could not be enumerated. The previous queue is kept.
    #[error("Failed to scan {folder}: {reason}")]
    Scan { folder: String, reason: String },

    /// Preview or metadata for one item is unavailable.
    #[error("Failed to load {path}: {reason}")]
    Load { path: String, reason: String },

    /// A move, delete or restore was rejected. Carries the collaborator's message verbatim.
    #[error("{0}")]
    Operation(String),
}

impl EngineError {
    pub fn scan(folder: &str, err: &anyhow::Error) -> Self {
        Self::Scan {
            folder: folder.to_string(),
            reason: format!("{err:#}"),
        }
    }

    pub fn load(path: &str, err: &anyhow::Error) -> Self {
        Self::Load {
            path: path.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
