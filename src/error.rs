use thiserror::Error;

/// Failure of a report run. Nothing is produced when either kind is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Match data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Narrative generation failed: {0}")]
    GenerationFailed(String),
}

impl ReportError {
    pub fn data_unavailable(msg: impl Into<String>) -> Self {
        Self::DataUnavailable(msg.into())
    }

    pub fn generation_failed(msg: impl Into<String>) -> Self {
        Self::GenerationFailed(msg.into())
    }

    pub fn is_data_unavailable(&self) -> bool {
        matches!(self, Self::DataUnavailable(_))
    }

    pub fn is_generation_failed(&self) -> bool {
        matches!(self, Self::GenerationFailed(_))
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
