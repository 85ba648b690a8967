use crate::time::Time;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("Transform for frame '{frame}' at time {time} not available")]
    TransformTimeNotAvailable { frame: String, time: Time },

    #[error("Frames '{from}' and '{to}' do not share a common ancestor")]
    NoCommonAncestor { from: String, to: String },

    #[error("Frame '{0}' does not exist")]
    FrameNotFound(String),

    #[error("Frame '{parent}' is not an ancestor of '{child}'")]
    NotAnAncestor { parent: String, child: String },

    #[error("Setting '{parent}' as parent of '{frame}' would create a cycle")]
    CyclicTransformTree { frame: String, parent: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TransformError {
    /// True for the expected "not enough data yet" failures. These go away on their own as new
    /// samples arrive; every other variant is a caller error.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(
            self,
            TransformError::TransformTimeNotAvailable { .. } | TransformError::NoCommonAncestor { .. }
        )
    }
}

pub type TransformResult<T> = Result<T, TransformError>;
