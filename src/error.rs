//! Error types for the renderer core.
//!
//! Device-level failures (shader setup, incomplete framebuffers) are fatal and
//! abort the frame. Per-object failures are carried as data by the transform
//! pipeline so the rest of the frame can still be drawn.

use thiserror::Error;

use crate::device::FramebufferStatus;

/// Main error type for the renderer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Object initialization failed.
    #[error("setup failed for '{object}': {reason}")]
    Setup { object: String, reason: String },
    /// Vertex or fragment source was empty.
    #[error("shader source for '{0}' must not be blank")]
    BlankShader(String),
    /// A mandatory vertex attribute could not be located in the program.
    #[error("program for '{object}' is missing mandatory attribute '{attribute}'")]
    MissingAttribute { object: String, attribute: String },
    /// A mesh was set up before any vertex data was supplied.
    #[error("no vertex data supplied for '{0}'")]
    MissingVertexData(String),
    /// Shadow depth target is not device-complete.
    #[error("{pass} shadow framebuffer incomplete: {status:?}")]
    FramebufferIncomplete {
        pass: &'static str,
        status: FramebufferStatus,
    },
    /// A pipeline worker could not read the state it needed.
    #[error("transform task for '{object}' failed: {reason}")]
    PipelineTask { object: String, reason: String },
    /// The object was used before `setup` completed.
    #[error("'{0}' has not been set up")]
    NotSetUp(String),
    /// No object with this name exists in the scene.
    #[error("unknown object '{0}'")]
    UnknownObject(String),
}

impl RenderError {
    /// Whether the error aborts the current frame.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            Self::PipelineTask { .. } | Self::NotSetUp(_) | Self::UnknownObject(_)
        )
    }
}

/// Convenient Result type alias for renderer operations.
pub type Result<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RenderError::BlankShader("crate".to_string());
        assert!(err.to_string().contains("must not be blank"));
    }

    #[test]
    fn test_framebuffer_error_is_fatal() {
        let err = RenderError::FramebufferIncomplete {
            pass: "point",
            status: FramebufferStatus::IncompleteAttachment,
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("point"));
    }

    #[test]
    fn test_task_error_is_not_fatal() {
        let err = RenderError::PipelineTask {
            object: "lamp".into(),
            reason: "no program".into(),
        };
        assert!(!err.is_fatal());
    }
}
