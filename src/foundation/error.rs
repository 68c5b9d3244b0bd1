/// Convenience result type used across depthloop.
pub type DepthloopResult<T> = Result<T, DepthloopError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Animation parameters are never a source of errors: they are clamped at the boundary.
#[derive(thiserror::Error, Debug)]
pub enum DepthloopError {
    /// A diffuse image and depth map could not be paired (dimension mismatch or missing data).
    #[error("invalid depth image pair: {0}")]
    InvalidDepthImagePair(String),

    /// A raw depth buffer has no usable samples.
    #[error("invalid depth data: {0}")]
    InvalidDepthData(String),

    /// Export failed while rendering, encoding or finalizing the output.
    #[error("encoding error{}: {message}", frame_suffix(.frame))]
    Encoding {
        /// Index of the frame that failed, when the failure is tied to a frame.
        frame: Option<u64>,
        /// Human-readable reason.
        message: String,
    },

    /// Invalid caller input that is not an animation parameter.
    #[error("validation error: {0}")]
    Validation(String),

    /// Internal failure while rendering a frame.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn frame_suffix(frame: &Option<u64>) -> String {
    match frame {
        Some(f) => format!(" at frame {f}"),
        None => String::new(),
    }
}

impl DepthloopError {
    /// Build a [`DepthloopError::InvalidDepthImagePair`] value.
    pub fn invalid_pair(msg: impl Into<String>) -> Self {
        Self::InvalidDepthImagePair(msg.into())
    }

    /// Build a [`DepthloopError::InvalidDepthData`] value.
    pub fn invalid_depth(msg: impl Into<String>) -> Self {
        Self::InvalidDepthData(msg.into())
    }

    /// Build a [`DepthloopError::Encoding`] value tied to frame `frame`.
    pub fn encoding_at(frame: u64, msg: impl Into<String>) -> Self {
        Self::Encoding {
            frame: Some(frame),
            message: msg.into(),
        }
    }

    /// Build a [`DepthloopError::Encoding`] value not tied to a frame.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
            frame: None,
            message: msg.into(),
        }
    }

    /// Build a [`DepthloopError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DepthloopError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Index of the failing frame for encoding errors.
    pub fn failed_frame(&self) -> Option<u64> {
        match self {
            Self::Encoding { frame, .. } => *frame,
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
