//! Error type shared by every invoice rendering operation.

use thiserror::Error;

use crate::surface::SurfaceError;

/// Failures surfaced by [`InvoiceRenderer`](crate::InvoiceRenderer).
///
/// Every variant is terminal for the call that produced it. The renderer itself stays usable.
#[derive(Error, Debug)]
pub enum InvoiceError {
    /// A construction argument or a generation request failed its precondition check.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// A typeface could not be loaded or registered with the drawing surface.
    #[error("failed to register typeface '{name}'")]
    TypefaceRegistration {
        name: String,
        #[source]
        source: SurfaceError,
    },
    /// The logo image could not be read or decoded.
    #[error("failed to decode image {path}")]
    ImageDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    /// The drawing surface rejected a primitive operation.
    #[error("drawing failed while rendering {step}")]
    Drawing {
        step: &'static str,
        #[source]
        source: SurfaceError,
    },
    /// The finished document could not be written to its output target.
    #[error("failed to emit document to {target}")]
    OutputEmission {
        target: String,
        #[source]
        source: SurfaceError,
    },
}

impl InvoiceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns `true` for precondition failures.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = InvoiceError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    fn chain(error: &InvoiceError) -> Vec<String> {
        let mut messages = vec![error.to_string()];
        let mut current: &dyn std::error::Error = error;
        while let Some(source) = current.source() {
            messages.push(source.to_string());
            current = source;
        }
        messages
    }

    #[test]
    fn each_cause_appears_once_in_the_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only filesystem");
        let err = InvoiceError::OutputEmission {
            target: "out.pdf".to_owned(),
            source: SurfaceError::with_source("cannot write out.pdf", io),
        };

        let messages = chain(&err);
        assert_eq!(
            messages,
            ["failed to emit document to out.pdf", "cannot write out.pdf", "read-only filesystem"]
        );
        for message in &messages[..2] {
            assert!(!message.contains("read-only filesystem"));
        }
    }
}
