//! Error types for surface and configuration operations.

use miette::Diagnostic;
use thiserror::Error;

use crate::surface::NodeId;

/// Errors a surface implementation reports for structural writes.
///
/// The engine treats all of these as recoverable drift: it logs them and lets
/// the next reconcile pass repair the surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SurfaceError {
    /// Node id was never issued by this surface.
    #[error("unknown surface node {0:?}")]
    UnknownNode(NodeId),

    /// Node exists but is not a child of the content root.
    #[error("surface node {0:?} is not attached to the content root")]
    Detached(NodeId),

    /// Range endpoints could not be resolved.
    #[error("invalid surface range: {0}")]
    InvalidRange(String),
}

/// Errors produced while loading editor configuration.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum ConfigError {
    /// Configuration JSON did not parse.
    #[error("failed to parse editor config: {0}")]
    #[diagnostic(code(folio::config::parse))]
    Parse(#[from] serde_json::Error),

    /// A value parsed but is unusable.
    #[error("invalid editor config: {field} {reason}")]
    #[diagnostic(code(folio::config::invalid))]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
