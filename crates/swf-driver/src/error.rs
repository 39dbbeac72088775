use std::fmt;

/// Errors that can occur while describing a container.
///
/// Rendering only writes into a `String`, so the one failure is the
/// formatter refusing a write.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Format(#[from] fmt::Error),
}
