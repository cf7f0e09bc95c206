use thiserror::Error;

/// Errors surfaced while configuring the engines or wiring host adapters.
///
/// Runtime interaction paths never produce these: they degrade instead
/// (reveal immediately, skip the scroll, ignore the stale call).
#[derive(Debug, Error)]
pub enum FolioError {
    #[error("unknown reveal animation `{0}`")]
    UnknownVariant(String),

    #[error("intersection threshold {0} is outside [0, 1]")]
    InvalidThreshold(f32),

    #[error("tour has no steps")]
    EmptyTour,

    #[error("host primitive unavailable: {0}")]
    HostUnavailable(String),

    #[error("invalid manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}
