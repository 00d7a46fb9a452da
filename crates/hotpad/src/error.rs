use thiserror::Error;

/// Error type for the hotplug subsystem.
#[derive(Debug, Error)]
pub enum Error {
    /// Failed to initialize the driver (SDL2 or subsystems).
    #[error("driver init failed: {0}")]
    BackendInit(String),
    /// The driver refused to reserve custom event kinds.
    #[error("failed to register custom events: {0}")]
    EventRegistration(String),
    /// An event could not be pushed into the driver queue.
    #[error("failed to post event: {0}")]
    Post(String),
    /// The host registry is not accepting devices yet.
    #[error("device registry is not ready")]
    RegistryNotReady,
    /// Settings document could not be parsed.
    #[error("settings error: {0}")]
    Settings(#[from] serde_yaml::Error),
    /// A generic driver error.
    #[error("driver error: {0}")]
    Backend(String),
}

/// Convenient result alias for subsystem operations.
pub type Result<T> = std::result::Result<T, Error>;
