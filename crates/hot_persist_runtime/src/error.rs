//! Runtime errors.

/// Errors raised by [`HotRuntime`](crate::HotRuntime) and
/// [`HotModule`](crate::HotModule).
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No module is registered under this id.
    #[error("unknown module: {0}")]
    UnknownModule(String),

    /// A module with this id is already registered.
    #[error("module already registered: {0}")]
    DuplicateModule(String),

    /// The module was asked to reload from inside its own dispose callback.
    #[error("module is already reloading: {0}")]
    ReloadInProgress(String),
}

/// Errors raised while installing the tracing subscriber.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    /// The filter directive string could not be parsed.
    #[error("invalid log filter: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}
