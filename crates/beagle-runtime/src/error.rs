use thiserror::Error;

/// Failure of a single action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActionError {
    /// A `SetContext` value expression evaluated to `null`. This is the one
    /// action failure that is returned to the caller of `handle_event`.
    #[error("value of context {context_id:?} evaluated to null")]
    EvaluatedToNull { context_id: String },

    #[error("bound property {property:?} could not be evaluated")]
    Unresolved { property: &'static str },

    #[error("no {0} is configured")]
    MissingCollaborator(&'static str),

    #[error("dispatcher was disposed")]
    Disposed,
}

/// Invalid runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cache_capacity must be at least 1")]
    ZeroCapacity,
}
