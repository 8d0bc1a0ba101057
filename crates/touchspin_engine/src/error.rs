//! Error types for touchspin_engine
//!
//! Only construction can fail. Runtime operations on an engine recover
//! locally and never surface errors to the caller.

use thiserror::Error;

/// Failure reported by a renderer hook
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer does not provide a hook the configuration requires
    #[error("hook not implemented: {0}")]
    MissingHook(&'static str),

    /// The renderer could not build its markup
    #[error("{0}")]
    Failed(String),
}

/// Errors raised while building an engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A required renderer hook is missing
    #[error("Renderer '{renderer}' is missing required hook '{hook}'")]
    MissingRendererHook {
        renderer: String,
        hook: &'static str,
    },

    /// A renderer hook failed
    #[error("Renderer '{renderer}' failed in '{hook}': {reason}")]
    Renderer {
        renderer: String,
        hook: &'static str,
        reason: String,
    },
}

impl EngineError {
    /// Attribute a hook failure to `renderer`
    pub fn from_render(renderer: &str, hook: &'static str, err: RenderError) -> Self {
        match err {
            RenderError::MissingHook(missing) => EngineError::MissingRendererHook {
                renderer: renderer.to_string(),
                hook: missing,
            },
            RenderError::Failed(reason) => EngineError::Renderer {
                renderer: renderer.to_string(),
                hook,
                reason,
            },
        }
    }
}

/// Result type for engine construction
pub type Result<T> = std::result::Result<T, EngineError>;
