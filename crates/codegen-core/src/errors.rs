//! Error taxonomy for codegen.
//!
//! Only `Validation` is ever returned to a caller from the entity
//! constructors. Load, generate and merge problems are recorded as
//! diagnostics by the engine and never abort a batch.

use thiserror::Error;

pub type CodegenResult<T> = Result<T, CodegenError>;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// A required field was missing; the entity was not created.
    #[error("validation error: {entity}: {message}")]
    Validation { entity: &'static str, message: String },

    /// A source could not be fetched, parsed or loaded.
    #[error("load error: {source_location}: {message}")]
    Load {
        source_location: String,
        message: String,
    },

    /// A generator (or type generator) failed for a target.
    #[error("generate error: {target}: {message}")]
    Generate { target: String, message: String },

    /// Two entities agree on some, but not all, dedup fields.
    #[error("merge ambiguity: {entity} '{name}': {message}")]
    MergeAmbiguity {
        entity: &'static str,
        name: String,
        message: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CodegenError {
    pub fn validation(entity: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            entity,
            message: message.into(),
        }
    }

    pub fn load(source_location: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Load {
            source_location: source_location.into(),
            message: message.into(),
        }
    }

    pub fn generate(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Generate {
            target: target.into(),
            message: message.into(),
        }
    }

    pub fn merge_ambiguity(
        entity: &'static str,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MergeAmbiguity {
            entity,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Stable diagnostic code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Load { .. } => "load.failed",
            Self::Generate { .. } => "generate.failed",
            Self::MergeAmbiguity { .. } => "merge.ambiguity",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::NotFound(_) => "not_found",
            Self::Io(_) => "io",
            Self::Json(_) => "json",
        }
    }
}
