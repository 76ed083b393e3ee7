use std::path::PathBuf;

/// Errors surfaced by the staging engine.
///
/// Missing configuration and disabled categories are not errors; they fall
/// through to the original URN.
#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("aspect `{aspect_name}` of {entity_urn} cannot be serialized: {source}")]
    Serialization {
        entity_urn: String,
        aspect_name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to write staged batch {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode staged batch {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown entity category `{0}`")]
    UnknownCategory(String),

    #[error("environment `{0}` is configured more than once")]
    DuplicateEnvironment(String),

    #[error("environment name `{0}` cannot be used as a staging directory")]
    InvalidEnvironment(String),
}

pub type StagingResult<T> = Result<T, StagingError>;
