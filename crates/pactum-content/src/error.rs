use thiserror::Error;

/// A structured body does not parse, or a value cannot be rendered, under
/// its declared media type.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("json body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml body: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
