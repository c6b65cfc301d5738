use pactum_codec::{CodecError, DecodeError};
use pactum_content::ContentError;
use pactum_kernel::{Mismatch, SampleError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PactError {
    #[error("invalid pact version `{version}`")]
    InvalidVersion { version: String },

    #[error("unsupported pact version `{version}`, the newest supported version is `{supported}`")]
    UnsupportedVersion {
        version: String,
        supported: &'static str,
    },

    /// The pact does not satisfy its own samples.
    #[error("{0}")]
    Invalid(Mismatch),

    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error("sample body cannot be encoded: {0}")]
    Content(#[from] ContentError),

    #[error("cannot decode `{path}`: {source}")]
    Decode {
        path: String,
        #[source]
        source: DecodeError,
    },

    #[error("malformed pact document at `{path}`: {reason}")]
    Malformed { path: String, reason: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl PactError {
    pub fn as_mismatch(&self) -> Option<&Mismatch> {
        match self {
            Self::Invalid(mismatch) => Some(mismatch),
            _ => None,
        }
    }
}
