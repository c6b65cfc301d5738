//! # Pactum Content
//!
//! Decoders that turn already-materialized message parts into the primitive
//! tree (`serde_json::Value`) that rules match against.
//!
//! - [`BodyDecoder`] dispatches on the normalized content type.
//! - [`HeaderDecoder`] normalizes names and folds repeated headers.
//! - [`BodyEncoder`] is the inverse of `BodyDecoder`, used to turn samples
//!   back into message bodies.

pub mod body;
pub mod error;
pub mod headers;

pub use body::{BodyDecoder, BodyEncoder, MediaType, normalize_content_type, scalar_text};
pub use error::ContentError;
pub use headers::HeaderDecoder;
