//! # Pactum Contract
//!
//! A pact pairs the rules for a request with the rules for its response.
//!
//! ```text
//! pact document ──decode_pact──▶ Pact ──assert_request_matches(msg)──▶ Ok / AssertionFailure
//!                                  │
//!                                  ├─ PactRequest   METHOD  PATH  HEADERS  BODY?
//!                                  └─ PactResponse  STATUS_CODE   HEADERS  BODY?
//! ```
//!
//! Messages are read through [`RequestMessage`] and [`ResponseMessage`];
//! headers and bodies are decoded with `pactum-content` before matching.
//! A [`Pact`] is checked once, when assembled: the message described by each
//! side's samples must be accepted by that side.

pub mod assertion;
pub mod document;
pub mod error;
pub mod message;
pub mod pact;
pub mod parts;
pub mod request;
pub mod response;

pub use assertion::{AssertionFailure, assert_request_matches, assert_response_matches};
pub use document::{decode_pact, encode_pact, load_pact, render_pact};
pub use error::PactError;
pub use message::{HttpRequest, HttpResponse, RequestMessage, ResponseMessage};
pub use pact::{PACT_VERSION, Pact};
pub use request::PactRequest;
pub use response::PactResponse;
