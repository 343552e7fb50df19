//! Request authentication.
//!
//! The similarity API is called by trusted backends that share a single
//! secret, sent in the `X-ACCESS-TOKEN` header.

pub mod token;

pub use token::{
    ACCESS_TOKEN_HEADER, INVALID_TOKEN_MESSAGE, MISSING_TOKEN_MESSAGE, TokenAuth, require_token,
};
