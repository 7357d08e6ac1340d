//! Anthropic Messages API client.
//!
//! Two operations are exposed through [`LlmClient`]: transcribing a page
//! image into XML and generating a file name from a transcript. Requests
//! always use the fixed [`DECODING`] parameters; only the [`Model`] varies.

pub mod client;
pub mod error;
pub mod model;
pub mod prompts;
pub mod response;
pub mod transport;
pub mod wire;

pub use client::LlmClient;
pub use error::{LlmError, Remedy};
pub use model::{DecodingParams, Model, DECODING};
pub use response::{parse_file_name_generation, response_schema};
pub use transport::{HttpTransport, MessagesTransport};
pub use wire::{ContentBlock, Message, MessagesRequest, MessagesResponse, Role};
