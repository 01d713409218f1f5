//! # IPC
//!
//! Newline-delimited JSON over stdin/stdout.

pub mod handler;
pub mod hex;
pub mod messages;

pub use handler::IpcHandler;
pub use messages::{
    ErrorBody, ErrorKind, RegistryRequest, RegistryResponse, RequestEnvelope, ResponseBody,
};
