//! Core of the Max Bot API client.
//!
//! This crate is intentionally transport-agnostic: socket I/O lives behind
//! the [`transport::Transport`] port implemented by adapter crates
//! (`maxbot-reqwest` for the default HTTP stack). Everything here — the
//! request executor, the entity codec, the error taxonomy and the cursor
//! paging contract — works against that port, which also keeps the whole
//! surface testable without a network.

pub mod api;
pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod paging;
pub mod transport;

pub use client::{MaxClient, Payload};
pub use errors::{ApiError, Error, Result};
pub use paging::Page;
