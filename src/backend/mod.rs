//! Client for the external compute backend.
//!
//! Every response that carries arrays is checked for consistent lengths before it
//! reaches a page. Requests can run on a background worker; only the response to
//! the most recently submitted request is ever applied.

pub mod api;
mod client;
mod errors;
mod sequencer;
mod worker;

pub use client::BackendClient;
pub(crate) use client::parse_api_url;
pub use errors::BackendError;
pub use sequencer::{RequestSequencer, RequestToken};
pub use worker::{BackendJob, BackendRequest, BackendResponse, BackendResult, BackendWorker, execute};
