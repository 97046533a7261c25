//! `cronhook-dispatch` — outbound HTTP dispatch for scheduled jobs.
//!
//! One [`RequestDispatcher::send`] call per occurrence: build the request
//! from a [`cronhook_core::RequestSpec`], apply cookie / basic-auth
//! decoration, await the full round trip and classify the status. No retry
//! lives here — the next scheduled occurrence is the retry.

pub mod dispatcher;
pub mod error;

pub use dispatcher::RequestDispatcher;
pub use error::{DispatchError, Result};
