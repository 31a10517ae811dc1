//! Transport module for asynchronous form submission over HTTP

mod client;
mod request;
mod response;
mod traits;

pub use client::HttpTransport;
pub use request::{SubmitRequest, REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE};
pub use response::SubmissionResult;
pub use traits::SubmitTransport;

#[cfg(test)]
pub use traits::MockSubmitTransport;
