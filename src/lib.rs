//! sasa-forms - headless form interaction layer
//!
//! Attaches four behaviours to a page's forms: client-side validation with
//! Kenyan phone, email and URL rules; file-input size and type checks with
//! previews and drag-and-drop; repeatable field groups; and asynchronous
//! JSON submission with transient alerts.

pub mod binders;
pub mod config;
pub mod context;
pub mod error;
pub mod state;
pub mod transport;

pub use config::FormsConfig;
pub use context::{FormContext, PageEvent};
pub use error::{FormError, SubmitError};
pub use state::{AlertCenter, Page};
pub use transport::{HttpTransport, SubmissionResult, SubmitRequest, SubmitTransport};
