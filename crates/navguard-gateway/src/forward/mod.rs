//! Backend forwarding: endpoint table lives on `BrowserCommand`, transport
//! behind the `AutomationBackend` trait.

pub mod backend;
pub mod forwarder;

pub use backend::{AutomationBackend, HttpBackend};
pub use forwarder::ActionForwarder;
