//! Top-level facade crate for navguard.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use navguard_core::*;
}

pub mod gateway {
    pub use navguard_gateway::*;
}
