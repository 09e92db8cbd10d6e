//! Administrative routes, ADMIN role only

pub mod revocations;

pub use revocations::{reinstate, session_revocations};
