//! Application use cases.

pub mod builder_session;
