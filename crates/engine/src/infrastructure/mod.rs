//! Infrastructure: ports and in-process adapters.

pub mod memory;
pub mod ports;
