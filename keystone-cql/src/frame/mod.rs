//! Low-level building blocks of the CQL binary protocol.

pub mod frame_errors;
pub mod types;
