//! Host port inspection.

pub mod conflict;

pub use conflict::{PortConflict, ProcessInfo};
