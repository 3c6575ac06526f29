//! Domain layer: node records, the call tracer, and call-tree reconstruction.

pub mod error;
pub mod layout;
pub mod node;
pub mod session;
pub mod timeline;
pub mod tracer;
pub mod tree;
