//! Hand-off surface between the tracer and renderers.

pub mod dto;
