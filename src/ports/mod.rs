use crate::api::dto::TraceDto;
use std::path::PathBuf;

pub mod dot_exporter;

/// Receives every finished trace.
pub trait TraceRenderer {
    fn name(&self) -> &str;
    fn render(&self, trace: &TraceDto) -> anyhow::Result<()>;
}

/// `./{function}_{root input}.{extension}`
pub fn default_output_path(trace: &TraceDto, extension: &str) -> PathBuf {
    PathBuf::from(format!(
        "./{}_{}.{}",
        trace.function,
        trace.root_input(),
        extension
    ))
}
