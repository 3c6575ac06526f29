pub mod catalog;

use crate::domain::node::{CallArgs, CallOutput};
use crate::domain::tracer::{Body, RecursionTracer, TracerConfig};
use crate::infrastructure::{HtmlRenderer, JsonExporter, TerminalRenderer};
use crate::ports::dot_exporter::DotExporter;
use crate::ports::TraceRenderer;
use anyhow::{anyhow, bail, Context, Result};
use catalog::Demo;
use std::fmt;
use std::path::PathBuf;

/// How the finished trace is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Dot,
    Json,
    Html,
}

impl OutputFormat {
    /// Parse format from string (CLI input).
    pub fn from_name(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(OutputFormat::Text),
            "dot" | "graphviz" => Some(OutputFormat::Dot),
            "json" => Some(OutputFormat::Json),
            "html" => Some(OutputFormat::Html),
            _ => None,
        }
    }
}

/// Summary of one traced top-level call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub function: String,
    pub result: String,
    pub calls: usize,
    pub max_depth: usize,
}

pub struct VisualizeUsecase {
    pub config: TracerConfig,
    pub format: OutputFormat,
    /// Destination for file formats; `None` derives one from the call
    pub output: Option<PathBuf>,
    /// Print every call/return step in text mode
    pub steps: bool,
}

impl VisualizeUsecase {
    /// Renderers for the chosen format. The tracer adds the saved animation
    /// itself, so an HTML format with `save` on and no `output` adds nothing.
    pub fn renderers(&self) -> Vec<Box<dyn TraceRenderer>> {
        let mut renderers: Vec<Box<dyn TraceRenderer>> = Vec::new();
        match self.format {
            OutputFormat::Text => renderers.push(Box::new(TerminalRenderer::new(self.steps))),
            OutputFormat::Dot => renderers.push(Box::new(DotExporter::new(self.output.clone()))),
            OutputFormat::Json => renderers.push(Box::new(JsonExporter::new(self.output.clone()))),
            OutputFormat::Html if self.config.save && self.output.is_none() => {}
            OutputFormat::Html => renderers.push(Box::new(HtmlRenderer::new(self.output.clone()))),
        }
        renderers
    }

    /// Trace `demo` called with `args`.
    pub fn run(&self, demo: Demo, args: &[u64]) -> Result<Outcome> {
        if args.len() != demo.params().len() {
            bail!(
                "{} takes {} argument(s) ({}), got {}",
                demo.name(),
                demo.params().len(),
                demo.params().join(", "),
                args.len()
            );
        }
        let config = self.config.clone();
        let renderers = self.renderers();

        match demo {
            Demo::Fib => execute(
                RecursionTracer::total(demo.name(), config, catalog::fib),
                renderers,
                args[0],
            ),
            Demo::Factorial => execute(
                RecursionTracer::new(demo.name(), config, catalog::factorial),
                renderers,
                args[0],
            ),
            Demo::Binomial => execute(
                RecursionTracer::total(demo.name(), config, catalog::binomial),
                renderers,
                (narrow(args[0], "n")?, narrow(args[1], "k")?),
            ),
            Demo::PowerSet => execute(
                RecursionTracer::total(demo.name(), config, catalog::power_set),
                renderers,
                (1, narrow(args[0], "n")?, Vec::new()),
            ),
            Demo::Climb => execute(
                RecursionTracer::total(demo.name(), config, catalog::climb),
                renderers,
                args[0],
            ),
        }
    }
}

fn narrow(value: u64, param: &str) -> Result<u32> {
    u32::try_from(value).with_context(|| format!("argument {} = {} is too large", param, value))
}

fn execute<A, R, E, B>(
    mut tracer: RecursionTracer<A, R, E, B>,
    renderers: Vec<Box<dyn TraceRenderer>>,
    args: A,
) -> Result<Outcome>
where
    A: CallArgs,
    R: CallOutput,
    E: fmt::Display,
    B: Body<A, R, E>,
{
    for renderer in renderers {
        tracer.add_renderer(renderer);
    }
    let output = tracer
        .call(args)
        .map_err(|e| anyhow!("{} failed: {}", tracer.name(), e))?;

    let trace = tracer
        .last_trace()
        .context("Traced call finished without a trace")?;
    Ok(Outcome {
        function: trace.function.clone(),
        result: output.display_output(),
        calls: trace.len(),
        max_depth: trace.nodes.values().map(|n| n.depth).max().unwrap_or(0),
    })
}
