//! Call Tracer
//!
//! Wraps a recursive function so every invocation is observed. The function
//! receives a [`Frame`] and re-enters the tracer through it instead of calling
//! itself directly:
//!
//! ```
//! use rectrace::domain::tracer::{Frame, RecursionTracer, TracerConfig};
//!
//! fn fib(f: &mut Frame<'_, u64, u64>, n: &u64) -> u64 {
//!     if *n < 2 {
//!         *n
//!     } else {
//!         f.call(n - 1) + f.call(n - 2)
//!     }
//! }
//!
//! let mut tracer = RecursionTracer::total("fib", TracerConfig::quiet(), fib);
//! assert_eq!(tracer.run(4), 3);
//! assert_eq!(tracer.last_trace().unwrap().len(), 9);
//! ```
//!
//! Every invocation creates a node and runs the function body, even when its
//! arguments are already cached; the cache only decides which result is
//! recorded and returned.

use crate::api::dto::TraceDto;
use crate::domain::node::{CallArgs, CallOutput, NodeId};
use crate::domain::session::{Trace, TraceSession};
use crate::infrastructure::HtmlRenderer;
use crate::ports::TraceRenderer;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::convert::Infallible;
use std::marker::PhantomData;
use std::path::PathBuf;

/// Options accepted at wrap time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TracerConfig {
    /// Log every finished node
    pub verbose: bool,
    /// Hand the trace to the renderers after each top-level call
    pub animate: bool,
    /// Persist the animation to a file
    pub save: bool,
    /// Destination for the saved animation; empty means `./{name}_{input}.html`
    pub path: String,
    /// Argument indices shown on node labels; `None` shows all
    pub display_args: Option<Vec<usize>>,
}

impl Default for TracerConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            animate: true,
            save: false,
            path: String::new(),
            display_args: None,
        }
    }
}

impl TracerConfig {
    /// No logging and no rendering.
    pub fn quiet() -> Self {
        Self {
            animate: false,
            ..Self::default()
        }
    }
}

/// The body of a traced function.
pub trait Body<A, R, E> {
    fn eval(&self, frame: &mut Frame<'_, A, R, E>, args: &A) -> Result<R, E>;
}

impl<A, R, E, F> Body<A, R, E> for F
where
    F: Fn(&mut Frame<'_, A, R, E>, &A) -> Result<R, E>,
{
    fn eval(&self, frame: &mut Frame<'_, A, R, E>, args: &A) -> Result<R, E> {
        self(frame, args)
    }
}

/// Adapts a function that cannot fail.
pub struct Total<G>(pub G);

impl<A, R, G> Body<A, R, Infallible> for Total<G>
where
    G: Fn(&mut Frame<'_, A, R, Infallible>, &A) -> R,
{
    fn eval(&self, frame: &mut Frame<'_, A, R, Infallible>, args: &A) -> Result<R, Infallible> {
        Ok((self.0)(frame, args))
    }
}

/// Handle passed to the traced function for recursive calls.
pub struct Frame<'a, A, R, E = Infallible> {
    session: &'a mut TraceSession<A, R>,
    body: &'a (dyn Body<A, R, E> + 'a),
    function: &'a str,
    verbose: bool,
    // Node whose body is running; only read from inside a body.
    current: NodeId,
}

impl<'a, A, R, E> Frame<'a, A, R, E>
where
    A: CallArgs,
    R: CallOutput,
{
    /// Recursive call with no edge label.
    pub fn recurse(&mut self, args: A) -> Result<R, E> {
        self.invoke(args, String::new())
    }

    /// Recursive call whose incoming edge carries `label`.
    pub fn recurse_labeled(&mut self, args: A, label: impl Into<String>) -> Result<R, E> {
        self.invoke(args, label.into())
    }

    /// Id of the call currently executing.
    pub fn node_id(&self) -> NodeId {
        self.current
    }

    /// Recursion depth of the call currently executing.
    pub fn depth(&self) -> usize {
        self.session.depth().saturating_sub(1)
    }

    fn invoke(&mut self, args: A, label: String) -> Result<R, E> {
        let id = self.session.open(args.clone());
        let caller = std::mem::replace(&mut self.current, id);

        let body = self.body;
        let result = body.eval(self, &args);

        self.current = caller;
        self.session.ascend();

        let output = self.session.memoize(args, result?);
        let node = self.session.close(id, output.clone(), label);
        if self.verbose {
            tracing::info!(target: "rectrace::tracer", function = %self.function, "{}", node);
        }
        Ok(output)
    }
}

impl<'a, A, R> Frame<'a, A, R, Infallible>
where
    A: CallArgs,
    R: CallOutput,
{
    /// Recursive call of a function that cannot fail.
    pub fn call(&mut self, args: A) -> R {
        match self.recurse(args) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    pub fn call_labeled(&mut self, args: A, label: impl Into<String>) -> R {
        match self.recurse_labeled(args, label) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

/// A recursive function together with its trace state and renderers.
///
/// Top-level calls take `&mut self`, so one tracer can never run two traces at
/// once.
pub struct RecursionTracer<A, R, E, B> {
    name: String,
    config: TracerConfig,
    body: B,
    session: TraceSession<A, R>,
    last: Option<Trace<A, R>>,
    renderers: Vec<Box<dyn TraceRenderer>>,
    _error: PhantomData<fn() -> E>,
}

impl<A, R, E, F> RecursionTracer<A, R, E, F>
where
    A: CallArgs,
    R: CallOutput,
{
    /// Wrap a function that may fail with `E`.
    pub fn new(name: impl Into<String>, config: TracerConfig, func: F) -> Self
    where
        F: Fn(&mut Frame<'_, A, R, E>, &A) -> Result<R, E>,
    {
        Self::with_body(name.into(), config, func)
    }
}

impl<A, R, G> RecursionTracer<A, R, Infallible, Total<G>>
where
    A: CallArgs,
    R: CallOutput,
    G: Fn(&mut Frame<'_, A, R, Infallible>, &A) -> R,
{
    /// Wrap a function that cannot fail.
    pub fn total(name: impl Into<String>, config: TracerConfig, func: G) -> Self {
        Self::with_body(name.into(), config, Total(func))
    }
}

impl<A, R, E, B> RecursionTracer<A, R, E, B>
where
    A: CallArgs,
    R: CallOutput,
    B: Body<A, R, E>,
{
    fn with_body(name: String, config: TracerConfig, body: B) -> Self {
        let mut renderers: Vec<Box<dyn TraceRenderer>> = Vec::new();
        if config.save {
            let path = (!config.path.is_empty()).then(|| PathBuf::from(&config.path));
            renderers.push(Box::new(HtmlRenderer::new(path)));
        }
        Self {
            name,
            config,
            body,
            session: TraceSession::default(),
            last: None,
            renderers,
            _error: PhantomData,
        }
    }

    /// Attach a renderer that receives every finished trace when `animate` is on.
    pub fn with_renderer(mut self, renderer: Box<dyn TraceRenderer>) -> Self {
        self.renderers.push(renderer);
        self
    }

    pub fn add_renderer(&mut self, renderer: Box<dyn TraceRenderer>) {
        self.renderers.push(renderer);
    }

    /// Top-level invocation. Starts a fresh trace.
    ///
    /// Errors from the function are returned unchanged; the partial trace stays
    /// in [`session`](Self::session) until the next call and nothing is rendered.
    pub fn call(&mut self, args: A) -> Result<R, E> {
        self.session.reset();
        self.last = None;

        let mut frame = Frame {
            session: &mut self.session,
            body: &self.body,
            function: &self.name,
            verbose: self.config.verbose,
            current: 0,
        };
        let output = frame.recurse(args)?;

        self.last = Some(self.session.finish(&self.name));
        if self.config.animate && !self.renderers.is_empty() {
            if let Err(e) = self.render_last() {
                tracing::error!(
                    target: "rectrace::render",
                    function = %self.name,
                    error = %e,
                    "Failed to render trace"
                );
            }
        }
        Ok(output)
    }

    /// Hand the last finished trace to every renderer.
    pub fn render_last(&self) -> Result<()> {
        let trace = self
            .last
            .as_ref()
            .context("No finished trace to render")?;
        let dto = TraceDto::from_trace(trace, self.config.display_args.clone())
            .context("Failed to rebuild call tree")?;
        for renderer in &self.renderers {
            renderer
                .render(&dto)
                .with_context(|| format!("Renderer '{}' failed", renderer.name()))?;
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &TracerConfig {
        &self.config
    }

    /// The most recent successfully finished trace.
    pub fn last_trace(&self) -> Option<&Trace<A, R>> {
        self.last.as_ref()
    }

    /// State of the trace in progress, or of the last one that failed.
    pub fn session(&self) -> &TraceSession<A, R> {
        &self.session
    }
}

impl<A, R, B> RecursionTracer<A, R, Infallible, B>
where
    A: CallArgs,
    R: CallOutput,
    B: Body<A, R, Infallible>,
{
    /// Top-level invocation of a function that cannot fail.
    pub fn run(&mut self, args: A) -> R {
        match self.call(args) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fib(f: &mut Frame<'_, u64, u64>, n: &u64) -> u64 {
        if *n < 2 {
            *n
        } else {
            f.call(n - 1) + f.call(n - 2)
        }
    }

    fn countdown(f: &mut Frame<'_, u32, u32, String>, n: &u32) -> Result<u32, String> {
        match *n {
            0 => Ok(0),
            3 => Err("three is not allowed".to_string()),
            n => Ok(f.recurse(n - 1)? + 1),
        }
    }

    #[test]
    fn test_fib_four_records_every_call() {
        let mut tracer = RecursionTracer::total("fib", TracerConfig::quiet(), fib);
        assert_eq!(tracer.run(4), 3);

        let trace = tracer.last_trace().unwrap();
        let inputs: Vec<u64> = trace.nodes.values().map(|n| n.input).collect();
        assert_eq!(inputs, vec![4, 3, 2, 1, 0, 1, 2, 1, 0]);
        assert_eq!(trace.history.len(), 18);
        assert_eq!(trace.root().unwrap().output, Some(3));
    }

    #[test]
    fn test_depth_and_times() {
        let mut tracer = RecursionTracer::total("fib", TracerConfig::quiet(), fib);
        tracer.run(2);
        let trace = tracer.last_trace().unwrap();
        // 0 ( 1 ( ) 2 ( ) )
        assert_eq!(trace.history, vec![0, 1, 1, 2, 2, 0]);
        let root = trace.node(0).unwrap();
        assert_eq!((root.depth, root.discovery, root.finish), (0, 0, Some(5)));
        let right = trace.node(2).unwrap();
        assert_eq!((right.depth, right.discovery, right.finish), (1, 3, Some(4)));
    }

    #[test]
    fn test_error_propagates_and_leaves_partial_session() {
        let mut tracer = RecursionTracer::new("countdown", TracerConfig::quiet(), countdown);
        assert_eq!(tracer.call(5), Err("three is not allowed".to_string()));
        assert!(tracer.last_trace().is_none());
        assert_eq!(tracer.session().nodes().len(), 3);
        assert_eq!(tracer.session().depth(), 0);
        assert!(tracer.session().nodes().values().all(|n| !n.is_finished()));

        assert_eq!(tracer.call(2), Ok(2));
        assert_eq!(tracer.last_trace().unwrap().len(), 3);
    }

    #[test]
    fn test_frame_reports_node_and_depth() {
        fn probe(f: &mut Frame<'_, u8, Vec<(usize, usize)>>, n: &u8) -> Vec<(usize, usize)> {
            let mut seen = vec![(f.node_id(), f.depth())];
            if *n > 0 {
                seen.extend(f.call(n - 1));
            }
            seen
        }
        let mut tracer = RecursionTracer::total("probe", TracerConfig::quiet(), probe);
        assert_eq!(tracer.run(2), vec![(0, 0), (1, 1), (2, 2)]);
    }

    #[test]
    fn test_save_writes_animation_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fib.html");
        let config = TracerConfig {
            save: true,
            path: path.to_string_lossy().to_string(),
            ..TracerConfig::default()
        };
        let mut tracer = RecursionTracer::total("fib", config, fib);
        assert_eq!(tracer.run(3), 2);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("Recursive Tree: fib(3)"));
    }

    #[test]
    fn test_save_without_animate_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fib.html");
        let config = TracerConfig {
            save: true,
            path: path.to_string_lossy().to_string(),
            ..TracerConfig::quiet()
        };
        let mut tracer = RecursionTracer::total("fib", config, fib);
        tracer.run(3);
        assert!(!path.exists());
    }

    #[test]
    fn test_verbose_logs_every_finished_node() {
        let buffer = Capture::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let config = TracerConfig {
            verbose: true,
            ..TracerConfig::quiet()
        };
        let mut tracer = RecursionTracer::total("fib", config, fib);
        tracing::subscriber::with_default(subscriber, || tracer.run(4));

        let logged = buffer.text();
        let events: Vec<&str> = logged
            .lines()
            .filter(|l| l.contains("rectrace::tracer"))
            .collect();
        assert_eq!(events.len(), 9);
        assert!(events[8].contains("Node(id=0, input=(4), output=3"));
    }

    #[test]
    fn test_quiet_tracer_logs_nothing() {
        let buffer = Capture::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut tracer = RecursionTracer::total("fib", TracerConfig::quiet(), fib);
        tracing::subscriber::with_default(subscriber, || tracer.run(4));
        assert!(!buffer.text().contains("rectrace::tracer"));
    }

    #[derive(Clone, Default)]
    struct Capture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl Capture {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_render_last_without_trace_fails() {
        let tracer = RecursionTracer::total("fib", TracerConfig::quiet(), fib);
        assert!(tracer.render_last().is_err());
    }
}
