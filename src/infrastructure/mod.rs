// Renderer implementations and loaders for rectrace.

pub mod config_loader;
pub mod html;

use crate::api::dto::TraceDto;
use crate::domain::layout::Layout;
use crate::domain::node::NodeId;
use crate::domain::timeline::{Timeline, VisitState};
use crate::ports::{default_output_path, TraceRenderer};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

pub use html::HtmlRenderer;

/// Prints the call tree, and optionally every step, to stdout.
pub struct TerminalRenderer {
    pub steps: bool,
}

impl TerminalRenderer {
    pub fn new(steps: bool) -> Self {
        Self { steps }
    }

    /// Box-drawing tree; every line is `[label] f(args)=output`.
    pub fn tree_text(trace: &TraceDto) -> Result<String> {
        let tree = trace.call_tree().context("Failed to rebuild call tree")?;
        let mut lines = vec![trace.title()];
        let Some(root) = tree.root() else {
            return Ok(lines.join("\n"));
        };

        // (node, prefix for its children, connector for its own line)
        let mut stack: Vec<(NodeId, String, String)> = vec![(root, String::new(), String::new())];
        while let Some((id, prefix, connector)) = stack.pop() {
            let node = trace.node(id).context("Tree references unknown node")?;
            let label = match tree.edge_label(id) {
                Some(l) if !l.is_empty() => format!("[{}] ", l),
                _ => String::new(),
            };
            lines.push(format!("{}{}{}", connector, label, trace.call_text(node)));

            let children = tree.children(id);
            for (i, &child) in children.iter().enumerate().rev() {
                let last = i + 1 == children.len();
                let (branch, indent) = if last { ("└── ", "    ") } else { ("├── ", "│   ") };
                stack.push((
                    child,
                    format!("{}{}", prefix, indent),
                    format!("{}{}", prefix, branch),
                ));
            }
        }
        Ok(lines.join("\n"))
    }

    /// One line per History entry, e.g. `t=3    return fib(1)=1`.
    pub fn steps_text(trace: &TraceDto) -> Result<String> {
        let timeline = Timeline::from_history(&trace.history, trace.nodes.len())
            .context("Failed to replay history")?;
        let mut lines = Vec::with_capacity(trace.history.len());
        for (t, &id) in trace.history.iter().enumerate() {
            let node = trace.node(id).context("History references unknown node")?;
            let event = if timeline.state_at(t, id) == Some(VisitState::Unvisited) {
                format!("call   {}({})", trace.function, node.args.join(","))
            } else {
                format!("return {}", trace.call_text(node))
            };
            lines.push(format!("t={:<4} {}{}", t, "  ".repeat(node.depth), event));
        }
        Ok(lines.join("\n"))
    }
}

impl TraceRenderer for TerminalRenderer {
    fn name(&self) -> &str {
        "terminal"
    }

    fn render(&self, trace: &TraceDto) -> Result<()> {
        if self.steps {
            println!("{}", Self::steps_text(trace)?);
            println!();
        }
        println!("{}", Self::tree_text(trace)?);
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    title: String,
    trace: &'a TraceDto,
    layout: Layout,
    timeline: Timeline,
}

/// Writes the trace, its layout and its timeline as pretty JSON.
pub struct JsonExporter {
    /// `None` writes to `./{function}_{input}.json`
    pub path: Option<PathBuf>,
}

impl JsonExporter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn to_json(trace: &TraceDto) -> Result<String> {
        let tree = trace.call_tree().context("Failed to rebuild call tree")?;
        let document = JsonDocument {
            title: trace.title(),
            trace,
            layout: Layout::compute(&tree),
            timeline: Timeline::from_history(&trace.history, trace.nodes.len())
                .context("Failed to replay history")?,
        };
        serde_json::to_string_pretty(&document).context("Failed to serialize trace")
    }
}

impl TraceRenderer for JsonExporter {
    fn name(&self) -> &str {
        "json"
    }

    fn render(&self, trace: &TraceDto) -> Result<()> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| default_output_path(trace, "json"));
        std::fs::write(&path, Self::to_json(trace)?)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(target: "rectrace::render", path = %path.display(), "Wrote trace JSON");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tracer::{Frame, RecursionTracer, TracerConfig};
    use tempfile::tempdir;

    fn binomial(f: &mut Frame<'_, (u32, u32), u64>, args: &(u32, u32)) -> u64 {
        let (n, k) = *args;
        if k == 0 || k == n {
            1
        } else {
            f.call_labeled((n - 1, k - 1), "take") + f.call_labeled((n - 1, k), "skip")
        }
    }

    fn trace() -> TraceDto {
        let mut tracer = RecursionTracer::total("C", TracerConfig::quiet(), binomial);
        tracer.run((3, 1));
        TraceDto::from_trace(tracer.last_trace().unwrap(), None).unwrap()
    }

    #[test]
    fn test_tree_text() {
        let text = TerminalRenderer::tree_text(&trace()).unwrap();
        let expected = [
            "Recursive Tree: C(3,1)",
            "C(3,1)=3",
            "├── [take] C(2,0)=1",
            "└── [skip] C(2,1)=2",
            "    ├── [take] C(1,0)=1",
            "    └── [skip] C(1,1)=1",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn test_steps_text() {
        let text = TerminalRenderer::steps_text(&trace()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 10);
        assert_eq!(lines[0], "t=0    call   C(3,1)");
        assert_eq!(lines[2], "t=2      return C(2,0)=1");
        assert_eq!(lines[9], "t=9    return C(3,1)=3");
    }

    #[test]
    fn test_json_export() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("c.json");
        JsonExporter::new(Some(path.clone())).render(&trace()).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["title"], "Recursive Tree: C(3,1)");
        assert_eq!(value["timeline"]["frames"].as_array().unwrap().len(), 11);
        assert_eq!(value["timeline"]["frames"][1][0], "open");
        assert_eq!(value["trace"]["edges"].as_array().unwrap().len(), 4);
    }
}
