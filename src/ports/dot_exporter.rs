//! Call Tree DOT Exporter
//!
//! Exports a finished trace as Graphviz DOT, one rank per recursion depth.

use crate::api::dto::TraceDto;
use crate::ports::{default_output_path, TraceRenderer};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct DotExporter {
    /// `None` writes to `./{function}_{input}.dot`
    pub path: Option<PathBuf>,
}

impl DotExporter {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Export a trace to DOT format.
    pub fn export(trace: &TraceDto, path: &std::path::Path) -> std::io::Result<()> {
        let content = Self::to_dot(trace);
        std::fs::write(path, content)
    }

    /// Convert a trace to a DOT string.
    pub fn to_dot(trace: &TraceDto) -> String {
        let mut lines = Vec::new();

        lines.push("digraph RecursionTree {".to_string());
        lines.push(format!(
            "    label=\"{}\";",
            Self::escape_label(&trace.title())
        ));
        lines.push("    labelloc=t;".to_string());
        lines.push("    rankdir=TB;".to_string());
        lines.push("    nodesep=0.6;".to_string());
        lines.push(
            "    node [shape=circle, style=filled, fillcolor=\"#6AAED6\", fontname=\"Helvetica\", fontsize=12];"
                .to_string(),
        );
        lines.push("    edge [fontname=\"Helvetica\", fontsize=10, color=\"#888888\"];".to_string());
        lines.push("".to_string());

        for node in &trace.nodes {
            let tooltip = format!(
                "{}\\ndiscover: {}\\nfinish: {}",
                Self::escape_label(&trace.call_text(node)),
                node.discovery,
                node.finish
            );
            lines.push(format!(
                "    n{} [label=\"{}\", tooltip=\"{}\"];",
                node.id,
                Self::escape_label(&trace.node_text(node)),
                tooltip
            ));
        }

        lines.push("".to_string());

        for edge in &trace.edges {
            if edge.label.is_empty() {
                lines.push(format!("    n{} -> n{};", edge.from, edge.to));
            } else {
                lines.push(format!(
                    "    n{} -> n{} [label=\"{}\"];",
                    edge.from,
                    edge.to,
                    Self::escape_label(&edge.label)
                ));
            }
        }

        let mut layers: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        for node in &trace.nodes {
            layers.entry(node.depth).or_default().push(format!("n{}", node.id));
        }
        for layer in layers.values() {
            lines.push(format!("    {{ rank=same; {} }}", layer.join("; ")));
        }

        lines.push("}".to_string());

        lines.join("\n")
    }

    fn escape_label(label: &str) -> String {
        label
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
    }
}

impl TraceRenderer for DotExporter {
    fn name(&self) -> &str {
        "dot"
    }

    fn render(&self, trace: &TraceDto) -> Result<()> {
        let path = self
            .path
            .clone()
            .unwrap_or_else(|| default_output_path(trace, "dot"));
        Self::export(trace, &path)
            .with_context(|| format!("Failed to write DOT file {}", path.display()))?;
        tracing::info!(target: "rectrace::render", path = %path.display(), "Wrote DOT call tree");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{EdgeDto, NodeDto};
    use tempfile::tempdir;

    fn sample() -> TraceDto {
        let node = |id, arg: &str, output: &str, depth, discovery, finish| NodeDto {
            id,
            args: vec![arg.to_string()],
            output: output.to_string(),
            depth,
            discovery,
            finish,
        };
        TraceDto {
            function: "fact".to_string(),
            nodes: vec![node(0, "2", "2", 0, 0, 3), node(1, "1", "1", 1, 1, 2)],
            history: vec![0, 1, 1, 0],
            edge_labels: [(0, String::new()), (1, "n-1".to_string())].into_iter().collect(),
            edges: vec![EdgeDto {
                from: 0,
                to: 1,
                label: "n-1".to_string(),
            }],
            display_args: None,
        }
    }

    #[test]
    fn test_to_dot() {
        let dot = DotExporter::to_dot(&sample());
        assert!(dot.contains("digraph RecursionTree"));
        assert!(dot.contains("label=\"Recursive Tree: fact(2)\""));
        assert!(dot.contains("n0 [label=\"2\""));
        assert!(dot.contains("fact(1)=1\\ndiscover: 1\\nfinish: 2"));
        assert!(dot.contains("n0 -> n1 [label=\"n-1\"]"));
        assert!(dot.contains("{ rank=same; n1 }"));
    }

    #[test]
    fn test_render_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fact.dot");
        DotExporter::new(Some(path.clone())).render(&sample()).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("digraph RecursionTree {"));
    }
}
