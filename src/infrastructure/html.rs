//! HTML animation renderer
//!
//! Writes a single self-contained page: the tree is drawn once as inline SVG
//! and a small script recolors the nodes for the frame picked on the slider.
//! Frame data is embedded as JSON.

use crate::api::dto::TraceDto;
use crate::domain::layout::Layout;
use crate::domain::timeline::{Timeline, VisitState};
use crate::ports::{default_output_path, TraceRenderer};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

const SLOT_WIDTH: f64 = 70.0;
const LEVEL_HEIGHT: f64 = 80.0;
const MARGIN: f64 = 40.0;

// Fill and text colors per visit state (sequential blues).
const FILL: [&str; 3] = ["#F7FBFF", "#6AAED6", "#0A306B"];
const TEXT: [&str; 3] = ["rgb(0,0,0)", "rgb(255,255,255)", "rgb(255,255,255)"];

pub struct HtmlRenderer {
    /// `None` writes to `./{function}_{input}.html`
    pub path: Option<PathBuf>,
}

#[derive(Serialize)]
struct FrameData {
    /// Node touched at this instant; `None` for the initial frame
    node: Option<usize>,
    states: Vec<u8>,
}

impl HtmlRenderer {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn output_path(&self, trace: &TraceDto) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_output_path(trace, "html"))
    }

    /// Render the whole page.
    pub fn to_html(trace: &TraceDto) -> Result<String> {
        let tree = trace.call_tree().context("Failed to rebuild call tree")?;
        let layout = Layout::compute(&tree);
        let timeline = Timeline::from_history(&trace.history, trace.nodes.len())
            .context("Failed to replay history")?;

        let frames: Vec<FrameData> = timeline
            .frames()
            .iter()
            .enumerate()
            .map(|(t, states)| FrameData {
                node: t.checked_sub(1).and_then(|i| trace.history.get(i).copied()),
                states: states.iter().map(|s| Self::level(*s)).collect(),
            })
            .collect();
        let frames_json = serde_json::to_string(&frames).context("Failed to encode frames")?;

        let radius = 12.0
            + 4.0
                * trace
                    .nodes
                    .iter()
                    .map(|n| trace.node_text(n).len())
                    .max()
                    .unwrap_or(1) as f64;
        let place = |x: f64, y: f64| (MARGIN + radius + x * SLOT_WIDTH.max(radius * 2.2), MARGIN + radius + y * LEVEL_HEIGHT);
        let (width, _) = place(layout.width().saturating_sub(1) as f64, 0.0);
        let (_, height) = place(0.0, layout.height() as f64);

        let mut svg = Vec::new();
        svg.push(format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{:.0}\" height=\"{:.0}\">",
            width + radius + MARGIN,
            height + radius + MARGIN
        ));

        for edge in &trace.edges {
            let (Some(a), Some(b)) = (layout.position(edge.from), layout.position(edge.to)) else {
                continue;
            };
            let (x1, y1) = place(a.x, a.y);
            let (x2, y2) = place(b.x, b.y);
            svg.push(format!(
                "  <line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#888\" stroke-width=\"1\"/>",
                x1, y1, x2, y2
            ));
            if !edge.label.is_empty() {
                svg.push(format!(
                    "  <text x=\"{:.1}\" y=\"{:.1}\" font-size=\"10\" fill=\"rgb(0,0,0)\">{}</text>",
                    (x1 + x2) / 2.0 + 5.0,
                    (y1 + y2) / 2.0 + 5.0,
                    Self::escape(&edge.label)
                ));
            }
        }

        for node in &trace.nodes {
            let Some(p) = layout.position(node.id) else {
                continue;
            };
            let (cx, cy) = place(p.x, p.y);
            svg.push(format!(
                "  <g id=\"node-{}\"><title>{}&#10;discover: {}&#10;finish: {}</title>\
                 <circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"{:.1}\" fill=\"{}\" stroke=\"rgb(50,50,50)\" stroke-width=\"1\"/>\
                 <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-size=\"12\" fill=\"{}\">{}</text></g>",
                node.id,
                Self::escape(&trace.call_text(node)),
                node.discovery,
                node.finish,
                cx,
                cy,
                radius,
                FILL[0],
                cx,
                cy,
                TEXT[0],
                Self::escape(&trace.node_text(node)),
            ));
        }
        svg.push("</svg>".to_string());

        let last = frames.len().saturating_sub(1);
        let mut lines = Vec::new();
        lines.push("<!DOCTYPE html>".to_string());
        lines.push("<html><head><meta charset=\"utf-8\">".to_string());
        lines.push(format!("<title>{}</title>", Self::escape(&trace.title())));
        lines.push("<style>body{font-family:Helvetica,sans-serif;margin:16px} #controls{margin-top:8px}</style>".to_string());
        lines.push("</head><body>".to_string());
        lines.push(format!("<h3>{}</h3>", Self::escape(&trace.title())));
        lines.extend(svg);
        lines.push("<div id=\"controls\">".to_string());
        lines.push("<button id=\"play\">Play</button> <button id=\"pause\">Pause</button>".to_string());
        lines.push(format!(
            "<input id=\"time\" type=\"range\" min=\"0\" max=\"{}\" value=\"0\" style=\"width:60%\"> Time: <span id=\"label\">0</span>",
            last
        ));
        lines.push("</div>".to_string());
        lines.push("<script>".to_string());
        lines.push(format!("const FRAMES = {};", frames_json));
        lines.push(format!(
            "const FILL = {}; const TEXT = {};",
            serde_json::to_string(&FILL)?,
            serde_json::to_string(&TEXT)?
        ));
        lines.push(SCRIPT.to_string());
        lines.push("</script>".to_string());
        lines.push("</body></html>".to_string());

        Ok(lines.join("\n"))
    }

    fn level(state: VisitState) -> u8 {
        match state {
            VisitState::Unvisited => 0,
            VisitState::Open => 1,
            VisitState::Finished => 2,
        }
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }
}

const SCRIPT: &str = r#"const slider = document.getElementById('time');
const label = document.getElementById('label');
let timer = null;
function show(t) {
  FRAMES[t].states.forEach((s, id) => {
    const g = document.getElementById('node-' + id);
    if (!g) return;
    g.querySelector('circle').setAttribute('fill', FILL[s]);
    g.querySelector('text').setAttribute('fill', TEXT[s]);
  });
  slider.value = t;
  label.textContent = t;
}
slider.addEventListener('input', () => show(Number(slider.value)));
document.getElementById('play').addEventListener('click', () => {
  if (timer) return;
  timer = setInterval(() => {
    const t = Number(slider.value);
    if (t >= FRAMES.length - 1) { clearInterval(timer); timer = null; return; }
    show(t + 1);
  }, 500);
});
document.getElementById('pause').addEventListener('click', () => { clearInterval(timer); timer = null; });
show(0);"#;

impl TraceRenderer for HtmlRenderer {
    fn name(&self) -> &str {
        "html"
    }

    fn render(&self, trace: &TraceDto) -> Result<()> {
        let path = self.output_path(trace);
        let html = Self::to_html(trace)?;
        std::fs::write(&path, html)
            .with_context(|| format!("Failed to write animation {}", path.display()))?;
        tracing::info!(target: "rectrace::render", path = %path.display(), "Saved recursion animation");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tracer::{Frame, RecursionTracer, TracerConfig};
    use tempfile::tempdir;

    fn fib(f: &mut Frame<'_, u64, u64>, n: &u64) -> u64 {
        if *n < 2 {
            *n
        } else {
            f.call_labeled(n - 1, "n-1") + f.call_labeled(n - 2, "n-2")
        }
    }

    fn fib_trace(n: u64) -> TraceDto {
        let mut tracer = RecursionTracer::total("fib", TracerConfig::quiet(), fib);
        tracer.run(n);
        TraceDto::from_trace(tracer.last_trace().unwrap(), None).unwrap()
    }

    #[test]
    fn test_html_embeds_every_frame() {
        let trace = fib_trace(3);
        let html = HtmlRenderer::to_html(&trace).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Recursive Tree: fib(3)</title>"));
        assert_eq!(html.matches("<circle").count(), trace.nodes.len());
        assert!(html.contains(">n-2</text>"));
        // initial frame plus one per history entry
        assert!(html.contains(&format!("max=\"{}\"", trace.history.len())));
        assert!(html.contains("fib(3)=2&#10;discover: 0&#10;finish: 9"));
    }

    #[test]
    fn test_render_uses_given_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("fib.html");
        let renderer = HtmlRenderer::new(Some(path.clone()));
        renderer.render(&fib_trace(2)).unwrap();
        assert!(std::fs::read_to_string(path).unwrap().contains("const FRAMES"));
    }

    #[test]
    fn test_default_path_uses_function_and_input() {
        let renderer = HtmlRenderer::new(None);
        assert_eq!(
            renderer.output_path(&fib_trace(2)),
            PathBuf::from("./fib_2.html")
        );
    }
}
