//! Result export: raw scores as JSON and the z-score chart as SVG.

use crate::experiment::{ConditionResult, ExperimentResults};
use crate::stats::ZSummary;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Complete experiment export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsExport {
    /// Experiment name
    pub experiment: String,

    /// Seed used
    pub seed: u64,

    /// Raw scores and branch counts per condition
    pub conditions: Vec<ConditionResult>,

    /// Pooled z-score summary
    pub summary: ZSummary,
}

impl ResultsExport {
    /// Creates a new export container.
    pub fn new(results: &ExperimentResults, summary: &ZSummary) -> Self {
        Self {
            experiment: results.experiment.clone(),
            seed: results.seed,
            conditions: results.conditions.clone(),
            summary: summary.clone(),
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// `<dir>/<experiment name> Results.<extension>`, with path separators replaced.
pub fn output_path(dir: &Path, experiment: &str, extension: &str) -> PathBuf {
    let stem: String = experiment
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '-' } else { c })
        .collect();
    dir.join(format!("{} Results.{}", stem, extension))
}

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 420.0;
const MARGIN: f64 = 60.0;

/// Renders per-condition mean z-score with ±SEM error bars.
pub fn render_svg(title: &str, summary: &ZSummary) -> String {
    let mut lo = -0.1_f64;
    let mut hi = 0.1_f64;
    for c in &summary.conditions {
        lo = lo.min(c.mean_z - c.sem_z);
        hi = hi.max(c.mean_z + c.sem_z);
    }
    let pad = (hi - lo) * 0.1;
    let (lo, hi) = (lo - pad, hi + pad);

    let plot_w = WIDTH - 2.0 * MARGIN;
    let plot_h = HEIGHT - 2.0 * MARGIN;
    let y = |v: f64| MARGIN + (hi - v) / (hi - lo) * plot_h;
    let n = summary.conditions.len().max(1) as f64;
    let x = |i: usize| MARGIN + (i as f64 + 0.5) / n * plot_w;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="16">{}</text>"#,
        WIDTH / 2.0,
        MARGIN / 2.0,
        escape(title)
    );

    // Axes and zero line
    let _ = writeln!(
        svg,
        r#"<line x1="{m}" y1="{m}" x2="{m}" y2="{b}" stroke="black"/>"#,
        m = MARGIN,
        b = HEIGHT - MARGIN
    );
    let _ = writeln!(
        svg,
        r##"<line x1="{m}" y1="{z:.2}" x2="{r}" y2="{z:.2}" stroke="#999" stroke-dasharray="4"/>"##,
        m = MARGIN,
        r = WIDTH - MARGIN,
        z = y(0.0)
    );
    for tick in [lo, 0.0, hi] {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{:.2}" text-anchor="end" font-size="11">{:.2}</text>"#,
            MARGIN - 6.0,
            y(tick) + 4.0,
            tick
        );
    }
    let _ = writeln!(
        svg,
        r#"<text x="16" y="{}" font-size="12" transform="rotate(-90 16 {})" text-anchor="middle">mean z-score</text>"#,
        HEIGHT / 2.0,
        HEIGHT / 2.0
    );

    for (i, c) in summary.conditions.iter().enumerate() {
        let cx = x(i);
        let _ = writeln!(
            svg,
            r#"<line x1="{cx:.2}" y1="{:.2}" x2="{cx:.2}" y2="{:.2}" stroke="steelblue" stroke-width="2"/>"#,
            y(c.mean_z + c.sem_z),
            y(c.mean_z - c.sem_z),
            cx = cx
        );
        let _ = writeln!(
            svg,
            r#"<circle cx="{:.2}" cy="{:.2}" r="4" fill="steelblue"/>"#,
            cx,
            y(c.mean_z)
        );
        let _ = writeln!(
            svg,
            r#"<text x="{:.2}" y="{}" text-anchor="middle" font-size="12">{}</text>"#,
            cx,
            HEIGHT - MARGIN + 18.0,
            escape(&c.name)
        );
    }
    svg.push_str("</svg>\n");
    svg
}

/// Writes the chart to `path`.
pub fn write_svg(path: &Path, title: &str, summary: &ZSummary) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(render_svg(title, summary).as_bytes())?;
    Ok(())
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::ConditionSummary;

    fn summary() -> ZSummary {
        ZSummary {
            pooled_mean: 0.2,
            pooled_std: 0.5,
            conditions: vec![
                ConditionSummary {
                    name: "PI0SA0".into(),
                    participants: 10,
                    mean_z: 0.4,
                    sem_z: 0.1,
                },
                ConditionSummary {
                    name: "<load>".into(),
                    participants: 10,
                    mean_z: -0.4,
                    sem_z: 0.2,
                },
            ],
        }
    }

    #[test]
    fn test_output_path_sanitizes_separators() {
        let path = output_path(Path::new("plots"), "a/b\\c", "svg");
        assert_eq!(path, Path::new("plots").join("a-b-c Results.svg"));
    }

    #[test]
    fn test_svg_has_one_marker_per_condition() {
        let svg = render_svg("Duval & Silvia", &summary());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<circle").count(), 2);
        assert!(svg.contains("Duval &amp; Silvia"));
        assert!(svg.contains("&lt;load&gt;"));
    }

    #[test]
    fn test_json_export_written() {
        let results = ExperimentResults {
            experiment: "export test".into(),
            seed: 9,
            conditions: vec![ConditionResult {
                name: "PI0SA0".into(),
                scores: vec![0.1, 0.2],
                branch_counts: Default::default(),
            }],
        };
        let export = ResultsExport::new(&results, &summary());

        let dir = std::env::temp_dir().join(format!("cogsim-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = output_path(&dir, &results.experiment, "json");
        export.write_to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["seed"], 9);
        assert_eq!(value["conditions"][0]["scores"][1], 0.2);
        assert_eq!(value["summary"]["conditions"][1]["name"], "<load>");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
