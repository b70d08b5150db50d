//! Output formatting for route rendering.

use anyhow::Result;
use clap::ValueEnum;

use routeplanner_lib::{RouteRenderMode, RouteSummary};

use crate::terminal::ColorPalette;

/// Supported output formats for the route command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Endpoints, every step, and the total distance.
    #[default]
    Text,
    /// Only the total distance line.
    Basic,
    /// Machine-readable route summary.
    Json,
}

/// Render a route summary in the requested format.
pub fn render_summary(
    summary: &RouteSummary,
    format: OutputFormat,
    palette: ColorPalette,
) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(summary, palette)),
        OutputFormat::Basic => Ok(summary.render(RouteRenderMode::DistanceOnly)),
        OutputFormat::Json => {
            let mut json = summary.to_json()?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Human-friendly route view; the last line matches the basic format.
fn render_text(summary: &RouteSummary, palette: ColorPalette) -> String {
    let plain = summary.render(RouteRenderMode::PlainText);
    let mut lines = plain.lines().peekable();
    let mut buffer = String::new();

    if let Some(header) = lines.next() {
        buffer.push_str(&format!("{}{}{}\n", palette.green, header, palette.reset));
    }
    while let Some(line) = lines.next() {
        let color = if lines.peek().is_some() {
            palette.gray
        } else {
            palette.white_bold
        };
        buffer.push_str(&format!("{}{}{}\n", color, line, palette.reset));
    }

    buffer
}

#[cfg(test)]
mod tests {
    use routeplanner_lib::{RouteEndpoint, RouteStep};

    use super::*;

    fn summary() -> RouteSummary {
        RouteSummary {
            hops: 1,
            start: RouteEndpoint {
                index: 0,
                id: 11,
                x: 0.0,
                y: 0.0,
            },
            goal: RouteEndpoint {
                index: 1,
                id: 12,
                x: 3.0,
                y: 4.0,
            },
            distance: 5.0,
            distance_meters: 50.0,
            steps: vec![
                RouteStep {
                    index: 0,
                    id: 11,
                    x: 0.0,
                    y: 0.0,
                    cumulative_meters: 0.0,
                },
                RouteStep {
                    index: 1,
                    id: 12,
                    x: 3.0,
                    y: 4.0,
                    cumulative_meters: 50.0,
                },
            ],
        }
    }

    #[test]
    fn basic_format_is_distance_only() {
        let text = render_summary(&summary(), OutputFormat::Basic, ColorPalette::plain())
            .expect("renders");
        assert_eq!(text, "Distance: 50 meters.\n");
    }

    #[test]
    fn text_format_lists_steps_then_distance() {
        let text = render_summary(&summary(), OutputFormat::Text, ColorPalette::plain())
            .expect("renders");
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Route: node 11"));
        assert!(lines[2].contains("12 (3.00, 4.00) 50.0 m"));
        assert_eq!(lines[3], "Distance: 50 meters.");
    }

    #[test]
    fn colored_text_wraps_distance_line() {
        let text = render_summary(&summary(), OutputFormat::Text, ColorPalette::colored())
            .expect("renders");
        assert!(text.contains("\x1b[1;97mDistance: 50 meters.\x1b[0m"));
    }

    #[test]
    fn json_format_round_trips_hops() {
        let text = render_summary(&summary(), OutputFormat::Json, ColorPalette::plain())
            .expect("renders");
        let value: serde_json::Value = serde_json::from_str(&text).expect("valid json");
        assert_eq!(value["hops"], 1);
        assert_eq!(value["goal"]["id"], 12);
    }
}
