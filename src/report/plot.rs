//! HTML plots of the frontier.

use std::fs;
use std::path::Path;

use plotly::common::{Line, Marker, Mode, Title};
use plotly::layout::Axis;
use plotly::{Layout, Plot, Scatter};
use tracing::info;

use super::SessionReport;
use crate::error::Result;

/// Frontier line plus one marker trace per benchmark and matched portfolio.
pub fn frontier_plot(report: &SessionReport) -> Plot {
    let mut plot = Plot::new();

    let (risk, ret): (Vec<f64>, Vec<f64>) = report
        .frontier
        .iter()
        .map(|p| (p.risk, p.expected_return))
        .unzip();
    plot.add_trace(
        Scatter::new(risk, ret)
            .name("Efficient frontier")
            .mode(Mode::LinesMarkers)
            .line(Line::new().color("#1f77b4")),
    );

    for point in report.scatter_points() {
        plot.add_trace(
            Scatter::new(vec![point.risk], vec![point.expected_return])
                .name(&point.label)
                .mode(Mode::Markers)
                .marker(Marker::new().size(10)),
        );
    }

    let layout = Layout::new()
        .title(Title::from("Efficient frontier"))
        .x_axis(Axis::new().title(Title::from("Risk (standard deviation)")))
        .y_axis(Axis::new().title(Title::from("Expected return")));
    plot.set_layout(layout);
    plot
}

/// Write the frontier plot as a standalone HTML file.
pub fn write_plot(report: &SessionReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    frontier_plot(report).write_html(path);
    info!("wrote {}", path.display());
    Ok(())
}
