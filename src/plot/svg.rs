//! SVG output through plotters.

use std::path::Path;

use plotters::prelude::*;

use crate::error::AppError;
use crate::plot::{pad_range, Figure, SeriesRole};

pub const DEFAULT_SIZE: (u32, u32) = (960, 640);

/// Draw `figure` into an SVG file at `path`.
pub fn save(figure: &Figure, path: &Path, size: (u32, u32)) -> Result<(), AppError> {
    draw(figure, path, size).map_err(|e| AppError::Plot(format!("failed to draw '{}': {e}", path.display())))?;
    tracing::info!(path = %path.display(), "wrote SVG plot");
    Ok(())
}

fn draw(figure: &Figure, path: &Path, size: (u32, u32)) -> Result<(), Box<dyn std::error::Error>> {
    let (x0, x1) = figure.x_range().unwrap_or((0.0, 1.0));
    let (x0, x1) = pad_range(x0, x1, 0.02);
    let (y0, y1) = figure.y_range().unwrap_or((0.0, 1.0));
    let (y0, y1) = pad_range(y0, y1, 0.05);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&figure.title, ("sans-serif", 20))
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 45)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(figure.x_label.as_str())
        .y_desc(figure.y_label.as_str())
        .x_labels(8)
        .y_labels(8)
        .draw()?;

    if let Some(curve) = &figure.curve {
        let color = RGBColor(0, 120, 200);
        chart
            .draw_series(LineSeries::new(curve.iter().copied(), color.stroke_width(2)))?
            .label("fit")
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    for series in &figure.scatter {
        let color = match series.role {
            SeriesRole::Training => RGBColor(40, 40, 40),
            SeriesRole::Overlay => RGBColor(220, 60, 30),
        };
        chart
            .draw_series(series.points.iter().map(|&p| Circle::new(p, 3, color.filled())))?
            .label(series.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 3, color.filled()));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
