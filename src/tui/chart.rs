//! Plotters-powered curve chart widget for Ratatui.
//!
//! Plotters output is rendered into the Ratatui buffer through
//! `plotters-ratatui-backend`, so the same drawing code style serves the
//! terminal viewer and the SVG writer.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::plot::{Figure, SeriesRole};

/// Render-only view of a `Figure`.
///
/// Bounds are computed by the caller so that `render()` only draws.
pub struct CurveChart<'a> {
    pub figure: &'a Figure,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl<'a> Widget for CurveChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters fails to lay out a chart in very small areas.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let figure = self.figure;
        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc(figure.x_label.as_str())
                .y_desc(figure.y_label.as_str())
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.2}"))
                .y_label_formatter(&|v| format!("{v:.3}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            if let Some(curve) = &figure.curve {
                chart.draw_series(LineSeries::new(curve.iter().copied(), &RGBColor(0, 255, 255)))?;
            }

            // `Circle` radii come out far too large on this backend; single
            // pixels read as dots in a terminal.
            for series in &figure.scatter {
                let color = match series.role {
                    SeriesRole::Training => WHITE,
                    SeriesRole::Overlay => RGBColor(255, 160, 0),
                };
                chart.draw_series(series.points.iter().map(|&p| Pixel::new(p, color)))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
