//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - training points: `o`
//! - validation overlay points: `x`
//! - fitted curve: `-` line

use crate::plot::{pad_range, Figure};

/// Render `figure` on a `width × height` character grid plus a one-line header.
pub fn render(figure: &Figure, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (x_min, x_max) = figure.x_range().unwrap_or((0.0, 1.0));
    let (y_min, y_max) = figure.y_range().unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Curve first so points overlay it.
    if let Some(curve) = &figure.curve {
        draw_curve(&mut grid, curve, x_min, x_max, y_min, y_max);
    }

    for series in &figure.scatter {
        let marker = series.role.marker();
        for &(x, y) in &series.points {
            let col = map_x(x, x_min, x_max, width);
            let row = map_y(y, y_min, y_max, height);
            grid[row][col] = marker;
        }
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.3}, {x_max:.3}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Legend line naming each scatter series and the curve.
pub fn legend(figure: &Figure) -> String {
    format!(
        "{} | x: {} | y: {}\n",
        figure.legend_entries().join("  "),
        figure.x_label,
        figure.y_label
    )
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y max is row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], x_min: f64, x_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(x, y) in curve {
        if !y.is_finite() {
            prev = None;
            continue;
        }
        let col = map_x(x, x_min, x_max, width);
        let row = map_y(y, y_min, y_max, height);
        if let Some((c0, r0)) = prev {
            draw_line(grid, (c0, r0), (col, row), '-');
        } else {
            grid[row][col] = '-';
        }
        prev = Some((col, row));
    }
}

/// Bresenham segment from `from` to `to` (column, row); only blank cells are written.
fn draw_line(grid: &mut [Vec<char>], from: (usize, usize), to: (usize, usize), ch: char) {
    let (mut col, mut row) = (from.0 as i64, from.1 as i64);
    let (end_col, end_row) = (to.0 as i64, to.1 as i64);
    let step_col = (end_col - col).signum();
    let step_row = (end_row - row).signum();
    let span_col = (end_col - col).abs();
    let span_row = -(end_row - row).abs();
    let mut err = span_col + span_row;

    loop {
        if let Some(cell) = grid
            .get_mut(row as usize)
            .and_then(|r| r.get_mut(col as usize))
            .filter(|cell| **cell == ' ')
        {
            *cell = ch;
        }
        if (col, row) == (end_col, end_row) {
            break;
        }
        let twice = 2 * err;
        if twice >= span_row {
            err += span_row;
            col += step_col;
        }
        if twice <= span_col {
            err += span_col;
            row += step_row;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{ScatterSeries, SeriesRole};

    fn figure(scatter: Vec<ScatterSeries>, curve: Vec<(f64, f64)>) -> Figure {
        Figure {
            title: "t".to_string(),
            x_label: "voltage (V)".to_string(),
            y_label: "charge consumed (Ah)".to_string(),
            scatter,
            curve: Some(curve),
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let fig = figure(
            vec![ScatterSeries {
                label: "training".to_string(),
                role: SeriesRole::Training,
                points: vec![(1.0, 100.0), (10.0, 110.0)],
            }],
            vec![(1.0, 100.0), (10.0, 100.0)],
        );

        let txt = render(&fig, 10, 5);
        let expected = concat!(
            "Plot: x=[1.000, 10.000] | y=[99.50, 110.50]\n",
            "         o\n",
            "          \n",
            "          \n",
            "          \n",
            "o---------\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn overlay_points_use_their_own_marker() {
        let fig = figure(
            vec![
                ScatterSeries {
                    label: "training".to_string(),
                    role: SeriesRole::Training,
                    points: vec![(0.0, 0.0)],
                },
                ScatterSeries {
                    label: "validation".to_string(),
                    role: SeriesRole::Overlay,
                    points: vec![(1.0, 1.0)],
                },
            ],
            vec![(0.0, 0.0), (1.0, 1.0)],
        );
        let txt = render(&fig, 10, 5);
        let rows: Vec<&str> = txt.lines().skip(1).collect();
        assert_eq!(rows[0].chars().last(), Some('x'));
        assert_eq!(rows[4].chars().next(), Some('o'));
        assert_eq!(
            legend(&fig),
            "o training  x validation  - fit | x: voltage (V) | y: charge consumed (Ah)\n"
        );
    }
}
