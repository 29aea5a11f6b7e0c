//! Ratatui-based terminal viewer.
//!
//! Shows the fitted curve over the training samples (and the validation
//! overlay, when loaded). The fit can be tightened or loosened in place:
//! the samples stay in memory and only the fit step reruns.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{RunOutput, fit_loaded};
use crate::domain::{FitConfig, FitSpec};
use crate::error::AppError;
use crate::plot::{Figure, pad_range};

mod chart;

use chart::CurveChart;

/// Smoothing factor used when loosening an interpolating spline.
const FIRST_SMOOTHING: f64 = 1e-3;

/// Open the viewer on a completed run.
pub fn show(config: &FitConfig, run: RunOutput) -> Result<(), AppError> {
    let viewer = Viewer::new(Source::Run {
        config: config.clone(),
        run,
    });
    open(viewer)
}

/// Open the viewer on a fixed figure (e.g. a saved curve).
pub fn show_figure(figure: Figure) -> Result<(), AppError> {
    open(Viewer::new(Source::Static(figure)))
}

fn open(mut viewer: Viewer) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::Terminal(format!("failed to initialize terminal: {e}")))?;

    viewer.event_loop(&mut terminal)
}

/// Next fit spec one step looser (`step > 0`) or tighter (`step < 0`).
///
/// Polynomial: degree ± 1, never below 0. Spline: smoothing doubled or
/// halved; an interpolating spline (`s = 0`) steps up to a small positive `s`.
pub fn adjust_fit(spec: FitSpec, step: i32) -> FitSpec {
    match spec {
        FitSpec::Polynomial { degree } => FitSpec::Polynomial {
            degree: if step >= 0 {
                degree.saturating_add(1)
            } else {
                degree.saturating_sub(1)
            },
        },
        FitSpec::Spline { smoothing } => FitSpec::Spline {
            smoothing: match (step >= 0, smoothing > 0.0) {
                (true, true) => smoothing * 2.0,
                (true, false) => FIRST_SMOOTHING,
                (false, _) => smoothing / 2.0,
            },
        },
    }
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::Terminal(format!("failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::Terminal(format!("failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

enum Source {
    Run { config: FitConfig, run: RunOutput },
    Static(Figure),
}

struct Viewer {
    source: Source,
    show_overlay: bool,
    status: String,
}

impl Viewer {
    fn new(source: Source) -> Self {
        let status = match &source {
            Source::Run { run, .. } => format!("fit: {}", run.fit.spec.describe()),
            Source::Static(_) => "saved curve".to_string(),
        };
        Self {
            source,
            show_overlay: true,
            status,
        }
    }

    fn figure(&self) -> Figure {
        match &self.source {
            Source::Run { config, run } => {
                let overlay = if self.show_overlay {
                    run.data.overlay.as_ref()
                } else {
                    None
                };
                Figure::from_fit(config.analysis, &run.data.training, overlay, &run.fit)
            }
            Source::Static(figure) => figure.clone(),
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::Terminal(format!("draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::Terminal(format!("event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::Terminal(format!("event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press. Returns `true` when the viewer should close.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Right => self.refit(1),
            KeyCode::Char('-') | KeyCode::Left => self.refit(-1),
            KeyCode::Char('o') => {
                self.show_overlay = !self.show_overlay;
                self.status = match &self.source {
                    Source::Run { run, .. } if run.data.overlay.is_none() => "no validation overlay loaded".to_string(),
                    _ if self.show_overlay => "overlay shown".to_string(),
                    _ => "overlay hidden".to_string(),
                };
            }
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn refit(&mut self, step: i32) {
        let Source::Run { config, run } = &mut self.source else {
            self.status = "saved curve: nothing to refit".to_string();
            return;
        };

        let mut next = config.clone();
        next.fit = adjust_fit(config.fit, step);
        match fit_loaded(run.data.clone(), &next) {
            Ok(refit) => {
                self.status = format!("fit: {}", next.fit.describe());
                *config = next;
                *run = refit;
            }
            Err(err) => {
                tracing::debug!(error = %err, "refit rejected");
                self.status = format!("{}: {err}", next.fit.describe());
            }
        }
    }

    fn write_debug(&mut self) {
        let Source::Run { config, run } = &self.source else {
            self.status = "saved curve: no run to dump".to_string();
            return;
        };
        self.status = match crate::debug::write_debug_bundle(config, run) {
            Ok(path) => format!("wrote debug bundle: {}", path.display()),
            Err(err) => format!("debug write failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        let figure = self.figure();
        self.draw_header(frame, chunks[0], &figure);
        draw_chart(frame, chunks[1], &figure);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect, figure: &Figure) {
        let mut lines = vec![Line::from(vec![
            Span::styled("dcfit", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" - {}", figure.title)),
        ])];

        let stats = match &self.source {
            Source::Run { run, .. } => {
                let q = &run.fit.quality;
                let mut text = format!("n={} | SSE={:.4e} | RMSE={:.4e} | max|r|={:.4e}", q.n, q.sse, q.rmse, q.max_abs_residual);
                if let (true, Some(v)) = (self.show_overlay, &run.validation) {
                    text.push_str(&format!(
                        " | validation RMSE={:.4e} ({} extrapolated)",
                        v.stats.rmse, v.stats.extrapolated
                    ));
                }
                text
            }
            Source::Static(figure) => format!(
                "{} curve points",
                figure.curve.as_ref().map_or(0, Vec::len)
            ),
        };
        lines.push(Line::from(Span::styled(stats, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "+/- or ←/→ adjust fit  o overlay  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_chart(frame: &mut ratatui::Frame<'_>, area: Rect, figure: &Figure) {
    let block = Block::default().title(legend_title(figure)).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    frame.render_widget(Clear, inner);

    let (Some((x0, x1)), Some((y0, y1))) = (figure.x_range(), figure.y_range()) else {
        frame.render_widget(
            Paragraph::new("Nothing to plot.").style(Style::default().fg(Color::Yellow)),
            inner,
        );
        return;
    };
    let (x0, x1) = pad_range(x0, x1, 0.02);
    let (y0, y1) = pad_range(y0, y1, 0.05);

    frame.render_widget(
        CurveChart {
            figure,
            x_bounds: [x0, x1],
            y_bounds: [y0, y1],
        },
        inner,
    );
}

fn legend_title(figure: &Figure) -> String {
    figure.legend_entries().join("  ")
}
