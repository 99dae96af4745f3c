//! Terminal chart renderer (ratatui).
//!
//! Layout:
//! ```text
//! ┌──────────────────────── title ────────────────────────┐
//! │ Team Scores                 │ Momentum: A - B         │
//! │ one line per team,          │ A minus B, with a zero  │
//! │ top scorer at latest point  │ reference line          │
//! ├─────────────────────────────┴─────────────────────────┤
//! │ caption / latest play                                 │
//! └───────────────────────────────────────────────────────┘
//! ```

use super::{ChartSnapshot, Renderer};
use crate::error::RenderError;
use crossterm::{
    cursor, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, IsTerminal, Stdout};
use tracing::debug;

const TEAM_COLORS: [Color; 6] = [
    Color::Yellow,
    Color::Cyan,
    Color::Green,
    Color::Magenta,
    Color::Blue,
    Color::White,
];

const SCALE_CAPTION: &str = "Left: cumulative team scores (always rising). \
Right: score difference (momentum), centered on zero, so the scales differ.";

pub struct TerminalRenderer<B: Backend> {
    terminal: Terminal<B>,
    owns_screen: bool,
}

impl TerminalRenderer<CrosstermBackend<Stdout>> {
    /// Take over stdout with an alternate screen.
    pub fn stdout() -> Result<Self, RenderError> {
        let mut stdout = io::stdout();
        if !stdout.is_terminal() {
            return Err(RenderError::Unavailable("stdout is not a terminal".to_string()));
        }
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let mut renderer = Self {
            terminal: Terminal::new(CrosstermBackend::new(stdout))?,
            owns_screen: true,
        };
        renderer.terminal.clear()?;
        Ok(renderer)
    }
}

impl<B: Backend> TerminalRenderer<B> {
    pub fn with_backend(backend: B) -> Result<Self, RenderError> {
        Ok(Self {
            terminal: Terminal::new(backend)?,
            owns_screen: false,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    /// Give the screen back to the shell. Safe to call more than once.
    pub fn restore(&mut self) -> Result<(), RenderError> {
        if self.owns_screen {
            self.owns_screen = false;
            execute!(io::stdout(), cursor::Show, LeaveAlternateScreen)?;
        }
        Ok(())
    }
}

impl<B: Backend> Drop for TerminalRenderer<B> {
    fn drop(&mut self) {
        let _ = self.restore();
    }
}

impl<B: Backend> Renderer for TerminalRenderer<B> {
    fn render(&mut self, snapshot: &ChartSnapshot) -> Result<(), RenderError> {
        self.terminal.draw(|frame| draw_chart(frame, snapshot))?;
        debug!("Drew frame at index {:?}", snapshot.latest_index);
        Ok(())
    }

    fn name(&self) -> &str {
        "terminal"
    }
}

/// Draw the full two-panel chart for `snapshot` into `frame`.
pub fn draw_chart(frame: &mut Frame, snapshot: &ChartSnapshot) {
    let [title_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(8),
        Constraint::Length(4),
    ])
    .areas(frame.area());

    let title = Paragraph::new(Line::from(Span::styled(
        snapshot.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(title, title_area);

    let [score_area, momentum_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(body_area);

    draw_scores(frame, score_area, snapshot);
    draw_momentum(frame, momentum_area, snapshot);
    draw_footer(frame, footer_area, snapshot);
}

fn team_color(i: usize) -> Color {
    TEAM_COLORS[i % TEAM_COLORS.len()]
}

fn axis_labels(lo: f64, hi: f64) -> Vec<String> {
    vec![
        format!("{:.0}", lo),
        format!("{:.0}", (lo + hi) / 2.0),
        format!("{:.0}", hi),
    ]
}

/// Plot region inside a bordered `Chart` with labelled axes. The x labels
/// and x axis line take the bottom two rows; the y labels and y axis line
/// take the left columns.
fn plot_area(area: Rect, x_labels: &[String], y_labels: &[String]) -> Rect {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    if inner.width == 0 || inner.height == 0 {
        return Rect::default();
    }

    let mut bottom = inner.bottom() - 1;
    if bottom > inner.top() {
        bottom -= 1;
    }

    let widest_y = y_labels.iter().map(|l| label_width(l)).max().unwrap_or(0);
    let first_x = x_labels.first().map_or(0, |l| label_width(l).saturating_sub(1));
    let mut left = inner.left() + widest_y.max(first_x).min(inner.width / 3);

    if bottom > inner.top() {
        bottom -= 1;
    }
    if left + 1 < inner.right() {
        left += 1;
    }

    Rect::new(
        left,
        inner.top(),
        inner.right().saturating_sub(left),
        bottom.saturating_sub(inner.top()) + 1,
    )
}

fn label_width(label: &str) -> u16 {
    u16::try_from(Line::from(label).width()).unwrap_or(u16::MAX)
}

/// Terminal cell holding data point `(x, y)` in `plot`.
fn plot_cell(
    plot: Rect,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    (x, y): (f64, f64),
) -> Option<(u16, u16)> {
    let x_span = x_bounds[1] - x_bounds[0];
    let y_span = y_bounds[1] - y_bounds[0];
    if plot.width == 0 || plot.height == 0 || x_span <= 0.0 || y_span <= 0.0 {
        return None;
    }
    if x < x_bounds[0] || x > x_bounds[1] || y < y_bounds[0] || y > y_bounds[1] {
        return None;
    }
    let col = ((x - x_bounds[0]) * f64::from(plot.width - 1) / x_span) as u16;
    let row = ((y_bounds[1] - y) * f64::from(plot.height - 1) / y_span) as u16;
    Some((plot.x + col, plot.y + row))
}

/// Where a label ending just left of `marker` starts, one row above it.
fn label_origin(plot: Rect, marker: (u16, u16), width: u16) -> (u16, u16) {
    let (col, row) = marker;
    let start = col.saturating_sub(width).max(plot.x);
    let row = if row > plot.y { row - 1 } else { row };
    (start, row)
}

fn draw_scores(frame: &mut Frame, area: Rect, snapshot: &ChartSnapshot) {
    let x_max = snapshot.x_max();
    let y_max = snapshot.score_y_max();
    let x_labels = axis_labels(0.0, x_max);
    let y_labels = axis_labels(0.0, y_max);

    // Top-scorer markers sit at each team's latest point; the label text is
    // written next to the marker once the chart is drawn.
    let labels: Vec<(String, Color, [(f64, f64); 1])> = snapshot
        .top_scorers
        .iter()
        .filter_map(|scorer| {
            let team_idx = snapshot.teams.iter().position(|t| t.name == scorer.team)?;
            let anchor = snapshot.label_anchor(&scorer.team)?;
            Some((scorer.label(), team_color(team_idx), [anchor]))
        })
        .collect();

    let mut datasets: Vec<Dataset> = snapshot
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            Dataset::default()
                .name(format!("{} {}", team.name, team.score))
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(team_color(i)))
                .data(&team.points)
        })
        .collect();

    for (_, color, point) in &labels {
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Dot)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(*color).add_modifier(Modifier::BOLD))
                .data(point),
        );
    }

    let chart = Chart::new(datasets)
        .block(Block::default().title("Team Scores").borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Play")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels.clone()),
        )
        .y_axis(
            Axis::default()
                .title("Score")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(y_labels.clone()),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));

    frame.render_widget(chart, area);

    let plot = plot_area(area, &x_labels, &y_labels);
    for (label, color, [anchor]) in &labels {
        let Some(marker) = plot_cell(plot, [0.0, x_max], [0.0, y_max], *anchor) else {
            continue;
        };
        let (x, y) = label_origin(plot, marker, label_width(label));
        frame.buffer_mut().set_stringn(
            x,
            y,
            label,
            usize::from(plot.right().saturating_sub(x)),
            Style::default().fg(*color).add_modifier(Modifier::BOLD),
        );
    }
}

fn draw_momentum(frame: &mut Frame, area: Rect, snapshot: &ChartSnapshot) {
    let x_max = snapshot.x_max();
    let y_max = snapshot.momentum_y_max();
    let zero_line = [(0.0, 0.0), (x_max, 0.0)];

    let title = match &snapshot.momentum_pair {
        Some((a, b)) => format!("Momentum: {} - {}", a, b),
        None => "Momentum: Waiting for 2 Teams".to_string(),
    };

    let datasets = vec![
        Dataset::default()
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::DarkGray))
            .data(&zero_line),
        Dataset::default()
            .name(format!("{:+}", snapshot.current_momentum))
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&snapshot.momentum),
    ];

    let chart = Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("Play")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(axis_labels(0.0, x_max)),
        )
        .y_axis(
            Axis::default()
                .title("Score Difference")
                .style(Style::default().fg(Color::Gray))
                .bounds([-y_max, y_max])
                .labels(axis_labels(-y_max, y_max)),
        )
        .legend_position(Some(LegendPosition::TopRight))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));

    frame.render_widget(chart, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, snapshot: &ChartSnapshot) {
    let play = match &snapshot.latest_note {
        Some(note) => Line::from(vec![
            Span::styled(
                note.timestamp.format("%H:%M:%S").to_string(),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw(format!(
                "  {} · {} +{}  {}",
                note.team, note.player, note.points, note.message
            )),
        ]),
        None => Line::from(Span::styled(
            "No plays yet",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let counts = Line::from(Span::styled(
        format!(
            "events applied: {}   rejected: {}",
            snapshot.applied, snapshot.rejected
        ),
        Style::default().fg(Color::DarkGray),
    ));

    let footer = Paragraph::new(vec![
        play,
        counts,
        Line::from(Span::styled(SCALE_CAPTION, Style::default().fg(Color::DarkGray))),
    ])
    .block(Block::default().borders(Borders::TOP))
    .wrap(Wrap { trim: true });

    frame.render_widget(footer, area);
}
