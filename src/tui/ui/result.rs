//! Prediction result view: headline and survival curve chart.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::domain::{RfsPrediction, HORIZON_MONTHS};
use crate::tui::styles::MedicalTheme;

/// Upper bound of the survival axis; leaves headroom above 1.0.
const Y_MAX: f64 = 1.05;

/// Result screen state
#[derive(Debug, Clone, Default)]
pub enum ResultState {
    #[default]
    Idle,
    Complete {
        prediction: RfsPrediction,
    },
    Error {
        message: String,
    },
}

/// X axis tick labels every 6 months.
#[must_use]
pub fn month_ticks() -> Vec<String> {
    (0..=HORIZON_MONTHS).step_by(6).map(|m| m.to_string()).collect()
}

pub fn render_result(f: &mut Frame, area: Rect, state: &ResultState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_result_header(f, chunks[0]);
    match state {
        ResultState::Idle => {}
        ResultState::Complete { prediction } => render_prediction(f, chunks[1], prediction),
        ResultState::Error { message } => render_error(f, chunks[1], message),
    }
    render_result_footer(f, chunks[2]);
}

fn render_result_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Prediction", MedicalTheme::title()),
        Span::styled(" │ Ensemble survival curve", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_prediction(f: &mut Frame, area: Rect, prediction: &RfsPrediction) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Headline
            Constraint::Min(10),   // Chart
        ])
        .split(area);

    let headline = Paragraph::new(vec![
        Line::from(Span::styled(
            prediction.headline(),
            MedicalTheme::survival(prediction.curve.three_year_rfs()),
        )),
        Line::from(Span::styled(
            format!(
                "{} survival function(s) · artifact {} · {}",
                prediction.curve.curve_count(),
                prediction.artifact_version,
                prediction.created_at.format("%Y-%m-%d %H:%M UTC")
            ),
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border_focused()),
    );
    f.render_widget(headline, chunks[0]);

    let points = prediction.curve.points();
    let dataset = Dataset::default()
        .name("RFS")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(MedicalTheme::curve())
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(
            Block::default()
                .title(Span::styled(
                    " Recurrence-free survival ",
                    MedicalTheme::subtitle(),
                ))
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled("Months", MedicalTheme::text_secondary()))
                .style(MedicalTheme::text_muted())
                .bounds([0.0, f64::from(HORIZON_MONTHS)])
                .labels(month_ticks()),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("Probability", MedicalTheme::text_secondary()))
                .style(MedicalTheme::text_muted())
                .bounds([0.0, Y_MAX])
                .labels(["0.0", "0.5", "1.0"]),
        );
    f.render_widget(chart, chunks[1]);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Prediction unavailable", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_result_footer(f: &mut Frame, area: Rect) {
    let content = Line::from(vec![
        Span::styled("[Enter] ", MedicalTheme::key_hint()),
        Span::styled("New Patient ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Quit", MedicalTheme::key_desc()),
    ]);

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
