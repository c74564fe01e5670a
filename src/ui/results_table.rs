use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget, Wrap},
};

use crate::{
    app::App,
    results::outcome_label,
    session::{LevelResult, OutcomeKind},
    util::format_clock,
};

fn outcome_color(outcome: OutcomeKind) -> Color {
    match outcome {
        OutcomeKind::Success => Color::Green,
        OutcomeKind::Failed => Color::Red,
        OutcomeKind::TimedOut => Color::Yellow,
        OutcomeKind::Skipped => Color::Gray,
    }
}

/// Pure presenter for a single level row
pub fn present_row(result: &LevelResult) -> Row<'static> {
    Row::new(vec![
        Cell::from(result.level_id.to_string()),
        Cell::from(outcome_label(result))
            .style(Style::default().fg(outcome_color(result.outcome))),
        Cell::from(result.points_awarded.to_string()),
        Cell::from(format_clock(result.time_taken)),
        Cell::from(result.hints_used.to_string()),
        Cell::from(result.attempts_made.to_string()),
        Cell::from(result.correct_answer.clone()),
    ])
}

/// Render the end-of-session screen
pub fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(report) = &app.report else {
        Paragraph::new("No results found")
            .alignment(Alignment::Center)
            .render(area, buf);
        return;
    };
    let summary = &report.summary;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(2), // totals
            Constraint::Min(0),    // per-level table
            Constraint::Length(2), // feedback
            Constraint::Length(1), // legend
        ])
        .split(area);

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let cyan_bold_style = Style::default().patch(bold_style).fg(Color::Cyan);

    Paragraph::new(Line::from(vec![
        Span::styled("Investigation ", bold_style),
        Span::styled("Complete", cyan_bold_style),
    ]))
    .block(Block::default().borders(Borders::ALL))
    .alignment(Alignment::Center)
    .render(chunks[0], buf);

    let totals = vec![
        Line::from(vec![
            Span::styled(
                format!("Score: {} / {}", summary.score, app.catalog.max_score()),
                cyan_bold_style,
            ),
            Span::raw("   "),
            Span::styled(report.rank.clone(), bold_style),
        ]),
        Line::from(format!(
            "Decrypted {}/{}   Total time {}   Hints used {}",
            summary.successes(),
            summary.total_levels,
            format_clock(summary.total_time_secs()),
            summary.hints_used()
        )),
    ];
    Paragraph::new(totals)
        .alignment(Alignment::Center)
        .render(chunks[1], buf);

    let header = Row::new(vec![
        Cell::from("File"),
        Cell::from("Status"),
        Cell::from("Pts"),
        Cell::from("Time"),
        Cell::from("Hints"),
        Cell::from("Tries"),
        Cell::from("Answer"),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows: Vec<Row> = summary.results.iter().map(present_row).collect();
    let widths = [
        Constraint::Length(4),
        Constraint::Length(10),
        Constraint::Length(4),
        Constraint::Length(6),
        Constraint::Length(5),
        Constraint::Length(5),
        Constraint::Min(10),
    ];
    Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Evidence Log"))
        .render(chunks[2], buf);

    Paragraph::new(app.feedback.clone().unwrap_or_default())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(r)estart / (e)xport report / (q)uit",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}
