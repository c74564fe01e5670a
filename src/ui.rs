pub mod results_table;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{
    app::{App, AppState},
    engine::Phase,
    util::{format_clock, percent},
};

const HORIZONTAL_MARGIN: u16 = 2;
/// Countdown turns red below this many seconds
const LOW_TIME_SECS: u32 = 30;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Playing => render_play(self, area, buf),
            AppState::Results => results_table::render_results(self, area, buf),
        }
    }
}

fn render_play(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(level) = app.engine.current_level() else {
        return;
    };
    let state = app.engine.state();
    let locked = app.engine.phase() == Phase::Locked;

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let cyan_bold_style = Style::default().patch(bold_style).fg(Color::Cyan);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let inner_width = area.width.saturating_sub(HORIZONTAL_MARGIN * 2 + 2).max(1);
    let cipher_lines = (level.ciphertext.width() as f64 / inner_width as f64).ceil() as u16;

    let mut constraints = vec![
        Constraint::Length(1),                     // header
        Constraint::Length(1),                     // progress
        Constraint::Length(4),                     // file info
        Constraint::Length(cipher_lines.max(1) + 2), // ciphertext
        Constraint::Length(3),                     // input
        Constraint::Min(3),                        // hints
    ];
    if app.config.show_shift_explorer {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(3)); // feedback
    constraints.push(Constraint::Length(1)); // legend

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(constraints.as_slice())
        .split(area);

    let time_style = if state.time_remaining <= LOW_TIME_SECS {
        Style::default().patch(bold_style).fg(Color::Red)
    } else {
        cyan_bold_style
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled("Digital Forensics Lab", bold_style),
        Span::raw("   "),
        Span::styled(format!("Score: {}", app.engine.score()), cyan_bold_style),
        Span::raw("   "),
        Span::styled(format_clock(state.time_remaining), time_style),
    ]))
    .alignment(Alignment::Center);
    header.render(chunks[0], buf);

    let (position, total) = app.engine.progress();
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .percent(percent(position, total))
        .label(format!("Progress: {position}/{total}"))
        .render(chunks[1], buf);

    let info = Paragraph::new(vec![
        Line::from(Span::styled(level.title.clone(), bold_style)),
        Line::from(Span::styled(level.scenario.clone(), italic_style)),
    ])
    .block(Block::default().borders(Borders::TOP))
    .wrap(Wrap { trim: true });
    info.render(chunks[2], buf);

    let cipher = Paragraph::new(Span::styled(level.ciphertext.clone(), cyan_bold_style))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Encrypted File Content"),
        )
        .wrap(Wrap { trim: false });
    cipher.render(chunks[3], buf);

    let input_text = if locked {
        Span::styled(
            app.engine.revealed_answer().unwrap_or_default().to_string(),
            dim_style,
        )
    } else {
        Span::styled(format!("{}_", app.input), bold_style)
    };
    let input = Paragraph::new(input_text).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Decryption Input"),
    );
    input.render(chunks[4], buf);

    let mut hint_lines: Vec<Line> = app
        .engine
        .revealed_hints()
        .iter()
        .enumerate()
        .map(|(idx, hint)| Line::from(format!("Hint {}: {hint}", idx + 1)))
        .collect();
    if (state.hints_revealed as usize) < level.hints.len() && !locked {
        hint_lines.push(Line::from(Span::styled(
            format!(
                "(tab) Hint {} (-{}pts, -{}s)",
                state.hints_revealed + 1,
                level.hint_cost.points,
                level.hint_cost.time_secs
            ),
            dim_style,
        )));
    }
    let hints = Paragraph::new(hint_lines)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Investigation Tools  Attempts: {}/{} | Hints Used: {}/{}",
            state.attempts_used,
            level.max_attempts,
            state.hints_revealed,
            level.hints.len()
        )))
        .wrap(Wrap { trim: true });
    hints.render(chunks[5], buf);

    let mut next = 6;
    if app.config.show_shift_explorer {
        let preview = app.explorer_preview().unwrap_or_default();
        let explorer = Paragraph::new(Span::raw(preview)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Shift Explorer (up/down) shift {}", app.explorer_shift)),
        );
        explorer.render(chunks[next], buf);
        next += 1;
    }

    let mut feedback = app.feedback.clone().unwrap_or_default();
    if let Some(secs) = app.auto_advance_in() {
        feedback.push_str(&format!("  Next file in {secs}s"));
    }
    Paragraph::new(feedback)
        .block(Block::default().borders(Borders::TOP).title("Analysis Result"))
        .wrap(Wrap { trim: true })
        .render(chunks[next], buf);

    let legend = if locked {
        "(enter) next file / (esc)ape"
    } else {
        "(enter) submit / (tab) hint / (ctrl+n) skip / (esc)ape"
    };
    Paragraph::new(Span::styled(legend, italic_style)).render(chunks[next + 1], buf);
}
