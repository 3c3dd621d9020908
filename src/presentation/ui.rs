use crate::application::{App, AppMode, NoticeKind};
use crate::domain::{FieldKind, FieldSpec};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

pub fn render_ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    render_progress(f, app, chunks[1]);
    if app.wizard.is_finished() {
        render_success(f, app, chunks[2]);
    } else {
        render_step(f, app, chunks[2]);
    }
    render_status_bar(f, app, chunks[3]);

    if matches!(app.mode, AppMode::Help) {
        render_help_popup(f, app.help_scroll);
    }
}

fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let definition = app.wizard.definition();
    let text = if app.wizard.is_finished() {
        format!("{} | Submitted", definition.name)
    } else {
        format!("{} | Step {} of {}", definition.name, app.wizard.current_step(), app.wizard.total_steps())
    };
    let header = Paragraph::new(text).style(Style::default().fg(Color::Cyan));
    f.render_widget(header, area);
}

fn render_progress(f: &mut Frame, app: &App, area: Rect) {
    let label = if app.wizard.is_finished() {
        "Complete".to_string()
    } else {
        format!("Estimated time: {} min", app.wizard.minutes_remaining())
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(app.wizard.progress().clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_step(f: &mut Frame, app: &App, area: Rect) {
    let definition = app.wizard.definition();
    let Some(step) = definition.step(app.wizard.current_step()) else {
        return;
    };

    let mut lines = Vec::new();
    let fields = app.step_fields();
    if fields.is_empty() {
        // Review screens show the one-line summary instead of inputs.
        lines.push(Line::from((definition.summary)(app.wizard.fields())));
    }
    for (index, spec) in fields.iter().enumerate() {
        let focused = index == app.focus;
        lines.push(field_line(app, spec, focused));
        if focused {
            if let FieldKind::Choice(options) = spec.kind {
                lines.push(Line::from(Span::styled(
                    format!("    options: {}", options.join(" / ")),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(step.title))
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn field_line(app: &App, spec: &FieldSpec, focused: bool) -> Line<'static> {
    let value = app.display_value(spec);
    let shown = match spec.kind {
        FieldKind::Choice(_) if !value.is_empty() => format!("< {value} >"),
        FieldKind::Flag if value.is_empty() => "(y/n)".to_string(),
        FieldKind::Derived { .. } if value.is_empty() => "-".to_string(),
        _ => value,
    };
    let marker = if focused { "> " } else { "  " };
    let style = if focused {
        Style::default().bg(Color::Blue).fg(Color::White)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!("{marker}{}: ", spec.label), Style::default().fg(Color::Yellow)),
        Span::styled(shown, style),
    ])
}

fn render_success(f: &mut Frame, app: &App, area: Rect) {
    let definition = app.wizard.definition();
    let lines = vec![
        Line::from(Span::styled("Thank you!", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from((definition.summary)(app.wizard.fields())),
        Line::from(""),
        Line::from("A member of our team will be in touch shortly."),
        Line::from("Press Enter to start a new application."),
    ];
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Application received"))
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match (app.mode, app.latest_notice()) {
        (AppMode::Help, _) => (
            "↑↓/jk: scroll | PgUp/PgDn: fast scroll | Home: top | Esc/q: close help".to_string(),
            Style::default().fg(Color::Cyan),
        ),
        (AppMode::Normal, Some(notice)) => {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            let text = if notice.detail.is_empty() {
                notice.title
            } else {
                format!("{}: {}", notice.title, notice.detail)
            };
            (text, Style::default().fg(color))
        }
        (AppMode::Normal, None) if app.wizard.is_submitting() => {
            ("Submitting...".to_string(), Style::default().fg(Color::Yellow))
        }
        (AppMode::Normal, None) => {
            let action = if app.wizard.is_final_step() { "submit" } else { "next" };
            (
                format!("Enter: {action} | Esc: back | ↑↓: field | ←→: choose | Ctrl+R: restart | F1: help | Ctrl+Q: quit"),
                Style::default(),
            )
        }
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn render_help_popup(f: &mut Frame, scroll: usize) {
    let area = f.area();
    let popup_area = Rect {
        x: area.width / 10,
        y: area.height / 10,
        width: area.width * 4 / 5,
        height: area.height * 4 / 5,
    };

    f.render_widget(Clear, popup_area);

    let help_lines: Vec<&str> = HELP_TEXT.lines().collect();
    let visible_height = popup_area.height.saturating_sub(2) as usize;

    let start_line = scroll.min(help_lines.len().saturating_sub(visible_height));
    let end_line = (start_line + visible_height).min(help_lines.len());

    let visible_text = help_lines[start_line..end_line].join("\n");

    let help_widget = Paragraph::new(visible_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!("Help (Line {}/{})", start_line + 1, help_lines.len()))
                .style(Style::default().fg(Color::Cyan)),
        )
        .style(Style::default().fg(Color::White));

    f.render_widget(help_widget, popup_area);
}

const HELP_TEXT: &str = r#"DEALER WIZARD

=== FILLING IN A STEP ===
↑↓ or Tab       Move between the fields of the current step
←→              Pick the previous/next option of a choice field
Typing          Enter text; numeric fields keep digits only
y / n           Answer a yes/no question
Backspace       Delete the last character

=== MOVING BETWEEN STEPS ===
Enter           Continue to the next step (the step must be complete)
                On the last step, submit the application
Esc             Go back one step (never validates)
Ctrl+E          Jump back to edit the vehicle details, when offered

=== NUMBERS ===
Income and other money amounts are shown grouped: 65000 → 65,000
Dates of birth are typed as DDMMYYYY: 15031990 → 15/03/1990
Your age is worked out from your date of birth

=== SAVING ===
Progress is saved after every change and restored on the next run.
It is cleared once the application has been submitted.

=== OTHER ===
Ctrl+R          Start over with an empty application
F1              Show this help (scroll with ↑↓, PgUp/PgDn, Home)
Ctrl+Q/Ctrl+C   Quit (progress is kept)

=== HELP NAVIGATION ===
↑↓ or j/k       Scroll help text up/down one line
Page Up/Down    Scroll help text up/down 5 lines
Home            Jump to top of help text
Esc/F1/q        Close this help window"#;
