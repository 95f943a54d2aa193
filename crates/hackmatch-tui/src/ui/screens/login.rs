use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::state::LoginFocus;
use crate::ui::render::centered_rect_fixed;
use crate::ui::styles;

const FIELD_WIDTH: usize = 20;

fn field_line<'a>(label: &'a str, value: String, focused: bool) -> Line<'a> {
    let cursor = if focused { "▌" } else { "" };
    Line::from(vec![
        Span::raw("    "),
        Span::styled(label, styles::muted_style()),
        Span::styled(" [", styles::muted_style()),
        Span::styled(format!("{:<width$}{}", value, cursor, width = FIELD_WIDTH), styles::input_style(focused)),
        Span::styled("]", styles::muted_style()),
    ])
}

fn button_line(label: &str, focused: bool, enabled: bool) -> Line<'static> {
    let text = if focused {
        format!(" ▶ {} ◀ ", label)
    } else {
        format!("   {}   ", label)
    };
    let style = if !enabled {
        styles::muted_style()
    } else {
        styles::input_style(focused)
    };
    Line::from(vec![
        Span::raw("             ["),
        Span::styled(text, style),
        Span::raw("]"),
    ])
}

pub fn render_login(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.login;
    let height = if form.error.is_some() { 13 } else { 11 };
    let dialog = centered_rect_fixed(48, height, area);
    frame.render_widget(Clear, dialog);

    // Masked so the password never reaches the screen
    let masked = "*".repeat(form.password.chars().count().min(FIELD_WIDTH));

    let mut lines = vec![
        Line::from(Span::styled("  Sign in to hackmatch", styles::title_style())),
        Line::from(""),
        field_line("Username:", form.username.clone(), form.focus == LoginFocus::Username),
        field_line("Password:", masked, form.focus == LoginFocus::Password),
        Line::from(""),
    ];

    let button_label = if form.submitting { "Signing in..." } else { "Login" };
    lines.push(button_line(button_label, form.focus == LoginFocus::Button, !form.submitting));
    lines.push(Line::from(""));

    let link_style = if form.focus == LoginFocus::CodeLink {
        styles::selected_style()
    } else {
        styles::highlight_style()
    };
    lines.push(Line::from(vec![
        Span::raw("    "),
        Span::styled("Have a code from the Telegram bot?", link_style),
    ]));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}

pub fn render_code_login(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.code_login;
    let height = if form.error.is_some() { 12 } else { 10 };
    let dialog = centered_rect_fixed(48, height, area);
    frame.render_widget(Clear, dialog);

    let mut lines = vec![
        Line::from(Span::styled("  Sign in with a code", styles::title_style())),
        Line::from(Span::styled("  Ask the Telegram bot for a login code.", styles::muted_style())),
        Line::from(""),
        field_line("Code:", form.code.clone(), !form.submitting),
        Line::from(""),
    ];

    let label = if form.submitting { "Checking..." } else { "Sign in" };
    lines.push(button_line(label, false, form.can_submit()));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("    [Esc]", styles::help_key_style()),
        Span::styled(" back to password login", styles::muted_style()),
    ]));

    if let Some(ref error) = form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {}", error), styles::error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), dialog);
}
