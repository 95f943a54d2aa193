use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use hackmatch_core::route::Route;

use crate::app::{App, AppState};

use super::screens::{hackathon, home, login, messages, my_teams, profile};
use super::styles;

/// Entries of the navigation bar: key, label, target
const NAV_ITEMS: [(&str, &str, Route); 4] = [
    ("h", "Home", Route::Home),
    ("p", "Profile", Route::Profile),
    ("m", "Messages", Route::Messages),
    ("t", "My Teams", Route::MyTeams),
];

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(2), // Navigation
            Constraint::Min(10),   // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_nav(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    // Render overlays
    match &app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::Notifying(message) => render_notification(frame, message),
        AppState::ConfirmingDelete { name, .. } => render_delete_overlay(frame, name),
        AppState::ConfirmingQuit => render_quit_overlay(frame),
        AppState::Normal | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  hackmatch";
    let help_hint = "[?] Help";
    let user = if app.route.is_protected() && app.can_render() {
        format!("{}  ", app.display_name())
    } else {
        String::new()
    };

    let used = title.len() + user.chars().count() + help_hint.len() + 4;
    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(user, styles::highlight_style()),
        Span::styled(help_hint, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_nav(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];

    if app.route.is_protected() {
        for (i, (key, label, route)) in NAV_ITEMS.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", styles::muted_style()));
            }
            let selected = app.route == *route;
            spans.push(Span::styled(format!("[{}] {}", key, label), styles::nav_style(selected)));
        }
        spans.push(Span::styled(" | ", styles::muted_style()));
        spans.push(Span::styled("[l] Logout", styles::nav_style(false)));
    } else {
        spans.push(Span::styled(app.route.title(), styles::nav_style(true)));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    if !app.can_render() {
        render_checking_session(frame, app, area);
        return;
    }

    match &app.route {
        Route::Root | Route::Logout => render_checking_session(frame, app, area),
        Route::Home => home::render(frame, app, area),
        Route::Hackathon(_) => hackathon::render(frame, app, area),
        Route::Profile => profile::render(frame, app, area),
        Route::Messages => messages::render(frame, app, area),
        Route::MyTeams => my_teams::render(frame, app, area),
        Route::Login => login::render_login(frame, app, area),
        Route::TelegramLogin { .. } => login::render_code_login(frame, app, area),
        Route::NotFound(path) => render_not_found(frame, path, area),
    }
}

/// Placeholder while the guard has not allowed the screen yet
fn render_checking_session(frame: &mut Frame, app: &App, area: Rect) {
    let text = if app.refreshing {
        "Refreshing session..."
    } else {
        "Checking session..."
    };
    let paragraph = Paragraph::new(vec![Line::from(""), Line::from(Span::styled(text, styles::muted_style()))])
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

fn render_not_found(frame: &mut Frame, path: &str, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("404", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(format!("Nothing lives at {}", path), styles::list_item_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", styles::muted_style()),
            Span::styled("[h]", styles::help_key_style()),
            Span::styled(" to go home", styles::muted_style()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match &app.route {
        Route::Home => "[←/→] month | [Enter] open | [r]efresh | [q]uit",
        Route::Hackathon(_) => "[a] participate | [c]reate | [j]oin | [Esc] back | [q]uit",
        Route::Profile => "[e]dit | [u]pload avatar | [l]ogout | [q]uit",
        Route::Messages => "[a]ccept | [d]ecline | [r]efresh | [q]uit",
        Route::MyTeams => "[Enter] members | [i]nvite | [x] delete | [q]uit",
        Route::Login | Route::TelegramLogin { .. } => "[Tab] next field | [Enter] submit | [Esc] quit",
        _ => "[q]uit",
    };

    let left_text = match &app.status_message {
        Some(msg) => format!(" {} ", msg),
        None => format!(" {} ", app.config.api_url),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);
    frame.render_widget(Paragraph::new(status_line).style(styles::status_bar_style()), area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");

    let help_text = vec![
        Line::from(Span::styled("  hackmatch", styles::title_style())),
        Line::from(Span::styled(format!("  version {}", version), styles::muted_style())),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("h/p/m/t", "Home / profile / messages / teams"),
        help_line("↑/↓", "Navigate list"),
        help_line("Enter", "Select / open"),
        help_line("Esc", "Go back"),
        help_line("l", "Log out"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("r", "Refresh current screen"),
        help_line("a / c / j", "Participate / create / join team"),
        help_line("a / d", "Accept / decline request"),
        help_line("i / x", "Invite member / delete team"),
        help_line("e / u", "Edit profile / upload avatar"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

/// Blocking notification; any key dismisses it
fn render_notification(frame: &mut Frame, message: &str) {
    let area = centered_rect_fixed(50, 8, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(message.to_string(), styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled("Press any key to continue", styles::muted_style())),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_delete_overlay(frame: &mut Frame, name: &str) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   Delete team \"{}\"?", name), styles::error_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to delete, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_quit_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled("   Are you sure you want to quit?", styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(" to quit, ", styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .style(Style::default());

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fixed() {
        let outer = Rect::new(0, 0, 100, 40);
        let inner = centered_rect_fixed(50, 10, outer);
        assert_eq!(inner, Rect::new(25, 15, 50, 10));
    }

    #[test]
    fn test_centered_rect_clamps_to_small_area() {
        let outer = Rect::new(2, 3, 20, 5);
        let inner = centered_rect_fixed(50, 10, outer);
        assert_eq!(inner.width, 20);
        assert_eq!(inner.height, 5);
        assert_eq!((inner.x, inner.y), (2, 3));
    }
}
