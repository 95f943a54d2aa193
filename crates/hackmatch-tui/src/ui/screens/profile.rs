use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use hackmatch_core::models::Profile;

use crate::app::App;
use crate::state::{ProfileField, ProfileMode, ProfileScreen};
use crate::ui::styles;

const EDIT_FIELDS: [ProfileField; 4] = [
    ProfileField::DisplayName,
    ProfileField::Bio,
    ProfileField::Skills,
    ProfileField::Experience,
];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.profile_screen;

    if screen.loading {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(" Loading profile...", styles::muted_style())))
                .block(panel(" Profile ", false)),
            area,
        );
        return;
    }

    if screen.missing {
        render_missing(frame, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    match &screen.profile {
        Some(profile) => render_details(frame, profile, chunks[0]),
        None => frame.render_widget(
            Paragraph::new(Line::from(Span::styled(" Profile unavailable, [r] to retry", styles::muted_style())))
                .block(panel(" Profile ", false)),
            chunks[0],
        ),
    }

    match screen.mode {
        ProfileMode::View => render_actions(frame, chunks[1]),
        ProfileMode::Edit(focus) => render_edit_form(frame, screen, focus, chunks[1]),
        ProfileMode::Avatar => render_avatar_form(frame, screen, chunks[1]),
    }
}

fn panel(title: &str, focused: bool) -> Block<'_> {
    Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused))
}

fn render_missing(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Your profile is not set up yet", styles::title_style())),
        Line::from(""),
        Line::from(Span::styled(
            " Accounts created through the Telegram bot start without a profile.",
            styles::list_item_style(),
        )),
        Line::from(Span::styled(
            " Finish registration in the bot, then press [r] to reload.",
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(" [l]", styles::help_key_style()),
            Span::styled(" log out", styles::help_desc_style()),
        ]),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(panel(" Profile ", false)).wrap(Wrap { trim: false }),
        area,
    );
}

fn detail_line<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<14}", label), styles::muted_style()),
        Span::raw(value),
    ])
}

fn render_details(frame: &mut Frame, profile: &Profile, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(profile.name().to_string(), styles::title_style())),
        Line::from(Span::styled(format!("@{}", profile.username), styles::muted_style())),
        Line::from(""),
        detail_line("Level:", profile.level_label().to_string()),
        detail_line(
            "Experience:",
            profile.experience_label().unwrap_or_else(|| "-".to_string()),
        ),
        detail_line(
            "Hackathons:",
            profile.hackathons_participated.unwrap_or(0).to_string(),
        ),
        detail_line("Skills:", profile.skills.clone().unwrap_or_else(|| "-".to_string())),
        detail_line("Avatar:", profile.avatar.clone().unwrap_or_else(|| "none".to_string())),
    ];

    if profile.is_telegram_user {
        lines.push(detail_line("Signed in via:", "Telegram".to_string()));
    }

    if let Some(bio) = profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("About", styles::highlight_style())));
        lines.push(Line::from(bio.to_string()));
    }

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Profile ", false)).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_actions(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  [e]", styles::help_key_style()),
            Span::styled(" Edit profile", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  [u]", styles::help_key_style()),
            Span::styled(" Upload avatar", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  [l]", styles::help_key_style()),
            Span::styled(" Log out", styles::help_desc_style()),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).block(panel(" Actions ", true)), area);
}

fn render_edit_form(frame: &mut Frame, screen: &ProfileScreen, focus: ProfileField, area: Rect) {
    let mut lines = vec![Line::from("")];

    for field in EDIT_FIELDS {
        let focused = field == focus;
        let cursor = if focused { "▌" } else { "" };
        lines.push(Line::from(Span::styled(format!(" {}", field.label()), styles::muted_style())));
        lines.push(Line::from(vec![
            Span::raw(" "),
            Span::styled(format!("{}{}", screen.draft.field(field), cursor), styles::input_style(focused)),
        ]));
        lines.push(Line::from(""));
    }

    let hint = if screen.saving {
        " Saving..."
    } else {
        " [Tab] next field | [Enter] save | [Esc] cancel"
    };
    lines.push(Line::from(Span::styled(hint, styles::muted_style())));

    frame.render_widget(
        Paragraph::new(lines).block(panel(" Edit profile ", true)).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_avatar_form(frame: &mut Frame, screen: &ProfileScreen, area: Rect) {
    let hint = if screen.saving {
        " Uploading..."
    } else {
        " [Enter] upload | [Esc] cancel"
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Path to an image file", styles::muted_style())),
        Line::from(vec![
            Span::raw(" "),
            Span::styled(format!("{}▌", screen.avatar_path), styles::input_style(true)),
        ]),
        Line::from(""),
        Line::from(Span::styled(hint, styles::muted_style())),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(panel(" Upload avatar ", true)).wrap(Wrap { trim: false }),
        area,
    );
}
