use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use hackmatch_core::models::{Message, MessageStatus};

use crate::app::App;
use crate::ui::styles;

fn status_style(status: MessageStatus) -> ratatui::style::Style {
    match status {
        MessageStatus::Pending => styles::highlight_style(),
        MessageStatus::Accepted => styles::success_style(),
        MessageStatus::Declined => styles::error_style(),
        MessageStatus::Unknown => styles::muted_style(),
    }
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_list(frame, app, chunks[0]);
    render_detail(frame, app.messages.selected(), chunks[1]);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.messages;
    let title = if screen.loading {
        " Messages (loading...) ".to_string()
    } else {
        format!(" Messages ({}) ", screen.messages.len())
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if !screen.loading && screen.messages.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(" No messages", styles::muted_style()))).block(block),
            area,
        );
        return;
    }

    let header = Row::new([Cell::from("From"), Cell::from("Team"), Cell::from("Status")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = screen
        .messages
        .iter()
        .enumerate()
        .map(|(i, message)| {
            let style = if i == screen.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(message.sender_username.as_str()),
                Cell::from(message.team_name.as_str()),
                Cell::from(Span::styled(message.status.to_string(), status_style(message.status))),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Percentage(35), Constraint::Fill(1), Constraint::Length(10)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(screen.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_detail(frame: &mut Frame, message: Option<&Message>, area: Rect) {
    let block = Block::default()
        .title(" Detail ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    let Some(message) = message else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(message.team_name.clone(), styles::title_style())),
        Line::from(vec![
            Span::styled("From:   ", styles::muted_style()),
            Span::raw(message.sender_username.clone()),
        ]),
        Line::from(vec![
            Span::styled("Sent:   ", styles::muted_style()),
            Span::raw(message.sent_display()),
        ]),
        Line::from(vec![
            Span::styled("Status: ", styles::muted_style()),
            Span::styled(message.status.to_string(), status_style(message.status)),
        ]),
        Line::from(""),
        Line::from(message.text.clone()),
        Line::from(""),
    ];

    if message.is_pending() {
        lines.push(Line::from(vec![
            Span::styled("[a]", styles::help_key_style()),
            Span::styled(" accept  ", styles::help_desc_style()),
            Span::styled("[d]", styles::help_key_style()),
            Span::styled(" decline", styles::help_desc_style()),
        ]));
    }

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
