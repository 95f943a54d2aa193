use chrono::{Datelike, Local};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::state::{HomeScreen, WEEKDAY_NAMES};
use crate::ui::styles;

/// Calendar panel width: 7 columns of 4 chars plus borders
const CALENDAR_WIDTH: u16 = 32;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(CALENDAR_WIDTH), Constraint::Min(30)])
        .split(area);

    render_calendar(frame, app, chunks[0]);
    render_hackathon_list(frame, app, chunks[1]);
}

fn render_calendar(frame: &mut Frame, app: &App, area: Rect) {
    let home = &app.home;
    let mut lines = vec![
        Line::from(Span::styled(format!(" Hello, {}!", app.display_name()), styles::highlight_style())),
        Line::from(""),
        Line::from(Span::styled(format!(" ◀ {:^22} ▶", home.month.title()), styles::title_style())),
        Line::from(""),
    ];

    let header: Vec<Span> = WEEKDAY_NAMES
        .iter()
        .map(|name| Span::styled(format!(" {:>2} ", name), styles::muted_style()))
        .collect();
    lines.push(Line::from(header));

    for week in home.month.weeks() {
        let spans: Vec<Span> = week.iter().map(|day| day_span(home, *day)).collect();
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled(" ██", styles::highlight_style()),
        Span::styled(" hackathon day", styles::muted_style()),
    ]));

    let block = Block::default()
        .title(" Calendar ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn day_span(home: &HomeScreen, day: Option<u32>) -> Span<'static> {
    let Some(day) = day else {
        return Span::raw("    ");
    };
    let text = format!(" {:>2} ", day);
    let today = Local::now().date_naive();
    if home.is_hackathon_day(day) {
        Span::styled(text, styles::event_day_style())
    } else if home.month.contains(today) && today.day() == day {
        Span::styled(text, styles::today_style())
    } else {
        Span::styled(text, styles::list_item_style())
    }
}

fn render_hackathon_list(frame: &mut Frame, app: &App, area: Rect) {
    let home = &app.home;

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Category"),
        Cell::from("Starts"),
        Cell::from("Difficulty"),
        Cell::from("Teams"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = home
        .hackathons
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let style = if i == home.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(h.name.as_str()),
                Cell::from(h.category_label()),
                Cell::from(h.start_date.as_deref().unwrap_or("TBD")),
                Cell::from(h.difficulty_label()),
                Cell::from(h.teams_display()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Fill(1),
        Constraint::Length(14),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
    ];

    let title = if home.loading {
        " Hackathons (loading...) ".to_string()
    } else {
        format!(" Hackathons ({}) ", home.hackathons.len())
    };

    if !home.loading && home.hackathons.is_empty() {
        let block = Block::default()
            .title(title)
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true));
        let empty = Paragraph::new(Line::from(Span::styled(" No hackathons yet", styles::muted_style())))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(true)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(home.selection));

    frame.render_stateful_widget(table, area, &mut state);
}
