use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use hackmatch_core::models::{Hackathon, Team};

use crate::app::App;
use crate::state::{HackathonPanel, HackathonScreen};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.hackathon;

    let Some(detail) = &screen.detail else {
        let text = if screen.loading {
            " Loading hackathon..."
        } else {
            " Hackathon not found. Press [Esc] to go back."
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(styles::border_style(false));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(text, styles::muted_style()))).block(block),
            area,
        );
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_info(frame, &detail.hackathon, screen, chunks[0]);

    match screen.panel {
        HackathonPanel::Teams => render_team_table(frame, " Teams ", &detail.teams, screen.selection, chunks[1]),
        HackathonPanel::Menu => render_menu(frame, chunks[1]),
        HackathonPanel::CreateTeam => render_create_team(frame, screen, chunks[1]),
        HackathonPanel::JoinTeam => render_team_table(
            frame,
            " Available teams - [Enter] request to join ",
            &screen.available_teams,
            screen.selection,
            chunks[1],
        ),
    }
}

fn info_line<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), styles::muted_style()),
        Span::raw(value),
    ])
}

fn render_info(frame: &mut Frame, hackathon: &Hackathon, screen: &HackathonScreen, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(hackathon.name.clone(), styles::title_style())),
        Line::from(""),
        info_line("Dates:", hackathon.dates_display()),
        info_line("Category:", hackathon.category_label().to_string()),
        info_line("Difficulty:", hackathon.difficulty_label().to_string()),
        info_line("Team size:", hackathon.team_size_display()),
        info_line("Teams:", hackathon.teams_display()),
        info_line("Partners:", hackathon.partners_display().to_string()),
        info_line("Roles:", hackathon.roles_display()),
        Line::from(""),
    ];

    if screen.participated {
        lines.push(Line::from(Span::styled("You are participating", styles::success_style())));
        lines.push(Line::from(Span::styled("[a] open team menu", styles::muted_style())));
    } else {
        lines.push(Line::from(vec![
            Span::styled("[a]", styles::help_key_style()),
            Span::styled(" participate", styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .title(" Hackathon ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

fn render_team_table(frame: &mut Frame, title: &str, teams: &[Team], selection: usize, area: Rect) {
    let block = Block::default()
        .title(title.to_string())
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    if teams.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(" No teams yet", styles::muted_style()))).block(block),
            area,
        );
        return;
    }

    let header = Row::new([
        Cell::from("Team"),
        Cell::from("Captain"),
        Cell::from("Size"),
        Cell::from("Members"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let style = if i == selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            Row::new(vec![
                Cell::from(team.name.as_str()),
                Cell::from(team.captain_username.as_str()),
                Cell::from(team.occupancy()),
                Cell::from(team.member_names()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Percentage(30),
        Constraint::Length(14),
        Constraint::Length(6),
        Constraint::Fill(1),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_menu(frame: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  [c]", styles::help_key_style()),
            Span::styled(" Create a team", styles::help_desc_style()),
        ]),
        Line::from(vec![
            Span::styled("  [j]", styles::help_key_style()),
            Span::styled(" Join a team", styles::help_desc_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [a]", styles::help_key_style()),
            Span::styled(" close menu", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .title(" Team menu ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_create_team(frame: &mut Frame, screen: &HackathonScreen, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(3)])
        .split(area);

    let name = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" Team name: [", styles::muted_style()),
            Span::styled(format!("{}▌", screen.team_name), styles::input_style(true)),
            Span::styled("]", styles::muted_style()),
        ]),
        Line::from(Span::styled(" [Enter] create | [Esc] cancel", styles::muted_style())),
    ])
    .block(
        Block::default()
            .title(" Create team ")
            .title_style(styles::muted_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(true)),
    );
    frame.render_widget(name, chunks[0]);

    let lines: Vec<Line> = if screen.potential_members.is_empty() {
        vec![Line::from(Span::styled(" Nobody is looking for a team yet", styles::muted_style()))]
    } else {
        screen
            .potential_members
            .iter()
            .map(|m| {
                Line::from(vec![
                    Span::styled(format!(" {:<20}", m.name()), styles::list_item_style()),
                    Span::styled(m.level.clone().unwrap_or_default(), styles::highlight_style()),
                    Span::styled(format!("  {}", m.skills.as_deref().unwrap_or("")), styles::muted_style()),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .title(format!(" Looking for a team ({}) ", screen.potential_members.len()))
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), chunks[1]);
}
