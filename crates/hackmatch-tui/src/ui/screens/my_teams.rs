use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_team_list(frame, app, chunks[0]);
    render_team_detail(frame, app, chunks[1]);
}

fn render_team_list(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.my_teams;
    let username = app.current_username().unwrap_or("");

    let title = if screen.loading {
        " My teams (loading...) ".to_string()
    } else {
        format!(" My teams ({}) ", screen.teams.len())
    };
    let block = Block::default()
        .title(title)
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(screen.expanded.is_none()));

    if !screen.loading && screen.teams.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                " You are not in a team yet. Join one from a hackathon page.",
                styles::muted_style(),
            )))
            .block(block),
            area,
        );
        return;
    }

    let header = Row::new([Cell::from("Team"), Cell::from("Captain"), Cell::from("Size")])
        .style(styles::title_style())
        .height(1);

    let rows: Vec<Row> = screen
        .teams
        .iter()
        .enumerate()
        .map(|(i, team)| {
            let style = if i == screen.selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            let captain = if team.is_captained_by(username) {
                Span::styled("you", styles::success_style())
            } else {
                Span::raw(team.captain_username.clone())
            };
            Row::new(vec![
                Cell::from(team.name.as_str()),
                Cell::from(captain),
                Cell::from(team.occupancy()),
            ])
            .style(style)
        })
        .collect();

    let widths = [Constraint::Fill(1), Constraint::Length(16), Constraint::Length(6)];

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(screen.selection));
    frame.render_stateful_widget(table, area, &mut state);
}

fn render_team_detail(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.my_teams;
    let Some(team) = screen.selected() else {
        frame.render_widget(
            Block::default()
                .borders(Borders::ALL)
                .border_style(styles::border_style(false)),
            area,
        );
        return;
    };
    let mine = app.selected_team_is_mine();
    let expanded = screen.expanded == Some(team.id);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(if expanded {
            [Constraint::Percentage(45), Constraint::Percentage(55)]
        } else {
            [Constraint::Percentage(100), Constraint::Length(0)]
        })
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(team.name.clone(), styles::title_style())),
        Line::from(""),
        Line::from(Span::styled("Members", styles::highlight_style())),
    ];
    if team.members_list.is_empty() {
        lines.push(Line::from(Span::styled("  none listed", styles::muted_style())));
    }
    for member in &team.members_list {
        lines.push(Line::from(format!("  {}", member.name())));
    }
    lines.push(Line::from(""));
    if mine {
        lines.push(Line::from(vec![
            Span::styled("[Enter]", styles::help_key_style()),
            Span::styled(if expanded { " hide candidates  " } else { " find members  " }, styles::help_desc_style()),
            Span::styled("[x]", styles::help_key_style()),
            Span::styled(" delete team", styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .title(" Team ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), chunks[0]);

    if expanded {
        render_candidates(frame, app, chunks[1]);
    }
}

fn render_candidates(frame: &mut Frame, app: &App, area: Rect) {
    let screen = &app.my_teams;
    let candidates = screen.expanded_candidates();

    let lines: Vec<Line> = if candidates.is_empty() {
        vec![Line::from(Span::styled(" No one is looking for a team", styles::muted_style()))]
    } else {
        candidates
            .iter()
            .enumerate()
            .map(|(i, member)| {
                let style = if i == screen.candidate_selection {
                    styles::selected_style()
                } else {
                    styles::list_item_style()
                };
                Line::from(vec![
                    Span::styled(format!(" {:<20}", member.name()), style),
                    Span::styled(member.level.clone().unwrap_or_default(), styles::highlight_style()),
                    Span::styled(format!("  {}", member.skills.as_deref().unwrap_or("")), styles::muted_style()),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .title(" Candidates - [i] invite ")
        .title_style(styles::muted_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
