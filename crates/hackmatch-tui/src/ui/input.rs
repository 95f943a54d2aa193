//! Keyboard input handling for the TUI.
//!
//! Overlays get the key first, then the current route. Keys the route does
//! not use fall through to the global navigation keys.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use hackmatch_core::models::RespondAction;
use hackmatch_core::route::Route;

use crate::app::{App, AppState};
use crate::state::{clamp_selection, HackathonPanel, LoginFocus, ProfileDraft, ProfileField, ProfileMode};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state.clone() {
        AppState::Notifying(_) => {
            app.state = AppState::Normal;
            return Ok(false);
        }
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete { team_id, .. } => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.delete_team(team_id),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::Quitting => return Ok(true),
        AppState::Normal => {}
    }

    let consumed = if app.can_render() {
        match app.route.clone() {
            Route::Login => handle_login_input(app, key),
            Route::TelegramLogin { .. } => handle_code_input(app, key),
            Route::Home => handle_home_input(app, key),
            Route::Hackathon(_) => handle_hackathon_input(app, key),
            Route::Profile => handle_profile_input(app, key),
            Route::Messages => handle_messages_input(app, key),
            Route::MyTeams => handle_my_teams_input(app, key),
            Route::Root | Route::Logout | Route::NotFound(_) => false,
        }
    } else {
        false
    };

    if !consumed {
        handle_global_input(app, key);
    }

    Ok(matches!(app.state, AppState::Quitting))
}

fn handle_global_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('h') => app.navigate(Route::Home),
        KeyCode::Char('p') => app.navigate(Route::Profile),
        KeyCode::Char('m') => app.navigate(Route::Messages),
        KeyCode::Char('t') => app.navigate(Route::MyTeams),
        KeyCode::Char('l') if app.route.is_protected() => app.navigate(Route::Logout),
        KeyCode::Char('r') => {
            app.status_message = None;
            app.refresh_current();
        }
        _ => {}
    }
}

/// Move a list selection by one step
fn step(selection: usize, len: usize, down: bool) -> usize {
    if len == 0 {
        return 0;
    }
    if down {
        clamp_selection(selection + 1, len)
    } else {
        selection.saturating_sub(1)
    }
}

// ============================================================================
// Login screens
// ============================================================================

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    let form = &mut app.login;
    match key.code {
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.next(),
        KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.prev(),
        KeyCode::Enter => match form.focus {
            LoginFocus::Username => form.focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => app.submit_login(),
            LoginFocus::CodeLink => app.navigate(Route::TelegramLogin { code: None }),
        },
        KeyCode::Esc => app.state = AppState::ConfirmingQuit,
        KeyCode::Backspace => form.pop(),
        KeyCode::Char(c) => match form.focus {
            LoginFocus::Username | LoginFocus::Password => form.push(c),
            // Global keys only make sense off the text fields
            LoginFocus::Button | LoginFocus::CodeLink => return matches!(c, 'h' | 'p' | 'm' | 't' | 'r'),
        },
        _ => {}
    }
    true
}

fn handle_code_input(app: &mut App, key: KeyEvent) -> bool {
    if app.code_login.submitting {
        return true;
    }
    match key.code {
        KeyCode::Enter => app.submit_code(),
        KeyCode::Esc => app.navigate(Route::Login),
        KeyCode::Backspace => {
            app.code_login.code.pop();
        }
        KeyCode::Char(c) => {
            app.code_login.error = None;
            app.code_login.push(c);
        }
        _ => {}
    }
    true
}

// ============================================================================
// Protected screens
// ============================================================================

fn handle_home_input(app: &mut App, key: KeyEvent) -> bool {
    let home = &mut app.home;
    match key.code {
        KeyCode::Up | KeyCode::Down => {
            home.selection = step(home.selection, home.hackathons.len(), key.code == KeyCode::Down);
        }
        KeyCode::Left | KeyCode::Char('<') => home.month = home.month.prev(),
        KeyCode::Right | KeyCode::Char('>') => home.month = home.month.next(),
        KeyCode::Enter => {
            let selected = home.selected().map(|h| h.id);
            if let Some(id) = selected {
                app.navigate(Route::Hackathon(id));
            }
        }
        _ => return false,
    }
    true
}

fn handle_hackathon_input(app: &mut App, key: KeyEvent) -> bool {
    let screen = &mut app.hackathon;

    if screen.panel == HackathonPanel::CreateTeam {
        match key.code {
            KeyCode::Enter => app.submit_create_team(),
            KeyCode::Esc => screen.panel = HackathonPanel::Menu,
            KeyCode::Backspace => {
                screen.team_name.pop();
            }
            KeyCode::Char(c) => screen.push_team_name(c),
            _ => {}
        }
        return true;
    }

    match key.code {
        KeyCode::Up | KeyCode::Down => {
            screen.selection = step(screen.selection, screen.list_len(), key.code == KeyCode::Down);
        }
        KeyCode::Char('a') => app.participate(),
        KeyCode::Char('c') => app.open_create_team(),
        KeyCode::Char('j') => app.open_join_team(),
        KeyCode::Enter if screen.panel == HackathonPanel::JoinTeam => app.request_join_selected(),
        KeyCode::Esc | KeyCode::Backspace => match screen.panel {
            HackathonPanel::Teams => app.navigate(Route::Home),
            HackathonPanel::JoinTeam => {
                screen.panel = HackathonPanel::Menu;
                screen.selection = 0;
            }
            HackathonPanel::Menu | HackathonPanel::CreateTeam => {
                screen.panel = HackathonPanel::Teams;
                screen.selection = 0;
            }
        },
        _ => return false,
    }
    true
}

fn handle_profile_input(app: &mut App, key: KeyEvent) -> bool {
    let screen = &mut app.profile_screen;
    if screen.saving {
        return true;
    }

    match screen.mode {
        ProfileMode::Edit(field) => {
            match key.code {
                KeyCode::Tab | KeyCode::Down => screen.mode = ProfileMode::Edit(field.next()),
                KeyCode::BackTab | KeyCode::Up => screen.mode = ProfileMode::Edit(field.prev()),
                KeyCode::Enter => app.submit_profile(),
                KeyCode::Esc => {
                    // Discard edits
                    screen.draft = screen
                        .profile
                        .as_ref()
                        .map(ProfileDraft::from_profile)
                        .unwrap_or_default();
                    screen.mode = ProfileMode::View;
                }
                KeyCode::Backspace => screen.draft.pop(field),
                KeyCode::Char(c) => screen.draft.push(field, c),
                _ => {}
            }
            true
        }
        ProfileMode::Avatar => {
            match key.code {
                KeyCode::Enter => app.submit_avatar(),
                KeyCode::Esc => {
                    screen.avatar_path.clear();
                    screen.mode = ProfileMode::View;
                }
                KeyCode::Backspace => {
                    screen.avatar_path.pop();
                }
                KeyCode::Char(c) => screen.push_avatar_path(c),
                _ => {}
            }
            true
        }
        ProfileMode::View => match key.code {
            KeyCode::Char('e') if screen.profile.is_some() => {
                screen.mode = ProfileMode::Edit(ProfileField::DisplayName);
                true
            }
            KeyCode::Char('u') if screen.profile.is_some() => {
                screen.mode = ProfileMode::Avatar;
                true
            }
            _ => false,
        },
    }
}

fn handle_messages_input(app: &mut App, key: KeyEvent) -> bool {
    let screen = &mut app.messages;
    match key.code {
        KeyCode::Up | KeyCode::Down => {
            screen.selection = step(screen.selection, screen.messages.len(), key.code == KeyCode::Down);
        }
        KeyCode::Char('a') => app.respond_selected(RespondAction::Accept),
        KeyCode::Char('d') => app.respond_selected(RespondAction::Decline),
        _ => return false,
    }
    true
}

fn handle_my_teams_input(app: &mut App, key: KeyEvent) -> bool {
    let screen = &mut app.my_teams;
    let down = key.code == KeyCode::Down;
    match key.code {
        KeyCode::Up | KeyCode::Down if screen.expanded.is_some() => {
            let len = screen.expanded_candidates().len();
            screen.candidate_selection = step(screen.candidate_selection, len, down);
        }
        KeyCode::Up | KeyCode::Down => {
            screen.selection = step(screen.selection, screen.teams.len(), down);
        }
        KeyCode::Enter => app.toggle_candidates(),
        KeyCode::Char('i') => app.invite_selected(),
        KeyCode::Char('x') => app.confirm_delete_selected(),
        KeyCode::Esc if screen.expanded.is_some() => screen.expanded = None,
        _ => return false,
    }
    true
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use hackmatch_core::auth::MemoryTokenStore;
    use hackmatch_core::config::{Config, TokenStorage};

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn test_app() -> App {
        let config = Config {
            api_url: "http://127.0.0.1:9".to_string(),
            token_storage: TokenStorage::Memory,
            ..Default::default()
        };
        App::new(config, Arc::new(MemoryTokenStore::new())).expect("app builds")
    }

    #[tokio::test]
    async fn test_typing_q_in_username_does_not_quit() {
        let mut app = test_app();
        app.navigate(Route::Login);
        app.login.focus = LoginFocus::Username;

        for c in "quinn".chars() {
            assert!(!handle_input(&mut app, key(KeyCode::Char(c))).expect("handled"));
        }
        assert_eq!(app.login.username, "quinn");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_code_link_opens_code_login() {
        let mut app = test_app();
        app.navigate(Route::Login);
        app.login.focus = LoginFocus::CodeLink;

        handle_input(&mut app, key(KeyCode::Enter)).expect("handled");
        assert_eq!(app.route, Route::TelegramLogin { code: None });

        handle_input(&mut app, key(KeyCode::Char('x'))).expect("handled");
        assert_eq!(app.code_login.code, "x");
    }

    #[tokio::test]
    async fn test_empty_code_does_not_submit() {
        let mut app = test_app();
        app.navigate(Route::TelegramLogin { code: None });
        handle_input(&mut app, key(KeyCode::Enter)).expect("handled");
        assert!(!app.code_login.submitting);
    }

    #[tokio::test]
    async fn test_quit_confirmation() {
        let mut app = test_app();
        app.navigate(Route::Login);
        app.login.focus = LoginFocus::Button;

        assert!(!handle_input(&mut app, key(KeyCode::Esc)).expect("handled"));
        assert_eq!(app.state, AppState::ConfirmingQuit);
        assert!(!handle_input(&mut app, key(KeyCode::Char('n'))).expect("handled"));
        assert_eq!(app.state, AppState::Normal);

        handle_input(&mut app, key(KeyCode::Esc)).expect("handled");
        assert!(handle_input(&mut app, key(KeyCode::Char('y'))).expect("handled"));
    }

    #[tokio::test]
    async fn test_notification_dismissed_by_any_key() {
        let mut app = test_app();
        app.notify("Team created!");
        handle_input(&mut app, key(KeyCode::Char('z'))).expect("handled");
        assert_eq!(app.state, AppState::Normal);
    }

    #[tokio::test]
    async fn test_global_navigation_without_session_lands_on_login() {
        let mut app = test_app();
        app.navigate(Route::NotFound("/nope".into()));
        handle_input(&mut app, key(KeyCode::Char('m'))).expect("handled");
        assert_eq!(app.route, Route::Login);
    }

    #[test]
    fn test_step() {
        assert_eq!(step(0, 0, true), 0);
        assert_eq!(step(0, 3, true), 1);
        assert_eq!(step(2, 3, true), 2);
        assert_eq!(step(0, 3, false), 0);
    }
}
