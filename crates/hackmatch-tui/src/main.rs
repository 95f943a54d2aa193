//! hackmatch - a terminal client for the hackathon team-formation platform.
//!
//! Browse hackathons, manage your profile, form teams and answer
//! invitations from the keyboard. A few headless commands cover session
//! management for scripting.

mod app;
mod state;
mod ui;

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use hackmatch_core::api::ApiClient;
use hackmatch_core::auth::{evaluate, AccessClaims, LandingRouter, SyncOutcome, TokenStore};
use hackmatch_core::config::Config;
use hackmatch_core::route::Route;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the cache directory; rotated daily
const LOG_FILE_NAME: &str = "hackmatch.log";

const USAGE: &str = "\
Usage: hackmatch [COMMAND] [OPTIONS]

Commands:
  (none)              Start the terminal UI
  login [USERNAME]    Sign in with username and password
  login-code <CODE>   Sign in with a one-time code from the Telegram bot
  logout              Forget the stored session
  status              Show whether the stored session is usable

Options:
  --route <PATH>      Open the UI at a route, e.g. /hackathon/3
  --code <CODE>       Open the UI on the code login screen with CODE filled in
  -h, --help          Show this help";

// ============================================================================
// Command line
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Tui { route: Route },
    Login { username: Option<String> },
    LoginCode { code: String },
    Logout,
    Status,
    Help,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut iter = args.iter();
    let Some(first) = iter.next() else {
        return Ok(Command::Tui { route: Route::Root });
    };

    let command = match first.as_str() {
        "-h" | "--help" | "help" => Command::Help,
        "login" => Command::Login {
            username: iter.next().cloned(),
        },
        "login-code" => {
            let code = iter.next().ok_or("login-code needs a code")?;
            Command::LoginCode { code: code.clone() }
        }
        "logout" => Command::Logout,
        "status" => Command::Status,
        "--route" => {
            let path = iter.next().ok_or("--route needs a path")?;
            Command::Tui {
                route: Route::parse(path),
            }
        }
        "--code" => {
            let code = iter.next().ok_or("--code needs a code")?;
            Command::Tui {
                route: Route::TelegramLogin {
                    code: Some(code.clone()),
                },
            }
        }
        other => return Err(format!("unknown argument: {}", other)),
    };

    match iter.next() {
        Some(extra) => Err(format!("unexpected argument: {}", extra)),
        None => Ok(command),
    }
}

// ============================================================================
// Logging
// ============================================================================

/// Log to a daily rolling file so output never lands on the UI.
/// The returned guard flushes on drop and must outlive the UI.
fn init_file_tracing(config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.cache_dir()?;
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(&log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(filter)
        .init();

    Ok(guard)
}

/// Headless commands log straight to stderr
fn init_stderr_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// Entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("Error: {}\n\n{}", message, USAGE);
            std::process::exit(2);
        }
    };

    if command == Command::Help {
        println!("{}", USAGE);
        return Ok(());
    }

    let config = Config::load()?;

    match command {
        Command::Tui { route } => run_tui(config, route).await,
        Command::Login { username } => {
            init_stderr_tracing();
            login(config, username).await
        }
        Command::LoginCode { code } => {
            init_stderr_tracing();
            login_code(config, &code).await
        }
        Command::Logout => {
            init_stderr_tracing();
            config.token_store()?.clear();
            println!("Signed out.");
            Ok(())
        }
        Command::Status => {
            init_stderr_tracing();
            status(&config)
        }
        Command::Help => Ok(()),
    }
}

async fn run_tui(config: Config, route: Route) -> Result<()> {
    let _log_guard = init_file_tracing(&config)?;
    info!(%route, "hackmatch starting");

    let store = config.token_store()?;
    let mut app = App::new(config, store)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    app.navigate(route);

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("hackmatch shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

// ============================================================================
// Headless commands
// ============================================================================

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn client_for(config: &Config) -> Result<(ApiClient, Arc<dyn TokenStore>)> {
    let store = config.token_store()?;
    let api = ApiClient::new(&config.api_url, config.request_timeout(), Arc::clone(&store))?;
    Ok((api, store))
}

/// Report where the UI would land after signing in
async fn print_landing(api: ApiClient, store: Arc<dyn TokenStore>) {
    let landing = LandingRouter::new(store, Arc::new(api)).resolve().await;
    println!("Signed in. The app will open at {}.", landing.route);
}

async fn login(mut config: Config, username: Option<String>) -> Result<()> {
    let username = match username.or_else(|| config.last_username.clone()) {
        Some(u) => {
            println!("Username: {}", u);
            u
        }
        None => prompt("Username: ")?,
    };
    if username.is_empty() {
        anyhow::bail!("Username is required");
    }
    let password = rpassword::prompt_password("Password: ").context("Failed to read password")?;

    let (api, store) = client_for(&config)?;
    api.sign_in(&username, &password)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    if let Err(e) = config.remember_username(&username) {
        tracing::warn!(error = %e, "Failed to save config");
    }

    print_landing(api, store).await;
    Ok(())
}

async fn login_code(config: Config, code: &str) -> Result<()> {
    let (api, store) = client_for(&config)?;
    api.sign_in_with_code(code.trim())
        .await
        .map_err(|_| anyhow::anyhow!("Invalid or expired code"))?;
    print_landing(api, store).await;
    Ok(())
}

fn status(config: &Config) -> Result<()> {
    let store = config.token_store()?;
    let tokens = store.get();
    let now = Utc::now();

    println!("Server:  {}", config.api_url);
    println!("Storage: {:?}", config.token_storage);

    match evaluate(&tokens, now) {
        SyncOutcome::Authenticated(claims) => {
            println!("Session: authenticated");
            if let Some(username) = claims.username.as_deref() {
                println!("User:    {}", username);
            }
            println!(
                "Expires: {} ({}s left)",
                claims.expires_at.format("%Y-%m-%d %H:%M:%S UTC"),
                claims.seconds_until_expiry(now)
            );
        }
        SyncOutcome::Expired { .. } => {
            println!("Session: access token expired, will refresh on next start");
            if let Some(claims) = tokens.access.as_deref().and_then(|t| AccessClaims::decode(t).ok()) {
                println!("Expired: {}", claims.expires_at.format("%Y-%m-%d %H:%M:%S UTC"));
            }
        }
        SyncOutcome::Unauthenticated(reason) => {
            println!("Session: signed out ({})", reason);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_starts_at_root() {
        assert_eq!(parse_args(&[]), Ok(Command::Tui { route: Route::Root }));
    }

    #[test]
    fn test_route_flag() {
        assert_eq!(
            parse_args(&args(&["--route", "/hackathon/7"])),
            Ok(Command::Tui {
                route: Route::Hackathon(7)
            })
        );
        assert!(parse_args(&args(&["--route"])).is_err());
    }

    #[test]
    fn test_code_flag_opens_code_login() {
        assert_eq!(
            parse_args(&args(&["--code", "AB12CD34"])),
            Ok(Command::Tui {
                route: Route::TelegramLogin {
                    code: Some("AB12CD34".into())
                }
            })
        );
    }

    #[test]
    fn test_headless_commands() {
        assert_eq!(parse_args(&args(&["login"])), Ok(Command::Login { username: None }));
        assert_eq!(
            parse_args(&args(&["login", "ann"])),
            Ok(Command::Login {
                username: Some("ann".into())
            })
        );
        assert_eq!(
            parse_args(&args(&["login-code", "XYZ"])),
            Ok(Command::LoginCode { code: "XYZ".into() })
        );
        assert_eq!(parse_args(&args(&["logout"])), Ok(Command::Logout));
        assert_eq!(parse_args(&args(&["status"])), Ok(Command::Status));
        assert_eq!(parse_args(&args(&["--help"])), Ok(Command::Help));
    }

    #[test]
    fn test_bad_args() {
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["login-code"])).is_err());
        assert!(parse_args(&args(&["logout", "now"])).is_err());
    }
}
