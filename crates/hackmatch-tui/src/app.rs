//! Application state management for hackmatch.
//!
//! `App` owns the current route, the session guard gate and every screen's
//! state. Network calls run in spawned tasks and report back through an
//! mpsc channel; each result is tagged with the mount generation it was
//! started under so late answers for a screen that is gone are dropped.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{Local, Utc};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use hackmatch_core::api::{ApiClient, ApiError};
use hackmatch_core::auth::{
    AuthDecision, DenyReason, Landing, LandingRouter, ProfileSource, RevalidationHandle,
    SessionGuard, SyncOutcome, TokenStore,
};
use hackmatch_core::config::Config;
use hackmatch_core::models::{
    CreateTeamRequest, Hackathon, HackathonDates, HackathonDetail, Message, PotentialMember,
    Profile, ProfileKind, RespondAction, Team,
};
use hackmatch_core::route::Route;

use crate::state::{
    clamp_selection, CodeLoginForm, HackathonPanel, HackathonScreen, HomeScreen, LoginForm,
    MessagesScreen, MyTeamsScreen, ProfileMode, ProfileScreen,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel
const CHANNEL_BUFFER_SIZE: usize = 64;

/// Shown when a login code is rejected, whatever the backend said
const INVALID_CODE_MESSAGE: &str = "Invalid or expired code";

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    /// Blocking notification; any key dismisses it
    Notifying(String),
    ConfirmingDelete { team_id: i64, name: String },
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent from spawned tasks back to the main loop.
#[derive(Debug)]
pub enum BackgroundResult {
    /// Outcome of refreshing an expired access token before first render
    SessionRefreshed(Result<(), DenyReason>),
    /// Decision change reported by the delayed revalidation pass
    Revalidated(AuthDecision),
    Landed(Landing),
    SignedIn,
    SignInFailed(String),
    CodeSignInFailed(String),
    Profile(Profile),
    ProfileMissing,
    ProfileSaved(Profile),
    AvatarUploaded(Profile),
    Hackathons(Vec<Hackathon>),
    HackathonDates(HackathonDates),
    HackathonDetail(HackathonDetail),
    HackathonMissing,
    Participated,
    PotentialMembers(Vec<PotentialMember>),
    AvailableTeams(Vec<Team>),
    TeamCreated,
    JoinRequested,
    Messages(Vec<Message>),
    Responded(RespondAction),
    MyTeams(Vec<Team>),
    TeamCandidates { team_id: i64, members: Vec<PotentialMember> },
    Invited { team_id: i64, user_id: i64 },
    TeamDeleted,
    /// A fetch failed; logged, the screen keeps what it had
    LoadFailed { what: &'static str, error: String },
    /// A mutation failed; shown as a blocking notification
    ActionFailed(String),
}

/// A result plus the mount generation that requested it
#[derive(Debug)]
pub struct Envelope {
    pub generation: u64,
    pub result: BackgroundResult,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    store: Arc<dyn TokenStore>,
    guard: SessionGuard<ApiClient>,
    landing: LandingRouter<ApiClient>,

    // Navigation and gate
    pub state: AppState,
    pub route: Route,
    /// Render gate for protected routes
    pub gate: AuthDecision,
    /// An expired token is being refreshed before first render
    pub refreshing: bool,
    generation: u64,
    revalidation: Option<RevalidationHandle>,

    // Session details learned along the way
    pub profile: Option<Profile>,
    token_username: Option<String>,
    /// Result of the last landing, consumed by the profile screen
    landed: Option<Landing>,

    // Screens
    pub login: LoginForm,
    pub code_login: CodeLoginForm,
    pub home: HomeScreen,
    pub hackathon: HackathonScreen,
    pub profile_screen: ProfileScreen,
    pub messages: MessagesScreen,
    pub my_teams: MyTeamsScreen,

    pub status_message: Option<String>,

    tx: mpsc::Sender<Envelope>,
    rx: mpsc::Receiver<Envelope>,
}

impl App {
    pub fn new(config: Config, store: Arc<dyn TokenStore>) -> Result<Self> {
        let api = ApiClient::new(&config.api_url, config.request_timeout(), Arc::clone(&store))?;
        let shared = Arc::new(api.clone());
        let guard = SessionGuard::new(Arc::clone(&store), Arc::clone(&shared), config.guard_config());
        let landing = LandingRouter::new(Arc::clone(&store), shared);

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let login = LoginForm::new(config.last_username.clone());
        let today = Local::now().date_naive();

        debug!(api_url = %config.api_url, storage = ?config.token_storage, "App created");

        Ok(Self {
            config,
            api,
            store,
            guard,
            landing,

            state: AppState::Normal,
            route: Route::Root,
            gate: AuthDecision::Unauthenticated,
            refreshing: false,
            generation: 0,
            revalidation: None,

            profile: None,
            token_username: None,
            landed: None,

            login,
            code_login: CodeLoginForm::default(),
            home: HomeScreen::new(today),
            hackathon: HackathonScreen::new(0),
            profile_screen: ProfileScreen::default(),
            messages: MessagesScreen::default(),
            my_teams: MyTeamsScreen::default(),

            status_message: None,

            tx,
            rx,
        })
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Whether the current route's content may be drawn
    pub fn can_render(&self) -> bool {
        !self.route.is_protected() || self.gate.allows_render()
    }

    /// Name to greet the user with
    pub fn display_name(&self) -> String {
        self.profile
            .as_ref()
            .map(|p| p.name().to_string())
            .or_else(|| self.token_username.clone())
            .unwrap_or_else(|| "User".to_string())
    }

    /// Username used to recognise teams the user captains
    pub fn current_username(&self) -> Option<&str> {
        self.profile
            .as_ref()
            .map(|p| p.username.as_str())
            .filter(|u| !u.is_empty())
            .or(self.token_username.as_deref())
    }

    /// Leave the current screen and mount `route`.
    ///
    /// Protected routes pass through the session guard first: nothing of the
    /// screen is mounted until the synchronous decision allows it.
    pub fn navigate(&mut self, route: Route) {
        // Unmount: pending results become stale, the revalidation timer stops
        self.generation += 1;
        self.revalidation = None;
        self.refreshing = false;
        if matches!(self.state, AppState::ConfirmingDelete { .. }) {
            self.state = AppState::Normal;
        }
        info!(%route, generation = self.generation, "Navigating");

        if route == Route::Logout {
            self.logout();
            return;
        }

        self.route = route.clone();

        if !route.is_protected() {
            self.gate = AuthDecision::Unauthenticated;
            self.mount();
            return;
        }

        match self.guard.check_sync(Utc::now()) {
            SyncOutcome::Authenticated(claims) => {
                self.token_username = claims.username.or(self.token_username.take());
                self.gate = AuthDecision::Authenticated;
                self.mount();
                self.start_revalidation();
            }
            SyncOutcome::Expired { refresh_token } => {
                debug!("Access token expired, refreshing before render");
                self.gate = AuthDecision::Unauthenticated;
                self.refreshing = true;
                let mut guard = self.guard.clone();
                self.spawn(async move {
                    BackgroundResult::SessionRefreshed(guard.refresh_expired(&refresh_token).await)
                });
            }
            SyncOutcome::Unauthenticated(reason) => {
                info!(%reason, "Protected route denied, redirecting to login");
                self.gate = AuthDecision::Unauthenticated;
                self.navigate(Route::Login);
            }
        }
    }

    /// Clear the stored session and return to the login screen.
    pub fn logout(&mut self) {
        self.store.clear();
        self.profile = None;
        self.token_username = None;
        self.landed = None;
        self.login = LoginForm::new(self.config.last_username.clone());
        info!("Logged out");
        self.navigate(Route::Login);
    }

    fn start_revalidation(&mut self) {
        let tx = self.tx.clone();
        let generation = self.generation;
        let handle = self.guard.spawn_revalidation(move |decision| {
            let envelope = Envelope {
                generation,
                result: BackgroundResult::Revalidated(decision),
            };
            if let Err(e) = tx.try_send(envelope) {
                warn!(error = %e, "Dropped revalidation result");
            }
        });
        self.revalidation = Some(handle);
    }

    /// Reset the current screen and start its initial fetches.
    fn mount(&mut self) {
        match self.route.clone() {
            Route::Root => self.spawn_landing(),
            Route::Home => {
                let month = self.home.month;
                self.home = HomeScreen::new(Local::now().date_naive());
                self.home.month = month;
                self.fetch_home();
            }
            Route::Hackathon(id) => {
                self.hackathon = HackathonScreen::new(id);
                self.fetch_hackathon(id);
            }
            Route::Profile => {
                self.profile_screen = ProfileScreen::default();
                match self.landed.take() {
                    Some(Landing {
                        profile: Some(profile),
                        ..
                    }) => self.profile_screen.show(profile),
                    Some(Landing {
                        kind: Some(ProfileKind::ProfileMissing),
                        ..
                    }) => {
                        self.profile_screen.loading = false;
                        self.profile_screen.missing = true;
                    }
                    _ => self.fetch_profile(),
                }
            }
            Route::Messages => {
                self.messages = MessagesScreen::default();
                self.fetch_messages();
            }
            Route::MyTeams => {
                self.my_teams = MyTeamsScreen::default();
                self.fetch_my_teams();
                if self.profile.is_none() {
                    self.fetch_profile();
                }
            }
            Route::Login => {
                self.login.password.clear();
                self.login.submitting = false;
            }
            Route::TelegramLogin { code } => {
                self.code_login = CodeLoginForm::with_code(code.as_deref());
            }
            Route::Logout | Route::NotFound(_) => {}
        }
    }

    // =========================================================================
    // Background tasks
    // =========================================================================

    /// Run `task` on the runtime and deliver its result tagged with the
    /// current generation.
    fn spawn<F>(&self, task: F)
    where
        F: Future<Output = BackgroundResult> + Send + 'static,
    {
        let tx = self.tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            let result = task.await;
            if tx.send(Envelope { generation, result }).await.is_err() {
                debug!("Main loop gone, dropping background result");
            }
        });
    }

    /// Spawn a fetch whose failure is only logged.
    fn spawn_fetch<T, Fut, F>(&self, what: &'static str, fut: Fut, wrap: F)
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        F: FnOnce(T) -> BackgroundResult + Send + 'static,
    {
        self.spawn(async move {
            match fut.await {
                Ok(value) => wrap(value),
                Err(e) => BackgroundResult::LoadFailed {
                    what,
                    error: e.to_string(),
                },
            }
        });
    }

    /// Spawn a mutation whose failure becomes a blocking notification.
    fn spawn_action<T, Fut, F>(&self, fut: Fut, wrap: F)
    where
        T: Send + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
        F: FnOnce(T) -> BackgroundResult + Send + 'static,
    {
        self.spawn(async move {
            match fut.await {
                Ok(value) => wrap(value),
                Err(e) => {
                    warn!(error = %e, "Action failed");
                    BackgroundResult::ActionFailed(e.user_message())
                }
            }
        });
    }

    fn spawn_landing(&self) {
        let landing = self.landing.clone();
        self.spawn(async move { BackgroundResult::Landed(landing.resolve().await) });
    }

    /// Drain finished background tasks
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(envelope) = self.rx.try_recv() {
            results.push(envelope);
        }
        for envelope in results {
            self.process_envelope(envelope);
        }
    }

    pub fn process_envelope(&mut self, envelope: Envelope) {
        if envelope.generation != self.generation {
            debug!(
                stale = envelope.generation,
                current = self.generation,
                result = ?envelope.result,
                "Discarding result for unmounted screen"
            );
            return;
        }
        self.process_result(envelope.result);
    }

    fn process_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::SessionRefreshed(Ok(())) => {
                self.refreshing = false;
                self.gate = AuthDecision::Authenticated;
                self.mount();
                self.start_revalidation();
            }
            BackgroundResult::SessionRefreshed(Err(reason)) => {
                info!(%reason, "Session refresh failed, redirecting to login");
                self.navigate(Route::Login);
            }
            BackgroundResult::Revalidated(decision) => {
                debug!(?decision, "Revalidation decision");
                match decision {
                    AuthDecision::Unauthenticated => {
                        info!("Session no longer valid, redirecting to login");
                        self.navigate(Route::Login);
                    }
                    other => self.gate = other,
                }
            }
            BackgroundResult::Landed(landing) => {
                if let Some(profile) = &landing.profile {
                    self.profile = Some(profile.clone());
                }
                let route = landing.route.clone();
                self.landed = Some(landing);
                self.navigate(route);
            }
            BackgroundResult::SignedIn => {
                self.login.password.clear();
                self.login.submitting = false;
                self.code_login.submitting = false;
                let username = self.login.username.trim().to_string();
                if !username.is_empty() && self.config.last_username.as_deref() != Some(&username) {
                    if let Err(e) = self.config.remember_username(&username) {
                        warn!(error = %e, "Failed to save config");
                    }
                }
                self.profile = None;
                self.spawn_landing();
            }
            BackgroundResult::SignInFailed(message) => {
                self.login.submitting = false;
                self.login.error = Some(message);
            }
            BackgroundResult::CodeSignInFailed(message) => {
                self.code_login.submitting = false;
                self.code_login.error = Some(message.clone());
                self.state = AppState::Notifying(message);
            }
            BackgroundResult::Profile(profile) => {
                if self.route == Route::Profile {
                    self.profile_screen.show(profile.clone());
                }
                self.profile = Some(profile);
            }
            BackgroundResult::ProfileMissing => {
                self.profile_screen.loading = false;
                self.profile_screen.missing = true;
            }
            BackgroundResult::ProfileSaved(profile) => {
                self.profile_screen.saving = false;
                self.profile_screen.mode = ProfileMode::View;
                self.profile_screen.show(profile.clone());
                self.profile = Some(profile);
                self.notify("Profile updated");
            }
            BackgroundResult::AvatarUploaded(profile) => {
                self.profile_screen.saving = false;
                self.profile_screen.mode = ProfileMode::View;
                self.profile_screen.avatar_path.clear();
                self.profile_screen.show(profile.clone());
                self.profile = Some(profile);
                self.notify("Avatar updated");
            }
            BackgroundResult::Hackathons(hackathons) => {
                self.home.hackathons = hackathons;
                self.home.selection = clamp_selection(self.home.selection, self.home.hackathons.len());
                self.home.loading = false;
            }
            BackgroundResult::HackathonDates(dates) => {
                self.home.hackathon_days = dates.days();
            }
            BackgroundResult::HackathonDetail(detail) => {
                self.hackathon.detail = Some(detail);
                self.hackathon.loading = false;
                self.hackathon.selection = clamp_selection(self.hackathon.selection, self.hackathon.list_len());
            }
            BackgroundResult::HackathonMissing => {
                self.hackathon.loading = false;
                self.hackathon.detail = None;
            }
            BackgroundResult::Participated => {
                self.hackathon.participated = true;
                self.hackathon.panel = HackathonPanel::Menu;
                self.status_message = Some("Registered for the hackathon".to_string());
            }
            BackgroundResult::PotentialMembers(members) => {
                self.hackathon.potential_members = members;
            }
            BackgroundResult::AvailableTeams(teams) => {
                self.hackathon.available_teams = teams;
                self.hackathon.selection = 0;
            }
            BackgroundResult::TeamCreated => {
                self.hackathon.panel = HackathonPanel::Teams;
                self.hackathon.team_name.clear();
                self.notify("Team created!");
                self.fetch_hackathon(self.hackathon.id);
            }
            BackgroundResult::JoinRequested => {
                self.hackathon.panel = HackathonPanel::Teams;
                self.notify("Join request sent!");
            }
            BackgroundResult::Messages(messages) => {
                self.messages.messages = messages;
                self.messages.selection = clamp_selection(self.messages.selection, self.messages.messages.len());
                self.messages.loading = false;
            }
            BackgroundResult::Responded(action) => {
                self.status_message = Some(format!("Request {}", action.past_tense()));
                self.fetch_messages();
            }
            BackgroundResult::MyTeams(teams) => {
                self.my_teams.teams = teams;
                self.my_teams.selection = clamp_selection(self.my_teams.selection, self.my_teams.teams.len());
                self.my_teams.loading = false;
            }
            BackgroundResult::TeamCandidates { team_id, members } => {
                self.my_teams.candidates.insert(team_id, members);
            }
            BackgroundResult::Invited { team_id, user_id } => {
                self.my_teams.remove_candidate(team_id, user_id);
                self.notify("Invitation sent!");
            }
            BackgroundResult::TeamDeleted => {
                self.my_teams.expanded = None;
                self.notify("Team deleted");
                self.fetch_my_teams();
            }
            BackgroundResult::LoadFailed { what, error } => {
                error!(what, error = %error, "Failed to load");
                self.finish_loading();
                self.status_message = Some(format!("Could not load {}", what));
            }
            BackgroundResult::ActionFailed(message) => {
                self.profile_screen.saving = false;
                self.notify(message);
            }
        }
    }

    /// Clear the current screen's loading flag after a failed fetch
    fn finish_loading(&mut self) {
        match self.route {
            Route::Home => self.home.loading = false,
            Route::Hackathon(_) => self.hackathon.loading = false,
            Route::Profile => self.profile_screen.loading = false,
            Route::Messages => self.messages.loading = false,
            Route::MyTeams => self.my_teams.loading = false,
            _ => {}
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.state = AppState::Notifying(message.into());
    }

    // =========================================================================
    // Fetches
    // =========================================================================

    pub fn fetch_home(&self) {
        let api = self.api.clone();
        self.spawn_fetch("hackathons", async move { api.fetch_hackathons().await }, BackgroundResult::Hackathons);
        let api = self.api.clone();
        self.spawn_fetch(
            "hackathon dates",
            async move { api.fetch_hackathon_dates().await },
            BackgroundResult::HackathonDates,
        );
        if self.profile.is_none() {
            self.fetch_profile();
        }
    }

    pub fn fetch_hackathon(&self, id: i64) {
        let api = self.api.clone();
        self.spawn(async move {
            match api.fetch_hackathon(id).await {
                Ok(detail) => BackgroundResult::HackathonDetail(detail),
                Err(e) if e.is_not_found() => BackgroundResult::HackathonMissing,
                Err(e) => BackgroundResult::LoadFailed {
                    what: "hackathon",
                    error: e.to_string(),
                },
            }
        });
    }

    pub fn fetch_profile(&self) {
        let api = self.api.clone();
        self.spawn(async move {
            match ProfileSource::fetch_profile(&api).await {
                Ok(profile) => BackgroundResult::Profile(profile),
                Err(e) if e.is_not_found() => {
                    info!("Profile not found");
                    BackgroundResult::ProfileMissing
                }
                Err(e) => BackgroundResult::LoadFailed {
                    what: "profile",
                    error: e.to_string(),
                },
            }
        });
    }

    pub fn fetch_messages(&self) {
        let api = self.api.clone();
        self.spawn_fetch("messages", async move { api.fetch_messages().await }, BackgroundResult::Messages);
    }

    pub fn fetch_my_teams(&self) {
        let api = self.api.clone();
        self.spawn_fetch("teams", async move { api.fetch_my_teams().await }, BackgroundResult::MyTeams);
    }

    /// Re-run the current screen's fetches
    pub fn refresh_current(&mut self) {
        if !self.can_render() {
            return;
        }
        match self.route {
            Route::Home => self.fetch_home(),
            Route::Hackathon(id) => self.fetch_hackathon(id),
            Route::Profile => self.fetch_profile(),
            Route::Messages => self.fetch_messages(),
            Route::MyTeams => self.fetch_my_teams(),
            _ => {}
        }
    }

    // =========================================================================
    // Authentication actions
    // =========================================================================

    /// Submit the username/password form
    pub fn submit_login(&mut self) {
        if !self.login.can_submit() {
            self.login.error = Some("Username and password required".to_string());
            return;
        }
        self.login.error = None;
        self.login.submitting = true;

        let api = self.api.clone();
        let username = self.login.username.trim().to_string();
        let password = self.login.password.clone();
        self.spawn(async move {
            match api.sign_in(&username, &password).await {
                Ok(_) => BackgroundResult::SignedIn,
                Err(e) => {
                    warn!(error = %e, "Login failed");
                    let message = if e.is_auth_error() {
                        "Invalid username or password".to_string()
                    } else {
                        e.user_message()
                    };
                    BackgroundResult::SignInFailed(message)
                }
            }
        });
    }

    /// Submit the one-time code form. Both tokens are stored before the
    /// landing router runs.
    pub fn submit_code(&mut self) {
        if !self.code_login.can_submit() {
            return;
        }
        self.code_login.error = None;
        self.code_login.submitting = true;

        let api = self.api.clone();
        let code = self.code_login.code.trim().to_string();
        self.spawn(async move {
            match api.sign_in_with_code(&code).await {
                Ok(_) => BackgroundResult::SignedIn,
                Err(e) => {
                    warn!(error = %e, "Code login failed");
                    BackgroundResult::CodeSignInFailed(INVALID_CODE_MESSAGE.to_string())
                }
            }
        });
    }

    // =========================================================================
    // Hackathon actions
    // =========================================================================

    /// Participate, or close the menu when already open
    pub fn participate(&mut self) {
        if self.hackathon.panel == HackathonPanel::Menu {
            self.hackathon.panel = HackathonPanel::Teams;
            return;
        }
        if self.hackathon.participated {
            self.hackathon.panel = HackathonPanel::Menu;
            return;
        }
        let api = self.api.clone();
        let id = self.hackathon.id;
        self.spawn_action(async move { api.participate(id).await }, |_| BackgroundResult::Participated);
    }

    pub fn open_create_team(&mut self) {
        if !self.hackathon.participated {
            return;
        }
        self.hackathon.panel = HackathonPanel::CreateTeam;
        self.hackathon.team_name.clear();
        self.hackathon.selection = 0;
        let api = self.api.clone();
        let id = self.hackathon.id;
        self.spawn_action(
            async move { api.fetch_potential_members(id).await },
            BackgroundResult::PotentialMembers,
        );
    }

    pub fn submit_create_team(&mut self) {
        let name = self.hackathon.team_name.trim().to_string();
        if name.is_empty() {
            self.notify("Team name is required");
            return;
        }
        let (size_min, size_max) = self
            .hackathon
            .detail
            .as_ref()
            .map(|d| (d.hackathon.team_size_min, d.hackathon.team_size_max))
            .unwrap_or((None, None));
        let request = CreateTeamRequest {
            name,
            size_min,
            size_max,
        };
        let api = self.api.clone();
        let id = self.hackathon.id;
        self.spawn_action(async move { api.create_team(id, &request).await }, |_| BackgroundResult::TeamCreated);
    }

    pub fn open_join_team(&mut self) {
        if !self.hackathon.participated {
            return;
        }
        self.hackathon.panel = HackathonPanel::JoinTeam;
        self.hackathon.available_teams.clear();
        self.hackathon.selection = 0;
        let api = self.api.clone();
        let id = self.hackathon.id;
        self.spawn_action(
            async move { api.fetch_available_teams(id).await },
            BackgroundResult::AvailableTeams,
        );
    }

    pub fn request_join_selected(&mut self) {
        let Some(team_id) = self
            .hackathon
            .available_teams
            .get(self.hackathon.selection)
            .map(|t| t.id)
        else {
            return;
        };
        let api = self.api.clone();
        self.spawn_action(async move { api.join_team(team_id).await }, |_| BackgroundResult::JoinRequested);
    }

    // =========================================================================
    // Profile actions
    // =========================================================================

    pub fn submit_profile(&mut self) {
        let update = match self.profile_screen.draft.to_update() {
            Ok(update) => update,
            Err(message) => {
                self.notify(message);
                return;
            }
        };
        self.profile_screen.saving = true;
        let api = self.api.clone();
        self.spawn_action(async move { api.update_profile(&update).await }, BackgroundResult::ProfileSaved);
    }

    pub fn submit_avatar(&mut self) {
        let raw = self.profile_screen.avatar_path.trim();
        if raw.is_empty() {
            self.notify("Enter the path of an image file");
            return;
        }
        let path = expand_home(raw);
        if !path.is_file() {
            self.notify(format!("File not found: {}", path.display()));
            return;
        }
        self.profile_screen.saving = true;
        let api = self.api.clone();
        self.spawn_action(async move { api.upload_avatar(&path).await }, BackgroundResult::AvatarUploaded);
    }

    // =========================================================================
    // Message actions
    // =========================================================================

    pub fn respond_selected(&mut self, action: RespondAction) {
        let Some(message) = self.messages.selected() else {
            return;
        };
        if !message.is_pending() {
            self.status_message = Some("Only pending requests can be answered".to_string());
            return;
        }
        let id = message.id;
        let api = self.api.clone();
        self.spawn_action(async move { api.respond(id, action).await }, move |_| {
            BackgroundResult::Responded(action)
        });
    }

    // =========================================================================
    // Team actions
    // =========================================================================

    /// Whether the selected team is captained by the current user
    pub fn selected_team_is_mine(&self) -> bool {
        match (self.my_teams.selected(), self.current_username()) {
            (Some(team), Some(username)) => team.is_captained_by(username),
            _ => false,
        }
    }

    /// Show or hide potential members for the selected team
    pub fn toggle_candidates(&mut self) {
        if !self.selected_team_is_mine() {
            return;
        }
        let Some(team) = self.my_teams.selected() else {
            return;
        };
        let team_id = team.id;
        let hackathon_id = team.hackathon;

        if self.my_teams.expanded == Some(team_id) {
            self.my_teams.expanded = None;
            return;
        }
        self.my_teams.expanded = Some(team_id);
        self.my_teams.candidate_selection = 0;

        let Some(hackathon_id) = hackathon_id else {
            warn!(team_id, "Team has no hackathon id, cannot list candidates");
            return;
        };
        let api = self.api.clone();
        self.spawn_action(async move { api.fetch_potential_members(hackathon_id).await }, move |members| {
            BackgroundResult::TeamCandidates { team_id, members }
        });
    }

    pub fn invite_selected(&mut self) {
        let Some(team_id) = self.my_teams.expanded else {
            return;
        };
        let Some(user_id) = self
            .my_teams
            .expanded_candidates()
            .get(self.my_teams.candidate_selection)
            .map(|m| m.id)
        else {
            return;
        };
        let api = self.api.clone();
        self.spawn_action(async move { api.invite(team_id, user_id).await }, move |_| {
            BackgroundResult::Invited { team_id, user_id }
        });
    }

    pub fn confirm_delete_selected(&mut self) {
        if !self.selected_team_is_mine() {
            return;
        }
        if let Some(team) = self.my_teams.selected() {
            self.state = AppState::ConfirmingDelete {
                team_id: team.id,
                name: team.name.clone(),
            };
        }
    }

    pub fn delete_team(&mut self, team_id: i64) {
        self.state = AppState::Normal;
        let api = self.api.clone();
        self.spawn_action(async move { api.delete_team(team_id).await }, |_| BackgroundResult::TeamDeleted);
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

// ============================================================================
// Tests
// ============================================================================
