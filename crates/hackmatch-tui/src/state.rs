//! Per-screen UI state.
//!
//! Each screen owns a plain struct that the renderer reads and the input
//! handler mutates. Network results are applied by `App`.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use hackmatch_core::models::{
    Hackathon, HackathonDetail, Message, PotentialMember, Profile, ProfileUpdate, Team,
    MAX_DISPLAY_NAME_LENGTH,
};
use hackmatch_core::route::MAX_LOGIN_CODE_LENGTH;

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for username input
const MAX_USERNAME_LENGTH: usize = 150;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for a team name
const MAX_TEAM_NAME_LENGTH: usize = 100;

/// Maximum length for free-text profile fields (bio, skills)
const MAX_TEXT_FIELD_LENGTH: usize = 500;

/// Maximum length for a local file path
const MAX_PATH_LENGTH: usize = 1024;

const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Weekday header, Monday first
pub const WEEKDAY_NAMES: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

pub fn can_add_username_char(current_len: usize, c: char) -> bool {
    current_len < MAX_USERNAME_LENGTH && is_valid_input_char(c) && !c.is_whitespace()
}

pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

/// Login codes are short alphanumeric strings issued by the bot
pub fn can_add_code_char(current_len: usize, c: char) -> bool {
    current_len < MAX_LOGIN_CODE_LENGTH && c.is_ascii_alphanumeric()
}

fn push_limited(field: &mut String, c: char, max: usize) {
    if field.chars().count() < max && is_valid_input_char(c) {
        field.push(c);
    }
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
    CodeLink,
}

impl LoginFocus {
    pub fn next(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::CodeLink,
            LoginFocus::CodeLink => LoginFocus::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginFocus::Username => LoginFocus::CodeLink,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
            LoginFocus::CodeLink => LoginFocus::Button,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginFocus,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    pub fn new(username: Option<String>) -> Self {
        let username = username.unwrap_or_default();
        let focus = if username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        Self {
            username,
            password: String::new(),
            focus,
            error: None,
            submitting: false,
        }
    }

    pub fn push(&mut self, c: char) {
        match self.focus {
            LoginFocus::Username => {
                if can_add_username_char(self.username.chars().count(), c) {
                    self.username.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(self.password.chars().count(), c) {
                    self.password.push(c);
                }
            }
            LoginFocus::Button | LoginFocus::CodeLink => {}
        }
    }

    pub fn pop(&mut self) {
        match self.focus {
            LoginFocus::Username => {
                self.username.pop();
            }
            LoginFocus::Password => {
                self.password.pop();
            }
            LoginFocus::Button | LoginFocus::CodeLink => {}
        }
    }

    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.username.trim().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CodeLoginForm {
    pub code: String,
    pub submitting: bool,
    pub error: Option<String>,
}

impl CodeLoginForm {
    pub fn with_code(code: Option<&str>) -> Self {
        let mut form = Self::default();
        if let Some(code) = code {
            for c in code.trim().chars() {
                form.push(c);
            }
        }
        form
    }

    pub fn push(&mut self, c: char) {
        // Codes are case-sensitive
        if can_add_code_char(self.code.chars().count(), c) {
            self.code.push(c);
        }
    }

    /// Submit stays disabled while the code is empty or a request is in flight
    pub fn can_submit(&self) -> bool {
        !self.submitting && !self.code.trim().is_empty()
    }
}

// ============================================================================
// Calendar
// ============================================================================

/// A displayed calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    /// 1-based
    pub month: u32,
}

impl MonthView {
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn prev(&self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn title(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{} {}", name, self.year)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next();
        match (self.first_day(), next.first_day()) {
            (Some(first), Some(next_first)) => (next_first - first).num_days() as u32,
            _ => 0,
        }
    }

    /// Monday-first grid of day numbers; `None` pads the first and last week.
    pub fn weeks(&self) -> Vec<[Option<u32>; 7]> {
        let Some(first) = self.first_day() else {
            return Vec::new();
        };
        let offset = first.weekday().num_days_from_monday() as usize;
        let days = self.days_in_month();

        let mut weeks = Vec::new();
        let mut week = [None; 7];
        let mut slot = offset;
        for day in 1..=days {
            week[slot] = Some(day);
            slot += 1;
            if slot == 7 {
                weeks.push(week);
                week = [None; 7];
                slot = 0;
            }
        }
        if slot > 0 {
            weeks.push(week);
        }
        weeks
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

// ============================================================================
// Screens
// ============================================================================

#[derive(Debug, Clone)]
pub struct HomeScreen {
    pub loading: bool,
    pub hackathons: Vec<Hackathon>,
    pub hackathon_days: Vec<NaiveDate>,
    pub month: MonthView,
    pub selection: usize,
}

impl HomeScreen {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            loading: true,
            hackathons: Vec::new(),
            hackathon_days: Vec::new(),
            month: MonthView::containing(today),
            selection: 0,
        }
    }

    pub fn is_hackathon_day(&self, day: u32) -> bool {
        NaiveDate::from_ymd_opt(self.month.year, self.month.month, day)
            .map(|d| self.hackathon_days.binary_search(&d).is_ok())
            .unwrap_or(false)
    }

    pub fn selected(&self) -> Option<&Hackathon> {
        self.hackathons.get(self.selection)
    }
}

/// What the right-hand side of the hackathon page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HackathonPanel {
    Teams,
    /// Unlocked after participating
    Menu,
    CreateTeam,
    JoinTeam,
}

#[derive(Debug, Clone)]
pub struct HackathonScreen {
    pub id: i64,
    pub loading: bool,
    pub detail: Option<HackathonDetail>,
    pub participated: bool,
    pub panel: HackathonPanel,
    pub team_name: String,
    pub potential_members: Vec<PotentialMember>,
    pub available_teams: Vec<Team>,
    pub selection: usize,
}

impl HackathonScreen {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            loading: true,
            detail: None,
            participated: false,
            panel: HackathonPanel::Teams,
            team_name: String::new(),
            potential_members: Vec::new(),
            available_teams: Vec::new(),
            selection: 0,
        }
    }

    pub fn push_team_name(&mut self, c: char) {
        push_limited(&mut self.team_name, c, MAX_TEAM_NAME_LENGTH);
    }

    pub fn list_len(&self) -> usize {
        match self.panel {
            HackathonPanel::Teams => self.detail.as_ref().map(|d| d.teams.len()).unwrap_or(0),
            HackathonPanel::JoinTeam => self.available_teams.len(),
            HackathonPanel::CreateTeam => self.potential_members.len(),
            HackathonPanel::Menu => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    DisplayName,
    Bio,
    Skills,
    Experience,
}

impl ProfileField {
    pub fn next(&self) -> Self {
        match self {
            ProfileField::DisplayName => ProfileField::Bio,
            ProfileField::Bio => ProfileField::Skills,
            ProfileField::Skills => ProfileField::Experience,
            ProfileField::Experience => ProfileField::DisplayName,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            ProfileField::DisplayName => ProfileField::Experience,
            ProfileField::Bio => ProfileField::DisplayName,
            ProfileField::Skills => ProfileField::Bio,
            ProfileField::Experience => ProfileField::Skills,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProfileField::DisplayName => "Display name",
            ProfileField::Bio => "Bio",
            ProfileField::Skills => "Skills",
            ProfileField::Experience => "Experience (months)",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileMode {
    View,
    Edit(ProfileField),
    /// Typing a local file path for the avatar upload
    Avatar,
}

/// Edit-form contents. Experience is kept as typed text until submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub display_name: String,
    pub bio: String,
    pub skills: String,
    pub experience: String,
}

impl ProfileDraft {
    pub fn from_profile(profile: &Profile) -> Self {
        let update = profile.to_update();
        Self {
            display_name: update.display_name,
            bio: update.bio,
            skills: update.skills,
            experience: update.experience_months.to_string(),
        }
    }

    pub fn field(&self, field: ProfileField) -> &str {
        match field {
            ProfileField::DisplayName => &self.display_name,
            ProfileField::Bio => &self.bio,
            ProfileField::Skills => &self.skills,
            ProfileField::Experience => &self.experience,
        }
    }

    pub fn push(&mut self, field: ProfileField, c: char) {
        match field {
            ProfileField::DisplayName => push_limited(&mut self.display_name, c, MAX_DISPLAY_NAME_LENGTH),
            ProfileField::Bio => push_limited(&mut self.bio, c, MAX_TEXT_FIELD_LENGTH),
            ProfileField::Skills => push_limited(&mut self.skills, c, MAX_TEXT_FIELD_LENGTH),
            ProfileField::Experience => {
                if c.is_ascii_digit() && self.experience.chars().count() < 3 {
                    self.experience.push(c);
                }
            }
        }
    }

    pub fn pop(&mut self, field: ProfileField) {
        match field {
            ProfileField::DisplayName => self.display_name.pop(),
            ProfileField::Bio => self.bio.pop(),
            ProfileField::Skills => self.skills.pop(),
            ProfileField::Experience => self.experience.pop(),
        };
    }

    /// Build and validate the `PUT` body. Returns a user-facing message.
    pub fn to_update(&self) -> Result<ProfileUpdate, String> {
        let experience_months = if self.experience.trim().is_empty() {
            0
        } else {
            self.experience
                .trim()
                .parse::<u32>()
                .map_err(|_| "Experience must be a whole number of months".to_string())?
        };
        let update = ProfileUpdate {
            display_name: self.display_name.trim().to_string(),
            bio: self.bio.clone(),
            skills: self.skills.clone(),
            experience_months,
        };
        update.validate()?;
        Ok(update)
    }
}

#[derive(Debug, Clone)]
pub struct ProfileScreen {
    pub loading: bool,
    pub profile: Option<Profile>,
    /// The backend has no profile for this account yet
    pub missing: bool,
    pub mode: ProfileMode,
    pub draft: ProfileDraft,
    pub avatar_path: String,
    pub saving: bool,
}

impl Default for ProfileScreen {
    fn default() -> Self {
        Self {
            loading: true,
            profile: None,
            missing: false,
            mode: ProfileMode::View,
            draft: ProfileDraft::default(),
            avatar_path: String::new(),
            saving: false,
        }
    }
}

impl ProfileScreen {
    pub fn show(&mut self, profile: Profile) {
        self.draft = ProfileDraft::from_profile(&profile);
        self.profile = Some(profile);
        self.missing = false;
        self.loading = false;
    }

    pub fn push_avatar_path(&mut self, c: char) {
        push_limited(&mut self.avatar_path, c, MAX_PATH_LENGTH);
    }
}

#[derive(Debug, Clone)]
pub struct MessagesScreen {
    pub loading: bool,
    pub messages: Vec<Message>,
    pub selection: usize,
}

impl Default for MessagesScreen {
    fn default() -> Self {
        Self {
            loading: true,
            messages: Vec::new(),
            selection: 0,
        }
    }
}

impl MessagesScreen {
    pub fn selected(&self) -> Option<&Message> {
        self.messages.get(self.selection)
    }
}

#[derive(Debug, Clone)]
pub struct MyTeamsScreen {
    pub loading: bool,
    pub teams: Vec<Team>,
    pub selection: usize,
    /// Team whose potential members are shown
    pub expanded: Option<i64>,
    pub candidates: HashMap<i64, Vec<PotentialMember>>,
    pub candidate_selection: usize,
}

impl Default for MyTeamsScreen {
    fn default() -> Self {
        Self {
            loading: true,
            teams: Vec::new(),
            selection: 0,
            expanded: None,
            candidates: HashMap::new(),
            candidate_selection: 0,
        }
    }
}

impl MyTeamsScreen {
    pub fn selected(&self) -> Option<&Team> {
        self.teams.get(self.selection)
    }

    pub fn expanded_candidates(&self) -> &[PotentialMember] {
        self.expanded
            .and_then(|id| self.candidates.get(&id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Drop an invited user from the shown list
    pub fn remove_candidate(&mut self, team_id: i64, user_id: i64) {
        if let Some(list) = self.candidates.get_mut(&team_id) {
            list.retain(|m| m.id != user_id);
        }
        let len = self.expanded_candidates().len();
        if self.candidate_selection >= len {
            self.candidate_selection = len.saturating_sub(1);
        }
    }
}

/// Keep a selection index inside a list of `len` items
pub fn clamp_selection(selection: usize, len: usize) -> usize {
    selection.min(len.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_can_add_username_char() {
        assert!(can_add_username_char(0, 'a'));
        assert!(can_add_username_char(149, '@'));
        assert!(!can_add_username_char(150, 'a'));
        assert!(!can_add_username_char(0, ' '));
        assert!(!can_add_username_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(0, ' '));
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\x00'));
    }

    #[test]
    fn test_code_form_limits_length_and_charset() {
        let mut form = CodeLoginForm::default();
        assert!(!form.can_submit());

        for c in "ab12-cd34ef".chars() {
            form.push(c);
        }
        assert_eq!(form.code, "ab12cd34");
        assert!(form.can_submit());

        form.submitting = true;
        assert!(!form.can_submit());
    }

    #[test]
    fn test_code_form_prefill() {
        assert_eq!(CodeLoginForm::with_code(Some(" 22n3M28g ")).code, "22n3M28g");
        assert_eq!(CodeLoginForm::with_code(None).code, "");
    }

    #[test]
    fn test_code_form_keeps_mixed_case() {
        assert_eq!(CodeLoginForm::with_code(Some("aB3dE5fG")).code, "aB3dE5fG");

        let mut form = CodeLoginForm::default();
        for c in "Xy7Qz".chars() {
            form.push(c);
        }
        assert_eq!(form.code, "Xy7Qz");
    }

    #[test]
    fn test_login_form_limits_count_chars() {
        let mut form = LoginForm::new(None);
        for _ in 0..MAX_USERNAME_LENGTH + 5 {
            form.push('é');
        }
        assert_eq!(form.username.chars().count(), MAX_USERNAME_LENGTH);

        form.focus = LoginFocus::Password;
        for _ in 0..MAX_PASSWORD_LENGTH + 5 {
            form.push('ß');
        }
        assert_eq!(form.password.chars().count(), MAX_PASSWORD_LENGTH);
    }

    #[test]
    fn test_login_focus_cycles() {
        let mut focus = LoginFocus::Username;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, LoginFocus::Username);
        assert_eq!(LoginFocus::Username.prev(), LoginFocus::CodeLink);
    }

    #[test]
    fn test_login_form_starts_at_password_when_username_known() {
        assert_eq!(LoginForm::new(Some("ann".into())).focus, LoginFocus::Password);
        assert_eq!(LoginForm::new(None).focus, LoginFocus::Username);
    }

    #[test]
    fn test_month_navigation_wraps_years() {
        let jan = MonthView { year: 2026, month: 1 };
        assert_eq!(jan.prev(), MonthView { year: 2025, month: 12 });
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(MonthView { year: 2026, month: 12 }.next(), MonthView { year: 2027, month: 1 });
        assert_eq!(jan.title(), "January 2026");
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(MonthView { year: 2024, month: 2 }.days_in_month(), 29);
        assert_eq!(MonthView { year: 2026, month: 2 }.days_in_month(), 28);
        assert_eq!(MonthView { year: 2026, month: 12 }.days_in_month(), 31);
    }

    #[test]
    fn test_calendar_grid_is_monday_first() {
        // 1 June 2026 is a Monday
        let june = MonthView { year: 2026, month: 6 }.weeks();
        assert_eq!(june[0][0], Some(1));
        assert_eq!(june.len(), 5);
        assert_eq!(june[4][1], Some(30));
        assert_eq!(june[4][2], None);

        // 1 March 2026 is a Sunday: six leading blanks
        let march = MonthView { year: 2026, month: 3 }.weeks();
        assert_eq!(march[0][..6], [None::<u32>; 6]);
        assert_eq!(march[0][6], Some(1));
        assert_eq!(march[1][0], Some(2));
        assert_eq!(march.len(), 6);
    }

    #[test]
    fn test_hackathon_day_highlighting() {
        let mut home = HomeScreen::new(date(2026, 10, 19));
        home.hackathon_days = vec![date(2026, 10, 3), date(2026, 11, 5)];
        assert!(home.is_hackathon_day(3));
        assert!(!home.is_hackathon_day(5));

        home.month = home.month.next();
        assert!(home.is_hackathon_day(5));
        assert!(!home.is_hackathon_day(3));
    }

    #[test]
    fn test_profile_draft_validation() {
        let mut draft = ProfileDraft {
            display_name: " Ann ".into(),
            experience: "24".into(),
            ..Default::default()
        };
        let update = draft.to_update().expect("valid draft");
        assert_eq!(update.display_name, "Ann");
        assert_eq!(update.experience_months, 24);

        draft.experience = "601".into();
        assert!(draft.to_update().is_err());

        draft.experience = String::new();
        assert_eq!(draft.to_update().expect("empty is zero").experience_months, 0);
    }

    #[test]
    fn test_profile_draft_experience_accepts_digits_only() {
        let mut draft = ProfileDraft::default();
        for c in "1a2b3 4".chars() {
            draft.push(ProfileField::Experience, c);
        }
        assert_eq!(draft.experience, "123");
    }

    #[test]
    fn test_remove_candidate_clamps_selection() {
        let member = |id: i64| PotentialMember {
            id,
            username: format!("user{}", id),
            display_name: None,
            level: None,
            skills: None,
            bio: None,
        };
        let mut screen = MyTeamsScreen {
            expanded: Some(7),
            candidate_selection: 1,
            ..Default::default()
        };
        screen.candidates.insert(7, vec![member(1), member(2)]);

        screen.remove_candidate(7, 2);
        assert_eq!(screen.expanded_candidates().len(), 1);
        assert_eq!(screen.candidate_selection, 0);
    }

    #[test]
    fn test_clamp_selection() {
        assert_eq!(clamp_selection(5, 3), 2);
        assert_eq!(clamp_selection(0, 0), 0);
        assert_eq!(clamp_selection(1, 4), 1);
    }
}
