use serde::{Deserialize, Serialize};

/// Maximum length of a display name accepted by the backend
pub const MAX_DISPLAY_NAME_LENGTH: usize = 100;

/// Upper bound for the experience field, in months
pub const MAX_EXPERIENCE_MONTHS: u32 = 600;

/// Classification of the authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileKind {
    /// Username/password account
    StandardUser,
    /// Account created through the chat-bot code exchange
    ExternalIdentityUser,
    /// Fresh external-identity account whose profile does not exist yet
    ProfileMissing,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub experience_months: Option<u32>,
    /// Human-readable experience computed by the backend
    #[serde(default)]
    pub experience_years: Option<serde_json::Value>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub level_display: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub hackathons_participated: Option<u32>,
    #[serde(default)]
    pub is_telegram_user: bool,
}

impl Profile {
    pub fn kind(&self) -> ProfileKind {
        if self.is_telegram_user {
            ProfileKind::ExternalIdentityUser
        } else {
            ProfileKind::StandardUser
        }
    }

    /// Name to greet the user with
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(n) if !n.trim().is_empty() => n,
            _ => &self.username,
        }
    }

    pub fn level_label(&self) -> &str {
        self.level_display.as_deref().unwrap_or("Beginner")
    }

    pub fn experience_label(&self) -> Option<String> {
        match &self.experience_years {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(serde_json::Value::Number(n)) => Some(format!("{} years", n)),
            _ => self.experience_months.filter(|m| *m > 0).map(|m| format!("{} months", m)),
        }
    }

    /// Editable snapshot of this profile
    pub fn to_update(&self) -> ProfileUpdate {
        ProfileUpdate {
            display_name: self.display_name.clone().unwrap_or_default(),
            bio: self.bio.clone().unwrap_or_default(),
            skills: self.skills.clone().unwrap_or_default(),
            experience_months: self.experience_months.unwrap_or(0),
        }
    }
}

/// Body of `PUT /api/profile/`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    pub display_name: String,
    pub bio: String,
    pub skills: String,
    pub experience_months: u32,
}

impl ProfileUpdate {
    /// Check field bounds before sending. Returns a user-facing message.
    pub fn validate(&self) -> Result<(), String> {
        if self.display_name.chars().count() > MAX_DISPLAY_NAME_LENGTH {
            return Err(format!(
                "Display name must be at most {} characters",
                MAX_DISPLAY_NAME_LENGTH
            ));
        }
        if self.experience_months > MAX_EXPERIENCE_MONTHS {
            return Err(format!(
                "Experience must be between 0 and {} months",
                MAX_EXPERIENCE_MONTHS
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_kind() {
        let standard: Profile = serde_json::from_str(r#"{"username": "ann"}"#).expect("valid json");
        assert_eq!(standard.kind(), ProfileKind::StandardUser);

        let external: Profile =
            serde_json::from_str(r#"{"username": "123456789", "is_telegram_user": true}"#).expect("valid json");
        assert_eq!(external.kind(), ProfileKind::ExternalIdentityUser);
    }

    #[test]
    fn test_profile_labels() {
        let p: Profile = serde_json::from_str(
            r#"{"username": "ann", "display_name": " ", "experience_months": 14, "experience_years": null}"#,
        )
        .expect("valid json");
        assert_eq!(p.name(), "ann");
        assert_eq!(p.level_label(), "Beginner");
        assert_eq!(p.experience_label().as_deref(), Some("14 months"));

        let p: Profile =
            serde_json::from_str(r#"{"username": "ann", "experience_years": "1 year 2 months"}"#).expect("valid json");
        assert_eq!(p.experience_label().as_deref(), Some("1 year 2 months"));
    }

    #[test]
    fn test_profile_update_validation() {
        let mut update = ProfileUpdate::default();
        assert!(update.validate().is_ok());

        update.experience_months = MAX_EXPERIENCE_MONTHS + 1;
        assert!(update.validate().is_err());

        update.experience_months = 12;
        update.display_name = "x".repeat(MAX_DISPLAY_NAME_LENGTH + 1);
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_to_update_copies_editable_fields() {
        let p = Profile {
            username: "ann".to_string(),
            display_name: Some("Ann".to_string()),
            skills: Some("Rust".to_string()),
            experience_months: Some(3),
            ..Default::default()
        };
        let update = p.to_update();
        assert_eq!(update.display_name, "Ann");
        assert_eq!(update.skills, "Rust");
        assert_eq!(update.bio, "");
        assert_eq!(update.experience_months, 3);
    }
}
