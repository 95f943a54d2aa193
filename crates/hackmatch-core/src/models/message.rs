use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Accepted,
    Declined,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageStatus::Pending => write!(f, "Pending"),
            MessageStatus::Accepted => write!(f, "Accepted"),
            MessageStatus::Declined => write!(f, "Declined"),
            MessageStatus::Unknown => write!(f, "Unknown"),
        }
    }
}

/// An invitation or join request addressed to the current user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub sender_username: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default)]
    pub text: String,
    pub status: MessageStatus,
    #[serde(default)]
    pub sent_at: Option<String>,
}

impl Message {
    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }

    pub fn sent_display(&self) -> String {
        match &self.sent_at {
            Some(raw) => match DateTime::parse_from_rfc3339(raw) {
                Ok(dt) => dt.with_timezone(&Local).format("%b %d, %Y %H:%M").to_string(),
                Err(_) => raw.clone(),
            },
            None => String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RespondAction {
    Accept,
    Decline,
}

impl RespondAction {
    pub fn past_tense(&self) -> &'static str {
        match self {
            RespondAction::Accept => "accepted",
            RespondAction::Decline => "declined",
        }
    }
}

/// Body of `POST /api/messages/{id}/respond/`
#[derive(Debug, Clone, Serialize)]
pub struct RespondRequest {
    pub action: RespondAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_message_status() {
        let json = r#"[
            {"id": 1, "sender_username": "ann", "team_name": "Owls", "text": "Join us", "status": "pending", "sent_at": "2025-04-01T10:00:00Z"},
            {"id": 2, "sender_username": "bob", "team_name": "Cats", "text": "", "status": "accepted"},
            {"id": 3, "status": "expired"}
        ]"#;
        let messages: Vec<Message> = serde_json::from_str(json).expect("valid messages json");
        assert!(messages[0].is_pending());
        assert_eq!(messages[1].status, MessageStatus::Accepted);
        assert_eq!(messages[2].status, MessageStatus::Unknown);
        assert!(!messages[0].sent_display().is_empty());
        assert_eq!(messages[1].sent_display(), "");
    }

    #[test]
    fn test_respond_request_serializes_lowercase() {
        let body = serde_json::to_value(RespondRequest {
            action: RespondAction::Decline,
        })
        .expect("serializable");
        assert_eq!(body, serde_json::json!({"action": "decline"}));
    }
}
