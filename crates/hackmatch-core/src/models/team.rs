use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl TeamMember {
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => &self.username,
        }
    }
}

/// A team as listed on a hackathon page, in `my_teams/` and in
/// `available_teams/`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub captain_username: String,
    #[serde(default)]
    pub member_count: u32,
    #[serde(default)]
    pub size_min: Option<u32>,
    #[serde(default)]
    pub size_max: Option<u32>,
    #[serde(default)]
    pub members_list: Vec<TeamMember>,
    /// Owning hackathon id (present in `my_teams/`)
    #[serde(default)]
    pub hackathon: Option<i64>,
}

impl Team {
    pub fn occupancy(&self) -> String {
        match self.size_max {
            Some(max) => format!("{}/{}", self.member_count, max),
            None => self.member_count.to_string(),
        }
    }

    pub fn member_names(&self) -> String {
        self.members_list
            .iter()
            .map(|m| m.username.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_captained_by(&self, username: &str) -> bool {
        !username.is_empty() && self.captain_username == username
    }
}

/// A hackathon participant without a team, candidate for an invite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PotentialMember {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub skills: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

impl PotentialMember {
    pub fn name(&self) -> &str {
        match self.display_name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => &self.username,
        }
    }
}

/// Body of `POST /api/hackathons/{id}/create_team/`
#[derive(Debug, Clone, Serialize)]
pub struct CreateTeamRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_max: Option<u32>,
}

/// Body of `POST /api/teams/{id}/invite/`
#[derive(Debug, Clone, Serialize)]
pub struct InviteRequest {
    pub user_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_occupancy_and_captain() {
        let team: Team = serde_json::from_str(
            r#"{"id": 1, "name": "Owls", "captain_username": "ann", "member_count": 3, "size_max": 4, "hackathon": 7}"#,
        )
        .expect("valid team json");

        assert_eq!(team.occupancy(), "3/4");
        assert_eq!(team.hackathon, Some(7));
        assert!(team.is_captained_by("ann"));
        assert!(!team.is_captained_by("bob"));
        assert!(!team.is_captained_by(""));
    }

    #[test]
    fn test_create_team_request_omits_missing_bounds() {
        let body = serde_json::to_value(CreateTeamRequest {
            name: "Owls".to_string(),
            size_min: Some(2),
            size_max: None,
        })
        .expect("serializable");
        assert_eq!(body, serde_json::json!({"name": "Owls", "size_min": 2}));
    }

    #[test]
    fn test_potential_member_name_falls_back_to_username() {
        let m: PotentialMember =
            serde_json::from_str(r#"{"id": 5, "username": "zed", "display_name": ""}"#).expect("valid json");
        assert_eq!(m.name(), "zed");
    }
}
