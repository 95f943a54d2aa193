use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use super::team::Team;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hackathon {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub category_display: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub difficulty_display: Option<String>,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Free-form time window, e.g. "10:00 - 18:00"
    #[serde(default)]
    pub date_range: Option<String>,
    #[serde(default)]
    pub team_size_min: Option<u32>,
    #[serde(default)]
    pub team_size_max: Option<u32>,
    #[serde(default)]
    pub registered_teams: u32,
    #[serde(default)]
    pub max_teams: Option<u32>,
    #[serde(default)]
    pub partners: Option<String>,
    #[serde(default)]
    pub required_roles: Vec<String>,
}

impl Hackathon {
    pub fn category_label(&self) -> &str {
        self.category_display
            .as_deref()
            .or(self.category.as_deref())
            .unwrap_or("-")
    }

    pub fn difficulty_label(&self) -> &str {
        self.difficulty_display
            .as_deref()
            .or(self.difficulty.as_deref())
            .unwrap_or("-")
    }

    pub fn teams_display(&self) -> String {
        match self.max_teams {
            Some(max) => format!("{}/{} teams", self.registered_teams, max),
            None => format!("{} teams", self.registered_teams),
        }
    }

    pub fn team_size_display(&self) -> String {
        match (self.team_size_min, self.team_size_max) {
            (Some(min), Some(max)) => format!("{} - {} members", min, max),
            (Some(min), None) => format!("{}+ members", min),
            (None, Some(max)) => format!("up to {} members", max),
            (None, None) => "any size".to_string(),
        }
    }

    pub fn dates_display(&self) -> String {
        match (&self.start_date, &self.end_date) {
            (Some(start), Some(end)) if start != end => format!("{} - {}", start, end),
            (Some(start), _) => start.clone(),
            (None, _) => "TBD".to_string(),
        }
    }

    pub fn partners_display(&self) -> &str {
        match self.partners.as_deref() {
            Some(p) if !p.trim().is_empty() => p,
            _ => "None",
        }
    }

    pub fn roles_display(&self) -> String {
        if self.required_roles.is_empty() {
            "Any".to_string()
        } else {
            self.required_roles.join(", ")
        }
    }
}

/// Response of `GET /api/hackathons/{id}/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HackathonDetail {
    pub hackathon: Hackathon,
    #[serde(default)]
    pub teams: Vec<Team>,
}

/// Response of `GET /api/hackathon-dates/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HackathonDates {
    #[serde(default)]
    pub hackathon_dates: Vec<String>,
}

impl HackathonDates {
    /// Calendar days with at least one hackathon. Entries may be plain dates
    /// or full timestamps; unparseable entries are skipped.
    pub fn days(&self) -> Vec<NaiveDate> {
        let mut days: Vec<NaiveDate> = self
            .hackathon_dates
            .iter()
            .filter_map(|raw| parse_day(raw))
            .collect();
        days.sort();
        days.dedup();
        days
    }
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    let prefix: String = raw.chars().take(10).collect();
    NaiveDate::parse_from_str(&prefix, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hackathon_detail() {
        let json = r#"{
            "hackathon": {
                "id": 3, "name": "Spring Jam", "category": "ai", "category_display": "AI/ML",
                "difficulty_display": "Medium", "start_date": "2025-04-12", "end_date": "2025-04-13",
                "date_range": "10:00 - 18:00", "team_size_min": 2, "team_size_max": 5,
                "registered_teams": 4, "max_teams": 20, "partners": "", "required_roles": ["backend", "design"]
            },
            "teams": [
                {"id": 9, "name": "Owls", "captain_username": "ann", "member_count": 2, "size_max": 5,
                 "members_list": [{"id": 1, "username": "ann"}, {"id": 2, "username": "bob"}]}
            ]
        }"#;

        let detail: HackathonDetail = serde_json::from_str(json).expect("valid detail json");
        assert_eq!(detail.hackathon.name, "Spring Jam");
        assert_eq!(detail.hackathon.category_label(), "AI/ML");
        assert_eq!(detail.hackathon.teams_display(), "4/20 teams");
        assert_eq!(detail.hackathon.team_size_display(), "2 - 5 members");
        assert_eq!(detail.hackathon.dates_display(), "2025-04-12 - 2025-04-13");
        assert_eq!(detail.hackathon.partners_display(), "None");
        assert_eq!(detail.hackathon.roles_display(), "backend, design");
        assert_eq!(detail.teams.len(), 1);
        assert_eq!(detail.teams[0].member_names(), "ann, bob");
    }

    #[test]
    fn test_minimal_hackathon_uses_defaults() {
        let h: Hackathon = serde_json::from_str(r#"{"id": 1, "name": "Bare"}"#).expect("valid json");
        assert_eq!(h.category_label(), "-");
        assert_eq!(h.teams_display(), "0 teams");
        assert_eq!(h.team_size_display(), "any size");
        assert_eq!(h.dates_display(), "TBD");
        assert_eq!(h.roles_display(), "Any");
    }

    #[test]
    fn test_hackathon_dates_days() {
        let dates = HackathonDates {
            hackathon_dates: vec![
                "2025-04-13".to_string(),
                "2025-04-12T09:00:00+03:00".to_string(),
                "2025-04-13".to_string(),
                "not a date".to_string(),
            ],
        };
        let days = dates.days();
        assert_eq!(
            days,
            vec![
                NaiveDate::from_ymd_opt(2025, 4, 12).expect("valid date"),
                NaiveDate::from_ymd_opt(2025, 4, 13).expect("valid date"),
            ]
        );
    }
}
