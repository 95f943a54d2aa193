//! Data models for backend resources.
//!
//! - `Profile`, `ProfileUpdate`, `ProfileKind`: the current user's profile
//! - `Hackathon`, `HackathonDetail`, `HackathonDates`: the event catalog
//! - `Team`, `TeamMember`, `PotentialMember`: team formation
//! - `Message`: invitations and join requests

pub mod hackathon;
pub mod message;
pub mod profile;
pub mod team;

pub use hackathon::{Hackathon, HackathonDates, HackathonDetail};
pub use message::{Message, MessageStatus, RespondAction, RespondRequest};
pub use profile::{Profile, ProfileKind, ProfileUpdate, MAX_DISPLAY_NAME_LENGTH, MAX_EXPERIENCE_MONTHS};
pub use team::{CreateTeamRequest, InviteRequest, PotentialMember, Team, TeamMember};
