//! Navigation targets and their path surface.

use std::fmt;

use reqwest::Url;

/// Maximum length of a one-time login code issued by the bot
pub const MAX_LOGIN_CODE_LENGTH: usize = 8;

/// Placeholder origin for parsing and building query strings
const QUERY_BASE: &str = "hackmatch://route/";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    /// `/`: resolved by the landing router
    Root,
    Home,
    Hackathon(i64),
    Profile,
    Messages,
    MyTeams,
    Login,
    TelegramLogin { code: Option<String> },
    Logout,
    NotFound(String),
}

impl Route {
    /// Parse a path such as `/hackathon/3` or `/telegram-login?code=AB12CD34`.
    /// Unknown paths map to `NotFound`; parsing never fails.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        let (path, query) = match input.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (input, None),
        };

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Root,
            ["home"] => Route::Home,
            ["hackathon", id] => match id.parse::<i64>() {
                Ok(id) if id > 0 => Route::Hackathon(id),
                _ => Route::NotFound(input.to_string()),
            },
            ["profile"] => Route::Profile,
            ["messages"] => Route::Messages,
            ["my-teams"] => Route::MyTeams,
            // A login link carrying a code goes straight to the code screen
            ["login"] => match query_param(query, "code") {
                Some(code) => Route::TelegramLogin { code: Some(code) },
                None => Route::Login,
            },
            ["telegram-login"] => Route::TelegramLogin {
                code: query_param(query, "code"),
            },
            ["logout"] => Route::Logout,
            _ => Route::NotFound(input.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Root => "/".to_string(),
            Route::Home => "/home".to_string(),
            Route::Hackathon(id) => format!("/hackathon/{}", id),
            Route::Profile => "/profile".to_string(),
            Route::Messages => "/messages".to_string(),
            Route::MyTeams => "/my-teams".to_string(),
            Route::Login => "/login".to_string(),
            Route::TelegramLogin { code: Some(code) } => with_query("/telegram-login", "code", code),
            Route::TelegramLogin { code: None } => "/telegram-login".to_string(),
            Route::Logout => "/logout".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    /// Whether the session guard must authorize this route before it renders
    pub fn is_protected(&self) -> bool {
        !matches!(
            self,
            Route::Login | Route::TelegramLogin { .. } | Route::Logout | Route::NotFound(_)
        )
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Root => "Loading",
            Route::Home => "Hackathons",
            Route::Hackathon(_) => "Hackathon",
            Route::Profile => "Profile",
            Route::Messages => "Messages",
            Route::MyTeams => "My Teams",
            Route::Login => "Login",
            Route::TelegramLogin { .. } => "Code Login",
            Route::Logout => "Logout",
            Route::NotFound(_) => "Not Found",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Percent-decoded value of `key` in a query string
fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    let url = Url::parse(&format!("{}?{}", QUERY_BASE, query?)).ok()?;
    url.query_pairs()
        .find(|(k, _)| k.as_ref() == key)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn with_query(path: &str, key: &str, value: &str) -> String {
    match Url::parse(QUERY_BASE) {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair(key, value);
            match url.query() {
                Some(query) => format!("{}?{}", path, query),
                None => path.to_string(),
            }
        }
        Err(_) => format!("{}?{}={}", path, key, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_routes() {
        assert_eq!(Route::parse("/"), Route::Root);
        assert_eq!(Route::parse(""), Route::Root);
        assert_eq!(Route::parse("/home"), Route::Home);
        assert_eq!(Route::parse("/home/"), Route::Home);
        assert_eq!(Route::parse("/hackathon/12"), Route::Hackathon(12));
        assert_eq!(Route::parse("/profile"), Route::Profile);
        assert_eq!(Route::parse("/messages"), Route::Messages);
        assert_eq!(Route::parse("/my-teams"), Route::MyTeams);
        assert_eq!(Route::parse("/login"), Route::Login);
        assert_eq!(Route::parse("/logout"), Route::Logout);
        assert_eq!(Route::parse("/telegram-login"), Route::TelegramLogin { code: None });
    }

    #[test]
    fn test_parse_code_query() {
        assert_eq!(
            Route::parse("/telegram-login?code=22N3M28G"),
            Route::TelegramLogin {
                code: Some("22N3M28G".to_string())
            }
        );
        assert_eq!(
            Route::parse("/login?code=AB12"),
            Route::TelegramLogin {
                code: Some("AB12".to_string())
            }
        );
        assert_eq!(Route::parse("/login?code="), Route::Login);
        assert_eq!(
            Route::parse("/telegram-login?utm=bot&code=aB3dE5fG"),
            Route::TelegramLogin {
                code: Some("aB3dE5fG".to_string())
            }
        );
        assert_eq!(Route::parse("/telegram-login?x=1"), Route::TelegramLogin { code: None });
    }

    #[test]
    fn test_code_query_is_percent_decoded() {
        assert_eq!(
            Route::parse("/telegram-login?code=aB%33d%20"),
            Route::TelegramLogin {
                code: Some("aB3d".to_string())
            }
        );

        let route = Route::TelegramLogin {
            code: Some("a&b=c".to_string()),
        };
        assert_eq!(route.path(), "/telegram-login?code=a%26b%3Dc");
        assert_eq!(Route::parse(&route.path()), route);
    }

    #[test]
    fn test_parse_unknown_routes() {
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".to_string()));
        assert_eq!(
            Route::parse("/hackathon/abc"),
            Route::NotFound("/hackathon/abc".to_string())
        );
        assert_eq!(
            Route::parse("/hackathon/0"),
            Route::NotFound("/hackathon/0".to_string())
        );
        assert_eq!(
            Route::parse("/home/extra"),
            Route::NotFound("/home/extra".to_string())
        );
    }

    #[test]
    fn test_path_round_trip() {
        let routes = [
            Route::Root,
            Route::Home,
            Route::Hackathon(7),
            Route::Profile,
            Route::Messages,
            Route::MyTeams,
            Route::Login,
            Route::TelegramLogin { code: None },
            Route::TelegramLogin {
                code: Some("CODE1234".to_string()),
            },
            Route::Logout,
        ];
        for route in routes {
            assert_eq!(Route::parse(&route.path()), route);
        }
    }

    #[test]
    fn test_protected_routes() {
        assert!(Route::Root.is_protected());
        assert!(Route::Home.is_protected());
        assert!(Route::Hackathon(1).is_protected());
        assert!(Route::MyTeams.is_protected());
        assert!(!Route::Login.is_protected());
        assert!(!Route::TelegramLogin { code: None }.is_protected());
        assert!(!Route::Logout.is_protected());
        assert!(!Route::NotFound("/x".into()).is_protected());
    }
}
