//! API client for the hackathon backend.
//!
//! `ApiClient` wraps a shared `reqwest::Client`, attaches the stored access
//! token to every resource call and maps non-2xx answers to `ApiError`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{multipart, Client, Method, Response, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::auth::{ProfileSource, TokenPair, TokenRefresher, TokenStore};
use crate::models::{
    CreateTeamRequest, Hackathon, HackathonDates, HackathonDetail, InviteRequest, Message,
    PotentialMember, Profile, ProfileUpdate, RespondAction, RespondRequest, Team,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Maximum number of retries for rate-limited (429) GET requests
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Token pair as returned by `/api/token/` and `/api/login_with_code/`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl TokenResponse {
    /// Both tokens are required; a partial answer is an error.
    pub fn into_pair(self) -> Result<TokenPair, ApiError> {
        let pair = TokenPair {
            access: self.access,
            refresh: self.refresh,
        };
        if pair.is_complete() {
            Ok(pair)
        } else {
            Err(ApiError::InvalidResponse(
                "Token response is missing the access or refresh token".into(),
            ))
        }
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: Option<String>,
}

/// List endpoints answer with a bare array, or with a paginated envelope
/// when pagination is switched on server-side.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Plain(Vec<T>),
    Paginated { results: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListResponse::Plain(items) => items,
            ListResponse::Paginated { results } => results,
        }
    }
}

/// Store both halves of a token response. Nothing is written when either
/// half is missing.
pub fn persist_tokens(store: &dyn TokenStore, response: TokenResponse) -> Result<TokenPair, ApiError> {
    let pair = response.into_pair()?;
    if let Some((access, refresh)) = pair.halves() {
        store.set(access, refresh);
    }
    Ok(pair)
}

/// Clone is cheap: reqwest::Client and the token store are both shared.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, store: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn auth_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = self.store.get().access.filter(|t| !t.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidRequest(format!("access token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Turn a response into `T`, or an `ApiError` carrying the body.
    async fn check_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!(status = status.as_u16(), "Request failed");
            return Err(ApiError::from_status(status, &body));
        }
        let text = response.text().await?;
        parse_body(&text)
    }

    /// Issue a request against `path`.
    ///
    /// The stored access token is attached when `authenticated` is set.
    /// Only GETs are retried on 429; mutations go out exactly once.
    async fn send<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
        authenticated: bool,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let retry_rate_limited = method == Method::GET;
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut builder = self.client.request(method.clone(), &url);
            if authenticated {
                builder = builder.headers(self.auth_headers()?);
            }
            if let Some(extra) = &headers {
                builder = builder.headers(extra.clone());
            }
            if let Some(body) = body {
                builder = builder.json(body);
            }

            debug!(%method, url = %url, "Sending request");
            let response = builder.send().await?;

            if response.status() == StatusCode::TOO_MANY_REQUESTS
                && retry_rate_limited
                && retries < MAX_RATE_LIMIT_RETRIES
            {
                retries += 1;
                warn!(url = %url, retry = retries, backoff_ms, "Rate limited, backing off");
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
                continue;
            }

            return Self::check_response(response).await;
        }
    }

    /// Generic authenticated request. An empty 2xx body parses as JSON
    /// `null`, so `T` may be `()` or `Value` for endpoints without content.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        headers: Option<HeaderMap>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(method, path, body, headers, true).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request::<T, ()>(Method::GET, path, None, None).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let list: ListResponse<T> = self.get(path).await?;
        Ok(list.into_vec())
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, ApiError> {
        self.request(Method::POST, path, body, None).await
    }

    // ===== Authentication =====

    /// Exchange a refresh token for a new access token. Sent without a
    /// bearer header; the token store is left untouched.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        let body = serde_json::json!({ "refresh": refresh_token });
        let response: RefreshResponse = self
            .send(Method::POST, "/api/token/refresh/", Some(&body), None, false)
            .await?;
        response
            .access
            .filter(|a| !a.is_empty())
            .ok_or_else(|| ApiError::InvalidResponse("Refresh response has no access token".into()))
    }

    /// Password login. Returns the raw token response.
    pub async fn obtain_token(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });
        self.send(Method::POST, "/api/token/", Some(&body), None, false)
            .await
    }

    /// One-time code login for accounts created through the chat bot.
    pub async fn login_with_code(&self, code: &str) -> Result<TokenResponse, ApiError> {
        let body = serde_json::json!({ "code": code });
        self.send(Method::POST, "/api/login_with_code/", Some(&body), None, false)
            .await
    }

    /// Password login, persisting both tokens on success.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<TokenPair, ApiError> {
        let response = self.obtain_token(username, password).await?;
        let pair = persist_tokens(self.store.as_ref(), response)?;
        info!(username, "Signed in with password");
        Ok(pair)
    }

    /// Code login, persisting both tokens on success.
    pub async fn sign_in_with_code(&self, code: &str) -> Result<TokenPair, ApiError> {
        let response = self.login_with_code(code).await?;
        let pair = persist_tokens(self.store.as_ref(), response)?;
        info!("Signed in with login code");
        Ok(pair)
    }

    // ===== Profile =====

    pub async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        self.get("/api/profile/").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.request(Method::PUT, "/api/profile/", Some(update), None)
            .await
    }

    /// Upload a new avatar image as multipart `PATCH /api/profile/`.
    pub async fn upload_avatar(&self, path: &Path) -> Result<Profile, ApiError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "avatar".to_string());

        let form = multipart::Form::new().part("avatar", multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .patch(self.url("/api/profile/"))
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()
            .await?;
        Self::check_response(response).await
    }

    // ===== Hackathons =====

    pub async fn fetch_hackathons(&self) -> Result<Vec<Hackathon>, ApiError> {
        self.get_list("/api/hackathons/").await
    }

    pub async fn fetch_hackathon(&self, id: i64) -> Result<HackathonDetail, ApiError> {
        self.get(&format!("/api/hackathons/{}/", id)).await
    }

    pub async fn fetch_hackathon_dates(&self) -> Result<HackathonDates, ApiError> {
        self.get("/api/hackathon-dates/").await
    }

    pub async fn participate(&self, hackathon_id: i64) -> Result<Value, ApiError> {
        self.post::<Value, ()>(&format!("/api/hackathons/{}/participate/", hackathon_id), None)
            .await
    }

    pub async fn create_team(&self, hackathon_id: i64, request: &CreateTeamRequest) -> Result<Value, ApiError> {
        self.post(&format!("/api/hackathons/{}/create_team/", hackathon_id), Some(request))
            .await
    }

    pub async fn fetch_available_teams(&self, hackathon_id: i64) -> Result<Vec<Team>, ApiError> {
        self.get_list(&format!("/api/hackathons/{}/available_teams/", hackathon_id))
            .await
    }

    pub async fn fetch_potential_members(&self, hackathon_id: i64) -> Result<Vec<PotentialMember>, ApiError> {
        self.get_list(&format!("/api/hackathons/{}/potential_members/", hackathon_id))
            .await
    }

    // ===== Teams =====

    pub async fn join_team(&self, team_id: i64) -> Result<Value, ApiError> {
        self.post::<Value, ()>(&format!("/api/teams/{}/join/", team_id), None)
            .await
    }

    pub async fn invite(&self, team_id: i64, user_id: i64) -> Result<Value, ApiError> {
        self.post(&format!("/api/teams/{}/invite/", team_id), Some(&InviteRequest { user_id }))
            .await
    }

    pub async fn delete_team(&self, team_id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .request::<Value, ()>(Method::DELETE, &format!("/api/teams/{}/delete/", team_id), None, None)
            .await?;
        Ok(())
    }

    pub async fn fetch_my_teams(&self) -> Result<Vec<Team>, ApiError> {
        self.get_list("/api/my_teams/").await
    }

    // ===== Messages =====

    pub async fn fetch_messages(&self) -> Result<Vec<Message>, ApiError> {
        self.get_list("/api/messages/").await
    }

    pub async fn respond(&self, message_id: i64, action: RespondAction) -> Result<Value, ApiError> {
        self.post(
            &format!("/api/messages/{}/respond/", message_id),
            Some(&RespondRequest { action }),
        )
        .await
    }
}

impl TokenRefresher for ApiClient {
    async fn refresh(&self, refresh_token: &str) -> Result<String, ApiError> {
        ApiClient::refresh(self, refresh_token).await
    }
}

impl ProfileSource for ApiClient {
    async fn fetch_profile(&self) -> Result<Profile, ApiError> {
        ApiClient::fetch_profile(self).await
    }
}

fn parse_body<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    let text = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(text).map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)))
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;
    use crate::auth::MemoryTokenStore;

    /// One request as seen by the test server
    struct Captured {
        /// Request line and headers
        head: String,
        body: String,
    }

    impl Captured {
        fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (k, v) = line.split_once(':')?;
                k.trim().eq_ignore_ascii_case(name).then(|| v.trim())
            })
        }

        fn json(&self) -> Value {
            serde_json::from_str(&self.body).expect("request body is JSON")
        }
    }

    /// Accept a single connection, record the request and answer with
    /// `status` and `body`.
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let task = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];

            let header_end = loop {
                let n = socket.read(&mut chunk).await.expect("read");
                assert!(n > 0, "connection closed before headers");
                buf.extend_from_slice(&chunk[..n]);
                if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
            };

            let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
            let content_length = head
                .lines()
                .find_map(|line| {
                    let (k, v) = line.split_once(':')?;
                    k.trim().eq_ignore_ascii_case("content-length").then(|| v.trim())
                })
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(0);

            while buf.len() < header_end + content_length {
                let n = socket.read(&mut chunk).await.expect("read body");
                assert!(n > 0, "connection closed before body");
                buf.extend_from_slice(&chunk[..n]);
            }
            let request_body = String::from_utf8_lossy(&buf[header_end..header_end + content_length]).to_string();

            let response = format!(
                "HTTP/1.1 {} Test\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.expect("write response");
            let _ = socket.shutdown().await;

            Captured {
                head,
                body: request_body,
            }
        });

        (format!("http://{}", addr), task)
    }

    fn client(base_url: &str, store: Arc<MemoryTokenStore>) -> ApiClient {
        ApiClient::new(base_url, Duration::from_secs(5), store).expect("client builds")
    }

    #[test]
    fn test_url_joining() {
        let api = client("http://localhost:8000/", Arc::new(MemoryTokenStore::new()));
        assert_eq!(api.base_url(), "http://localhost:8000");
        assert_eq!(api.url("/api/profile/"), "http://localhost:8000/api/profile/");
        assert_eq!(api.url("api/profile/"), "http://localhost:8000/api/profile/");
    }

    #[test]
    fn test_auth_header_follows_store() {
        let store = Arc::new(MemoryTokenStore::new());
        let api = client("http://localhost:8000", Arc::clone(&store));
        assert!(api.auth_headers().expect("headers").get(header::AUTHORIZATION).is_none());

        store.set("abc", "def");
        let headers = api.auth_headers().expect("headers");
        assert_eq!(headers.get(header::AUTHORIZATION).map(|v| v.as_bytes()), Some(&b"Bearer abc"[..]));

        store.set_access("xyz");
        let headers = api.auth_headers().expect("headers");
        assert_eq!(headers.get(header::AUTHORIZATION).map(|v| v.as_bytes()), Some(&b"Bearer xyz"[..]));
    }

    #[test]
    fn test_parse_empty_body() {
        parse_body::<()>("").expect("empty body is null");
        assert_eq!(parse_body::<Value>("  ").expect("null"), Value::Null);
        assert!(matches!(parse_body::<Vec<i64>>("{oops"), Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_list_response_shapes() {
        let plain: ListResponse<i64> = serde_json::from_str("[1, 2]").expect("plain list");
        assert_eq!(plain.into_vec(), vec![1, 2]);

        let paged: ListResponse<i64> =
            serde_json::from_str(r#"{"count": 1, "next": null, "results": [3]}"#).expect("paginated list");
        assert_eq!(paged.into_vec(), vec![3]);
    }

    #[test]
    fn test_token_response_requires_both_tokens() {
        let full: TokenResponse = serde_json::from_str(r#"{"access": "a", "refresh": "r"}"#).expect("json");
        assert_eq!(full.into_pair().expect("complete"), TokenPair::new("a", "r"));

        let partial: TokenResponse = serde_json::from_str(r#"{"access": "a"}"#).expect("json");
        assert!(matches!(partial.into_pair(), Err(ApiError::InvalidResponse(_))));
    }

    #[test]
    fn test_persist_tokens_writes_both_halves() {
        let store = MemoryTokenStore::new();
        let response = TokenResponse {
            access: Some("a1".into()),
            refresh: Some("r1".into()),
        };
        persist_tokens(&store, response).expect("persisted");
        assert_eq!(store.get(), TokenPair::new("a1", "r1"));
    }

    #[test]
    fn test_persist_tokens_rejects_partial_response() {
        let store = MemoryTokenStore::with_tokens("old-a", "old-r");
        let response = TokenResponse {
            access: Some("a1".into()),
            refresh: None,
        };
        assert!(persist_tokens(&store, response).is_err());
        assert_eq!(store.get(), TokenPair::new("old-a", "old-r"));
    }

    #[test]
    fn test_parse_hackathon_detail() {
        let json = r#"{
            "hackathon": {"id": 3, "name": "Spring Hack", "category": "web",
                          "category_display": "Web", "team_size_min": 2, "team_size_max": 5,
                          "registered_teams": 4, "max_teams": 20},
            "teams": [{"id": 9, "name": "Owls", "captain_username": "ann", "member_count": 2,
                       "members_list": [{"id": 1, "username": "ann"}, {"id": 2, "username": "bob"}]}]
        }"#;
        let detail: HackathonDetail = parse_body(json).expect("detail parses");
        assert_eq!(detail.hackathon.id, 3);
        assert_eq!(detail.teams.len(), 1);
        assert_eq!(detail.teams[0].member_names(), "ann, bob");
    }

    #[tokio::test]
    async fn test_network_failure_is_network_error() {
        // Nothing listens on port 9 locally
        let api = client("http://127.0.0.1:9", Arc::new(MemoryTokenStore::new()));
        let err = api.fetch_hackathons().await.expect_err("connection refused");
        assert!(matches!(err, ApiError::Network(_)));
        assert!(!err.is_auth_error());
    }

    #[tokio::test]
    async fn test_refresh_rejected_is_auth_error() {
        let (url, server) = serve_once(401, r#"{"detail": "Token is invalid or expired"}"#).await;
        let store = Arc::new(MemoryTokenStore::with_tokens("stale-access", "ref"));
        let api = client(&url, Arc::clone(&store));

        let err = api.refresh("ref").await.expect_err("refresh rejected");
        assert!(matches!(err, ApiError::Http { status: 401, .. }));
        assert!(err.is_auth_error());
        assert_eq!(err.user_message(), "Token is invalid or expired");

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("POST /api/token/refresh/ "));
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.json(), serde_json::json!({ "refresh": "ref" }));

        // A failed refresh leaves the stored pair alone
        assert_eq!(store.get(), TokenPair::new("stale-access", "ref"));
    }

    #[tokio::test]
    async fn test_refresh_returns_access_without_storing_it() {
        let (url, server) = serve_once(200, r#"{"access": "fresh"}"#).await;
        let store = Arc::new(MemoryTokenStore::with_tokens("old", "ref"));
        let api = client(&url, Arc::clone(&store));

        assert_eq!(api.refresh("ref").await.expect("refreshed"), "fresh");
        assert_eq!(store.get(), TokenPair::new("old", "ref"));
        server.await.expect("server task");
    }

    #[tokio::test]
    async fn test_code_sign_in_persists_both_tokens() {
        let (url, server) = serve_once(200, r#"{"access": "a2", "refresh": "r2"}"#).await;
        let store = Arc::new(MemoryTokenStore::new());
        let api = client(&url, Arc::clone(&store));

        let pair = api.sign_in_with_code("aB3dE5fG").await.expect("signed in");
        assert_eq!(pair, TokenPair::new("a2", "r2"));
        assert_eq!(store.get(), TokenPair::new("a2", "r2"));

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("POST /api/login_with_code/ "));
        assert_eq!(request.header("authorization"), None);
        assert_eq!(request.json(), serde_json::json!({ "code": "aB3dE5fG" }));
    }

    #[tokio::test]
    async fn test_password_login_goes_out_without_bearer() {
        let (url, server) = serve_once(401, r#"{"detail": "No active account found"}"#).await;
        let store = Arc::new(MemoryTokenStore::with_tokens("someone-else", "r0"));
        let api = client(&url, Arc::clone(&store));

        let err = api.sign_in("ann", "hunter2").await.expect_err("rejected");
        assert_eq!(err.status(), Some(401));
        assert_eq!(store.get(), TokenPair::new("someone-else", "r0"));

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("POST /api/token/ "));
        assert_eq!(request.header("authorization"), None);
        assert_eq!(
            request.json(),
            serde_json::json!({ "username": "ann", "password": "hunter2" })
        );
    }

    #[tokio::test]
    async fn test_resource_call_attaches_bearer_and_parses_body() {
        let (url, server) = serve_once(200, r#"{"id": 4, "username": "ann", "is_telegram_user": false}"#).await;
        let api = client(&url, Arc::new(MemoryTokenStore::with_tokens("a1", "r1")));

        let profile = api.fetch_profile().await.expect("profile");
        assert_eq!(profile.username, "ann");
        assert_eq!(profile.id, Some(4));

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("GET /api/profile/ "));
        assert_eq!(request.header("authorization"), Some("Bearer a1"));
    }

    #[tokio::test]
    async fn test_resource_call_without_session_has_no_bearer() {
        let (url, server) = serve_once(200, "[]").await;
        let api = client(&url, Arc::new(MemoryTokenStore::new()));

        assert!(api.fetch_messages().await.expect("messages").is_empty());

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("GET /api/messages/ "));
        assert_eq!(request.header("authorization"), None);
    }

    #[tokio::test]
    async fn test_empty_success_body_is_accepted() {
        let (url, server) = serve_once(200, "").await;
        let api = client(&url, Arc::new(MemoryTokenStore::with_tokens("a1", "r1")));

        api.delete_team(5).await.expect("deleted");

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("DELETE /api/teams/5/delete/ "));
    }

    #[tokio::test]
    async fn test_mutation_error_keeps_status_and_body() {
        let (url, server) = serve_once(400, r#"{"error": "Invitation already answered"}"#).await;
        let api = client(&url, Arc::new(MemoryTokenStore::with_tokens("a1", "r1")));

        let err = api.respond(3, RespondAction::Accept).await.expect_err("rejected");
        match &err {
            ApiError::Http { status, body } => {
                assert_eq!(*status, 400);
                assert!(body.contains("already answered"));
            }
            other => panic!("expected an HTTP error, got {:?}", other),
        }
        assert!(!err.is_auth_error());
        assert_eq!(err.user_message(), "Invitation already answered");

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("POST /api/messages/3/respond/ "));
        assert_eq!(request.json(), serde_json::json!({ "action": "accept" }));
    }

    #[tokio::test]
    async fn test_avatar_upload_is_multipart_patch() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("me.png");
        std::fs::write(&path, b"not really a png").expect("write avatar");

        let (url, server) = serve_once(200, r#"{"username": "ann", "avatar": "/media/me.png"}"#).await;
        let api = client(&url, Arc::new(MemoryTokenStore::with_tokens("a1", "r1")));

        let profile = api.upload_avatar(&path).await.expect("uploaded");
        assert_eq!(profile.avatar.as_deref(), Some("/media/me.png"));

        let request = server.await.expect("server task");
        assert!(request.request_line().starts_with("PATCH /api/profile/ "));
        assert_eq!(request.header("authorization"), Some("Bearer a1"));
        assert!(request
            .header("content-type")
            .is_some_and(|v| v.starts_with("multipart/form-data")));
        assert!(request.body.contains(r#"name="avatar"; filename="me.png""#));
        assert!(request.body.contains("not really a png"));
    }

    #[tokio::test]
    async fn test_avatar_upload_missing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let api = client("http://127.0.0.1:9", Arc::new(MemoryTokenStore::new()));

        let err = api
            .upload_avatar(&dir.path().join("missing.png"))
            .await
            .expect_err("no such file");
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }
}
