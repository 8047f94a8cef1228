//! Session manager: owns the current authentication cookie
//!
//! The session lives behind a single async mutex. Re-authentication happens
//! while that lock is held, so concurrent consumers that observe a login in
//! progress wait for it instead of starting a second one and invalidating a
//! cookie other tasks are about to use.

use crate::config::Config;
use crate::notify::Notifier;
use crate::scrape::fetcher::build_http_client;
use crate::scrape::parser::extract_csrf_token;
use crate::scrape::selectors::LOGIN_PATH;
use crate::TrackerError;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

/// Name of the judge site's session cookie
pub const SESSION_COOKIE: &str = "EduSiteCookie";

/// An authentication session for the judge site
#[derive(Debug, Clone)]
pub struct Session {
    /// The full cookie pair, e.g. `EduSiteCookie=abc123`
    pub cookie: String,

    /// When this session was obtained
    pub obtained_at: DateTime<Utc>,

    /// Expiry, if the site ever advertises one (it currently does not)
    pub valid_until: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session has passed its advertised expiry
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.valid_until, Some(until) if until <= now)
    }
}

/// Owns the zero-or-one current session and the login flow
pub struct SessionManager {
    /// Client with redirects disabled so the login response's
    /// set-cookie header is observable
    login_client: Client,
    login_url: Url,
    username: String,
    password: String,
    notifier: Arc<dyn Notifier>,
    session: Mutex<Option<Session>>,
}

impl SessionManager {
    /// Creates a session manager holding no session yet
    pub fn new(config: &Config, notifier: Arc<dyn Notifier>) -> Result<Self, TrackerError> {
        let base = Url::parse(&config.site.base_url)?;
        let login_url = base.join(LOGIN_PATH)?;
        let login_client = build_http_client(false)?;

        Ok(Self {
            login_client,
            login_url,
            username: config.user.username.clone(),
            password: config.user.password.clone(),
            notifier,
            session: Mutex::new(None),
        })
    }

    /// Returns request headers carrying a valid session cookie
    ///
    /// Signs in first if no session is held or the held one has expired.
    /// The session lock is held across the login, so only one
    /// re-authentication can be in flight at a time.
    pub async fn current_headers(&self) -> Result<HeaderMap, TrackerError> {
        let mut guard = self.session.lock().await;

        let needs_login = match guard.as_ref() {
            Some(session) => session.is_expired(Utc::now()),
            None => true,
        };
        if needs_login {
            *guard = Some(self.login().await?);
        }

        match guard.as_ref() {
            Some(session) => headers_for(session),
            None => Err(TrackerError::Auth("no session after login".to_string())),
        }
    }

    /// Discards the current session, forcing a fresh login on next use
    pub async fn invalidate(&self) {
        let mut guard = self.session.lock().await;
        if guard.take().is_some() {
            tracing::info!("Session invalidated, will re-authenticate on next request");
        }
    }

    /// Absorbs a silently rotated session cookie from a response
    ///
    /// The site occasionally re-issues the session cookie on an ordinary
    /// page response. The new value replaces the held one and is surfaced
    /// to the operator, since it may need to be persisted outside this
    /// process for future runs.
    pub async fn absorb_rotation(&self, headers: &HeaderMap) {
        let Some(rotated) = extract_session_cookie(headers) else {
            return;
        };

        let mut guard = self.session.lock().await;
        let changed = guard.as_ref().map(|s| s.cookie != rotated).unwrap_or(true);
        if !changed {
            return;
        }

        tracing::info!("Judge site rotated the session cookie mid-crawl");
        *guard = Some(Session {
            cookie: rotated.clone(),
            obtained_at: Utc::now(),
            valid_until: None,
        });

        // Best-effort: the operator may need the new value outside this process
        self.notifier.notify(
            "Session cookie rotated",
            &format!("The judge site issued a new session cookie: {}", rotated),
        );
    }

    /// The judge site's login form flow
    ///
    /// GET the login page for a CSRF token, POST credentials plus the
    /// token, and read the session cookie out of the response headers.
    async fn login(&self) -> Result<Session, TrackerError> {
        tracing::info!("Signing in to {}", self.login_url);

        // Step 1: fetch the login page to obtain the CSRF token
        let response = self
            .login_client
            .get(self.login_url.as_str())
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::Auth(format!(
                "login page returned status {}",
                status.as_u16()
            )));
        }
        let body = response.text().await?;
        let token = extract_csrf_token(&body).ok_or_else(|| {
            TrackerError::Auth("login page contained no CSRF token".to_string())
        })?;

        // Step 2: submit the login form; the site answers with a redirect
        // carrying the session cookie
        let response = self
            .login_client
            .post(self.login_url.as_str())
            .form(&[
                ("user", self.username.as_str()),
                ("password", self.password.as_str()),
                ("csrf_token", token.as_str()),
                ("submit", "Submit"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() && !status.is_redirection() {
            return Err(TrackerError::Auth(format!(
                "login form submission returned status {}",
                status.as_u16()
            )));
        }

        let cookie = extract_session_cookie(response.headers()).ok_or_else(|| {
            TrackerError::Auth("login response carried no session cookie".to_string())
        })?;

        tracing::info!("Signed in as {}", self.username);
        Ok(Session {
            cookie,
            obtained_at: Utc::now(),
            valid_until: None,
        })
    }
}

/// Builds request headers embedding the session cookie
fn headers_for(session: &Session) -> Result<HeaderMap, TrackerError> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&session.cookie)
        .map_err(|_| TrackerError::Auth("session cookie is not a valid header value".to_string()))?;
    headers.insert(COOKIE, value);
    Ok(headers)
}

/// Extracts the session cookie pair from set-cookie response headers
///
/// The value is everything from the cookie name up to (not including) the
/// first `;` of that header, e.g. `EduSiteCookie=abc123`. The name must
/// match exactly: at the start of the header or after a separator, and
/// immediately followed by `=`, so a cookie like `XEduSiteCookie=...` is
/// never mistaken for the session.
pub fn extract_session_cookie(headers: &HeaderMap) -> Option<String> {
    for value in headers.get_all(SET_COOKIE) {
        let Ok(text) = value.to_str() else {
            continue;
        };
        if let Some(cookie) = find_cookie_pair(text) {
            return Some(cookie);
        }
    }
    None
}

/// Finds an exact-name session cookie pair within one set-cookie value
fn find_cookie_pair(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut search = 0;

    while let Some(found) = text[search..].find(SESSION_COOKIE) {
        let begin = search + found;
        let after_name = begin + SESSION_COOKIE.len();

        let starts_name = begin == 0
            || matches!(bytes[begin - 1], b' ' | b';' | b',');
        let has_value = bytes.get(after_name) == Some(&b'=');

        if starts_name && has_value {
            let rest = &text[begin..];
            let end = rest.find(';').unwrap_or(rest.len());
            return Some(rest[..end].to_string());
        }
        search = begin + 1;
    }
    None
}
