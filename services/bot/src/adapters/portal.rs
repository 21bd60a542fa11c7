//! services/bot/src/adapters/portal.rs
//!
//! This module contains the portal adapter, the concrete implementation of
//! the `PortalService` port. It impersonates a browser session against the
//! academic portal's ASP.NET login form: fetch the anti-forgery token, POST
//! the credentials, then pull the student-info page on the same cookie jar.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::StatusCode;
use scraper::{Html, Selector};
use std::time::Duration;
use studygate_core::domain::PortalCredentials;
use studygate_core::ports::{LoginOutcome, PortError, PortResult, PortalService};
use tracing::{debug, warn};

/// Name of the hidden input that carries the anti-forgery token.
const TOKEN_FIELD: &str = "__RequestVerificationToken";
/// Literal marker the portal renders on a failed login (HTTP 200 either way).
const INVALID_LOGIN_MARKER: &str = "Invalid login attempt";

const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// A portal adapter that implements the `PortalService` port.
///
/// The struct itself holds only URLs; every `login` call builds its own
/// `reqwest::Client` with a private cookie store, so concurrent attempts for
/// different users can never see each other's authenticated cookies.
#[derive(Clone)]
pub struct PortalClient {
    base_url: String,
    login_url: String,
    student_info_url: String,
}

impl PortalClient {
    pub fn new(base_url: String, login_url: String, student_info_url: String) -> Self {
        Self {
            base_url,
            login_url,
            student_info_url,
        }
    }

    fn attempt_client(&self) -> PortResult<reqwest::Client> {
        reqwest::Client::builder()
            .cookie_store(true)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| PortError::Network(e.to_string()))
    }

    /// GETs the login page and pulls a fresh anti-forgery token out of it.
    ///
    /// Tokens are scoped to one page load, so this runs once per attempt and
    /// the result is never cached.
    async fn fetch_login_token(&self, client: &reqwest::Client) -> PortResult<String> {
        let response = client
            .get(&self.login_url)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(PortError::Network(format!(
                "login page returned {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        parse_login_token(&body).ok_or_else(|| {
            warn!("login page did not contain the {} field", TOKEN_FIELD);
            PortError::Parse(format!("missing {} input", TOKEN_FIELD))
        })
    }

    /// GETs the student-info page, relying on the cookies `authenticate`
    /// established on this client.
    async fn fetch_profile_page(&self, client: &reqwest::Client) -> PortResult<String> {
        let response = client
            .get(&self.student_info_url)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;
        if response.status() != StatusCode::OK {
            return Err(PortError::Network(format!(
                "student info page returned {}",
                response.status()
            )));
        }
        response
            .text()
            .await
            .map_err(|e| PortError::Network(e.to_string()))
    }
}

#[async_trait]
impl PortalService for PortalClient {
    async fn login(&self, credentials: &PortalCredentials) -> PortResult<LoginOutcome> {
        // Isolated session per attempt.
        let client = self.attempt_client()?;

        let token = self.fetch_login_token(&client).await?;
        debug!("fetched anti-forgery token ({} chars)", token.len());

        let form = [
            ("Email", credentials.email.as_str()),
            ("Password", credentials.password.as_str()),
            (TOKEN_FIELD, token.as_str()),
            ("RememberMe", "false"),
        ];
        let response = client
            .post(&self.login_url)
            .header(REFERER, &self.login_url)
            .header(ORIGIN, &self.base_url)
            .header(ACCEPT, ACCEPT_VALUE)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE)
            .form(&form)
            .send()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PortError::Network(e.to_string()))?;

        if !login_succeeded(status, &body) {
            warn!(
                "portal rejected login, status {} body starts: {}",
                status,
                snippet(&body, 200)
            );
            return Ok(LoginOutcome::InvalidCredentials);
        }

        let profile_page = self.fetch_profile_page(&client).await?;
        Ok(LoginOutcome::Authenticated { profile_page })
    }
}

/// Extracts the anti-forgery token value from the login page HTML.
pub fn parse_login_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[name="__RequestVerificationToken"]"#)
        .expect("static selector");
    document
        .select(&selector)
        .find_map(|input| input.value().attr("value"))
        .map(str::to_string)
}

/// Classifies the credential POST response.
pub fn login_succeeded(status: StatusCode, body: &str) -> bool {
    status == StatusCode::OK && !body.contains(INVALID_LOGIN_MARKER)
}

/// Truncated, char-boundary-safe body excerpt for diagnostics.
fn snippet(body: &str, max: usize) -> &str {
    let mut end = body.len().min(max);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
