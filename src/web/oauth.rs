use anyhow::{Context, Result};
use serde::Deserialize;

const AUTHORIZE_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
const USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Client-side half of the Google OAuth flow: build the authorize URL,
/// exchange the callback code for an access token, fetch email and name.
pub struct GoogleOAuth {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    token_endpoint: String,
    userinfo_endpoint: String,
    http: reqwest::Client,
}

/// What the provider vouches for: enough to match or create a local account.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthIdentity {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl GoogleOAuth {
    pub fn new(client_id: String, client_secret: String, redirect_url: String) -> Self {
        Self {
            client_id,
            client_secret,
            redirect_url,
            token_endpoint: TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: USERINFO_ENDPOINT.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Point the token and userinfo calls somewhere else (a stub server).
    pub fn with_endpoints(mut self, token: impl Into<String>, userinfo: impl Into<String>) -> Self {
        self.token_endpoint = token.into();
        self.userinfo_endpoint = userinfo.into();
        self
    }

    /// URL to send the browser to for consent.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}?response_type=code&client_id={}&redirect_uri={}&scope=openid%20email%20profile&state={}",
            AUTHORIZE_ENDPOINT,
            urlencode(&self.client_id),
            urlencode(&self.redirect_url),
            urlencode(state),
        )
    }

    /// Exchange the authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<String> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_url.as_str()),
        ];

        let response: TokenResponse = self
            .http
            .post(&self.token_endpoint)
            .form(&params)
            .send()
            .await
            .context("Token endpoint unreachable")?
            .error_for_status()
            .context("Token exchange rejected")?
            .json()
            .await
            .context("Invalid token response")?;

        Ok(response.access_token)
    }

    /// Fetch the email/name the provider associates with the token.
    pub async fn fetch_identity(&self, access_token: &str) -> Result<OAuthIdentity> {
        self.http
            .get(&self.userinfo_endpoint)
            .bearer_auth(access_token)
            .send()
            .await
            .context("Userinfo endpoint unreachable")?
            .error_for_status()
            .context("Userinfo request rejected")?
            .json()
            .await
            .context("Invalid userinfo response")
    }
}

/// Percent-encode a query component. Only the characters that survive
/// unescaped in RFC 3986 are passed through.
fn urlencode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorize_url_contains_parameters() {
        let oauth = GoogleOAuth::new(
            "client-123".into(),
            "secret".into(),
            "http://localhost:8080/api/oauth/google/callback".into(),
        );
        let url = oauth.authorize_url("xyzzy");
        assert!(url.starts_with(AUTHORIZE_ENDPOINT));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=xyzzy"));
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A8080%2Fapi%2Foauth%2Fgoogle%2Fcallback"
        ));
    }

    #[test]
    fn test_urlencode() {
        assert_eq!(urlencode("abc-123_~.ok"), "abc-123_~.ok");
        assert_eq!(urlencode("a b&c"), "a%20b%26c");
    }
}
