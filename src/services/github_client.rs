// src/services/github_client.rs
// DOCUMENTATION: GitHub REST API client
// PURPOSE: Resolve an OAuth access token to the GitHub account behind it

use crate::errors::GatewayError;
use crate::models::GitHubUser;
use reqwest::{header, Client, StatusCode};

/// GitHub API client
/// DOCUMENTATION: Only the `/user` endpoint is needed to establish a session
pub struct GitHubClient {
    /// Shared HTTP client
    client: Client,
    /// Base URL, e.g. "https://api.github.com"
    base_url: String,
}

impl GitHubClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the authenticated user for an access token
    ///
    /// # Returns
    /// * `Unauthorized` when GitHub rejects the token
    /// * `ExternalApiError` for any other GitHub failure
    pub async fn current_user(&self, access_token: &str) -> Result<GitHubUser, GatewayError> {
        let url = format!("{}/user", self.base_url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(access_token)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .send()
            .await
            .map_err(|e| {
                log::error!("GitHub API request failed: {}", e);
                GatewayError::ExternalApiError(format!("GitHub request failed: {}", e))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("GitHub rejected access token");
            return Err(GatewayError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("GitHub API error {}: {}", status, body);
            return Err(GatewayError::ExternalApiError(format!(
                "GitHub API error {}",
                status
            )));
        }

        let user: GitHubUser = response.json().await.map_err(|e| {
            log::error!("Failed to parse GitHub user: {}", e);
            GatewayError::ExternalApiError(format!("Parse error: {}", e))
        })?;

        log::debug!("GitHub token resolved to {}", user.login);
        Ok(user)
    }
}
