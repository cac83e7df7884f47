//! Ticket issuance against the repository's session endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::RepositoryConfig;
use crate::metrics::TICKET_FAILURES;

use super::{AuthTicket, Principal, TicketError, TicketProvider};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    id: String,
    #[serde(default)]
    user_id: Option<String>,
}

/// Obtains tickets via `POST {url}/session/log-in`.
pub struct RepositoryTicketProvider {
    client: Client,
    base_url: String,
    api_key: String,
    api_key_header: String,
}

impl RepositoryTicketProvider {
    pub fn new(config: &RepositoryConfig) -> Result<Self, TicketError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.login_timeout_secs as u64))
            .build()
            .map_err(|e| TicketError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_key_header: config.api_key_header.clone(),
        })
    }

    async fn request_ticket(&self, principal: &Principal) -> Result<AuthTicket, TicketError> {
        let url = format!("{}/session/log-in", self.base_url);
        debug!(user_id = %principal.user_id, "Requesting repository ticket");

        let response = self
            .client
            .post(&url)
            .header(self.api_key_header.as_str(), self.api_key.as_str())
            .json(&LoginRequest {
                user_id: &principal.user_id,
                password: &principal.password,
            })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TicketError::Timeout
                } else {
                    TicketError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(TicketError::Rejected(format!("HTTP {}", status)));
        }
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(TicketError::Unavailable(format!(
                "HTTP {}: {}",
                status,
                body.chars().take(200).collect::<String>()
            )));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| TicketError::InvalidResponse(e.to_string()))?;

        if login.id.trim().is_empty() {
            return Err(TicketError::InvalidResponse(
                "ticket id is empty".to_string(),
            ));
        }

        debug!(
            user_id = login.user_id.as_deref().unwrap_or(principal.user_id.as_str()),
            "Repository ticket issued"
        );
        Ok(AuthTicket::new(login.id))
    }
}

#[async_trait]
impl TicketProvider for RepositoryTicketProvider {
    async fn authenticate(&self, principal: &Principal) -> Result<AuthTicket, TicketError> {
        let result = self.request_ticket(principal).await;
        if let Err(ref e) = result {
            TICKET_FAILURES.inc();
            error!(user_id = %principal.user_id, error = %e, "Failed to obtain repository ticket");
        }
        result
    }

    fn name(&self) -> &'static str {
        "repository"
    }
}
