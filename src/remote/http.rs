//! reqwest implementation of the ticket service REST contract.
//!
//! Endpoints (relative to the configured API base):
//!
//! - `GET   tickets/?category=&priority=&status=&search=`
//! - `POST  tickets/`
//! - `PATCH tickets/{id}/`
//! - `GET   tickets/stats/`
//! - `POST  tickets/classify/`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::Config;
use crate::error::{Result, TicketDeskError};
use crate::sync::filter::FilterCriteria;
use crate::types::{ClassificationSuggestion, Ticket, TicketId, TicketStats};

use super::error::{error_from_response, error_from_transport};
use super::{NewTicket, TicketService, TicketUpdate};

/// Connect timeout, capped by the overall request timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct HttpTicketService {
    client: Client,
    base: Url,
}

impl HttpTicketService {
    /// Create a service client from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()?;

        Ok(Self {
            client,
            base: config.api_base()?,
        })
    }

    /// Create a service client for a base URL with default timeouts
    pub fn new(api_url: &str) -> Result<Self> {
        let config = Config {
            api_url: api_url.to_string(),
            ..Config::default()
        };
        Self::from_config(&config)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| TicketDeskError::Config(format!("invalid endpoint '{path}': {e}")))
    }

    fn tickets_url(&self, criteria: &FilterCriteria) -> Result<Url> {
        let mut url = self.endpoint("tickets/")?;
        let params = criteria.query_pairs();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(error_from_transport)?;
        decode(response).await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<T> {
        tracing::debug!(%url, %method, "sending");
        let response = self
            .client
            .request(method, url)
            .json(body)
            .send()
            .await
            .map_err(error_from_transport)?;
        decode(response).await
    }
}

/// Decode a success body, or map the failure to the error taxonomy
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(error_from_response(status, &body));
    }
    response.json::<T>().await.map_err(error_from_transport)
}

#[async_trait]
impl TicketService for HttpTicketService {
    async fn list_tickets(&self, criteria: &FilterCriteria) -> Result<Vec<Ticket>> {
        let url = self.tickets_url(criteria)?;
        self.get_json(url).await
    }

    async fn create_ticket(&self, ticket: &NewTicket) -> Result<Ticket> {
        let url = self.endpoint("tickets/")?;
        self.send_json(reqwest::Method::POST, url, ticket).await
    }

    async fn update_ticket(&self, id: TicketId, update: &TicketUpdate) -> Result<Ticket> {
        let url = self.endpoint(&format!("tickets/{id}/"))?;
        self.send_json(reqwest::Method::PATCH, url, update).await
    }

    async fn fetch_stats(&self) -> Result<TicketStats> {
        let url = self.endpoint("tickets/stats/")?;
        self.get_json(url).await
    }

    async fn classify(&self, description: &str) -> Result<ClassificationSuggestion> {
        #[derive(Serialize)]
        struct ClassifyRequest<'a> {
            description: &'a str,
        }

        let url = self.endpoint("tickets/classify/")?;
        self.send_json(reqwest::Method::POST, url, &ClassifyRequest { description })
            .await
            .map_err(|e| match e {
                TicketDeskError::ClassificationUnavailable(_) => e,
                other => TicketDeskError::ClassificationUnavailable(other.to_string()),
            })
    }
}
