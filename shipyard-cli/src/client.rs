//! HTTP client for the Shipyard REST API.

use std::error::Error;
use std::fmt;

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use shipyard_core::{Ship, ShipPatch, ShipQuery};

use crate::CliResult;

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Non-success response from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: StatusCode,
    /// Server-provided message, or the raw body when it was not JSON.
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "server returned {}: {}", self.status, self.message)
    }
}

impl Error for ApiError {}

/// Thin wrapper over the `/rest/ships` endpoints.
pub struct ShipyardClient {
    client: Client,
    base_url: String,
}

impl ShipyardClient {
    /// Build a client for the server at `base_url`.
    pub fn new(base_url: &str) -> CliResult<Self> {
        let client = Client::builder().user_agent("shipyard-cli").build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/ships{path}", self.base_url)
    }

    /// Fetch one page of ships.
    pub async fn list(&self, query: &ShipQuery) -> CliResult<Vec<Ship>> {
        let response = self.client.get(self.url("")).query(query).send().await?;
        decode(response).await
    }

    /// Count ships matching the query filters.
    pub async fn count(&self, query: &ShipQuery) -> CliResult<u64> {
        let response = self
            .client
            .get(self.url("/count"))
            .query(query)
            .send()
            .await?;
        decode(response).await
    }

    /// Fetch a ship by identifier.
    pub async fn get(&self, id: i64) -> CliResult<Ship> {
        let response = self.client.get(self.url(&format!("/{id}"))).send().await?;
        decode(response).await
    }

    /// Create a ship.
    pub async fn create(&self, draft: &ShipPatch) -> CliResult<Ship> {
        let response = self.client.post(self.url("")).json(draft).send().await?;
        decode(response).await
    }

    /// Update the supplied fields of a ship.
    pub async fn update(&self, id: i64, patch: &ShipPatch) -> CliResult<Ship> {
        let response = self
            .client
            .post(self.url(&format!("/{id}")))
            .json(patch)
            .send()
            .await?;
        decode(response).await
    }

    /// Delete a ship.
    pub async fn delete(&self, id: i64) -> CliResult<()> {
        let response = self
            .client
            .delete(self.url(&format!("/{id}")))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> CliResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|error| error.message)
        .unwrap_or(body);
    Err(ApiError { status, message }.into())
}

async fn decode<T: DeserializeOwned>(response: Response) -> CliResult<T> {
    Ok(check(response).await?.json::<T>().await?)
}
