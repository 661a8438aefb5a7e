//! Travel status API client.
//!
//! `GET {base}/trips/{trip}?key={api_key}` returning a JSON [`TripStatus`].
//! Every failure is mapped onto [`FetchError`] so the polling cache can
//! apply its retry policy; nothing is swallowed here.

use std::rc::Rc;
use std::time::Duration;

use deck::poll::{FetchError, FetchFuture, FetchResult, Fetcher};
use futures::FutureExt;
use serde::{Deserialize, Serialize};

const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Live status of one trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripStatus {
    pub trip: String,
    pub destination: String,
    pub status: String,
    #[serde(default)]
    pub eta_minutes: Option<u32>,
}

/// Error envelope some responses carry instead of a status.
#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

#[derive(Clone)]
pub struct TravelApi {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TravelApi {
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self { http, base_url: base_url.trim_end_matches('/').to_string(), api_key: api_key.to_string() })
    }

    /// Fetch the status of `trip`.
    ///
    /// # Errors
    ///
    /// Transport failures, non-success statuses, error envelopes, and bodies
    /// that do not decode each map to their [`FetchError`] variant.
    pub async fn trip_status(&self, trip: &str) -> FetchResult<TripStatus> {
        let url = format!("{}/trips/{trip}", self.base_url);
        let response = self
            .http
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        parse_trip_response(status, &text)
    }

    /// Adapt this client to the polling cache's fetch signature. The cache key is the trip id.
    #[must_use]
    pub fn fetcher(self) -> Fetcher<TripStatus> {
        Rc::new(move |trip: &str| -> FetchFuture<TripStatus> {
            let api = self.clone();
            let trip = trip.to_owned();
            async move { api.trip_status(&trip).await }.boxed_local()
        })
    }
}

pub(crate) fn parse_trip_response(status: u16, body: &str) -> FetchResult<TripStatus> {
    if !(200..300).contains(&status) {
        if let Ok(envelope) = serde_json::from_str::<ApiErrorBody>(body) {
            return Err(FetchError::Api(format!("{status}: {}", envelope.error)));
        }
        return Err(FetchError::Http { status });
    }
    if let Ok(envelope) = serde_json::from_str::<ApiErrorBody>(body) {
        return Err(FetchError::Api(envelope.error));
    }
    serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
