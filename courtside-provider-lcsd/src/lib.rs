//! Provider implementation for the LCSD facility availability open data feed.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use courtside_core::{
    ingest::ingest_json_rows,
    model::{RawTimeslotRecord, SportType},
    ports::{DataProvider, PortError},
};

/// Default base URL of the open data endpoints.
pub const BASE_URL: &str =
    "https://www.smartplay.lcsd.gov.hk/rest/cms/api/v1/publ/contents/open-data";

/// Availability feed of a single sport.
pub struct LcsdProvider {
    client: Client,
    sport: SportType,
    base_url: String,
}

impl LcsdProvider {
    /// Create a provider for `sport` bound to the given HTTP client.
    #[must_use]
    pub fn new(client: Client, sport: SportType) -> Self {
        Self::with_base_url(client, sport, BASE_URL)
    }

    /// Create a provider that talks to a different host, e.g. a mirror.
    #[must_use]
    pub fn with_base_url<S: Into<String>>(client: Client, sport: SportType, base_url: S) -> Self {
        Self {
            client,
            sport,
            base_url: base_url.into(),
        }
    }

    /// Full URL of the dataset file for this provider's sport.
    #[must_use]
    pub fn dataset_url(&self) -> String {
        format!(
            "{}/{}/file",
            self.base_url.trim_end_matches('/'),
            dataset_name(self.sport)
        )
    }
}

#[async_trait]
impl DataProvider for LcsdProvider {
    fn sport(&self) -> SportType {
        self.sport
    }

    async fn fetch_sport_venue_data(&self) -> Result<Vec<RawTimeslotRecord>, PortError> {
        let url = self.dataset_url();
        debug!("Fetching {} availability from {url}", self.sport);

        let rows = fetch_json::<Vec<serde_json::Value>>(self.client.get(&url)).await?;
        let report = ingest_json_rows(rows, self.sport);

        if report.rejected > 0 {
            warn!("Dropped {} malformed {} rows", report.rejected, self.sport);
        }
        info!("Fetched {} {} records", report.records.len(), self.sport);

        Ok(report.records)
    }
}

/// Build the provider for one sport.
#[must_use]
pub fn plugin(client: Client, sport: SportType) -> Arc<dyn DataProvider> {
    Arc::new(LcsdProvider::new(client, sport))
}

/// Build providers for every sport the feed publishes.
#[must_use]
pub fn plugins(client: &Client) -> Vec<Arc<dyn DataProvider>> {
    SportType::ALL
        .into_iter()
        .map(|sport| plugin(client.clone(), sport))
        .collect()
}

/// Dataset path segment of each sport.
fn dataset_name(sport: SportType) -> &'static str {
    match sport {
        SportType::Badminton => "badminton",
        SportType::Basketball => "basketball",
        SportType::Volleyball => "volleyball",
        SportType::TurfSoccerPitch => "turf-soccer-pitch",
        SportType::Tennis => "tennis",
    }
}

// Small helper to fetch and decode JSON with status handling.
async fn fetch_json<T: DeserializeOwned>(req: RequestBuilder) -> Result<T, PortError> {
    req.send()
        .await
        .map_err(PortError::from)?
        .error_for_status()
        .map_err(PortError::from)?
        .json()
        .await
        .map_err(PortError::from)
}
