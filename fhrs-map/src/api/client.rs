//! HTTP client of the establishment search endpoint.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::{Client, Url};

use super::normalize::parse_response;
use super::EstablishmentSource;
use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::establishment::Establishment;
use crate::query::EstablishmentQuery;

/// Loads establishments from the food hygiene ratings web API.
#[derive(Debug, Clone)]
pub struct FhrsClient {
    client: Client,
    base_url: Url,
    headers: HeaderMap,
}

impl FhrsClient {
    /// Creates a client with its own connection pool.
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        Self::with_client(Client::new(), config)
    }

    /// Creates a client sharing the given `reqwest` client.
    pub fn with_client(client: Client, config: &ApiConfig) -> Result<Self, FetchError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| FetchError::InvalidEndpoint(config.base_url.clone()))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-version",
            HeaderValue::from_str(&config.api_version)
                .map_err(|_| FetchError::InvalidEndpoint(config.base_url.clone()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|_| FetchError::InvalidEndpoint(config.base_url.clone()))?,
        );

        Ok(Self {
            client,
            base_url,
            headers,
        })
    }

    /// Full request URL of the query.
    pub fn request_url(&self, query: &EstablishmentQuery) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut()
            .extend_pairs(query.params().iter().map(|(name, value)| (*name, value.as_str())));
        url
    }

    /// Headers sent with every request.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

#[async_trait::async_trait]
impl EstablishmentSource for FhrsClient {
    async fn search(&self, query: &EstablishmentQuery) -> Result<Vec<Establishment>, FetchError> {
        let url = self.request_url(query);
        log::debug!("Requesting establishments: {url}");

        let response = self
            .client
            .get(url.clone())
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("✗ Establishment search failed with HTTP {status}: {url}");
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await?;
        log::debug!("✓ Downloaded {} bytes from: {url}", body.len());

        let establishments = parse_response(&body)?;
        log::info!("Loaded {} establishments", establishments.len());

        Ok(establishments)
    }
}
