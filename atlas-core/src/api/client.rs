//! ``src/api/client.rs``
//! ============================================================================
//! # Remote country API
//!
//! [`CountryApi`] is the seam between the view pipeline and the network.
//! [`RestCountriesClient`] talks to REST Countries v3.1 over reqwest; tests
//! and demos plug in `ScriptedApi` instead.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::{AppError, FetchError};
use crate::model::country::{Country, CountryCode, CountryNameEntry};

/// Fields requested by the bulk listing.
pub const LIST_FIELDS: &str = "name,flags,flag,cca3,population,region,capital";

/// Fields requested by the single-country lookup.
pub const DETAIL_FIELDS: &str =
    "name,flags,flag,cca3,population,region,subregion,capital,tld,currencies,languages,borders";

/// Fields requested by the border-name batch lookup.
pub const NAME_FIELDS: &str = "cca3,name";

const USER_AGENT_VALUE: &str = concat!("atlas/", env!("CARGO_PKG_VERSION"));

/// Read-only operations the application needs from the country service.
#[async_trait]
pub trait CountryApi: Send + Sync {
    /// Bulk listing of every country.
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError>;

    /// Full record for one country.
    async fn fetch_detail(&self, code: &CountryCode) -> Result<Country, FetchError>;

    /// Names for a batch of codes. Unknown codes are simply absent.
    async fn fetch_names(&self, codes: &[CountryCode]) -> Result<Vec<CountryNameEntry>, FetchError>;
}

/// The alpha endpoint answers with an object when `fields` is given and with
/// a one-element array otherwise; accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(Box<Country>),
    Many(Vec<Country>),
}

/// reqwest-backed client for REST Countries.
#[derive(Debug, Clone)]
pub struct RestCountriesClient {
    client: reqwest::Client,
    base: Url,
}

impl RestCountriesClient {
    /// Creates a client rooted at `base_url` (e.g. `https://restcountries.com/v3.1`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let base =
            Url::parse(base_url).map_err(|e| AppError::invalid_base_url(base_url, e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(AppError::invalid_base_url(base_url, "not a hierarchical URL"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpClient(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, base })
    }

    /// `base` + path segments + query pairs, each properly escaped.
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        let endpoint = url.path().to_string();
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::transport(&endpoint, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %endpoint, status = status.as_u16(), "Non-success response");
            return Err(FetchError::status(endpoint, status.as_u16()));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::decode(endpoint, e.to_string()))
    }
}

#[async_trait]
impl CountryApi for RestCountriesClient {
    #[instrument(level = "debug", skip(self))]
    async fn fetch_all(&self) -> Result<Vec<Country>, FetchError> {
        let url = self.endpoint(&["all"], &[("fields", LIST_FIELDS)]);
        self.get_json(url).await
    }

    #[instrument(level = "debug", skip(self, code), fields(code = %code))]
    async fn fetch_detail(&self, code: &CountryCode) -> Result<Country, FetchError> {
        let url = self.endpoint(&["alpha", code.as_str()], &[("fields", DETAIL_FIELDS)]);
        match self.get_json::<OneOrMany>(url).await {
            Ok(OneOrMany::One(country)) => Ok(*country),
            Ok(OneOrMany::Many(list)) => list
                .into_iter()
                .next()
                .ok_or_else(|| FetchError::NotFound(code.to_string())),
            Err(FetchError::Status { status: 404, .. }) => {
                Err(FetchError::NotFound(code.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(level = "debug", skip(self, codes), fields(count = codes.len()))]
    async fn fetch_names(&self, codes: &[CountryCode]) -> Result<Vec<CountryNameEntry>, FetchError> {
        let joined = codes
            .iter()
            .map(CountryCode::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let url = self.endpoint(&["alpha"], &[("codes", joined.as_str()), ("fields", NAME_FIELDS)]);
        self.get_json(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> RestCountriesClient {
        RestCountriesClient::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments_and_query() {
        let c = client("https://restcountries.com/v3.1");
        let url = c.endpoint(&["alpha", "FRA"], &[("fields", "cca3,name")]);
        assert_eq!(url.path(), "/v3.1/alpha/FRA");
        assert_eq!(
            url.query_pairs().next().map(|(k, v)| (k.into_owned(), v.into_owned())),
            Some(("fields".to_string(), "cca3,name".to_string()))
        );
    }

    #[test]
    fn test_endpoint_tolerates_trailing_slash() {
        let c = client("http://localhost:9000/v3.1/");
        assert_eq!(c.endpoint(&["all"], &[]).path(), "/v3.1/all");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(RestCountriesClient::new("not a url", Duration::from_secs(1)).is_err());
        assert!(RestCountriesClient::new("mailto:someone@example.com", Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_one_or_many_accepts_both_shapes() {
        let one: OneOrMany =
            serde_json::from_str(r#"{"name":{"common":"Peru"},"cca3":"PER"}"#).unwrap();
        assert!(matches!(one, OneOrMany::One(c) if c.code.as_str() == "PER"));

        let many: OneOrMany =
            serde_json::from_str(r#"[{"name":{"common":"Peru"},"cca3":"PER"}]"#).unwrap();
        assert!(matches!(many, OneOrMany::Many(v) if v.len() == 1));
    }
}
