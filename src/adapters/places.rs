use crate::domain::ports::{FindPlaceResponse, PlaceDetailsResponse, PlacesLookup};
use crate::utils::error::{EnrichError, Result};
use crate::utils::logger::redact;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const FIND_FIELDS: &str = "place_id,name,formatted_address,rating,user_ratings_total";
const DETAIL_FIELDS: &str = "url,rating";

/// Client for the Places web service (find-place-from-text and place details).
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GooglePlacesClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!("Places request: {} {:?}", url, params);

        let response = self
            .client
            .get(&url)
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| EnrichError::lookup(redact(&e.to_string(), &self.api_key)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichError::lookup(format!(
                "HTTP {} from {}: {}",
                status,
                path,
                redact(&body, &self.api_key)
            )));
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PlacesLookup for GooglePlacesClient {
    async fn find_place(&self, query: &str) -> Result<FindPlaceResponse> {
        self.get_json(
            "findplacefromtext/json",
            &[
                ("input", query),
                ("inputtype", "textquery"),
                ("fields", FIND_FIELDS),
            ],
        )
        .await
    }

    async fn place_details(&self, place_id: &str) -> Result<PlaceDetailsResponse> {
        self.get_json(
            "details/json",
            &[("place_id", place_id), ("fields", DETAIL_FIELDS)],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client(server: &MockServer) -> GooglePlacesClient {
        GooglePlacesClient::new(&server.url("/place/"), "test-key", Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_find_place_sends_text_query() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/place/findplacefromtext/json")
                .query_param("input", "Blue Door Cafe 12 High St")
                .query_param("inputtype", "textquery")
                .query_param("fields", FIND_FIELDS)
                .query_param("key", "test-key");
            then.status(200).json_body(serde_json::json!({
                "status": "OK",
                "candidates": [
                    {"place_id": "abc", "name": "Blue Door Cafe", "rating": 4.6, "user_ratings_total": 120}
                ]
            }));
        });

        let response = client(&server)
            .find_place("Blue Door Cafe 12 High St")
            .await
            .unwrap();

        api_mock.assert();
        assert!(response.is_ok());
        assert_eq!(response.candidates.len(), 1);
        assert_eq!(response.candidates[0].place_id.as_deref(), Some("abc"));
        assert_eq!(response.candidates[0].rating, Some(4.6));
    }

    #[tokio::test]
    async fn test_place_details() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET)
                .path("/place/details/json")
                .query_param("place_id", "abc")
                .query_param("fields", DETAIL_FIELDS);
            then.status(200).json_body(serde_json::json!({
                "status": "OK",
                "result": {"url": "https://maps.google.com/?cid=1", "rating": 4.5}
            }));
        });

        let response = client(&server).place_details("abc").await.unwrap();

        api_mock.assert();
        let details = response.result.unwrap();
        assert_eq!(details.url.as_deref(), Some("https://maps.google.com/?cid=1"));
        assert_eq!(details.rating, Some(4.5));
    }

    #[tokio::test]
    async fn test_denied_status_is_returned_not_raised() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/place/findplacefromtext/json");
            then.status(200).json_body(serde_json::json!({
                "status": "REQUEST_DENIED",
                "candidates": [],
                "error_message": "The provided API key is invalid."
            }));
        });

        let response = client(&server).find_place("anything").await.unwrap();
        assert!(!response.is_ok());
        assert_eq!(
            response.error_message.as_deref(),
            Some("The provided API key is invalid.")
        );
    }

    #[tokio::test]
    async fn test_http_error_is_lookup_error_without_key() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/place/findplacefromtext/json");
            then.status(500).body("boom for key test-key");
        });

        let err = client(&server).find_place("anything").await.unwrap_err();
        assert!(matches!(err, EnrichError::Lookup { .. }));
        assert!(!err.to_string().contains("test-key"));
    }
}
