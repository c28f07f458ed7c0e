//! Google Places details client.

use log::debug;
use tokio_retry::RetryIf;

use super::types::{DetailsResponse, PlaceDetails};
use crate::config::PLACES_DETAIL_FIELDS;
use crate::error_handling::{get_retry_strategy, PlacesError};

/// Thin client over the `details/json` endpoint. Every successful call is billed.
#[derive(Clone)]
pub struct PlacesClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Fetches details for `place_id`, retrying transient failures.
    pub async fn fetch_details(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        RetryIf::start(
            get_retry_strategy(),
            || self.fetch_once(place_id),
            |e: &PlacesError| {
                let retry = e.is_transient();
                if retry {
                    debug!("Retrying Places lookup for {place_id}: {e}");
                }
                retry
            },
        )
        .await
    }

    async fn fetch_once(&self, place_id: &str) -> Result<PlaceDetails, PlacesError> {
        let url = format!("{}/details/json", self.base_url);
        let response: DetailsResponse = self
            .http
            .get(&url)
            .query(&[
                ("place_id", place_id),
                ("fields", PLACES_DETAIL_FIELDS),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.status.as_str(), response.result) {
            ("OK", Some(result)) => Ok(result.into_details(place_id)),
            (status, _) => Err(PlacesError::Api {
                status: status.to_string(),
                message: response.error_message.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httptest::{matchers::*, responders::*, Expectation, Server};
    use serde_json::json;

    fn client_for(server: &Server) -> PlacesClient {
        let base = format!("http://{}/maps/api/place/", server.addr());
        PlacesClient::new(reqwest::Client::new(), &base, "test-key")
    }

    #[tokio::test]
    async fn test_fetch_details_parses_result() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/maps/api/place/details/json"),
                request::query(url_decoded(contains(("place_id", "ChIJ123")))),
                request::query(url_decoded(contains(("key", "test-key")))),
            ])
            .respond_with(json_encoded(json!({
                "status": "OK",
                "result": {
                    "place_id": "ChIJ123",
                    "name": "Amer Centre Deira",
                    "international_phone_number": "+971 4 123 4567",
                    "rating": 4.4,
                    "user_ratings_total": 210,
                    "geometry": {"location": {"lat": 25.26, "lng": 55.32}},
                    "photos": [{"photo_reference": "ref-1"}, {"photo_reference": "ref-2"}],
                    "reviews": [{"author_name": "Sara", "rating": 5, "text": "Quick", "time": 1700000000}]
                }
            }))),
        );

        let details = client_for(&server).fetch_details("ChIJ123").await.unwrap();
        assert_eq!(details.name, "Amer Centre Deira");
        assert_eq!(details.phone.as_deref(), Some("+971 4 123 4567"));
        assert_eq!(details.user_ratings_total, Some(210));
        assert_eq!(details.latitude, Some(25.26));
        assert_eq!(details.photo_references, vec!["ref-1", "ref-2"]);
        assert_eq!(details.reviews[0].author_name, "Sara");
    }

    #[tokio::test]
    async fn test_non_ok_status_is_api_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/maps/api/place/details/json"))
                .times(1)
                .respond_with(json_encoded(json!({
                    "status": "REQUEST_DENIED",
                    "error_message": "The provided API key is invalid."
                }))),
        );

        let err = client_for(&server).fetch_details("x").await.unwrap_err();
        match err {
            PlacesError::Api { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert!(message.contains("invalid"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/maps/api/place/details/json"))
                .times(1 + crate::config::RETRY_MAX_ATTEMPTS)
                .respond_with(status_code(503)),
        );

        let err = client_for(&server).fetch_details("x").await.unwrap_err();
        assert!(matches!(err, PlacesError::Http(_)));
    }
}
