//! # HTTP JSON source fetcher
//!
//! Issues a single GET with `Accept: application/json`, a fixed 1 second
//! request timeout, and at most one automatic retry on transport-level
//! failure. HTTP-level failures (non-2xx) are never retried; the external
//! scheduler owns higher-level retry policy.

use reqwest::header::ACCEPT;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::error::FetchError;
use crate::constants::{HTTP_FETCH_RETRIES, HTTP_FETCH_TIMEOUT_SECS};

/// Fetch and decode a JSON document from `uri`
pub async fn fetch_json(http: &reqwest::Client, uri: &str) -> Result<Value, FetchError> {
    let mut last_transport_error = String::new();

    for attempt in 0..=HTTP_FETCH_RETRIES {
        match send(http, uri).await {
            Ok(response) => {
                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::SourceRespondedWithFailure(status.as_u16()));
                }
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::SourceUnreachable(format!("{uri}: {e}")))?;
                return serde_json::from_slice(&body)
                    .map_err(|e| FetchError::DecodeFailure(format!("{uri}: {e}")));
            }
            Err(e) => {
                debug!("transport failure fetching {} (attempt {}): {}", uri, attempt + 1, e);
                last_transport_error = e.to_string();
            }
        }
    }

    Err(FetchError::SourceUnreachable(format!(
        "{uri}: {last_transport_error}"
    )))
}

async fn send(http: &reqwest::Client, uri: &str) -> Result<reqwest::Response, reqwest::Error> {
    http.get(uri)
        .header(ACCEPT, "application/json")
        .timeout(Duration::from_secs(HTTP_FETCH_TIMEOUT_SECS))
        .send()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn fetches_and_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
            .expect(1)
            .mount(&server)
            .await;

        let value = fetch_json(&reqwest::Client::new(), &format!("{}/data", server.uri()))
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!({"a": 1}));
    }

    #[tokio::test]
    async fn http_failure_status_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let err = fetch_json(&reqwest::Client::new(), &format!("{}/data", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::SourceRespondedWithFailure(500));
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = fetch_json(&reqwest::Client::new(), &format!("{}/data", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::DecodeFailure(_)));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out_as_unreachable() {
        let server = MockServer::start().await;
        // Past the 1s request timeout on both the initial attempt and the retry
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({}))
                    .set_delay(Duration::from_secs(3)),
            )
            .expect(2)
            .mount(&server)
            .await;

        let err = fetch_json(&reqwest::Client::new(), &format!("{}/data", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SourceUnreachable(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_source_unreachable() {
        // Nothing listens on this port
        let err = fetch_json(&reqwest::Client::new(), "http://127.0.0.1:1/data")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::SourceUnreachable(_)));
    }
}
