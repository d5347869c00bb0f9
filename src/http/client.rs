//! Thin wrapper over reqwest that turns HTTP failures into [`LfError`] values.

use log::debug;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{HttpError, LfError, Result};

#[derive(Clone, Debug, Default)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Sends a request and returns the response if its status is 2xx.
    ///
    /// Non-2xx responses become [`LfError::Http`] carrying the status, method,
    /// url and response body. Connection failures become [`LfError::Network`].
    #[tracing::instrument(skip(self, headers, body))]
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Response> {
        debug!("{} {} with query {:?}...", method, url, query);

        let mut request = self.client.request(method.clone(), url).headers(headers);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        check_status(method, response).await
    }

    /// Performs an unauthenticated GET and decodes the JSON body.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .request::<()>(Method::GET, url, HeaderMap::new(), &[], None)
            .await?;
        decode_json(response).await
    }
}

/// Maps a non-2xx response to [`HttpError`], keeping the body for diagnostics.
pub(crate) async fn check_status(method: Method, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let url = response.url().to_string();
    let body = response.text().await.unwrap_or_default();
    debug!("{} {} returned {}", method, url, status);
    Err(HttpError::new(status, method, url, body).into())
}

/// Reads the body of a successful response and deserializes it.
pub(crate) async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let url = response.url().to_string();
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|source| LfError::Decode { url, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpErrorKind;
    use mockito::Matcher;
    use reqwest::StatusCode;
    use reqwest::header::HeaderValue;

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());

        #[derive(serde::Deserialize, Debug, PartialEq)]
        struct TestResponse {
            name: String,
            value: i32,
        }

        let result: TestResponse = client.get_json(&format!("{}/test", url)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_get_json_not_found_keeps_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .with_body(r#"{"message": "not here"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> = client.get_json(&format!("{}/test", url)).await;

        mock.assert_async().await;
        match result {
            Err(LfError::Http(err)) => {
                assert_eq!(err.kind, HttpErrorKind::RecordNotFound);
                assert_eq!(err.status, StatusCode::NOT_FOUND);
                assert_eq!(err.method, Method::GET);
                assert!(err.url.ends_with("/test"));
                assert!(err.body.contains("not here"));
            }
            other => panic!("Expected Http error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_request_maps_each_status() {
        let cases = [
            (400, HttpErrorKind::BadRequest),
            (401, HttpErrorKind::Unauthorized),
            (422, HttpErrorKind::RequestInvalid),
            (429, HttpErrorKind::QuotaSurpassed),
            (502, HttpErrorKind::ServerError),
            (418, HttpErrorKind::Other),
        ];

        let mut server = mockito::Server::new_async().await;
        let client = HttpClient::new(Client::new());

        for (code, kind) in cases {
            let path = format!("/status/{}", code);
            let _m = server
                .mock("POST", path.as_str())
                .with_status(code)
                .create_async()
                .await;

            let err = client
                .request(
                    Method::POST,
                    &format!("{}{}", server.url(), path),
                    HeaderMap::new(),
                    &[],
                    Some(&serde_json::json!({})),
                )
                .await
                .unwrap_err();

            assert_eq!(err.http_kind(), Some(kind), "status {}", code);
        }
    }

    #[tokio::test]
    async fn test_request_sends_headers_query_and_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/things")
            .match_header("x-api-key", "secret")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .match_body(Matcher::Json(serde_json::json!({"a": 1})))
            .with_status(201)
            .with_body("{}")
            .create_async()
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_static("secret"));

        let client = HttpClient::new(Client::new());
        let response = client
            .request(
                Method::POST,
                &format!("{}/things", url),
                headers,
                &[("page", "2")],
                Some(&serde_json::json!({"a": 1})),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_get_json_invalid_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _m = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Result<serde_json::Value> = client.get_json(&format!("{}/broken", url)).await;

        assert!(matches!(result, Err(LfError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let client = HttpClient::new(Client::new());
        // Port 9 (discard) is not expected to be listening locally.
        let result: Result<serde_json::Value> = client.get_json("http://127.0.0.1:9/none").await;

        let err = result.unwrap_err();
        assert!(matches!(err, LfError::Network(_)));
        assert!(err.is_transport());
    }
}
