//! HTTP client for the cinema REST API

use std::time::Duration;

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{Error, Result};
use crate::wire;

/// Maximum accepted response body (8MB, posters included)
const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

/// REST paths, relative to the base URL
pub mod paths {
    pub const MOVIES: &str = "/api/Movie";
    pub const SCREENINGS: &str = "/api/Screening";
    pub const RESERVATIONS: &str = "/api/Reservation";
    pub const CREATE_RESERVATION: &str = "/api/reservation";
    pub const LOGIN: &str = "/api/Account/login";
    pub const REGISTER: &str = "/api/Account/register";

    pub fn screening(id: i64) -> String {
        format!("/api/screening/{}", id)
    }

    pub fn update_reservation(id: i64) -> String {
        format!("/api/reservation/{}", id)
    }

    pub fn delete_reservation(id: i64) -> String {
        format!("/api/reservations/{}", id)
    }
}

/// Client handle for the cinema backend
///
/// Cheap to clone; clones share the connection pool and cookie store.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` (scheme and host, no trailing `/api`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(Error::InvalidUrl(base_url.to_string()));
        }

        // The backend tracks sign-in with cookies
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET and decode a JSON body
    #[instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        let body = read_body(response).await?;
        wire::decode(&body)
    }

    /// GET raw body bytes; a 404 becomes `None`
    #[instrument(skip(self))]
    pub async fn get_optional(&self, path: &str) -> Result<Option<Vec<u8>>> {
        match self.send(Method::GET, path, None::<&()>).await {
            Ok(response) => Ok(Some(read_body(response).await?)),
            Err(Error::Status { status: 404, .. }) => {
                debug!(path, "Resource not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// GET raw body bytes
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self.send(Method::GET, path, None::<&()>).await?;
        read_body(response).await
    }

    /// Send a JSON body and return the raw response body
    #[instrument(skip(self, body))]
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>> {
        let response = self.send(method, path, Some(body)).await?;
        read_body(response).await
    }

    /// DELETE a resource
    #[instrument(skip(self))]
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, None::<&()>).await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let mut request = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            warn!(%method, path, error = %e, "Request failed");
            Error::Http(e)
        })?;

        check_status(response).await
    }
}

/// Turn non-success statuses into `Error::Status` with the server's message
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string();
    let body = response.text().await.unwrap_or_default();
    let message = wire::error_message(&body, &fallback);

    if status == StatusCode::NOT_FOUND {
        debug!(status = status.as_u16(), %message, "Server returned not found");
    } else {
        warn!(status = status.as_u16(), %message, "Server returned error");
    }

    Err(Error::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_body(response: Response) -> Result<Vec<u8>> {
    if let Some(len) = response.content_length() {
        if len as usize > MAX_BODY_SIZE {
            return Err(Error::Decode(format!(
                "response too large: {} bytes (max {})",
                len, MAX_BODY_SIZE
            )));
        }
    }

    let bytes = response.bytes().await?;
    if bytes.len() > MAX_BODY_SIZE {
        return Err(Error::Decode(format!(
            "response too large: {} bytes (max {})",
            bytes.len(),
            MAX_BODY_SIZE
        )));
    }
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_base_url_validation() {
        assert!(ApiClient::new("ftp://cinema", Duration::from_secs(1)).is_err());
        assert!(ApiClient::new("cinema.local", Duration::from_secs(1)).is_err());

        let client = ApiClient::new("http://localhost:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url(paths::MOVIES), "http://localhost:5000/api/Movie");
    }

    #[test]
    fn test_paths() {
        assert_eq!(paths::screening(3), "/api/screening/3");
        assert_eq!(paths::update_reservation(7), "/api/reservation/7");
        assert_eq!(paths::delete_reservation(7), "/api/reservations/7");
    }

    #[tokio::test]
    async fn test_get_optional_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/screening/9"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        assert!(client.get_optional("/api/screening/9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_status_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/reservation"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "Seat taken"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = client
            .send_json(Method::POST, "/api/reservation", &json!({}))
            .await
            .unwrap_err();

        match err {
            Error::Status { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(message, "Seat taken");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_http_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.get_bytes(paths::MOVIES).await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
