//! HTTP API client for the CEV backend
//!
//! Session context travels in a cookie jar shared by every request, so the
//! identity check and the mutating calls see the same login. Mutating
//! requests also echo the `csrftoken` cookie in the `X-CSRFToken` header.

use crate::api::{endpoints, types::*, DatasetApi, StoredSession};
use crate::config::{validate_server_url, Config, DEFAULT_API_TIMEOUT_SECS};
use crate::error::{CliError, Result};
use async_trait::async_trait;
use cev_common::types::{DatasetDetail, DatasetId, DatasetStatistics, DatasetSummary, User};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Cookie the backend stores its CSRF token in.
pub const CSRF_COOKIE: &str = "csrftoken";

/// Header the backend expects the CSRF token in.
pub const CSRF_HEADER: &str = "X-CSRFToken";

pub struct ApiClient {
    client: Client,
    base_url: String,
    origin: Url,
    jar: Arc<Jar>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_API_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let origin = validate_server_url(&base_url)?;
        let jar = Arc::new(Jar::default());

        let client = Client::builder()
            .timeout(timeout)
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            origin,
            jar,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_timeout(
            config.server_url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Load previously exported cookies into the jar.
    pub fn restore_session(&self, stored: &StoredSession) {
        for pair in stored.cookies.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.origin);
        }
    }

    /// Current cookies for this server, for persisting between runs.
    pub fn export_session(&self) -> Option<StoredSession> {
        let header = self.jar.cookies(&self.origin)?;
        let cookies = header.to_str().ok()?.to_string();
        Some(StoredSession {
            server_url: self.base_url.clone(),
            cookies,
        })
    }

    fn cookie(&self, name: &str) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        header
            .to_str()
            .ok()?
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mutating = method != Method::GET;
        let mut builder = self.client.request(method, url);

        if mutating {
            if let Some(token) = self.cookie(CSRF_COOKIE) {
                builder = builder.header(CSRF_HEADER, token);
            }
            // CSRF checks over HTTPS also require a same-origin Referer
            builder = builder.header(REFERER, format!("{}/", self.base_url));
        }

        builder
    }

    /// Send and turn non-2xx answers into [`CliError::Rejected`].
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        debug!(url = %response.url(), status = status.as_u16(), "Response received");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .as_ref()
            .and_then(server_message);

        debug!(status = status.as_u16(), message = ?message, "Request rejected");
        Err(CliError::rejected(status.as_u16(), message))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| CliError::unexpected(e.to_string()))
    }
}

fn is_json(content_type: &str) -> bool {
    content_type
        .parse::<mime::Mime>()
        .map(|m| m.subtype() == mime::JSON || m.suffix() == Some(mime::JSON))
        .unwrap_or(false)
}

#[async_trait]
impl DatasetApi for ApiClient {
    async fn register(&self, profile: &RegisterRequest) -> Result<RegisterResponse> {
        let url = endpoints::register_url(&self.base_url);
        let response = self
            .send(self.request(Method::POST, &url).json(profile))
            .await?;
        let body: RegisterResponse = Self::read_json(response).await?;
        info!(username = %profile.username, "Account registered");
        Ok(body)
    }

    async fn login(&self, credentials: &LoginRequest) -> Result<User> {
        let url = endpoints::login_url(&self.base_url);
        let response = self
            .send(self.request(Method::POST, &url).json(credentials))
            .await?;
        let body: LoginResponse = Self::read_json(response).await?;
        info!(username = %body.user.username, "Logged in");
        Ok(body.user)
    }

    async fn logout(&self) -> Result<()> {
        let url = endpoints::logout_url(&self.base_url);
        self.send(self.request(Method::POST, &url)).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<User> {
        let url = endpoints::current_user_url(&self.base_url);
        let response = self.send(self.request(Method::GET, &url)).await?;
        Self::read_json(response).await
    }

    async fn list_datasets(&self) -> Result<Vec<DatasetSummary>> {
        let url = endpoints::datasets_url(&self.base_url);
        let response = self.send(self.request(Method::GET, &url)).await?;
        let list: DatasetList = Self::read_json(response).await?;
        Ok(list.into_vec())
    }

    async fn get_dataset(&self, id: DatasetId) -> Result<Option<DatasetDetail>> {
        let url = endpoints::dataset_url(&self.base_url, id);
        let response = self.send(self.request(Method::GET, &url)).await?;
        let bytes = response.bytes().await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        serde_json::from_slice::<Option<DatasetDetail>>(&bytes)
            .map_err(|e| CliError::unexpected(e.to_string()))
    }

    async fn get_dataset_summary(&self, id: DatasetId) -> Result<DatasetStatistics> {
        let url = endpoints::dataset_summary_url(&self.base_url, id);
        let response = self.send(self.request(Method::GET, &url)).await?;
        Self::read_json(response).await
    }

    async fn upload_dataset(&self, payload: UploadPayload) -> Result<DatasetSummary> {
        let url = endpoints::upload_url(&self.base_url);
        let size = payload.contents.len();

        let file = Part::bytes(payload.contents)
            .file_name(payload.file_name.clone())
            .mime_str("text/csv")?;
        let form = Form::new().part("file", file).text("name", payload.name);

        debug!(file = %payload.file_name, size, "Uploading dataset");
        let response = self
            .send(self.request(Method::POST, &url).multipart(form))
            .await?;
        let body: UploadResponse = Self::read_json(response).await?;
        info!(dataset_id = %body.dataset.id, "Dataset uploaded");
        Ok(body.dataset)
    }

    async fn get_report(&self, id: DatasetId) -> Result<ReportArtifact> {
        let url = endpoints::report_url(&self.base_url, id);
        let response = self.send(self.request(Method::GET, &url)).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await?.to_vec();

        if content_type.as_deref().is_some_and(is_json) {
            let message = serde_json::from_slice::<serde_json::Value>(&bytes)
                .ok()
                .as_ref()
                .and_then(server_message);
            return Err(CliError::unexpected(message.unwrap_or_else(|| {
                "report endpoint returned JSON instead of a document".to_string()
            })));
        }

        debug!(dataset_id = %id, size = bytes.len(), "Report received");
        Ok(ReportArtifact {
            dataset_id: id,
            bytes,
            content_type,
        })
    }

    async fn delete_dataset(&self, id: DatasetId) -> Result<()> {
        let url = endpoints::dataset_url(&self.base_url, id);
        self.send(self.request(Method::DELETE, &url)).await?;
        info!(dataset_id = %id, "Dataset deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn user_json() -> serde_json::Value {
        json!({"id": 1, "username": "ada", "email": "ada@example.com", "first_name": "Ada", "last_name": ""})
    }

    fn summary_json(id: i64) -> serde_json::Value {
        json!({
            "id": id,
            "name": format!("set-{}", id),
            "uploaded_at": "2024-03-01T09:30:00Z",
            "total_count": 2,
            "avg_flowrate": 1.5,
            "avg_pressure": 2.5,
            "avg_temperature": 70.0
        })
    }

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert!(ApiClient::new("localhost:8000").is_err());
    }

    #[test]
    fn test_session_round_trip() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert!(client.export_session().is_none());

        client.restore_session(&StoredSession {
            server_url: "http://localhost:8000".to_string(),
            cookies: "csrftoken=tok; sessionid=abc".to_string(),
        });

        let exported = client.export_session().unwrap();
        assert!(exported.cookies.contains("sessionid=abc"));
        assert_eq!(client.cookie(CSRF_COOKIE).as_deref(), Some("tok"));
    }

    #[test]
    fn test_is_json() {
        assert!(is_json("application/json"));
        assert!(is_json("application/problem+json"));
        assert!(!is_json("application/pdf"));
        assert!(!is_json("garbage"));
    }

    #[tokio::test]
    async fn test_login_cookie_is_sent_back_with_csrf_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "csrftoken=tok123; Path=/")
                    .set_body_json(json!({"message": "Login successful", "user": user_json()})),
            )
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/auth/logout/"))
            .and(header(CSRF_HEADER, "tok123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Logout successful"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let user = client
            .login(&LoginRequest {
                username: "ada".to_string(),
                password: "secret-pass".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.username, "ada");

        client.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejection_carries_server_message() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/auth/login/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let err = client
            .login(&LoginRequest {
                username: "ada".to_string(),
                password: "wrong".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            CliError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message.as_deref(), Some("Invalid credentials"));
            },
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_without_json_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/datasets/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let err = client.list_datasets().await.unwrap_err();
        assert!(matches!(err, CliError::Rejected { status: 502, message: None }));
    }

    #[tokio::test]
    async fn test_list_datasets_normalizes_both_shapes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasets/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 1, "results": [summary_json(4)]})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let datasets = client.list_datasets().await.unwrap();
        assert_eq!(datasets.len(), 1);
        assert_eq!(datasets[0].id, DatasetId(4));

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasets/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([summary_json(1), summary_json(2)])))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        assert_eq!(client.list_datasets().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_dataset_empty_body_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasets/9/"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        assert!(client.get_dataset(DatasetId(9)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upload_sends_multipart_file_and_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/datasets/upload/"))
            .and(body_string_contains("filename=\"plant.csv\""))
            .and(body_string_contains("Plant North"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "message": "File uploaded and processed successfully",
                "dataset": summary_json(42)
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let dataset = client
            .upload_dataset(UploadPayload {
                file_name: "plant.csv".to_string(),
                contents: b"Equipment Name,Type,Flowrate,Pressure,Temperature\n".to_vec(),
                name: "Plant North".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(dataset.id, DatasetId(42));
    }

    #[tokio::test]
    async fn test_report_bytes_and_json_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/datasets/3/report/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "application/pdf")
                    .set_body_bytes(b"%PDF-1.4 fake".to_vec()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/datasets/4/report/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Error generating report"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();

        let report = client.get_report(DatasetId(3)).await.unwrap();
        assert_eq!(report.bytes, b"%PDF-1.4 fake".to_vec());
        assert_eq!(report.content_type.as_deref(), Some("application/pdf"));

        let err = client.get_report(DatasetId(4)).await.unwrap_err();
        assert!(err.to_string().contains("Error generating report"));
    }

    #[tokio::test]
    async fn test_delete_dataset() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/datasets/8/"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        client.delete_dataset(DatasetId(8)).await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = client.current_user().await.unwrap_err();
        assert!(matches!(err, CliError::Http(_)));
    }
}
