use crate::domain::credential::Credential;
use crate::domain::dataset::{Dataset, DatasetSummary, UploadOutcome};
use crate::domain::equipment::EquipmentRecord;
use crate::domain::error::{AppError, Result};
use reqwest::header::AUTHORIZATION;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

/// HTTP client for the `/api` routes. Holds no session: every call carries
/// the credential it should be made with.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    fn url(&self, path: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}api/{}", self.base_url, path)
        } else {
            format!("{}/api/{}", self.base_url, path)
        }
    }

    pub async fn upload_csv(
        &self,
        credential: &Credential,
        filename: &str,
        content: Vec<u8>,
    ) -> Result<UploadOutcome> {
        let request = self
            .client
            .post(self.url("upload"))
            .query(&[("filename", filename)])
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(content);
        self.send(credential, request).await
    }

    pub async fn summary(
        &self,
        credential: &Credential,
        dataset_id: Option<i64>,
    ) -> Result<DatasetSummary> {
        let request = with_dataset(self.client.get(self.url("summary")), dataset_id);
        self.send(credential, request).await
    }

    pub async fn history(&self, credential: &Credential) -> Result<Vec<Dataset>> {
        let request = self.client.get(self.url("history"));
        self.send(credential, request).await
    }

    pub async fn equipment(
        &self,
        credential: &Credential,
        dataset_id: Option<i64>,
    ) -> Result<Vec<EquipmentRecord>> {
        let request = with_dataset(self.client.get(self.url("equipment")), dataset_id);
        self.send(credential, request).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        credential: &Credential,
        request: RequestBuilder,
    ) -> Result<T> {
        let response = request
            .header(AUTHORIZATION, credential.header_value())
            .send()
            .await
            .map_err(|e| AppError::Internal(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_response(status, &text));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse JSON: {}", e)))
    }
}

fn with_dataset(request: RequestBuilder, dataset_id: Option<i64>) -> RequestBuilder {
    match dataset_id {
        Some(id) => request.query(&[("dataset_id", id)]),
        None => request,
    }
}

/// Turn an `{"error": ...}` body back into an error the caller can match on.
fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("API error ({}): {}", status, body));

    match status {
        StatusCode::BAD_REQUEST => AppError::ValidationError(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(
            message
                .trim_start_matches("Unauthorized: ")
                .to_string(),
        ),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        _ => AppError::Internal(message),
    }
}
