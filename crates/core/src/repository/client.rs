//! HTTP client for the document repository.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex_lite::Regex;
use reqwest::{header, multipart, Client, RequestBuilder, Response, StatusCode};
use tracing::{debug, info, warn};

use crate::config::RepositoryConfig;
use crate::filetype;
use crate::metrics::REPOSITORY_REQUEST_DURATION;
use crate::ticket::AuthTicket;

use super::types::Envelope;
use super::{
    DownloadedFile, ListFilter, RepositoryDocument, RepositoryError, RepositoryGateway,
    StoreRequest,
};

static QUOTED_FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"filename="([^"]+)""#).unwrap());
static BARE_FILENAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"filename=([^;]+)").unwrap());

/// Stateless repository client. Holds configuration only, never a ticket.
pub struct HttpRepositoryGateway {
    client: Client,
    base_url: String,
    api_key: String,
    api_key_header: String,
}

impl HttpRepositoryGateway {
    pub fn new(config: &RepositoryConfig) -> Result<Self, RepositoryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_key_header: config.api_key_header.clone(),
        })
    }

    /// Attach the ticket and service API key.
    fn authorized(&self, builder: RequestBuilder, ticket: &AuthTicket) -> RequestBuilder {
        builder
            .header(header::AUTHORIZATION, format!("Basic {}", ticket.as_str()))
            .header(self.api_key_header.as_str(), self.api_key.as_str())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, RepositoryError> {
        builder.send().await.map_err(RepositoryError::from_reqwest)
    }

    /// Turn non-success statuses into [`RepositoryError::Api`].
    async fn ensure_success(response: Response) -> Result<Response, RepositoryError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Repository request failed");
        Err(RepositoryError::Api {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }

    async fn do_store(
        &self,
        request: StoreRequest,
        ticket: &AuthTicket,
    ) -> Result<RepositoryDocument, RepositoryError> {
        let url = format!("{}/file-upload", self.base_url);
        let file_name = request.file_name.clone();

        let part = multipart::Part::bytes(request.content)
            .file_name(request.file_name)
            .mime_str(&request.mime_type)
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;
        let form = multipart::Form::new()
            .part("file", part)
            .text("properties", request.properties_json);

        debug!(file_name = %file_name, "Uploading document to repository");
        let response = self
            .send(self.authorized(self.client.post(&url), ticket).multipart(form))
            .await?;
        let response = Self::ensure_success(response).await?;

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| RepositoryError::InvalidResponse(e.to_string()))?;

        info!(id = %envelope.entry.id, file_name = %file_name, "Document stored in repository");
        Ok(envelope.entry)
    }

    async fn do_list(
        &self,
        filter: &ListFilter,
        ticket: &AuthTicket,
    ) -> Result<Vec<RepositoryDocument>, RepositoryError> {
        let url = format!("{}/files", self.base_url);
        debug!(filter_keys = filter.len(), "Listing repository documents");

        let response = self
            .send(self.authorized(self.client.post(&url), ticket).json(filter))
            .await?;
        let response = Self::ensure_success(response).await?;

        let entries: Vec<Envelope> = response
            .json()
            .await
            .map_err(|e| RepositoryError::InvalidResponse(e.to_string()))?;

        Ok(entries.into_iter().map(|e| e.entry).collect())
    }

    async fn do_fetch(
        &self,
        id: &str,
        ticket: &AuthTicket,
    ) -> Result<DownloadedFile, RepositoryError> {
        let url = format!(
            "{}/file-download?idFile={}",
            self.base_url,
            urlencoding::encode(id)
        );
        debug!(id = %id, "Downloading document from repository");

        let response = self
            .send(self.authorized(self.client.post(&url), ticket))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::not_found(id));
        }
        let response = Self::ensure_success(response).await?;

        let file_name = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(file_name_from_disposition)
            .unwrap_or_else(|| format!("document_{}", id));
        let declared_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());

        let content = response
            .bytes()
            .await
            .map_err(RepositoryError::from_reqwest)?
            .to_vec();

        let mime_type = match filetype::detect(&content) {
            filetype::FileType::Unknown => declared_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| filetype::OCTET_STREAM_MIME.to_string()),
            detected => detected.mime_type().to_string(),
        };

        info!(id = %id, file_name = %file_name, bytes = content.len(), "Document fetched from repository");
        Ok(DownloadedFile {
            content,
            file_name,
            mime_type,
        })
    }
}

/// Extract the file name from a `Content-Disposition` header value.
pub fn file_name_from_disposition(value: &str) -> Option<String> {
    QUOTED_FILENAME_RE
        .captures(value)
        .or_else(|| BARE_FILENAME_RE.captures(value))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().trim_matches('"').to_string())
        .filter(|name| !name.is_empty())
}

fn observe<T>(operation: &str, start: Instant, result: &Result<T, RepositoryError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(RepositoryError::NotFound { .. }) => "not_found",
        Err(RepositoryError::Timeout) => "timeout",
        Err(_) => "error",
    };
    REPOSITORY_REQUEST_DURATION
        .with_label_values(&[operation, outcome])
        .observe(start.elapsed().as_secs_f64());
}

#[async_trait]
impl RepositoryGateway for HttpRepositoryGateway {
    async fn store(
        &self,
        request: StoreRequest,
        ticket: &AuthTicket,
    ) -> Result<RepositoryDocument, RepositoryError> {
        let start = Instant::now();
        let result = self.do_store(request, ticket).await;
        observe("store", start, &result);
        result
    }

    async fn list(
        &self,
        filter: &ListFilter,
        ticket: &AuthTicket,
    ) -> Result<Vec<RepositoryDocument>, RepositoryError> {
        let start = Instant::now();
        let result = self.do_list(filter, ticket).await;
        observe("list", start, &result);
        result
    }

    async fn fetch(
        &self,
        id: &str,
        ticket: &AuthTicket,
    ) -> Result<DownloadedFile, RepositoryError> {
        let start = Instant::now();
        let result = self.do_fetch(id, ticket).await;
        observe("fetch", start, &result);
        result
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn gateway(url: String) -> HttpRepositoryGateway {
        HttpRepositoryGateway::new(&RepositoryConfig {
            url: format!("{}/", url),
            api_key: "svc-key".to_string(),
            api_key_header: "x-api-key".to_string(),
            timeout_secs: 5,
            login_timeout_secs: 5,
        })
        .unwrap()
    }

    fn ticket() -> AuthTicket {
        AuthTicket::new("TICKET_1")
    }

    #[test]
    fn test_file_name_from_disposition() {
        assert_eq!(
            file_name_from_disposition(r#"attachment; filename="contrato marco.pdf""#),
            Some("contrato marco.pdf".to_string())
        );
        assert_eq!(
            file_name_from_disposition("attachment; filename=scan.png; size=10"),
            Some("scan.png".to_string())
        );
        assert_eq!(
            file_name_from_disposition(r#"attachment; filename="acta;2024.pdf""#),
            Some("acta;2024.pdf".to_string())
        );
        assert_eq!(file_name_from_disposition("inline"), None);
    }

    #[tokio::test]
    async fn test_store_sends_multipart_with_ticket() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/file-upload")
            .match_header("authorization", "Basic TICKET_1")
            .match_header("x-api-key", "svc-key")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data; boundary=.*".to_string()),
            )
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="file"; filename="c.pdf""#.to_string()),
                Matcher::Regex(r#"name="properties""#.to_string()),
                Matcher::Regex("20218874-5".to_string()),
            ]))
            .with_status(201)
            .with_body(r#"{"entry":{"id":"node-1","name":"c.pdf","properties":{}}}"#)
            .create_async()
            .await;

        let doc = gateway(server.url())
            .store(
                StoreRequest {
                    content: b"%PDF-1.4".to_vec(),
                    file_name: "c.pdf".to_string(),
                    mime_type: "application/pdf".to_string(),
                    properties_json: r#"{"dms:client-tax-id":"20218874-5"}"#.to_string(),
                },
                &ticket(),
            )
            .await
            .unwrap();

        assert_eq!(doc.id, "node-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_store_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/file-upload")
            .with_status(500)
            .with_body("internal failure")
            .create_async()
            .await;

        let err = gateway(server.url())
            .store(
                StoreRequest {
                    content: b"%PDF".to_vec(),
                    file_name: "c.pdf".to_string(),
                    mime_type: "application/pdf".to_string(),
                    properties_json: "{}".to_string(),
                },
                &ticket(),
            )
            .await
            .unwrap_err();

        assert!(
            matches!(err, RepositoryError::Api { status: 500, ref body } if body == "internal failure")
        );
    }

    #[tokio::test]
    async fn test_list_posts_filter_and_unwraps_entries() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/files")
            .match_body(Matcher::Json(serde_json::json!({"dms:client-tax-id": "1-9"})))
            .with_status(200)
            .with_body(
                r#"[{"entry":{"id":"a","name":"a.pdf"}},{"entry":{"id":"b","name":"b.png"}}]"#,
            )
            .create_async()
            .await;

        let mut filter = ListFilter::new();
        filter.insert("dms:client-tax-id".to_string(), "1-9".into());

        let docs = gateway(server.url()).list(&filter, &ticket()).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_list_malformed_response() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/files")
            .with_status(200)
            .with_body("{\"oops\":true}")
            .create_async()
            .await;

        let err = gateway(server.url())
            .list(&ListFilter::new(), &ticket())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_fetch_reads_body_and_file_name() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/file-download")
            .match_query(Matcher::UrlEncoded("idFile".into(), "node 1".into()))
            .with_status(200)
            .with_header("content-disposition", r#"attachment; filename="contrato.pdf""#)
            .with_body("%PDF-1.7 body")
            .create_async()
            .await;

        let file = gateway(server.url())
            .fetch("node 1", &ticket())
            .await
            .unwrap();

        assert_eq!(file.content, b"%PDF-1.7 body");
        assert_eq!(file.file_name, "contrato.pdf");
        assert_eq!(file.mime_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_fetch_default_file_name() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/file-download")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body("hello")
            .create_async()
            .await;

        let file = gateway(server.url()).fetch("n-7", &ticket()).await.unwrap();
        assert_eq!(file.file_name, "document_n-7");
        assert_eq!(file.mime_type, "text/plain");
    }

    #[tokio::test]
    async fn test_fetch_not_found_is_distinct() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/file-download")
            .match_query(Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let err = gateway(server.url())
            .fetch("unknown-id", &ticket())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_not_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/file-download")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;

        let err = gateway(server.url()).fetch("x", &ticket()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Api { status: 502, .. }));
    }
}
