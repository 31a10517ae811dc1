//! reqwest-backed submission transport
//!
//! Sends a serialized form as multipart data (or as a query string for GET),
//! tagged with `X-Requested-With: XMLHttpRequest`, and decodes the JSON body
//! regardless of the HTTP status.

use super::{SubmissionResult, SubmitRequest, SubmitTransport};
use super::{REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE};
use crate::error::SubmitError;
use crate::state::{FormValue, Method, SelectedFile};
use async_trait::async_trait;
use reqwest::{multipart, Client};
use std::time::Duration;

/// HTTP transport shared by every form of a page view
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport; `timeout` of `None` keeps the client default
    pub fn new(timeout: Option<Duration>) -> Result<Self, SubmitError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Create a transport around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

fn http_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

async fn file_part(file: &SelectedFile) -> Result<multipart::Part, SubmitError> {
    let bytes = file
        .read_bytes()
        .await
        .map_err(|source| SubmitError::UnreadableFile {
            name: file.name.clone(),
            source,
        })?;

    let part = multipart::Part::bytes(bytes).file_name(file.name.clone());
    if file.mime.is_empty() {
        Ok(part)
    } else {
        Ok(part.mime_str(&file.mime)?)
    }
}

/// Build the multipart body in field order
async fn multipart_body(request: &SubmitRequest) -> Result<multipart::Form, SubmitError> {
    let mut form = multipart::Form::new();
    for (name, value) in &request.fields {
        form = match value {
            FormValue::Text(text) => form.text(name.clone(), text.clone()),
            FormValue::File(file) => form.part(name.clone(), file_part(file).await?),
        };
    }
    Ok(form)
}

#[async_trait]
impl SubmitTransport for HttpTransport {
    async fn submit(&self, request: SubmitRequest) -> Result<SubmissionResult, SubmitError> {
        tracing::info!(method = request.method.as_str(), url = %request.url, "submitting form");

        let builder = self
            .client
            .request(http_method(request.method), request.url.clone())
            .header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE);

        let builder = match request.method {
            Method::Get => builder.query(&request.text_pairs().collect::<Vec<_>>()),
            _ => builder.multipart(multipart_body(&request).await?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        tracing::debug!(%status, bytes = body.len(), "received submission response");

        SubmissionResult::from_slice(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_http_method_mapping() {
        assert_eq!(http_method(Method::Get), reqwest::Method::GET);
        assert_eq!(http_method(Method::Post), reqwest::Method::POST);
        assert_eq!(http_method(Method::Delete), reqwest::Method::DELETE);
    }

    #[test]
    fn test_new_with_timeout() {
        assert!(HttpTransport::new(Some(Duration::from_secs(5))).is_ok());
        assert!(HttpTransport::new(None).is_ok());
    }

    #[tokio::test]
    async fn test_file_part_from_memory() {
        let file = SelectedFile::inline("logo.png", "image/png", vec![0x89, 0x50]);
        assert!(file_part(&file).await.is_ok());
    }

    #[tokio::test]
    async fn test_file_part_reads_from_disk() {
        let path = std::env::temp_dir().join(format!("sasa-forms-{}.txt", uuid::Uuid::new_v4()));
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"hello")
            .unwrap();

        let file = SelectedFile::from_path(&path).await.unwrap();
        assert!(file_part(&file).await.is_ok());
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let mut file = SelectedFile::sized("gone.pdf", "application/pdf", 10);
        file.path = Some(std::env::temp_dir().join("sasa-forms-does-not-exist.pdf"));

        let err = file_part(&file).await.unwrap_err();
        assert!(matches!(err, SubmitError::UnreadableFile { ref name, .. } if name == "gone.pdf"));
    }

    mod wire {
        use super::*;
        use crate::transport::SubmissionResult;
        use pretty_assertions::assert_eq;
        use serde_json::json;
        use url::Url;
        use wiremock::matchers::{body_string_contains, header, method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        fn request(
            server: &MockServer,
            method: Method,
            fields: Vec<(String, FormValue)>,
        ) -> SubmitRequest {
            SubmitRequest {
                url: Url::parse(&format!("{}/api/signup", server.uri())).unwrap(),
                method,
                fields,
            }
        }

        fn text(name: &str, value: &str) -> (String, FormValue) {
            (name.to_string(), FormValue::Text(value.to_string()))
        }

        #[tokio::test]
        async fn test_post_sends_multipart_with_requested_with_header() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .and(path("/api/signup"))
                .and(header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE))
                .and(body_string_contains("name=\"email\""))
                .and(body_string_contains("wanjiru@example.com"))
                .and(body_string_contains("filename=\"logo.png\""))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(json!({"success": true, "message": "Saved"})),
                )
                .expect(1)
                .mount(&server)
                .await;

            let transport = HttpTransport::new(None).unwrap();
            let fields = vec![
                text("email", "wanjiru@example.com"),
                (
                    "logo".to_string(),
                    FormValue::File(SelectedFile::inline("logo.png", "image/png", vec![1, 2])),
                ),
            ];
            let result = transport
                .submit(request(&server, Method::default(), fields))
                .await
                .unwrap();
            assert_eq!(result, SubmissionResult::ok("Saved"));

            let received = server.received_requests().await.unwrap();
            let content_type = received[0]
                .headers
                .get("content-type")
                .unwrap()
                .to_str()
                .unwrap();
            assert!(content_type.starts_with("multipart/form-data"));
        }

        #[tokio::test]
        async fn test_get_sends_query_string() {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/api/signup"))
                .and(query_param("q", "shoes"))
                .and(header(REQUESTED_WITH_HEADER, REQUESTED_WITH_VALUE))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
                .expect(1)
                .mount(&server)
                .await;

            let transport = HttpTransport::new(None).unwrap();
            let result = transport
                .submit(request(&server, Method::Get, vec![text("q", "shoes")]))
                .await
                .unwrap();
            assert!(result.success);
        }

        #[tokio::test]
        async fn test_client_error_status_is_decoded_as_business_failure() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                    "success": false,
                    "message": "Invalid",
                    "errors": {"email": "already taken"}
                })))
                .mount(&server)
                .await;

            let transport = HttpTransport::new(None).unwrap();
            let result = transport
                .submit(request(&server, Method::Post, vec![text("email", "x@y.z")]))
                .await
                .unwrap();
            assert_eq!(
                result,
                SubmissionResult::failed("Invalid").with_error("email", "already taken")
            );
        }

        #[tokio::test]
        async fn test_non_json_body_is_a_decode_error() {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
                .mount(&server)
                .await;

            let transport = HttpTransport::new(None).unwrap();
            let err = transport
                .submit(request(&server, Method::Post, Vec::new()))
                .await
                .unwrap_err();
            assert!(matches!(err, SubmitError::Decode(_)));
        }
    }
}
