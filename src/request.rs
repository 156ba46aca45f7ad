// Outbound request descriptor
// Requests are described once and rebuilt for every attempt, so bodies
// (including multipart uploads) survive a refresh-and-retry.

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use serde::Serialize;

use crate::error::{ApiError, Result};

/// Value of a single multipart field
#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Bytes,
    },
}

#[derive(Debug, Clone)]
pub struct FormPart {
    pub name: String,
    pub value: FormValue,
}

/// Request body kept in a form that can be rebuilt on demand
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(Vec<FormPart>),
}

/// Method, path, query, headers and body of one logical API call
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: RequestBody,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Append a text field, switching the body to multipart
    pub fn text_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.push_part(FormPart {
            name: name.to_string(),
            value: FormValue::Text(value.into()),
        });
        self
    }

    /// Append a file field, switching the body to multipart
    pub fn file_field(
        mut self,
        name: &str,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        self.push_part(FormPart {
            name: name.to_string(),
            value: FormValue::File {
                file_name: file_name.into(),
                mime,
                bytes: bytes.into(),
            },
        });
        self
    }

    fn push_part(&mut self, part: FormPart) {
        match &mut self.body {
            RequestBody::Multipart(parts) => parts.push(part),
            body => *body = RequestBody::Multipart(vec![part]),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    /// Build a fresh `reqwest::Request` for one attempt
    pub(crate) fn build(
        &self,
        client: &Client,
        base_url: &str,
        bearer: Option<&str>,
    ) -> Result<reqwest::Request> {
        let url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        let mut builder = client
            .request(self.method.clone(), &url)
            .headers(self.headers.clone());

        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }

        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        builder = match &self.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(parts) => builder.multipart(build_form(parts)?),
        };

        builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("{} {}: {}", self.method, url, e)))
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File {
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes.to_vec()).file_name(file_name.clone());
                if let Some(mime) = mime {
                    file = file.mime_str(mime).map_err(|e| {
                        ApiError::InvalidRequest(format!("Invalid MIME type {}: {}", mime, e))
                    })?;
                }
                form.part(part.name.clone(), file)
            }
        };
    }
    Ok(form)
}

/// Immutable envelope for one send of a request.
///
/// A retry produces a new envelope; the descriptor itself is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attempt {
    number: u32,
    bearer: Option<String>,
}

impl Attempt {
    pub fn first(bearer: Option<String>) -> Self {
        Self { number: 1, bearer }
    }

    /// Envelope for the single retry after a refresh
    pub fn retry(&self, bearer: String) -> Self {
        Self {
            number: self.number + 1,
            bearer: Some(bearer),
        }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_retry(&self) -> bool {
        self.number > 1
    }

    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

    #[test]
    fn test_build_attaches_bearer_and_query() {
        let client = Client::new();
        let req = ApiRequest::get("/api/menu-items").query("ordering", "-id");

        let built = req
            .build(&client, "http://localhost:8000/", Some("A1"))
            .unwrap();
        assert_eq!(built.method(), &Method::GET);
        assert_eq!(
            built.url().as_str(),
            "http://localhost:8000/api/menu-items?ordering=-id"
        );
        assert_eq!(built.headers().get(AUTHORIZATION).unwrap(), "Bearer A1");
    }

    #[test]
    fn test_build_without_bearer() {
        let client = Client::new();
        let built = ApiRequest::get("/api/me")
            .build(&client, "http://localhost:8000", None)
            .unwrap();
        assert!(built.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_multipart_rebuilds_for_every_attempt() {
        let client = Client::new();
        let req = ApiRequest::post("/api/menu-items")
            .text_field("title", "Greek Salad")
            .text_field("price", "12.50")
            .file_field("image", "salad.png", Some("image/png".to_string()), vec![1u8, 2, 3]);

        match req.body() {
            RequestBody::Multipart(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected multipart body, got {:?}", other),
        }

        for bearer in ["A1", "A2"] {
            let built = req
                .build(&client, "http://localhost:8000", Some(bearer))
                .unwrap();
            let content_type = built.headers().get(CONTENT_TYPE).unwrap().to_str().unwrap();
            assert!(content_type.starts_with("multipart/form-data"));
        }
    }

    #[test]
    fn test_invalid_mime_is_rejected() {
        let client = Client::new();
        let req = ApiRequest::post("/api/menu-items").file_field(
            "image",
            "x.bin",
            Some("not a mime".to_string()),
            Vec::<u8>::new(),
        );
        let err = req.build(&client, "http://localhost:8000", None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let client = Client::new();
        let err = ApiRequest::get("/api/me")
            .build(&client, "not a url", None)
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidRequest(_)));
    }

    #[test]
    fn test_attempt_retry_envelope() {
        let first = Attempt::first(Some("A1".to_string()));
        assert!(!first.is_retry());
        assert_eq!(first.bearer(), Some("A1"));

        let retry = first.retry("A2".to_string());
        assert!(retry.is_retry());
        assert_eq!(retry.number(), 2);
        assert_eq!(retry.bearer(), Some("A2"));
        assert_eq!(first.bearer(), Some("A1"));
    }
}
