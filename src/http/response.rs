use super::{headers::HeaderMapExt, WriteHeaders};
use async_trait::async_trait;
use chrono::Utc;
use http::{header, HeaderMap, HeaderValue, StatusCode};
use tokio::io::{self, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone)]
pub struct Response {
    pub version: String,
    pub status: StatusCode,
    /// Reason phrase sent instead of the canonical one, when set.
    pub status_text: Option<String>,
    headers: HeaderMap,
    content: String,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::OK)
    }
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: "HTTP/1.1".to_string(),
            status,
            status_text: None,
            headers: vec![(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/html; charset=UTF-8"),
            )]
            .into_iter()
            .collect(),
            content: String::new(),
        }
    }

    pub fn error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Unknown codes fall back to 500.
    pub fn set_status_code(&mut self, code: u16, text: &str) {
        self.status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        self.status_text = Some(text.to_string()).filter(|text| !text.is_empty());
    }

    pub fn status_text(&self) -> &str {
        self.status_text
            .as_deref()
            .or(self.status.canonical_reason())
            .unwrap_or("")
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Headers that are not valid HTTP are dropped.
    pub fn set_header(&mut self, name: &str, value: &str) -> bool {
        match header::HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => self.insert_header(name, value).is_ok(),
            Err(_) => false,
        }
    }
}

impl HeaderMapExt for Response {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

#[async_trait]
pub trait WriteResponse {
    async fn write_response(&mut self, response: &Response) -> io::Result<()>;
}

#[async_trait]
impl<R> WriteResponse for R
where
    R: AsyncWrite + ?Sized + Unpin + Send,
{
    async fn write_response(&mut self, response: &Response) -> io::Result<()> {
        let mut headers = response.headers.clone();
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(response.content.len()));
        if let Ok(date) = HeaderValue::from_str(
            &Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        ) {
            headers.insert(header::DATE, date);
        }
        self.write_all(response.version.as_bytes()).await?;
        self.write_all(b" ").await?;
        self.write_all(response.status.as_str().as_bytes()).await?;
        self.write_all(b" ").await?;
        self.write_all(response.status_text().as_bytes()).await?;
        self.write_all(b"\r\n").await?;
        self.write_headers(&headers).await?;
        self.write_all(b"\r\n").await?;
        self.write_all(response.content.as_bytes()).await?;
        self.flush().await?;
        Ok(())
    }
}
