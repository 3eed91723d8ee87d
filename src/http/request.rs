use crate::io::error::{error, Body, RequestLine};

use super::{headers::HeaderMapExt, ReadHeaders};
use async_trait::async_trait;
use http::{header, HeaderMap, Method};
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Largest request body read into memory.
pub const MAX_BODY_LENGTH: usize = 1 << 20;

#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request target as sent, query string included.
    pub target: String,
    pub version: String,
    headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, target: impl Into<String>) -> Self {
        Self {
            method,
            target: target.into(),
            version: "HTTP/1.1".to_string(),
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    pub fn get(target: impl Into<String>) -> Self {
        Self::new(Method::GET, target)
    }

    pub fn post(target: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        let mut request = Self::new(Method::POST, target);
        request.body = body.into();
        request
    }

    pub fn with_header(mut self, key: header::HeaderName, value: &str) -> Self {
        // invalid values are simply not set
        let _ = self.append_header(key, value);
        self
    }

    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    pub fn query(&self) -> Option<&str> {
        self.target.split_once('?').map(|(_, query)| query)
    }

    /// The percent-decoded path following `base_path`, without the query
    /// string.
    ///
    /// A path outside `base_path` is returned whole.
    pub fn path_info(&self, base_path: &str) -> Cow<'_, str> {
        let path = self.path();
        let rest = match path.strip_prefix(base_path) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
            _ => path,
        };
        percent_decode_str(rest).decode_utf8_lossy()
    }

    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    pub fn host(&self) -> Option<&str> {
        self.header_str(header::HOST)
            .filter(|host| !host.is_empty())
    }

    /// Only known through a terminating proxy.
    pub fn is_ssl(&self) -> bool {
        self.header_str("X-Forwarded-Proto")
            .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
    }

    pub fn get_param(&self, name: &str) -> Option<String> {
        self.query()
            .and_then(|query| find_param(query.as_bytes(), name))
    }

    pub fn post_param(&self, name: &str) -> Option<String> {
        if !self.is_post() {
            return None;
        }
        find_param(&self.body, name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

fn find_param(input: &[u8], name: &str) -> Option<String> {
    url::form_urlencoded::parse(input)
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

impl HeaderMapExt for Request {
    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

#[async_trait]
pub trait ReadRequest {
    async fn read_request(&mut self) -> io::Result<Request>;
}

#[async_trait]
impl<R> ReadRequest for R
where
    R: AsyncBufRead + ?Sized + Unpin + Send,
{
    async fn read_request(&mut self) -> io::Result<Request> {
        let mut request_line = String::new();
        if self.read_line(&mut request_line).await? == 0 {
            return Err(error(RequestLine::MissingRequestLine));
        }
        let (method, target, version) = {
            let mut parts = request_line.split_whitespace();
            (
                parts
                    .next()
                    .ok_or(error(RequestLine::MissingMethod))?
                    .parse()
                    .map_err(|_| error(RequestLine::InvalidMethod))?,
                parts
                    .next()
                    .ok_or(error(RequestLine::MissingTarget))?
                    .to_string(),
                parts
                    .next()
                    .ok_or(error(RequestLine::MissingVersion))?
                    .to_string(),
            )
        };
        let mut request = Request {
            method,
            target,
            version,
            headers: self.read_headers().await?,
            body: Vec::new(),
        };
        if let Some(length) = request.get_content_length() {
            if length > MAX_BODY_LENGTH {
                return Err(error(Body::TooLarge {
                    length,
                    limit: MAX_BODY_LENGTH,
                }));
            }
            request.body = vec![0; length];
            self.read_exact(&mut request.body).await?;
        }
        Ok(request)
    }
}
