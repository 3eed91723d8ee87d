use std::fmt::Display;

use http::header::{InvalidHeaderName, InvalidHeaderValue};
use tokio::io;

pub fn error<E: Into<CustomError>>(data: E) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, data.into())
}

#[derive(Debug)]
pub enum CustomError {
    RequestLine(RequestLine),
    Headers(Headers),
    Body(Body),
}

impl Display for CustomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for CustomError {}

#[derive(Debug)]
pub enum RequestLine {
    MissingRequestLine,
    MissingMethod,
    MissingTarget,
    MissingVersion,
    InvalidMethod,
}

impl From<RequestLine> for CustomError {
    fn from(value: RequestLine) -> Self {
        CustomError::RequestLine(value)
    }
}

#[derive(Debug)]
pub enum Headers {
    MissingSeparator,
    InvalidName(InvalidHeaderName),
    InvalidValue(InvalidHeaderValue),
}

impl From<Headers> for CustomError {
    fn from(value: Headers) -> Self {
        CustomError::Headers(value)
    }
}

#[derive(Debug)]
pub enum Body {
    TooLarge { length: usize, limit: usize },
}

impl From<Body> for CustomError {
    fn from(value: Body) -> Self {
        CustomError::Body(value)
    }
}
