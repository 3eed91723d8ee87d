use std::fmt::Display;

use tokio::io;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// No compiled route matched the path info.
    RouteNotFound { path: String },
    /// The requested content does not exist at the action level.
    HttpNotFound(String),
    /// The action requires an authenticated session.
    UnauthorizedAction { controller: String, action: String },
    /// Something the server needed internally could not be loaded.
    ResourceNotFound(ResourceNotFound),
    /// A resource exists but could not be read.
    Io(io::Error),
}

/// The internal resource a lookup failed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceNotFound {
    Class { name: String },
    File { name: String },
}

impl Error {
    pub fn route_not_found(path: impl Into<String>) -> Self {
        Self::RouteNotFound { path: path.into() }
    }

    pub fn http_not_found<S: AsRef<str>>(message: S) -> Self {
        Self::HttpNotFound(message.as_ref().to_string())
    }

    pub fn class_not_found(name: impl Into<String>) -> Self {
        Self::ResourceNotFound(ResourceNotFound::Class { name: name.into() })
    }

    pub fn file_not_found(name: impl Into<String>) -> Self {
        Self::ResourceNotFound(ResourceNotFound::File { name: name.into() })
    }

    /// Both routing misses and action-level misses surface as 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RouteNotFound { .. } | Self::HttpNotFound(_))
    }
}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ResourceNotFound> for Error {
    fn from(value: ResourceNotFound) -> Self {
        Self::ResourceNotFound(value)
    }
}

impl Display for ResourceNotFound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Class { name } => write!(f, "Class '{name}' not found"),
            Self::File { name } => write!(f, "File '{name}' not found"),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RouteNotFound { path } => {
                write!(f, "There is no route that matches '{path}'.")
            }
            Self::HttpNotFound(message) => message.fmt(f),
            Self::UnauthorizedAction { controller, action } => {
                write!(f, "Action '{controller}/{action}' requires authentication")
            }
            Self::ResourceNotFound(resource) => resource.fmt(f),
            Self::Io(error) => write!(f, "Io({error})"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            _ => None,
        }
    }
}
