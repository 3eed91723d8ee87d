use anyhow::{Context, Result};
use essentials::info;
use std::{fs, path::Path};

use crate::config::ini::{self, Scanner};

use super::{Route, Router};

pub const ROUTES_FILE: &str = "routes.ini";

/// Builds a compiled [Router] from a routes file.
///
/// Every section is one route: its name is the pattern and its entries are
/// the params. File order is kept as route priority.
pub fn load_routes(path: impl AsRef<Path>) -> Result<Router> {
    let path = path.as_ref();
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let router = parse_routes(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    info!(routes = router.routes().len(), file = %path.display(), "routes loaded");
    Ok(router)
}

pub fn parse_routes(content: &str) -> Result<Router, ini::IniError> {
    Ok(ini::parse(content, Scanner::Raw)?
        .into_iter()
        .map(|section| Route::with_params(section.name, section.entries))
        .collect())
}
