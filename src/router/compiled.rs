use super::{Route, RoutingParams};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Capture(String),
}

impl From<&str> for Segment {
    fn from(token: &str) -> Self {
        match token.strip_prefix(':') {
            Some(name) if !name.is_empty() => Self::Capture(name.to_string()),
            _ => Self::Literal(token.to_string()),
        }
    }
}

/// A route pattern compiled into one matcher per `/`-separated segment.
///
/// The whole path must be consumed for a match; a capture takes exactly one
/// non-empty segment.
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    segments: Box<[Segment]>,
    params: RoutingParams,
}

impl CompiledRoute {
    pub fn compile(route: &Route) -> Self {
        Self {
            segments: route.pattern().split('/').map(Segment::from).collect(),
            params: route.params().clone(),
        }
    }

    /// Returns the named captures when `path` matches, in pattern order.
    pub fn captures<'p>(&self, path: &'p str) -> Option<Vec<(&str, &'p str)>> {
        let mut captures = Vec::new();
        let mut parts = path.split('/');
        for segment in self.segments.iter() {
            let part = parts.next()?;
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    captures.push((name.as_str(), part));
                }
            }
        }
        match parts.next() {
            Some(_) => None,
            None => Some(captures),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.captures(path).is_some()
    }

    /// Static params with the captures of `path` merged over them.
    pub fn resolve(&self, path: &str) -> Option<RoutingParams> {
        let captures = self.captures(path)?;
        let mut params = self.params.clone();
        params.extend(
            captures
                .into_iter()
                .map(|(name, value)| (name.to_string(), value.to_string())),
        );
        Some(params)
    }
}
