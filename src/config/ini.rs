use std::fmt::Display;

/// How values are interpreted while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scanner {
    /// Values are kept verbatim apart from surrounding quotes.
    Raw,
    /// `true`/`on`/`yes` become `1`, `false`/`off`/`no`/`none` become empty.
    Normal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl Section {
    fn set(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniError {
    pub line: usize,
    pub kind: IniErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IniErrorKind {
    UnterminatedSection,
    EmptySectionName,
    MissingSeparator,
    EmptyKey,
    KeyOutsideSection,
}

impl Display for IniError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {:?}", self.line, self.kind)
    }
}

impl std::error::Error for IniError {}

/// Parses ini text into its sections, in file order.
///
/// A section repeated later in the file is merged into the first one.
pub fn parse(input: &str, scanner: Scanner) -> Result<Vec<Section>, IniError> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current: Option<usize> = None;
    for (index, line) in input.lines().enumerate() {
        let error = |kind| IniError {
            line: index + 1,
            kind,
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(error(IniErrorKind::UnterminatedSection))?
                .trim();
            if name.is_empty() {
                return Err(error(IniErrorKind::EmptySectionName));
            }
            current = Some(match sections.iter().position(|s| s.name == name) {
                Some(position) => position,
                None => {
                    sections.push(Section {
                        name: name.to_string(),
                        entries: Vec::new(),
                    });
                    sections.len() - 1
                }
            });
            continue;
        }
        let (key, value) = line
            .split_once('=')
            .ok_or(error(IniErrorKind::MissingSeparator))?;
        let key = key.trim();
        if key.is_empty() {
            return Err(error(IniErrorKind::EmptyKey));
        }
        let section = current
            .and_then(|position| sections.get_mut(position))
            .ok_or(error(IniErrorKind::KeyOutsideSection))?;
        section.set(key.to_string(), scan_value(value.trim(), scanner));
    }
    Ok(sections)
}

/// Quoted values are taken up to the closing quote; anything else ends at
/// an inline `;` comment.
fn scan_value(value: &str, scanner: Scanner) -> String {
    if let Some((quoted, _)) = value
        .strip_prefix('"')
        .and_then(|value| value.split_once('"'))
    {
        return quoted.to_string();
    }
    let value = match value.find(';') {
        Some(comment) => value[..comment].trim_end(),
        None => value,
    };
    if scanner == Scanner::Raw {
        return value.to_string();
    }
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" => "1".to_string(),
        "false" | "off" | "no" | "none" => String::new(),
        _ => value.to_string(),
    }
}
