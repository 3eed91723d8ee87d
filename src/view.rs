//! File-backed views.
//!
//! A view file is `<views_root>/<path>.html`. `{{ name }}` is replaced with
//! the HTML-escaped variable, `{{{ name }}}` with the raw value, and unknown
//! names with nothing. A layout receives the rendered view as `_content`.

use regex::{Captures, Regex};
use std::{collections::BTreeMap, fs, io, path::PathBuf, sync::OnceLock};

use crate::{security::html_escape, Error, Result};

pub const VIEW_EXTENSION: &str = "html";
pub const CONTENT_VAR: &str = "_content";

pub type Vars = BTreeMap<String, String>;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"\{\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}\}|\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")
            .expect("valid regex")
    })
}

#[derive(Debug, Clone)]
pub struct View {
    views_root: PathBuf,
    defaults: Vars,
    layout_defaults: Vars,
}

impl View {
    pub fn new(views_root: impl Into<PathBuf>, defaults: Vars) -> Self {
        Self {
            views_root: views_root.into(),
            defaults,
            layout_defaults: Vars::new(),
        }
    }

    pub fn set_layout_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.layout_defaults.insert(name.into(), value.into());
    }

    /// Renders `view_path`, then wraps it in `layout_path` when given.
    pub fn render(&self, vars: &Vars, view_path: &str, layout_path: Option<&str>) -> Result<String> {
        let mut view_vars = self.defaults.clone();
        view_vars.extend(vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        let content = self.execute(view_path, &view_vars)?;
        match layout_path {
            Some(layout_path) => {
                let mut layout_vars = self.layout_defaults.clone();
                layout_vars.insert(CONTENT_VAR.to_string(), content);
                self.execute(layout_path, &layout_vars)
            }
            None => Ok(content),
        }
    }

    fn file(&self, path: &str) -> PathBuf {
        self.views_root.join(format!("{path}.{VIEW_EXTENSION}"))
    }

    fn execute(&self, path: &str, vars: &Vars) -> Result<String> {
        let file = self.file(path);
        let template = fs::read_to_string(&file).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::file_not_found(file.display().to_string()),
            _ => Error::Io(e),
        })?;
        Ok(substitute(&template, vars))
    }
}

fn substitute(template: &str, vars: &Vars) -> String {
    placeholder()
        .replace_all(template, |captures: &Captures| {
            match (captures.get(1), captures.get(2)) {
                (Some(raw), _) => vars.get(raw.as_str()).cloned().unwrap_or_default(),
                (None, Some(escaped)) => vars
                    .get(escaped.as_str())
                    .map(|value| html_escape(value))
                    .unwrap_or_default(),
                (None, None) => String::new(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use std::env;

    use super::*;
    use crate::error::ResourceNotFound;

    fn vars(pairs: &[(&str, &str)]) -> Vars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn views_root(name: &str) -> PathBuf {
        let root = env::temp_dir().join(format!("trellis-views-{}-{name}", std::process::id()));
        fs::create_dir_all(root.join("user")).unwrap();
        root
    }

    #[test]
    fn substitutes_placeholders() {
        let out = substitute(
            "<p>{{ name }}</p>{{{html}}}{{missing}}",
            &vars(&[("name", "<b>"), ("html", "<i>ok</i>")]),
        );
        assert_eq!(out, "<p>&lt;b&gt;</p><i>ok</i>");
    }

    #[test]
    fn renders_view_into_layout() {
        let root = views_root("layout");
        fs::write(root.join("user/edit.html"), "<h1>{{ title }} #{{ id }}</h1>").unwrap();
        fs::write(root.join("layout.html"), "<body>{{{ _content }}}{{ footer }}</body>").unwrap();
        let mut view = View::new(&root, vars(&[("title", "Edit")]));
        view.set_layout_variable("footer", "&copy;");

        let out = view
            .render(&vars(&[("id", "2")]), "user/edit", Some("layout"))
            .unwrap();
        assert_eq!(out, "<body><h1>Edit #2</h1>&amp;copy;</body>");
        assert_eq!(
            view.render(&vars(&[("id", "2")]), "user/edit", None).unwrap(),
            "<h1>Edit #2</h1>"
        );
    }

    #[test]
    fn dotted_view_names_keep_their_suffix() {
        let root = views_root("dotted");
        fs::write(root.join("user/show.html"), "desktop").unwrap();
        fs::write(root.join("user/show.mobile.html"), "mobile").unwrap();
        let view = View::new(&root, Vars::new());
        assert_eq!(view.render(&Vars::new(), "user/show.mobile", None).unwrap(), "mobile");
        assert_eq!(view.render(&Vars::new(), "user/show", None).unwrap(), "desktop");
    }

    #[test]
    fn unreadable_files_are_io_errors() {
        let root = views_root("unreadable");
        fs::create_dir_all(root.join("user/folder.html")).unwrap();
        let view = View::new(&root, Vars::new());
        assert!(matches!(
            view.render(&Vars::new(), "user/folder", None),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn missing_files_are_resource_errors() {
        let root = views_root("missing");
        let view = View::new(&root, Vars::new());
        match view.render(&Vars::new(), "user/nothing", None) {
            Err(Error::ResourceNotFound(ResourceNotFound::File { name })) => {
                assert!(name.ends_with("nothing.html"))
            }
            other => panic!("expected missing file, got {other:?}"),
        }
    }
}
