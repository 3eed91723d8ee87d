use http::header;
use std::borrow::Cow;

use crate::{
    http::{HeaderMapExt, Request, Response},
    view::{Vars, View},
    Application, Error, Result, Session, Settings,
};

pub const DEFAULT_LAYOUT: &str = "layout";

/// Everything an action can reach while it runs.
pub struct Context<'a> {
    pub application: &'a Application,
    pub request: &'a Request,
    pub response: &'a mut Response,
    pub session: &'a mut Session,
    controller: &'a str,
    action: &'a str,
}

impl<'a> Context<'a> {
    pub fn new(
        application: &'a Application,
        request: &'a Request,
        response: &'a mut Response,
        session: &'a mut Session,
        controller: &'a str,
        action: &'a str,
    ) -> Self {
        Self {
            application,
            request,
            response,
            session,
            controller,
            action,
        }
    }

    pub fn controller_name(&self) -> &str {
        self.controller
    }

    pub fn action_name(&self) -> &str {
        self.action
    }

    pub fn settings(&self) -> &Settings {
        self.application.settings()
    }

    pub fn path_info(&self) -> Cow<'_, str> {
        self.request.path_info(&self.settings().base_path)
    }

    fn view(&self) -> View {
        let defaults = Vars::from([
            ("base_url".to_string(), self.settings().base_path.clone()),
            ("path_info".to_string(), self.path_info().into_owned()),
        ]);
        View::new(&self.settings().views_root, defaults)
    }

    /// Renders `<controller>/<action>` inside the default layout.
    pub fn render(&self, vars: &Vars) -> Result<String> {
        self.render_with(vars, self.action, Some(DEFAULT_LAYOUT))
    }

    /// Renders `<controller>/<view_name>`, optionally inside `layout`.
    pub fn render_with(&self, vars: &Vars, view_name: &str, layout: Option<&str>) -> Result<String> {
        self.view()
            .render(vars, &format!("{}/{}", self.controller, view_name), layout)
    }

    /// Makes the response a `302 Found` to `url`.
    ///
    /// Anything that is not an absolute `http(s)://` URL is taken as a path
    /// inside this application.
    pub fn redirect(&mut self, url: &str) {
        let location = if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            let scheme = if self.request.is_ssl() { "https" } else { "http" };
            let host = self.request.host().unwrap_or("localhost");
            format!("{scheme}://{host}{}{url}", self.settings().base_path)
        };
        self.response.set_status_code(302, "Found");
        if self.response.insert_header(header::LOCATION, location.as_str()).is_err() {
            essentials::warn!(location = %location, "invalid redirect location");
        }
    }

    /// The error that turns into a 404 page for the current action.
    pub fn forward_404(&self) -> Error {
        let action = if self.action.is_empty() {
            "_undefined_"
        } else {
            self.action
        };
        Error::http_not_found(format!(
            "Forwarded 404 page from {}/{}",
            self.controller, action
        ))
    }
}
