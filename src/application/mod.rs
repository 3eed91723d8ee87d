//! The request dispatcher.
//!
//! [Application::run] resolves the path info of a request against the
//! router, instantiates the controller named by the `controller` routing
//! parameter and runs the `action`. Every failure ends in a response:
//!
//! | outcome                                  | status |
//! |------------------------------------------|--------|
//! | no route / action level not found        | 404    |
//! | action requires an authenticated session | login action is rendered instead |
//! | controller or view could not be loaded   | 500    |
//! | anything else                            | 500    |

mod builder;

use essentials::{debug, error, info, warn};

use crate::{
    controller::{controller_class_name, Context, ControllerRegistry},
    http::{Request, Response},
    router::RoutingParams,
    security::html_escape,
    Error, Result, Router, Session, Settings,
};

pub use builder::ApplicationBuilder;

pub const NOT_FOUND_PAGE: &str = "Page not found.";
pub const SERVER_ERROR_PAGE: &str = "Internal server error.";

/// How a single dispatch ended.
#[derive(Debug)]
pub enum Outcome {
    Rendered(String),
    NotFound(Error),
    ServerError(Error),
}

impl From<Result<String>> for Outcome {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(content) => Self::Rendered(content),
            Err(error) if error.is_not_found() => Self::NotFound(error),
            Err(error) => Self::ServerError(error),
        }
    }
}

#[derive(Debug)]
pub struct Application {
    settings: Settings,
    router: Router,
    controllers: ControllerRegistry,
}

impl Application {
    pub fn builder(router: Router) -> ApplicationBuilder {
        ApplicationBuilder::new(router)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn controllers(&self) -> &ControllerRegistry {
        &self.controllers
    }

    /// Handles one request. Never fails: errors are turned into error pages.
    pub fn run(&self, request: &Request, session: &mut Session) -> Response {
        let mut response = Response::default();
        let path_info = request.path_info(&self.settings.base_path);
        debug!(method = %request.method, path_info = %path_info, "routing");
        let outcome = match self.router.resolve(&path_info) {
            Ok(params) => self.dispatch(&params, request, &mut response, session),
            Err(error) => Outcome::NotFound(error),
        };
        self.finish(outcome, &mut response);
        response
    }

    fn dispatch(
        &self,
        params: &RoutingParams,
        request: &Request,
        response: &mut Response,
        session: &mut Session,
    ) -> Outcome {
        let controller = params.get("controller").map(String::as_str).unwrap_or("");
        let action = params.get("action").map(String::as_str).unwrap_or("");
        debug!(controller = %controller, action = %action, "dispatching");
        let result = match self.dispatch_controller(
            controller, action, params, request, response, session, true,
        ) {
            Err(Error::UnauthorizedAction { controller, action }) => {
                info!(
                    controller = %controller,
                    action = %action,
                    login_controller = %self.settings.login_controller,
                    login_action = %self.settings.login_action,
                    "authentication required"
                );
                self.dispatch_controller(
                    &self.settings.login_controller,
                    &self.settings.login_action,
                    params,
                    request,
                    response,
                    session,
                    false,
                )
            }
            result => result,
        };
        result.into()
    }

    /// Runs `controller`/`action` and returns the rendered content.
    ///
    /// With `check_auth` set, an action the controller protects fails with
    /// [Error::UnauthorizedAction] unless the session is authenticated.
    #[allow(clippy::too_many_arguments)]
    pub fn dispatch_controller(
        &self,
        controller: &str,
        action: &str,
        params: &RoutingParams,
        request: &Request,
        response: &mut Response,
        session: &mut Session,
        check_auth: bool,
    ) -> Result<String> {
        let mut instance = self
            .controllers
            .create(controller, self)
            .ok_or_else(|| Error::class_not_found(controller_class_name(controller)))?;
        if check_auth
            && instance
                .auth()
                .is_some_and(|auth| auth.needs_authentication(action))
            && !session.is_authenticated()
        {
            return Err(Error::UnauthorizedAction {
                controller: controller.to_string(),
                action: action.to_string(),
            });
        }
        let mut ctx = Context::new(self, request, response, session, controller, action);
        instance.dispatch_action(&mut ctx, action, params)
    }

    fn finish(&self, outcome: Outcome, response: &mut Response) {
        match outcome {
            Outcome::Rendered(content) => response.set_content(content),
            Outcome::NotFound(error) => {
                warn!(error = %error, "not found");
                *response = Response::default();
                response.set_status_code(404, "Not Found");
                response.set_content(self.error_page(&error, NOT_FOUND_PAGE));
            }
            Outcome::ServerError(error) => {
                error!(error = %error, "request failed");
                *response = Response::default();
                response.set_status_code(500, "Internal Server Error");
                response.set_content(self.error_page(&error, SERVER_ERROR_PAGE));
            }
        }
    }

    fn error_page(&self, error: &Error, generic: &str) -> String {
        if self.settings.debug {
            html_escape(&error.to_string())
        } else {
            generic.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use http::{header, StatusCode};
    use pretty_assertions::assert_eq;
    use std::{env, fs, path::PathBuf};

    use super::*;
    use crate::{controller::Controller, http::HeaderMapExt, view::Vars, Auth, Route};

    struct HomeController;

    impl Controller for HomeController {
        fn dispatch_action(
            &mut self,
            ctx: &mut Context<'_>,
            action: &str,
            _params: &RoutingParams,
        ) -> Result<String> {
            match action {
                "index" => Ok("home".to_string()),
                "away" => {
                    ctx.redirect("/user/1");
                    Ok(String::new())
                }
                "page" => ctx.render_with(&Vars::new(), "missing", None),
                _ => Err(ctx.forward_404()),
            }
        }
    }

    struct UserController {
        auth: Auth,
    }

    impl Controller for UserController {
        fn dispatch_action(
            &mut self,
            ctx: &mut Context<'_>,
            action: &str,
            params: &RoutingParams,
        ) -> Result<String> {
            match action {
                "show" => Ok(format!("user {}", params["id"])),
                "edit" => Ok(format!("editing {}", params["id"])),
                "login" => {
                    ctx.session.set_authenticated(true);
                    Ok("logged in".to_string())
                }
                _ => Err(ctx.forward_404()),
            }
        }

        fn auth(&self) -> Option<&Auth> {
            Some(&self.auth)
        }
    }

    struct AccountController {
        auth: Auth,
    }

    impl Controller for AccountController {
        fn dispatch_action(
            &mut self,
            ctx: &mut Context<'_>,
            action: &str,
            _params: &RoutingParams,
        ) -> Result<String> {
            match action {
                "signin" => Ok(format!("please log in at {}", ctx.path_info())),
                _ => Err(ctx.forward_404()),
            }
        }

        fn auth(&self) -> Option<&Auth> {
            Some(&self.auth)
        }
    }

    fn router() -> Router {
        [
            Route::with_params("/", [("controller", "home"), ("action", "index")]),
            Route::with_params("/away", [("controller", "home"), ("action", "away")]),
            Route::with_params("/page", [("controller", "home"), ("action", "page")]),
            Route::with_params("/nothing", [("controller", "home"), ("action", "nothing")]),
            Route::with_params("/ghost", [("controller", "ghost"), ("action", "index")]),
            Route::with_params("/login", [("controller", "user"), ("action", "login")]),
            Route::with_params("/user/:id", [("controller", "user"), ("action", "show")]),
            Route::with_params("/user/:id/:action", [("controller", "user")]),
            Route::with_params("/記事/:id", [("controller", "user"), ("action", "show")]),
        ]
        .into_iter()
        .collect()
    }

    fn application(settings: Settings) -> Application {
        Application::builder(router())
            .with_settings(settings)
            .register_controller("home", |_| Box::new(HomeController))
            .register_controller("user", |_| {
                Box::new(UserController {
                    auth: Auth::actions(["edit"]),
                })
            })
            .register_controller("account", |_| {
                Box::new(AccountController { auth: Auth::all() })
            })
            .build()
    }

    fn settings() -> Settings {
        Settings::default().with_login("account", "signin")
    }

    fn run(app: &Application, target: &str) -> Response {
        app.run(&Request::get(target), &mut Session::new())
    }

    #[test]
    fn renders_action_content() {
        let app = application(settings());
        let response = run(&app, "/");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content(), "home");
        assert_eq!(run(&app, "/user/7?tab=1").content(), "user 7");
    }

    #[test]
    fn routes_percent_encoded_paths() {
        let app = application(settings().with_base_path("/app"));
        let response = run(&app, "/app/%E8%A8%98%E4%BA%8B/12");
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.content(), "user 12");
        assert_eq!(run(&app, "/app/user/a%20b").content(), "user a b");
    }

    #[test]
    fn unknown_route_is_not_found() {
        let response = run(&application(settings()), "/no/such/page");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.status_text(), "Not Found");
        assert_eq!(response.content(), NOT_FOUND_PAGE);
    }

    #[test]
    fn debug_pages_show_escaped_messages() {
        let app = application(settings().with_debug(true));
        assert_eq!(
            run(&app, "/no/such/page").content(),
            "There is no route that matches &#039;/no/such/page&#039;."
        );
        assert_eq!(
            run(&app, "/nothing").content(),
            "Forwarded 404 page from home/nothing"
        );
        assert_eq!(
            run(&app, "/ghost").content(),
            "Class &#039;GhostController&#039; not found"
        );
    }

    #[test]
    fn forwarded_404_from_action() {
        let response = run(&application(settings()), "/user/2/delete");
        assert_eq!(response.status, StatusCode::NOT_FOUND);
        assert_eq!(response.content(), NOT_FOUND_PAGE);
    }

    #[test]
    fn missing_controller_is_server_error() {
        let response = run(&application(settings()), "/ghost");
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.status_text(), "Internal Server Error");
        assert_eq!(response.content(), SERVER_ERROR_PAGE);
    }

    #[test]
    fn missing_view_is_server_error() {
        let root = env::temp_dir().join(format!("trellis-app-{}", std::process::id()));
        fs::create_dir_all(&root).unwrap();
        let app = application(settings().with_views_root(PathBuf::from(&root)));
        let response = run(&app, "/page");
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.content(), SERVER_ERROR_PAGE);
    }

    #[test]
    fn protected_action_renders_login() {
        let app = application(settings());
        let response = run(&app, "/user/2/edit");
        assert_eq!(response.status, StatusCode::OK);
        // the login controller is itself protected, the retry skips the check
        assert_eq!(response.content(), "please log in at /user/2/edit");
        // unprotected actions of the same controller are not affected
        assert_eq!(run(&app, "/user/2/show").content(), "user 2");
    }

    #[test]
    fn authenticated_session_reaches_protected_action() {
        let app = application(settings());
        let mut session = Session::new();
        assert_eq!(
            app.run(&Request::get("/login"), &mut session).content(),
            "logged in"
        );
        assert!(session.is_authenticated());
        let response = app.run(&Request::get("/user/2/edit"), &mut session);
        assert_eq!(response.content(), "editing 2");
    }

    #[test]
    fn missing_login_target_is_bounded() {
        let app = application(Settings::default().with_login("nowhere", "signin"));
        let response = run(&app, "/user/2/edit");
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        let app = application(Settings::default());
        let response = run(&app, "/user/2/edit");
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn redirects() {
        let app = application(settings().with_base_path("/app"));
        let request = Request::get("/app/away").with_header(header::HOST, "example.com");
        let response = app.run(&request, &mut Session::new());
        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(
            response.header_str(header::LOCATION),
            Some("http://example.com/app/user/1")
        );
    }

    #[test]
    fn base_path_is_stripped() {
        let app = application(settings().with_base_path("/app"));
        assert_eq!(run(&app, "/app/user/3").content(), "user 3");
        assert_eq!(run(&app, "/app").content(), "home");
        assert_eq!(run(&app, "/app/").content(), "home");
        assert_eq!(run(&app, "/user/3").content(), "user 3");
    }

    #[test]
    fn builder_compiles_pending_routes() {
        let router = Router::new().add(Route::with_params(
            "/",
            [("controller", "home"), ("action", "index")],
        ));
        assert!(router.is_dirty());
        let app = Application::builder(router)
            .register_controller("home", |_| Box::new(HomeController))
            .build();
        assert!(!app.router().is_dirty());
        assert!(app.controllers().contains("home"));
        assert_eq!(run(&app, "/").content(), "home");
    }
}
