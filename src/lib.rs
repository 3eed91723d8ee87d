//! MVC web framework core: a path router and a request dispatcher.
//!
//! # Example usage
//!
//! ```no_run
//! use trellis::{
//!     Application, Context, Controller, Result, Route, Router, RoutingParams, Settings,
//! };
//!
//! struct HomeController;
//!
//! impl Controller for HomeController {
//!     fn dispatch_action(
//!         &mut self,
//!         ctx: &mut Context<'_>,
//!         action: &str,
//!         params: &RoutingParams,
//!     ) -> Result<String> {
//!         match action {
//!             "index" => Ok("Hello, world!".to_string()),
//!             "greet" => Ok(format!("Hello, {}!", params["name"])),
//!             _ => Err(ctx.forward_404()),
//!         }
//!     }
//! }
//!
//! # async fn run() {
//! essentials::install();
//! let router: Router = [
//!     Route::with_params("/", [("controller", "home"), ("action", "index")]),
//!     Route::with_params("/hello/:name", [("controller", "home"), ("action", "greet")]),
//! ]
//! .into_iter()
//! .collect();
//! let application = Application::builder(router)
//!     .with_settings(Settings::default())
//!     .register_controller("home", |_| Box::new(HomeController))
//!     .build();
//! trellis::builder(application)
//!     .with_app_port(8080)
//!     .build()
//!     .run()
//!     .await;
//! # }
//! ```
pub mod application;
pub mod auth;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub(crate) mod io;
pub mod router;
pub mod security;
pub(crate) mod server;
pub mod session;
pub mod view;

pub use application::Application;
pub use auth::Auth;
pub use config::{Config, Settings};
pub use controller::{Context, Controller, ControllerRegistry};
pub use error::{Error, ResourceNotFound, Result};
pub use router::{Route, Router, RoutingParams};
pub use server::app::{builder, Server, ServerBuilder};
pub use session::{Datastore, InMemoryDatastore, Session};
