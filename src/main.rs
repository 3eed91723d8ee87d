use anyhow::{Context as _, Result};
use essentials::info;
use std::{net::IpAddr, path::PathBuf};
use structopt::StructOpt;
use trellis::{
    config::Config,
    router::loader::{load_routes, ROUTES_FILE},
    security::check_secure_url,
    view::Vars,
    Application, Auth, Context, Controller, RoutingParams, Settings,
};

#[derive(Debug, StructOpt)]
#[structopt(name = "trellis", about = "Serves the demo application")]
struct Opt {
    /// Directory holding config.ini and routes.ini
    #[structopt(long, env = "CONFIGS_ROOT", default_value = "demo/configs")]
    configs: PathBuf,
    #[structopt(long, env = "HOST", default_value = "127.0.0.1")]
    host: IpAddr,
    #[structopt(long, env = "PORT", default_value = "8080")]
    port: u16,
    #[structopt(long, env = "HEALTHCHECK_PORT", default_value = "9000")]
    health_check_port: u16,
}

fn vars<const N: usize>(pairs: [(&str, &str); N]) -> Vars {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

struct HomeController;

impl Controller for HomeController {
    fn dispatch_action(
        &mut self,
        ctx: &mut Context<'_>,
        action: &str,
        _params: &RoutingParams,
    ) -> trellis::Result<String> {
        match action {
            "index" => {
                let user = ctx.session.get_str("user").unwrap_or("guest").to_string();
                ctx.render(&vars([("user", user.as_str())]))
            }
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
    ) -> trellis::Result<String> {
        let id = params.get("id").map(String::as_str).unwrap_or("");
        match action {
            "show" | "edit" => ctx.render(&vars([("id", id)])),
            _ => Err(ctx.forward_404()),
        }
    }

    fn auth(&self) -> Option<&Auth> {
        Some(&self.auth)
    }
}

struct AccountController {
    user: String,
    password: String,
}

impl Controller for AccountController {
    fn dispatch_action(
        &mut self,
        ctx: &mut Context<'_>,
        action: &str,
        _params: &RoutingParams,
    ) -> trellis::Result<String> {
        match action {
            "login" if ctx.request.is_post() => {
                let user = ctx.request.post_param("user").unwrap_or_default();
                let password = ctx.request.post_param("password").unwrap_or_default();
                if user != self.user || password != self.password {
                    ctx.response.set_status_code(403, "Forbidden");
                    return ctx.render(&vars([("error", "Invalid credentials.")]));
                }
                ctx.session.set_authenticated(true);
                ctx.session.set("user", user);
                let next = ctx
                    .request
                    .post_param("next")
                    .filter(|next| next.starts_with('/') && check_secure_url(next))
                    .unwrap_or_else(|| "/".to_string());
                ctx.redirect(&next);
                Ok(String::new())
            }
            "login" => {
                // re-dispatched requests come back to where they started
                let next = match &*ctx.path_info() {
                    "/login" => "/".to_string(),
                    path => path.to_string(),
                };
                ctx.render(&vars([("next", next.as_str()), ("error", "")]))
            }
            "logout" => {
                ctx.session.destroy();
                ctx.redirect("/");
                Ok(String::new())
            }
            _ => Err(ctx.forward_404()),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    essentials::install();
    let opt = Opt::from_args();
    let config = Config::load(&opt.configs)?;
    let settings = Settings::from_config(&config)?;
    let router = load_routes(opt.configs.join(ROUTES_FILE))?;
    let user = config.get_or("DEMO", "USER", "admin").to_string();
    let password = config
        .get("DEMO", "PASSWORD")
        .context("DEMO.PASSWORD should be set")?
        .to_string();
    info!(
        environment = %config.get_or("CORE", "EXECUTION_ENVIRONMENT", ""),
        debug = settings.debug,
        "configuration loaded"
    );
    let application = Application::builder(router)
        .with_settings(settings)
        .register_controller("home", |_| Box::new(HomeController))
        .register_controller("user", |_| {
            Box::new(UserController {
                auth: Auth::actions(["edit"]),
            })
        })
        .register_controller("account", move |_| {
            Box::new(AccountController {
                user: user.clone(),
                password: password.clone(),
            })
        })
        .build();
    trellis::builder(application)
        .with_host(opt.host)
        .with_app_port(opt.port)
        .with_health_check_port(opt.health_check_port)
        .build()
        .run()
        .await;
    Ok(())
}
