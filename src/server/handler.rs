use anyhow::Result;
use async_trait::async_trait;
use essentials::{debug, error, info, warn};
use http::{header, StatusCode};
use std::{net::SocketAddr, sync::Arc};
use tokio::{io::BufReader, net::TcpStream};

use crate::{
    application::SERVER_ERROR_PAGE,
    http::{server::Handler, HeaderMapExt, ReadRequest, Request, Response, WriteResponse},
    session::Datastore,
    Application, Session,
};

pub type DatastoreService = Arc<dyn Datastore + Send + Sync + 'static>;

/// Serves one request per connection: reads it, restores the session,
/// dispatches it through the [Application] and writes the response.
pub struct AppHandler {
    application: Arc<Application>,
    datastore: DatastoreService,
}

impl AppHandler {
    pub fn new(application: Arc<Application>, datastore: DatastoreService) -> Self {
        Self {
            application,
            datastore,
        }
    }

    async fn respond(&self, request: Request) -> Response {
        let session = self.load_session(&request).await;
        let application = self.application.clone();
        let dispatched = tokio::task::spawn_blocking(move || {
            let mut session = session;
            let response = application.run(&request, &mut session);
            (response, session)
        })
        .await;
        match dispatched {
            Ok((mut response, session)) => {
                if let Err(e) = self.store_session(&session, &mut response).await {
                    error!(session = %session.id(), "Failed to store session: {:?}", e);
                }
                response
            }
            Err(e) => {
                error!("Dispatch failed: {:?}", e);
                let mut response = Response::error();
                response.set_content(SERVER_ERROR_PAGE);
                response
            }
        }
    }

    /// Unknown or expired ids get a fresh session instead of being adopted.
    async fn load_session(&self, request: &Request) -> Session {
        let cookie = &self.application.settings().session_cookie;
        let Some(id) = request.cookie(cookie) else {
            return Session::new();
        };
        match self.datastore.fetch_session(id).await {
            Ok(Some(values)) => Session::restore(id, values),
            Ok(None) => {
                debug!(session = %id, "Unknown session");
                Session::new()
            }
            Err(e) => {
                warn!(session = %id, "Failed to fetch session: {:?}", e);
                Session::new()
            }
        }
    }

    async fn store_session(&self, session: &Session, response: &mut Response) -> Result<()> {
        let settings = self.application.settings();
        if let Some(replaced) = session.replaced_id() {
            self.datastore.remove_session(replaced).await?;
        }
        if session.is_destroyed() {
            self.datastore.remove_session(session.id()).await?;
            response.append_header(
                header::SET_COOKIE,
                &format!(
                    "{}=; Path={}; Max-Age=0",
                    settings.session_cookie,
                    cookie_path(&settings.base_path)
                ),
            )?;
            return Ok(());
        }
        // anonymous visitors that never touched their session get no cookie
        if session.needs_cookie() && session.values().is_empty() {
            return Ok(());
        }
        self.datastore
            .save_session(session.id(), session.values().clone(), settings.session_lifetime)
            .await?;
        if session.needs_cookie() {
            response.append_header(
                header::SET_COOKIE,
                &format!(
                    "{}={}; Path={}; HttpOnly",
                    settings.session_cookie,
                    session.id(),
                    cookie_path(&settings.base_path)
                ),
            )?;
        }
        Ok(())
    }
}

fn cookie_path(base_path: &str) -> &str {
    if base_path.is_empty() {
        "/"
    } else {
        base_path
    }
}

#[async_trait]
impl Handler for AppHandler {
    async fn handle(&self, stream: TcpStream, peer: SocketAddr) {
        info!(ip = ?peer, "Connection received");
        let (rx, mut tx) = stream.into_split();
        let mut reader = BufReader::new(rx);
        let mut response = match reader.read_request().await {
            Ok(request) => {
                debug!(method = %request.method, target = %request.target, "-->");
                self.respond(request).await
            }
            Err(e) => {
                warn!(ip = ?peer, "Invalid request: {}", e);
                Response::new(StatusCode::BAD_REQUEST)
            }
        };
        let _ = response.insert_header(header::CONNECTION, "close");
        debug!(status = %response.status, "<--");
        if let Err(e) = tx.write_response(&response).await {
            error!(ip = ?peer, "Failed to write response: {:?}", e);
        }
        debug!(ip = ?peer, "Connection closed");
    }
}
