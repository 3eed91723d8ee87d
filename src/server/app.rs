use essentials::{debug, error};
use tokio::sync::{mpsc, oneshot};

use crate::http::server::Server as HttpServer;
use crate::session::{Datastore, InMemoryDatastore};
use crate::Application;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use super::handler::{AppHandler, DatastoreService};
use super::health_check::HealthCheck;

/// A builder for a server.
pub struct ServerBuilder {
    application: Application,
    datastore: DatastoreService,
    host: IpAddr,
    app_port: u16,
    health_check_port: u16,
}

impl ServerBuilder {
    fn new(application: Application) -> Self {
        Self {
            application,
            datastore: Arc::new(InMemoryDatastore::new()),
            host: IpAddr::from([127, 0, 0, 1]), // Default host (localhost)
            app_port: 80,
            health_check_port: 9000,
        }
    }

    /// Set the store sessions are kept in.
    /// The default store keeps them in memory.
    pub fn with_datastore<D: Datastore + Send + Sync + 'static>(mut self, datastore: D) -> Self {
        self.datastore = Arc::new(datastore);
        self
    }

    /// Set the host for the application service.
    /// The default host is 127.0.0.1
    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }

    /// Set the port for the application service.
    /// The default port is 80
    pub fn with_app_port(mut self, port: u16) -> Self {
        self.app_port = port;
        self
    }

    /// Set the port for the health check service.
    /// The default port is 9000
    pub fn with_health_check_port(mut self, port: u16) -> Self {
        self.health_check_port = port;
        self
    }

    /// Build the server with the given configuration.
    pub fn build(self) -> Server {
        Server {
            app: HttpServer::new(
                SocketAddr::new(self.host, self.app_port),
                AppHandler::new(Arc::new(self.application), self.datastore),
            ),
            health_check: HttpServer::new(
                SocketAddr::new(self.host, self.health_check_port),
                HealthCheck,
            ),
        }
    }
}

pub struct Server {
    pub app: HttpServer<AppHandler>,
    pub health_check: HttpServer<HealthCheck>,
}

impl Server {
    /// Start the server. Returns once either service stops.
    pub async fn run(self) {
        let Server { app, health_check } = self;
        debug!(app = %app.addr(), health_check = %health_check.addr(), "Starting server");
        let (tx_app, rx_app) = oneshot::channel();
        let (tx_health, rx_health) = oneshot::channel();
        let (tx, mut rx) = mpsc::channel(2);
        let tx_2 = tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                result = app.run() => {
                    debug!("App stopped");
                    let _ = tx_health.send(());
                    if let Err(err) = result {
                        error!("App error: {:?}", err);
                    }
                }
                _ = rx_app => {}
            }
            let _ = tx.send(()).await;
        });
        tokio::spawn(async move {
            tokio::select! {
                result = health_check.run() => {
                    debug!("health_check stopped");
                    let _ = tx_app.send(());
                    if let Err(err) = result {
                        error!("health_check error: {:?}", err);
                    }
                }
                _ = rx_health => {}
            }
            let _ = tx_2.send(()).await;
        });
        rx.recv().await;
        debug!("Server stopped");
    }
}

/// Create a new server builder serving `application`.
pub fn builder(application: Application) -> ServerBuilder {
    ServerBuilder::new(application)
}
