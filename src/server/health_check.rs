use async_trait::async_trait;
use http::StatusCode;
use std::net::SocketAddr;
use tokio::net::TcpStream;

use crate::http::{server::Handler, Response, WriteResponse};

pub struct HealthCheck;

#[async_trait]
impl Handler for HealthCheck {
    async fn handle(&self, mut stream: TcpStream, _peer: SocketAddr) {
        if let Err(e) = stream.write_response(&Response::new(StatusCode::OK)).await {
            essentials::error!("Failed to write to stream: {:?}", e);
        }
    }
}
