//! Shared utilities for integration testing.

use contact_api::config::ApiConfig;
use contact_api::http::{HttpServer, CONTACTS_PATH};
use contact_api::lifecycle::Shutdown;
use contact_sdk::{ContactClient, NewContact};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A contact API server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
    handle: JoinHandle<std::io::Result<()>>,
}

impl TestServer {
    pub fn endpoint(&self) -> String {
        format!("http://{}{}", self.addr, CONTACTS_PATH)
    }

    pub fn client(&self) -> ContactClient {
        ContactClient::with_client(http_client(), &self.endpoint())
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handle).await;
    }
}

/// A reqwest client that never goes through a system proxy.
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

pub async fn start_server(config: ApiConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config).unwrap();

    let shutdown = Shutdown::new();
    let listener_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, listener_shutdown).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Start a backend that answers every request with a fixed non-JSON response.
#[allow(dead_code)]
pub async fn start_plain_backend(status_line: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let response = format!(
                    "{}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

#[allow(dead_code)]
pub fn contact(nama: &str, telepon: &str, email: &str) -> NewContact {
    NewContact::new(nama, telepon, email)
}
