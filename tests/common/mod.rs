//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// A mock HTTP server serving config files by request path.
///
/// Paths not registered answer 404. Routes can be changed while the server
/// runs to simulate a config being edited remotely.
#[derive(Clone)]
pub struct MockConfigServer {
    addr: SocketAddr,
    routes: Arc<Mutex<HashMap<String, (u16, String)>>>,
}

#[allow(dead_code)]
impl MockConfigServer {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes: Arc<Mutex<HashMap<String, (u16, String)>>> = Arc::default();

        let served = Arc::clone(&routes);
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((mut socket, _)) => {
                        let routes = Arc::clone(&served);
                        tokio::spawn(async move {
                            let Some(path) = read_request_path(&mut socket).await else {
                                return;
                            };
                            let (status, body) = routes
                                .lock()
                                .unwrap()
                                .get(&path)
                                .cloned()
                                .unwrap_or((404, "not found".to_string()));
                            let status_text = match status {
                                200 => "200 OK",
                                301 => "301 Moved Permanently",
                                404 => "404 Not Found",
                                500 => "500 Internal Server Error",
                                503 => "503 Service Unavailable",
                                _ => "200 OK",
                            };

                            let response = format!(
                                "HTTP/1.1 {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                                status_text,
                                body.len(),
                                body
                            );
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        });
                    }
                    Err(_) => break,
                }
            }
        });

        Self { addr, routes }
    }

    /// Serve `body` with status 200 at `path`.
    pub fn serve(&self, path: &str, body: &str) {
        self.respond(path, 200, body);
    }

    pub fn respond(&self, path: &str, status: u16, body: &str) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

async fn read_request_path(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let head = String::from_utf8_lossy(&buf);
    let request_line = head.lines().next()?;
    request_line.split_whitespace().nth(1).map(str::to_string)
}

/// Write `body` to `name` inside `dir` and return the full path.
#[allow(dead_code)]
pub fn write_config(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, body).unwrap();
    path
}
