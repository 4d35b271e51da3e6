//! Scripted local HTTP server for fetcher and dispatcher tests.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

#[derive(Clone)]
pub(crate) enum ScriptedResponse {
    Respond { status: u16, body: String },
    /// Accept the connection and never answer.
    Hang,
}

pub(crate) fn respond(status: u16, body: &str) -> ScriptedResponse {
    ScriptedResponse::Respond {
        status,
        body: body.to_string(),
    }
}

/// A captured request head (request line plus headers).
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    pub head: String,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        self.head.lines().find_map(|line| {
            line.to_ascii_lowercase()
                .starts_with(&prefix)
                .then(|| line[prefix.len()..].trim().to_string())
        })
    }
}

/// Serves the scripted responses in order; the last one repeats.
pub(crate) struct ScriptedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    handle: JoinHandle<()>,
}

impl ScriptedServer {
    pub async fn start(responses: Vec<ScriptedResponse>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("local TCP listener should bind");
        let addr = listener.local_addr().expect("listener address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let handle = tokio::spawn({
            let requests = Arc::clone(&requests);
            async move {
                let mut index = 0;
                while let Ok((socket, _)) = listener.accept().await {
                    let response = responses
                        .get(index)
                        .or_else(|| responses.last())
                        .cloned()
                        .unwrap_or_else(|| respond(500, ""));
                    index += 1;
                    let requests = Arc::clone(&requests);
                    tokio::spawn(async move {
                        serve_one(socket, response, &requests).await;
                    });
                }
            }
        });

        Self {
            base_url: format!("http://{addr}"),
            requests,
            handle,
        }
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for ScriptedServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn serve_one(
    mut socket: TcpStream,
    response: ScriptedResponse,
    requests: &Mutex<Vec<CapturedRequest>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
        if buf.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    requests.lock().unwrap().push(CapturedRequest {
        head: String::from_utf8_lossy(&buf).to_string(),
    });

    match response {
        ScriptedResponse::Respond { status, body } => {
            let reply = format!(
                "HTTP/1.1 {status} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                reason(status),
                body.len(),
            );
            let _ = socket.write_all(reply.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
        ScriptedResponse::Hang => {
            // Hold the socket open until the client gives up.
            let _ = socket.read(&mut chunk).await;
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    }
}
