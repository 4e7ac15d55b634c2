use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct StubResponse {
    pub status: u16,
    pub body: String,
    pub content_type: &'static str,
}

#[allow(dead_code)]
impl StubResponse {
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            content_type: "text/html; charset=utf-8",
        }
    }

    pub fn json(value: serde_json::Value) -> Self {
        Self {
            status: 200,
            body: value.to_string(),
            content_type: "application/json",
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!("status {status}"),
            content_type: "text/plain",
        }
    }
}

/// Local HTTP server answering every request through `handler`, keyed by path and query.
pub struct StubServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
impl StubServer {
    pub fn spawn<H>(mut handler: H) -> Self
    where
        H: FnMut(&str) -> StubResponse + Send + 'static,
    {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start stub server");
        let base_url = format!("http://{}", server.server_addr());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&requests);

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                seen.lock().expect("lock request log").push(url.clone());

                let reply = handler(&url);
                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    reply.content_type.as_bytes(),
                )
                .expect("build header");
                let response = tiny_http::Response::from_string(reply.body)
                    .with_status_code(reply.status)
                    .with_header(header);
                let _ = request.respond(response);
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{path_and_query}", self.base_url)
    }

    /// Path and query of every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock request log").clone()
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
