//! In-process mock of the admin backend, served over real HTTP by `tiny_http`.

#![allow(dead_code)]

use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use tiny_http::{Header, Response, Server, StatusCode};

use admin_console::api::UreqTransport;
use admin_console::app::Console;
use admin_console::config::ConsoleConfig;
use admin_console::storage::{MemoryStorage, Storage};

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path and query, including the `/api` prefix.
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Recorded {
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap_or(serde_json::Value::Null)
    }
}

type Handler = dyn Fn(&Recorded) -> (u16, String) + Send + 'static;

pub struct MockBackend {
    server: Arc<Server>,
    handle: Option<JoinHandle<()>>,
    seen: Arc<Mutex<Vec<Recorded>>>,
    pub base_url: String,
}

impl MockBackend {
    /// Serve every request with `handler`, which returns status and body.
    pub fn start<F>(handler: F) -> Self
    where
        F: Fn(&Recorded) -> (u16, String) + Send + 'static,
    {
        let server = Arc::new(Server::http("127.0.0.1:0").expect("bind mock backend"));
        let addr = server.server_addr().to_ip().expect("tcp listener");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let handler: Box<Handler> = Box::new(handler);
        let handle = {
            let server = server.clone();
            let seen = seen.clone();
            std::thread::spawn(move || {
                for mut request in server.incoming_requests() {
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);

                    let authorization = request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.as_str().to_string());

                    let recorded = Recorded {
                        method: request.method().to_string(),
                        url: request.url().to_string(),
                        authorization,
                        body,
                    };

                    let (status, reply) = handler(&recorded);
                    seen.lock().unwrap().push(recorded);

                    let content_type =
                        Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                            .unwrap();
                    let response = Response::from_string(reply)
                        .with_header(content_type)
                        .with_status_code(StatusCode(status));
                    let _ = request.respond(response);
                }
            })
        };

        Self {
            server,
            handle: Some(handle),
            seen,
            base_url: format!("http://{addr}/api"),
        }
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> Recorded {
        self.requests().pop().expect("no request reached the backend")
    }

    /// Console wired to this backend with the given storage.
    pub fn console_with(&self, storage: Rc<dyn Storage>) -> Console {
        let mut config = ConsoleConfig::default();
        config.api.base_url = self.base_url.clone();
        Console::with_parts(
            config,
            storage,
            Box::new(UreqTransport::new(Duration::from_secs(5))),
        )
    }

    /// Console wired to this backend with fresh in-memory storage.
    pub fn console(&self) -> (Console, Rc<MemoryStorage>) {
        let storage = Rc::new(MemoryStorage::new());
        (self.console_with(storage.clone()), storage)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

pub fn ok(body: &str) -> (u16, String) {
    (200, body.to_string())
}

pub fn empty() -> (u16, String) {
    (200, String::new())
}
