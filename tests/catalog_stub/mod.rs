use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::Value;

/// How the stub answers `GET /books/`.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub enum ListingBehavior {
    Books(Vec<Value>),
    ServerError,
}

#[derive(Debug, Clone)]
pub struct CatalogStubConfig {
    pub listing: ListingBehavior,
    /// Book records by id, returned as-is from `GET /books/{id}`.
    pub books: HashMap<String, Value>,
    /// Analysis payloads by id, wrapped the way the service wraps them.
    pub analyses: HashMap<String, Value>,
    /// Ids whose lookup fails with a 500.
    pub broken: Vec<String>,
}

impl Default for CatalogStubConfig {
    fn default() -> Self {
        Self {
            listing: ListingBehavior::Books(Vec::new()),
            books: HashMap::new(),
            analyses: HashMap::new(),
            broken: Vec::new(),
        }
    }
}

#[allow(dead_code)]
impl CatalogStubConfig {
    pub fn with_book(mut self, book: Value) -> Self {
        let id = book_id_of(&book);
        self.books.insert(id, book);
        self
    }

    pub fn with_analysis(mut self, book_id: &str, analysis: Value) -> Self {
        self.analyses.insert(book_id.to_owned(), analysis);
        self
    }

    pub fn with_broken(mut self, book_id: &str) -> Self {
        self.broken.push(book_id.to_owned());
        self
    }
}

pub struct CatalogStub {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl CatalogStub {
    pub fn spawn(config: CatalogStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start catalog stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

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

                let path = request.url().to_string();
                seen.lock().expect("lock request log").push(path.clone());

                if request.method() != &tiny_http::Method::Get {
                    let _ = request.respond(json_response(405, detail("Method Not Allowed")));
                    continue;
                }

                let (status, body) = route(&config, &path);
                let _ = request.respond(json_response(status, body));
            }
        });

        Self {
            base_url,
            requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Paths requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("lock request log").clone()
    }
}

impl Drop for CatalogStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn route(config: &CatalogStubConfig, path: &str) -> (u16, Value) {
    if path == "/books/" {
        return match &config.listing {
            ListingBehavior::Books(books) => (200, serde_json::json!({ "books": books })),
            ListingBehavior::ServerError => (500, detail("database unavailable")),
        };
    }

    let Some(rest) = path.strip_prefix("/books/") else {
        return (404, detail("Not Found"));
    };

    if let Some(id) = rest.strip_suffix("/analyze") {
        let Some(book) = config.books.get(id) else {
            return (404, detail("Book not found"));
        };
        return match config.analyses.get(id) {
            Some(analysis) => {
                let mut body = book.clone();
                body["analysis"] = analysis.clone();
                (200, body)
            }
            None => (500, detail("analysis failed")),
        };
    }

    if config.broken.iter().any(|broken| broken == rest) {
        return (500, detail("upstream error"));
    }
    match config.books.get(rest) {
        Some(book) => (200, book.clone()),
        None => (404, detail("Book metadata not found")),
    }
}

fn detail(message: &str) -> Value {
    serde_json::json!({ "detail": message })
}

fn json_response(status: u16, body: Value) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
    let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .expect("build header");
    tiny_http::Response::from_string(body.to_string())
        .with_status_code(status)
        .with_header(header)
}

fn book_id_of(book: &Value) -> String {
    match &book["book_id"] {
        Value::String(id) => id.clone(),
        other => other.to_string(),
    }
}
