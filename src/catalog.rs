use std::time::Duration;

use anyhow::Context as _;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::app::model::{Analysis, Book};

/// Result of one catalog call, tagged by the three branches the view reacts to.
#[derive(Debug)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
    Failed(anyhow::Error),
}

impl<T> Outcome<T> {
    pub fn and_then<U>(self, f: impl FnOnce(T) -> anyhow::Result<U>) -> Outcome<U> {
        match self {
            Self::Found(value) => match f(value) {
                Ok(value) => Outcome::Found(value),
                Err(err) => Outcome::Failed(err),
            },
            Self::NotFound => Outcome::NotFound,
            Self::Failed(err) => Outcome::Failed(err),
        }
    }
}

impl<T> From<anyhow::Result<Option<T>>> for Outcome<T> {
    fn from(result: anyhow::Result<Option<T>>) -> Self {
        match result {
            Ok(Some(value)) => Self::Found(value),
            Ok(None) => Self::NotFound,
            Err(err) => Self::Failed(err),
        }
    }
}

#[async_trait]
pub trait Catalog: Send + Sync {
    async fn list_books(&self) -> Outcome<Vec<Book>>;
    async fn get_book(&self, book_id: &str) -> Outcome<Book>;
    async fn analyze_book(&self, book_id: &str) -> Outcome<Analysis>;
}

#[derive(Debug, Deserialize)]
struct BookList {
    books: Vec<Book>,
}

#[derive(Debug, Deserialize)]
struct AnalyzedBook {
    #[serde(default)]
    analysis: Option<Analysis>,
}

/// Catalog/analysis service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpCatalog {
    pub fn new(base_url: Url, request_timeout: Option<Duration>) -> anyhow::Result<Self> {
        if base_url.cannot_be_a_base() {
            anyhow::bail!("catalog base url cannot carry a path: {base_url}");
        }
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("build catalog http client")?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded,
    /// so an id containing `/` stays a single segment.
    pub fn endpoint(&self, segments: &[&str]) -> anyhow::Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                anyhow::anyhow!("catalog base url cannot carry a path: {}", self.base_url)
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> anyhow::Result<Option<T>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {url}"))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(%url, "catalog returned not found");
            return Ok(None);
        }

        if !status.is_success() {
            let raw = response
                .text()
                .await
                .with_context(|| format!("read error body: {url}"))?;
            let message = parse_error_detail(&raw).unwrap_or(raw);
            anyhow::bail!("catalog service error ({status}) for {url}: {message}");
        }

        let value = response
            .json::<T>()
            .await
            .with_context(|| format!("decode response: {url}"))?;
        Ok(Some(value))
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn list_books(&self) -> Outcome<Vec<Book>> {
        let url = match self.endpoint(&["books", ""]) {
            Ok(url) => url,
            Err(err) => return Outcome::Failed(err),
        };
        Outcome::from(self.get_json::<BookList>(url).await).and_then(|list| Ok(list.books))
    }

    async fn get_book(&self, book_id: &str) -> Outcome<Book> {
        let url = match self.endpoint(&["books", book_id]) {
            Ok(url) => url,
            Err(err) => return Outcome::Failed(err),
        };
        self.get_json(url).await.into()
    }

    async fn analyze_book(&self, book_id: &str) -> Outcome<Analysis> {
        let url = match self.endpoint(&["books", book_id, "analyze"]) {
            Ok(url) => url,
            Err(err) => return Outcome::Failed(err),
        };
        Outcome::from(self.get_json::<AnalyzedBook>(url).await).and_then(|body| {
            body.analysis
                .ok_or_else(|| anyhow::anyhow!("analysis response for {book_id} has no analysis"))
        })
    }
}

// FastAPI reports errors as `{"detail": "..."}`.
fn parse_error_detail(raw_json: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw_json).ok()?;
    let detail = value.get("detail")?.as_str()?.to_owned();
    Some(detail)
}
