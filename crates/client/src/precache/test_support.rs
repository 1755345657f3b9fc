//! Stub collaborators shared by the installer and cleanup tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{StatusCode, header};
use url::Url;

use super::PrecacheManager;
use crate::fetch::{FetchResponse, Fetcher};
use precache_core::{CacheDb, ContentStore, Error, PrecacheList, StoredResponse};

pub(crate) const BASE: &str = "https://app.example.com/";

#[derive(Clone)]
struct Route {
    status: StatusCode,
    body: Bytes,
    delay: Duration,
    panics: bool,
}

/// In-memory fetcher that records every request URL.
///
/// Routes are matched on the URL without its query, so cache-busted
/// requests hit the same route. Unrouted URLs fail like a network error.
#[derive(Default)]
pub(crate) struct StubFetcher {
    routes: Mutex<HashMap<String, Route>>,
    calls: Mutex<Vec<Url>>,
}

impl StubFetcher {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn route(&self, url: &str, status: u16, body: &str) {
        let status = StatusCode::from_u16(status).unwrap();
        self.insert(url, Route { status, body: Bytes::from(body.to_string()), delay: Duration::ZERO, panics: false });
    }

    pub(crate) fn route_delayed(&self, url: &str, body: &str, delay: Duration) {
        self.insert(url, Route { status: StatusCode::OK, body: Bytes::from(body.to_string()), delay, panics: false });
    }

    /// Route whose fetch panics inside the install task.
    pub(crate) fn route_panicking(&self, url: &str) {
        self.insert(url, Route { status: StatusCode::OK, body: Bytes::new(), delay: Duration::ZERO, panics: true });
    }

    fn insert(&self, url: &str, route: Route) {
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }

    pub(crate) fn calls(&self) -> Vec<Url> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        self.calls.lock().unwrap().push(url.clone());

        let mut key = url.clone();
        key.set_query(None);
        let route = self.routes.lock().unwrap().get(key.as_str()).cloned();
        let Some(route) = route else {
            return Err(Error::HttpError(format!("network error: no route for {url}")));
        };

        if route.panics {
            panic!("fetcher panicked for {url}");
        }

        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/plain"));

        Ok(FetchResponse {
            url: url.clone(),
            final_url: url.clone(),
            status: route.status,
            content_type: Some("text/plain".to_string()),
            bytes: route.body,
            headers,
            fetch_ms: route.delay.as_millis() as u64,
        })
    }
}

/// Content store whose writes always fail.
pub(crate) struct FailingContent;

#[async_trait]
impl ContentStore for FailingContent {
    async fn put_response(&self, _response: &StoredResponse) -> Result<(), Error> {
        Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
    }

    async fn get_response(&self, _url: &str) -> Result<Option<StoredResponse>, Error> {
        Ok(None)
    }

    async fn delete_response(&self, _url: &str) -> Result<(), Error> {
        Err(Error::Database(tokio_rusqlite::Error::ConnectionClosed))
    }

    async fn response_urls(&self) -> Result<Vec<String>, Error> {
        Ok(Vec::new())
    }
}

/// Manager over `db` for both stores, with an empty list based at [`BASE`].
pub(crate) fn manager(db: &CacheDb, fetcher: &Arc<StubFetcher>) -> PrecacheManager {
    manager_with_content(db, Arc::new(db.clone()), fetcher)
}

pub(crate) fn manager_with_content(
    db: &CacheDb, content: Arc<dyn ContentStore>, fetcher: &Arc<StubFetcher>,
) -> PrecacheManager {
    let list = PrecacheList::new(Url::parse(BASE).unwrap());
    PrecacheManager::new(list, Arc::new(db.clone()), content, fetcher.clone(), "_precache")
}
