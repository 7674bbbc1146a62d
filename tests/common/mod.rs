//! In-memory fetcher shared by the integration tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use vcon_dialog::{FetchResponse, Fetcher, Result};

/// Serves registered URLs; anything else is a 404
#[derive(Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, FetchResponse>,
    pub requests: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(mut self, url: &str, mimetype: &str, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let response = FetchResponse::new(200)
            .with_header("Content-Type", mimetype)
            .with_header("Content-Length", body.len().to_string())
            .with_body(body);
        self.resources.insert(url.to_string(), response);
        self
    }

    fn lookup(&self, method: &str, url: &str) -> FetchResponse {
        self.requests.borrow_mut().push(format!("{method} {url}"));
        self.resources
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchResponse::new(404))
    }
}

impl Fetcher for MemoryFetcher {
    fn head(&self, url: &str) -> Result<FetchResponse> {
        let mut response = self.lookup("HEAD", url);
        response.body.clear();
        Ok(response)
    }

    fn get(&self, url: &str) -> Result<FetchResponse> {
        Ok(self.lookup("GET", url))
    }
}
