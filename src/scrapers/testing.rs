use std::cell::Cell;
use std::collections::HashMap;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use url::Url;

use super::traits::PageFetcher;

/// Serves canned pages and records every requested URL
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, String>,
    requested: Vec<String>,
    released: Option<Rc<Cell<bool>>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    /// Flag flipped to `true` when the fetcher is dropped
    pub fn release_flag(&mut self) -> Rc<Cell<bool>> {
        let flag = Rc::new(Cell::new(false));
        self.released = Some(flag.clone());
        flag
    }

    pub fn requested(&self) -> Vec<&str> {
        self.requested.iter().map(String::as_str).collect()
    }
}

impl PageFetcher for StubFetcher {
    fn fetch(&mut self, url: &Url) -> Result<String> {
        self.requested.push(url.to_string());
        self.pages
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| anyhow!("no page stubbed for {}", url))
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

impl Drop for StubFetcher {
    fn drop(&mut self) {
        if let Some(flag) = &self.released {
            flag.set(true);
        }
    }
}

/// Collects formatted log output in memory
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Run `f` with a subscriber writing into this capture
    pub fn run<R>(&self, f: impl FnOnce() -> R) -> R {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::with_default(subscriber, f)
    }

    /// Number of log lines containing every one of `needles`
    pub fn lines_containing(&self, needles: &[&str]) -> usize {
        let buffer = self.0.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&buffer)
            .lines()
            .filter(|line| needles.iter().all(|needle| line.contains(needle)))
            .count()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut buffer) = self.0.lock() {
            buffer.extend_from_slice(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
