pub mod loader;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

use crate::utils::Reporter;

pub use loader::{AssetBase, AssetLoader, FsLoader, HttpLoader, ImageLoader};

pub const DEFAULT_IMAGE: &str = "./images/haircut.jpg";
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid image URL: {url}")]
    InvalidUrl { url: String },

    #[error("image request failed: {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("image request returned status {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("not an image ({content_type}): {url}")]
    NotAnImage { url: String, content_type: String },

    #[error("image file not found: {path}: {source}")]
    Missing {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("image path is not a file: {path}")]
    NotAFile { path: String },

    #[error("image file is empty: {path}")]
    EmptyFile { path: String },
}

/// Result of racing one candidate against its deadline.
#[derive(Debug)]
pub enum ProbeOutcome {
    Loaded,
    Failed(ProbeError),
    TimedOut,
}

impl ProbeOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ProbeOutcome::Loaded)
    }
}

/// The ordered, never-empty image list shown on one card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DisplaySet {
    images: Vec<String>,
    fallback: bool,
}

impl DisplaySet {
    pub fn fallback(default_image: &str) -> Self {
        Self {
            images: vec![default_image.to_string()],
            fallback: true,
        }
    }

    /// Builds a set from accepted candidates, falling back when there are none.
    pub fn from_accepted(accepted: Vec<String>, default_image: &str) -> Self {
        if accepted.is_empty() {
            return Self::fallback(default_image);
        }
        Self {
            images: accepted,
            fallback: false,
        }
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Drops blank entries and trims the rest, keeping source order.
pub fn candidates(raw: &[String]) -> Vec<String> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Races one load against `timeout`. Whichever settles first decides the
/// outcome; the other branch is dropped, so a timed-out load can never report
/// success afterwards and a settled load cancels its timer.
pub async fn probe(loader: &dyn ImageLoader, src: &str, timeout: Duration) -> ProbeOutcome {
    let load = loader.load(src);
    let deadline = tokio::time::sleep(timeout);
    tokio::select! {
        biased;
        res = load => match res {
            Ok(()) => ProbeOutcome::Loaded,
            Err(e) => ProbeOutcome::Failed(e),
        },
        _ = deadline => ProbeOutcome::TimedOut,
    }
}

#[derive(Clone)]
pub struct ImageResolver {
    loader: Arc<dyn ImageLoader>,
    timeout: Duration,
    default_image: String,
    reporter: Reporter,
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("timeout", &self.timeout)
            .field("default_image", &self.default_image)
            .finish()
    }
}

impl ImageResolver {
    pub fn new(loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            loader,
            timeout: DEFAULT_PROBE_TIMEOUT,
            default_image: DEFAULT_IMAGE.to_string(),
            reporter: Reporter::silent(),
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn default_image(mut self, default_image: impl Into<String>) -> Self {
        self.default_image = default_image.into();
        self
    }

    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn set_reporter(&mut self, reporter: Reporter) {
        self.reporter = reporter;
    }

    pub fn default_image_path(&self) -> &str {
        &self.default_image
    }

    /// Probes candidates one at a time in source order.
    pub async fn resolve(&self, raw: &[String]) -> DisplaySet {
        let mut accepted = Vec::new();
        for src in candidates(raw) {
            let outcome = probe(self.loader.as_ref(), &src, self.timeout).await;
            match &outcome {
                ProbeOutcome::Loaded => self.reporter.debug(&format!("image ok: {src}")),
                ProbeOutcome::Failed(e) => self.reporter.debug(&format!("image skipped: {e}")),
                ProbeOutcome::TimedOut => self.reporter.debug(&format!(
                    "image skipped: {src} did not load within {:?}",
                    self.timeout
                )),
            }
            if let Some(pb) = self.reporter.progress() {
                pb.inc(1);
            }
            if outcome.is_loaded() {
                accepted.push(src);
            }
        }
        DisplaySet::from_accepted(accepted, &self.default_image)
    }
}
