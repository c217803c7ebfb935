use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::carousel::DEFAULT_SWIPE_THRESHOLD;
use crate::catalog::{self, CatalogError, DataSource, HairstyleEntry};
use crate::filter::{Facet, FacetFilter};
use crate::gallery::Gallery;
use crate::output::PageModel;
use crate::probe::{AssetBase, AssetLoader, ImageResolver, DEFAULT_IMAGE, DEFAULT_PROBE_TIMEOUT};
use crate::utils::{self, Reporter};

#[derive(Clone, Debug)]
pub struct Options {
    pub data: String,
    pub filter: FacetFilter,
    pub timeout: Duration,
    pub base_url: Option<String>,
    pub asset_dir: Option<String>,
    pub default_image: String,
    pub swipe_threshold: f32,
    pub user_agent: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            data: "./hairstyles.json".to_string(),
            filter: FacetFilter::default(),
            timeout: DEFAULT_PROBE_TIMEOUT,
            base_url: None,
            asset_dir: None,
            default_image: DEFAULT_IMAGE.to_string(),
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            user_agent: utils::DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid data source: {source}")]
    InvalidSource {
        #[source]
        source: CatalogError,
    },

    #[error("invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    #[error("timeout must be positive")]
    InvalidTimeout,

    #[error("invalid swipe threshold {value}, expected a positive number of pixels")]
    InvalidSwipeThreshold { value: f32 },

    #[error("default image must not be empty")]
    EmptyDefaultImage,

    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to load hairstyles: {source}")]
    Catalog {
        #[source]
        source: CatalogError,
    },
}

#[derive(Debug)]
pub struct GalleryRun {
    pub started_at: Instant,
    pub elapsed: Duration,
    pub source: DataSource,
    pub gallery: Gallery,
}

impl GalleryRun {
    pub fn page(&self) -> PageModel {
        build_page(&self.gallery)
    }
}

pub fn build_page(gallery: &Gallery) -> PageModel {
    let entries: &[HairstyleEntry] = gallery.entries();
    PageModel {
        filter: gallery.filter().clone(),
        lengths: catalog::facet_values(entries, Facet::Length),
        styles: catalog::facet_values(entries, Facet::Style),
        face_shapes: catalog::facet_values(entries, Facet::FaceShape),
        gallery: gallery.view(),
    }
}

fn data_dir(source: &DataSource) -> PathBuf {
    match source {
        DataSource::File(path) => path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        DataSource::Url(_) => PathBuf::from("."),
    }
}

#[derive(Debug)]
pub struct Runner {
    options: Options,
    source: DataSource,
    base: AssetBase,
    client: reqwest::Client,
    reporter: Reporter,
}

impl Runner {
    pub fn new(options: Options) -> Result<Self, RunnerError> {
        if options.timeout.is_zero() {
            return Err(RunnerError::InvalidTimeout);
        }
        if !(options.swipe_threshold.is_finite() && options.swipe_threshold > 0.0) {
            return Err(RunnerError::InvalidSwipeThreshold {
                value: options.swipe_threshold,
            });
        }
        if options.default_image.trim().is_empty() {
            return Err(RunnerError::EmptyDefaultImage);
        }
        let source =
            DataSource::parse(&options.data).map_err(|e| RunnerError::InvalidSource { source: e })?;

        // Relative images follow the data: explicit base URL, explicit asset
        // dir, a URL data source, then the data file's directory.
        let base = match (options.base_url.as_deref(), options.asset_dir.as_deref(), &source) {
            (Some(raw), _, _) => {
                let url = reqwest::Url::parse(raw.trim()).map_err(|_| RunnerError::InvalidBaseUrl {
                    url: raw.to_string(),
                })?;
                AssetBase::Url(url)
            }
            (None, Some(dir), _) => AssetBase::Dir(crate::config::expand_tilde(dir)),
            (None, None, DataSource::Url(url)) => AssetBase::Url(url.clone()),
            (None, None, src) => AssetBase::Dir(data_dir(src)),
        };

        let client = utils::build_http_client(&options.user_agent)
            .map_err(|e| RunnerError::HttpClientBuild { source: e })?;

        Ok(Self {
            options,
            source,
            base,
            client,
            reporter: Reporter::silent(),
        })
    }

    pub fn reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn asset_base(&self) -> &AssetBase {
        &self.base
    }

    pub async fn load(&self) -> Result<Vec<HairstyleEntry>, RunnerError> {
        let catalog = catalog::load(&self.source, &self.client)
            .await
            .map_err(|e| RunnerError::Catalog { source: e })?;
        Ok(catalog.entries)
    }

    /// Builds an unrendered gallery over `entries`.
    pub fn gallery(&self, entries: Vec<HairstyleEntry>) -> Gallery {
        let loader = AssetLoader::new(self.client.clone(), self.base.clone());
        let resolver = ImageResolver::new(Arc::new(loader))
            .timeout(self.options.timeout)
            .default_image(self.options.default_image.trim())
            .reporter(self.reporter.clone());
        Gallery::new(entries, resolver).swipe_threshold(self.options.swipe_threshold)
    }

    pub async fn run(&self) -> Result<GalleryRun, RunnerError> {
        let started_at = Instant::now();
        let entries = self.load().await?;
        let mut gallery = self.gallery(entries);
        gallery.render(self.options.filter.clone()).await;
        Ok(GalleryRun {
            started_at,
            elapsed: started_at.elapsed(),
            source: self.source.clone(),
            gallery,
        })
    }
}
