use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::Url;

use super::ProbeError;

/// Something that can attempt to load one image candidate.
///
/// The returned future settles once: `Ok` when the image is usable, `Err`
/// when it is not. Deadlines are applied by the caller.
pub trait ImageLoader: Send + Sync {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<(), ProbeError>>;
}

pub fn is_absolute_http(src: &str) -> bool {
    let lower = src.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[derive(Clone, Debug)]
pub struct HttpLoader {
    client: reqwest::Client,
}

impl HttpLoader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: Url) -> Result<(), ProbeError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ProbeError::Http {
                url: url.to_string(),
                source: e,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProbeError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        if let Some(ct) = resp.headers().get(reqwest::header::CONTENT_TYPE) {
            let ct = ct.to_str().unwrap_or_default().trim().to_ascii_lowercase();
            if !ct.is_empty() && !ct.starts_with("image/") {
                return Err(ProbeError::NotAnImage {
                    url: url.to_string(),
                    content_type: ct,
                });
            }
        }
        Ok(())
    }
}

impl ImageLoader for HttpLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<(), ProbeError>> {
        async move {
            let url = Url::parse(src).map_err(|_| ProbeError::InvalidUrl {
                url: src.to_string(),
            })?;
            self.fetch(url).await
        }
        .boxed()
    }
}

#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, src: &str) -> PathBuf {
        let src = src.strip_prefix("file://").unwrap_or(src);
        let path = Path::new(src);
        if path.is_absolute() {
            return path.to_path_buf();
        }
        let relative = src.strip_prefix("./").unwrap_or(src);
        self.root.join(relative)
    }
}

impl ImageLoader for FsLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<(), ProbeError>> {
        async move {
            let path = self.resolve(src);
            let meta = tokio::fs::metadata(&path)
                .await
                .map_err(|e| ProbeError::Missing {
                    path: path.display().to_string(),
                    source: e,
                })?;
            if !meta.is_file() {
                return Err(ProbeError::NotAFile {
                    path: path.display().to_string(),
                });
            }
            if meta.len() == 0 {
                return Err(ProbeError::EmptyFile {
                    path: path.display().to_string(),
                });
            }
            Ok(())
        }
        .boxed()
    }
}

/// Where relative candidates live.
#[derive(Clone, Debug)]
pub enum AssetBase {
    Url(Url),
    Dir(PathBuf),
}

/// Routes absolute http(s) candidates to the network and relative ones to
/// the configured asset base.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    http: HttpLoader,
    base: AssetBase,
}

impl AssetLoader {
    pub fn new(client: reqwest::Client, base: AssetBase) -> Self {
        Self {
            http: HttpLoader::new(client),
            base,
        }
    }
}

impl ImageLoader for AssetLoader {
    fn load<'a>(&'a self, src: &'a str) -> BoxFuture<'a, Result<(), ProbeError>> {
        async move {
            if is_absolute_http(src) {
                return self.http.load(src).await;
            }
            match &self.base {
                AssetBase::Url(base) => {
                    let url = base.join(src).map_err(|_| ProbeError::InvalidUrl {
                        url: src.to_string(),
                    })?;
                    self.http.fetch(url).await
                }
                AssetBase::Dir(dir) => {
                    let fs = FsLoader::new(dir.clone());
                    fs.load(src).await
                }
            }
        }
        .boxed()
    }
}
