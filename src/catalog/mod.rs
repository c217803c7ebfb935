use std::path::PathBuf;
use std::time::Duration;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::filter::Facet;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct HairstyleEntry {
    pub name: String,
    pub length: String,
    pub style: String,
    #[serde(rename = "faceShapes", default)]
    pub face_shapes: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
}

impl HairstyleEntry {
    pub fn facet_value(&self, facet: Facet) -> Vec<&str> {
        match facet {
            Facet::Length => vec![self.length.as_str()],
            Facet::Style => vec![self.style.as_str()],
            Facet::FaceShape => self.face_shapes.iter().map(|s| s.as_str()).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(reqwest::Url),
}

impl DataSource {
    pub fn parse(value: &str) -> Result<Self, CatalogError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CatalogError::EmptySource);
        }
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            let url = reqwest::Url::parse(trimmed).map_err(|_| CatalogError::InvalidUrl {
                url: trimmed.to_string(),
            })?;
            return Ok(Self::Url(url));
        }
        Ok(Self::File(config::expand_tilde(trimmed)))
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("data source is empty")]
    EmptySource,

    #[error("invalid data URL: {url}")]
    InvalidUrl { url: String },

    #[error("failed to read data file: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch data: {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("data request returned status {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("failed to parse hairstyle data: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug)]
pub struct Catalog {
    pub source: DataSource,
    pub entries: Vec<HairstyleEntry>,
}

/// Deadline for fetching a remote data document. Independent of the image
/// probe timeout.
pub const DATA_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

pub fn parse(json: &str) -> Result<Vec<HairstyleEntry>, CatalogError> {
    serde_json::from_str::<Vec<HairstyleEntry>>(json).map_err(|e| CatalogError::Parse { source: e })
}

pub async fn load(source: &DataSource, client: &reqwest::Client) -> Result<Catalog, CatalogError> {
    let body = match source {
        DataSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CatalogError::Read {
                    path: path.display().to_string(),
                    source: e,
                })?
        }
        DataSource::Url(url) => {
            let resp = client
                .get(url.clone())
                .timeout(DATA_FETCH_TIMEOUT)
                .send()
                .await
                .map_err(|e| CatalogError::Fetch {
                    url: url.to_string(),
                    source: e,
                })?;
            let status = resp.status();
            if !status.is_success() {
                return Err(CatalogError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            resp.text().await.map_err(|e| CatalogError::Fetch {
                url: url.to_string(),
                source: e,
            })?
        }
    };

    Ok(Catalog {
        source: source.clone(),
        entries: parse(&body)?,
    })
}

/// Distinct values of one facet across the catalog, in first-seen order.
pub fn facet_values(entries: &[HairstyleEntry], facet: Facet) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| e.facet_value(facet))
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .unique()
        .map(|v| v.to_string())
        .collect()
}
