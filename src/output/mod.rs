pub mod page;

use serde::Serialize;

use crate::filter::FacetFilter;
use crate::gallery::GalleryView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Html,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        return Some(OutputFormat::Html);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

/// Everything a renderer needs for one page.
#[derive(Clone, Debug, Serialize)]
pub struct PageModel {
    pub filter: FacetFilter,
    pub lengths: Vec<String>,
    pub styles: Vec<String>,
    pub face_shapes: Vec<String>,
    pub gallery: GalleryView,
}

pub fn render_text(page: &PageModel) -> Vec<u8> {
    let mut out = String::new();
    match &page.gallery {
        GalleryView::NoResults => out.push_str("no hairstyles match the selected filters\n"),
        GalleryView::Cards(cards) => {
            for c in cards {
                let current = c.images.iter().position(|i| i.active).unwrap_or(0);
                out.push_str(&format!(
                    "[{}] {} ({}, {}) images={} showing={}{}\n",
                    c.slot,
                    c.name,
                    c.length,
                    c.style,
                    c.images.len(),
                    current + 1,
                    if c.fallback { " fallback" } else { "" }
                ));
            }
        }
    }
    out.into_bytes()
}

pub fn render_json(page: &PageModel) -> Vec<u8> {
    serde_json::to_vec_pretty(page).unwrap_or_else(|_| b"{}\n".to_vec())
}

pub fn render_html(page: &PageModel) -> Vec<u8> {
    page::render_html(page)
}

pub fn render(format: OutputFormat, page: &PageModel) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(page),
        OutputFormat::Json => render_json(page),
        OutputFormat::Html => render_html(page),
    }
}
