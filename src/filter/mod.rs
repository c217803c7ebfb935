use serde::Serialize;

use crate::catalog::HairstyleEntry;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Facet {
    Length,
    Style,
    FaceShape,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Length, Facet::Style, Facet::FaceShape];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "length" | "len" | "lengthfilter" => Some(Self::Length),
            "style" | "stylefilter" => Some(Self::Style),
            "face" | "faceshape" | "face-shape" | "face_shape" | "facefilter" => {
                Some(Self::FaceShape)
            }
            _ => None,
        }
    }

    /// Symbolic name of the selection control bound to this facet.
    pub fn control_name(&self) -> &'static str {
        match self {
            Self::Length => "lengthFilter",
            Self::Style => "styleFilter",
            Self::FaceShape => "faceFilter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Style => "style",
            Self::FaceShape => "face shape",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FacetFilter {
    pub length: Option<String>,
    pub style: Option<String>,
    pub face_shape: Option<String>,
}

fn normalize(value: Option<&str>) -> Option<String> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => None,
    }
}

impl FacetFilter {
    pub fn new(length: Option<&str>, style: Option<&str>, face_shape: Option<&str>) -> Self {
        Self {
            length: normalize(length),
            style: normalize(style),
            face_shape: normalize(face_shape),
        }
    }

    pub fn get(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Length => self.length.as_deref(),
            Facet::Style => self.style.as_deref(),
            Facet::FaceShape => self.face_shape.as_deref(),
        }
    }

    /// Applies a change event from one facet control. Empty clears the facet.
    pub fn set(&mut self, facet: Facet, value: Option<&str>) {
        let value = normalize(value);
        match facet {
            Facet::Length => self.length = value,
            Facet::Style => self.style = value,
            Facet::FaceShape => self.face_shape = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.style.is_none() && self.face_shape.is_none()
    }

    /// Entry values are compared trimmed, the same way `catalog::facet_values`
    /// builds the option lists.
    pub fn matches(&self, entry: &HairstyleEntry) -> bool {
        let length_ok = self
            .length
            .as_deref()
            .map_or(true, |v| entry.length.trim() == v);
        let style_ok = self
            .style
            .as_deref()
            .map_or(true, |v| entry.style.trim() == v);
        let face_ok = self
            .face_shape
            .as_deref()
            .map_or(true, |v| entry.face_shapes.iter().any(|s| s.trim() == v));
        length_ok && style_ok && face_ok
    }

    pub fn apply<'a>(&self, entries: &'a [HairstyleEntry]) -> Vec<&'a HairstyleEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }

    pub fn summary(&self) -> String {
        let parts: Vec<String> = Facet::ALL
            .iter()
            .filter_map(|f| self.get(*f).map(|v| format!("{}={v}", f.label())))
            .collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}
