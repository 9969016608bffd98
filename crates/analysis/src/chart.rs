//! Renderer-neutral chart descriptions.
//!
//! A `ChartSpec` pairs a summary table with the handful of encoding
//! instructions a plotting backend needs. Backends implement
//! [`ChartRenderer`].

use serde::Serialize;

use crate::model::SummaryTable;

/// Color used for marks outside the active selection.
pub const UNSELECTED_COLOR: &str = "lightgray";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mark {
    /// Pie slice.
    Arc,
    Bar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Nominal,
    Ordinal,
    Quantitative,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Channel {
    pub field: String,
    pub kind: FieldKind,
    /// Backend sort directive, e.g. `-y` for descending by the y channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl Channel {
    pub fn nominal(field: &str) -> Self {
        Self { field: field.to_string(), kind: FieldKind::Nominal, sort: None }
    }

    pub fn ordinal(field: &str) -> Self {
        Self { field: field.to_string(), kind: FieldKind::Ordinal, sort: None }
    }

    pub fn quantitative(field: &str) -> Self {
        Self { field: field.to_string(), kind: FieldKind::Quantitative, sort: None }
    }

    pub fn sorted(mut self, sort: &str) -> Self {
        self.sort = Some(sort.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorEncoding {
    Field(Channel),
    /// Field color inside the named selection, a constant outside it.
    Conditional { selection: String, field: Channel, otherwise: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Encoding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theta: Option<Channel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<ColorEncoding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tooltip: Vec<Channel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetLayout {
    Rows,
    Columns,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Facet {
    pub field: Channel,
    pub layout: FacetLayout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Single-value selection bound to a drop-down of `options`.
    Dropdown { name: String, field: String, options: Vec<String> },
    /// Click / shift-click selection over `fields`.
    Multi { name: String, fields: Vec<String> },
}

impl Selection {
    pub fn name(&self) -> &str {
        match self {
            Self::Dropdown { name, .. } | Self::Multi { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub mark: Mark,
    pub data: SummaryTable,
    pub encoding: Encoding,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facet: Option<Facet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
}

/// A plotting backend.
pub trait ChartRenderer {
    type Output;
    type Error;

    fn render(&self, spec: &ChartSpec) -> Result<Self::Output, Self::Error>;
}
