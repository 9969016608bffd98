//! Vega-Lite v5 backend for `ChartSpec`.

use std::convert::Infallible;

use moodgrid_analysis::chart::{
    Channel, ChartRenderer, ChartSpec, ColorEncoding, FacetLayout, FieldKind, Mark, Selection,
};
use serde_json::{json, Map, Value};

pub const SCHEMA_URL: &str = "https://vega.github.io/schema/vega-lite/v5.json";

pub struct VegaLite;

impl ChartRenderer for VegaLite {
    type Output = Value;
    type Error = Infallible;

    fn render(&self, spec: &ChartSpec) -> Result<Value, Infallible> {
        Ok(to_vega_lite(spec))
    }
}

fn field_type(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Nominal => "nominal",
        FieldKind::Ordinal => "ordinal",
        FieldKind::Quantitative => "quantitative",
    }
}

fn channel(ch: &Channel) -> Value {
    let mut obj = Map::new();
    obj.insert("field".into(), json!(ch.field));
    obj.insert("type".into(), json!(field_type(ch.kind)));
    if let Some(ref sort) = ch.sort {
        obj.insert("sort".into(), json!(sort));
    }
    Value::Object(obj)
}

fn color(enc: &ColorEncoding) -> Value {
    match enc {
        ColorEncoding::Field(ch) => channel(ch),
        ColorEncoding::Conditional { selection, field, otherwise } => {
            let mut condition = channel(field);
            condition["param"] = json!(selection);
            json!({ "condition": condition, "value": otherwise })
        }
    }
}

fn param(selection: &Selection) -> Value {
    let (select, bind) = match selection {
        Selection::Dropdown { field, options, .. } => (
            json!({ "type": "point", "fields": [field] }),
            Some(json!({ "input": "select", "options": options, "name": format!("{field} ") })),
        ),
        Selection::Multi { fields, .. } => (json!({ "type": "point", "fields": fields, "toggle": true }), None),
    };
    let mut obj = Map::new();
    obj.insert("name".into(), json!(selection.name()));
    obj.insert("select".into(), select);
    if let Some(bind) = bind {
        obj.insert("bind".into(), bind);
    }
    Value::Object(obj)
}

/// Build a standalone Vega-Lite document. Faceted charts put the mark,
/// encoding and params in the inner `spec`.
pub fn to_vega_lite(spec: &ChartSpec) -> Value {
    let mut inner = Map::new();
    let mark = match spec.mark {
        Mark::Arc => "arc",
        Mark::Bar => "bar",
    };
    inner.insert("mark".into(), json!({ "type": mark, "tooltip": true }));

    let mut encoding = Map::new();
    if let Some(ref x) = spec.encoding.x {
        encoding.insert("x".into(), channel(x));
    }
    if let Some(ref y) = spec.encoding.y {
        encoding.insert("y".into(), channel(y));
    }
    if let Some(ref theta) = spec.encoding.theta {
        encoding.insert("theta".into(), channel(theta));
    }
    if let Some(ref c) = spec.encoding.color {
        encoding.insert("color".into(), color(c));
    }
    if !spec.encoding.tooltip.is_empty() {
        encoding.insert(
            "tooltip".into(),
            Value::Array(spec.encoding.tooltip.iter().map(channel).collect()),
        );
    }
    inner.insert("encoding".into(), Value::Object(encoding));

    if let Some(ref selection) = spec.selection {
        inner.insert("params".into(), json!([param(selection)]));
    }

    let mut doc = Map::new();
    doc.insert("$schema".into(), json!(SCHEMA_URL));
    doc.insert("title".into(), json!(spec.title));
    doc.insert("data".into(), json!({ "values": moodgrid_io::json::to_records(&spec.data) }));

    match spec.facet {
        Some(ref facet) => {
            let key = match facet.layout {
                FacetLayout::Rows => "row",
                FacetLayout::Columns => "column",
            };
            let mut facet_obj = Map::new();
            facet_obj.insert(key.into(), channel(&facet.field));
            doc.insert("facet".into(), Value::Object(facet_obj));
            doc.insert("spec".into(), Value::Object(inner));
        }
        None => doc.extend(inner),
    }

    Value::Object(doc)
}

/// A self-contained page embedding each spec with vega-embed.
pub fn to_html(title: &str, specs: &[Value]) -> String {
    let mut divs = String::new();
    let mut embeds = String::new();
    for (i, spec) in specs.iter().enumerate() {
        divs.push_str(&format!("  <div id=\"chart{i}\"></div>\n"));
        // `</` inside a script block would end it early.
        let body = spec.to_string().replace("</", "<\\/");
        embeds.push_str(&format!("    vegaEmbed('#chart{i}', {body});\n"));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
  <script src="https://cdn.jsdelivr.net/npm/vega@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-lite@5"></script>
  <script src="https://cdn.jsdelivr.net/npm/vega-embed@6"></script>
</head>
<body>
{divs}  <script>
{embeds}  </script>
</body>
</html>
"#,
        title = html_escape(title),
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
