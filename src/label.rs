//! Node labels: plain text, images and HTML-like field tables.

use indexmap::IndexMap;

use crate::attrs::{escape, quoted, serialize, AttrMode};
use crate::graph::{Field, Node};
use crate::options::GraphOptions;
use crate::wrap::wrap;

const HTML_BREAK: &str = "<br />";

/// Attributes of a node statement, in output order. `None` means omitted.
pub type NodeAttrs = Vec<(&'static str, Option<String>)>;

fn image_tag(src: &str) -> String {
    format!("<img src=\"{}\" scale=\"true\" />", escape(src))
}

fn td(content: &str, color: Option<&str>, attrs: &[(&str, Option<&str>)]) -> String {
    let content = match color {
        // <td> ignores the colour for its text, so it goes on a <font> too.
        Some(color) => format!("<font color=\"{}\">{}</font>", escape(color), content),
        None => content.to_string(),
    };
    let attrs = serialize(attrs.iter().cloned(), AttrMode::Bare);
    if attrs.is_empty() {
        format!("<td>{}</td>", content)
    } else {
        format!("<td {}>{}</td>", attrs, content)
    }
}

/// Builds labels for nodes, wrapping long text as configured.
#[derive(Debug, Clone)]
pub struct LabelBuilder<'a> {
    limit: usize,
    separator: &'a str,
}

impl<'a> LabelBuilder<'a> {
    pub fn new(options: &'a GraphOptions) -> LabelBuilder<'a> {
        LabelBuilder::with_limit(options.word_wrap_limit, &options.line_separator)
    }

    pub fn with_limit(limit: usize, separator: &'a str) -> LabelBuilder<'a> {
        LabelBuilder { limit, separator }
    }

    /// `label`, `URL` and `tooltip` for a node.
    ///
    /// Text values come back escaped and quoted.
    pub fn node_attrs(&self, node: &Node) -> NodeAttrs {
        let tooltip = if node.label.is_empty() {
            None
        } else {
            Some(quoted(&escape(&node.label)))
        };
        if !node.fields.is_empty() {
            let header = match &node.image {
                Some(image) => image_tag(image),
                None => wrap(&escape(&node.label), self.limit, HTML_BREAK),
            };
            return vec![
                ("label", Some(self.table(&header, node.url.as_deref(), &node.fields))),
                ("tooltip", tooltip),
            ];
        }
        match &node.image {
            Some(image) => vec![
                ("label", Some(image_label(image))),
                ("URL", node.url.clone()),
                ("tooltip", tooltip),
            ],
            None => vec![
                (
                    "label",
                    Some(quoted(&wrap(&escape(&node.label), self.limit, self.separator))),
                ),
                ("URL", node.url.clone()),
            ],
        }
    }

    /// HTML-like table with a header row and one row per field value.
    pub fn table(&self, header: &str, url: Option<&str>, fields: &IndexMap<String, Field>) -> String {
        let href = url
            .map(|url| format!(" href=\"{}\"", escape(url)))
            .unwrap_or_default();
        let rows: Vec<String> = fields
            .values()
            .filter(|field| !field.values.is_empty())
            .map(|field| self.field_rows(field))
            .collect();
        format!(
            "<\n<table border=\"0\" cellborder=\"0\" cellspacing=\"1\" columns=\"*\" rows=\"*\">\n\
             <tr><td colspan=\"2\"{}>{}</td></tr><hr/>\n{}\n</table>\n>",
            href,
            header,
            rows.join("\n")
        )
    }

    fn field_rows(&self, field: &Field) -> String {
        let label = wrap(&escape(&field.label), self.limit, HTML_BREAK);
        let color = field.color.as_deref();
        let rowspan = field.values.len().to_string();
        let mut label_td = if label.is_empty() {
            String::new()
        } else {
            td(
                &label,
                color,
                &[
                    ("align", Some("left")),
                    ("color", color),
                    ("href", field.href.as_deref()),
                    ("rowspan", Some(rowspan.as_str())),
                ],
            )
        };
        let colspan = if label.is_empty() { Some("2") } else { None };

        let mut rows = Vec::with_capacity(field.values.len());
        for value in &field.values {
            let href = value.href.as_deref().or_else(|| field.href.as_deref());
            let attrs = [
                ("align", Some(field.align.as_str())),
                ("color", color),
                ("href", href),
                ("colspan", colspan),
            ];
            let value_td = match &value.image {
                Some(image) => td(&image_tag(image), None, &attrs),
                None => td(&escape(&value.text), color, &attrs),
            };
            rows.push(format!("<tr>{}{}</tr>", label_td, value_td));
            // The label cell spans all values of the field.
            label_td.clear();
        }
        rows.join("\n")
    }
}

/// Label of a node that shows nothing but an image.
fn image_label(image: &str) -> String {
    format!(
        "<<table border=\"0\" cellborder=\"0\"><tr><td>{}</td></tr></table>>",
        image_tag(image)
    )
}
