//! Printout analysis: what each column of a query result becomes in the graph.

use std::borrow::Cow;

use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

use crate::color::ColorCycle;
use crate::error::{Error, Result};
use crate::graph::Align;
use crate::options::{AllowList, Context, GraphOptions};

/// Types whose values are pages and are shown as nodes by default.
pub const PAGE_TYPES: &[&str] = &[
    "_wpg", "_wpp", "_wps", "_wpu", "__sup", "__sin", "__suc", "__con",
];

/// Types whose field values are right-aligned.
pub const RIGHT_ALIGNED: &[&str] = &["_num", "_qty", "_dat", "_tem"];

/// Explicit placement requested for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Node,
    Field,
}

/// A column request as it comes from the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub hash: String,
    /// Canonical label: the property chain, `.`-separated.
    #[serde(default)]
    pub chain: String,
    /// Display label.
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub type_id: String,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub main: bool,
    /// Per-column parameters such as `node_shape` or `edge-color`.
    #[serde(default)]
    pub parameters: IndexMap<String, String>,
}

/// How the values of one column are turned into nodes, fields and edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Descriptor {
    pub hash: String,
    #[serde(default)]
    pub chain: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub is_node: bool,
    #[serde(default)]
    pub is_page: bool,
    #[serde(default)]
    pub main_column: bool,
    #[serde(default)]
    pub label_for: Option<String>,
    #[serde(default)]
    pub node_attrs: IndexMap<String, String>,
    #[serde(default)]
    pub edge_attrs: IndexMap<String, String>,
    #[serde(rename = "type", default)]
    pub type_id: String,
    #[serde(default)]
    pub parent_hash: Option<String>,
    #[serde(default)]
    pub image_width: Option<u32>,
    #[serde(default)]
    pub image_height: Option<u32>,
}

impl Descriptor {
    /// A bare descriptor; the remaining attributes are set field by field.
    pub fn new<S: Into<String>>(hash: S, chain: &str) -> Descriptor {
        Descriptor {
            hash: hash.into(),
            chain: chain.to_string(),
            prefix: prefix_of(chain).to_string(),
            label: last_segment(chain).to_string(),
            is_node: false,
            is_page: false,
            main_column: false,
            label_for: None,
            node_attrs: IndexMap::new(),
            edge_attrs: IndexMap::new(),
            type_id: String::new(),
            parent_hash: None,
            image_width: None,
            image_height: None,
        }
    }

    pub fn align(&self) -> Align {
        if RIGHT_ALIGNED.contains(&self.type_id.as_str()) {
            Align::Right
        } else {
            Align::Left
        }
    }

    /// Decorates a file name as an image reference, with the column's size.
    pub fn image_reference(&self, file: &str) -> String {
        let mut reference = format!("[[{}", file);
        if let Some(width) = self.image_width {
            reference.push_str(&format!("|width={}", width));
        }
        if let Some(height) = self.image_height {
            reference.push_str(&format!("|height={}", height));
        }
        reference.push_str("]]");
        reference
    }

    /// Label used for fields and legend entries.
    pub fn edge_label(&self) -> &str {
        self.edge_attrs
            .get("label")
            .map(|l| l.as_str())
            .unwrap_or(&self.label)
    }
}

fn prefix_of(chain: &str) -> &str {
    chain.rfind('.').map_or("", |dot| &chain[..dot])
}

fn last_segment(chain: &str) -> &str {
    chain.rfind('.').map_or(chain, |dot| &chain[dot + 1..])
}

/// Printout hashes use `:` where the query writes `|`; rows and descriptors
/// are matched on this form.
pub fn normalize_hash(hash: &str) -> Cow<'_, str> {
    if hash.contains('|') {
        Cow::Owned(hash.replace('|', ":"))
    } else {
        Cow::Borrowed(hash)
    }
}

/// Parses a size parameter such as `120` or `120px`.
fn parse_size(value: &str) -> Option<u32> {
    value.trim().trim_end_matches("px").trim().parse().ok()
}

/// Column parameters meant for `context`, with the `node`/`edge` prefix
/// stripped and anything off the allow-list dropped.
fn overrides(column: &Column, context: Context, options: &GraphOptions) -> IndexMap<String, String> {
    let prefix = context.as_str();
    let mut attrs = IndexMap::new();
    for (passed, value) in &column.parameters {
        let attr = match passed.strip_prefix(prefix) {
            Some(rest) => rest.trim_start_matches(|c: char| c == '_' || c == '-'),
            None => passed.as_str(),
        };
        let sizing = attr == "imagewidth" || attr == "imageheight";
        if !sizing && !options.allowed.allows(context, attr) {
            continue;
        }
        if !options.color && attr.contains("color") {
            continue;
        }
        attrs.insert(attr.to_string(), value.clone());
    }
    attrs
}

fn describe_column(column: &Column, options: &GraphOptions, colors: &mut ColorCycle) -> Descriptor {
    let last = last_segment(&column.chain);
    let prefix = prefix_of(&column.chain);
    let is_page = PAGE_TYPES.contains(&column.type_id.as_str());
    let label_for = if options.label_properties.iter().any(|p| *p == column.label || *p == column.chain) {
        Some(prefix.to_string())
    } else {
        None
    };

    let mut node_attrs = overrides(column, Context::Node, options);
    let mut edge_attrs = overrides(column, Context::Edge, options);
    edge_attrs
        .entry("label".to_string())
        .or_insert_with(|| column.label.clone());
    if options.link && !last.is_empty() {
        edge_attrs
            .entry("URL".to_string())
            .or_insert_with(|| format!("[[{}:{}]]", options.property_namespace, last));
    }
    if options.color {
        colors.assign(&mut [
            (&mut node_attrs, options.scheme(Context::Node)),
            (&mut edge_attrs, options.scheme(Context::Edge)),
        ]);
    }

    let image_width = node_attrs.shift_remove("imagewidth");
    let image_height = node_attrs.shift_remove("imageheight");
    edge_attrs.shift_remove("imagewidth");
    edge_attrs.shift_remove("imageheight");

    Descriptor {
        hash: normalize_hash(&column.hash).into_owned(),
        chain: if column.main { String::new() } else { column.chain.clone() },
        prefix: prefix.to_string(),
        label: column.label.clone(),
        is_node: (is_page && column.role != Some(Role::Field)) || column.role == Some(Role::Node),
        is_page,
        main_column: column.main,
        label_for,
        node_attrs,
        edge_attrs,
        type_id: column.type_id.clone(),
        parent_hash: None,
        image_width: image_width.as_deref().and_then(parse_size),
        image_height: image_height.as_deref().and_then(parse_size),
    }
}

/// Turns the column requests of a query into descriptors.
///
/// Every descriptor but the main one is attached to the main column, or,
/// with `oblique` set, to the column whose chain is its own chain prefix.
pub fn describe(columns: &[Column], options: &GraphOptions, colors: &mut ColorCycle) -> Result<Vec<Descriptor>> {
    let mains = columns.iter().filter(|c| c.main).count();
    if mains != 1 {
        return Err(Error::MainColumn(mains));
    }

    let mut descriptors: Vec<Descriptor> = columns
        .iter()
        .map(|column| describe_column(column, options, colors))
        .collect();

    let by_chain: IndexMap<String, String> = descriptors
        .iter()
        .map(|d| (d.chain.clone(), d.hash.clone()))
        .collect();
    let main_hash = descriptors
        .iter()
        .find(|d| d.main_column)
        .map(|d| d.hash.clone())
        .ok_or(Error::MainColumn(0))?;

    for descriptor in descriptors.iter_mut().filter(|d| !d.main_column) {
        let parent = if options.oblique {
            by_chain.get(&descriptor.prefix).cloned()
        } else {
            None
        };
        descriptor.parent_hash = Some(parent.unwrap_or_else(|| main_hash.clone()));
    }
    Ok(descriptors)
}
