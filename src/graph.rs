use indexmap::{IndexMap, IndexSet};
use serde_derive::{Deserialize, Serialize};

use crate::printout::Descriptor;

/// Horizontal alignment of a field value inside a node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
}

impl Align {
    pub fn as_str(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Right => "right",
        }
    }
}

/// One cell of a field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Value {
    pub text: String,
    pub image: Option<String>,
    pub href: Option<String>,
}

impl Value {
    pub fn text<S: Into<String>>(text: S) -> Value {
        Value {
            text: text.into(),
            ..Value::default()
        }
    }
}

/// A property shown as a row of a node table rather than as a separate node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub label: String,
    pub type_id: String,
    pub align: Align,
    pub values: Vec<Value>,
    pub href: Option<String>,
    /// Font colour of the label and values.
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    pub label: String,
    pub url: Option<String>,
    pub image: Option<String>,
    /// Keyed by property chain.
    pub fields: IndexMap<String, Field>,
}

impl Node {
    pub fn new<S: Into<String>>(label: S) -> Node {
        Node {
            label: label.into(),
            ..Node::default()
        }
    }

    /// Adds a field. If the chain is already present, the values it does not
    /// hold yet are appended to it.
    pub fn add_field(&mut self, chain: &str, field: Field) {
        if field.values.is_empty() {
            return;
        }
        match self.fields.get_mut(chain) {
            Some(existing) => {
                for value in field.values {
                    if !existing.values.contains(&value) {
                        existing.values.push(value);
                    }
                }
            }
            None => {
                self.fields.insert(chain.to_string(), field);
            }
        }
    }

    /// Merges another record of the same node into this one.
    ///
    /// Attributes already present here win; missing ones are taken from
    /// `other`. Fields are merged chain by chain.
    pub fn merge(&mut self, other: Node) {
        if self.label.is_empty() {
            self.label = other.label;
        }
        if self.url.is_none() {
            self.url = other.url;
        }
        if self.image.is_none() {
            self.image = other.image;
        }
        for (chain, field) in other.fields {
            self.add_field(&chain, field);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
}

/// Nodes and edges contributed by one printout.
#[derive(Debug, Clone)]
pub struct PrintoutGroup {
    pub descriptor: Descriptor,
    /// Ids into the graph's node index, in discovery order.
    pub nodes: IndexSet<String>,
    pub edges: Vec<Edge>,
}

impl PrintoutGroup {
    pub fn new(descriptor: Descriptor) -> PrintoutGroup {
        PrintoutGroup {
            descriptor,
            nodes: IndexSet::new(),
            edges: Vec::new(),
        }
    }
}

/// The aggregated graph: one node index shared by all printout groups.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub nodes: IndexMap<String, Node>,
    pub groups: IndexMap<String, PrintoutGroup>,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Nodes of a group, resolved through the shared index.
    pub fn group_nodes<'a>(
        &'a self,
        group: &'a PrintoutGroup,
    ) -> impl Iterator<Item = (&'a str, &'a Node)> + 'a {
        group
            .nodes
            .iter()
            .filter_map(move |id| self.node(id).map(|node| (id.as_str(), node)))
    }

    /// Groups that contribute at least one edge, in printout order.
    pub fn edge_groups(&self) -> impl Iterator<Item = &PrintoutGroup> {
        self.groups.values().filter(|g| !g.edges.is_empty())
    }
}
