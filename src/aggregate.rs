//! Regrouping of result rows into nodes, fields and edges per printout.

use indexmap::map::Entry;
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::graph::{Edge, Field, Graph, Node, PrintoutGroup, Value};
use crate::options::GraphOptions;
use crate::printout::{normalize_hash, Descriptor};

/// One value of a result cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawValue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Full text of the value, e.g. a page name with its namespace.
    #[serde(default)]
    pub long: Option<String>,
    #[serde(default)]
    pub is_file: bool,
}

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().filter(|s| !s.is_empty())
}

impl RawValue {
    pub fn page<S: Into<String>>(id: S) -> RawValue {
        let id = id.into();
        RawValue {
            caption: Some(id.clone()),
            id: Some(id),
            ..RawValue::default()
        }
    }

    pub fn file<S: Into<String>>(id: S, caption: S) -> RawValue {
        RawValue {
            id: Some(id.into()),
            caption: Some(caption.into()),
            long: None,
            is_file: true,
        }
    }

    pub fn id(&self) -> Option<&str> {
        non_empty(&self.id)
    }

    /// Preferred caption, falling back to the full text and then the id.
    pub fn caption(&self) -> &str {
        non_empty(&self.caption)
            .or_else(|| non_empty(&self.long))
            .or_else(|| self.id())
            .unwrap_or("")
    }

    /// Full text, falling back to the id and then the caption.
    pub fn long(&self) -> &str {
        non_empty(&self.long)
            .or_else(|| self.id())
            .or_else(|| non_empty(&self.caption))
            .unwrap_or("")
    }
}

/// One result row: the values of each printout, keyed by printout hash.
pub type Row = IndexMap<String, Vec<RawValue>>;

/// Collects rows into printout groups sharing one node index.
///
/// Nodes seen in several rows or printouts are merged by id. Where a row
/// holds several nodes of the parent printout, edges and fields attach to the
/// first of them: the rows are denormalized and do not say which one the
/// value really belongs to.
#[derive(Debug)]
pub struct Aggregator {
    groups: IndexMap<String, PrintoutGroup>,
    nodes: IndexMap<String, Node>,
    link: bool,
    fields: bool,
    rows: usize,
}

impl Aggregator {
    /// Checks the descriptor table and prepares an empty group per printout.
    pub fn new(descriptors: Vec<Descriptor>, options: &GraphOptions) -> Result<Aggregator> {
        let mains: Vec<&Descriptor> = descriptors.iter().filter(|d| d.main_column).collect();
        if mains.len() != 1 {
            return Err(Error::MainColumn(mains.len()));
        }
        let main_hash = normalize_hash(&mains[0].hash).into_owned();

        let mut groups: IndexMap<String, PrintoutGroup> = descriptors
            .into_iter()
            .map(|mut d| {
                d.hash = normalize_hash(&d.hash).into_owned();
                d.parent_hash = d.parent_hash.map(|p| normalize_hash(&p).into_owned());
                (d.hash.clone(), PrintoutGroup::new(d))
            })
            .collect();
        let hashes: Vec<String> = groups.keys().cloned().collect();
        for group in groups.values_mut() {
            let descriptor = &mut group.descriptor;
            if descriptor.main_column {
                descriptor.parent_hash = None;
                continue;
            }
            let parent = descriptor
                .parent_hash
                .get_or_insert_with(|| main_hash.clone());
            if !hashes.contains(parent) {
                return Err(Error::UnresolvedParent {
                    hash: descriptor.hash.clone(),
                    parent: parent.clone(),
                });
            }
        }

        Ok(Aggregator {
            groups,
            nodes: IndexMap::new(),
            link: options.link,
            fields: options.fields,
            rows: 0,
        })
    }

    fn descriptor(&self, hash: &str) -> &Descriptor {
        &self.groups[hash].descriptor
    }

    fn parent_of(&self, hash: &str) -> String {
        self.descriptor(hash).parent_hash.clone().unwrap_or_default()
    }

    fn node(&self, descriptor: &Descriptor, id: &str, value: &RawValue) -> Node {
        let mut node = Node::new(value.caption());
        if self.link && !id.contains('=') {
            node.url = Some(format!("[[{}]]", id));
        }
        if value.is_file {
            node.image = Some(descriptor.image_reference(value.long()));
        }
        node
    }

    fn field(&self, descriptor: &Descriptor, values: &[RawValue]) -> Field {
        let values = values
            .iter()
            .filter(|v| !v.caption().is_empty())
            .map(|v| Value {
                text: v.caption().to_string(),
                image: if v.is_file {
                    Some(descriptor.image_reference(v.long()))
                } else {
                    None
                },
                href: if descriptor.is_page && self.link {
                    Some(format!("[[{}]]", v.long()))
                } else {
                    None
                },
            })
            .collect();
        Field {
            label: descriptor.edge_label().to_string(),
            type_id: descriptor.type_id.clone(),
            align: descriptor.align(),
            values,
            href: if self.link {
                descriptor.edge_attrs.get("URL").cloned()
            } else {
                None
            },
            color: descriptor.edge_attrs.get("fontcolor").cloned(),
        }
    }

    /// Adds one row. A row naming an unknown printout is rejected whole.
    pub fn push_row(&mut self, row: &Row) -> Result<()> {
        let normalized: Row;
        let row = if row.keys().any(|hash| hash.contains('|')) {
            normalized = row
                .iter()
                .map(|(hash, values)| (normalize_hash(hash).into_owned(), values.clone()))
                .collect();
            &normalized
        } else {
            row
        };
        if let Some(hash) = row.keys().find(|hash| !self.groups.contains_key(*hash)) {
            return Err(Error::UnknownPrintout(hash.clone()));
        }
        self.rows += 1;
        trace!(row = self.rows, printouts = row.len(), "aggregating row");

        // Nodes of this row, per printout.
        let mut pools: IndexMap<&str, IndexMap<String, Node>> = IndexMap::new();
        let mut targets: Vec<(String, &str, String)> = Vec::new();
        for (hash, values) in row {
            let descriptor = self.descriptor(hash);
            if !descriptor.is_node {
                continue;
            }
            let pool = pools.entry(hash.as_str()).or_default();
            for value in values {
                let id = match value.id() {
                    Some(id) => id,
                    None => {
                        debug!(printout = %hash, "skipping value without id");
                        continue;
                    }
                };
                let node = self.node(descriptor, id, value);
                pool.entry(id.to_string()).or_insert(node);
                if !descriptor.main_column {
                    targets.push((self.parent_of(hash), hash.as_str(), id.to_string()));
                }
            }
        }

        for (parent, hash, target) in targets {
            let source = pools.get(parent.as_str()).and_then(|pool| pool.keys().next());
            match source {
                Some(source) => self.groups[hash].edges.push(Edge {
                    from: source.clone(),
                    to: target,
                }),
                None => debug!(printout = %hash, %target, "no parent node for edge"),
            }
        }

        // Fields and relabelling.
        let mut relabels: Vec<(Vec<String>, String)> = Vec::new();
        if self.fields {
            for (hash, values) in row {
                let descriptor = self.descriptor(hash);
                if descriptor.is_node || values.is_empty() {
                    continue;
                }
                let parent = self.parent_of(hash);
                if descriptor.label_for.is_some() {
                    let ids: Vec<String> = pools
                        .get(parent.as_str())
                        .map(|pool| pool.keys().cloned().collect())
                        .unwrap_or_default();
                    relabels.push((ids, values[0].caption().to_string()));
                    continue;
                }
                let field = self.field(descriptor, values);
                match pools
                    .get_mut(parent.as_str())
                    .and_then(|pool| pool.values_mut().next())
                {
                    Some(node) => node.add_field(&descriptor.chain, field),
                    None => debug!(printout = %hash, "no parent node for field"),
                }
            }
        }

        for (hash, pool) in pools {
            for (id, node) in pool {
                match self.nodes.entry(id.clone()) {
                    Entry::Occupied(mut existing) => existing.get_mut().merge(node),
                    Entry::Vacant(slot) => {
                        slot.insert(node);
                    }
                }
                self.groups[hash].nodes.insert(id);
            }
        }

        // Relabelling applies to the merged node, wherever it is shown.
        for (ids, label) in relabels {
            for id in ids {
                if let Some(node) = self.nodes.get_mut(&id) {
                    node.label = label.clone();
                }
            }
        }
        Ok(())
    }

    pub fn push_rows<'r, I>(&mut self, rows: I) -> Result<()>
    where
        I: IntoIterator<Item = &'r Row>,
    {
        for row in rows {
            self.push_row(row)?;
        }
        Ok(())
    }

    /// The finished graph; groups keep the order of the descriptor table.
    pub fn finish(self) -> Graph {
        debug!(
            rows = self.rows,
            nodes = self.nodes.len(),
            edges = self.groups.values().map(|g| g.edges.len()).sum::<usize>(),
            "aggregation finished"
        );
        Graph {
            nodes: self.nodes,
            groups: self.groups,
        }
    }
}
