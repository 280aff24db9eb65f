//! Build configuration.

use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use nom::branch::alt;
use nom::bytes::complete::{is_not, take_while};
use nom::character::complete::{char, multispace0, one_of, satisfy};
use nom::combinator::{all_consuming, map, opt, recognize, verify};
use nom::multi::{fold_many0, separated_list0};
use nom::sequence::{delimited, pair, preceded, separated_pair, terminated, tuple};
use nom::IResult;
use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Which way edges point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Undirected graph.
    None,
    /// From the value towards the node that refers to it.
    Parent,
    /// From the referring node towards the value.
    Child,
}

impl Relation {
    pub fn is_directed(self) -> bool {
        self != Relation::None
    }
}

impl FromStr for Relation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Relation> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Relation::None),
            "parent" => Ok(Relation::Parent),
            "child" => Ok(Relation::Child),
            other => Err(Error::AttributeSyntax(format!("unknown relation `{}`", other))),
        }
    }
}

/// How colours are expressed for a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScheme {
    /// Colour names (the SVG and X11 schemes).
    Named,
    /// 1-based indices into a Brewer-style scheme.
    Numeric,
}

impl ColorScheme {
    /// Maps a Graphviz `colorscheme` name onto the way colours are written.
    pub fn from_scheme_name(name: &str) -> ColorScheme {
        match name.trim().to_lowercase().as_str() {
            "" | "svg" | "x11" | "named" => ColorScheme::Named,
            _ => ColorScheme::Numeric,
        }
    }
}

/// Attribute scopes of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Graph,
    Cluster,
    Node,
    Edge,
}

impl Context {
    pub fn as_str(self) -> &'static str {
        match self {
            Context::Graph => "graph",
            Context::Cluster => "cluster",
            Context::Node => "node",
            Context::Edge => "edge",
        }
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const GRAPH_ATTRS: &[&str] = &[
    "bgcolor", "center", "charset", "concentrate", "dpi", "fontcolor", "fontname", "fontsize",
    "label", "labeljust", "labelloc", "layout", "margin", "nodesep", "ordering", "outputorder",
    "overlap", "pad", "rank", "rankdir", "ranksep", "ratio", "rotate", "size", "splines", "style",
];
const CLUSTER_ATTRS: &[&str] = &[
    "bgcolor", "color", "fillcolor", "fontcolor", "fontname", "fontsize", "label", "labeljust",
    "labelloc", "pencolor", "penwidth", "style",
];
const NODE_ATTRS: &[&str] = &[
    "color", "colorscheme", "fillcolor", "fixedsize", "fontcolor", "fontname", "fontsize",
    "height", "imagescale", "margin", "penwidth", "peripheries", "shape", "style", "width",
];
const EDGE_ATTRS: &[&str] = &[
    "arrowhead", "arrowsize", "arrowtail", "color", "colorscheme", "constraint", "dir",
    "fontcolor", "fontname", "fontsize", "headlabel", "label", "labelfontcolor", "penwidth",
    "style", "taillabel", "weight",
];

/// Attribute names that may be passed through to the DOT output, per scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllowList {
    pub graph: IndexSet<String>,
    pub cluster: IndexSet<String>,
    pub node: IndexSet<String>,
    pub edge: IndexSet<String>,
}

impl Default for AllowList {
    fn default() -> AllowList {
        AllowList::graphviz()
    }
}

impl AllowList {
    /// A list that lets nothing through.
    pub fn empty() -> AllowList {
        AllowList {
            graph: IndexSet::new(),
            cluster: IndexSet::new(),
            node: IndexSet::new(),
            edge: IndexSet::new(),
        }
    }

    /// The usual Graphviz attributes of each scope.
    pub fn graphviz() -> AllowList {
        let set = |names: &[&str]| names.iter().map(|n| n.to_string()).collect();
        AllowList {
            graph: set(GRAPH_ATTRS),
            cluster: set(CLUSTER_ATTRS),
            node: set(NODE_ATTRS),
            edge: set(EDGE_ATTRS),
        }
    }

    fn names(&self, context: Context) -> &IndexSet<String> {
        match context {
            Context::Graph => &self.graph,
            Context::Cluster => &self.cluster,
            Context::Node => &self.node,
            Context::Edge => &self.edge,
        }
    }

    pub fn allow(&mut self, context: Context, name: &str) {
        let names = match context {
            Context::Graph => &mut self.graph,
            Context::Cluster => &mut self.cluster,
            Context::Node => &mut self.node,
            Context::Edge => &mut self.edge,
        };
        names.insert(name.to_string());
    }

    pub fn allows(&self, context: Context, name: &str) -> bool {
        self.names(context).contains(name)
    }

    /// Keeps the allowed attributes of `attrs`, in order.
    pub fn filter(&self, context: Context, attrs: &IndexMap<String, String>) -> IndexMap<String, String> {
        attrs
            .iter()
            .filter(|(name, _)| {
                let allowed = self.allows(context, name);
                if !allowed {
                    tracing::debug!(%context, attribute = %name, "dropping attribute not on the allow-list");
                }
                allowed
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Everything that shapes one graph build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphOptions {
    pub graph_name: String,
    pub relation: Relation,
    /// Colour nodes and edges per printout.
    pub color: bool,
    /// Link nodes and fields to their pages.
    pub link: bool,
    /// Show non-page printouts as fields on their parent node.
    pub fields: bool,
    /// Attach printouts to the printout of their property chain prefix.
    pub oblique: bool,
    /// Append a plain markup legend (needs `color`).
    pub legend: bool,
    /// Append a legend drawn as a second DOT graph.
    pub dot_legend: bool,
    pub word_wrap_limit: usize,
    /// Joins wrapped lines of plain node labels.
    pub line_separator: String,
    /// Printout labels or chains whose values relabel their parent node.
    pub label_properties: Vec<String>,
    pub node_scheme: ColorScheme,
    pub edge_scheme: ColorScheme,
    /// Namespace prefix of property page links.
    pub property_namespace: String,
    pub graph_attrs: IndexMap<String, String>,
    pub node_attrs: IndexMap<String, String>,
    pub edge_attrs: IndexMap<String, String>,
    pub allowed: AllowList,
}

impl Default for GraphOptions {
    fn default() -> GraphOptions {
        GraphOptions {
            graph_name: "QueryResult".to_string(),
            relation: Relation::Child,
            color: false,
            link: false,
            fields: false,
            oblique: false,
            legend: false,
            dot_legend: false,
            word_wrap_limit: 25,
            line_separator: "\n".to_string(),
            label_properties: Vec::new(),
            node_scheme: ColorScheme::Named,
            edge_scheme: ColorScheme::Named,
            property_namespace: "Property".to_string(),
            graph_attrs: IndexMap::new(),
            node_attrs: IndexMap::new(),
            edge_attrs: IndexMap::new(),
            allowed: AllowList::graphviz(),
        }
    }
}

impl GraphOptions {
    pub fn scheme(&self, context: Context) -> ColorScheme {
        match context {
            Context::Edge => self.edge_scheme,
            _ => self.node_scheme,
        }
    }

    /// Root-level attributes of a scope, restricted to the allow-list.
    pub fn root_attrs(&self, context: Context) -> IndexMap<String, String> {
        let attrs = match context {
            Context::Graph | Context::Cluster => &self.graph_attrs,
            Context::Node => &self.node_attrs,
            Context::Edge => &self.edge_attrs,
        };
        self.allowed.filter(context, attrs)
    }
}

fn ident(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
    ))(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    let inner = fold_many0(
        alt((
            map(is_not("\\\""), |s: &str| s.to_string()),
            map(preceded(char('\\'), one_of("\\\"")), |c: char| c.to_string()),
        )),
        String::new,
        |mut acc, part| {
            acc.push_str(&part);
            acc
        },
    );
    delimited(char('"'), inner, char('"'))(input)
}

fn bare(input: &str) -> IResult<&str, String> {
    map(
        verify(is_not(",;\""), |s: &str| !s.trim().is_empty()),
        |s: &str| s.trim().to_string(),
    )(input)
}

fn separator(input: &str) -> IResult<&str, char> {
    delimited(multispace0, one_of(",;"), multispace0)(input)
}

fn attribute(input: &str) -> IResult<&str, (&str, String)> {
    separated_pair(
        ident,
        tuple((multispace0, char('='), multispace0)),
        alt((quoted, bare)),
    )(input)
}

/// Parses `name=value` pairs separated by `,` or `;`.
///
/// Values may be double-quoted, with `\"` and `\\` escapes inside.
pub fn parse_attr_list(input: &str) -> Result<IndexMap<String, String>> {
    let list = delimited(
        multispace0,
        terminated(separated_list0(separator, attribute), opt(separator)),
        multispace0,
    );
    match all_consuming(list)(input) {
        Ok((_, pairs)) => Ok(pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect()),
        Err(_) => Err(Error::AttributeSyntax(format!("`{}`", input))),
    }
}
