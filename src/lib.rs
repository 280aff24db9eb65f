//! Turns tabular query results into Graphviz DOT.
//!
//! Rows of values, grouped by printout, are first aggregated into a graph of
//! deduplicated nodes, fields and edges (`aggregate`), then written as DOT
//! (`graphviz`) together with optional legends.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde_derive::Deserialize;
use tracing::info;

pub mod aggregate;
pub mod attrs;
pub mod color;
pub mod error;
pub mod graph;
pub mod graphviz;
pub mod label;
pub mod options;
pub mod printout;
pub mod wrap;

pub use crate::aggregate::{Aggregator, RawValue, Row};
pub use crate::color::ColorCycle;
pub use crate::error::{Error, Result};
pub use crate::graph::Graph;
pub use crate::graphviz::DotBuilder;
pub use crate::options::{GraphOptions, Relation};
pub use crate::printout::{describe, Column, Descriptor};

/// A query result as read from JSON.
///
/// Either `printouts` (raw column requests) or `descriptors` (already
/// analysed) describe the columns; descriptors are used when both are given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Input {
    #[serde(default)]
    pub options: Option<GraphOptions>,
    #[serde(default)]
    pub printouts: Vec<Column>,
    #[serde(default)]
    pub descriptors: Vec<Descriptor>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Input {
    pub fn from_reader<R: Read>(reader: R) -> Result<Input> {
        Ok(serde_json::from_reader(BufReader::new(reader))?)
    }

    pub fn from_file(path: &Path) -> Result<Input> {
        Input::from_reader(File::open(path)?)
    }
}

/// Everything one build produces.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphOutput {
    pub dot: String,
    pub dot_legend: Option<String>,
    pub legend: Option<String>,
}

impl GraphOutput {
    /// The graph followed by whichever legends were produced.
    pub fn render(&self) -> String {
        let mut parts = vec![self.dot.as_str()];
        parts.extend(self.dot_legend.as_deref());
        parts.extend(self.legend.as_deref());
        parts.join("\n")
    }
}

pub fn build_graph(input: &Input, options: &GraphOptions) -> Result<GraphOutput> {
    let descriptors = if input.descriptors.is_empty() {
        describe(&input.printouts, options, &mut ColorCycle::default())?
    } else {
        input.descriptors.clone()
    };

    let mut aggregator = Aggregator::new(descriptors, options)?;
    aggregator.push_rows(&input.rows)?;
    let graph = aggregator.finish();

    let builder = DotBuilder::new(options);
    let output = GraphOutput {
        dot: builder.build(&graph),
        dot_legend: if options.dot_legend {
            Some(builder.dot_legend(&graph))
        } else {
            None
        },
        legend: if options.legend && options.color {
            Some(builder.html_legend(&graph))
        } else {
            None
        },
    };
    info!(
        name = %options.graph_name,
        rows = input.rows.len(),
        nodes = graph.nodes.len(),
        printouts = graph.groups.len(),
        "graph built"
    );
    Ok(output)
}

/// Reads an [`Input`] from `path` and builds it. Options given here replace
/// the ones stored in the file.
pub fn build_from_file(path: &Path, options: Option<GraphOptions>) -> Result<GraphOutput> {
    let input = Input::from_file(path)?;
    let options = options
        .or_else(|| input.options.clone())
        .unwrap_or_default();
    build_graph(&input, &options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn authors() -> GraphOutput {
        build_from_file(Path::new("tests/authors.json"), None).unwrap()
    }

    #[test]
    fn authors_fixture_builds() {
        let output = authors();
        assert!(output.dot.starts_with("digraph \"Extensions\" {\nrankdir=\"LR\"\n"));
        assert!(output.dot.ends_with("\n}"));
        for subgraph in &[
            "main_nodes",
            "author_nodes",
            "requires_nodes",
            "author_edges",
            "requires_edges",
        ] {
            assert!(
                output.dot.contains(&format!("subgraph \"{}\" {{\n", subgraph)),
                "missing {}",
                subgraph
            );
        }
        // Fields never get subgraphs of their own.
        assert!(!output.dot.contains("\"version_nodes\""));
        assert!(!output.dot.contains("\"attachment_edges\""));
    }

    #[test]
    fn authors_fixture_edges() {
        let dot = authors().dot;
        // Ten author edges plus one requirement.
        assert_eq!(dot.lines().filter(|l| l.contains(" -> ")).count(), 11);
        assert!(dot.contains("\n\"Semantic MediaWiki\" -> \"Jeroen De Dauw\"\n"));
        assert!(dot.contains("\n\"Semantic Result Formats\" -> \"Stephan Gambke\"\n"));
        assert!(dot.contains("\n\"Semantic Result Formats\" -> \"Semantic MediaWiki\"\n"));
    }

    #[test]
    fn authors_fixture_fields() {
        let dot = authors().dot;
        assert!(dot.contains(
            "<tr><td colspan=\"2\" href=\"[[Semantic MediaWiki]]\">Semantic MediaWiki</td></tr><hr/>"
        ));
        assert!(dot.contains(">4.1.3</font></td></tr>"));
        // Attachments hang off the first author of the row.
        let jeroen = dot
            .lines()
            .skip_while(|l| !l.starts_with("\"Jeroen De Dauw\" [label=<"))
            .take_while(|l| !l.ends_with(";"))
            .collect::<Vec<_>>()
            .join("\n");
        assert_eq!(jeroen.matches("<img src=\"[[File:Duck.jpg|width=120]]\"").count(), 1);
        assert!(jeroen.contains("[[File:Markus-Kroetzsch-2014.jpg|width=120]]"));
    }

    #[test]
    fn authors_fixture_legends() {
        let output = authors();
        let legend = output.legend.as_deref().unwrap();
        assert_eq!(
            legend,
            "<div class=\"graphlegend\">\
             <div class=\"graphlegenditem\" style=\"color: green\"><strong>⟶</strong>: [[Property:Has author|Author]]</div>\
             <div class=\"graphlegenditem\" style=\"color: gold\"><strong>⟶</strong>: [[Property:Requires|Requires]]</div>\
             </div>"
        );
        let dot_legend = output.dot_legend.as_deref().unwrap();
        assert!(dot_legend.starts_with("digraph legend {\n"));
        assert!(dot_legend.contains("\"key2\":\"Author\":e -> \"key\":\"Author\":w ["));

        let rendered = output.render();
        assert!(rendered.starts_with(&output.dot));
        assert!(rendered.ends_with(legend));
    }

    #[test]
    fn options_override_file() {
        let options = GraphOptions {
            graph_name: "Plain".to_string(),
            ..GraphOptions::default()
        };
        let output = build_from_file(Path::new("tests/authors.json"), Some(options)).unwrap();
        assert!(output.dot.starts_with("digraph \"Plain\" {\n"));
        assert_eq!(output.legend, None);
        assert_eq!(output.dot_legend, None);
        assert_eq!(output.render(), output.dot);
        // Without fields, no node carries a table.
        assert!(!output.dot.contains("<table"));
    }

    #[test]
    fn input_from_reader() {
        let json = br#"{"printouts": [{"hash": "main", "type": "_wpg", "main": true}], "rows": []}"#;
        let input = Input::from_reader(&json[..]).unwrap();
        assert_eq!(input.printouts.len(), 1);
        assert!(input.options.is_none());
        match Input::from_reader(&b"{"[..]) {
            Err(Error::Json(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        match build_from_file(Path::new("tests/does-not-exist.json"), None) {
            Err(Error::Io(_)) => {}
            other => panic!("unexpected {:?}", other),
        }
    }
}
