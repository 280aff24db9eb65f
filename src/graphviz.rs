use crate::attrs::{escape, serialize, serialize_map, AttrMode};
use crate::graph::{Graph, PrintoutGroup};
use crate::label::LabelBuilder;
use crate::options::{Context, GraphOptions, Relation};

/// Arrow shown in front of each legend entry.
const LEGEND_ARROW: &str = "⟶";

/// Writes an aggregated graph in DOT.
pub struct DotBuilder<'a> {
    options: &'a GraphOptions,
    labels: LabelBuilder<'a>,
}

impl<'a> DotBuilder<'a> {
    pub fn new(options: &'a GraphOptions) -> DotBuilder<'a> {
        DotBuilder {
            options,
            labels: LabelBuilder::new(options),
        }
    }

    fn relation(&self) -> Relation {
        self.options.relation
    }

    fn graph_keyword(&self) -> &'static str {
        if self.relation().is_directed() {
            "digraph"
        } else {
            "graph"
        }
    }

    /// Edge statement between two already quoted endpoints.
    fn arrow(&self, from: &str, to: &str) -> String {
        match self.relation() {
            Relation::None => format!("{} -- {}", to, from),
            Relation::Parent => format!("{} -> {}", to, from),
            Relation::Child => format!("{} -> {}", from, to),
        }
    }

    fn header(&self) -> String {
        let mut s = format!(
            "{} \"{}\" {{\n",
            self.graph_keyword(),
            escape(&self.options.graph_name)
        );
        s.push_str(&serialize_map(
            &self.options.root_attrs(Context::Graph),
            AttrMode::RootLevel,
        ));
        for context in &[Context::Node, Context::Edge] {
            let defaults = serialize_map(&self.options.root_attrs(*context), AttrMode::Bracketed);
            if !defaults.is_empty() {
                s.push_str(&format!("{} {}\n", context, defaults));
            }
        }
        s
    }

    fn subgraph(&self, s: &mut String, group: &PrintoutGroup, suffix: &str, context: Context) {
        s.push_str(&format!(
            "subgraph \"{}_{}\" {{\n",
            escape(&group.descriptor.hash),
            suffix
        ));
        let attrs = match context {
            Context::Edge => &group.descriptor.edge_attrs,
            _ => &group.descriptor.node_attrs,
        };
        let defaults = serialize_map(attrs, AttrMode::Bracketed);
        if !defaults.is_empty() {
            s.push_str(&format!("{} {}\n", context, defaults));
        }
    }

    /// The whole graph: header, a subgraph per printout for its nodes, then
    /// a subgraph per printout for its edges.
    pub fn build(&self, graph: &Graph) -> String {
        let mut s = self.header();

        for group in graph.groups.values().filter(|g| !g.nodes.is_empty()) {
            self.subgraph(&mut s, group, "nodes", Context::Node);
            for (id, node) in graph.group_nodes(group) {
                let attrs = self.labels.node_attrs(node);
                let attrs = serialize(
                    attrs.iter().map(|(k, v)| (*k, v.as_deref())),
                    AttrMode::Bracketed,
                );
                if attrs.is_empty() {
                    s.push_str(&format!("\"{}\";\n", escape(id)));
                } else {
                    s.push_str(&format!("\"{}\" {};\n", escape(id), attrs));
                }
            }
            s.push_str("}\n");
        }

        for group in graph.edge_groups() {
            self.subgraph(&mut s, group, "edges", Context::Edge);
            for edge in &group.edges {
                let from = format!("\"{}\"", escape(&edge.from));
                let to = format!("\"{}\"", escape(&edge.to));
                s.push_str(&self.arrow(&from, &to));
                s.push('\n');
            }
            s.push_str("}\n");
        }

        s.push('}');
        s
    }

    /// A second graph explaining the edge styles, one row per printout.
    pub fn dot_legend(&self, graph: &Graph) -> String {
        let mut ports = Vec::new();
        let mut arrows = Vec::new();
        for group in graph.edge_groups() {
            let label = escape(group.descriptor.edge_label());
            ports.push(format!("<tr><td port=\"{}\">&nbsp;</td></tr>", label));
            let port = |node: &str, side: &str| format!("\"{}\":\"{}\"{}", node, label, side);
            let (key, key2) = match self.relation() {
                Relation::None => (port("key", ""), port("key2", "")),
                Relation::Parent => (port("key", ":e"), port("key2", ":w")),
                Relation::Child => (port("key", ":w"), port("key2", ":e")),
            };
            let attrs = serialize_map(&group.descriptor.edge_attrs, AttrMode::Bracketed);
            let arrow = self.arrow(&key2, &key);
            arrows.push(if attrs.is_empty() {
                arrow
            } else {
                format!("{} {}", arrow, attrs)
            });
        }
        let rows = ports.join("\n");
        format!(
            "{} legend {{\nrankdir=LR;\n\
             key [label=<<table border=\"0\" cellpadding=\"2\" cellspacing=\"0\" cellborder=\"0\" width=\"0\">{}\n</table>>, shape=plaintext]\n\
             key2 [label=<<table border=\"0\" cellpadding=\"2\" cellspacing=\"0\" cellborder=\"0\">\n{}\n</table>>, shape=plaintext]\n\
             {}\n}}",
            self.graph_keyword(),
            rows,
            rows,
            arrows.join("\n")
        )
    }

    /// A plain markup legend: one coloured line per printout with edges.
    pub fn html_legend(&self, graph: &Graph) -> String {
        let mut items = String::new();
        for group in graph.edge_groups() {
            let attrs = &group.descriptor.edge_attrs;
            let label = group.descriptor.edge_label();
            let label = match attrs.get("URL") {
                Some(url) if url.ends_with("]]") => {
                    format!("{}|{}]]", &url[..url.len() - 2], label)
                }
                _ => label.to_string(),
            };
            let label = escape(&label);
            let style = attrs.get("color").map(|c| format!("color: {}", c));
            let div_attrs = serialize(
                vec![
                    ("class", Some("graphlegenditem")),
                    ("style", style.as_deref()),
                ],
                AttrMode::Bare,
            );
            items.push_str(&format!(
                "<div {}><strong>{}</strong>: {}</div>",
                div_attrs, LEGEND_ARROW, label
            ));
        }
        format!("<div class=\"graphlegend\">{}</div>", items)
    }
}
