use pretty_assertions::assert_eq;
use query_graph::{build_graph, Error, GraphOptions, Input, Relation};
use serde_json::json;

fn teams() -> Input {
    serde_json::from_value(json!({
        "descriptors": [
            { "hash": "team", "main_column": true, "is_node": true, "is_page": true },
            {
                "hash": "member",
                "chain": "Has member",
                "label": "Member",
                "is_node": true,
                "is_page": true,
                "edge_attrs": { "label": "Member" }
            },
            { "hash": "size", "chain": "Has size", "label": "Size", "type": "_num" }
        ],
        "rows": [
            { "team": [{ "id": "Alpha" }], "member": [{ "id": "Ann" }], "size": [{ "id": "3" }] },
            { "team": [{ "id": "Beta" }], "member": [{ "id": "Bob" }], "size": [{ "id": "5" }] }
        ]
    }))
    .unwrap()
}

fn options(fields: bool) -> GraphOptions {
    GraphOptions {
        graph_name: "A".to_string(),
        relation: Relation::Child,
        fields,
        ..GraphOptions::default()
    }
}

#[test]
fn fields_on_child_relation() {
    let output = build_graph(&teams(), &options(true)).unwrap();
    let table = |name: &str, size: &str| {
        format!(
            "\"{name}\" [label=<\n\
             <table border=\"0\" cellborder=\"0\" cellspacing=\"1\" columns=\"*\" rows=\"*\">\n\
             <tr><td colspan=\"2\">{name}</td></tr><hr/>\n\
             <tr><td align=\"left\" rowspan=\"1\">Size</td><td align=\"right\">{size}</td></tr>\n\
             </table>\n\
             >, tooltip=\"{name}\"];",
            name = name,
            size = size
        )
    };
    let expected = format!(
        "digraph \"A\" {{\n\
         subgraph \"team_nodes\" {{\n\
         {}\n\
         {}\n\
         }}\n\
         subgraph \"member_nodes\" {{\n\
         \"Ann\" [label=\"Ann\"];\n\
         \"Bob\" [label=\"Bob\"];\n\
         }}\n\
         subgraph \"member_edges\" {{\n\
         edge [label=\"Member\"]\n\
         \"Alpha\" -> \"Ann\"\n\
         \"Beta\" -> \"Bob\"\n\
         }}\n\
         }}",
        table("Alpha", "3"),
        table("Beta", "5")
    );
    assert_eq!(output.dot, expected);
    assert_eq!(output.legend, None);
    assert_eq!(output.dot_legend, None);
}

#[test]
fn fields_switched_off() {
    let output = build_graph(&teams(), &options(false)).unwrap();
    let expected = r#"digraph "A" {
subgraph "team_nodes" {
"Alpha" [label="Alpha"];
"Beta" [label="Beta"];
}
subgraph "member_nodes" {
"Ann" [label="Ann"];
"Bob" [label="Bob"];
}
subgraph "member_edges" {
edge [label="Member"]
"Alpha" -> "Ann"
"Beta" -> "Bob"
}
}"#;
    assert_eq!(output.dot, expected);
}

#[test]
fn undirected_and_parent_relations() {
    let mut undirected = options(false);
    undirected.relation = Relation::None;
    let dot = build_graph(&teams(), &undirected).unwrap().dot;
    assert!(dot.starts_with("graph \"A\" {\n"));
    assert!(dot.contains("\n\"Ann\" -- \"Alpha\"\n"));

    let mut parent = options(false);
    parent.relation = Relation::Parent;
    let dot = build_graph(&teams(), &parent).unwrap().dot;
    assert!(dot.contains("\n\"Bob\" -> \"Beta\"\n"));
}

#[test]
fn files_render_as_images() {
    let input: Input = serde_json::from_value(json!({
        "descriptors": [
            { "hash": "team", "main_column": true, "is_node": true, "is_page": true, "type": "_wpg" },
            { "hash": "photo", "chain": "Has photo", "label": "Photo", "is_node": true, "is_page": true, "type": "_wpg" },
            { "hash": "logo", "chain": "Has logo", "label": "Logo", "is_page": true, "type": "_wpg" }
        ],
        "rows": [{
            "team": [{ "id": "Alpha" }],
            "photo": [{ "id": "File:Ann.png", "caption": "Ann.png", "is_file": true }],
            "logo": [{ "id": "File:Logo.png", "caption": "Logo.png", "is_file": true }]
        }]
    }))
    .unwrap();
    let options = GraphOptions {
        link: true,
        fields: true,
        ..GraphOptions::default()
    };
    let dot = build_graph(&input, &options).unwrap().dot;

    assert!(dot.contains(
        "\n\"File:Ann.png\" [label=<<table border=\"0\" cellborder=\"0\"><tr><td>\
         <img src=\"[[File:Ann.png]]\" scale=\"true\" /></td></tr></table>>, \
         URL=\"[[File:Ann.png]]\", tooltip=\"Ann.png\"];\n"
    ));
    assert!(dot.contains("<tr><td colspan=\"2\" href=\"[[Alpha]]\">Alpha</td></tr><hr/>"));
    assert!(dot.contains(
        "<tr><td align=\"left\" rowspan=\"1\">Logo</td>\
         <td align=\"left\" href=\"[[File:Logo.png]]\"><img src=\"[[File:Logo.png]]\" scale=\"true\" /></td></tr>"
    ));
}

fn coloured() -> Input {
    serde_json::from_value(json!({
        "printouts": [
            { "hash": "team", "type": "_wpg", "main": true },
            {
                "hash": "member",
                "chain": "Has member",
                "label": "Member",
                "type": "_wpg",
                "parameters": { "edge_color": "orange" }
            },
            { "hash": "size", "chain": "Has size", "label": "Size", "type": "_num" }
        ],
        "rows": [
            { "team": [{ "id": "Alpha" }], "member": [{ "id": "Ann" }], "size": [{ "id": "3" }] }
        ]
    }))
    .unwrap()
}

#[test]
fn colours_are_deterministic() {
    let options = GraphOptions {
        color: true,
        fields: true,
        legend: true,
        ..GraphOptions::default()
    };
    let first = build_graph(&coloured(), &options).unwrap();
    let second = build_graph(&coloured(), &options).unwrap();
    assert_eq!(first, second);

    let dot = &first.dot;
    assert!(dot.contains("subgraph \"team_nodes\" {\nnode [color=\"black\", fontcolor=\"black\"]\n"));
    assert!(dot.contains("subgraph \"member_nodes\" {\nnode [color=\"red\", fontcolor=\"red\"]\n"));
    // The explicit edge colour survives.
    assert!(dot.contains("subgraph \"member_edges\" {\nedge [color=\"orange\", label=\"Member\"]\n"));
    assert!(dot.contains("<font color=\"green\">3</font>"));
    assert_eq!(
        first.legend.as_deref(),
        Some(
            "<div class=\"graphlegend\"><div class=\"graphlegenditem\" style=\"color: orange\">\
             <strong>⟶</strong>: Member</div></div>"
        )
    );
}

#[test]
fn label_property_renames_parent() {
    let mut input = coloured();
    input.printouts.push(serde_json::from_value(json!({
        "hash": "title", "chain": "Has title", "label": "Title", "type": "_txt"
    })).unwrap());
    input.rows[0].insert("title".to_string(), vec![query_graph::RawValue::page("Team Alpha")]);
    let options = GraphOptions {
        fields: true,
        label_properties: vec!["Title".to_string()],
        ..GraphOptions::default()
    };
    let dot = build_graph(&input, &options).unwrap().dot;
    assert!(dot.contains("<tr><td colspan=\"2\">Team Alpha</td></tr><hr/>"));
    assert!(!dot.contains(">Title</td>"));
}

#[test]
fn unknown_printout_aborts() {
    let mut input = teams();
    input.rows[1].insert("ghost".to_string(), Vec::new());
    match build_graph(&input, &options(true)) {
        Err(Error::UnknownPrintout(hash)) => assert_eq!(hash, "ghost"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn descriptors_need_one_main_column() {
    let mut input = teams();
    input.descriptors[1].main_column = true;
    match build_graph(&input, &options(true)) {
        Err(Error::MainColumn(2)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn pipes_in_printout_hashes() {
    let input: Input = serde_json::from_value(json!({
        "printouts": [{ "hash": "2|||", "type": "_wpg", "main": true }],
        "rows": [{ "2|||": [{ "id": "A" }] }]
    }))
    .unwrap();
    let dot = build_graph(&input, &GraphOptions::default()).unwrap().dot;
    assert_eq!(
        dot,
        "digraph \"QueryResult\" {\nsubgraph \"2:::_nodes\" {\n\"A\" [label=\"A\"];\n}\n}"
    );
}

#[test]
fn captions_cannot_inject_markup() {
    let input: Input = serde_json::from_value(json!({
        "printouts": [{ "hash": "main", "type": "_wpg", "main": true }],
        "rows": [
            { "main": [{ "id": "A", "caption": "<b>Bold</b>" }] },
            { "main": [{ "id": "B", "caption": "\"x\" and \"y\"" }] },
            { "main": [{ "id": "C", "caption": "Tom & Jerry" }] }
        ]
    }))
    .unwrap();
    let dot = build_graph(&input, &GraphOptions::default()).unwrap().dot;
    assert!(dot.contains("\n\"A\" [label=\"&lt;b&gt;Bold&lt;/b&gt;\"];\n"));
    assert!(dot.contains("\n\"B\" [label=\"&quot;x&quot; and &quot;y&quot;\"];\n"));
    assert!(dot.contains("\n\"C\" [label=\"Tom &amp; Jerry\"];\n"));
}
