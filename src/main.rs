use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context as _, Result};
use clap::{App, Arg, ArgMatches};
use query_graph::options::{parse_attr_list, ColorScheme};
use query_graph::{build_graph, GraphOptions, Input};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "query_graph=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn flag(name: &'static str, help: &'static str) -> Arg<'static, 'static> {
    Arg::with_name(name).long(name).help(help)
}

fn value(name: &'static str, help: &'static str) -> Arg<'static, 'static> {
    flag(name, help).takes_value(true)
}

/// Applies the command line on top of the options stored in the input.
fn apply_args(options: &mut GraphOptions, matches: &ArgMatches) -> Result<()> {
    if let Some(name) = matches.value_of("name") {
        options.graph_name = name.to_string();
    }
    if let Some(relation) = matches.value_of("relation") {
        options.relation = relation.parse()?;
    }
    let switches: [(&str, &mut bool); 6] = [
        ("color", &mut options.color),
        ("link", &mut options.link),
        ("fields", &mut options.fields),
        ("oblique", &mut options.oblique),
        ("legend", &mut options.legend),
        ("dot-legend", &mut options.dot_legend),
    ];
    for (name, switch) in switches {
        if matches.is_present(name) {
            *switch = true;
        }
    }
    if let Some(limit) = matches.value_of("wrap") {
        options.word_wrap_limit = limit
            .parse()
            .with_context(|| format!("invalid wrap limit `{}`", limit))?;
    }
    if let Some(properties) = matches.values_of("label-property") {
        options
            .label_properties
            .extend(properties.map(|p| p.to_string()));
    }
    if let Some(scheme) = matches.value_of("node-scheme") {
        options.node_scheme = ColorScheme::from_scheme_name(scheme);
    }
    if let Some(scheme) = matches.value_of("edge-scheme") {
        options.edge_scheme = ColorScheme::from_scheme_name(scheme);
    }
    let lists = [
        ("graph-attr", &mut options.graph_attrs),
        ("node-attr", &mut options.node_attrs),
        ("edge-attr", &mut options.edge_attrs),
    ];
    for (name, attrs) in lists {
        for list in matches.values_of(name).into_iter().flatten() {
            let parsed = parse_attr_list(list).with_context(|| format!("--{}", name))?;
            attrs.extend(parsed);
        }
    }
    Ok(())
}

fn read_input(path: &str) -> Result<Input> {
    let input = if path == "-" {
        Input::from_reader(io::stdin())
    } else {
        Input::from_file(Path::new(path))
    };
    input.with_context(|| format!("reading {}", path))
}

fn run(matches: &ArgMatches) -> Result<()> {
    let input_path = matches.value_of("INPUT").unwrap_or("-");
    let input = read_input(input_path)?;

    let mut options = input.options.clone().unwrap_or_default();
    apply_args(&mut options, matches)?;

    let output = build_graph(&input, &options)
        .with_context(|| format!("building graph from {}", input_path))?;
    let rendered = output.render();

    match matches.value_of("output") {
        Some(path) => fs::write(path, rendered + "\n").with_context(|| format!("writing {}", path))?,
        None => println!("{}", rendered),
    }
    Ok(())
}

fn main() -> Result<()> {
    let matches = App::new("query-graph")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders a JSON query result as a Graphviz DOT graph")
        .arg(
            Arg::with_name("INPUT")
                .help("Query result to read (JSON), `-` for stdin")
                .default_value("-")
                .index(1),
        )
        .arg(value("output", "Writes the graph to this file instead of stdout").short("o"))
        .arg(value("name", "Graph name"))
        .arg(
            value("relation", "Edge direction")
                .possible_values(&["none", "parent", "child"]),
        )
        .arg(flag("color", "Colours printouts from the palette"))
        .arg(flag("link", "Links nodes and fields to their pages"))
        .arg(flag("fields", "Shows non-page printouts as node fields"))
        .arg(flag("oblique", "Attaches printouts by property chain prefix"))
        .arg(flag("legend", "Appends a markup legend (needs --color)"))
        .arg(flag("dot-legend", "Appends a legend graph"))
        .arg(value("wrap", "Word wrap limit for labels"))
        .arg(
            value("label-property", "Printout whose value relabels its parent node")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(value("node-scheme", "Graphviz colour scheme for nodes"))
        .arg(value("edge-scheme", "Graphviz colour scheme for edges"))
        .arg(
            value("graph-attr", "Graph attributes, e.g. 'rankdir=LR, size=\"8,5\"'")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            value("node-attr", "Default node attributes")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            value("edge-attr", "Default edge attributes")
                .multiple(true)
                .number_of_values(1),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Logs skipped data and build details"),
        )
        .get_matches();

    init_logging(matches.is_present("verbose"));
    run(&matches)
}
