//! Serialization of attribute lists into DOT syntax.

use indexmap::IndexMap;

/// How a list of attributes is wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrMode {
    /// Graph, node or edge attributes: `[a="1", b="2"]`.
    Bracketed,
    /// Attributes of a pseudo-HTML tag: `a="1" b="2"`.
    Bare,
    /// Statements at the root of a graph or subgraph, one per line.
    RootLevel,
}

impl AttrMode {
    fn wrappers(self) -> (&'static str, &'static str, &'static str) {
        match self {
            AttrMode::Bracketed => ("[", ", ", "]"),
            AttrMode::Bare => ("", " ", ""),
            AttrMode::RootLevel => ("", "\n", "\n"),
        }
    }
}

/// Escapes `&`, `<`, `>`, `"` and `'` as HTML entities.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// Wraps already escaped text in double quotes, so that it is written as is.
pub fn quoted(escaped: &str) -> String {
    format!("\"{}\"", escaped)
}

/// A value that is already a quoted DOT string or an HTML-like label.
fn is_raw(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('<') && value.ends_with('>')))
}

/// Serializes `(name, value)` pairs, skipping the ones without a value.
///
/// Returns an empty string if nothing is left to serialize.
pub fn serialize<'a, I>(attrs: I, mode: AttrMode) -> String
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let lines: Vec<String> = attrs
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
        .map(|(name, value)| {
            if is_raw(value) {
                format!("{}={}", name, value)
            } else {
                format!("{}=\"{}\"", name, escape(value))
            }
        })
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    let (start, separator, end) = mode.wrappers();
    format!("{}{}{}", start, lines.join(separator), end)
}

/// Shorthand for serializing an ordered map without holes.
pub fn serialize_map(attrs: &IndexMap<String, String>, mode: AttrMode) -> String {
    serialize(
        attrs.iter().map(|(k, v)| (k.as_str(), Some(v.as_str()))),
        mode,
    )
}
