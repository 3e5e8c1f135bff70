use attrwire_annotation::Arguments;
use serde_json::{Number, Value};
use tree_sitter::Node;

/// Attribute as written in source, before its name is qualified
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute {
    /// Path segments (`serde::rename` → `["serde", "rename"]`)
    pub path: Vec<String>,
    pub arguments: Arguments,
}

impl RawAttribute {
    #[must_use]
    pub fn is_single_segment(&self) -> bool {
        self.path.len() == 1
    }
}

/// Read an `attribute` node: `Route("GET", "/")`, `name = "x"` or a bare path
pub(crate) fn parse_attribute(content: &str, attribute: Node) -> Option<RawAttribute> {
    let path_node = attribute.named_child(0)?;
    let path: Vec<String> = node_text(content, path_node)
        .split("::")
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    if path.is_empty() {
        return None;
    }

    let arguments = if let Some(tree) = attribute.child_by_field_name("arguments") {
        parse_token_tree(content, tree)
    } else if let Some(value) = attribute.child_by_field_name("value") {
        Arguments {
            positional: vec![literal_value(content, value)],
            ..Default::default()
        }
    } else {
        Arguments::default()
    };

    Some(RawAttribute { path, arguments })
}

/// Flattened token: punctuation is split into single characters
#[derive(Clone, Copy)]
enum Tok<'t> {
    Punct(char),
    Node(Node<'t>),
}

fn parse_token_tree(content: &str, tree: Node) -> Arguments {
    let mut cursor = tree.walk();
    let children: Vec<Node> = tree.children(&mut cursor).collect();
    let inner = strip_delimiters(content, &children);

    let mut tokens = Vec::new();
    for child in inner {
        if child.is_named() {
            tokens.push(Tok::Node(*child));
        } else {
            tokens.extend(
                node_text(content, *child)
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(Tok::Punct),
            );
        }
    }

    let mut arguments = Arguments::default();
    for group in tokens.split(|tok| matches!(tok, Tok::Punct(','))) {
        match group {
            [] => {}
            [Tok::Node(key), Tok::Punct('='), rest @ ..] if key.kind() == "identifier" => {
                if let Some(value) = group_value(content, rest) {
                    arguments
                        .named
                        .insert(node_text(content, *key).to_string(), value);
                }
            }
            _ => {
                if let Some(value) = group_value(content, group) {
                    arguments.positional.push(value);
                }
            }
        }
    }
    arguments
}

fn strip_delimiters<'a, 't>(content: &str, children: &'a [Node<'t>]) -> &'a [Node<'t>] {
    let opens = children
        .first()
        .is_some_and(|n| !n.is_named() && matches!(node_text(content, *n), "(" | "[" | "{"));
    let closes = children.len() > usize::from(opens)
        && children
            .last()
            .is_some_and(|n| !n.is_named() && matches!(node_text(content, *n), ")" | "]" | "}"));

    let start = usize::from(opens);
    let end = children.len() - usize::from(closes);
    &children[start..end]
}

fn group_value(content: &str, group: &[Tok]) -> Option<Value> {
    match group {
        [] => None,
        [Tok::Node(node)] => Some(literal_value(content, *node)),
        [Tok::Punct('-'), Tok::Node(node)]
            if matches!(node.kind(), "integer_literal" | "float_literal") =>
        {
            let text = format!("-{}", node_text(content, *node));
            Some(number_value(&text, node.kind() == "float_literal"))
        }
        _ => {
            let nodes: Vec<Node> = group
                .iter()
                .filter_map(|tok| match tok {
                    Tok::Node(node) => Some(*node),
                    Tok::Punct(_) => None,
                })
                .collect();
            let (first, last) = (nodes.first()?, nodes.last()?);
            let span = &content[first.start_byte()..last.end_byte()];
            Some(Value::String(span.to_string()))
        }
    }
}

fn literal_value(content: &str, node: Node) -> Value {
    let text = node_text(content, node);
    match node.kind() {
        "string_literal" => Value::String(unescape(strip_quotes(text, '"'))),
        "raw_string_literal" => Value::String(raw_string(text).to_string()),
        "char_literal" => Value::String(unescape(strip_quotes(text, '\''))),
        "integer_literal" => number_value(text, false),
        "float_literal" => number_value(text, true),
        "boolean_literal" => Value::Bool(text == "true"),
        "identifier" if text == "true" || text == "false" => Value::Bool(text == "true"),
        "token_tree" => parse_token_tree(content, node).to_value(),
        _ => Value::String(text.to_string()),
    }
}

fn number_value(text: &str, float: bool) -> Value {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    if float {
        let digits = cleaned.trim_end_matches("f32").trim_end_matches("f64");
        return digits
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or_else(|| Value::String(text.to_string()), Value::Number);
    }

    let digits = strip_int_suffix(&cleaned);
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits),
    };
    let (radix, digits) = match digits.get(..2) {
        Some("0x") => (16, &digits[2..]),
        Some("0o") => (8, &digits[2..]),
        Some("0b") => (2, &digits[2..]),
        _ => (10, digits),
    };

    match i64::from_str_radix(digits, radix) {
        Ok(n) => Value::from(if negative { -n } else { n }),
        Err(_) if !negative => u64::from_str_radix(digits, radix)
            .map_or_else(|_| Value::String(text.to_string()), Value::from),
        Err(_) => Value::String(text.to_string()),
    }
}

fn strip_int_suffix(text: &str) -> &str {
    const SUFFIXES: &[&str] = &[
        "i128", "u128", "isize", "usize", "i64", "u64", "i32", "u32", "i16", "u16", "i8", "u8",
    ];
    // hex digits may look like suffixes, so only strip after a decimal literal
    if text.contains("0x") {
        return text;
    }
    SUFFIXES
        .iter()
        .find_map(|suffix| text.strip_suffix(suffix))
        .unwrap_or(text)
}

fn strip_quotes(text: &str, quote: char) -> &str {
    let text = text.trim_start_matches('b');
    text.strip_prefix(quote)
        .and_then(|t| t.strip_suffix(quote))
        .unwrap_or(text)
}

fn raw_string(text: &str) -> &str {
    let text = text.trim_start_matches('b').trim_start_matches('r');
    let hashes = text.len() - text.trim_start_matches('#').len();
    let text = &text[hashes..text.len().saturating_sub(hashes).max(hashes)];
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                if let Some(ch) = u8::from_str_radix(&hex, 16).ok().map(char::from) {
                    out.push(ch);
                }
            }
            Some('u') => {
                let code: String = chars
                    .by_ref()
                    .skip_while(|c| *c == '{')
                    .take_while(|c| *c != '}')
                    .collect();
                if let Some(ch) = u32::from_str_radix(&code, 16).ok().and_then(char::from_u32) {
                    out.push(ch);
                }
            }
            // line continuation
            Some('\n') => {
                while chars.peek().is_some_and(|c| c.is_whitespace()) {
                    chars.next();
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

pub(crate) fn node_text<'c>(content: &'c str, node: Node) -> &'c str {
    &content[node.start_byte()..node.end_byte()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_numbers() {
        assert_eq!(number_value("42", false), json!(42));
        assert_eq!(number_value("1_000u32", false), json!(1000));
        assert_eq!(number_value("-7", false), json!(-7));
        assert_eq!(number_value("0xff", false), json!(255));
        assert_eq!(number_value("0b101", false), json!(5));
        assert_eq!(number_value("2.5", true), json!(2.5));
        assert_eq!(number_value("1.0f64", true), json!(1.0));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape(r"a\nb"), "a\nb");
        assert_eq!(unescape(r#"say \"hi\""#), "say \"hi\"");
        assert_eq!(unescape(r"\u{1F600}"), "\u{1F600}");
        assert_eq!(unescape(r"\x41"), "A");
        assert_eq!(unescape(r"back\\slash"), "back\\slash");
    }

    #[test]
    fn test_raw_string() {
        assert_eq!(raw_string(r##"r#"a "quoted" b"#"##), r#"a "quoted" b"#);
        assert_eq!(raw_string(r#"r"plain""#), "plain");
    }

    #[test]
    fn test_strip_quotes() {
        assert_eq!(strip_quotes("\"abc\"", '"'), "abc");
        assert_eq!(strip_quotes("b\"abc\"", '"'), "abc");
        assert_eq!(strip_quotes("'x'", '\''), "x");
    }
}
