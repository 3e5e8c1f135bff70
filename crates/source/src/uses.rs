use std::collections::HashMap;

/// Expand the argument of a `use` declaration into `alias → full path` pairs.
///
/// Handles nested `{...}` groups, `as` renames and `self`; glob imports bind no
/// name and are dropped.
pub(crate) fn expand_use(argument: &str, imports: &mut HashMap<String, Vec<String>>) {
    let compact: String = argument.split_whitespace().collect::<Vec<_>>().join(" ");
    expand_into(&[], &compact, imports);
}

fn expand_into(prefix: &[String], tree: &str, imports: &mut HashMap<String, Vec<String>>) {
    for item in split_top_level(tree) {
        let item = item.trim();
        if item.is_empty() || item.ends_with('*') {
            continue;
        }

        if let Some(open) = item.find('{') {
            let head = item[..open].trim().trim_end_matches("::");
            let inner = item[open + 1..].trim_end().trim_end_matches('}');
            let mut nested = prefix.to_vec();
            nested.extend(segments(head));
            expand_into(&nested, inner, imports);
            continue;
        }

        let (path, alias) = match item.split_once(" as ") {
            Some((path, alias)) => (path.trim(), Some(alias.trim())),
            None => (item, None),
        };

        let mut full = prefix.to_vec();
        full.extend(segments(path));
        if full.last().is_some_and(|last| last == "self") {
            full.pop();
        }

        let Some(name) = alias.map(str::to_string).or_else(|| full.last().cloned()) else {
            continue;
        };
        if name == "_" {
            continue;
        }
        imports.insert(name, full);
    }
}

fn segments(path: &str) -> impl Iterator<Item = String> + '_ {
    path.split("::")
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// Split on commas that are not nested inside braces
fn split_top_level(tree: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in tree.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&tree[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&tree[start..]);
    parts
}
