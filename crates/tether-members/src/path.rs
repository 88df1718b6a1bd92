//! Binding path segment helpers
//!
//! Indexer syntax (`Item[2]`, `[0]`) and method-call syntax (`Total(10)`)
//! carry literal argument lists inside one path segment. These helpers split
//! them out without touching quotes or nested brackets; arguments stay raw
//! text for the converter.

/// Split indexer syntax into the base name and raw arguments
///
/// `Item[2]` yields `("Item", ["2"])`; a bare `[0]` yields an empty base.
/// Returns `None` when the segment carries no (well-formed) indexer syntax.
pub fn indexer_args_raw(name: &str) -> Option<(&str, Vec<&str>)> {
    if !name.ends_with(']') {
        return None;
    }
    let open = name.find('[')?;
    let base = &name[..open];
    if base.contains('(') {
        return None;
    }
    let args = split_args(&name[open + 1..name.len() - 1])?;
    if args.is_empty() {
        return None;
    }
    Some((base, args))
}

/// Split method-call syntax into the base name and raw arguments
///
/// `Clamp(0, 10)` yields `("Clamp", ["0", "10"])`; `Total()` yields an empty
/// argument list. Returns `None` when the segment carries no call syntax.
pub fn method_args_raw(name: &str) -> Option<(&str, Vec<&str>)> {
    if !name.ends_with(')') {
        return None;
    }
    let open = name.find('(')?;
    let base = &name[..open];
    if base.is_empty() || base.contains('[') {
        return None;
    }
    let args = split_args(&name[open + 1..name.len() - 1])?;
    Some((base, args))
}

/// Whether the segment carries indexer syntax
pub fn is_indexer_name(name: &str) -> bool {
    indexer_args_raw(name).is_some()
}

/// Render an indexer segment from a base name and rendered arguments
pub fn indexer_name(base: &str, args: &[&str]) -> String {
    format!("{}[{}]", base, args.join(", "))
}

/// Split a raw argument list on top-level commas
///
/// Commas inside quotes or nested brackets do not split. Returns `None` for
/// unbalanced input or empty argument slots.
fn split_args(inner: &str) -> Option<Vec<&str>> {
    if inner.trim().is_empty() {
        return Some(Vec::new());
    }
    let mut args = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0usize;

    for (i, ch) in inner.char_indices() {
        match quote {
            Some(q) => {
                if ch == q {
                    quote = None;
                }
            }
            None => match ch {
                '\'' | '"' => quote = Some(ch),
                '[' | '(' => depth += 1,
                ']' | ')' => {
                    depth -= 1;
                    if depth < 0 {
                        return None;
                    }
                }
                ',' if depth == 0 => {
                    args.push(inner[start..i].trim());
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if quote.is_some() || depth != 0 {
        return None;
    }
    args.push(inner[start..].trim());
    if args.iter().any(|a| a.is_empty()) {
        return None;
    }
    Some(args)
}
