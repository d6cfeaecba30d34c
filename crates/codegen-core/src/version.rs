//! Version helpers.
//!
//! Entity versions come straight from source documents ("1.2.0", "v2",
//! "2024-01-15"). They are compared leniently: an optional leading `v` is
//! dropped, dot/dash separated segments compare numerically when both are
//! numbers and lexicographically otherwise. An empty version sorts first.

use std::cmp::Ordering;

/// Compare two version strings.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = strip_prefix(a);
    let b = strip_prefix(b);

    match (a.is_empty(), b.is_empty()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    let mut sa = segments(a);
    let mut sb = segments(b);

    loop {
        match (sa.next(), sb.next()) {
            (None, None) => return Ordering::Equal,
            (Some(_), None) => return Ordering::Greater,
            (None, Some(_)) => return Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
                    (Ok(nx), Ok(ny)) => nx.cmp(&ny),
                    _ => x.cmp(y),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}

/// True if `candidate` is strictly newer than `current`.
pub fn is_newer(candidate: &str, current: &str) -> bool {
    compare_versions(candidate, current) == Ordering::Greater
}

fn strip_prefix(v: &str) -> &str {
    let v = v.trim();
    v.strip_prefix('v')
        .or_else(|| v.strip_prefix('V'))
        .unwrap_or(v)
}

fn segments(v: &str) -> impl Iterator<Item = &str> {
    v.split(['.', '-', '+']).filter(|s| !s.is_empty())
}
