//! Depth-first searches over an argument list.
//!
//! All three walk expression arguments and array items in order and return
//! borrowed nodes; callers clone what they keep.

use jl_lang::{Node, NodeBody};

/// Every meaningful node, containers before their children.
pub(super) fn meaningful_values(args: &[Node]) -> Vec<&Node> {
    let mut found = Vec::new();
    for arg in args {
        arg.walk(&mut |node| {
            if node.is_meaningful() {
                found.push(node);
            }
        });
    }
    found
}

/// Variable references at any depth.
pub(super) fn variables(args: &[Node]) -> Vec<&Node> {
    let mut found = Vec::new();
    for arg in args {
        arg.walk(&mut |node| {
            if matches!(node.body, NodeBody::Variable { .. }) {
                found.push(node);
            }
        });
    }
    found
}

/// Literals other than `""` and `null`, at any depth.
pub(super) fn literals(args: &[Node]) -> Vec<&Node> {
    let mut found = Vec::new();
    for arg in args {
        arg.walk(&mut |node| {
            if let NodeBody::Literal { value } = &node.body
                && !value.is_empty()
            {
                found.push(node);
            }
        });
    }
    found
}

/// Numeric literals among the top-level arguments only.
pub(super) fn top_level_numbers(args: &[Node]) -> Vec<&Node> {
    args.iter()
        .filter(|arg| arg.scalar().is_some_and(|s| s.is_number()))
        .collect()
}

/// String literals and variables among the top-level arguments only.
pub(super) fn top_level_strings(args: &[Node]) -> Vec<&Node> {
    args.iter()
        .filter(|arg| {
            matches!(arg.body, NodeBody::Variable { .. })
                || arg.scalar().is_some_and(|s| s.is_string())
        })
        .collect()
}
