//! Operator conversion: which operators an expression may turn into, and how
//! its arguments are carried over.
//!
//! A conversion keeps the node id, swaps the operator and remaps the
//! arguments by the source and target categories. Whatever path is taken,
//! the result satisfies the target arity and carries no duplicate ids.

mod defaults;
mod extract;
mod remap;

use std::collections::HashSet;

use jl_config::HeuristicsConfig;
use jl_lang::{Category, Node, NodeBody, NodeId, OperatorCatalog, OperatorDescriptor};
use serde::Serialize;

pub use defaults::{contextual_default, plain_default};

/// A conversion target offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionOption {
    pub operator: String,
    pub label: String,
    pub description: String,
    pub category: Category,
}

impl From<&OperatorDescriptor> for ConversionOption {
    fn from(op: &OperatorDescriptor) -> Self {
        Self {
            operator: op.name.clone(),
            label: op.label.clone(),
            description: op.description.clone(),
            category: op.category,
        }
    }
}

pub struct Converter<'c> {
    catalog: &'c OperatorCatalog,
    heuristics: HeuristicsConfig,
}

impl Converter<'static> {
    /// Standard catalog with the built-in heuristic table.
    pub fn standard() -> Self {
        Self::new(OperatorCatalog::standard(), HeuristicsConfig::default())
    }
}

impl<'c> Converter<'c> {
    pub fn new(catalog: &'c OperatorCatalog, heuristics: HeuristicsConfig) -> Self {
        Self {
            catalog,
            heuristics,
        }
    }

    pub fn catalog(&self) -> &'c OperatorCatalog {
        self.catalog
    }

    /// Operators `current` may be converted into, in catalog order. Empty
    /// when `current` is unknown.
    pub fn list_convertible_operators(&self, current: &str) -> Vec<ConversionOption> {
        let Some(source) = self.catalog.lookup(current) else {
            return Vec::new();
        };
        self.catalog
            .iter()
            .filter(|op| op.name != source.name && source.category.converts_to(op.category))
            .map(ConversionOption::from)
            .collect()
    }

    /// Convert `node` to `target`. Non-expressions come back unchanged; an
    /// unknown source or target only swaps the operator name.
    pub fn convert(&self, node: &Node, target: &str) -> Node {
        let NodeBody::Expression {
            operator,
            arguments,
        } = &node.body
        else {
            return node.clone();
        };

        let (Some(source_op), Some(target_op)) =
            (self.catalog.lookup(operator), self.catalog.lookup(target))
        else {
            log::debug!(
                "conversion {operator:?} -> {target:?} outside the catalog; keeping arguments"
            );
            return Node::new(
                node.id.clone(),
                NodeBody::Expression {
                    operator: target.to_string(),
                    arguments: arguments.clone(),
                },
            );
        };

        let remapped = self.remap(arguments, source_op, target_op);
        let mut converted = Node::new(
            node.id.clone(),
            NodeBody::Expression {
                operator: target.to_string(),
                arguments: fit_arity(remapped, target_op),
            },
        );
        dedupe_ids(&mut converted);
        log::debug!(
            "converted {} {operator:?} -> {target:?} ({} -> {} args)",
            node.id,
            arguments.len(),
            converted.arguments().len()
        );
        converted
    }
}

/// Truncate to the maximum and pad to the minimum with plain defaults.
fn fit_arity(mut args: Vec<Node>, target: &OperatorDescriptor) -> Vec<Node> {
    args.truncate(target.arity.max_len());
    while args.len() < target.arity.min {
        args.push(plain_default(&target.name, args.len()));
    }
    args
}

/// A subtree placed twice (e.g. a condition and one of its operands) keeps
/// its id at the first occurrence; later copies get fresh ids.
fn dedupe_ids(root: &mut Node) {
    let mut seen: HashSet<NodeId> = HashSet::new();
    root.walk_mut(&mut |node| {
        if !seen.insert(node.id.clone()) {
            node.id = NodeId::fresh();
            seen.insert(node.id.clone());
        }
    });
}
