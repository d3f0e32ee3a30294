use crate::ast::{Node, NodeBody, NodeId};
use crate::catalog::OperatorCatalog;
use crate::fields::{is_known_field, is_known_table, parse_field_path};

/// Severity level for editor diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A diagnostic attached to one node of the tree.
#[derive(Debug, Clone)]
pub struct CheckError {
    pub severity: Severity,
    pub node: NodeId,
    pub message: String,
}

impl std::fmt::Display for CheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}: node `{}`: {}", prefix, self.node, self.message)
    }
}

/// Check every rule of a forest. Returns an empty Vec when all checks pass.
pub fn check_forest(forest: &[Node], catalog: &OperatorCatalog) -> Vec<CheckError> {
    let mut errors = Vec::new();
    for rule in forest {
        rule.walk(&mut |node| check_one(node, catalog, &mut errors));
    }
    errors
}

/// Check a single subtree.
pub fn check_node(node: &Node, catalog: &OperatorCatalog) -> Vec<CheckError> {
    check_forest(std::slice::from_ref(node), catalog)
}

fn check_one(node: &Node, catalog: &OperatorCatalog, errors: &mut Vec<CheckError>) {
    let mut push = |severity: Severity, message: String| {
        errors.push(CheckError {
            severity,
            node: node.id.clone(),
            message,
        })
    };

    match &node.body {
        NodeBody::Expression {
            operator,
            arguments,
        } => match catalog.lookup(operator) {
            None => push(Severity::Error, format!("unknown operator `{operator}`")),
            Some(op) if !op.arity.allows(arguments.len()) => push(
                Severity::Error,
                format!(
                    "`{}` expects {} argument(s), got {}",
                    operator,
                    op.arity,
                    arguments.len()
                ),
            ),
            Some(_) => {}
        },
        NodeBody::Variable { field } => {
            if field.is_empty() {
                push(Severity::Warning, "variable does not name a field".to_string());
            } else if !is_known_field(field) {
                match parse_field_path(field) {
                    Err(_) => push(
                        Severity::Warning,
                        format!("`{field}` is not a `table.column` field reference"),
                    ),
                    Ok(path) if !is_known_table(&path.table) => push(
                        Severity::Warning,
                        format!("unknown table `{}` in `{field}`", path.table),
                    ),
                    Ok(_) => push(Severity::Warning, format!("unknown field `{field}`")),
                }
            }
        }
        NodeBody::Literal { .. } | NodeBody::Array { .. } => {}
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: &[CheckError]) -> Vec<String> {
        errors.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn clean_rule_has_no_diagnostics() {
        let rule = Node::expression(
            "and",
            vec![
                Node::expression(
                    "==",
                    vec![Node::variable("person.isActive"), Node::literal(true)],
                ),
                Node::expression("isnotnull", vec![Node::variable("person.email")]),
            ],
        );
        assert!(check_node(&rule, OperatorCatalog::standard()).is_empty());
    }

    #[test]
    fn unknown_operator_and_arity() {
        let rule = Node::expression(
            "or",
            vec![
                Node::expression("xor", vec![]),
                Node::expression("between", vec![Node::number(1)]),
            ],
        );
        let errors = check_node(&rule, OperatorCatalog::standard());
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.severity == Severity::Error));
        assert_eq!(
            messages(&errors),
            vec![
                "unknown operator `xor`".to_string(),
                "`between` expects 3 argument(s), got 1".to_string(),
            ]
        );
    }

    #[test]
    fn field_warnings() {
        let forest = vec![
            Node::variable("person.age"),
            Node::variable("invoice.total"),
            Node::variable("nonsense"),
            Node::variable(""),
        ];
        let errors = check_forest(&forest, OperatorCatalog::standard());
        assert_eq!(errors.len(), 4);
        assert!(errors.iter().all(|e| e.severity == Severity::Warning));
        assert_eq!(errors[0].message, "unknown field `person.age`");
        assert_eq!(errors[1].message, "unknown table `invoice` in `invoice.total`");
        assert!(errors[2].message.contains("table.column"));
    }

    #[test]
    fn display_includes_node_id() {
        let node = Node::expression("xor", vec![]).with_id("n7".into());
        let errors = check_node(&node, OperatorCatalog::standard());
        assert_eq!(errors[0].to_string(), "error: node `n7`: unknown operator `xor`");
    }
}
