use jl_config::HeuristicsConfig;
use jl_lang::{Node, NodeBody, Scalar};
use serde_json::Number;

/// Placeholder for argument `index` of `operator`. Every call yields nodes
/// with fresh ids.
pub fn plain_default(operator: &str, index: usize) -> Node {
    match (operator, index) {
        ("var", _) => Node::variable("person.firstName"),
        ("oneof" | "partof", 0) => Node::variable("person.firstName"),
        ("oneof" | "partof", _) => Node::array(vec![Node::literal("")]),
        ("==" | "!==" | "!=" | "<" | "<=" | ">" | ">=", 0) => Node::variable("person.age"),
        ("==" | "!==" | "!=" | "<" | "<=" | ">" | ">=", _) => Node::number(18),
        ("between", 0) => Node::variable("person.age"),
        ("between", 1) => Node::number(18),
        ("between", _) => Node::number(65),
        ("if", 0) => Node::literal(true),
        ("if", 1) => Node::literal("yes"),
        ("if", _) => Node::literal("no"),
        ("and" | "or", _) => Node::literal(true),
        ("concatWs", 0) => Node::literal(" "),
        ("concat" | "concatWs", _) => Node::variable("person.firstName"),
        ("+" | "-" | "*" | "/" | "%", 0) => Node::variable("person.age"),
        ("+" | "-" | "*" | "/" | "%", _) => Node::number(1),
        ("!" | "!!", _) => Node::literal(true),
        ("isnull" | "isnotnull", _) => Node::variable("person.email"),
        ("substr", 0) => Node::variable("person.firstName"),
        ("substr", 1) => Node::number(0),
        ("substr", _) => Node::number(3),
        ("strlen", _) => Node::variable("person.firstName"),
        _ => Node::literal(""),
    }
}

/// Placeholder shaped after a neighbouring argument.
///
/// A variable neighbour picks the first heuristic rule whose keyword occurs
/// in its field name (`""` when none does). A literal neighbour yields a
/// value of the same type: `n + 1`, `!b`, or `""`. Anything else falls back
/// to [`plain_default`].
pub fn contextual_default(
    heuristics: &HeuristicsConfig,
    operator: &str,
    index: usize,
    related: Option<&Node>,
) -> Node {
    match related.map(|n| &n.body) {
        Some(NodeBody::Variable { field }) => match heuristics.context_value(field) {
            Some(value) => Node::literal(value.clone()),
            None => Node::literal(""),
        },
        Some(NodeBody::Literal { value }) => match value {
            Scalar::Number(n) => match successor(n) {
                Some(next) => Node::literal(Scalar::Number(next)),
                None => plain_default(operator, index),
            },
            Scalar::Bool(b) => Node::literal(!*b),
            Scalar::Str(_) => Node::literal(""),
            Scalar::Null => plain_default(operator, index),
        },
        _ => plain_default(operator, index),
    }
}

fn successor(n: &Number) -> Option<Number> {
    if let Some(i) = n.as_i64()
        && let Some(next) = i.checked_add(1)
    {
        return Some(Number::from(next));
    }
    if let Some(u) = n.as_u64()
        && let Some(next) = u.checked_add(1)
    {
        return Some(Number::from(next));
    }
    n.as_f64().and_then(|f| Number::from_f64(f + 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(node: &Node) -> &Scalar {
        node.scalar().expect("literal")
    }

    #[test]
    fn plain_defaults_by_position() {
        assert_eq!(plain_default("between", 0).field(), Some("person.age"));
        assert_eq!(lit(&plain_default("between", 1)), &Scalar::int(18));
        assert_eq!(lit(&plain_default("between", 2)), &Scalar::int(65));
        assert_eq!(lit(&plain_default("if", 1)), &Scalar::from("yes"));
        assert_eq!(lit(&plain_default("concatWs", 0)), &Scalar::from(" "));
        assert_eq!(plain_default("concatWs", 1).field(), Some("person.firstName"));
        assert_eq!(plain_default("isnull", 0).field(), Some("person.email"));
        assert_eq!(lit(&plain_default("substr", 2)), &Scalar::int(3));
        assert_eq!(lit(&plain_default("dterm", 0)), &Scalar::from(""));

        let arr = plain_default("oneof", 1);
        assert_eq!(arr.children().len(), 1);
        assert_eq!(lit(&arr.children()[0]), &Scalar::from(""));
    }

    #[test]
    fn plain_defaults_get_fresh_ids() {
        let a = plain_default("==", 0);
        let b = plain_default("==", 0);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn contextual_from_variable() {
        let h = HeuristicsConfig::default();
        let age = Node::variable("person.age");
        assert_eq!(
            lit(&contextual_default(&h, "==", 1, Some(&age))),
            &Scalar::int(18)
        );
        let city = Node::variable("person.city");
        assert_eq!(
            lit(&contextual_default(&h, "==", 1, Some(&city))),
            &Scalar::from("")
        );
    }

    #[test]
    fn contextual_from_literal() {
        let h = HeuristicsConfig::default();
        let n = Node::number(41);
        assert_eq!(lit(&contextual_default(&h, "==", 1, Some(&n))), &Scalar::int(42));

        let f = Node::literal(Scalar::Number(Number::from_f64(1.5).unwrap()));
        assert_eq!(
            lit(&contextual_default(&h, "==", 1, Some(&f))),
            &Scalar::Number(Number::from_f64(2.5).unwrap())
        );

        let t = Node::literal(true);
        assert_eq!(lit(&contextual_default(&h, "==", 1, Some(&t))), &Scalar::Bool(false));

        let s = Node::literal("Berlin");
        assert_eq!(lit(&contextual_default(&h, "==", 1, Some(&s))), &Scalar::from(""));
    }

    #[test]
    fn contextual_falls_back_to_plain() {
        let h = HeuristicsConfig::default();
        let null = Node::literal(Scalar::Null);
        assert_eq!(lit(&contextual_default(&h, ">", 1, Some(&null))), &Scalar::int(18));
        assert_eq!(
            contextual_default(&h, ">", 0, None).field(),
            Some("person.age")
        );
        let expr = Node::expression("!", vec![]);
        assert_eq!(lit(&contextual_default(&h, "if", 2, Some(&expr))), &Scalar::from("no"));
    }
}
