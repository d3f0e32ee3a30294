use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Number, Value};

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Opaque node identifier. Stable across conversions; freshly synthesised
/// nodes always receive a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Generate an identifier that is unique for the lifetime of the session,
    /// including across reloads of a persisted history.
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// Literal value: string, number, boolean or null. Nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Str(String),
}

impl Scalar {
    /// `""` and `null` carry no user intent.
    pub fn is_empty(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Str(s) => s.is_empty(),
            Scalar::Bool(_) | Scalar::Number(_) => false,
        }
    }

    pub fn int(n: i64) -> Self {
        Scalar::Number(Number::from(n))
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Scalar::Number(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Scalar::Str(_))
    }

    /// Convert a JSON value, rejecting arrays and objects.
    pub fn from_json(value: &Value) -> Option<Scalar> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(Scalar::Number(n.clone())),
            Value::String(s) => Some(Scalar::Str(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Number(n) => Value::Number(n.clone()),
            Scalar::Str(s) => Value::String(s.clone()),
        }
    }
}

impl From<bool> for Scalar {
    fn from(b: bool) -> Self {
        Scalar::Bool(b)
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::Number(Number::from(n))
    }
}

impl From<&str> for Scalar {
    fn from(s: &str) -> Self {
        Scalar::Str(s.to_string())
    }
}

impl From<String> for Scalar {
    fn from(s: String) -> Self {
        Scalar::Str(s)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// Discriminant of a [`Node`], matching the `type` tag of the persisted layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Expression,
    Variable,
    Literal,
    Array,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Expression => "expression",
            NodeKind::Variable => "variable",
            NodeKind::Literal => "literal",
            NodeKind::Array => "array",
        }
    }
}

/// One node of an expression tree. Children are owned exclusively.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "NodeRaw")]
pub struct Node {
    pub id: NodeId,
    pub body: NodeBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    /// Operator application, e.g. `{"==": [a, b]}`.
    Expression {
        operator: String,
        arguments: Vec<Node>,
    },
    /// Field reference, e.g. `{"var": "person.age"}`.
    Variable { field: String },
    Literal { value: Scalar },
    Array { items: Vec<Node> },
}

impl Node {
    pub fn new(id: NodeId, body: NodeBody) -> Self {
        Self { id, body }
    }

    pub fn expression(operator: impl Into<String>, arguments: Vec<Node>) -> Self {
        Self::new(
            NodeId::fresh(),
            NodeBody::Expression {
                operator: operator.into(),
                arguments,
            },
        )
    }

    pub fn variable(field: impl Into<String>) -> Self {
        Self::new(
            NodeId::fresh(),
            NodeBody::Variable {
                field: field.into(),
            },
        )
    }

    pub fn literal(value: impl Into<Scalar>) -> Self {
        Self::new(
            NodeId::fresh(),
            NodeBody::Literal {
                value: value.into(),
            },
        )
    }

    pub fn number(n: i64) -> Self {
        Self::literal(Scalar::int(n))
    }

    pub fn array(items: Vec<Node>) -> Self {
        Self::new(NodeId::fresh(), NodeBody::Array { items })
    }

    /// Replace the identifier, keeping the body.
    pub fn with_id(mut self, id: NodeId) -> Self {
        self.id = id;
        self
    }

    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::Expression { .. } => NodeKind::Expression,
            NodeBody::Variable { .. } => NodeKind::Variable,
            NodeBody::Literal { .. } => NodeKind::Literal,
            NodeBody::Array { .. } => NodeKind::Array,
        }
    }

    pub fn operator(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Expression { operator, .. } => Some(operator),
            _ => None,
        }
    }

    /// Expression arguments; empty for every other kind.
    pub fn arguments(&self) -> &[Node] {
        match &self.body {
            NodeBody::Expression { arguments, .. } => arguments,
            _ => &[],
        }
    }

    pub fn field(&self) -> Option<&str> {
        match &self.body {
            NodeBody::Variable { field } => Some(field),
            _ => None,
        }
    }

    pub fn scalar(&self) -> Option<&Scalar> {
        match &self.body {
            NodeBody::Literal { value } => Some(value),
            _ => None,
        }
    }

    /// Direct children: expression arguments or array items.
    pub fn children(&self) -> &[Node] {
        match &self.body {
            NodeBody::Expression { arguments, .. } => arguments,
            NodeBody::Array { items } => items,
            NodeBody::Variable { .. } | NodeBody::Literal { .. } => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.body {
            NodeBody::Expression { arguments, .. } => Some(arguments),
            NodeBody::Array { items } => Some(items),
            NodeBody::Variable { .. } | NodeBody::Literal { .. } => None,
        }
    }

    /// Whether this node carries user intent worth keeping across a
    /// conversion: any variable, a non-empty literal, a non-empty array, or
    /// an expression with an operator.
    pub fn is_meaningful(&self) -> bool {
        match &self.body {
            NodeBody::Variable { .. } => true,
            NodeBody::Literal { value } => !value.is_empty(),
            NodeBody::Array { items } => !items.is_empty(),
            NodeBody::Expression { operator, .. } => !operator.is_empty(),
        }
    }

    /// Pre-order depth-first traversal.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Mutable pre-order traversal.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Node)) {
        visit(self);
        if let Some(children) = self.children_mut() {
            for child in children {
                child.walk_mut(visit);
            }
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(Node::size).sum::<usize>()
    }

    pub fn find(&self, id: &NodeId) -> Option<&Node> {
        if self.id == *id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    pub fn find_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        if self.id == *id {
            return Some(self);
        }
        self.children_mut()?
            .iter_mut()
            .find_map(|c| c.find_mut(id))
    }
}

// ---------------------------------------------------------------------------
// Forest helpers
// ---------------------------------------------------------------------------

/// Locate a node anywhere in a forest of top-level rules.
pub fn find_in_forest<'a>(forest: &'a [Node], id: &NodeId) -> Option<&'a Node> {
    forest.iter().find_map(|root| root.find(id))
}

/// Splice `replacement` in place of the node with `id`, returning the node
/// that was replaced. `None` when no node carries that id.
pub fn replace_in_forest(forest: &mut [Node], id: &NodeId, replacement: Node) -> Option<Node> {
    let slot = forest.iter_mut().find_map(|root| root.find_mut(id))?;
    Some(std::mem::replace(slot, replacement))
}

// ---------------------------------------------------------------------------
// Persisted layout
// ---------------------------------------------------------------------------

/// Node `type` tags accepted on input. `string|number|boolean|date` are
/// legacy literal kinds written by older editor builds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawKind {
    Expression,
    Variable,
    Literal,
    Array,
    String,
    Number,
    Boolean,
    Date,
}

#[derive(Debug, Deserialize)]
struct NodeRaw {
    id: NodeId,
    #[serde(rename = "type")]
    kind: RawKind,
    #[serde(default)]
    operator: Option<String>,
    #[serde(default)]
    arguments: Option<Vec<Node>>,
    #[serde(default)]
    value: Option<Value>,
    #[serde(default)]
    items: Option<Vec<Node>>,
}

impl TryFrom<NodeRaw> for Node {
    type Error = String;

    fn try_from(raw: NodeRaw) -> Result<Self, Self::Error> {
        let body = match raw.kind {
            RawKind::Expression => {
                let operator = raw
                    .operator
                    .ok_or_else(|| format!("expression node {} has no operator", raw.id))?;
                NodeBody::Expression {
                    operator,
                    arguments: raw.arguments.unwrap_or_default(),
                }
            }
            RawKind::Variable => match raw.value {
                Some(Value::String(field)) => NodeBody::Variable { field },
                other => {
                    return Err(format!(
                        "variable node {} must name a field, got {:?}",
                        raw.id, other
                    ));
                }
            },
            RawKind::Literal
            | RawKind::String
            | RawKind::Number
            | RawKind::Boolean
            | RawKind::Date => {
                let value = match raw.value {
                    None => Scalar::Null,
                    Some(v) => Scalar::from_json(&v).ok_or_else(|| {
                        format!("literal node {} holds a non-scalar value", raw.id)
                    })?,
                };
                NodeBody::Literal { value }
            }
            RawKind::Array => NodeBody::Array {
                items: raw.items.unwrap_or_default(),
            },
        };
        Ok(Node { id: raw.id, body })
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("id", &self.id)?;
        map.serialize_entry("type", self.kind().as_str())?;
        match &self.body {
            NodeBody::Expression {
                operator,
                arguments,
            } => {
                map.serialize_entry("operator", operator)?;
                map.serialize_entry("arguments", arguments)?;
            }
            NodeBody::Variable { field } => map.serialize_entry("value", field)?,
            NodeBody::Literal { value } => map.serialize_entry("value", value)?,
            NodeBody::Array { items } => map.serialize_entry("items", items)?,
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample() -> Node {
        Node::expression(
            "and",
            vec![
                Node::expression(
                    "==",
                    vec![Node::variable("person.age"), Node::number(18)],
                ),
                Node::array(vec![Node::literal("a"), Node::literal("")]),
            ],
        )
    }

    #[test]
    fn fresh_ids_are_distinct() {
        let a = NodeId::fresh();
        let b = NodeId::fresh();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn meaningful_classification() {
        assert!(Node::variable("person.email").is_meaningful());
        assert!(Node::number(0).is_meaningful());
        assert!(Node::literal(false).is_meaningful());
        assert!(!Node::literal("").is_meaningful());
        assert!(!Node::literal(Scalar::Null).is_meaningful());
        assert!(!Node::array(vec![]).is_meaningful());
        assert!(Node::array(vec![Node::literal("")]).is_meaningful());
        assert!(Node::expression("!", vec![]).is_meaningful());
        assert!(!Node::expression("", vec![]).is_meaningful());
    }

    #[test]
    fn walk_is_preorder() {
        let root = sample();
        let mut kinds = Vec::new();
        root.walk(&mut |n| kinds.push(n.kind()));
        assert_eq!(
            kinds,
            vec![
                NodeKind::Expression,
                NodeKind::Expression,
                NodeKind::Variable,
                NodeKind::Literal,
                NodeKind::Array,
                NodeKind::Literal,
                NodeKind::Literal,
            ]
        );
        assert_eq!(root.size(), 7);
    }

    #[test]
    fn replace_in_forest_splices_nested_node() {
        let mut forest = vec![sample()];
        let target = forest[0].arguments()[0].arguments()[1].id.clone();
        let old = replace_in_forest(&mut forest, &target, Node::number(21)).unwrap();
        assert_eq!(old.scalar(), Some(&Scalar::int(18)));
        assert_eq!(
            forest[0].arguments()[0].arguments()[1].scalar(),
            Some(&Scalar::int(21))
        );
        assert!(replace_in_forest(&mut forest, &NodeId::from("missing"), Node::number(1)).is_none());
    }

    #[test]
    fn serde_roundtrip_keeps_ids() {
        let root = sample();
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["type"], "expression");
        assert_eq!(json["operator"], "and");
        assert_eq!(json["arguments"][0]["arguments"][0]["value"], "person.age");
        assert_eq!(json["arguments"][1]["type"], "array");
        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, root);
    }

    #[test]
    fn integers_serialize_without_fraction() {
        let json = serde_json::to_string(&Node::number(18).with_id("n1".into())).unwrap();
        assert_eq!(json, r#"{"id":"n1","type":"literal","value":18}"#);
    }

    #[test]
    fn legacy_literal_kinds_are_normalised() {
        let node: Node =
            serde_json::from_value(json!({"id": "d", "type": "date", "value": "2000-01-01"}))
                .unwrap();
        assert_eq!(node.kind(), NodeKind::Literal);
        assert_eq!(node.scalar(), Some(&Scalar::from("2000-01-01")));

        let missing: Node = serde_json::from_value(json!({"id": "n", "type": "literal"})).unwrap();
        assert_eq!(missing.scalar(), Some(&Scalar::Null));
    }

    #[test]
    fn malformed_nodes_are_rejected() {
        let no_op = serde_json::from_value::<Node>(json!({"id": "x", "type": "expression"}));
        assert!(no_op.is_err());
        let bad_literal =
            serde_json::from_value::<Node>(json!({"id": "x", "type": "literal", "value": [1]}));
        assert!(bad_literal.is_err());
        let bad_var =
            serde_json::from_value::<Node>(json!({"id": "x", "type": "variable", "value": 3}));
        assert!(bad_var.is_err());
        let bad_kind = serde_json::from_value::<Node>(json!({"id": "x", "type": "lambda"}));
        assert!(bad_kind.is_err());
    }
}
