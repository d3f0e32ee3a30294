//! JsonLogic wire format.
//!
//! The editor tree maps onto JsonLogic as follows:
//!
//! ```text
//! Expression  { op, [a, b] }   <->  {"op": [a, b]}
//! Variable    person.age       <->  {"var": "person.age"}
//! Literal     18               <->  18
//! Array       [x, y]           <->  [x, y]
//! ```
//!
//! Decoding assigns fresh ids to every node.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

use crate::ast::{Node, NodeBody, Scalar};

const VAR: &str = "var";

/// Encode one node as JsonLogic.
pub fn to_json_logic(node: &Node) -> Value {
    match &node.body {
        NodeBody::Expression {
            operator,
            arguments,
        } => {
            let args = arguments.iter().map(to_json_logic).collect();
            let mut map = Map::with_capacity(1);
            map.insert(operator.clone(), Value::Array(args));
            Value::Object(map)
        }
        NodeBody::Variable { field } => {
            let mut map = Map::with_capacity(1);
            map.insert(VAR.to_string(), Value::String(field.clone()));
            Value::Object(map)
        }
        NodeBody::Literal { value } => value.to_json(),
        NodeBody::Array { items } => Value::Array(items.iter().map(to_json_logic).collect()),
    }
}

/// Encode a forest of top-level rules as a JSON array.
pub fn forest_to_json_logic(forest: &[Node]) -> Value {
    Value::Array(forest.iter().map(to_json_logic).collect())
}

/// Decode one JsonLogic value into an editor node.
pub fn from_json_logic(value: &Value) -> Result<Node> {
    match value {
        Value::Object(map) => decode_operation(map),
        Value::Array(items) => {
            let items = items.iter().map(from_json_logic).collect::<Result<Vec<_>>>()?;
            Ok(Node::array(items))
        }
        scalar => match Scalar::from_json(scalar) {
            Some(s) => Ok(Node::literal(s)),
            None => bail!("unsupported JsonLogic value: {scalar}"),
        },
    }
}

/// Decode a JSON array of top-level rules.
pub fn forest_from_json_logic(value: &Value) -> Result<Vec<Node>> {
    let Value::Array(rules) = value else {
        bail!("expected a JSON array of rules, got {value}");
    };
    rules
        .iter()
        .enumerate()
        .map(|(i, rule)| from_json_logic(rule).map_err(|e| anyhow::anyhow!("rule[{i}]: {e}")))
        .collect()
}

fn decode_operation(map: &Map<String, Value>) -> Result<Node> {
    let mut entries = map.iter();
    let (operator, raw_args) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => bail!("empty object is not a JsonLogic operation"),
        (Some(_), Some(_)) => bail!(
            "JsonLogic operation must have exactly one key, got {}",
            map.keys().map(String::as_str).collect::<Vec<_>>().join(", ")
        ),
    };

    if operator == VAR
        && let Some(field) = var_field(raw_args)
    {
        return Ok(Node::variable(field));
    }

    // `{"!": x}` is shorthand for `{"!": [x]}`.
    let arguments = match raw_args {
        Value::Array(args) => args
            .iter()
            .map(from_json_logic)
            .collect::<Result<Vec<_>>>()?,
        single => vec![from_json_logic(single)?],
    };
    Ok(Node::expression(operator.as_str(), arguments))
}

/// `{"var": "a.b"}` and `{"var": ["a.b"]}` both reference a field.
fn var_field(raw_args: &Value) -> Option<&str> {
    match raw_args {
        Value::String(field) => Some(field),
        Value::Array(args) => match args.as_slice() {
            [Value::String(field)] => Some(field),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
