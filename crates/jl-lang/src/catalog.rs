use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Semantic family of an operator. Drives conversion compatibility and
/// default-argument synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Unary,
    Logic,
    Comparison,
    Arithmetic,
    Data,
    Control,
    String,
    Special,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Unary => "unary",
            Category::Logic => "logic",
            Category::Comparison => "comparison",
            Category::Arithmetic => "arithmetic",
            Category::Data => "data",
            Category::Control => "control",
            Category::String => "string",
            Category::Special => "special",
        }
    }

    /// Whether an operator of this category may be converted into one of
    /// `target`. The relation is directed: `string → data` holds, but
    /// `data → string` is a separate entry.
    pub fn converts_to(self, target: Category) -> bool {
        use Category::*;
        match (self, target) {
            _ if self == target => true,
            (Unary, _) => true,
            (Special, _) | (_, Special) => true,
            (Logic, Comparison | Control | Unary) => true,
            (Comparison, Logic | Arithmetic | Unary) => true,
            (Arithmetic, Comparison | Unary) => true,
            (Data, Comparison | String | Unary) => true,
            (String, Data | Comparison) => true,
            (Control, Logic | Comparison) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Arity
// ---------------------------------------------------------------------------

/// Argument count bounds. `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    pub const fn range(min: usize, max: usize) -> Self {
        Self {
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    pub fn allows(&self, len: usize) -> bool {
        len >= self.min && self.max.is_none_or(|max| len <= max)
    }

    /// Upper bound usable with `truncate`/`take`.
    pub fn max_len(&self) -> usize {
        self.max.unwrap_or(usize::MAX)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", self.min),
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..", self.min),
        }
    }
}

// ---------------------------------------------------------------------------
// OperatorDescriptor
// ---------------------------------------------------------------------------

/// Immutable catalog entry for one JsonLogic operator.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorDescriptor {
    pub name: String,
    pub label: String,
    pub arity: Arity,
    pub category: Category,
    pub description: String,
    pub argument_labels: Vec<String>,
    pub ui_hints: Vec<String>,
}

impl OperatorDescriptor {
    pub fn new(name: &str, label: &str, arity: Arity, category: Category, description: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            arity,
            category,
            description: description.to_string(),
            argument_labels: Vec::new(),
            ui_hints: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.argument_labels = labels.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_hints(mut self, hints: &[&str]) -> Self {
        self.ui_hints = hints.iter().map(|s| s.to_string()).collect();
        self
    }
}

// ---------------------------------------------------------------------------
// OperatorCatalog
// ---------------------------------------------------------------------------

/// Ordered operator registry with name lookup. Iteration follows insertion
/// order.
#[derive(Debug, Clone)]
pub struct OperatorCatalog {
    ops: Vec<OperatorDescriptor>,
    index: HashMap<String, usize>,
}

static STANDARD: LazyLock<OperatorCatalog> = LazyLock::new(|| OperatorCatalog::new(standard_operators()));

impl OperatorCatalog {
    /// Build a catalog. A later entry with a duplicate name shadows the
    /// earlier one for lookups.
    pub fn new(ops: Vec<OperatorDescriptor>) -> Self {
        let index = ops
            .iter()
            .enumerate()
            .map(|(i, op)| (op.name.clone(), i))
            .collect();
        Self { ops, index }
    }

    /// The editor's built-in operator table.
    pub fn standard() -> &'static OperatorCatalog {
        &STANDARD
    }

    pub fn lookup(&self, name: &str) -> Option<&OperatorDescriptor> {
        self.index.get(name).map(|&i| &self.ops[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OperatorDescriptor> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

fn standard_operators() -> Vec<OperatorDescriptor> {
    use Category::*;

    const TERM: &[&str] = &["Term"];
    const CARD: &[&str] = &["card"];
    const LEFT_RIGHT: &[&str] = &["Left Value", "Right Value"];

    let binary = |name: &str, label: &str, description: &str| {
        OperatorDescriptor::new(name, label, Arity::exactly(2), Comparison, description)
            .with_labels(LEFT_RIGHT)
            .with_hints(CARD)
    };
    let arith = |name: &str, label: &str, arity: Arity, description: &str| {
        OperatorDescriptor::new(name, label, arity, Arithmetic, description)
            .with_labels(&["Operand A", "Operand B"])
            .with_hints(CARD)
    };

    vec![
        // unary
        OperatorDescriptor::new("!", "NOT", Arity::exactly(1), Unary, "Negates the result of the sub-expression")
            .with_labels(TERM)
            .with_hints(CARD),
        OperatorDescriptor::new("!!", "To Boolean", Arity::exactly(1), Unary, "Converts the result to a boolean")
            .with_labels(TERM)
            .with_hints(CARD),
        OperatorDescriptor::new("true", "Always True", Arity::exactly(0), Unary, "Always returns true")
            .with_hints(CARD),
        OperatorDescriptor::new("false", "Always False", Arity::exactly(0), Unary, "Always returns false")
            .with_hints(CARD),
        OperatorDescriptor::new(
            "isnull",
            "Is Null",
            Arity::exactly(1),
            Unary,
            "Returns 1 if the term is null or empty string, 0 otherwise",
        )
        .with_labels(TERM)
        .with_hints(CARD),
        OperatorDescriptor::new(
            "isnotnull",
            "Is Not Null",
            Arity::exactly(1),
            Unary,
            "Returns 1 if the term is not null and not empty string, 0 otherwise",
        )
        .with_labels(TERM)
        .with_hints(CARD),
        OperatorDescriptor::new("t", "Text Literal", Arity::exactly(1), Unary, "Converts the result to a string literal")
            .with_labels(&["Text"])
            .with_hints(CARD),
        // logic
        OperatorDescriptor::new("and", "AND", Arity::at_least(2), Logic, "Logical AND - all conditions must be true")
            .with_labels(&["Condition A", "Condition B"])
            .with_hints(&["vertical", "card-list"]),
        OperatorDescriptor::new(
            "or",
            "OR",
            Arity::at_least(2),
            Logic,
            "Logical OR - at least one condition must be true",
        )
        .with_labels(&["Condition A", "Condition B"])
        .with_hints(&["horizontal", "card-list"]),
        // comparison
        binary("==", "Equals", "Values are equal"),
        binary("!==", "Not Equals", "Values are not equal"),
        binary("<", "Less Than", "Left value is less than right value"),
        binary("<=", "Less or Equal", "Left value is less than or equal to right value"),
        binary(">", "Greater Than", "Left value is greater than right value"),
        binary(">=", "Greater or Equal", "Left value is greater than or equal to right value"),
        OperatorDescriptor::new("between", "Between", Arity::exactly(3), Comparison, "Value is between two limits (inclusive)")
            .with_labels(&["Value", "Lower Limit", "Upper Limit"])
            .with_hints(CARD),
        // arithmetic
        arith("+", "Add", Arity::at_least(2), "Sum of all operands"),
        arith("-", "Subtract", Arity::exactly(2), "Left operand minus right operand"),
        arith("*", "Multiply", Arity::at_least(2), "Product of all operands"),
        arith("/", "Divide", Arity::exactly(2), "Left operand divided by right operand"),
        arith("%", "Modulo", Arity::exactly(2), "Remainder of the division"),
        // data
        OperatorDescriptor::new("var", "Variable", Arity::exactly(1), Data, "Access a database field")
            .with_labels(&["Field Name"])
            .with_hints(CARD),
        OperatorDescriptor::new("oneof", "One Of", Arity::exactly(2), Data, "Check if value is one of the values in a list")
            .with_labels(&["Value", "List of Values"])
            .with_hints(&["card-in-list-of-literals"]),
        OperatorDescriptor::new("oneofs", "One Of (Subquery)", Arity::exactly(2), Data, "Check if value is in the result of a query")
            .with_labels(&["Value", "Query"])
            .with_hints(&["card-in-subquery"]),
        OperatorDescriptor::new("partof", "Part Of String", Arity::exactly(2), Data, "Check if needle is part of haystack string")
            .with_labels(&["Needle", "Haystack"])
            .with_hints(&["card-in-list-of-literals"]),
        // string
        OperatorDescriptor::new("concat", "Concatenate", Arity::at_least(2), String, "Concatenates strings")
            .with_labels(&["String A", "String B"])
            .with_hints(CARD),
        OperatorDescriptor::new(
            "concatWs",
            "Concatenate with Separator",
            Arity::at_least(3),
            String,
            "Concatenates strings with separator",
        )
        .with_labels(&["Separator", "String A", "String B"])
        .with_hints(CARD),
        OperatorDescriptor::new("coalesce", "Coalesce", Arity::at_least(2), String, "Returns the first non-null value")
            .with_labels(&["Value A", "Value B"])
            .with_hints(CARD),
        OperatorDescriptor::new("substr", "Substring", Arity::range(2, 3), String, "Extracts part of a string")
            .with_labels(&["String", "Start", "Length"])
            .with_hints(CARD),
        OperatorDescriptor::new("strlen", "String Length", Arity::exactly(1), String, "Length of a string")
            .with_labels(&["String"])
            .with_hints(CARD),
        // control
        OperatorDescriptor::new(
            "if",
            "If-Then-Else",
            Arity::exactly(3),
            Control,
            "Returns second value if condition is true, otherwise third value",
        )
        .with_labels(&["Condition", "Then Value", "Else Value"])
        .with_hints(CARD),
        OperatorDescriptor::new(
            "case",
            "Case When",
            Arity::at_least(1),
            Control,
            "Case when cascade - returns value of first true condition",
        )
        .with_labels(&["Case"])
        .with_hints(CARD),
        // special
        OperatorDescriptor::new("dterm", "Described Term", Arity::exactly(2), Special, "A term with description and UI hints")
            .with_labels(&["Description", "Term"])
            .with_hints(CARD),
        OperatorDescriptor::new(
            "invitation-status",
            "Invitation Status",
            Arity::exactly(1),
            Special,
            "Investigate ChurchTools invitation status",
        )
        .with_labels(&["Expected Status"])
        .with_hints(&["card-in-subquery"]),
    ]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        let catalog = OperatorCatalog::standard();
        let eq = catalog.lookup("==").unwrap();
        assert_eq!(eq.category, Category::Comparison);
        assert_eq!(eq.arity, Arity::exactly(2));
        assert_eq!(eq.argument_labels, vec!["Left Value", "Right Value"]);
        assert!(catalog.lookup("nonexistent-operator").is_none());
        assert!(catalog.contains("invitation-status"));
    }

    #[test]
    fn standard_names_are_unique() {
        let catalog = OperatorCatalog::standard();
        let mut names: Vec<&str> = catalog.iter().map(|op| op.name.as_str()).collect();
        let total = names.len();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(catalog.len(), total);
    }

    #[test]
    fn iteration_follows_table_order() {
        let first: Vec<&str> = OperatorCatalog::standard()
            .iter()
            .take(3)
            .map(|op| op.name.as_str())
            .collect();
        assert_eq!(first, vec!["!", "!!", "true"]);
    }

    #[test]
    fn arity_bounds() {
        assert!(Arity::at_least(2).allows(50));
        assert!(!Arity::at_least(2).allows(1));
        assert!(Arity::range(2, 3).allows(3));
        assert!(!Arity::exactly(0).allows(1));
        assert_eq!(Arity::at_least(2).max_len(), usize::MAX);
        assert_eq!(Arity::range(2, 3).to_string(), "2..3");
        assert_eq!(Arity::at_least(1).to_string(), "1..");
    }

    #[test]
    fn category_relation_is_directed() {
        use Category::*;
        assert!(String.converts_to(Data));
        assert!(Data.converts_to(String));
        assert!(Logic.converts_to(Control));
        assert!(!Control.converts_to(Unary));
        assert!(!Arithmetic.converts_to(Logic));
        assert!(Unary.converts_to(Arithmetic));
        assert!(Arithmetic.converts_to(Special));
        assert!(Special.converts_to(Data));
        assert!(Data.converts_to(Data));
    }
}
