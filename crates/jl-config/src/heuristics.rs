use jl_lang::Scalar;
use serde::Deserialize;

/// `[heuristics]` section: how the conversion engine guesses values for
/// fields it knows nothing about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HeuristicsConfig {
    /// A variable whose field contains one of these looks numeric.
    pub numeric_keywords: Vec<String>,
    /// Ordered table of contextual default values; first match wins.
    pub context: Vec<ContextRule>,
}

/// `[[heuristics.context]]` entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContextRule {
    pub keywords: Vec<String>,
    pub value: Scalar,
}

impl ContextRule {
    pub fn new(keywords: &[&str], value: impl Into<Scalar>) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            value: value.into(),
        }
    }

    pub fn matches(&self, field: &str) -> bool {
        self.keywords.iter().any(|k| field.contains(k.as_str()))
    }
}

impl Default for HeuristicsConfig {
    fn default() -> Self {
        Self {
            numeric_keywords: ["age", "count", "amount", "id", "Id"]
                .into_iter()
                .map(String::from)
                .collect(),
            context: vec![
                ContextRule::new(&["age", "Age"], Scalar::int(18)),
                ContextRule::new(&["date", "Date", "birthday"], "2000-01-01"),
                ContextRule::new(&["is", "Is", "has", "Has"], true),
                ContextRule::new(&["id", "Id", "ID"], Scalar::int(1)),
            ],
        }
    }
}

impl HeuristicsConfig {
    pub fn is_numeric_field(&self, field: &str) -> bool {
        self.numeric_keywords
            .iter()
            .any(|k| field.contains(k.as_str()))
    }

    /// Value of the first context rule matching `field`.
    pub fn context_value(&self, field: &str) -> Option<&Scalar> {
        self.context
            .iter()
            .find(|rule| rule.matches(field))
            .map(|rule| &rule.value)
    }
}
