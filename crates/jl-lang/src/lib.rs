pub mod ast;
pub mod catalog;
mod checker;
pub mod codec;
pub mod fields;

pub use ast::{Node, NodeBody, NodeId, NodeKind, Scalar, find_in_forest, replace_in_forest};
pub use catalog::{Arity, Category, OperatorCatalog, OperatorDescriptor};
pub use checker::{CheckError, Severity, check_forest, check_node};
pub use codec::{forest_from_json_logic, forest_to_json_logic, from_json_logic, to_json_logic};
pub use fields::{FIELD_NAMES, FieldPath, field_names, is_known_field, parse_field_path};
