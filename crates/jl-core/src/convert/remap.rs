use jl_lang::{Category, Node, OperatorDescriptor};

use super::Converter;
use super::defaults::{contextual_default, plain_default};
use super::extract::{literals, meaningful_values, top_level_numbers, top_level_strings, variables};

fn cloned(nodes: &[&Node]) -> Vec<Node> {
    nodes.iter().map(|n| (*n).clone()).collect()
}

fn defaults(target: &OperatorDescriptor) -> Vec<Node> {
    (0..target.arity.min)
        .map(|i| plain_default(&target.name, i))
        .collect()
}

fn is_and_or(target: &OperatorDescriptor) -> bool {
    matches!(target.name.as_str(), "and" | "or")
}

impl Converter<'_> {
    /// Map the arguments of a `source` expression onto `target`. The result
    /// may still violate the target arity; the caller normalises it.
    pub(super) fn remap(
        &self,
        args: &[Node],
        source: &OperatorDescriptor,
        target: &OperatorDescriptor,
    ) -> Vec<Node> {
        use Category as C;

        match (source.category, target.category) {
            (s, t) if s == t => args.to_vec(),
            (C::Logic, C::Comparison) => self.logic_to_comparison(args, target),
            (C::Comparison, C::Logic) => comparison_to_logic(args, target),
            (C::Arithmetic, C::Comparison) => self.arithmetic_to_comparison(args, target),
            (C::Comparison, C::Arithmetic) => self.numeric_operands(args, target),
            (_, C::Data) => to_data(args, target),
            (_, C::Control) => to_control(args, target),
            (_, C::String) => to_string(args, target),
            (_, C::Unary) => to_unary(args, target),
            (_, C::Special) => to_special(args, target),
            (C::Unary, _) => self.from_unary(args, target),
            (C::Logic, C::Arithmetic) => self.numeric_operands(args, target),
            (C::Arithmetic, C::Logic) => arithmetic_to_logic(args, target),
            _ => self.keep_meaningful(args, target),
        }
    }

    fn contextual(&self, target: &OperatorDescriptor, index: usize, related: Option<&Node>) -> Node {
        contextual_default(&self.heuristics, &target.name, index, related)
    }

    fn logic_to_comparison(&self, args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
        match meaningful_values(args).as_slice() {
            [first, second, ..] => vec![(*first).clone(), (*second).clone()],
            [only] => vec![(*only).clone(), self.contextual(target, 1, Some(*only))],
            [] => vec![plain_default(&target.name, 0), plain_default(&target.name, 1)],
        }
    }

    fn arithmetic_to_comparison(&self, args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
        if args.len() >= 2 {
            let sum = Node::expression("+", args[..2].to_vec());
            return vec![sum, Node::number(0)];
        }
        match meaningful_values(args).first() {
            Some(first) => vec![(*first).clone(), self.contextual(target, 1, Some(*first))],
            None => vec![plain_default(&target.name, 0), plain_default(&target.name, 1)],
        }
    }

    /// Two numeric literals, else numeric-looking variables, else defaults.
    fn numeric_operands(&self, args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
        let numbers = top_level_numbers(args);
        if numbers.len() >= 2 {
            return cloned(&numbers[..2]);
        }
        let numeric_vars: Vec<&Node> = variables(args)
            .into_iter()
            .filter(|v| v.field().is_some_and(|f| self.heuristics.is_numeric_field(f)))
            .collect();
        match numeric_vars.as_slice() {
            [first, second, ..] => vec![(*first).clone(), (*second).clone()],
            [only] => vec![(*only).clone(), Node::number(1)],
            [] => defaults(target),
        }
    }

    fn from_unary(&self, args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
        let Some(operand) = args.first() else {
            return defaults(target);
        };
        let mut result = vec![operand.clone()];
        match target.category {
            Category::Comparison => result.push(self.contextual(target, 1, Some(operand))),
            Category::Logic => result.push(plain_default(&target.name, 1)),
            Category::Arithmetic => result.push(Node::number(1)),
            _ => {}
        }
        result
    }

    /// Meaningful values up to the target's limit, padded with placeholders
    /// shaped after the previously placed argument.
    fn keep_meaningful(&self, args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
        let mut result: Vec<Node> = meaningful_values(args)
            .into_iter()
            .take(target.arity.max_len())
            .cloned()
            .collect();
        while result.len() < target.arity.min {
            let next = self.contextual(target, result.len(), result.last());
            result.push(next);
        }
        result
    }
}

fn comparison_to_logic(args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
    if args.len() >= 2 && is_and_or(target) {
        let condition = Node::expression("==", args[..2].to_vec());
        return vec![condition, plain_default(&target.name, 1)];
    }
    if args.is_empty() {
        return defaults(target);
    }
    args.to_vec()
}

fn to_data(args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
    let vars = variables(args);
    let Some(first_var) = vars.first() else {
        return defaults(target);
    };
    match target.name.as_str() {
        "var" => vec![(*first_var).clone()],
        "oneof" | "partof" => {
            let mut items: Vec<Node> = literals(args)
                .into_iter()
                .filter_map(|lit| lit.scalar().cloned().map(Node::literal))
                .collect();
            if items.is_empty() {
                items.push(Node::literal(""));
            }
            vec![(*first_var).clone(), Node::array(items)]
        }
        _ => defaults(target),
    }
}

fn to_control(args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
    if target.name != "if" {
        return defaults(target);
    }
    let values = meaningful_values(args);
    let Some(condition) = values.first() else {
        return defaults(target);
    };
    vec![
        (*condition).clone(),
        values.get(1).map_or_else(|| Node::literal("yes"), |n| (*n).clone()),
        values.get(2).map_or_else(|| Node::literal("no"), |n| (*n).clone()),
    ]
}

fn name_pair() -> Vec<Node> {
    vec![
        Node::variable("person.firstName"),
        Node::variable("person.lastName"),
    ]
}

fn to_string(args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
    let strings = top_level_strings(args);
    let operands = if strings.is_empty() {
        name_pair()
    } else {
        cloned(&strings)
    };
    match target.name.as_str() {
        "concat" => operands,
        "concatWs" => std::iter::once(Node::literal(" ")).chain(operands).collect(),
        _ => defaults(target),
    }
}

fn to_unary(args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
    if let Some(first) = meaningful_values(args).first() {
        return vec![(*first).clone()];
    }
    match target.name.as_str() {
        "!" | "!!" | "isnull" | "isnotnull" => vec![Node::variable("person.isActive")],
        "t" => vec![Node::variable("person.firstName")],
        _ => vec![plain_default(&target.name, 0)],
    }
}

fn to_special(args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
    meaningful_values(args)
        .into_iter()
        .take(target.arity.max_len())
        .cloned()
        .collect()
}

fn arithmetic_to_logic(args: &[Node], target: &OperatorDescriptor) -> Vec<Node> {
    if args.len() >= 2 && is_and_or(target) {
        return args[..2]
            .iter()
            .map(|arg| Node::expression(">", vec![arg.clone(), Node::number(0)]))
            .collect();
    }
    let mut result: Vec<Node> = meaningful_values(args)
        .into_iter()
        .take(target.arity.max_len())
        .cloned()
        .collect();
    while result.len() < target.arity.min {
        result.push(Node::literal(true));
    }
    result
}
