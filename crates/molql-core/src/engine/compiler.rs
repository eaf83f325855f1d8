//! # Query Compiler
//!
//! Turns an [`Expression`] into a tree of [`Evaluator`] nodes. Symbols are
//! resolved against a [`SymbolTable`] and their arguments are bound to the
//! symbol's parameters. Calls to constant symbols whose arguments are all
//! constant are evaluated once, here, and replaced by their value.

use super::config::DEFAULT_MAX_NESTING_DEPTH;
use super::context::QueryContext;
use super::error::{CompileError, QueryError};
use super::expression::{Arguments, Expression, Literal};
use super::selection::StructureSelection;
use super::symbols::{Args, ConstantFn, DynamicFn, Params, PropertyFn, Symbol, SymbolImpl, SymbolTable};
use super::value::Value;
use std::fmt;
use tracing::{debug, instrument};

/// A compiled expression node.
pub trait Evaluator: fmt::Debug {
    fn evaluate(&self, ctx: &mut QueryContext) -> Result<Value, QueryError>;

    /// The node's value when it does not depend on the context.
    fn constant_value(&self) -> Option<&Value> {
        None
    }
}

#[derive(Debug)]
pub struct ConstantNode(pub Value);

impl Evaluator for ConstantNode {
    fn evaluate(&self, _ctx: &mut QueryContext) -> Result<Value, QueryError> {
        Ok(self.0.clone())
    }

    fn constant_value(&self) -> Option<&Value> {
        Some(&self.0)
    }
}

/// A constant symbol applied to arguments of which at least one depends on
/// the context. Arguments are evaluated eagerly on every call.
pub struct EagerNode {
    imp: ConstantFn,
    args: Args<Box<dyn Evaluator>>,
}

impl fmt::Debug for EagerNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EagerNode")
            .field("symbol", &self.args.symbol())
            .field("args", &self.args)
            .finish()
    }
}

impl Evaluator for EagerNode {
    fn evaluate(&self, ctx: &mut QueryContext) -> Result<Value, QueryError> {
        let mut values = Vec::with_capacity(self.args.len());
        for slot in self.args.slots() {
            values.push(match slot {
                Some(arg) => Some(arg.evaluate(ctx)?),
                None => None,
            });
        }
        (self.imp)(&Args::new(self.args.symbol(), values))
    }
}

/// A dynamic symbol; the implementation drives its own arguments.
pub struct DynamicNode {
    imp: DynamicFn,
    args: Args<Box<dyn Evaluator>>,
}

impl fmt::Debug for DynamicNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicNode")
            .field("symbol", &self.args.symbol())
            .field("args", &self.args)
            .finish()
    }
}

impl Evaluator for DynamicNode {
    fn evaluate(&self, ctx: &mut QueryContext) -> Result<Value, QueryError> {
        (self.imp)(ctx, &self.args)
    }
}

/// Reads a property of an explicit location, or of the current element
/// when no location argument was given.
pub struct PropertyNode {
    symbol: &'static str,
    read: PropertyFn,
    location: Option<Box<dyn Evaluator>>,
}

impl PropertyNode {
    pub fn new(symbol: &'static str, read: PropertyFn, location: Option<Box<dyn Evaluator>>) -> Self {
        Self {
            symbol,
            read,
            location,
        }
    }
}

impl fmt::Debug for PropertyNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyNode")
            .field("symbol", &self.symbol)
            .field("location", &self.location)
            .finish()
    }
}

impl Evaluator for PropertyNode {
    fn evaluate(&self, ctx: &mut QueryContext) -> Result<Value, QueryError> {
        match &self.location {
            Some(location) => {
                let value = location.evaluate(ctx)?;
                Ok((self.read)(value.as_location(self.symbol)?)?)
            }
            None => Ok((self.read)(ctx.element(self.symbol)?)?),
        }
    }
}

/// A compiled, reusable query.
#[derive(Debug)]
pub struct CompiledQuery {
    root: Box<dyn Evaluator>,
}

impl CompiledQuery {
    pub fn evaluate(&self, ctx: &mut QueryContext) -> Result<Value, QueryError> {
        self.root.evaluate(ctx)
    }

    /// Evaluates the query and requires a selection as its result.
    #[instrument(skip_all, name = "run_query")]
    pub fn run(&self, ctx: &mut QueryContext) -> Result<StructureSelection, QueryError> {
        let selection = self.evaluate(ctx)?.into_selection("query")?;
        debug!(structures = selection.len(), "Query produced selection");
        Ok(selection)
    }

    pub fn is_constant(&self) -> bool {
        self.root.constant_value().is_some()
    }
}

/// Compiles against the standard symbol table and default nesting limit.
pub fn compile(expression: &Expression) -> Result<CompiledQuery, CompileError> {
    Compiler::new(SymbolTable::standard()).compile(expression)
}

pub struct Compiler<'a> {
    table: &'a SymbolTable,
    max_depth: usize,
}

type Slots = Vec<Option<Box<dyn Evaluator>>>;

impl<'a> Compiler<'a> {
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            max_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[instrument(skip_all, name = "compile_query")]
    pub fn compile(&self, expression: &Expression) -> Result<CompiledQuery, CompileError> {
        let root = self.node(expression, "root", 0)?;
        debug!(constant = root.constant_value().is_some(), "Compiled query");
        Ok(CompiledQuery { root })
    }

    fn node(
        &self,
        expression: &Expression,
        path: &str,
        depth: usize,
    ) -> Result<Box<dyn Evaluator>, CompileError> {
        match expression {
            Expression::Literal(literal) => Ok(Box::new(ConstantNode(literal_value(literal)))),
            Expression::Symbol(name) => self.application(name, &Arguments::None, path, depth),
            Expression::Apply { head, args } => match head.as_ref() {
                Expression::Symbol(name) => self.application(name, args, path, depth + 1),
                _ => Err(CompileError::InvalidHead {
                    path: path.to_string(),
                }),
            },
        }
    }

    fn application(
        &self,
        name: &str,
        args: &Arguments,
        path: &str,
        depth: usize,
    ) -> Result<Box<dyn Evaluator>, CompileError> {
        if depth > self.max_depth {
            return Err(CompileError::NestingTooDeep {
                max: self.max_depth,
                path: path.to_string(),
            });
        }
        let symbol = self
            .table
            .get(name)
            .ok_or_else(|| CompileError::UnresolvedSymbol {
                name: name.to_string(),
                path: path.to_string(),
            })?;
        let slots = self.bind(symbol, args, path, depth)?;
        let args = Args::new(symbol.name, slots);

        match symbol.imp {
            SymbolImpl::Constant(imp) => {
                if args.iter().all(|a| a.constant_value().is_some()) {
                    let values = args
                        .slots()
                        .iter()
                        .map(|slot| slot.as_ref().and_then(|a| a.constant_value().cloned()))
                        .collect();
                    let value = imp(&Args::new(symbol.name, values)).map_err(|e| {
                        CompileError::ConstantEvaluation {
                            path: path.to_string(),
                            source: Box::new(e),
                        }
                    })?;
                    Ok(Box::new(ConstantNode(value)))
                } else {
                    Ok(Box::new(EagerNode { imp, args }))
                }
            }
            SymbolImpl::Dynamic(imp) => Ok(Box::new(DynamicNode { imp, args })),
            SymbolImpl::Property(read) => {
                let mut slots = args.into_slots();
                let location = if slots.is_empty() { None } else { slots.swap_remove(0) };
                Ok(Box::new(PropertyNode::new(symbol.name, read, location)))
            }
        }
    }

    fn bind(
        &self,
        symbol: &Symbol,
        args: &Arguments,
        path: &str,
        depth: usize,
    ) -> Result<Slots, CompileError> {
        match symbol.params {
            Params::Fixed(params) => {
                let mut slots: Slots = params.iter().map(|_| None).collect();
                match args {
                    Arguments::None => {}
                    Arguments::Positional(list) => {
                        if list.len() > params.len() {
                            return Err(CompileError::Arity {
                                symbol: symbol.name.to_string(),
                                expected: format!("at most {}", params.len()),
                                found: list.len(),
                                path: path.to_string(),
                            });
                        }
                        for (i, arg) in list.iter().enumerate() {
                            slots[i] = Some(self.node(arg, &format!("{path}/{i}"), depth)?);
                        }
                    }
                    Arguments::Named(map) => {
                        for (name, arg) in map {
                            let index = params
                                .iter()
                                .position(|p| p.name == name)
                                .or_else(|| name.parse::<usize>().ok().filter(|&i| i < params.len()))
                                .filter(|&i| slots[i].is_none())
                                .ok_or_else(|| CompileError::UnexpectedArgument {
                                    symbol: symbol.name.to_string(),
                                    argument: name.clone(),
                                    path: path.to_string(),
                                })?;
                            slots[index] = Some(self.node(arg, &format!("{path}/{name}"), depth)?);
                        }
                    }
                }
                for (param, slot) in params.iter().zip(&slots) {
                    if param.required && slot.is_none() {
                        return Err(CompileError::MissingArgument {
                            symbol: symbol.name.to_string(),
                            argument: param.name.to_string(),
                            path: path.to_string(),
                        });
                    }
                }
                Ok(slots)
            }
            Params::Variadic { min, max } => {
                let ordered: Vec<(String, &Expression)> = match args {
                    Arguments::None => Vec::new(),
                    Arguments::Positional(list) => list
                        .iter()
                        .enumerate()
                        .map(|(i, arg)| (i.to_string(), arg))
                        .collect(),
                    Arguments::Named(map) => {
                        let mut entries: Vec<(String, &Expression)> =
                            map.iter().map(|(k, v)| (k.clone(), v)).collect();
                        entries.sort_by_key(|(name, _)| match name.parse::<usize>() {
                            Ok(i) => (0, i, String::new()),
                            Err(_) => (1, 0, name.clone()),
                        });
                        entries
                    }
                };
                let found = ordered.len();
                if found < min || max.is_some_and(|max| found > max) {
                    let expected = match max {
                        Some(max) if max == min => format!("exactly {min}"),
                        Some(max) => format!("between {min} and {max}"),
                        None => format!("at least {min}"),
                    };
                    return Err(CompileError::Arity {
                        symbol: symbol.name.to_string(),
                        expected,
                        found,
                        path: path.to_string(),
                    });
                }
                ordered
                    .into_iter()
                    .map(|(name, arg)| self.node(arg, &format!("{path}/{name}"), depth).map(Some))
                    .collect()
            }
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => Value::Number(*n),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::element::location::Location;
    use crate::core::structure::testing::create_standard_test_structure;
    use crate::engine::config::QueryConfig;
    use crate::engine::expression::builder::*;
    use crate::engine::parser::parse;
    use crate::engine::symbols::names;

    fn context() -> QueryContext {
        QueryContext::new(create_standard_test_structure(), QueryConfig::default())
    }

    fn evaluate(source: &str) -> Result<Value, QueryError> {
        let query = compile(&parse(source).unwrap()).unwrap();
        query.evaluate(&mut context())
    }

    mod folding {
        use super::*;

        #[test]
        fn constant_calls_are_folded() {
            let query = compile(&parse("(core.math.add 1 (core.math.mult 2 3))").unwrap()).unwrap();
            assert!(query.is_constant());
            assert_eq!(query.evaluate(&mut context()), Ok(Value::Number(7.0)));
        }

        #[test]
        fn property_calls_stay_dynamic() {
            let query = compile(&parse("(= (label_comp_id) ALA)").unwrap()).unwrap();
            assert!(!query.is_constant());
        }

        #[test]
        fn constant_failures_are_compile_errors() {
            let error = compile(&parse("(core.list.get-at (core.type.list 1) 5)").unwrap()).unwrap_err();
            assert!(matches!(
                error,
                CompileError::ConstantEvaluation { ref path, .. } if path == "root"
            ));
        }

        #[test]
        fn link_flags_fold_to_known_bits() {
            assert_eq!(
                evaluate("(link-flags covalent bogus)"),
                Ok(Value::Flags(crate::core::structure::LinkFlags::COVALENT.bits()))
            );
        }
    }

    mod evaluation {
        use super::*;

        #[test]
        fn logic_short_circuits() {
            // The second operand would fail without a current element.
            assert_eq!(evaluate("(and false (= (label_comp_id) ALA))"), Ok(Value::Bool(false)));
            assert_eq!(evaluate("(or true (= (label_comp_id) ALA))"), Ok(Value::Bool(true)));
            assert_eq!(
                evaluate("(and true (= (label_comp_id) ALA))"),
                Err(QueryError::NoCurrentElement(names::PROP_LABEL_COMP_ID))
            );
        }

        #[test]
        fn named_variadic_arguments_follow_numeric_order() {
            assert_eq!(evaluate("(core.math.sub :1 3 :0 10 :2 2)"), Ok(Value::Number(5.0)));
        }

        #[test]
        fn properties_read_the_current_element() {
            let query = compile(&parse("(label_atom_id)").unwrap()).unwrap();
            let mut ctx = context();
            let unit = ctx.input().units()[0].clone();
            ctx.set_element(&unit, 1);
            assert_eq!(query.evaluate(&mut ctx), Ok(Value::Str("CA".into())));
        }

        #[test]
        fn properties_accept_an_explicit_location() {
            let structure = create_standard_test_structure();
            let unit = structure.units()[0].clone();
            let node = PropertyNode::new(
                names::PROP_LABEL_COMP_ID,
                |l| Ok(Value::Str(l.label_comp_id()?.to_string())),
                Some(Box::new(ConstantNode(Value::Location(Location::new(unit, 5))))),
            );
            assert_eq!(node.evaluate(&mut context()), Ok(Value::Str("GLY".into())));
        }

        #[test]
        fn regex_match_is_unanchored() {
            assert_eq!(evaluate("(core.str.match \"^C[AB]\" \"CB\")"), Ok(Value::Bool(true)));
            assert_eq!(evaluate("(core.str.match \"G\" \"ALA\")"), Ok(Value::Bool(false)));
            assert!(matches!(
                evaluate("(core.str.match \"(\" \"x\")"),
                Err(QueryError::InvalidRegex { .. })
            ));
        }

        #[test]
        fn conditional_evaluates_one_branch() {
            assert_eq!(evaluate("(if (> 2 1) yes no)"), Ok(Value::Str("yes".into())));
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn unresolved_symbols_report_their_path() {
            let error = compile(&parse("(and true (core.logic.nand 1 2))").unwrap()).unwrap_err();
            assert_eq!(
                error,
                CompileError::UnresolvedSymbol {
                    name: "core.logic.nand".into(),
                    path: "root/1".into(),
                }
            );
        }

        #[test]
        fn missing_required_named_argument() {
            let error = compile(&parse("(include-surroundings :radius 5)").unwrap()).unwrap_err();
            assert_eq!(
                error,
                CompileError::MissingArgument {
                    symbol: names::MODIFIER_INCLUDE_SURROUNDINGS.into(),
                    argument: "0".into(),
                    path: "root".into(),
                }
            );
        }

        #[test]
        fn unknown_named_argument() {
            let error =
                compile(&parse("(atom-groups :atom-tset true)").unwrap()).unwrap_err();
            assert!(matches!(
                error,
                CompileError::UnexpectedArgument { ref argument, .. } if argument == "atom-tset"
            ));
        }

        #[test]
        fn arity_is_checked() {
            let error = compile(&parse("(core.rel.eq 1 2 3)").unwrap()).unwrap_err();
            assert!(matches!(error, CompileError::Arity { found: 3, .. }));
            let error = compile(&parse("(core.logic.and)").unwrap()).unwrap_err();
            assert!(matches!(error, CompileError::Arity { found: 0, .. }));
        }

        #[test]
        fn non_symbol_heads_are_rejected() {
            let error = compile(&parse("(1 2)").unwrap()).unwrap_err();
            assert_eq!(error, CompileError::InvalidHead { path: "root".into() });
        }

        #[test]
        fn nesting_limit_applies_to_built_expressions() {
            let mut expression = boolean(true);
            for _ in 0..10 {
                expression = apply(names::LOGIC_NOT, vec![expression]);
            }
            let table = SymbolTable::standard();
            assert!(Compiler::new(table).with_max_depth(10).compile(&expression).is_ok());
            assert!(matches!(
                Compiler::new(table).with_max_depth(9).compile(&expression),
                Err(CompileError::NestingTooDeep { max: 9, .. })
            ));
        }

        #[test]
        fn bare_symbol_leaves_share_the_parser_depth() {
            let source = "(atom-groups :residue-test (= residue-key 1))";
            let expression = crate::engine::parser::parse_with_max_depth(source, 2).unwrap();
            let table = SymbolTable::standard();
            assert!(Compiler::new(table).with_max_depth(2).compile(&expression).is_ok());
            assert!(matches!(
                Compiler::new(table).with_max_depth(1).compile(&expression),
                Err(CompileError::NestingTooDeep { max: 1, .. })
            ));
        }

        #[test]
        fn nested_argument_paths_use_parameter_names() {
            let error = compile(
                &parse("(atom-groups :residue-test (= (label_comp_id) (core.nope)))").unwrap(),
            )
            .unwrap_err();
            assert_eq!(
                error,
                CompileError::UnresolvedSymbol {
                    name: "core.nope".into(),
                    path: "root/residue-test/1".into(),
                }
            );
        }
    }
}
