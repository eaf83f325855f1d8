use super::read_query_text;
use crate::cli::CheckArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use molql::engine::compiler::Compiler;
use molql::engine::error::EngineError;
use molql::engine::expression::Expression;
use molql::engine::parser::parse_with_max_depth;
use molql::engine::symbols::SymbolTable;
use tracing::info;

/// Parses and compiles the query, returning its canonical form and whether
/// it folded to a constant.
pub fn check(source: &str, max_depth: usize) -> std::result::Result<(Expression, bool), EngineError> {
    let expression = parse_with_max_depth(source, max_depth)?;
    let compiled = Compiler::new(SymbolTable::standard())
        .with_max_depth(max_depth)
        .compile(&expression)?;
    Ok((expression, compiled.is_constant()))
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = PartialConfig::load(&args.options)?;
    let source = read_query_text(&args.query)?;

    let (expression, constant) = check(&source, config.max_nesting_depth)?;
    info!(depth = expression.depth(), "Query compiled.");
    println!("{}", expression);
    if constant {
        println!("(constant expression)");
    }
    Ok(())
}
