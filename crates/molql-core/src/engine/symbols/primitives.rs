//! Logic, relational, arithmetic, string, set, flag and type symbols.

use super::names;
use super::{required, Args, Param, Params, Symbol};
use crate::core::structure::LinkFlags;
use crate::engine::compiler::Evaluator;
use crate::engine::context::QueryContext;
use crate::engine::error::QueryError;
use crate::engine::value::{SetKey, Value};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use tracing::debug;

const UNARY: &[Param] = &[required("0")];
const BINARY: &[Param] = &[required("0"), required("1")];
const IN_RANGE: &[Param] = &[required("0"), required("min"), required("max")];
const IF: &[Param] = &[required("0"), required("then"), required("else")];
const GET_AT: &[Param] = &[required("0"), required("index")];
const MATCH: &[Param] = &[required("0"), required("1")];

const ANY: Params = Params::Variadic { min: 0, max: None };
const AT_LEAST_ONE: Params = Params::Variadic { min: 1, max: None };

static LINK_FLAG_NAMES: phf::Map<&'static str, LinkFlags> = phf::phf_map! {
    "covalent" => LinkFlags::COVALENT,
    "metallic" => LinkFlags::METALLIC_COORDINATION,
    "ion" => LinkFlags::METALLIC_COORDINATION,
    "hydrogen" => LinkFlags::HYDROGEN_BOND,
    "disulfide" => LinkFlags::DISULFIDE,
    "aromatic" => LinkFlags::AROMATIC,
    "computed" => LinkFlags::COMPUTED,
};

/// Flag bit for a link type keyword. Unknown keywords map to no bits.
pub fn link_flag(name: &str) -> LinkFlags {
    LINK_FLAG_NAMES
        .get(name.trim().to_ascii_lowercase().as_str())
        .copied()
        .unwrap_or(LinkFlags::NONE)
}

pub(super) fn symbols() -> Vec<Symbol> {
    let mut symbols = vec![
        Symbol::dynamic(names::LOGIC_AND, AT_LEAST_ONE, logic_and),
        Symbol::dynamic(names::LOGIC_OR, AT_LEAST_ONE, logic_or),
        Symbol::constant(names::LOGIC_NOT, Params::Fixed(UNARY), logic_not),
        Symbol::dynamic(names::CTRL_IF, Params::Fixed(IF), ctrl_if),
        Symbol::constant(names::REL_EQ, Params::Fixed(BINARY), rel_eq),
        Symbol::constant(names::REL_NEQ, Params::Fixed(BINARY), rel_neq),
        Symbol::constant(names::REL_LT, Params::Fixed(BINARY), rel_lt),
        Symbol::constant(names::REL_LTE, Params::Fixed(BINARY), rel_lte),
        Symbol::constant(names::REL_GR, Params::Fixed(BINARY), rel_gr),
        Symbol::constant(names::REL_GRE, Params::Fixed(BINARY), rel_gre),
        Symbol::constant(names::REL_IN_RANGE, Params::Fixed(IN_RANGE), rel_in_range),
        Symbol::constant(names::MATH_ADD, ANY, math_add),
        Symbol::constant(names::MATH_SUB, AT_LEAST_ONE, math_sub),
        Symbol::constant(names::MATH_MULT, ANY, math_mult),
        Symbol::constant(names::MATH_DIV, Params::Fixed(BINARY), math_div),
        Symbol::constant("core.math.pow", Params::Fixed(BINARY), math_pow),
        Symbol::constant("core.math.mod", Params::Fixed(BINARY), math_mod),
        Symbol::constant("core.math.int-div", Params::Fixed(BINARY), math_int_div),
        Symbol::constant("core.math.atan2", Params::Fixed(BINARY), math_atan2),
        Symbol::constant("core.math.min", AT_LEAST_ONE, math_min),
        Symbol::constant("core.math.max", AT_LEAST_ONE, math_max),
        Symbol::constant(names::STR_CONCAT, ANY, str_concat),
        Symbol::dynamic(names::STR_MATCH, Params::Fixed(MATCH), str_match),
        Symbol::constant(names::SET_HAS, Params::Fixed(BINARY), set_has),
        Symbol::constant(names::SET_IS_SUBSET, Params::Fixed(BINARY), set_is_subset),
        Symbol::constant(names::FLAGS_HAS_ANY, Params::Fixed(BINARY), flags_has_any),
        Symbol::constant(names::FLAGS_HAS_ALL, Params::Fixed(BINARY), flags_has_all),
        Symbol::constant(names::TYPE_BOOL, Params::Fixed(UNARY), type_bool),
        Symbol::constant(names::TYPE_NUM, Params::Fixed(UNARY), type_num),
        Symbol::constant(names::TYPE_STR, Params::Fixed(UNARY), type_str),
        Symbol::constant(names::TYPE_LIST, ANY, type_list),
        Symbol::constant(names::TYPE_SET, ANY, type_set),
        Symbol::constant(names::TYPE_LINK_FLAGS, ANY, type_link_flags),
        Symbol::constant(names::LIST_GET_AT, Params::Fixed(GET_AT), list_get_at),
    ];
    symbols.extend(unary_math_symbols());
    symbols
}

fn logic_and(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    for arg in args.iter() {
        if !arg.evaluate(ctx)?.as_bool(names::LOGIC_AND)? {
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

fn logic_or(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    for arg in args.iter() {
        if arg.evaluate(ctx)?.as_bool(names::LOGIC_OR)? {
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

fn logic_not(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Bool(!args.boolean(0)?))
}

fn ctrl_if(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    if args.boolean(0, ctx)? {
        args.evaluate(1, ctx)
    } else {
        args.evaluate(2, ctx)
    }
}

fn compare(args: &Args<Value>) -> Result<Option<Ordering>, QueryError> {
    let (a, b) = (args.required(0)?, args.required(1)?);
    match (a, b) {
        (Value::Str(a), Value::Str(b)) => Ok(Some(a.cmp(b))),
        _ => Ok(a
            .as_number(args.symbol())?
            .partial_cmp(&b.as_number(args.symbol())?)),
    }
}

fn rel_eq(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Bool(args.required(0)?.loosely_equals(args.required(1)?)))
}

fn rel_neq(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Bool(!args.required(0)?.loosely_equals(args.required(1)?)))
}

fn rel_lt(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Bool(compare(args)? == Some(Ordering::Less)))
}

fn rel_lte(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Bool(matches!(
        compare(args)?,
        Some(Ordering::Less | Ordering::Equal)
    )))
}

fn rel_gr(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Bool(compare(args)? == Some(Ordering::Greater)))
}

fn rel_gre(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Bool(matches!(
        compare(args)?,
        Some(Ordering::Greater | Ordering::Equal)
    )))
}

/// Both bounds are inclusive.
fn rel_in_range(args: &Args<Value>) -> Result<Value, QueryError> {
    let (value, min, max) = (args.number(0)?, args.number(1)?, args.number(2)?);
    Ok(Value::Bool(value >= min && value <= max))
}

fn math_add(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(args.numbers()?.into_iter().sum()))
}

/// With one argument this negates it.
fn math_sub(args: &Args<Value>) -> Result<Value, QueryError> {
    let numbers = args.numbers()?;
    Ok(Value::Number(match numbers.split_first() {
        Some((first, [])) => -first,
        Some((first, rest)) => rest.iter().fold(*first, |acc, x| acc - x),
        None => 0.0,
    }))
}

fn math_mult(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(args.numbers()?.into_iter().product()))
}

fn math_div(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(args.number(0)? / args.number(1)?))
}

fn math_pow(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(args.number(0)?.powf(args.number(1)?)))
}

/// Remainder with the sign of the dividend.
fn math_mod(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(args.number(0)? % args.number(1)?))
}

fn math_int_div(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number((args.number(0)? / args.number(1)?).trunc()))
}

fn math_atan2(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(args.number(0)?.atan2(args.number(1)?)))
}

fn math_min(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(
        args.numbers()?.into_iter().fold(f64::INFINITY, f64::min),
    ))
}

fn math_max(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Number(
        args.numbers()?.into_iter().fold(f64::NEG_INFINITY, f64::max),
    ))
}

fn sign(x: f64) -> f64 {
    if x == 0.0 || x.is_nan() { x } else { x.signum() }
}

macro_rules! unary_math {
    ($($fn_name:ident => $symbol:literal, $op:expr;)*) => {
        $(
            fn $fn_name(args: &Args<Value>) -> Result<Value, QueryError> {
                let op: fn(f64) -> f64 = $op;
                Ok(Value::Number(op(args.number(0)?)))
            }
        )*

        fn unary_math_symbols() -> Vec<Symbol> {
            vec![$(Symbol::constant($symbol, Params::Fixed(UNARY), $fn_name)),*]
        }
    };
}

unary_math! {
    math_abs => "core.math.abs", f64::abs;
    math_sign => "core.math.sign", sign;
    math_sqrt => "core.math.sqrt", f64::sqrt;
    math_cbrt => "core.math.cbrt", f64::cbrt;
    math_sin => "core.math.sin", f64::sin;
    math_cos => "core.math.cos", f64::cos;
    math_tan => "core.math.tan", f64::tan;
    math_asin => "core.math.asin", f64::asin;
    math_acos => "core.math.acos", f64::acos;
    math_atan => "core.math.atan", f64::atan;
    math_sinh => "core.math.sinh", f64::sinh;
    math_cosh => "core.math.cosh", f64::cosh;
    math_tanh => "core.math.tanh", f64::tanh;
    math_exp => "core.math.exp", f64::exp;
    math_log => "core.math.log", f64::ln;
    math_log10 => "core.math.log10", f64::log10;
    math_floor => "core.math.floor", f64::floor;
    math_ceil => "core.math.ceil", f64::ceil;
    math_round => "core.math.round", f64::round;
    math_trunc => "core.math.trunc", f64::trunc;
}

fn display_plain(value: &Value) -> String {
    match value {
        Value::Str(s) => s.clone(),
        other => other.to_string(),
    }
}

fn str_concat(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Str(args.iter().map(display_plain).collect()))
}

/// Unanchored: true when the pattern matches anywhere in the value.
fn str_match(ctx: &mut QueryContext, args: &Args<Box<dyn Evaluator>>) -> Result<Value, QueryError> {
    let pattern = args.evaluate(0, ctx)?;
    let value = args.evaluate(1, ctx)?;
    let value = value.as_str(names::STR_MATCH)?;
    let regex = ctx.regex(pattern.as_str(names::STR_MATCH)?)?;
    Ok(Value::Bool(regex.is_match(value)))
}

fn set_has(args: &Args<Value>) -> Result<Value, QueryError> {
    let key = args.required(1)?.to_key(names::SET_HAS)?;
    let found = match args.required(0)? {
        Value::Set(set) => set.contains(&key),
        other => other.to_set(names::SET_HAS)?.contains(&key),
    };
    Ok(Value::Bool(found))
}

fn set_is_subset(args: &Args<Value>) -> Result<Value, QueryError> {
    let a = args.required(0)?.to_set(names::SET_IS_SUBSET)?;
    let b = args.required(1)?.to_set(names::SET_IS_SUBSET)?;
    Ok(Value::Bool(a.is_subset(&b)))
}

/// A zero mask only matches a zero value.
fn flags_has_any(args: &Args<Value>) -> Result<Value, QueryError> {
    let (value, mask) = (args.flags(0)?, args.flags(1)?);
    Ok(Value::Bool(if mask == 0 {
        value == 0
    } else {
        value & mask != 0
    }))
}

/// A zero mask only matches a zero value.
fn flags_has_all(args: &Args<Value>) -> Result<Value, QueryError> {
    let (value, mask) = (args.flags(0)?, args.flags(1)?);
    Ok(Value::Bool(if mask == 0 {
        value == 0
    } else {
        value & mask == mask
    }))
}

fn type_bool(args: &Args<Value>) -> Result<Value, QueryError> {
    let value = match args.required(0)? {
        Value::Bool(b) => *b,
        Value::Number(n) => *n != 0.0 && !n.is_nan(),
        Value::Flags(f) => *f != 0,
        Value::Str(s) => !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false")),
        other => {
            return Err(QueryError::TypeMismatch {
                symbol: names::TYPE_BOOL,
                expected: "scalar",
                found: other.type_name(),
            });
        }
    };
    Ok(Value::Bool(value))
}

fn type_num(args: &Args<Value>) -> Result<Value, QueryError> {
    match args.required(0)? {
        Value::Str(s) => s
            .trim()
            .parse::<f64>()
            .map(Value::Number)
            .map_err(|_| QueryError::InvalidArgument {
                symbol: names::TYPE_NUM,
                message: format!("'{s}' is not a number"),
            }),
        other => other.as_number(names::TYPE_NUM).map(Value::Number),
    }
}

fn type_str(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::Str(display_plain(args.required(0)?)))
}

fn type_list(args: &Args<Value>) -> Result<Value, QueryError> {
    Ok(Value::List(args.iter().cloned().collect()))
}

fn type_set(args: &Args<Value>) -> Result<Value, QueryError> {
    let set: BTreeSet<SetKey> = args
        .iter()
        .map(|v| v.to_key(names::TYPE_SET))
        .collect::<Result<_, _>>()?;
    Ok(Value::Set(set))
}

/// Unknown keywords contribute no bits.
fn type_link_flags(args: &Args<Value>) -> Result<Value, QueryError> {
    let mut flags = LinkFlags::NONE;
    for arg in args.iter() {
        let name = arg.as_str(names::TYPE_LINK_FLAGS)?;
        let flag = link_flag(name);
        if flag.is_empty() {
            debug!(keyword = name, "Ignoring unknown link flag");
        }
        flags |= flag;
    }
    Ok(Value::Flags(flags.bits()))
}

fn list_get_at(args: &Args<Value>) -> Result<Value, QueryError> {
    let list = args.required(0)?.as_list(names::LIST_GET_AT)?;
    let index = args.number(1)?;
    if index < 0.0 || index.fract() != 0.0 || index as usize >= list.len() {
        return Err(QueryError::InvalidArgument {
            symbol: names::LIST_GET_AT,
            message: format!("index {index} out of range for a list of {}", list.len()),
        });
    }
    Ok(list[index as usize].clone())
}
