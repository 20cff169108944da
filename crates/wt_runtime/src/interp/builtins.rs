//! Built-in functions.
//!
//! Available everywhere, but a user function of the same name in the
//! target's script wins.
use crate::error::RuntimeError;
use crate::value::Value;
use wt_syntax::name_eq;

pub(super) fn call(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
    if name_eq(name, "length") {
        let [v] = one(name, args)?;
        return Ok(Value::from_int(v.as_str().chars().count() as i64));
    }
    if name_eq(name, "abs") {
        let [v] = one(name, args)?;
        if let Some(i) = v.as_integer() {
            return match i.checked_abs() {
                Some(i) => Ok(Value::from_int(i)),
                None => Err(RuntimeError::Overflow { op: "abs" }),
            };
        }
        return Ok(Value::from_float(number(v)?.abs()));
    }
    if name_eq(name, "min") {
        return fold_extreme(name, args, |best, next| next < best);
    }
    if name_eq(name, "max") {
        return fold_extreme(name, args, |best, next| next > best);
    }
    if name_eq(name, "round") {
        let [v] = one(name, args)?;
        return Ok(Value::from_float(number(v)?.round()));
    }
    if name_eq(name, "trunc") {
        let [v] = one(name, args)?;
        return Ok(Value::from_float(number(v)?.trunc()));
    }
    if name_eq(name, "sqrt") {
        let [v] = one(name, args)?;
        let n = number(v)?;
        if n < 0.0 {
            return Err(RuntimeError::not_a_number(v.as_str()));
        }
        return Ok(Value::from_float(n.sqrt()));
    }
    if name_eq(name, "average") {
        if args.is_empty() {
            return Err(arity(name, "at least 1"));
        }
        let mut sum = 0.0;
        for arg in args {
            sum += number(arg)?;
        }
        return Ok(Value::from_float(sum / args.len() as f64));
    }
    if name_eq(name, "offset") {
        let [needle, haystack] = two(name, args)?;
        return Ok(Value::from_int(offset(needle.as_str(), haystack.as_str())));
    }
    if name_eq(name, "charToNum") {
        let [v] = one(name, args)?;
        let code = v.as_str().chars().next().map_or(0, |c| c as i64);
        return Ok(Value::from_int(code));
    }
    if name_eq(name, "numToChar") {
        let [v] = one(name, args)?;
        let Some(code) = v.as_integer().and_then(|i| u32::try_from(i).ok()) else {
            return Err(RuntimeError::not_a_number(v.as_str()));
        };
        let Some(c) = char::from_u32(code) else {
            return Err(RuntimeError::Semantic(format!(
                "{code} is not a character code"
            )));
        };
        return Ok(Value::new(c.to_string()));
    }
    Err(RuntimeError::Semantic(format!(
        "no function named \"{name}\""
    )))
}

fn one<'a>(name: &str, args: &'a [Value]) -> Result<[&'a Value; 1], RuntimeError> {
    match args {
        [a] => Ok([a]),
        _ => Err(arity(name, "1")),
    }
}

fn two<'a>(name: &str, args: &'a [Value]) -> Result<[&'a Value; 2], RuntimeError> {
    match args {
        [a, b] => Ok([a, b]),
        _ => Err(arity(name, "2")),
    }
}

fn arity(name: &str, wants: &str) -> RuntimeError {
    RuntimeError::Semantic(format!("\"{name}\" expects {wants} argument(s)"))
}

fn number(v: &Value) -> Result<f64, RuntimeError> {
    v.as_float()
        .ok_or_else(|| RuntimeError::not_a_number(v.as_str()))
}

fn fold_extreme(
    name: &str,
    args: &[Value],
    better: fn(f64, f64) -> bool,
) -> Result<Value, RuntimeError> {
    let Some(first) = args.first() else {
        return Err(arity(name, "at least 1"));
    };
    let mut best = first;
    let mut best_n = number(first)?;
    for arg in &args[1..] {
        let n = number(arg)?;
        if better(best_n, n) {
            best = arg;
            best_n = n;
        }
    }
    Ok(best.clone())
}

/// 1-based character position of `needle` in `haystack`, ignoring case;
/// zero when absent or the needle is empty.
fn offset(needle: &str, haystack: &str) -> i64 {
    if needle.is_empty() {
        return 0;
    }
    let needle = needle.to_lowercase();
    let haystack_lower = haystack.to_lowercase();
    match haystack_lower.find(&needle) {
        Some(byte) => haystack_lower[..byte].chars().count() as i64 + 1,
        None => 0,
    }
}
