//! Built-in functions of the step language.
//!
//! Each function receives a slice of already-evaluated arguments and
//! returns `Result<Value, String>`.  The dispatcher is called from the
//! expression evaluator when it reaches a call node.

use std::cmp::Ordering;

use crate::value::Value;

/// Dispatch a built-in function call.
///
/// Returns `None` if the name is not a built-in, so the caller can report
/// an unknown function instead of a bad call.
pub fn call_builtin(name: &str, args: &[Value]) -> Option<Result<Value, String>> {
    // Inner function returns Result<Option<Value>, String>:
    //   Ok(None)    → not a builtin
    //   Ok(Some(v)) → success
    //   Err(e)      → builtin call failed
    // `.transpose()` converts that to Option<Result<Value, String>>.
    fn inner(name: &str, args: &[Value]) -> Result<Option<Value>, String> {
        Ok(Some(match name {
            // ── String functions ─────────────────────────────────────────────
            "len" => Value::Int(get_str(args, 0, name)?.chars().count() as i64),
            "upper" => Value::Str(get_str(args, 0, name)?.to_uppercase()),
            "lower" => Value::Str(get_str(args, 0, name)?.to_lowercase()),
            "trim" => Value::Str(get_str(args, 0, name)?.trim().to_owned()),

            // ── Math functions ───────────────────────────────────────────────
            "abs" => match get(args, 0, name)? {
                Value::Int(n) => int_abs(*n),
                Value::Float(x) => Value::Float(x.abs()),
                Value::Str(s) => {
                    let t = s.trim();
                    if let Ok(n) = t.parse::<i64>() {
                        int_abs(n)
                    } else if let Ok(x) = t.parse::<f64>() {
                        Value::Float(x.abs())
                    } else {
                        return Err(format!("abs: not a number: {s:?}"));
                    }
                }
            },
            "min" => fold_by_order(args, name, Ordering::Less)?,
            "max" => fold_by_order(args, name, Ordering::Greater)?,
            "pow" => {
                let base = get(args, 0, name)?;
                let exp = get(args, 1, name)?;
                match (base, exp) {
                    (Value::Int(b), Value::Int(e)) if *e >= 0 => {
                        // Fall back to floats when the integer result overflows.
                        match u32::try_from(*e).ok().and_then(|e| b.checked_pow(e)) {
                            Some(n) => Value::Int(n),
                            None => Value::Float((*b as f64).powf(*e as f64)),
                        }
                    }
                    _ => {
                        let b = base.as_number().map_err(|e| format!("pow: {e}"))?;
                        let e = exp.as_number().map_err(|e| format!("pow: {e}"))?;
                        Value::Float(b.powf(e))
                    }
                }
            }

            // ── Conversions ──────────────────────────────────────────────────
            "str" => Value::Str(get(args, 0, name)?.to_string()),
            "int" => Value::Int(get(args, 0, name)?.to_int().map_err(|e| format!("int: {e}"))?),

            _ => return Ok(None),
        }))
    }
    inner(name, args).transpose()
}

fn int_abs(n: i64) -> Value {
    match n.checked_abs() {
        Some(m) => Value::Int(m),
        // |i64::MIN| overflows i64; fall back to a float.
        None => Value::Float((n as f64).abs()),
    }
}

fn fold_by_order(args: &[Value], name: &str, keep: Ordering) -> Result<Value, String> {
    let first = get(args, 0, name)?;
    let mut best = first.clone();
    for v in &args[1..] {
        if v.cmp_value(&best) == keep {
            best = v.clone();
        }
    }
    Ok(best)
}

fn get<'a>(args: &'a [Value], idx: usize, name: &str) -> Result<&'a Value, String> {
    args.get(idx)
        .ok_or_else(|| format!("{name}: argument {idx} missing"))
}

fn get_str(args: &[Value], idx: usize, name: &str) -> Result<String, String> {
    get(args, idx, name).map(|v| v.to_string())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
