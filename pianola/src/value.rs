//! Runtime values for the demo expression language.
//!
//! The language is deliberately small: integers, floats, and strings.
//! Strings that look numeric participate in arithmetic; anything else
//! surfaces a diagnostic instead of a silently-coerced zero, because in
//! a live demo a wrong answer is worse than a red line.

use std::cmp::Ordering;
use std::fmt;

/// A value produced by evaluating one step of a demo script.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => {
                // Whole floats keep one decimal so they stay visibly floats.
                if x.fract() == 0.0 && x.abs() < 1e15 {
                    write!(f, "{:.1}", x)
                } else {
                    write!(f, "{x}")
                }
            }
            Value::Str(s) => write!(f, "{s}"),
        }
    }
}

impl Value {
    /// Coerce to boolean: `0`, `0.0`, and `""` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }

    /// Numeric reading of the value, if it has one.
    fn num(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Str(s) => s.trim().parse().ok(),
        }
    }

    fn not_numeric(&self) -> String {
        match self {
            Value::Str(s) => format!("not a number: {s:?}"),
            other => format!("not a number: {other}"),
        }
    }

    /// Numeric reading or a diagnostic.
    pub fn as_number(&self) -> Result<f64, String> {
        self.num().ok_or_else(|| self.not_numeric())
    }

    // ── Arithmetic helpers ────────────────────────────────────────────────────

    /// Determine the common numeric type for a binary operation.
    fn numeric_promote(a: &Value, b: &Value) -> Result<(f64, f64, bool), String> {
        let an = a.num().ok_or_else(|| a.not_numeric())?;
        let bn = b.num().ok_or_else(|| b.not_numeric())?;
        let is_float = a.is_float_like() || b.is_float_like();
        Ok((an, bn, is_float))
    }

    fn is_float_like(&self) -> bool {
        match self {
            Value::Float(_) => true,
            Value::Int(_) => false,
            // "1e3" is a float-string even without a dot.
            Value::Str(s) => s.trim().parse::<i64>().is_err() && s.trim().parse::<f64>().is_ok(),
        }
    }

    fn make_numeric(f: f64, is_float: bool) -> Value {
        if is_float {
            Value::Float(f)
        } else {
            Value::Int(f as i64)
        }
    }

    /// `+` concatenates when either operand is a non-numeric string,
    /// otherwise adds numerically.
    pub fn arith_add(&self, rhs: &Value) -> Value {
        match (self.num(), rhs.num()) {
            (Some(a), Some(b)) => {
                let is_float = self.is_float_like() || rhs.is_float_like();
                Self::make_numeric(a + b, is_float)
            }
            _ => Value::Str(format!("{self}{rhs}")),
        }
    }

    pub fn arith_sub(&self, rhs: &Value) -> Result<Value, String> {
        let (a, b, is_float) = Self::numeric_promote(self, rhs)?;
        Ok(Self::make_numeric(a - b, is_float))
    }

    pub fn arith_mul(&self, rhs: &Value) -> Result<Value, String> {
        let (a, b, is_float) = Self::numeric_promote(self, rhs)?;
        Ok(Self::make_numeric(a * b, is_float))
    }

    pub fn arith_div(&self, rhs: &Value) -> Result<Value, String> {
        let (a, b, is_float) = Self::numeric_promote(self, rhs)?;
        if b == 0.0 {
            return Err("division by zero".into());
        }
        Ok(Self::make_numeric(a / b, is_float))
    }

    pub fn arith_rem(&self, rhs: &Value) -> Result<Value, String> {
        let (a, b, is_float) = Self::numeric_promote(self, rhs)?;
        if b == 0.0 {
            return Err("modulo by zero".into());
        }
        Ok(Self::make_numeric(a % b, is_float))
    }

    fn neg_int(n: i64) -> Value {
        match n.checked_neg() {
            Some(m) => Value::Int(m),
            // -i64::MIN does not fit in i64; it widens to a float.
            None => Value::Float(-(n as f64)),
        }
    }

    pub fn arith_neg(&self) -> Result<Value, String> {
        match self {
            Value::Int(n) => Ok(Self::neg_int(*n)),
            Value::Float(x) => Ok(Value::Float(-x)),
            Value::Str(s) => {
                if let Ok(n) = s.trim().parse::<i64>() {
                    Ok(Self::neg_int(n))
                } else if let Ok(x) = s.trim().parse::<f64>() {
                    Ok(Value::Float(-x))
                } else {
                    Err(self.not_numeric())
                }
            }
        }
    }

    /// Total order used by comparisons and `min`/`max`: numbers compare
    /// numerically, everything else falls back to lexicographic order.
    pub fn cmp_value(&self, rhs: &Value) -> Ordering {
        match (self.num(), rhs.num()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            _ => self.to_string().cmp(&rhs.to_string()),
        }
    }

    /// Integer reading for `int()`: float-strings are accepted and truncated.
    pub fn to_int(&self) -> Result<i64, String> {
        match self {
            Value::Int(n) => Ok(*n),
            Value::Float(x) => Ok(*x as i64),
            Value::Str(s) => {
                let t = s.trim();
                if let Ok(n) = t.parse::<i64>() {
                    Ok(n)
                } else if let Ok(x) = t.parse::<f64>() {
                    Ok(x as i64)
                } else {
                    Err(format!("cannot convert {s:?} to an integer"))
                }
            }
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Int(if b { 1 } else { 0 })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
