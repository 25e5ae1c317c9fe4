use std::cmp::Ordering;
use regex::Regex;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Record, Value};
use crate::query::path::resolve;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    Equals,
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessThanOrEqual,
    In,
    Between,
    Matches,
}

/// Regular expression operand of `Matches`.
///
/// Text patterns are compiled when the matcher is built. A pattern that does
/// not compile is kept and reported when the query runs.
#[derive(Debug, Clone)]
pub enum Pattern {
    Compiled(Regex),
    Invalid { source: String, reason: String },
}

impl Pattern {
    pub fn new(source: &str) -> Self {
        match Regex::new(source) {
            Ok(regex) => Pattern::Compiled(regex),
            Err(e) => Pattern::Invalid {
                source: source.to_string(),
                reason: e.to_string(),
            },
        }
    }

    fn regex(&self) -> Result<&Regex> {
        match self {
            Pattern::Compiled(regex) => Ok(regex),
            Pattern::Invalid { source, reason } => Err(Error::new(
                ErrorKind::InvalidPattern,
                format!("Invalid pattern {:?}: {}", source, reason),
            )),
        }
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Pattern::new(source)
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Pattern::new(&source)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern::Compiled(regex)
    }
}

impl From<&Regex> for Pattern {
    fn from(regex: &Regex) -> Self {
        Pattern::Compiled(regex.clone())
    }
}

#[derive(Debug, Clone)]
pub enum Operand {
    Value(Value),
    Pattern(Pattern),
}

/// One filter condition: the value at `key` compared against `operand`
#[derive(Debug, Clone)]
pub struct Matcher {
    pub key: String,
    pub comparator: Comparator,
    pub operand: Operand,
}

impl Matcher {
    pub fn new(key: impl Into<String>, comparator: Comparator, operand: Operand) -> Self {
        Matcher {
            key: key.into(),
            comparator,
            operand,
        }
    }

    /// Equals against a scalar on a top-level field, the only shape the
    /// field index can answer
    pub fn index_lookup(&self) -> Option<(&str, &Value)> {
        if self.comparator != Comparator::Equals || self.key.contains('.') {
            return None;
        }
        match &self.operand {
            Operand::Value(value) if !value.is_array() && !value.is_object() => {
                Some((self.key.as_str(), value))
            }
            _ => None,
        }
    }
}

/// Evaluate one matcher against a record.
///
/// Key-chain resolution failures propagate. An operand whose shape does not
/// fit the comparator evaluates to `false`.
pub fn matches(record: &Record, matcher: &Matcher) -> Result<bool> {
    let value = resolve(&matcher.key, record)?;

    let operand = match (&matcher.operand, matcher.comparator) {
        (Operand::Pattern(pattern), Comparator::Matches) => {
            return Ok(pattern.regex()?.is_match(&coerce_to_string(value)));
        }
        (Operand::Value(operand), _) => operand,
        _ => return Ok(false),
    };

    let result = match matcher.comparator {
        Comparator::Equals => strict_equals(value, operand),
        Comparator::NotEqual => !strict_equals(value, operand),
        Comparator::GreaterThan => numeric_cmp(value, operand) == Some(Ordering::Greater),
        Comparator::LessThan => numeric_cmp(value, operand) == Some(Ordering::Less),
        Comparator::GreaterOrEqual => matches!(
            numeric_cmp(value, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparator::LessThanOrEqual => matches!(
            numeric_cmp(value, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Comparator::Between => match operand.as_array().map(Vec::as_slice) {
            Some([lo, hi]) => {
                let n = to_number(value);
                n > to_number(lo) && n < to_number(hi)
            }
            _ => false,
        },
        Comparator::In => match operand {
            Value::Array(set) => set.iter().any(|candidate| strict_equals(value, candidate)),
            _ => false,
        },
        // a text operand on Matches never went through Pattern
        Comparator::Matches => false,
    };

    Ok(result)
}

/// All matchers must hold. Evaluation stops at the first that does not.
pub fn matches_all(record: &Record, matchers: &[Matcher]) -> Result<bool> {
    for matcher in matchers {
        if !matches(record, matcher)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Structural equality, except numbers compare by value (`1 == 1.0`)
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                x.as_f64() == y.as_f64()
            }
        }
        _ => a == b,
    }
}

fn numeric_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    to_number(a).partial_cmp(&to_number(b))
}

/// Numeric coercion: null is 0, booleans are 0/1, numeric text parses,
/// a single-element array takes its element's number. Anything else is NaN
/// and fails every ordering comparison.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => to_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// Numeric text: decimal and exponent forms, `Infinity` with an optional
/// sign, and unsigned `0x` / `0o` / `0b` integers. Blank text is 0.
fn parse_number(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return 0.0;
    }

    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match trimmed.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &trimmed[2..];
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return f64::NAN;
        }
        return u128::from_str_radix(digits, radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // keeps out "inf", "nan" and friends
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Text form used by `Matches`: strings verbatim, scalars by their display
/// form. Arrays join their elements with commas (null elements are empty)
/// and objects read as `[object Object]`.
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => match (n.as_i64(), n.as_u64(), n.as_f64()) {
            (Some(i), _, _) => i.to_string(),
            (_, Some(u), _) => u.to_string(),
            (_, _, Some(f)) => f.to_string(),
            _ => n.to_string(),
        },
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => coerce_to_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn check(value: Value, comparator: Comparator, operand: Value) -> bool {
        let r = record(json!({ "v": value }));
        matches(&r, &Matcher::new("v", comparator, Operand::Value(operand))).unwrap()
    }

    #[test]
    fn equality() {
        assert!(check(json!("pending"), Comparator::Equals, json!("pending")));
        assert!(!check(json!("pending"), Comparator::Equals, json!("done")));
        assert!(check(json!(1), Comparator::Equals, json!(1.0)));
        assert!(!check(json!("1"), Comparator::Equals, json!(1)));
        assert!(check(json!("1"), Comparator::NotEqual, json!(1)));
        assert!(check(json!({"a": [1, 2]}), Comparator::Equals, json!({"a": [1, 2]})));
    }

    #[test]
    fn ordering_coerces_to_numbers() {
        assert!(check(json!(10), Comparator::GreaterThan, json!(5)));
        assert!(check(json!("10"), Comparator::GreaterThan, json!(5)));
        assert!(!check(json!(5), Comparator::GreaterThan, json!(5)));
        assert!(check(json!(5), Comparator::GreaterOrEqual, json!(5)));
        assert!(check(json!(4), Comparator::LessThan, json!("5")));
        assert!(check(json!(5), Comparator::LessThanOrEqual, json!(5)));
        assert!(check(json!(true), Comparator::GreaterThan, json!(0)));
        assert!(!check(json!("abc"), Comparator::LessThan, json!(5)));
        assert!(!check(json!("abc"), Comparator::GreaterOrEqual, json!(5)));
    }

    #[test]
    fn between_is_exclusive() {
        assert!(check(json!(15), Comparator::Between, json!([10, 20])));
        assert!(!check(json!(10), Comparator::Between, json!([10, 20])));
        assert!(!check(json!(20), Comparator::Between, json!([10, 20])));
        assert!(!check(json!(15), Comparator::Between, json!([10])));
        assert!(!check(json!(15), Comparator::Between, json!(10)));
    }

    #[test]
    fn membership() {
        assert!(check(json!("b"), Comparator::In, json!(["a", "b"])));
        assert!(!check(json!("c"), Comparator::In, json!(["a", "b"])));
        assert!(check(json!(2), Comparator::In, json!([1, 2.0])));
        assert!(!check(json!("a"), Comparator::In, json!("abc")));
    }

    #[test]
    fn pattern_matching() {
        let r = record(json!({"name": "Mop the floor", "age": 25}));
        let text = Matcher::new("name", Comparator::Matches, Operand::Pattern("^Mop".into()));
        let built = Matcher::new(
            "age",
            Comparator::Matches,
            Operand::Pattern(Regex::new(r"^\d+$").unwrap().into()),
        );
        let miss = Matcher::new("name", Comparator::Matches, Operand::Pattern("floor$x".into()));

        assert!(matches(&r, &text).unwrap());
        assert!(matches(&r, &built).unwrap());
        assert!(!matches(&r, &miss).unwrap());
    }

    #[test]
    fn invalid_pattern_fails_evaluation() {
        let r = record(json!({"name": "x"}));
        let m = Matcher::new("name", Comparator::Matches, Operand::Pattern("(".into()));
        assert_eq!(matches(&r, &m).unwrap_err().kind, ErrorKind::InvalidPattern);
    }

    #[test]
    fn mismatched_operand_is_false() {
        let r = record(json!({"name": "x"}));
        let m = Matcher::new("name", Comparator::Matches, Operand::Value(json!("x")));
        let p = Matcher::new("name", Comparator::Equals, Operand::Pattern("x".into()));
        assert!(!matches(&r, &m).unwrap());
        assert!(!matches(&r, &p).unwrap());
    }

    #[test]
    fn unresolvable_key_propagates() {
        let r = record(json!({"name": "x"}));
        let m = Matcher::new("status", Comparator::Equals, Operand::Value(json!("done")));
        assert!(matches!(matches(&r, &m).unwrap_err().kind, ErrorKind::PathNotFound { .. }));
    }

    #[test]
    fn conjunction_short_circuits() {
        let r = record(json!({"status": "done"}));
        let first = Matcher::new("status", Comparator::Equals, Operand::Value(json!("pending")));
        let missing = Matcher::new("nope", Comparator::Equals, Operand::Value(json!(1)));
        assert!(!matches_all(&r, &[first.clone(), missing.clone()]).unwrap());
        assert!(matches_all(&r, &[missing, first]).is_err());
        assert!(matches_all(&r, &[]).unwrap());
    }

    #[test]
    fn string_coercion() {
        assert_eq!(coerce_to_string(&json!(25)), "25");
        assert_eq!(coerce_to_string(&json!(1.5)), "1.5");
        assert_eq!(coerce_to_string(&json!(true)), "true");
        assert_eq!(coerce_to_string(&json!(null)), "null");
        assert_eq!(coerce_to_string(&json!(["home", "chores"])), "home,chores");
        assert_eq!(coerce_to_string(&json!([1, null, [2, 3]])), "1,,2,3");
        assert_eq!(coerce_to_string(&json!({"a": 1})), "[object Object]");
    }

    #[test]
    fn matches_reads_arrays_as_joined_text() {
        let r = record(json!({"tags": ["home", "chores"], "meta": {"k": 1}}));
        let joined = Matcher::new("tags", Comparator::Matches, Operand::Pattern("^home,chores$".into()));
        let json_text = Matcher::new("tags", Comparator::Matches, Operand::Pattern(r#"^\["#.into()));
        let object = Matcher::new("meta", Comparator::Matches, Operand::Pattern("object Object".into()));

        assert!(matches(&r, &joined).unwrap());
        assert!(!matches(&r, &json_text).unwrap());
        assert!(matches(&r, &object).unwrap());
    }

    #[test]
    fn numeric_text_parsing() {
        assert_eq!(to_number(&json!(" 42 ")), 42.0);
        assert_eq!(to_number(&json!("1e3")), 1000.0);
        assert_eq!(to_number(&json!("0x10")), 16.0);
        assert_eq!(to_number(&json!("0b101")), 5.0);
        assert_eq!(to_number(&json!("-Infinity")), f64::NEG_INFINITY);
        assert!(to_number(&json!("inf")).is_nan());
        assert!(to_number(&json!("nan")).is_nan());
        assert!(to_number(&json!("infinity")).is_nan());
        assert!(to_number(&json!("-0x10")).is_nan());
        assert!(to_number(&json!("12px")).is_nan());
    }

    #[test]
    fn index_lookup_shape() {
        let eq = Matcher::new("status", Comparator::Equals, Operand::Value(json!("done")));
        let nested = Matcher::new("a.b", Comparator::Equals, Operand::Value(json!(1)));
        let arr = Matcher::new("tags", Comparator::Equals, Operand::Value(json!([1])));
        let gt = Matcher::new("n", Comparator::GreaterThan, Operand::Value(json!(1)));
        assert_eq!(eq.index_lookup(), Some(("status", &json!("done"))));
        assert!(nested.index_lookup().is_none());
        assert!(arr.index_lookup().is_none());
        assert!(gt.index_lookup().is_none());
    }
}
