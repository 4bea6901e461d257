use serde_json::{Number, Value};

use crate::constraint::{Constraint, ConstraintSet};
use crate::errors::UnrecognizedUsageError;
use crate::usage::{Usage, UsageString};
use crate::validators::{is_valid_date, is_valid_email, is_valid_phone, is_valid_time, is_valid_url, is_valid_uuid};

const SECONDS_PER_DAY: i64 = 86_400;

/// Predicate applied to string values only; other kinds pass.
fn on_str(check: impl Fn(&str) -> bool + Send + Sync + 'static) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value| value.as_str().is_none_or(&check)
}

/// Predicate applied to numeric values only; other kinds pass.
fn on_number(check: impl Fn(f64) -> bool + Send + Sync + 'static) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value| value.as_f64().is_none_or(&check)
}

/// Predicate applied to the raw JSON number; other kinds pass.
fn on_json_number(
    check: impl Fn(&Number) -> bool + Send + Sync + 'static,
) -> impl Fn(&Value) -> bool + Send + Sync + 'static {
    move |value| match value {
        Value::Number(number) => check(number),
        _ => true,
    }
}

/// Digits before the decimal point. Integers are counted exactly.
fn integer_digits(number: &Number) -> u64 {
    let magnitude = if let Some(n) = number.as_u64() {
        n
    } else if let Some(n) = number.as_i64() {
        n.unsigned_abs()
    } else {
        let whole = number.as_f64().unwrap_or(0.0).abs().trunc();
        if whole >= u64::MAX as f64 {
            return whole.log10().floor() as u64 + 1;
        }
        whole as u64
    };
    magnitude.checked_ilog10().map_or(1, |log| u64::from(log) + 1)
}

fn decimal_digits(number: f64) -> usize {
    let rendered = number.abs().to_string();
    rendered.split_once('.').map_or(0, |(_, decimals)| decimals.len())
}

fn require_no_subtype(parsed: &UsageString) -> Result<(), UnrecognizedUsageError> {
    match parsed.subtype() {
        Some(subtype) => Err(parsed.reject(format!("'{}' takes no subtype, got '{subtype}'", parsed.category()))),
        None => Ok(()),
    }
}

fn require_no_precision(parsed: &UsageString) -> Result<(), UnrecognizedUsageError> {
    match parsed.precision() {
        Some(_) => Err(parsed.reject(format!("'{}' takes no precision", parsed.category()))),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Plain,
    Html,
    Markdown,
    Uuid,
}

/// `text/*` usages. The length bounds the number of characters.
#[derive(Debug, Clone)]
pub struct TextUsage {
    parsed: UsageString,
    kind: TextKind,
    max_length: Option<u64>,
}

impl TextUsage {
    pub fn from_parsed(parsed: UsageString) -> Result<Self, UnrecognizedUsageError> {
        let kind = match parsed.subtype() {
            None | Some("plain") => TextKind::Plain,
            Some("html") => TextKind::Html,
            Some("markdown") => TextKind::Markdown,
            Some("uuid") => TextKind::Uuid,
            Some(other) => return Err(parsed.reject(format!("unknown text subtype '{other}'"))),
        };
        require_no_precision(&parsed)?;
        Ok(Self {
            max_length: parsed.length(),
            parsed,
            kind,
        })
    }

    pub fn kind(&self) -> TextKind {
        self.kind
    }

    pub fn max_length(&self) -> Option<u64> {
        self.max_length
    }
}

impl Usage for TextUsage {
    fn usage_string(&self) -> &str {
        self.parsed.as_str()
    }

    fn constraints(&self) -> ConstraintSet {
        let mut constraints = ConstraintSet::new();
        if let Some(max) = self.max_length {
            constraints.insert(
                "exceeded_length",
                Constraint::new(
                    format!("Length must not exceed {max} characters."),
                    on_str(move |text| text.chars().count() as u64 <= max),
                ),
            );
        }
        if self.kind == TextKind::Uuid {
            constraints.insert("invalid_uuid", Constraint::new("Value is not a valid UUID.", on_str(is_valid_uuid)));
        }
        constraints
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Boolean,
    Integer { digits: Option<u64> },
    Natural { digits: Option<u64> },
    /// `precision` counts all significant digits, `scale` the decimals among them.
    Real { precision: Option<u64>, scale: u32 },
}

/// `number/*` usages.
#[derive(Debug, Clone)]
pub struct NumberUsage {
    parsed: UsageString,
    kind: NumberKind,
}

impl NumberUsage {
    pub fn from_parsed(parsed: UsageString) -> Result<Self, UnrecognizedUsageError> {
        let kind = match parsed.subtype() {
            Some("boolean") => NumberKind::Boolean,
            Some("integer") => NumberKind::Integer { digits: parsed.length() },
            Some("natural") => NumberKind::Natural { digits: parsed.length() },
            Some("real") => {
                let scale = parsed.precision().unwrap_or(0);
                if let Some(precision) = parsed.length()
                    && u64::from(scale) > precision
                {
                    return Err(parsed.reject("precision exceeds length"));
                }
                NumberKind::Real {
                    precision: parsed.length(),
                    scale,
                }
            }
            Some(other) => return Err(parsed.reject(format!("unknown number subtype '{other}'"))),
            None => return Err(parsed.reject("number usage requires a subtype")),
        };
        if !matches!(kind, NumberKind::Real { .. }) {
            require_no_precision(&parsed)?;
        }
        Ok(Self { parsed, kind })
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    fn digit_bound(constraints: &mut ConstraintSet, digits: Option<u64>) {
        if let Some(max) = digits {
            constraints.insert(
                "too_many_digits",
                Constraint::new(
                    format!("Value must not have more than {max} digits."),
                    on_json_number(move |number| integer_digits(number) <= max),
                ),
            );
        }
    }
}

impl Usage for NumberUsage {
    fn usage_string(&self) -> &str {
        self.parsed.as_str()
    }

    fn constraints(&self) -> ConstraintSet {
        let mut constraints = ConstraintSet::new();
        match self.kind {
            NumberKind::Boolean => {
                constraints.insert(
                    "not_boolean",
                    Constraint::new("Value is not a boolean.", |value: &Value| match value {
                        Value::Number(number) => number.as_u64().is_some_and(|n| n <= 1),
                        _ => true,
                    }),
                );
            }
            NumberKind::Integer { digits } | NumberKind::Natural { digits } => {
                constraints.insert(
                    "not_integer",
                    Constraint::new("Value is not an integer.", on_number(|number| number.fract() == 0.0)),
                );
                Self::digit_bound(&mut constraints, digits);
                if matches!(self.kind, NumberKind::Natural { .. }) {
                    constraints.insert(
                        "negative_value",
                        Constraint::new("Value must not be negative.", on_number(|number| number >= 0.0)),
                    );
                }
            }
            NumberKind::Real { precision, scale } => {
                Self::digit_bound(&mut constraints, precision.map(|precision| precision - u64::from(scale)));
                if precision.is_some() {
                    let max = scale as usize;
                    constraints.insert(
                        "too_many_decimals",
                        Constraint::new(
                            format!("Value must not have more than {max} decimals."),
                            on_number(move |number| decimal_digits(number) <= max),
                        ),
                    );
                }
            }
        }
        constraints
    }
}

/// `date/plain` and `date/time`. Values are epoch integers or ISO strings.
#[derive(Debug, Clone)]
pub struct DateUsage {
    parsed: UsageString,
    with_time: bool,
}

impl DateUsage {
    pub fn from_parsed(parsed: UsageString) -> Result<Self, UnrecognizedUsageError> {
        let with_time = match parsed.subtype() {
            None | Some("plain") => false,
            Some("time") => true,
            Some(other) => return Err(parsed.reject(format!("unknown date subtype '{other}'"))),
        };
        Ok(Self { parsed, with_time })
    }

    pub fn with_time(&self) -> bool {
        self.with_time
    }
}

impl Usage for DateUsage {
    fn usage_string(&self) -> &str {
        self.parsed.as_str()
    }

    fn constraints(&self) -> ConstraintSet {
        ConstraintSet::new().with(
            "invalid_date",
            Constraint::new("Value is not a valid date.", |value: &Value| match value {
                Value::Number(number) => number.as_u64().is_some(),
                Value::String(text) => is_valid_date(text),
                _ => true,
            }),
        )
    }
}

/// `time/plain`. Values are seconds since midnight or `HH:MM[:SS]` strings.
#[derive(Debug, Clone)]
pub struct TimeUsage {
    parsed: UsageString,
}

impl TimeUsage {
    pub fn from_parsed(parsed: UsageString) -> Result<Self, UnrecognizedUsageError> {
        match parsed.subtype() {
            None | Some("plain") => Ok(Self { parsed }),
            Some(other) => Err(parsed.reject(format!("unknown time subtype '{other}'"))),
        }
    }
}

impl Usage for TimeUsage {
    fn usage_string(&self) -> &str {
        self.parsed.as_str()
    }

    fn constraints(&self) -> ConstraintSet {
        ConstraintSet::new().with(
            "invalid_time",
            Constraint::new("Value is not a valid time.", |value: &Value| match value {
                Value::Number(number) => number.as_i64().is_some_and(|seconds| (0..SECONDS_PER_DAY).contains(&seconds)),
                Value::String(text) => is_valid_time(text),
                _ => true,
            }),
        )
    }
}

/// `binary/plain`. The length bounds the size in bytes.
#[derive(Debug, Clone)]
pub struct BinaryUsage {
    parsed: UsageString,
    max_size: Option<u64>,
}

impl BinaryUsage {
    pub fn from_parsed(parsed: UsageString) -> Result<Self, UnrecognizedUsageError> {
        match parsed.subtype() {
            None | Some("plain") => {}
            Some(other) => return Err(parsed.reject(format!("unknown binary subtype '{other}'"))),
        }
        require_no_precision(&parsed)?;
        Ok(Self {
            max_size: parsed.length(),
            parsed,
        })
    }

    pub fn max_size(&self) -> Option<u64> {
        self.max_size
    }
}

impl Usage for BinaryUsage {
    fn usage_string(&self) -> &str {
        self.parsed.as_str()
    }

    fn constraints(&self) -> ConstraintSet {
        let mut constraints = ConstraintSet::new();
        if let Some(max) = self.max_size {
            constraints.insert(
                "exceeded_size",
                Constraint::new(
                    format!("Size must not exceed {max} bytes."),
                    on_str(move |data| data.len() as u64 <= max),
                ),
            );
        }
        constraints
    }
}

/// `array`: no constraint beyond the type check.
#[derive(Debug, Clone)]
pub struct ArrayUsage {
    parsed: UsageString,
}

impl ArrayUsage {
    pub fn from_parsed(parsed: UsageString) -> Result<Self, UnrecognizedUsageError> {
        require_no_subtype(&parsed)?;
        Ok(Self { parsed })
    }
}

impl Usage for ArrayUsage {
    fn usage_string(&self) -> &str {
        self.parsed.as_str()
    }

    fn constraints(&self) -> ConstraintSet {
        ConstraintSet::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    Email,
    Phone,
    Url,
}

/// String formats: `email`, `phone` and `uri/url`.
#[derive(Debug, Clone)]
pub struct FormatUsage {
    parsed: UsageString,
    kind: FormatKind,
}

impl FormatUsage {
    pub fn from_parsed(parsed: UsageString) -> Result<Self, UnrecognizedUsageError> {
        let kind = match (parsed.category(), parsed.subtype()) {
            ("email", None) => FormatKind::Email,
            ("phone", None) => FormatKind::Phone,
            ("uri", None | Some("url")) => FormatKind::Url,
            (category, Some(subtype)) => {
                return Err(parsed.reject(format!("unknown {category} subtype '{subtype}'")));
            }
            (category, None) => return Err(parsed.reject(format!("unknown format '{category}'"))),
        };
        Ok(Self { parsed, kind })
    }

    pub fn kind(&self) -> FormatKind {
        self.kind
    }
}

impl Usage for FormatUsage {
    fn usage_string(&self) -> &str {
        self.parsed.as_str()
    }

    fn constraints(&self) -> ConstraintSet {
        let (key, message, check): (&str, &str, fn(&str) -> bool) = match self.kind {
            FormatKind::Email => ("invalid_email", "Value is not a valid email address.", is_valid_email),
            FormatKind::Phone => ("invalid_phone", "Value is not a valid phone number.", is_valid_phone),
            FormatKind::Url => ("invalid_url", "Value is not a valid URL.", is_valid_url),
        };
        ConstraintSet::new().with(key, Constraint::new(message, on_str(check)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::{DefaultUsageFactory, UsageFactory};
    use serde_json::json;

    fn constraints(usage: &str) -> ConstraintSet {
        DefaultUsageFactory.create(usage).expect("known usage").constraints()
    }

    fn passes(usage: &str, key: &str, value: Value) -> bool {
        constraints(usage).get(key).unwrap_or_else(|| panic!("{usage} has no {key}")).check(&value)
    }

    #[test]
    fn plain_text_bounds_characters() {
        assert!(passes("text/plain:5", "exceeded_length", json!("héllo")));
        assert!(!passes("text/plain:5", "exceeded_length", json!("hello!")));
        assert!(passes("text/plain:5", "exceeded_length", json!(123456)));
        assert!(constraints("text/plain").is_empty());
    }

    #[test]
    fn integer_bounds_digits() {
        assert!(passes("number/integer:9", "too_many_digits", json!(999_999_999)));
        assert!(!passes("number/integer:9", "too_many_digits", json!(1_000_000_000)));
        assert!(passes("number/integer:9", "too_many_digits", json!(-42)));
        assert!(passes("number/integer:9", "too_many_digits", json!(0)));
        assert!(!passes("number/integer:9", "not_integer", json!(4.5)));
        assert!(passes("number/integer:9", "not_integer", json!("4.5")));
    }

    #[test]
    fn integer_digits_are_exact_near_powers_of_ten() {
        assert!(passes("number/integer:15", "too_many_digits", json!(999_999_999_999_999_u64)));
        assert!(!passes("number/integer:15", "too_many_digits", json!(1_000_000_000_000_000_u64)));
        assert!(passes("number/integer:16", "too_many_digits", json!(9_999_999_999_999_999_u64)));
        assert!(passes("number/integer:16", "too_many_digits", json!(-9_999_999_999_999_999_i64)));
        assert!(!passes("number/integer:16", "too_many_digits", json!(10_000_000_000_000_000_u64)));
        assert!(passes("number/integer:20", "too_many_digits", json!(u64::MAX)));
    }

    #[test]
    fn natural_rejects_negatives() {
        assert!(!passes("number/natural:4", "negative_value", json!(-1)));
        assert!(passes("number/natural:4", "negative_value", json!(12)));
    }

    #[test]
    fn real_bounds_integer_part_and_decimals() {
        assert!(passes("number/real:10.2", "too_many_digits", json!(12_345_678.5)));
        assert!(!passes("number/real:10.2", "too_many_digits", json!(123_456_789.0)));
        assert!(passes("number/real:10.2", "too_many_decimals", json!(3.25)));
        assert!(!passes("number/real:10.2", "too_many_decimals", json!(3.125)));
        assert!(passes("number/real:10.2", "too_many_decimals", json!(3)));
    }

    #[test]
    fn real_precision_cannot_exceed_length() {
        assert!(DefaultUsageFactory.create("number/real:2.4").is_err());
    }

    #[test]
    fn boolean_accepts_flags() {
        assert!(passes("number/boolean", "not_boolean", json!(true)));
        assert!(passes("number/boolean", "not_boolean", json!(1)));
        assert!(!passes("number/boolean", "not_boolean", json!(2)));
    }

    #[test]
    fn dates_and_times() {
        assert!(passes("date/plain", "invalid_date", json!(1_615_680_000)));
        assert!(!passes("date/plain", "invalid_date", json!(-5)));
        assert!(passes("date/time", "invalid_date", json!("2021-03-14T09:30:00Z")));
        assert!(!passes("date/time", "invalid_date", json!("soon")));
        assert!(passes("time/plain", "invalid_time", json!(3600)));
        assert!(!passes("time/plain", "invalid_time", json!(SECONDS_PER_DAY)));
        assert!(passes("time/plain", "invalid_time", json!("12:30")));
    }

    #[test]
    fn binary_bounds_bytes() {
        assert!(passes("binary/plain:4", "exceeded_size", json!("abcd")));
        assert!(!passes("binary/plain:4", "exceeded_size", json!("é€")));
    }

    #[test]
    fn formats() {
        assert!(passes("email", "invalid_email", json!("ops@example.com")));
        assert!(!passes("email", "invalid_email", json!("ops")));
        assert!(passes("uri/url", "invalid_url", json!("https://example.com/a")));
        assert!(!passes("uri", "invalid_url", json!("example")));
        assert!(!passes("phone", "invalid_phone", json!("n/a")));
        assert!(!passes("text/uuid", "invalid_uuid", json!("1234")));
    }

    #[test]
    fn array_contributes_nothing() {
        assert!(constraints("array").is_empty());
        assert!(DefaultUsageFactory.create("array/of").is_err());
    }

    #[test]
    fn unknown_subtypes_are_rejected() {
        for raw in ["text/rich", "number", "number/complex", "date/epoch", "email/work", "text/plain:10.2"] {
            assert!(DefaultUsageFactory.create(raw).is_err(), "{raw} should be rejected");
        }
    }
}
