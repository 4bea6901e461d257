//! Usages: structured classifications of what a field's values represent.
//!
//! A usage string reads `<category>[/<subtype>][:<length>[.<precision>]]`,
//! e.g. `text/plain:255` or `number/real:10.2`. A [`UsageFactory`] turns
//! such a string into a [`Usage`], which enumerates the constraints values
//! must satisfy.

pub mod builtin;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::constraint::ConstraintSet;
use crate::errors::UnrecognizedUsageError;

pub use builtin::{
    ArrayUsage, BinaryUsage, DateUsage, FormatKind, FormatUsage, NumberKind, NumberUsage, TextKind, TextUsage,
    TimeUsage,
};

/// Structured usage built from a usage string.
pub trait Usage: fmt::Debug + Send + Sync {
    /// The usage string this usage was built from.
    fn usage_string(&self) -> &str;

    /// Constraints contributed by this usage, keyed by name.
    fn constraints(&self) -> ConstraintSet;
}

/// Builds usages from usage strings.
///
/// Implementations must be safe to call from several threads at once.
pub trait UsageFactory: Send + Sync {
    fn create(&self, usage: &str) -> Result<Arc<dyn Usage>, UnrecognizedUsageError>;
}

/// Usage of a field declared without any type. Contributes no constraints.
#[derive(Debug, Default, Clone, Copy)]
pub struct UntypedUsage;

impl Usage for UntypedUsage {
    fn usage_string(&self) -> &str {
        ""
    }

    fn constraints(&self) -> ConstraintSet {
        ConstraintSet::new()
    }
}

/// Parsed form of a usage string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageString {
    raw: String,
    category: String,
    subtype: Option<String>,
    length: Option<u64>,
    precision: Option<u32>,
}

impl UsageString {
    pub fn parse(raw: &str) -> Result<Self, UnrecognizedUsageError> {
        if raw.is_empty() {
            return Err(UnrecognizedUsageError::new(raw, "empty usage string"));
        }

        let (head, size) = match raw.split_once(':') {
            Some((head, size)) => (head, Some(size)),
            None => (raw, None),
        };
        let (category, subtype) = match head.split_once('/') {
            Some((category, subtype)) => (category, Some(subtype)),
            None => (head, None),
        };

        if !is_identifier(category) {
            return Err(UnrecognizedUsageError::new(raw, format!("invalid category '{category}'")));
        }
        if let Some(subtype) = subtype
            && !is_identifier(subtype)
        {
            return Err(UnrecognizedUsageError::new(raw, format!("invalid subtype '{subtype}'")));
        }

        let (length, precision) = match size {
            Some(size) => parse_size(raw, size)?,
            None => (None, None),
        };

        Ok(Self {
            raw: raw.to_string(),
            category: category.to_string(),
            subtype: subtype.map(str::to_string),
            length,
            precision,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    pub fn length(&self) -> Option<u64> {
        self.length
    }

    pub fn precision(&self) -> Option<u32> {
        self.precision
    }

    pub(crate) fn reject(&self, reason: impl Into<String>) -> UnrecognizedUsageError {
        UnrecognizedUsageError::new(self.raw.clone(), reason)
    }
}

impl FromStr for UsageString {
    type Err = UnrecognizedUsageError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}

impl fmt::Display for UsageString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_identifier(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn parse_size(raw: &str, size: &str) -> Result<(Option<u64>, Option<u32>), UnrecognizedUsageError> {
    let (length, precision) = match size.split_once('.') {
        Some((length, precision)) => (length, Some(precision)),
        None => (size, None),
    };
    let length = length
        .parse::<u64>()
        .map_err(|_| UnrecognizedUsageError::new(raw, format!("invalid length '{length}'")))?;
    let precision = precision
        .map(|precision| {
            precision
                .parse::<u32>()
                .map_err(|_| UnrecognizedUsageError::new(raw, format!("invalid precision '{precision}'")))
        })
        .transpose()?;
    Ok((Some(length), precision))
}

/// Factory for the usages shipped with this crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultUsageFactory;

impl DefaultUsageFactory {
    pub fn new() -> Self {
        Self
    }

    /// Parses and builds a usage without erasing its concrete type.
    pub fn build(&self, usage: &str) -> Result<Arc<dyn Usage>, UnrecognizedUsageError> {
        let parsed = UsageString::parse(usage)?;
        let built: Arc<dyn Usage> = match parsed.category() {
            "text" => Arc::new(TextUsage::from_parsed(parsed)?),
            "number" => Arc::new(NumberUsage::from_parsed(parsed)?),
            "date" => Arc::new(DateUsage::from_parsed(parsed)?),
            "time" => Arc::new(TimeUsage::from_parsed(parsed)?),
            "binary" => Arc::new(BinaryUsage::from_parsed(parsed)?),
            "array" => Arc::new(ArrayUsage::from_parsed(parsed)?),
            "email" | "phone" | "uri" => Arc::new(FormatUsage::from_parsed(parsed)?),
            other => {
                let reason = format!("unknown category '{other}'");
                return Err(parsed.reject(reason));
            }
        };
        Ok(built)
    }
}

impl UsageFactory for DefaultUsageFactory {
    fn create(&self, usage: &str) -> Result<Arc<dyn Usage>, UnrecognizedUsageError> {
        self.build(usage)
    }
}
