/// Pseudo-types that are shorthands for a usage string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PseudoType {
    Boolean,
    Integer,
    Float,
    String,
    Text,
    Date,
    Datetime,
    Time,
    Binary,
    Many2One,
    Array,
}

impl PseudoType {
    pub const ALL: [PseudoType; 11] = [
        PseudoType::Boolean,
        PseudoType::Integer,
        PseudoType::Float,
        PseudoType::String,
        PseudoType::Text,
        PseudoType::Date,
        PseudoType::Datetime,
        PseudoType::Time,
        PseudoType::Binary,
        PseudoType::Many2One,
        PseudoType::Array,
    ];

    pub fn parse(tag: &str) -> Option<Self> {
        let pseudo_type = match tag {
            "boolean" => PseudoType::Boolean,
            "integer" => PseudoType::Integer,
            "float" => PseudoType::Float,
            "string" => PseudoType::String,
            "text" => PseudoType::Text,
            "date" => PseudoType::Date,
            "datetime" => PseudoType::Datetime,
            "time" => PseudoType::Time,
            "binary" => PseudoType::Binary,
            "many2one" => PseudoType::Many2One,
            "array" => PseudoType::Array,
            _ => return None,
        };
        Some(pseudo_type)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PseudoType::Boolean => "boolean",
            PseudoType::Integer => "integer",
            PseudoType::Float => "float",
            PseudoType::String => "string",
            PseudoType::Text => "text",
            PseudoType::Date => "date",
            PseudoType::Datetime => "datetime",
            PseudoType::Time => "time",
            PseudoType::Binary => "binary",
            PseudoType::Many2One => "many2one",
            PseudoType::Array => "array",
        }
    }

    /// Usage string this pseudo-type stands for.
    pub fn usage_string(self) -> &'static str {
        match self {
            PseudoType::Boolean => "number/boolean",
            PseudoType::Integer => "number/integer:9",
            PseudoType::Float => "number/real:10.2",
            PseudoType::String => "text/plain:255",
            PseudoType::Text => "text/plain:32000",
            PseudoType::Date => "date/plain",
            PseudoType::Datetime => "date/time",
            PseudoType::Time => "time/plain",
            PseudoType::Binary => "binary/plain:64000000",
            PseudoType::Many2One => "number/integer:9",
            PseudoType::Array => "array",
        }
    }
}

/// Maps a type tag to its usage string, returning unknown tags verbatim.
pub fn usage_string_for(tag: &str) -> &str {
    match PseudoType::parse(tag) {
        Some(pseudo_type) => pseudo_type.usage_string(),
        None => tag,
    }
}
