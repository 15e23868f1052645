use crate::bounds::Bounds;
use crate::error::PatternError;
use crate::schema::Schema;
use chrono::{DateTime, NaiveDate, NaiveTime};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};
use std::fmt;
use std::str::FromStr;

/// Field name to schema, in declaration order.
pub type Fields = IndexMap<String, Schema>;

#[derive(Clone, Debug, PartialEq)]
pub enum Form {
    Null,
    Any,
    Boolean,
    Integer(Bounds),
    Number(Bounds),
    String(StringSchema),
    Literal(Literal),
    Array(Elements),
    Tuple(Tuple),
    Record(Record),
    Union(Vec<Schema>),
    Object(Fields),
    Model(Fields),
    Group(Group),
    Ref(String),
    Root,
    This,
}

impl Form {
    /// The kind name, as used in the textual language and in `SerdeSchema`.
    pub fn kind(&self) -> &'static str {
        match self {
            Form::Null => "null",
            Form::Any => "any",
            Form::Boolean => "boolean",
            Form::Integer(_) => "integer",
            Form::Number(_) => "number",
            Form::String(_) => "string",
            Form::Literal(_) => "literal",
            Form::Array(_) => "array",
            Form::Tuple(_) => "tuple",
            Form::Record(_) => "record",
            Form::Union(_) => "union",
            Form::Object(_) => "object",
            Form::Model(_) => "model",
            Form::Group(_) => "group",
            Form::Ref(_) => "ref",
            Form::Root => "root",
            Form::This => "this",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct StringSchema {
    pub format: Option<StringFormat>,
    pub bounds: Bounds,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Elements {
    pub schema: Box<Schema>,
    pub bounds: Bounds,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tuple {
    pub items: Vec<Schema>,
    pub rest: Option<Elements>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub key: Option<StringSchema>,
    pub schema: Box<Schema>,
    pub bounds: Bounds,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub members: Fields,
    pub selected: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Boolean(b) => write!(f, "{}", b),
            Literal::Number(n) => write!(f, "{}", n),
            Literal::String(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StringFormat {
    Date,
    Time,
    DateTime,
    Uuid,
    Email,
    Base64,
    Pattern(Pattern),
}

impl FromStr for StringFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "datetime" => Ok(Self::DateTime),
            "uuid" => Ok(Self::Uuid),
            "email" => Ok(Self::Email),
            "base64" => Ok(Self::Base64),
            _ => Err(()),
        }
    }
}

static TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2})(\.\d+)?(Z|[+-]\d{2}:\d{2})?$").expect("time pattern")
});

static UUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid pattern")
});

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static BASE64: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9+/]{4})*(?:[A-Za-z0-9+/]{2}==|[A-Za-z0-9+/]{3}=)?$")
        .expect("base64 pattern")
});

impl StringFormat {
    /// The format's name, or `"regex"` for a pattern.
    pub fn name(&self) -> &'static str {
        match self {
            StringFormat::Date => "date",
            StringFormat::Time => "time",
            StringFormat::DateTime => "datetime",
            StringFormat::Uuid => "uuid",
            StringFormat::Email => "email",
            StringFormat::Base64 => "base64",
            StringFormat::Pattern(_) => "regex",
        }
    }

    pub fn matches(&self, s: &str) -> bool {
        match self {
            StringFormat::Date => {
                s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
            }
            StringFormat::Time => match TIME.captures(s) {
                Some(caps) => NaiveTime::parse_from_str(&caps[1], "%H:%M:%S").is_ok(),
                None => false,
            },
            StringFormat::DateTime => DateTime::parse_from_rfc3339(s).is_ok(),
            StringFormat::Uuid => UUID.is_match(s),
            StringFormat::Email => EMAIL.is_match(s),
            StringFormat::Base64 => BASE64.is_match(s),
            StringFormat::Pattern(pattern) => pattern.regex.is_match(s),
        }
    }
}

/// A regular expression compiled once, when the schema is built.
///
/// Equality compares the source and flags, not the compiled automaton.
#[derive(Clone, Debug)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
    regex: Regex,
}

impl Pattern {
    /// Compiles `source` with `/.../flags`-style flags: `i`, `m`, `s` and `u`
    /// map to regex options, `g` and `y` are accepted and have no effect.
    pub fn new(source: &str, flags: &str) -> Result<Self, PatternError> {
        let mut builder = RegexBuilder::new(source);

        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'u' => {
                    builder.unicode(true);
                }
                'g' | 'y' => {}
                _ => return Err(PatternError::UnknownFlag(flag)),
            }
        }

        Ok(Self {
            source: source.to_owned(),
            flags: flags.to_owned(),
            regex: builder.build()?,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.flags == other.flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_format_from_str() {
        assert_eq!(Err(()), "Date".parse::<StringFormat>());
        assert_eq!(Err(()), "regex".parse::<StringFormat>());
        assert_eq!(Ok(StringFormat::Date), "date".parse());
        assert_eq!(Ok(StringFormat::Time), "time".parse());
        assert_eq!(Ok(StringFormat::DateTime), "datetime".parse());
        assert_eq!(Ok(StringFormat::Uuid), "uuid".parse());
        assert_eq!(Ok(StringFormat::Email), "email".parse());
        assert_eq!(Ok(StringFormat::Base64), "base64".parse());
    }

    #[test]
    fn named_formats() {
        assert!(StringFormat::Date.matches("2024-02-29"));
        assert!(!StringFormat::Date.matches("2023-02-29"));
        assert!(!StringFormat::Date.matches("2024-2-9"));

        assert!(StringFormat::Time.matches("23:59:59"));
        assert!(StringFormat::Time.matches("08:30:00.250Z"));
        assert!(StringFormat::Time.matches("08:30:00+02:00"));
        assert!(!StringFormat::Time.matches("24:00:00"));
        assert!(!StringFormat::Time.matches("8:30"));

        assert!(StringFormat::DateTime.matches("1985-04-12T23:20:50.52Z"));
        assert!(!StringFormat::DateTime.matches("1985-04-12"));

        assert!(StringFormat::Uuid.matches("123e4567-e89b-12d3-a456-426614174000"));
        assert!(!StringFormat::Uuid.matches("123e4567e89b12d3a456426614174000"));

        assert!(StringFormat::Email.matches("john@example.com"));
        assert!(!StringFormat::Email.matches("john@example"));

        assert!(StringFormat::Base64.matches("aGVsbG8="));
        assert!(StringFormat::Base64.matches(""));
        assert!(!StringFormat::Base64.matches("aGVsbG8"));
    }

    #[test]
    fn pattern_flags() {
        let pattern = Pattern::new("^ab+c$", "i").unwrap();
        assert!(StringFormat::Pattern(pattern).matches("ABBC"));

        let pattern = Pattern::new("b", "g").unwrap();
        assert!(pattern.regex().is_match("abc"));

        assert!(matches!(
            Pattern::new("a", "q"),
            Err(PatternError::UnknownFlag('q'))
        ));
        assert!(matches!(Pattern::new("(", ""), Err(PatternError::Regex(_))));
    }

    #[test]
    fn pattern_equality_ignores_compiled_form() {
        assert_eq!(
            Pattern::new("a+", "i").unwrap(),
            Pattern::new("a+", "i").unwrap()
        );
        assert_ne!(
            Pattern::new("a+", "i").unwrap(),
            Pattern::new("a+", "").unwrap()
        );
    }
}
