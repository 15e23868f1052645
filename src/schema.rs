use crate::error::ParseError;
use crate::form::Form;
use std::str::FromStr;

/// One node of a schema tree.
///
/// Trees are immutable once built and hold no back-pointers: `this`, `root`
/// and `ref` nodes are resolved at validation time, so a tree can be shared
/// freely, including across threads.
#[derive(Clone, Debug, PartialEq)]
pub struct Schema {
    /// Only meaningful for a schema that is a field of an object, model or
    /// group.
    pub optional: bool,

    /// Free text for tooling. Ignored by validation.
    pub description: Option<String>,

    pub form: Form,
}

impl Schema {
    pub fn new(form: Form) -> Self {
        Self {
            optional: false,
            description: None,
            form,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn kind(&self) -> &'static str {
        self.form.kind()
    }
}

impl From<Form> for Schema {
    fn from(form: Form) -> Self {
        Self::new(form)
    }
}

impl FromStr for Schema {
    type Err = ParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        crate::parser::parse(source).map_err(ParseError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::Bounds;

    #[test]
    fn from_str() {
        assert_eq!(
            Ok(Schema::new(Form::Integer(Bounds::new().with_min(1.0)))),
            "integer(>= 1)".parse::<Schema>()
        );

        let err = "integer(".parse::<Schema>().unwrap_err();
        assert_eq!(1, err.0.len());
        assert!(err.to_string().starts_with("invalid schema: "));
    }

    #[test]
    fn attributes_do_not_change_kind() {
        let schema = Schema::new(Form::Boolean).optional().describe("a flag");
        assert!(schema.optional);
        assert_eq!(Some("a flag"), schema.description.as_deref());
        assert_eq!("boolean", schema.kind());
    }
}
