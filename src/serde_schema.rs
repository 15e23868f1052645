use crate::bounds::Bounds;
use crate::error::SerdeConvertError;
use crate::form::{
    Elements, Fields, Form, Group, Literal, Pattern, Record, StringFormat, StringSchema, Tuple,
};
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON representation of schemas, compatible with `serde_json`.
///
/// To convert this into a [`Schema`][`crate::Schema`], see
/// [`Schema::from_serde`][`crate::Schema::from_serde`].
///
/// ```
/// use jshape::SerdeSchema;
/// use serde_json::json;
///
/// assert_eq!(
///     SerdeSchema { kind: "integer".to_owned(), min: Some(1.0), ..Default::default() },
///     serde_json::from_value::<SerdeSchema>(json!({ "kind": "integer", "min": 1 })).unwrap()
/// )
/// ```
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct SerdeSchema {
    pub kind: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xmin: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xmax: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub of: Option<SerdeOf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SerdeSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<Box<SerdeSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Box<SerdeSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<IndexMap<String, SerdeSchema>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// `of` names a string format for strings, and holds the element or value
/// schema for arrays and records.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum SerdeOf {
    Format(String),
    Schema(Box<SerdeSchema>),
}

impl SerdeSchema {
    fn set_bounds(&mut self, bounds: Bounds) {
        self.min = bounds.min;
        self.xmin = bounds.xmin;
        self.max = bounds.max;
        self.xmax = bounds.xmax;
        self.exact = bounds.exact;
    }

    fn bounds(&self) -> Bounds {
        Bounds {
            min: self.min,
            xmin: self.xmin,
            max: self.max,
            xmax: self.xmax,
            exact: self.exact,
        }
    }
}

fn fields_into_serde(fields: Fields) -> Option<IndexMap<String, SerdeSchema>> {
    Some(fields.into_iter().map(|(k, v)| (k, v.into())).collect())
}

/// Literal numbers with no fractional part are written as JSON integers.
fn literal_into_json(literal: Literal) -> Value {
    match literal {
        Literal::Boolean(b) => Value::Bool(b),
        Literal::Number(n) if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 => {
            Value::from(n as i64)
        }
        Literal::Number(n) => serde_json::Number::from_f64(n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Literal::String(s) => Value::String(s),
    }
}

impl From<Schema> for SerdeSchema {
    fn from(schema: Schema) -> SerdeSchema {
        let mut out = SerdeSchema {
            kind: schema.kind().to_owned(),
            description: schema.description,
            ..Default::default()
        };

        if schema.optional {
            out.optional = Some(true);
        }

        match schema.form {
            Form::Null | Form::Any | Form::Boolean | Form::Root | Form::This => {}
            Form::Integer(bounds) | Form::Number(bounds) => out.set_bounds(bounds),
            Form::String(StringSchema { format, bounds }) => {
                match format {
                    Some(StringFormat::Pattern(pattern)) => {
                        out.pattern = Some(pattern.source);
                        if !pattern.flags.is_empty() {
                            out.flags = Some(pattern.flags);
                        }
                    }
                    Some(format) => out.of = Some(SerdeOf::Format(format.name().to_owned())),
                    None => {}
                }

                out.set_bounds(bounds);
            }
            Form::Literal(literal) => out.value = Some(literal_into_json(literal)),
            Form::Array(Elements { schema, bounds }) => {
                out.of = Some(SerdeOf::Schema(Box::new((*schema).into())));
                out.set_bounds(bounds);
            }
            Form::Tuple(Tuple { items, rest }) => {
                out.items = Some(items.into_iter().map(Into::into).collect());
                out.rest = rest.map(|rest| Box::new(Schema::new(Form::Array(rest)).into()));
            }
            Form::Record(Record {
                key,
                schema,
                bounds,
            }) => {
                out.key = key.map(|key| Box::new(Schema::new(Form::String(key)).into()));
                out.of = Some(SerdeOf::Schema(Box::new((*schema).into())));
                out.set_bounds(bounds);
            }
            Form::Union(alternatives) => {
                out.items = Some(alternatives.into_iter().map(Into::into).collect());
            }
            Form::Object(fields) | Form::Model(fields) => out.fields = fields_into_serde(fields),
            Form::Group(Group { members, selected }) => {
                out.fields = fields_into_serde(members);
                out.selected = selected;
            }
            Form::Ref(name) => out.name = Some(name),
        }

        out
    }
}

impl Schema {
    /// Converts the interchange form back into a schema tree.
    ///
    /// Members that do not apply to the given kind are ignored.
    pub fn from_serde(serde_schema: SerdeSchema) -> Result<Self, SerdeConvertError> {
        let bounds = serde_schema.bounds();
        let SerdeSchema {
            kind,
            optional,
            description,
            of,
            pattern,
            flags,
            value,
            items,
            rest,
            key,
            fields,
            selected,
            name,
            ..
        } = serde_schema;

        let form = match kind.as_str() {
            "null" => Form::Null,
            "any" => Form::Any,
            "boolean" => Form::Boolean,
            "root" => Form::Root,
            "this" => Form::This,
            "integer" => Form::Integer(bounds),
            "number" => Form::Number(bounds),
            "string" => {
                let format = match (of, pattern) {
                    (_, Some(pattern)) => Some(StringFormat::Pattern(Pattern::new(
                        &pattern,
                        flags.as_deref().unwrap_or_default(),
                    )?)),
                    (Some(SerdeOf::Format(name)), None) => Some(
                        name.parse()
                            .map_err(|_| SerdeConvertError::UnknownFormat(name))?,
                    ),
                    (Some(SerdeOf::Schema(_)), None) => {
                        return Err(SerdeConvertError::Missing {
                            kind: "string",
                            member: "of",
                        })
                    }
                    (None, None) => None,
                };

                Form::String(StringSchema { format, bounds })
            }
            "literal" => Form::Literal(match value {
                Some(Value::Bool(b)) => Literal::Boolean(b),
                Some(Value::Number(n)) => {
                    Literal::Number(n.as_f64().ok_or(SerdeConvertError::InvalidLiteral)?)
                }
                Some(Value::String(s)) => Literal::String(s),
                _ => return Err(SerdeConvertError::InvalidLiteral),
            }),
            "array" => Form::Array(Elements {
                schema: Box::new(of_schema("array", of)?),
                bounds,
            }),
            "tuple" => {
                let rest = match rest {
                    Some(rest) => match Schema::from_serde(*rest)?.form {
                        Form::Array(elements) => Some(elements),
                        _ => return Err(SerdeConvertError::RestNotArray),
                    },
                    None => None,
                };

                Form::Tuple(Tuple {
                    items: from_serde_all(items.unwrap_or_default())?,
                    rest,
                })
            }
            "record" => {
                let key = match key {
                    Some(key) => match Schema::from_serde(*key)?.form {
                        Form::String(key) => Some(key),
                        _ => return Err(SerdeConvertError::KeyNotString),
                    },
                    None => None,
                };

                Form::Record(Record {
                    key,
                    schema: Box::new(of_schema("record", of)?),
                    bounds,
                })
            }
            "union" => Form::Union(from_serde_all(items.ok_or(SerdeConvertError::Missing {
                kind: "union",
                member: "items",
            })?)?),
            "object" => Form::Object(from_serde_fields("object", fields)?),
            "model" => Form::Model(from_serde_fields("model", fields)?),
            "group" => {
                let members = from_serde_fields("group", fields)?;
                if let Some(selected) = &selected {
                    if !members.contains_key(selected) {
                        return Err(SerdeConvertError::UnknownSelected(selected.clone()));
                    }
                }

                Form::Group(Group { members, selected })
            }
            "ref" => Form::Ref(name.ok_or(SerdeConvertError::Missing {
                kind: "ref",
                member: "name",
            })?),
            _ => return Err(SerdeConvertError::UnknownKind(kind)),
        };

        Ok(Schema {
            optional: optional.unwrap_or(false),
            description,
            form,
        })
    }
}

fn of_schema(kind: &'static str, of: Option<SerdeOf>) -> Result<Schema, SerdeConvertError> {
    match of {
        Some(SerdeOf::Schema(schema)) => Schema::from_serde(*schema),
        _ => Err(SerdeConvertError::Missing { kind, member: "of" }),
    }
}

fn from_serde_all(schemas: Vec<SerdeSchema>) -> Result<Vec<Schema>, SerdeConvertError> {
    schemas.into_iter().map(Schema::from_serde).collect()
}

fn from_serde_fields(
    kind: &'static str,
    fields: Option<IndexMap<String, SerdeSchema>>,
) -> Result<Fields, SerdeConvertError> {
    fields
        .ok_or(SerdeConvertError::Missing {
            kind,
            member: "fields",
        })?
        .into_iter()
        .map(|(k, v)| Ok((k, Schema::from_serde(v)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serialize_partial() {
        // Unset members are not serialized.
        assert_eq!(
            "{\"kind\":\"ref\",\"name\":\"foo\"}",
            serde_json::to_string(&SerdeSchema {
                kind: "ref".to_owned(),
                name: Some("foo".to_owned()),
                ..Default::default()
            })
            .unwrap()
        );
    }

    #[test]
    fn parse_unknown_member() {
        assert!(serde_json::from_value::<SerdeSchema>(json!({
            "kind": "integer",
            "minimum": 1,
        }))
        .is_err());
    }

    #[test]
    fn from_parsed() {
        let schema: Schema = "integer(>= -10, < 20)".parse().unwrap();
        assert_eq!(
            json!({ "kind": "integer", "min": -10.0, "xmax": 20.0 }),
            serde_json::to_value(SerdeSchema::from(schema)).unwrap()
        );

        let schema: Schema = "record<date, any>".parse().unwrap();
        assert_eq!(
            json!({
                "kind": "record",
                "key": { "kind": "string", "of": "date" },
                "of": { "kind": "any" },
            }),
            serde_json::to_value(SerdeSchema::from(schema)).unwrap()
        );

        let schema: Schema = "{ a?: /x+/i, b: [1, ...'b'[]] }".parse().unwrap();
        assert_eq!(
            json!({
                "kind": "object",
                "fields": {
                    "a": { "kind": "string", "optional": true, "pattern": "x+", "flags": "i" },
                    "b": {
                        "kind": "tuple",
                        "items": [{ "kind": "literal", "value": 1 }],
                        "rest": { "kind": "array", "of": { "kind": "literal", "value": "b" } },
                    },
                },
            }),
            serde_json::to_value(SerdeSchema::from(schema)).unwrap()
        );
    }

    #[test]
    fn into_parsed() {
        let serde_schema: SerdeSchema = serde_json::from_value(json!({
            "kind": "select",
            "fields": {},
        }))
        .unwrap();
        assert!(matches!(
            Schema::from_serde(serde_schema),
            Err(SerdeConvertError::UnknownKind(kind)) if kind == "select"
        ));

        let serde_schema: SerdeSchema = serde_json::from_value(json!({
            "kind": "group",
            "selected": "node",
            "fields": {
                "node": {
                    "kind": "model",
                    "fields": { "next": { "kind": "ref", "name": "node" } },
                },
            },
        }))
        .unwrap();
        assert_eq!(
            "select node of group { node: model { next: node } }"
                .parse::<Schema>()
                .unwrap(),
            Schema::from_serde(serde_schema).unwrap()
        );
    }

    #[test]
    fn conversion_errors() {
        fn convert(json: serde_json::Value) -> SerdeConvertError {
            Schema::from_serde(serde_json::from_value(json).unwrap()).unwrap_err()
        }

        assert!(matches!(
            convert(json!({ "kind": "string", "of": "colour" })),
            SerdeConvertError::UnknownFormat(name) if name == "colour"
        ));
        assert!(matches!(
            convert(json!({ "kind": "string", "pattern": "a", "flags": "x" })),
            SerdeConvertError::Pattern(_)
        ));
        assert!(matches!(
            convert(json!({ "kind": "array" })),
            SerdeConvertError::Missing { kind: "array", member: "of" }
        ));
        assert!(matches!(
            convert(json!({ "kind": "literal", "value": null })),
            SerdeConvertError::InvalidLiteral
        ));
        assert!(matches!(
            convert(json!({
                "kind": "record",
                "key": { "kind": "integer" },
                "of": { "kind": "any" },
            })),
            SerdeConvertError::KeyNotString
        ));
        assert!(matches!(
            convert(json!({ "kind": "tuple", "items": [], "rest": { "kind": "any" } })),
            SerdeConvertError::RestNotArray
        ));
        assert!(matches!(
            convert(json!({
                "kind": "group",
                "selected": "b",
                "fields": { "a": { "kind": "null" } },
            })),
            SerdeConvertError::UnknownSelected(name) if name == "b"
        ));
    }

    #[test]
    fn from_scalars() {
        assert_roundtrip_from_serde_into(json!({ "kind": "null" }));
        assert_roundtrip_from_serde_into(json!({ "kind": "any", "description": "anything" }));
        assert_roundtrip_from_serde_into(json!({ "kind": "boolean", "optional": true }));
        assert_roundtrip_from_serde_into(json!({ "kind": "number", "xmin": 0, "max": 1.5 }));
        assert_roundtrip_from_serde_into(json!({ "kind": "literal", "value": 2.5 }));
        assert_roundtrip_from_serde_into(json!({ "kind": "literal", "value": true }));
        assert_roundtrip_from_serde_into(json!({ "kind": "string", "of": "uuid", "exact": 36 }));
    }

    #[test]
    fn from_containers() {
        assert_roundtrip_from_serde_into(json!({
            "kind": "array",
            "of": { "kind": "this" },
            "max": 3,
        }));
        assert_roundtrip_from_serde_into(json!({
            "kind": "tuple",
            "items": [{ "kind": "string" }],
            "rest": { "kind": "array", "of": { "kind": "integer" }, "min": 1 },
        }));
        assert_roundtrip_from_serde_into(json!({
            "kind": "record",
            "of": { "kind": "root" },
        }));
        assert_roundtrip_from_serde_into(json!({
            "kind": "union",
            "items": [{ "kind": "null" }, { "kind": "string", "pattern": "^a" }],
        }));
        assert_roundtrip_from_serde_into(json!({
            "kind": "model",
            "fields": { "z": { "kind": "any" }, "a": { "kind": "any", "optional": true } },
        }));
        assert_roundtrip_from_serde_into(json!({
            "kind": "group",
            "fields": { "a": { "kind": "ref", "name": "a" } },
        }));
    }

    fn assert_roundtrip_from_serde_into(json: serde_json::Value) {
        let serde_schema: SerdeSchema = serde_json::from_value(json).unwrap();
        let schema = Schema::from_serde(serde_schema.clone()).unwrap();

        assert_eq!(serde_schema, schema.into());
    }
}
