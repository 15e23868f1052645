//! A compact schema language for JSON-like data.
//!
//! Schemas are written in a small textual notation, parsed into a
//! [`Schema`] tree, and checked against [`Value`]s:
//!
//! ```
//! use jshape::{validate, Schema, Value};
//! use serde_json::json;
//!
//! let schema: Schema = "{ name: string, age: integer(>= 0), tags?: string[] }"
//!     .parse()
//!     .unwrap();
//!
//! let person = Value::from(json!({ "name": "Ada", "age": 36 }));
//! assert!(validate(&person, &schema).is_ok());
//!
//! let issues = validate(&Value::from(json!({ "name": "Ada" })), &schema).unwrap_err();
//! assert_eq!("/age: missing key", issues[0].to_string());
//! ```
//!
//! Values may be cyclic; schemas may be recursive through `this`, `root`
//! and named members of a `group`.

mod bounds;
mod error;
mod form;
mod lexer;
mod parser;
mod schema;
mod serde_schema;
mod validate;
mod value;

pub use bounds::*;
pub use error::*;
pub use form::*;
pub use lexer::{tokenize, Keyword, Token, TokenKind};
pub use parser::parse;
pub use schema::*;
pub use serde_schema::*;
pub use validate::*;
pub use value::*;
