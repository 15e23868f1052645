//! Recursive-descent parser from schema source to a `Schema` tree.
//!
//! Every invalid token is reported up front. Past that, the first issue
//! aborts the parse: no partial tree is ever returned.

use crate::bounds::Bounds;
use crate::error::ParseIssue;
use crate::form::{
    Elements, Fields, Form, Group, Literal, Pattern, Record, StringFormat, StringSchema, Tuple,
};
use crate::lexer::{self, Keyword, Token, TokenKind};
use crate::schema::Schema;

type Result<T> = std::result::Result<T, ParseIssue>;

/// How many schemas may enclose one another before the parse gives up.
const MAX_NESTING: usize = 128;

pub fn parse(source: &str) -> std::result::Result<Schema, Vec<ParseIssue>> {
    let tokens = lexer::tokenize(source);
    tracing::debug!(tokens = tokens.len(), "parsing schema");

    let lexical: Vec<_> = tokens
        .iter()
        .filter(|token| token.kind.is_invalid())
        .map(|token| ParseIssue::new(token, format!("{}", token)))
        .collect();

    if !lexical.is_empty() {
        tracing::debug!(issues = lexical.len(), "schema rejected by tokenizer");
        return Err(lexical);
    }

    let mut parser = Parser {
        tokens,
        cursor: 0,
        marks: Vec::new(),
        namespaces: Vec::new(),
        nesting: 0,
    };

    parser.document().map_err(|issue| {
        tracing::debug!(%issue, "schema rejected by parser");
        vec![issue]
    })
}

/// Which numeric tokens a bound or size accepts.
#[derive(Clone, Copy)]
enum NumberClass {
    Size,
    Whole,
    Any,
}

impl NumberClass {
    fn accepts(self, kind: TokenKind) -> bool {
        match self {
            NumberClass::Size => kind == TokenKind::Natural,
            NumberClass::Whole => matches!(kind, TokenKind::Natural | TokenKind::Integer),
            NumberClass::Any => kind.is_number(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            NumberClass::Size => "a natural number",
            NumberClass::Whole => "an integer",
            NumberClass::Any => "a number",
        }
    }
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    marks: Vec<usize>,
    /// One entry per enclosing `group` body: the refs seen inside it, checked
    /// against its members once the body is closed.
    namespaces: Vec<Vec<Token>>,
    /// Enclosing `schema` calls: every nested construct passes through one.
    nesting: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        // The token list always ends with Eof, which is never consumed.
        &self.tokens[self.cursor.min(self.tokens.len() - 1)]
    }

    fn next(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.cursor += 1;
        }
        token
    }

    fn accept(&mut self, kind: TokenKind) -> Option<Token> {
        if self.peek().kind == kind {
            Some(self.next())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        match self.accept(kind) {
            Some(token) => Ok(token),
            None => Err(self.expected(&kind.to_string())),
        }
    }

    fn expected(&self, what: &str) -> ParseIssue {
        let found = self.peek();
        ParseIssue::new(found, format!("expected {}, found {}", what, found))
    }

    fn mark(&mut self) {
        self.marks.push(self.cursor);
    }

    fn commit(&mut self) {
        self.marks.pop();
    }

    fn rollback(&mut self) {
        if let Some(cursor) = self.marks.pop() {
            self.cursor = cursor;
        }
    }

    fn document(&mut self) -> Result<Schema> {
        let schema = self.schema()?;
        self.expect(TokenKind::Eof)?;
        Ok(schema)
    }

    fn schema(&mut self) -> Result<Schema> {
        if self.nesting == MAX_NESTING {
            return Err(ParseIssue::new(self.peek(), "schema nested too deeply"));
        }

        self.nesting += 1;
        let schema = self.union();
        self.nesting -= 1;
        schema
    }

    fn union(&mut self) -> Result<Schema> {
        let first = self.suffixed()?;
        if self.peek().kind != TokenKind::Pipe {
            return Ok(first);
        }

        let mut alternatives = vec![first];
        while self.accept(TokenKind::Pipe).is_some() {
            alternatives.push(self.suffixed()?);
        }

        Ok(Schema::new(Form::Union(alternatives)))
    }

    /// A primary schema followed by any number of `[...]` array suffixes.
    fn suffixed(&mut self) -> Result<Schema> {
        let mut schema = self.primary()?;

        while self.accept(TokenKind::LBracket).is_some() {
            let bounds = if self.peek().kind == TokenKind::RBracket {
                Bounds::new()
            } else {
                self.bounds(NumberClass::Size, true)?
            };
            self.expect(TokenKind::RBracket)?;

            schema = Schema::new(Form::Array(Elements {
                schema: Box::new(schema),
                bounds,
            }));
        }

        Ok(schema)
    }

    fn primary(&mut self) -> Result<Schema> {
        let token = self.next();

        let form = match token.kind {
            TokenKind::LParen => {
                let schema = self.schema()?;
                self.expect(TokenKind::RParen)?;
                return Ok(schema);
            }
            TokenKind::Keyword(Keyword::Null) => Form::Null,
            TokenKind::Keyword(Keyword::Any) => Form::Any,
            TokenKind::Keyword(Keyword::Boolean) => Form::Boolean,
            TokenKind::Keyword(Keyword::This) => Form::This,
            TokenKind::Keyword(Keyword::Root) => Form::Root,
            TokenKind::Keyword(Keyword::True) => Form::Literal(Literal::Boolean(true)),
            TokenKind::Keyword(Keyword::False) => Form::Literal(Literal::Boolean(false)),
            kind if kind.is_number() => Form::Literal(Literal::Number(number_value(&token)?)),
            TokenKind::String => Form::Literal(Literal::String(string_value(&token)?)),
            TokenKind::Identifier => {
                if let Some(refs) = self.namespaces.last_mut() {
                    refs.push(token.clone());
                }
                Form::Ref(token.text)
            }
            TokenKind::Keyword(Keyword::Integer) => {
                Form::Integer(self.numeric(NumberClass::Whole)?)
            }
            TokenKind::Keyword(Keyword::Number) => {
                Form::Number(self.numeric(NumberClass::Any)?)
            }
            TokenKind::Keyword(Keyword::String) => Form::String(self.string(None)?),
            TokenKind::Keyword(keyword @ Keyword::Date)
            | TokenKind::Keyword(keyword @ Keyword::Time)
            | TokenKind::Keyword(keyword @ Keyword::DateTime)
            | TokenKind::Keyword(keyword @ Keyword::Uuid)
            | TokenKind::Keyword(keyword @ Keyword::Email)
            | TokenKind::Keyword(keyword @ Keyword::Base64) => {
                let format = keyword.as_str().parse().map_err(|_| {
                    ParseIssue::new(&token, format!("unknown string format {}", token))
                })?;
                Form::String(self.string(Some(format))?)
            }
            TokenKind::Regex => {
                let format = StringFormat::Pattern(pattern(&token)?);
                Form::String(self.string(Some(format))?)
            }
            TokenKind::LBracket => self.tuple()?,
            TokenKind::Keyword(Keyword::Record) => Form::Record(self.record()?),
            TokenKind::LBrace => Form::Object(self.fields()?),
            TokenKind::Keyword(Keyword::Model) => {
                self.expect(TokenKind::LBrace)?;
                Form::Model(self.fields()?)
            }
            TokenKind::Keyword(Keyword::Group) => {
                self.expect(TokenKind::LBrace)?;
                Form::Group(Group {
                    members: self.namespace()?,
                    selected: None,
                })
            }
            TokenKind::Keyword(Keyword::Select) => Form::Group(self.select()?),
            _ => {
                return Err(ParseIssue::new(
                    &token,
                    format!("expected a schema, found {}", token),
                ))
            }
        };

        Ok(Schema::new(form))
    }

    /// Optional `( comparator N [, comparator N] )` after `integer`/`number`.
    fn numeric(&mut self, class: NumberClass) -> Result<Bounds> {
        if self.accept(TokenKind::LParen).is_none() {
            return Ok(Bounds::new());
        }

        let bounds = self.bounds(class, false)?;
        self.expect(TokenKind::RParen)?;
        Ok(bounds)
    }

    /// Optional size bounds after a string, format or regex.
    fn string(&mut self, format: Option<StringFormat>) -> Result<StringSchema> {
        Ok(StringSchema {
            format,
            bounds: self.sizes()?,
        })
    }

    fn sizes(&mut self) -> Result<Bounds> {
        if self.accept(TokenKind::LParen).is_none() {
            return Ok(Bounds::new());
        }

        let bounds = self.bounds(NumberClass::Size, true)?;
        self.expect(TokenKind::RParen)?;
        Ok(bounds)
    }

    /// `= N`, or one or two comparator clauses separated by a comma.
    fn bounds(&mut self, class: NumberClass, exact: bool) -> Result<Bounds> {
        let mut bounds = Bounds::new();

        if exact && self.accept(TokenKind::Equals).is_some() {
            bounds.exact = Some(self.number(class)?);
            return Ok(bounds);
        }

        self.bound(&mut bounds, class, exact)?;
        if self.accept(TokenKind::Comma).is_some() {
            self.bound(&mut bounds, class, false)?;
        }

        Ok(bounds)
    }

    fn bound(&mut self, bounds: &mut Bounds, class: NumberClass, exact: bool) -> Result<()> {
        let comparator = self.peek().clone();
        let lower = match comparator.kind {
            TokenKind::Greater | TokenKind::GreaterEqual => true,
            TokenKind::Less | TokenKind::LessEqual => false,
            _ if exact => return Err(self.expected("'=' or a comparator")),
            _ => return Err(self.expected("a comparator")),
        };
        self.next();

        if (lower && bounds.has_lower()) || (!lower && bounds.has_upper()) {
            return Err(ParseIssue::new(
                &comparator,
                format!(
                    "{} bound is already set",
                    if lower { "lower" } else { "upper" }
                ),
            ));
        }

        let n = self.number(class)?;
        match comparator.kind {
            TokenKind::Greater => bounds.xmin = Some(n),
            TokenKind::GreaterEqual => bounds.min = Some(n),
            TokenKind::Less => bounds.xmax = Some(n),
            _ => bounds.max = Some(n),
        }

        Ok(())
    }

    fn number(&mut self, class: NumberClass) -> Result<f64> {
        if !class.accepts(self.peek().kind) {
            return Err(self.expected(class.describe()));
        }

        let token = self.next();
        number_value(&token)
    }

    /// The rest of `[ ... ]` once the opening bracket is consumed.
    fn tuple(&mut self) -> Result<Form> {
        let mut items = Vec::new();
        let mut rest = None;

        if self.accept(TokenKind::RBracket).is_some() {
            return Ok(Form::Tuple(Tuple { items, rest }));
        }

        loop {
            if self.accept(TokenKind::Ellipsis).is_some() {
                let start = self.peek().clone();
                match self.schema()?.form {
                    Form::Array(elements) => rest = Some(elements),
                    _ => return Err(ParseIssue::new(&start, "rest must be an array schema")),
                }
                self.expect(TokenKind::RBracket)?;
                break;
            }

            items.push(self.schema()?);

            if self.accept(TokenKind::Comma).is_none() {
                self.expect(TokenKind::RBracket)?;
                break;
            }
        }

        match rest {
            Some(elements) if items.is_empty() => Ok(Form::Array(elements)),
            rest => Ok(Form::Tuple(Tuple { items, rest })),
        }
    }

    /// `< [key ,] value >` and optional size bounds, after `record`.
    fn record(&mut self) -> Result<Record> {
        self.expect(TokenKind::Less)?;

        let start = self.peek().clone();
        let first = self.schema()?;

        let (key, schema) = if self.accept(TokenKind::Comma).is_some() {
            let key = match first.form {
                Form::String(key) => key,
                _ => {
                    return Err(ParseIssue::new(
                        &start,
                        "record key must be a string schema",
                    ))
                }
            };
            (Some(key), self.schema()?)
        } else {
            (None, first)
        };

        self.expect(TokenKind::Greater)?;

        Ok(Record {
            key,
            schema: Box::new(schema),
            bounds: self.sizes()?,
        })
    }

    /// `select NAME of group { ... }`, after `select`.
    fn select(&mut self) -> Result<Group> {
        let name = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Keyword(Keyword::Of))?;
        self.expect(TokenKind::Keyword(Keyword::Group))?;
        self.expect(TokenKind::LBrace)?;

        let members = self.namespace()?;
        if !members.contains_key(&name.text) {
            return Err(ParseIssue::new(
                &name,
                format!("selected member '{}' is not defined in the group", name.text),
            ));
        }

        Ok(Group {
            members,
            selected: Some(name.text),
        })
    }

    /// A group body: fields that also form the namespace for refs inside them.
    fn namespace(&mut self) -> Result<Fields> {
        self.namespaces.push(Vec::new());
        let fields = self.fields();
        let refs = self.namespaces.pop().unwrap_or_default();
        let fields = fields?;

        if let Some(unresolved) = refs.iter().find(|r| !fields.contains_key(&r.text)) {
            return Err(ParseIssue::new(
                unresolved,
                format!("unresolved reference '{}'", unresolved.text),
            ));
        }

        Ok(fields)
    }

    /// Field declarations up to and including the closing brace.
    fn fields(&mut self) -> Result<Fields> {
        let mut fields = Fields::new();

        while self.accept(TokenKind::RBrace).is_none() {
            let (token, name, optional) = self.field_name()?;

            let mut schema = self.schema()?;
            schema.optional = optional;

            if fields.contains_key(&name) {
                return Err(ParseIssue::new(
                    &token,
                    format!("duplicate field '{}'", name),
                ));
            }
            fields.insert(name, schema);

            self.accept(TokenKind::Comma);
        }

        Ok(fields)
    }

    /// A field name and its `:` or `?:` separator. Names may be identifiers,
    /// keywords or string literals.
    fn field_name(&mut self) -> Result<(Token, String, bool)> {
        self.mark();

        let token = self.next();
        let name = match token.kind {
            TokenKind::Identifier | TokenKind::Keyword(_) => Some(token.text.clone()),
            TokenKind::String => lexer::unescape(&token.text),
            _ => None,
        };

        let name = match name {
            Some(name) => name,
            None => {
                self.rollback();
                return Err(self.expected("a field name or '}'"));
            }
        };
        self.commit();

        let optional = match self.peek().kind {
            TokenKind::Colon => false,
            TokenKind::QuestionColon => true,
            _ => return Err(self.expected("':' or '?:'")),
        };
        self.next();

        Ok((token, name, optional))
    }
}

fn number_value(token: &Token) -> Result<f64> {
    token
        .text
        .parse()
        .map_err(|_| ParseIssue::new(token, format!("malformed number {}", token)))
}

fn string_value(token: &Token) -> Result<String> {
    lexer::unescape(&token.text)
        .ok_or_else(|| ParseIssue::new(token, format!("malformed string {}", token)))
}

fn pattern(token: &Token) -> Result<Pattern> {
    let (source, flags) = lexer::split_regex(&token.text)
        .ok_or_else(|| ParseIssue::new(token, format!("malformed regex {}", token)))?;

    Pattern::new(source, flags)
        .map_err(|err| ParseIssue::new(token, format!("invalid regular expression: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(source: &str) -> Schema {
        match parse(source) {
            Ok(schema) => schema,
            Err(issues) => panic!("{}: {:?}", source, issues),
        }
    }

    fn err(source: &str) -> Vec<String> {
        parse(source)
            .expect_err(source)
            .into_iter()
            .map(|issue| issue.message)
            .collect()
    }

    fn string(format: Option<StringFormat>, bounds: Bounds) -> Schema {
        Schema::new(Form::String(StringSchema { format, bounds }))
    }

    fn array(schema: Schema, bounds: Bounds) -> Schema {
        Schema::new(Form::Array(Elements {
            schema: Box::new(schema),
            bounds,
        }))
    }

    #[test]
    fn simple_kinds() {
        assert_eq!(Schema::new(Form::Null), ok("null"));
        assert_eq!(Schema::new(Form::Any), ok(" any "));
        assert_eq!(Schema::new(Form::Boolean), ok("boolean"));
        assert_eq!(Schema::new(Form::This), ok("this"));
        assert_eq!(Schema::new(Form::Root), ok("root"));
        assert_eq!(Schema::new(Form::Ref("Node".to_owned())), ok("Node"));
        assert_eq!(Schema::new(Form::Any), ok("((any))"));
    }

    #[test]
    fn literals() {
        assert_eq!(Schema::new(Form::Literal(Literal::Boolean(false))), ok("false"));
        assert_eq!(Schema::new(Form::Literal(Literal::Number(-2.5))), ok("-2.5"));
        assert_eq!(Schema::new(Form::Literal(Literal::Number(42.0))), ok("42"));
        assert_eq!(
            Schema::new(Form::Literal(Literal::String("it's".to_owned()))),
            ok(r"'it\'s'")
        );
    }

    #[test]
    fn numeric_bounds() {
        assert_eq!(
            Schema::new(Form::Integer(Bounds::new().with_min(-10.0).with_xmax(20.0))),
            ok("integer(>= -10, < 20)")
        );
        assert_eq!(
            Schema::new(Form::Number(Bounds::new().with_xmin(0.5).with_max(1e3))),
            ok("number(<= 1e3, > 0.5)")
        );
        assert_eq!(Schema::new(Form::Integer(Bounds::new())), ok("integer"));

        assert_eq!(vec!["expected an integer, found real number 1.5"], err("integer(> 1.5)"));
        assert_eq!(vec!["lower bound is already set"], err("integer(>= 1, > 2)"));
        assert_eq!(vec!["expected a comparator, found '='"], err("number(= 3)"));
        assert_eq!(vec!["expected ')', found end of input"], err("integer(> 1"));
    }

    #[test]
    fn strings_and_formats() {
        assert_eq!(string(None, Bounds::exactly(3.0)), ok("string(= 3)"));
        assert_eq!(
            string(Some(StringFormat::Uuid), Bounds::new()),
            ok("uuid")
        );
        assert_eq!(
            string(Some(StringFormat::Date), Bounds::new().with_min(1.0).with_max(10.0)),
            ok("date(>= 1, <= 10)")
        );

        let schema = ok("/^[a-z]+$/i(< 8)");
        match &schema.form {
            Form::String(StringSchema {
                format: Some(StringFormat::Pattern(pattern)),
                bounds,
            }) => {
                assert_eq!(("^[a-z]+$", "i"), (pattern.source.as_str(), pattern.flags.as_str()));
                assert_eq!(Bounds::new().with_xmax(8.0), *bounds);
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(vec!["expected a natural number, found integer -1"], err("string(>= -1)"));
        assert!(err("/(/")[0].starts_with("invalid regular expression"));
        assert_eq!(vec!["invalid regular expression: unsupported regex flag 'z'"], err("/a/z"));
    }

    #[test]
    fn arrays() {
        assert_eq!(array(Schema::new(Form::Any), Bounds::new()), ok("any[]"));
        assert_eq!(
            array(
                array(Schema::new(Form::Boolean), Bounds::exactly(2.0)),
                Bounds::new().with_min(1.0)
            ),
            ok("boolean[= 2][>= 1]")
        );
        assert_eq!(
            array(
                Schema::new(Form::Union(vec![
                    Schema::new(Form::Null),
                    Schema::new(Form::Boolean)
                ])),
                Bounds::new()
            ),
            ok("(null | boolean)[]")
        );
    }

    #[test]
    fn tuples() {
        assert_eq!(ok("any[]"), ok("[...any[]]"));
        assert_eq!(
            array(Schema::new(Form::Null), Bounds::new().with_max(3.0)),
            ok("[...null[<= 3]]")
        );

        assert_eq!(
            Schema::new(Form::Tuple(Tuple {
                items: vec![Schema::new(Form::Null), Schema::new(Form::Boolean)],
                rest: Some(Elements {
                    schema: Box::new(Schema::new(Form::Any)),
                    bounds: Bounds::new(),
                }),
            })),
            ok("[null, boolean, ...any[]]")
        );

        assert_eq!(
            Schema::new(Form::Tuple(Tuple {
                items: vec![],
                rest: None,
            })),
            ok("[]")
        );

        assert_eq!(vec!["rest must be an array schema"], err("[null, ...any]"));
        assert_eq!(vec!["expected ']', found ','"], err("[...any[], null]"));
    }

    #[test]
    fn records() {
        assert_eq!(
            Schema::new(Form::Record(Record {
                key: Some(StringSchema {
                    format: Some(StringFormat::Date),
                    bounds: Bounds::new(),
                }),
                schema: Box::new(Schema::new(Form::Any)),
                bounds: Bounds::new(),
            })),
            ok("record<date, any>")
        );

        assert_eq!(
            Schema::new(Form::Record(Record {
                key: None,
                schema: Box::new(Schema::new(Form::Integer(Bounds::new().with_min(0.0)))),
                bounds: Bounds::new().with_xmax(5.0),
            })),
            ok("record<integer(>= 0)>(< 5)")
        );

        assert_eq!(vec!["record key must be a string schema"], err("record<integer, any>"));
    }

    #[test]
    fn objects() {
        let schema = ok("{ name: string, 'first-name'?: string age: integer, null: null }");
        let fields = match schema.form {
            Form::Object(fields) => fields,
            other => panic!("unexpected {:?}", other),
        };

        assert_eq!(
            vec!["name", "first-name", "age", "null"],
            fields.keys().collect::<Vec<_>>()
        );
        assert!(!fields["name"].optional);
        assert!(fields["first-name"].optional);
        assert_eq!(Schema::new(Form::Object(Fields::new())), ok("{}"));

        assert_eq!(vec!["duplicate field 'a'"], err("{ a: null, a: any }"));
        assert_eq!(vec!["expected ':' or '?:', found 'string'"], err("{ a string }"));
        assert_eq!(vec!["expected a field name or '}', found ','"], err("{ , }"));
    }

    #[test]
    fn models_and_groups() {
        let schema = ok("model { value: integer, next?: root }");
        assert!(matches!(schema.form, Form::Model(ref fields) if fields["next"].optional));

        let schema = ok("select tree of group { tree: { children: node[] }, node: tree }");
        match schema.form {
            Form::Group(Group { members, selected }) => {
                assert_eq!(Some("tree".to_owned()), selected);
                assert_eq!(vec!["tree", "node"], members.keys().collect::<Vec<_>>());
            }
            other => panic!("unexpected {:?}", other),
        }

        let schema = ok("group { a: integer, b: a }");
        assert!(matches!(schema.form, Form::Group(Group { selected: None, .. })));

        assert_eq!(
            vec!["selected member 'x' is not defined in the group"],
            err("select x of group { a: any }")
        );
        assert_eq!(
            vec!["unresolved reference 'c'"],
            err("group { a: integer, b: c }")
        );
        assert_eq!(
            vec!["unresolved reference 'a'"],
            err("group { a: integer, b: group { c: a } }")
        );
    }

    #[test]
    fn unions() {
        assert_eq!(
            Schema::new(Form::Union(vec![
                Schema::new(Form::Integer(Bounds::new().with_max(0.0))),
                Schema::new(Form::Literal(Literal::String("x".to_owned()))),
                array(Schema::new(Form::Null), Bounds::new()),
            ])),
            ok("integer(<= 0) | 'x' | null[]")
        );
    }

    #[test]
    fn issues_carry_tokens() {
        let issues = parse("{\n  a: string,\n  1: any\n}").unwrap_err();
        assert_eq!(1, issues.len());
        assert_eq!("1", issues[0].token.text);
        assert_eq!((3, 3), (issues[0].token.line, issues[0].token.column));
        assert_eq!(
            "expected a field name or '}', found natural number 1",
            issues[0].message
        );

        assert_eq!(vec!["expected end of input, found ']'"], err("any ]"));
        assert_eq!(vec!["expected a schema, found end of input"], err(""));
    }

    #[test]
    fn lexical_issues_reported_together() {
        let issues = parse("{ a: 'open, b: ? }").unwrap_err();
        assert_eq!(1, issues.len());

        let issues = parse("[1., /abc").unwrap_err();
        assert_eq!(
            vec![TokenKind::InvalidReal, TokenKind::InvalidRegex],
            issues.iter().map(|i| i.token.kind).collect::<Vec<_>>()
        );
    }

    #[test]
    fn nesting_is_bounded() {
        let nested = |depth: usize| format!("{}any{}", "(".repeat(depth), ")".repeat(depth));

        assert_eq!(ok("any"), ok(&nested(100)));
        assert_eq!(ok("any[]"), ok(&format!("{}[]", nested(100))));

        let issues = parse(&nested(200_000)).unwrap_err();
        assert_eq!(1, issues.len());
        assert_eq!("schema nested too deeply", issues[0].message);
        assert_eq!(TokenKind::LParen, issues[0].token.kind);

        let objects = format!("{}any{}", "{ a: ".repeat(500), " }".repeat(500));
        assert_eq!(
            "schema nested too deeply",
            parse(&objects).unwrap_err()[0].message
        );
    }
}
