//! Type expressions
//!
//! The textual form used in schemas: `int`, `float`, `str`, `bool`, `any`,
//! `list[T]`, `optional[T]`, `tuple[T, U, ...]`, or a record name.

use crate::error::{ConvcacheError, ConvcacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A data type a converter can be built for
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TypeExpr {
    Int,
    Float,
    Str,
    Bool,
    /// Any JSON value, passed through untouched
    Any,
    List(Box<TypeExpr>),
    Optional(Box<TypeExpr>),
    Tuple(Vec<TypeExpr>),
    /// A record defined in the schema
    Named(String),
}

impl TypeExpr {
    pub fn list(inner: TypeExpr) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn optional(inner: TypeExpr) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Record names referenced anywhere in this expression
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Named(name) => names.push(name),
            Self::List(inner) | Self::Optional(inner) => inner.collect_references(names),
            Self::Tuple(items) => {
                for item in items {
                    item.collect_references(names);
                }
            }
            Self::Int | Self::Float | Self::Str | Self::Bool | Self::Any => {}
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Str => write!(f, "str"),
            Self::Bool => write!(f, "bool"),
            Self::Any => write!(f, "any"),
            Self::List(inner) => write!(f, "list[{}]", inner),
            Self::Optional(inner) => write!(f, "optional[{}]", inner),
            Self::Tuple(items) => {
                write!(f, "tuple[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

// Cache keys show up in diagnostics; the canonical text is the readable form.
impl fmt::Debug for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for TypeExpr {
    type Err = ConvcacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parser = Parser { input: s, pos: 0 };
        let expr = parser.expr()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error(format!("unexpected '{}'", &s[parser.pos..])));
        }
        Ok(expr)
    }
}

impl TryFrom<String> for TypeExpr {
    type Error = ConvcacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TypeExpr> for String {
    fn from(value: TypeExpr) -> Self {
        value.to_string()
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn expr(&mut self) -> ConvcacheResult<TypeExpr> {
        let name = self.ident()?;
        let mut args = if self.eat('[') { self.args()? } else { vec![] };

        match (name, args.len()) {
            ("int", 0) => Ok(TypeExpr::Int),
            ("float", 0) => Ok(TypeExpr::Float),
            ("str", 0) => Ok(TypeExpr::Str),
            ("bool", 0) => Ok(TypeExpr::Bool),
            ("any", 0) => Ok(TypeExpr::Any),
            ("list", 1) => Ok(TypeExpr::list(args.remove(0))),
            ("optional", 1) => Ok(TypeExpr::optional(args.remove(0))),
            ("tuple", n) if n > 0 => Ok(TypeExpr::Tuple(args)),
            ("list" | "optional", n) => {
                Err(self.error(format!("{} takes one type argument, got {}", name, n)))
            }
            ("tuple", _) => Err(self.error("tuple needs at least one element type")),
            ("int" | "float" | "str" | "bool" | "any", _) => {
                Err(self.error(format!("{} takes no type arguments", name)))
            }
            (_, 0) => Ok(TypeExpr::named(name)),
            (_, _) => Err(self.error(format!("record {} takes no type arguments", name))),
        }
    }

    fn args(&mut self) -> ConvcacheResult<Vec<TypeExpr>> {
        let mut args = Vec::new();
        if self.eat(']') {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            if self.eat(']') {
                return Ok(args);
            }
            if !self.eat(',') {
                return Err(self.error("expected ',' or ']'"));
            }
        }
    }

    fn ident(&mut self) -> ConvcacheResult<&'a str> {
        self.skip_ws();
        let input = self.input;
        let rest = &input[self.pos..];
        let len = rest
            .char_indices()
            .find(|&(i, c)| !(c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())))
            .map_or(rest.len(), |(i, _)| i);
        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(&rest[..len])
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.input[self.pos..].starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, reason: impl Into<String>) -> ConvcacheError {
        ConvcacheError::TypeSyntax {
            input: self.input.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> TypeExpr {
        s.parse().unwrap()
    }

    #[test]
    fn parse_primitives() {
        assert_eq!(parse("int"), TypeExpr::Int);
        assert_eq!(parse("  str "), TypeExpr::Str);
        assert_eq!(parse("any"), TypeExpr::Any);
    }

    #[test]
    fn parse_nested() {
        assert_eq!(
            parse("list[ optional[Node] ]"),
            TypeExpr::list(TypeExpr::optional(TypeExpr::named("Node")))
        );
        assert_eq!(
            parse("tuple[int, list[str], Leaf_2]"),
            TypeExpr::Tuple(vec![
                TypeExpr::Int,
                TypeExpr::list(TypeExpr::Str),
                TypeExpr::named("Leaf_2"),
            ])
        );
    }

    #[test]
    fn display_is_canonical() {
        let expr = parse("tuple[ int,list[Node] ]");
        assert_eq!(expr.to_string(), "tuple[int, list[Node]]");
        assert_eq!(parse(&expr.to_string()), expr);
        assert_eq!(format!("{:?}", expr), "tuple[int, list[Node]]");
    }

    #[test]
    fn parse_errors() {
        for bad in [
            "",
            "list",
            "list[int, str]",
            "tuple[]",
            "int[str]",
            "Node[int]",
            "list[int",
            "list[int]]",
            "9lives",
            "optional[]",
        ] {
            let err = bad.parse::<TypeExpr>().unwrap_err();
            assert!(
                matches!(err, ConvcacheError::TypeSyntax { .. }),
                "{bad}: {err}"
            );
        }
    }

    #[test]
    fn references_found_everywhere() {
        let expr = parse("tuple[A, list[optional[B]], int, A]");
        assert_eq!(expr.references(), vec!["A", "B", "A"]);
        assert!(TypeExpr::Int.references().is_empty());
    }

    #[test]
    fn serde_uses_text_form() {
        #[derive(Serialize, Deserialize)]
        struct Field {
            r#type: TypeExpr,
        }

        let field: Field = toml::from_str(r#"type = "list[Node]""#).unwrap();
        assert_eq!(field.r#type, TypeExpr::list(TypeExpr::named("Node")));
        assert!(toml::from_str::<Field>(r#"type = "list[""#).is_err());

        let json = serde_json::to_string(&field).unwrap();
        assert_eq!(json, r#"{"type":"list[Node]"}"#);
    }
}
