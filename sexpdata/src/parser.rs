//! Parse s-expression text into [`Value`]s.
use delegate::delegate;
use smol_str::SmolStr;
use std::ops::Range;
use tracing::trace;

use crate::lexer::{classify_number, Number, Spanned, Token, Tokenizer};
use crate::registry::{BracketKind, Snapshot};
use crate::value::{Quoted, Symbol, Value};

/// Options that control how atoms are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Bare atom read as the empty list.
    pub nil: Option<SmolStr>,
    /// Bare atom read as `true`.
    pub true_symbol: Option<SmolStr>,
    /// Bare atom read as `false`.
    pub false_symbol: Option<SmolStr>,
    /// Character that starts a comment running to the end of the line.
    pub line_comment: char,
    /// Maximum nesting of brackets and quotes.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            nil: None,
            true_symbol: None,
            false_symbol: None,
            line_comment: ';',
            max_depth: 1024,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nil(mut self, nil: impl Into<SmolStr>) -> Self {
        self.nil = Some(nil.into());
        self
    }

    pub fn with_true_symbol(mut self, symbol: impl Into<SmolStr>) -> Self {
        self.true_symbol = Some(symbol.into());
        self
    }

    pub fn with_false_symbol(mut self, symbol: impl Into<SmolStr>) -> Self {
        self.false_symbol = Some(symbol.into());
        self
    }

    pub fn with_line_comment(mut self, line_comment: char) -> Self {
        self.line_comment = line_comment;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Recursive-descent parser over the tokens of a single source text.
///
/// Sequences and quotes recurse; the call stack holds the open bracket contexts.
pub struct Parser<'a> {
    tokens: Tokenizer<'a>,
    options: &'a ParseOptions,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, snapshot: &'a Snapshot, options: &'a ParseOptions) -> Self {
        Self {
            tokens: Tokenizer::new(source, snapshot, options.line_comment),
            options,
            depth: 0,
        }
    }

    /// Parse all remaining top-level expressions.
    pub fn parse_all(mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(token) = self.tokens.next_token()? {
            values.push(self.expression(token)?);
        }
        Ok(values)
    }

    fn expression(&mut self, token: Spanned) -> Result<Value> {
        match token.token {
            Token::Open(kind) => self.sequence(kind, token.span),
            Token::Close(kind) => Err(ParseError::UnexpectedCloser {
                closer: kind.closer(),
                position: self.char_position(token.span.start),
                span: token.span,
            }),
            Token::Apostrophe => self.quote(token.span),
            Token::String(text) => Ok(Value::Str(text)),
            Token::Atom { text, escaped } => Ok(self.atom(text, escaped)),
        }
    }

    fn sequence(&mut self, kind: BracketKind, open: Span) -> Result<Value> {
        self.enter(&open)?;
        let mut items = Vec::new();

        loop {
            let Some(token) = self.tokens.next_token()? else {
                return Err(ParseError::UnterminatedBracket {
                    opener: kind.opener(),
                    position: self.char_position(open.start),
                    span: open,
                });
            };

            match token.token {
                Token::Close(closer) if closer == kind => break,
                _ => items.push(self.expression(token)?),
            }
        }

        self.depth -= 1;
        Ok(kind.wrap(items))
    }

    fn quote(&mut self, apostrophe: Span) -> Result<Value> {
        match self.tokens.next_token()? {
            None
            | Some(Spanned {
                token: Token::Close(_),
                ..
            }) => Err(ParseError::MissingQuotedExpression {
                position: self.char_position(apostrophe.start),
                span: apostrophe,
            }),
            Some(token) => {
                self.enter(&apostrophe)?;
                let inner = self.expression(token)?;
                self.depth -= 1;
                Ok(Quoted::new(inner).into())
            }
        }
    }

    fn atom(&self, text: SmolStr, escaped: bool) -> Value {
        if escaped {
            return Value::Symbol(Symbol::new(text));
        }

        if self.options.nil.as_ref() == Some(&text) {
            return Value::List(Vec::new());
        }
        if self.options.true_symbol.as_ref() == Some(&text) {
            return Value::Bool(true);
        }
        if self.options.false_symbol.as_ref() == Some(&text) {
            return Value::Bool(false);
        }

        match classify_number(&text) {
            Some(Number::Int(int)) => Value::Int(int),
            Some(Number::Float(float)) => Value::Float(float.into()),
            None => Value::Symbol(Symbol::new(text)),
        }
    }

    fn enter(&mut self, span: &Span) -> Result<()> {
        if self.depth >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
                position: self.char_position(span.start),
                span: span.clone(),
            });
        }
        self.depth += 1;
        Ok(())
    }

    delegate! {
        to self.tokens {
            fn char_position(&self, offset: usize) -> usize;
        }
    }
}

/// A parse error.
///
/// `position` is the character offset of the offending token, `span` its byte range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("`{opener}` at position {position} is never closed")]
    UnterminatedBracket {
        opener: char,
        position: usize,
        span: Span,
    },
    #[error("unexpected `{closer}` at position {position}")]
    UnexpectedCloser {
        closer: char,
        position: usize,
        span: Span,
    },
    #[error("no s-expression found after an apostrophe at position {position}")]
    MissingQuotedExpression { position: usize, span: Span },
    #[error("string starting at position {position} is never closed")]
    UnterminatedString { position: usize, span: Span },
    #[error("nesting deeper than {limit} levels at position {position}")]
    NestingTooDeep {
        limit: usize,
        position: usize,
        span: Span,
    },
    #[error("expected exactly one s-expression, found {found}")]
    ExpectedSingleExpression { found: usize, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnterminatedBracket { span, .. }
            | ParseError::UnexpectedCloser { span, .. }
            | ParseError::MissingQuotedExpression { span, .. }
            | ParseError::UnterminatedString { span, .. }
            | ParseError::NestingTooDeep { span, .. }
            | ParseError::ExpectedSingleExpression { span, .. } => span.clone(),
        }
    }

    /// Character position of the error. Whole-input errors report position 0.
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnterminatedBracket { position, .. }
            | ParseError::UnexpectedCloser { position, .. }
            | ParseError::MissingQuotedExpression { position, .. }
            | ParseError::UnterminatedString { position, .. }
            | ParseError::NestingTooDeep { position, .. } => *position,
            ParseError::ExpectedSingleExpression { .. } => 0,
        }
    }
}

/// Shorthand for a result specialised to parse errors.
pub type Result<T, E = ParseError> = std::result::Result<T, E>;

/// Span within a string.
pub type Span = Range<usize>;

pub(crate) fn parse_snapshot(
    source: &str,
    snapshot: &Snapshot,
    options: &ParseOptions,
) -> Result<Vec<Value>> {
    trace!(len = source.len(), brackets = snapshot.len(), "parsing s-expressions");
    Parser::new(source, snapshot, options).parse_all()
}

pub(crate) fn loads_snapshot(
    source: &str,
    snapshot: &Snapshot,
    options: &ParseOptions,
) -> Result<Value> {
    let mut values = parse_snapshot(source, snapshot, options)?;
    match values.pop() {
        Some(value) if values.is_empty() => Ok(value),
        popped => Err(ParseError::ExpectedSingleExpression {
            found: values.len() + usize::from(popped.is_some()),
            span: 0..source.len(),
        }),
    }
}

/// Parse all top-level expressions using the default bracket kinds.
pub fn parse(source: &str) -> Result<Vec<Value>> {
    Snapshot::default().parse(source)
}

/// Parse all top-level expressions using the default bracket kinds and the given options.
pub fn parse_with(source: &str, options: &ParseOptions) -> Result<Vec<Value>> {
    Snapshot::default().parse_with(source, options)
}

/// Parse exactly one expression using the default bracket kinds.
pub fn loads(source: &str) -> Result<Value> {
    Snapshot::default().loads(source, &ParseOptions::default())
}

#[cfg(test)]
mod test {
    use super::{loads, parse, parse_with, ParseError, ParseOptions};
    use crate::registry::BracketKind;
    use crate::value::{Quoted, Symbol, Value};
    use rstest::rstest;

    fn sym(s: &str) -> Value {
        Value::Symbol(Symbol::new(s))
    }

    fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    #[rstest]
    #[case("(a)(b)")]
    #[case("( a ) ( b )")]
    #[case(" (a) (b) ")]
    #[case(" \n\t\r  ( a )  \t\n\r  ( b )  ")]
    fn whitespace_is_irrelevant(#[case] source: &str) {
        assert_eq!(
            vec![list(vec![sym("a")]), list(vec![sym("b")])],
            parse(source).unwrap()
        );
    }

    #[test]
    fn parentheses_need_no_spaces() {
        assert_eq!(
            vec![list(vec![list(vec![sym("a")]), list(vec![sym("b")])])],
            parse("((a)(b))").unwrap()
        );
    }

    #[test]
    fn adjacent_strings() {
        assert_eq!(
            vec![list(vec![Value::from("a"), Value::from("b")])],
            parse(r#"("a""b")"#).unwrap()
        );
    }

    #[rstest]
    #[case(r"path.join", "path.join")]
    #[case(r"path\ join", "path join")]
    #[case(r"path\\join", r"path\join")]
    #[case(r"\\", r"\")]
    #[case(r"\'", "'")]
    #[case(r"\`", "`")]
    #[case(r#"\""#, "\"")]
    #[case(r"\(", "(")]
    #[case(r"\)", ")")]
    #[case(r"\[", "[")]
    #[case(r"\]", "]")]
    #[case(r"\ ", " ")]
    #[case(r"\.", ".")]
    #[case(r"\,", ",")]
    #[case(r"\?", "?")]
    #[case(r"\;", ";")]
    #[case(r"\#", "#")]
    #[case(r"\12", "12")]
    fn backslash_escapes_in_symbols(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(vec![sym(expected)], parse(source).unwrap());
    }

    #[test]
    fn numbers() {
        assert_eq!(vec![Value::from(-1.012)], parse("-1.012").unwrap());
        assert_eq!(vec![Value::Int(42)], parse("42").unwrap());
        assert_eq!(vec![sym("2E22")], parse("2E22").unwrap());
        assert_eq!(vec![sym("inf")], parse("inf").unwrap());
    }

    #[test]
    fn comments() {
        assert_eq!(vec![sym("a")], parse("a ; comment").unwrap());
        assert_eq!(vec![list(vec![Value::Int(0)])], parse("(0 ;; (\n)").unwrap());
        assert_eq!(vec![list(vec![Value::Int(0)])], parse("(0;; (\n)").unwrap());
    }

    #[test]
    fn quotes() {
        assert_eq!(
            vec![Value::from(Quoted::new(Quoted::new(sym("a")).into()))],
            parse("''a").unwrap()
        );
        assert_eq!(
            vec![list(vec![
                sym("a"),
                Quoted::new(sym("b")).into(),
                Quoted::new(list(vec![])).into()
            ])],
            parse("(a 'b '())").unwrap()
        );
        assert_eq!(
            vec![Value::from(Quoted::new(Value::from("s")))],
            parse(r#"'"s""#).unwrap()
        );
    }

    #[test]
    fn mixed_brackets() {
        assert_eq!(
            vec![BracketKind::SQUARE.wrap(vec![
                Value::Int(1),
                list(vec![Value::Int(2), BracketKind::SQUARE.wrap(vec![Value::Int(3)])])
            ])],
            parse("[1 (2 [3])]").unwrap()
        );
    }

    #[rstest]
    #[case("(a b))", ParseError::UnexpectedCloser { closer: ')', position: 5, span: 5..6 })]
    #[case(")", ParseError::UnexpectedCloser { closer: ')', position: 0, span: 0..1 })]
    #[case("(a]", ParseError::UnexpectedCloser { closer: ']', position: 2, span: 2..3 })]
    #[case("(a (b)", ParseError::UnterminatedBracket { opener: '(', position: 0, span: 0..1 })]
    #[case("[(a)", ParseError::UnterminatedBracket { opener: '[', position: 0, span: 0..1 })]
    #[case("(foo)'   ", ParseError::MissingQuotedExpression { position: 5, span: 5..6 })]
    #[case("'   ", ParseError::MissingQuotedExpression { position: 0, span: 0..1 })]
    #[case("(a ')", ParseError::MissingQuotedExpression { position: 3, span: 3..4 })]
    #[case("(\"abc", ParseError::UnterminatedString { position: 1, span: 1..5 })]
    #[case("σ (", ParseError::UnterminatedBracket { opener: '(', position: 2, span: 3..4 })]
    fn errors(#[case] source: &str, #[case] expected: ParseError) {
        assert_eq!(Err(expected), parse(source));
    }

    #[test]
    fn error_messages() {
        let err = parse("(foo)'   ").unwrap_err();
        assert_eq!(
            "no s-expression found after an apostrophe at position 5",
            err.to_string()
        );
        assert_eq!(5, err.position());
        assert_eq!(5..6, err.span());
    }

    #[test]
    fn nil_true_false() {
        let options = ParseOptions::new()
            .with_nil("nil")
            .with_true_symbol("t")
            .with_false_symbol("f");
        assert_eq!(
            vec![list(vec![]), Value::Bool(true), Value::Bool(false), sym("nil")],
            parse_with(r"nil t f \nil", &options).unwrap()
        );
        assert_eq!(vec![sym("nil"), sym("t")], parse("nil t").unwrap());
    }

    #[test]
    fn nesting_limit() {
        let options = ParseOptions::new().with_max_depth(2);
        assert!(parse_with("((a))", &options).is_ok());
        assert_eq!(
            Err(ParseError::NestingTooDeep {
                limit: 2,
                position: 2,
                span: 2..3
            }),
            parse_with("(('a))", &options)
        );
    }

    #[test]
    fn loads_single_expression() {
        assert_eq!(list(vec![sym("a")]), loads("(a) ; done").unwrap());
        assert_eq!(
            Err(ParseError::ExpectedSingleExpression {
                found: 2,
                span: 0..7
            }),
            loads("(a) (b)")
        );
        assert_eq!(
            Err(ParseError::ExpectedSingleExpression {
                found: 0,
                span: 0..0
            }),
            loads("")
        );
    }
}
