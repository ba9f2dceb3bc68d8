use logos::Logos;
use smol_str::SmolStr;

use crate::{
    escape::unescape,
    parser::{ParseError, Span},
    registry::{BracketKind, Snapshot},
};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    Open(BracketKind),
    Close(BracketKind),
    Apostrophe,
    /// A double-quoted string with its escapes decoded.
    String(SmolStr),
    /// A bare atom. `escaped` records whether any character was escaped with a backslash.
    Atom { text: SmolStr, escaped: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Spanned {
    pub token: Token,
    pub span: Span,
}

#[inline]
pub(crate) fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Characters that can never be part of a bare atom without a backslash,
/// regardless of the registered bracket kinds.
#[inline]
pub(crate) fn is_reserved(c: char) -> bool {
    is_whitespace(c) || matches!(c, '"' | '\'' | '\\' | ';')
}

/// Cursor over the source text that produces one token at a time.
///
/// Tokenizers are not rewound; to start over, create a new one.
pub(crate) struct Tokenizer<'a> {
    source: &'a str,
    offset: usize,
    snapshot: &'a Snapshot,
    line_comment: char,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str, snapshot: &'a Snapshot, line_comment: char) -> Self {
        Self {
            source,
            offset: 0,
            snapshot,
            line_comment,
        }
    }

    /// Converts a byte offset into the source to a character position.
    pub fn char_position(&self, offset: usize) -> usize {
        self.source[..offset].chars().count()
    }

    #[inline]
    fn peek_char(&self) -> Option<char> {
        self.source[self.offset..].chars().next()
    }

    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek_char() {
            if is_whitespace(c) {
                self.offset += c.len_utf8();
            } else if c == self.line_comment {
                let rest = &self.source[self.offset..];
                self.offset += rest.find('\n').map_or(rest.len(), |end| end + 1);
            } else {
                break;
            }
        }
    }

    fn ends_atom(&self, c: char) -> bool {
        is_whitespace(c)
            || c == '"'
            || c == '\''
            || c == self.line_comment
            || self.snapshot.is_delimiter(c)
    }

    /// Advance past the next token and return it, or `None` at the end of the input.
    pub fn next_token(&mut self) -> Result<Option<Spanned>, ParseError> {
        self.skip_trivia();
        let start = self.offset;

        let Some(c) = self.peek_char() else {
            return Ok(None);
        };

        let token = if let Some(kind) = self.snapshot.opener(c) {
            self.offset += c.len_utf8();
            Token::Open(kind)
        } else if let Some(kind) = self.snapshot.closer(c) {
            self.offset += c.len_utf8();
            Token::Close(kind)
        } else if c == '\'' {
            self.offset += 1;
            Token::Apostrophe
        } else if c == '"' {
            self.string(start)?
        } else {
            self.atom()
        };

        Ok(Some(Spanned {
            token,
            span: start..self.offset,
        }))
    }

    fn string(&mut self, start: usize) -> Result<Token, ParseError> {
        let body_start = start + 1;
        let mut chars = self.source[body_start..].char_indices();

        while let Some((index, c)) = chars.next() {
            match c {
                '\\' => {
                    chars.next();
                }
                '"' => {
                    let body = &self.source[body_start..body_start + index];
                    self.offset = body_start + index + 1;
                    return Ok(Token::String(unescape(body).into()));
                }
                _ => {}
            }
        }

        let position = self.char_position(start);
        self.offset = self.source.len();
        Err(ParseError::UnterminatedString {
            position,
            span: start..self.source.len(),
        })
    }

    fn atom(&mut self) -> Token {
        let mut text = String::new();
        let mut escaped = false;

        while let Some(c) = self.peek_char() {
            if c == '\\' {
                self.offset += 1;
                escaped = true;
                match self.peek_char() {
                    Some(next) => {
                        text.push(next);
                        self.offset += next.len_utf8();
                    }
                    // A trailing backslash stands for itself.
                    None => text.push('\\'),
                }
            } else if self.ends_atom(c) {
                break;
            } else {
                text.push(c);
                self.offset += c.len_utf8();
            }
        }

        Token::Atom {
            text: text.into(),
            escaped,
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Spanned, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Strict numeric grammar. Anything that is not matched in full is a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Logos)]
enum NumberToken {
    #[regex(r"[-+]?[0-9]+")]
    Int,
    #[regex(r"[-+]?([0-9]+\.[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?")]
    Float,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

/// Classify an atom as a number if it matches the numeric grammar in full.
///
/// Integers that do not fit into an `i64` are not numbers.
pub(crate) fn classify_number(text: &str) -> Option<Number> {
    let mut lexer = NumberToken::lexer(text);
    let token = lexer.next()?.ok()?;

    if lexer.span() != (0..text.len()) {
        return None;
    }

    match token {
        NumberToken::Int => text.parse().ok().map(Number::Int),
        NumberToken::Float => text.parse().ok().map(Number::Float),
    }
}

#[cfg(test)]
mod test {
    use super::{classify_number, Number, Spanned, Token, Tokenizer};
    use crate::parser::ParseError;
    use crate::registry::{BracketKind, Snapshot};
    use rstest::rstest;

    fn tokens(source: &str) -> Vec<Token> {
        let snapshot = Snapshot::default();
        Tokenizer::new(source, &snapshot, ';')
            .map(|token| token.unwrap().token)
            .collect()
    }

    fn atom(text: &str) -> Token {
        Token::Atom {
            text: text.into(),
            escaped: false,
        }
    }

    fn escaped(text: &str) -> Token {
        Token::Atom {
            text: text.into(),
            escaped: true,
        }
    }

    #[test]
    fn adjacent_tokens() {
        let open = Token::Open(BracketKind::PARENS);
        let close = Token::Close(BracketKind::PARENS);
        assert_eq!(
            vec![
                open.clone(),
                open.clone(),
                atom("a"),
                close.clone(),
                open,
                atom("b"),
                close.clone(),
                close
            ],
            tokens("((a)(b))")
        );
        assert_eq!(
            vec![
                Token::String("a".into()),
                Token::String("b".into()),
                atom("c"),
                Token::String("d".into())
            ],
            tokens(r#""a""b"c"d""#)
        );
    }

    #[test]
    fn spans_are_byte_ranges() {
        let snapshot = Snapshot::default();
        let spanned: Vec<Spanned> = Tokenizer::new(" 'σx \"y\"", &snapshot, ';')
            .map(Result::unwrap)
            .collect();
        assert_eq!(
            vec![
                Spanned {
                    token: Token::Apostrophe,
                    span: 1..2
                },
                Spanned {
                    token: atom("σx"),
                    span: 2..5
                },
                Spanned {
                    token: Token::String("y".into()),
                    span: 6..9
                },
            ],
            spanned
        );
    }

    #[rstest]
    #[case("a ; comment", vec![atom("a")])]
    #[case("a ; comment\nb", vec![atom("a"), atom("b")])]
    #[case("a;b", vec![atom("a")])]
    #[case("; only a comment", vec![])]
    #[case(" \t\r\n ", vec![])]
    fn comments_and_whitespace(#[case] source: &str, #[case] expected: Vec<Token>) {
        assert_eq!(expected, tokens(source));
    }

    #[test]
    fn custom_line_comment() {
        let snapshot = Snapshot::default();
        let tokens: Vec<Token> = Tokenizer::new("a;b # rest", &snapshot, '#')
            .map(|token| token.unwrap().token)
            .collect();
        assert_eq!(vec![atom("a;b")], tokens);
    }

    #[rstest]
    #[case(r"path.join", atom("path.join"))]
    #[case(r"path\ join", escaped("path join"))]
    #[case(r"path\\join", escaped(r"path\join"))]
    #[case(r"\(", escaped("("))]
    #[case(r"\'", escaped("'"))]
    #[case(r"\;", escaped(";"))]
    #[case(r#"\""#, escaped("\""))]
    #[case(r"\1", escaped("1"))]
    #[case("a\\", escaped("a\\"))]
    fn backslash_in_atoms(#[case] source: &str, #[case] expected: Token) {
        assert_eq!(vec![expected], tokens(source));
    }

    #[test]
    fn apostrophe_ends_atom() {
        assert_eq!(
            vec![atom("a"), Token::Apostrophe, atom("b")],
            tokens("a'b")
        );
    }

    #[test]
    fn unterminated_string() {
        let snapshot = Snapshot::default();
        let mut tokenizer = Tokenizer::new(r#"(a "b\")"#, &snapshot, ';');
        let result: Result<Vec<_>, _> = tokenizer.by_ref().collect();
        assert_eq!(
            Err(ParseError::UnterminatedString {
                position: 3,
                span: 3..8
            }),
            result
        );
        assert!(tokenizer.next().is_none());
    }

    #[rstest]
    #[case("0", Some(Number::Int(0)))]
    #[case("-12", Some(Number::Int(-12)))]
    #[case("+7", Some(Number::Int(7)))]
    #[case("-1.012", Some(Number::Float(-1.012)))]
    #[case("1.", Some(Number::Float(1.0)))]
    #[case(".5", Some(Number::Float(0.5)))]
    #[case("2.5E3", Some(Number::Float(2500.0)))]
    #[case("1.0e-2", Some(Number::Float(0.01)))]
    #[case("2E22", None)]
    #[case("inf", None)]
    #[case("nan", None)]
    #[case(".", None)]
    #[case("-", None)]
    #[case("1.5e", None)]
    #[case("12a", None)]
    #[case("99999999999999999999", None)]
    fn numeric_grammar(#[case] text: &str, #[case] expected: Option<Number>) {
        assert_eq!(expected, classify_number(text));
    }
}
