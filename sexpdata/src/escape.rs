use logos::Logos;

use crate::lexer::{classify_number, is_reserved};
use crate::registry::Snapshot;

/// Characters that are written as a two-character escape inside double-quoted strings.
pub const STRING_ESCAPES: [(char, &str); 7] = [
    ('\\', r"\\"),
    ('"', r#"\""#),
    ('\u{8}', r"\b"),
    ('\u{c}', r"\f"),
    ('\n', r"\n"),
    ('\r', r"\r"),
    ('\t', r"\t"),
];

/// Lexer token for the body of a double-quoted string.
#[derive(Debug, Clone, Logos)]
enum EscapedToken {
    #[token(r#"\\"#, |_| '\\')]
    #[token(r#"\""#, |_| '"')]
    #[token(r#"\b"#, |_| '\u{8}')]
    #[token(r#"\f"#, |_| '\u{c}')]
    #[token(r#"\n"#, |_| '\n')]
    #[token(r#"\r"#, |_| '\r')]
    #[token(r#"\t"#, |_| '\t')]
    Escaped(char),

    #[regex(r#"\\u\{[a-fA-F0-9]+\}"#, |lex| parse_unicode(lex.slice()))]
    Unicode(char),

    /// A backslash that does not start a known escape stands for itself.
    #[token("\\")]
    Backslash,

    #[regex(r#"[^\\]+"#)]
    Literal,
}

/// Parses a unicode escape sequence of the form `\u{HEX}` where `HEX` is a
/// hexadecimal number representing a unicode codepoint.
fn parse_unicode(str: &str) -> Option<char> {
    // Skip the '\u{' prefix and '}' suffix
    let hex = str.get(3..str.len() - 1)?;
    let code = u32::from_str_radix(hex, 16).ok()?;
    char::from_u32(code)
}

/// Replaces escape sequences in the body of a string with their corresponding characters.
///
/// Unknown escapes, and `\u{..}` sequences that are not a valid codepoint, are kept verbatim.
pub fn unescape(str: &str) -> String {
    let mut lexer = EscapedToken::lexer(str);
    let mut output = String::with_capacity(str.len());

    while let Some(token) = lexer.next() {
        match token {
            Ok(EscapedToken::Escaped(c)) | Ok(EscapedToken::Unicode(c)) => output.push(c),
            Ok(EscapedToken::Backslash) => output.push('\\'),
            Ok(EscapedToken::Literal) | Err(()) => output.push_str(lexer.slice()),
        }
    }

    output
}

#[inline]
fn string_escape(c: char) -> Option<&'static str> {
    STRING_ESCAPES
        .iter()
        .find(|(raw, _)| *raw == c)
        .map(|(_, escaped)| *escaped)
}

pub fn escape_string(str: &str) -> String {
    let mut output = String::with_capacity(str.len() + 2);
    output.push('"');

    for c in str.chars() {
        match string_escape(c) {
            Some(escaped) => output.push_str(escaped),
            None => output.push(c),
        }
    }

    output.push('"');
    output
}

/// Escapes a symbol so that the tokenizer reads it back as the same symbol.
///
/// Every reserved character, the `line_comment` character and every delimiter
/// of `snapshot` gets a backslash. A symbol that would read back as a number
/// has its first character escaped.
pub fn escape_symbol(str: &str, snapshot: &Snapshot, line_comment: char) -> String {
    let numeric = classify_number(str).is_some();
    let mut output = String::with_capacity(str.len() + 1);

    for (index, c) in str.chars().enumerate() {
        if is_reserved(c)
            || c == line_comment
            || snapshot.is_delimiter(c)
            || (numeric && index == 0)
        {
            output.push('\\');
        }
        output.push(c);
    }

    output
}
