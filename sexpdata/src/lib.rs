//! Reading and writing Lisp-style s-expressions.
//!
//! # Syntax
//!
//! - **Sequences** are delimited by a bracket kind, `(` and `)` or `[` and `]`
//!   by default, and separated by whitespace. Further bracket kinds can be added
//!   to a [`Registry`]. Parenthesised sequences are plain lists; every other kind
//!   reads back as a [`Bracketed`] value tagged with its kind.
//!
//! - **Strings** are enclosed within double quotes. Within strings, `\\`, `\"`,
//!   `\b`, `\f`, `\n`, `\r` and `\t` are escapes for the corresponding
//!   character, and `\u{HEX}` stands in for any unicode codepoint.
//!
//! - **Symbols** are any other run of characters. A backslash makes the next
//!   character part of the symbol, including whitespace, brackets, `'`, `"`, `;`
//!   and the backslash itself.
//!
//! - **Numbers** are atoms matching `[-+]?[0-9]+` (integers) or
//!   `[-+]?([0-9]+\.[0-9]*|\.[0-9]+)([eE][-+]?[0-9]+)?` (floats). `2E22` and
//!   `inf` are symbols.
//!
//! - **Quotes** are an apostrophe directly followed by one expression.
//!
//! - **Comments** begin with a `;` and extend to the end of the line.
//!
//! Printing a value and parsing the result gives back the value:
//!
//! ```
//! use sexpdata::{parse, tosexp, SerializeOptions, Value};
//!
//! let value = Value::List(vec![Value::symbol("path join"), Value::from("日本語")]);
//! let sexp = tosexp(&value, &SerializeOptions::default()).unwrap();
//! assert_eq!(r#"(path\ join "日本語")"#, sexp);
//! assert_eq!(vec![value], parse(&sexp).unwrap());
//! ```
pub(crate) mod escape;
pub(crate) mod lexer;
pub mod parser;
pub mod printer;
pub mod registry;
pub mod value;

pub use parser::{loads, parse, parse_with, ParseError, ParseOptions};
pub use printer::{dumps, tosexp, SerializeError, SerializeOptions, StrAs, TupleAs};
pub use registry::{BracketKind, Registry, RegistryError, Snapshot};
pub use value::{Bracketed, Quoted, StringLiteral, Symbol, Value};
