//! Print values into s-expressions.
//!
//! Values are printed through the [`Printer`] trait, which is implemented by a
//! compact printer and a pretty printer. Both carry the [`SerializeOptions`] and
//! the registry [`Snapshot`] for the whole print, so that every symbol is
//! escaped against the same set of bracket kinds.
use smol_str::SmolStr;
use std::rc::Rc;
use std::str::FromStr;
use std::sync::Arc;
use tracing::trace;

use crate::escape::{escape_string, escape_symbol};
use crate::registry::{BracketKind, Snapshot};

mod pretty;
mod simple;
pub use pretty::to_string_pretty;
pub use simple::to_string;

/// How native text is printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StrAs {
    /// Double-quoted and escaped.
    #[default]
    String,
    /// As a bare symbol.
    Symbol,
}

impl FromStr for StrAs {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "string" => Ok(StrAs::String),
            "symbol" => Ok(StrAs::Symbol),
            _ => Err(SerializeError::InvalidOption {
                option: "str_as".into(),
                value: s.into(),
            }),
        }
    }
}

/// How fixed-arity sequences are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TupleAs {
    /// In parentheses.
    #[default]
    List,
    /// In square brackets.
    Array,
}

impl FromStr for TupleAs {
    type Err = SerializeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(TupleAs::List),
            "array" => Ok(TupleAs::Array),
            _ => Err(SerializeError::InvalidOption {
                option: "tuple_as".into(),
                value: s.into(),
            }),
        }
    }
}

/// Options that control how values are printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    pub str_as: StrAs,
    pub tuple_as: TupleAs,
    /// Break long sequences over several lines.
    pub pretty_print: bool,
    /// Line width for pretty printing.
    pub width: usize,
    pub nil: SmolStr,
    pub true_symbol: SmolStr,
    pub false_symbol: SmolStr,
    /// Comment character of the reader the output is meant for; escaped in symbols.
    pub line_comment: char,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            str_as: StrAs::String,
            tuple_as: TupleAs::List,
            pretty_print: false,
            width: 80,
            nil: "nil".into(),
            true_symbol: "t".into(),
            false_symbol: "()".into(),
            line_comment: ';',
        }
    }
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_str_as(mut self, str_as: StrAs) -> Self {
        self.str_as = str_as;
        self
    }

    pub fn with_tuple_as(mut self, tuple_as: TupleAs) -> Self {
        self.tuple_as = tuple_as;
        self
    }

    pub fn with_pretty_print(mut self, pretty_print: bool) -> Self {
        self.pretty_print = pretty_print;
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn with_line_comment(mut self, line_comment: char) -> Self {
        self.line_comment = line_comment;
        self
    }

    /// Set an option by name, for callers that receive options as text.
    ///
    /// Recognised keys are `str_as`, `tuple_as`, `pretty_print`, `width` and `line_comment`.
    pub fn set(&mut self, option: &str, value: &str) -> Result<(), SerializeError> {
        let invalid = || SerializeError::InvalidOption {
            option: option.into(),
            value: value.into(),
        };

        match option {
            "str_as" => self.str_as = value.parse()?,
            "tuple_as" => self.tuple_as = value.parse()?,
            "pretty_print" => self.pretty_print = value.parse().map_err(|_| invalid())?,
            "width" => self.width = value.parse().map_err(|_| invalid())?,
            "line_comment" => {
                self.line_comment = value.parse().map_err(|_| invalid())?
            }
            _ => return Err(invalid()),
        }

        Ok(())
    }
}

/// An error while printing. No partial output is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SerializeError {
    #[error("invalid value `{value}` for option `{option}`")]
    InvalidOption { option: SmolStr, value: SmolStr },
    #[error("bracket kind `{opener}{closer}` is not registered")]
    UnknownBracketKind { opener: char, closer: char },
    #[error("can not print {0}")]
    TypeMismatch(SmolStr),
}

/// Trait for types that can print s-expressions.
///
/// Implementors provide the layout primitives; the provided methods turn
/// symbols, text and scalars into tokens according to the options.
pub trait Printer: Sized {
    /// Print a single token verbatim.
    fn atom(&mut self, text: &str) -> Result<(), SerializeError>;

    /// Print a sequence in the given brackets given a function that prints the contents.
    fn delimited<F>(&mut self, kind: BracketKind, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>;

    /// Print an apostrophe directly followed by the value printed by `f`.
    fn quoted<F>(&mut self, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>;

    fn options(&self) -> &SerializeOptions;

    fn snapshot(&self) -> &Snapshot;

    /// Print a symbol, escaping whatever would be misread.
    fn symbol(&mut self, symbol: &str) -> Result<(), SerializeError> {
        if symbol.is_empty() {
            return Err(SerializeError::TypeMismatch("an empty symbol".into()));
        }
        let escaped = escape_symbol(symbol, self.snapshot(), self.options().line_comment);
        self.atom(&escaped)
    }

    /// Print a double-quoted string.
    fn string(&mut self, string: &str) -> Result<(), SerializeError> {
        self.atom(&escape_string(string))
    }

    /// Print native text as a string or a symbol depending on the options.
    fn text(&mut self, text: &str) -> Result<(), SerializeError> {
        match self.options().str_as {
            StrAs::String => self.string(text),
            StrAs::Symbol => self.symbol(text),
        }
    }

    fn int(&mut self, int: i64) -> Result<(), SerializeError> {
        self.atom(&int.to_string())
    }

    fn float(&mut self, float: f64) -> Result<(), SerializeError> {
        if !float.is_finite() {
            return Err(SerializeError::TypeMismatch(
                format!("the non-finite float {float}").into(),
            ));
        }
        self.atom(&format_float(float))
    }

    fn boolean(&mut self, bool: bool) -> Result<(), SerializeError> {
        let options = self.options();
        let text = if bool {
            options.true_symbol.clone()
        } else {
            options.false_symbol.clone()
        };
        self.atom(&text)
    }

    fn nil(&mut self) -> Result<(), SerializeError> {
        let text = self.options().nil.clone();
        self.atom(&text)
    }

    /// Print a list given a function that prints the contents.
    #[inline]
    fn list<F>(&mut self, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        self.delimited(BracketKind::PARENS, f)
    }

    /// Print a fixed-arity sequence given a function that prints the contents.
    fn tuple<F>(&mut self, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        let kind = match self.options().tuple_as {
            TupleAs::List => BracketKind::PARENS,
            TupleAs::Array => BracketKind::SQUARE,
        };
        self.delimited(kind, f)
    }

    /// Print a sequence of a registered bracket kind.
    fn bracketed<F>(&mut self, kind: BracketKind, f: F) -> Result<(), SerializeError>
    where
        F: FnOnce(&mut Self) -> Result<(), SerializeError>,
    {
        if !self.snapshot().contains(kind) {
            return Err(SerializeError::UnknownBracketKind {
                opener: kind.opener(),
                closer: kind.closer(),
            });
        }
        self.delimited(kind, f)
    }

    /// Print a printable value.
    fn print(&mut self, value: impl Print) -> Result<(), SerializeError> {
        value.print(self)
    }

    /// Print each item in turn.
    fn print_all<T: Print>(&mut self, items: &[T]) -> Result<(), SerializeError> {
        for item in items {
            self.print(item)?;
        }
        Ok(())
    }
}

/// Format a float so that it always reads back as a float.
fn format_float(float: f64) -> String {
    let repr = format!("{float:?}");
    match repr.split_once('e') {
        Some((mantissa, exponent)) if !mantissa.contains('.') => {
            format!("{mantissa}.0e{exponent}")
        }
        _ => repr,
    }
}

/// Trait for types that can be printed as an s-expression.
pub trait Print {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError>;
}

impl<T: Print + ?Sized> Print for &T {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        (*self).print(printer)
    }
}

impl<T: Print + ?Sized> Print for Box<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        self.as_ref().print(printer)
    }
}

impl<T: Print + ?Sized> Print for Rc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        self.as_ref().print(printer)
    }
}

impl<T: Print + ?Sized> Print for Arc<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        self.as_ref().print(printer)
    }
}

impl<T: Print> Print for [T] {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.list(|printer| printer.print_all(self))
    }
}

impl<T: Print> Print for Vec<T> {
    #[inline]
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        self.as_slice().print(printer)
    }
}

impl<T: Print> Print for Option<T> {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        match self {
            Some(value) => value.print(printer),
            None => printer.nil(),
        }
    }
}

impl Print for str {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.text(self)
    }
}

impl Print for String {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.text(self)
    }
}

impl Print for SmolStr {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.text(self)
    }
}

impl Print for bool {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.boolean(*self)
    }
}

impl Print for f64 {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.float(*self)
    }
}

macro_rules! impl_print_int {
    ($($ident:ty),*) => {
        $(impl Print for $ident {
            fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
                printer.int(i64::from(*self))
            }
        })*
    };
}

impl_print_int!(i8, i16, i32, i64, u8, u16, u32);

impl<A: Print, B: Print> Print for (A, B) {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.tuple(|printer| {
            printer.print(&self.0)?;
            printer.print(&self.1)
        })
    }
}

impl<A: Print, B: Print, C: Print> Print for (A, B, C) {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.tuple(|printer| {
            printer.print(&self.0)?;
            printer.print(&self.1)?;
            printer.print(&self.2)
        })
    }
}

pub(crate) fn tosexp_snapshot<T: Print>(
    value: T,
    snapshot: &Snapshot,
    options: &SerializeOptions,
) -> Result<String, SerializeError> {
    trace!(pretty = options.pretty_print, "printing s-expression");
    if options.pretty_print {
        to_string_pretty(value, snapshot, options)
    } else {
        to_string(value, snapshot, options)
    }
}

/// Print `value` using the default bracket kinds.
pub fn tosexp<T: Print>(value: T, options: &SerializeOptions) -> Result<String, SerializeError> {
    Snapshot::default().tosexp(value, options)
}

/// Alias of [`tosexp`].
pub fn dumps<T: Print>(value: T, options: &SerializeOptions) -> Result<String, SerializeError> {
    tosexp(value, options)
}
