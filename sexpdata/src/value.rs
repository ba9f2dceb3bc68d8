//! The expression data model shared by the parser and the printer.
use ordered_float::OrderedFloat;
use proptest::arbitrary::Arbitrary;
use smol_str::SmolStr;
use std::fmt::Display;

use crate::printer::{Print, Printer, SerializeError};
use crate::registry::BracketKind;

/// An unquoted identifier.
///
/// Symbols compare and hash by their text, but never equal a string with the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(SmolStr);

impl Symbol {
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> SmolStr {
        self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// An explicitly double-quoted string.
///
/// Unlike plain text, a `StringLiteral` is printed with quotes even when the
/// printer renders text as symbols.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringLiteral(SmolStr);

impl StringLiteral {
    pub fn new(text: impl Into<SmolStr>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> SmolStr {
        self.0
    }
}

impl From<&str> for StringLiteral {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A single leading-apostrophe quote around one expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Quoted(Box<Value>);

impl Quoted {
    pub fn new(value: Value) -> Self {
        Self(Box::new(value))
    }

    pub fn inner(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        *self.0
    }
}

/// A sequence delimited by a bracket kind other than parentheses.
///
/// Constructed through [`BracketKind::wrap`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bracketed {
    kind: BracketKind,
    items: Vec<Value>,
}

impl Bracketed {
    pub(crate) fn new(kind: BracketKind, items: Vec<Value>) -> Self {
        Self { kind, items }
    }

    pub fn kind(&self) -> BracketKind {
        self.kind
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Value> {
        self.items
    }
}

/// An s-expression represented as a recursive enum.
///
/// `Str`, `Int`, `Float`, `Bool`, `Nil`, `List` and `Tuple` are native values;
/// `Symbol`, `String`, `Quoted` and `Bracketed` are the tagged forms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    Symbol(Symbol),
    String(StringLiteral),
    Str(SmolStr),
    Int(i64),
    Float(OrderedFloat<f64>),
    Bool(bool),
    Nil,
    Quoted(Quoted),
    /// A list in parentheses.
    List(Vec<Value>),
    /// A fixed-arity sequence, printed as a list or an array.
    Tuple(Vec<Value>),
    Bracketed(Bracketed),
}

impl Value {
    pub fn symbol(text: impl Into<SmolStr>) -> Self {
        Self::Symbol(Symbol::new(text))
    }

    pub fn as_symbol(&self) -> Option<&Symbol> {
        match self {
            Value::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(text) => Some(text),
            _ => None,
        }
    }

    /// The elements of a list, tuple or bracketed sequence.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            Value::Bracketed(bracketed) => Some(bracketed.items()),
            _ => None,
        }
    }
}

impl Print for Value {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        match self {
            Value::Symbol(symbol) => printer.print(symbol),
            Value::String(string) => printer.print(string),
            Value::Str(text) => printer.text(text),
            Value::Int(int) => printer.int(*int),
            Value::Float(float) => printer.float(float.into_inner()),
            Value::Bool(bool) => printer.boolean(*bool),
            Value::Nil => printer.nil(),
            Value::Quoted(quoted) => printer.print(quoted),
            Value::List(items) => printer.list(|printer| printer.print_all(items)),
            Value::Tuple(items) => printer.tuple(|printer| printer.print_all(items)),
            Value::Bracketed(bracketed) => printer.print(bracketed),
        }
    }
}

impl Print for Symbol {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.symbol(self.as_str())
    }
}

impl Print for StringLiteral {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.string(self.as_str())
    }
}

impl Print for Quoted {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.quoted(|printer| printer.print(self.inner()))
    }
}

impl Print for Bracketed {
    fn print<P: Printer>(&self, printer: &mut P) -> Result<(), SerializeError> {
        printer.bracketed(self.kind, |printer| printer.print_all(&self.items))
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<StringLiteral> for Value {
    fn from(value: StringLiteral) -> Self {
        Self::String(value)
    }
}

impl From<Quoted> for Value {
    fn from(value: Quoted) -> Self {
        Self::Quoted(value)
    }
}

impl From<Bracketed> for Value {
    fn from(value: Bracketed) -> Self {
        Self::Bracketed(value)
    }
}

impl From<SmolStr> for Value {
    fn from(value: SmolStr) -> Self {
        Self::Str(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value.into())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(OrderedFloat(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl Arbitrary for Value {
    type Parameters = ();
    type Strategy = proptest::strategy::BoxedStrategy<Self>;

    /// Values that survive printing and parsing unchanged.
    fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
        use proptest::prelude::*;

        let leaf = proptest::prop_oneof![
            any::<String>()
                .prop_filter("symbols are not empty", |text| !text.is_empty())
                .prop_map(Value::symbol),
            any::<String>().prop_map(Value::from),
            any::<i64>().prop_map(Value::Int),
            any::<f64>()
                .prop_filter("floats are finite", |float| float.is_finite())
                .prop_map(Value::from),
        ];

        leaf.prop_recursive(8, 256, 10, |inner| {
            proptest::prop_oneof![
                proptest::collection::vec(inner.clone(), 0..10).prop_map(Value::List),
                proptest::collection::vec(inner.clone(), 0..10)
                    .prop_map(|items| BracketKind::SQUARE.wrap(items)),
                inner.prop_map(|value| Value::Quoted(Quoted::new(value)))
            ]
        })
        .boxed()
    }
}

#[cfg(test)]
mod test {
    use super::{Quoted, StringLiteral, Symbol, Value};
    use crate::printer::SerializeOptions;
    use crate::registry::BracketKind;
    use crate::{parse, tosexp};
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn sym(s: &str) -> Value {
        Value::symbol(s)
    }

    fn quoted(value: Value) -> Value {
        Value::Quoted(Quoted::new(value))
    }

    /// Values covering every form of the grammar.
    fn identity_cases() -> Vec<Value> {
        let mut cases = vec![
            sym("a"),
            Value::from("a"),
            Value::List(vec![sym("a")]),
            Value::List(vec![Value::from("a")]),
            quoted(sym("a")),
            quoted(Value::from("a")),
            quoted(Value::List(vec![sym("a")])),
            quoted(Value::List(vec![Value::from("a")])),
            Value::List(vec![sym("a"), sym("b")]),
            Value::List(vec![sym("a"), Value::List(vec![sym("b")])]),
            Value::List(vec![sym("a"), quoted(Value::List(vec![sym("b")]))]),
            Value::List(vec![sym("a"), quoted(sym("b")), sym("c")]),
            Value::List(vec![sym("a"), quoted(sym("b")), quoted(sym("c")), sym("d")]),
            Value::List(vec![sym("set"), sym("set'")]),
            Value::List(vec![BracketKind::SQUARE.wrap(vec![
                Value::Int(1),
                Value::Int(2),
                Value::Int(3),
            ])]),
            Value::List(vec![BracketKind::SQUARE.wrap(vec![
                Value::Int(1),
                Value::List(vec![
                    Value::Int(2),
                    BracketKind::SQUARE.wrap(vec![Value::Int(3)]),
                ]),
            ])]),
            quoted(quoted(sym("a"))),
            Value::from("\"\""),
            Value::from(""),
            Value::from("''"),
            Value::from("'"),
            Value::from("\\"),
            Value::from("\\\""),
            Value::from(";"),
            sym("path.join"),
            sym("path join"),
            sym("path\\join"),
            sym("12"),
            sym("-1.5"),
            Value::from("日本語能力!!ソﾊﾝｶｸ"),
            sym("日本語"),
            Value::from(-1.012),
            Value::from(1e22),
            Value::Int(-7),
            Value::List(vec![]),
        ];

        for (raw, escaped) in crate::escape::STRING_ESCAPES {
            cases.push(Value::from(raw.to_string()));
            cases.push(Value::from(escaped));
        }

        cases
    }

    #[test]
    fn identity() {
        let options = SerializeOptions::default();
        for value in identity_cases() {
            let sexp = tosexp(&value, &options).unwrap();
            assert_eq!(vec![value], parse(&sexp).unwrap(), "{sexp}");
        }
    }

    #[test]
    fn identity_pretty_print() {
        let options = SerializeOptions::default().with_pretty_print(true);
        for value in identity_cases() {
            let sexp = tosexp(&value, &options).unwrap();
            assert_eq!(vec![value], parse(&sexp).unwrap(), "{sexp}");
        }
    }

    #[test]
    fn hashable_and_distinct() {
        let map = HashMap::from([
            (Value::String(StringLiteral::new("A")), "StrA"),
            (Value::Symbol(Symbol::new("A")), "SymA"),
            (Value::from("A"), "strA"),
        ]);

        assert_eq!(3, map.len());
        assert_eq!("StrA", map[&Value::String(StringLiteral::new("A"))]);
        assert_eq!("SymA", map[&Value::Symbol(Symbol::new("A"))]);
        assert_eq!("strA", map[&Value::from("A")]);
    }

    #[test]
    fn accessors() {
        assert_eq!("ObjSym", Symbol::new("ObjSym").as_str());
        assert_eq!("ObjStr", StringLiteral::new("ObjStr").as_str());
        assert_eq!(&sym("a"), Quoted::new(sym("a")).inner());

        let square = BracketKind::SQUARE.wrap(vec![sym("a")]);
        assert_eq!(Some(&[sym("a")][..]), square.as_list());
        assert_eq!(Some("x"), Value::from("x").as_str());
        assert_eq!(None, sym("x").as_str());
    }

    proptest! {
        #[test]
        fn print_then_parse(value: Value) {
            let sexp = tosexp(&value, &SerializeOptions::default()).unwrap();
            let parsed = parse(&sexp).unwrap();
            prop_assert_eq!(vec![value], parsed);
        }

        #[test]
        fn pretty_print_then_parse(value: Value, width in 0..120usize) {
            let options = SerializeOptions::default()
                .with_pretty_print(true)
                .with_width(width);
            let sexp = tosexp(&value, &options).unwrap();
            let parsed = parse(&sexp).unwrap();
            prop_assert_eq!(vec![value], parsed);
        }
    }
}
