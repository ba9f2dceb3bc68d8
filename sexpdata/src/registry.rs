//! Bracket kinds and the registry that makes them known to the tokenizer.
//!
//! A [`Registry`] is an explicit value rather than process-wide state. It is
//! extended by copying its table: [`Registry::register`] builds a new table and
//! swaps it in, while readers hold on to an immutable [`Snapshot`] for as long
//! as a single parse or serialization runs. Extensions are never rolled back.
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::lexer::is_reserved;
use crate::parser::{self, ParseOptions, Result};
use crate::printer::{self, Print, SerializeError, SerializeOptions};
use crate::value::{Bracketed, Value};

/// An opener/closer character pair identifying one flavour of sequence.
///
/// Bracket kinds are handed out by [`Registry::register`]; the two default
/// kinds are available as [`BracketKind::PARENS`] and [`BracketKind::SQUARE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BracketKind {
    opener: char,
    closer: char,
}

impl BracketKind {
    /// Round parentheses, the kind of plain lists.
    pub const PARENS: BracketKind = BracketKind {
        opener: '(',
        closer: ')',
    };

    /// Square brackets.
    pub const SQUARE: BracketKind = BracketKind {
        opener: '[',
        closer: ']',
    };

    #[inline]
    pub fn opener(self) -> char {
        self.opener
    }

    #[inline]
    pub fn closer(self) -> char {
        self.closer
    }

    /// Whether this is the kind of plain lists.
    #[inline]
    pub fn is_default(self) -> bool {
        self == Self::PARENS
    }

    /// Wrap `items` into the sequence variant for this kind.
    ///
    /// Parentheses produce a plain [`Value::List`], every other kind produces a
    /// [`Value::Bracketed`] tagged with `self`.
    pub fn wrap(self, items: Vec<Value>) -> Value {
        if self.is_default() {
            Value::List(items)
        } else {
            Value::Bracketed(Bracketed::new(self, items))
        }
    }
}

/// Reasons for refusing to register a bracket kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("opener and closer must differ, got `{0}` for both")]
    SameCharacter(char),
    #[error("`{0}` is reserved and can not delimit a sequence")]
    Reserved(char),
    #[error("opener `{opener}` is already registered with closer `{closer}`")]
    OpenerInUse { opener: char, closer: char },
    #[error("`{0}` is already used by another bracket kind")]
    CharacterInUse(char),
}

#[derive(Debug, Clone)]
struct Table {
    openers: BTreeMap<char, BracketKind>,
    closers: BTreeMap<char, BracketKind>,
}

impl Table {
    fn insert(&mut self, kind: BracketKind) {
        self.openers.insert(kind.opener, kind);
        self.closers.insert(kind.closer, kind);
    }

    /// Check whether `kind` may be added.
    ///
    /// Returns `Ok(false)` when the exact same kind is already present.
    fn admit(&self, kind: BracketKind) -> std::result::Result<bool, RegistryError> {
        if kind.opener == kind.closer {
            return Err(RegistryError::SameCharacter(kind.opener));
        }

        for c in [kind.opener, kind.closer] {
            if is_reserved(c) {
                return Err(RegistryError::Reserved(c));
            }
        }

        if let Some(existing) = self.openers.get(&kind.opener) {
            if *existing == kind {
                return Ok(false);
            }

            return Err(RegistryError::OpenerInUse {
                opener: kind.opener,
                closer: existing.closer,
            });
        }

        if self.closers.contains_key(&kind.opener) {
            return Err(RegistryError::CharacterInUse(kind.opener));
        }

        if self.openers.contains_key(&kind.closer) || self.closers.contains_key(&kind.closer) {
            return Err(RegistryError::CharacterInUse(kind.closer));
        }

        Ok(true)
    }
}

impl Default for Table {
    fn default() -> Self {
        let mut table = Table {
            openers: BTreeMap::new(),
            closers: BTreeMap::new(),
        };
        table.insert(BracketKind::PARENS);
        table.insert(BracketKind::SQUARE);
        table
    }
}

/// An immutable view of a registry at one point in time.
///
/// The default snapshot holds exactly the parentheses and square brackets.
#[derive(Debug, Clone, Default)]
pub struct Snapshot(Arc<Table>);

impl Snapshot {
    /// The bracket kind opened by `c`, if any.
    #[inline]
    pub fn opener(&self, c: char) -> Option<BracketKind> {
        self.0.openers.get(&c).copied()
    }

    /// The bracket kind closed by `c`, if any.
    #[inline]
    pub fn closer(&self, c: char) -> Option<BracketKind> {
        self.0.closers.get(&c).copied()
    }

    /// Whether `c` opens or closes any bracket kind.
    #[inline]
    pub fn is_delimiter(&self, c: char) -> bool {
        self.0.openers.contains_key(&c) || self.0.closers.contains_key(&c)
    }

    /// Whether `kind` is part of this snapshot.
    pub fn contains(&self, kind: BracketKind) -> bool {
        self.opener(kind.opener) == Some(kind)
    }

    /// The number of bracket kinds.
    pub fn len(&self) -> usize {
        self.0.openers.len()
    }

    /// Always false, the default kinds can not be removed.
    pub fn is_empty(&self) -> bool {
        self.0.openers.is_empty()
    }

    /// The opener to closer mapping.
    pub fn brackets(&self) -> BTreeMap<char, char> {
        self.0
            .openers
            .values()
            .map(|kind| (kind.opener, kind.closer))
            .collect()
    }

    /// Parse all top-level expressions in `source`.
    pub fn parse(&self, source: &str) -> Result<Vec<Value>> {
        self.parse_with(source, &ParseOptions::default())
    }

    /// Parse all top-level expressions in `source` with the given options.
    pub fn parse_with(&self, source: &str, options: &ParseOptions) -> Result<Vec<Value>> {
        parser::parse_snapshot(source, self, options)
    }

    /// Parse exactly one expression from `source`.
    pub fn loads(&self, source: &str, options: &ParseOptions) -> Result<Value> {
        parser::loads_snapshot(source, self, options)
    }

    /// Serialize `value` using the bracket kinds of this snapshot.
    pub fn tosexp<T: Print>(
        &self,
        value: T,
        options: &SerializeOptions,
    ) -> std::result::Result<String, SerializeError> {
        printer::tosexp_snapshot(value, self, options)
    }
}

/// The extensible table of bracket kinds.
///
/// Registration takes a write lock, copies the current table, and swaps in the
/// extended copy. Reads take a read lock only long enough to clone the `Arc`.
#[derive(Debug, Default)]
pub struct Registry {
    table: RwLock<Arc<Table>>,
}

impl Registry {
    /// A registry holding the default parentheses and square brackets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the bracket kind `opener`/`closer`.
    ///
    /// Registering a pair that is already present returns the existing kind.
    /// An opener that is already registered with a different closer is
    /// rejected, as is any character that is reserved or already in use.
    pub fn register(
        &self,
        opener: char,
        closer: char,
    ) -> std::result::Result<BracketKind, RegistryError> {
        let kind = BracketKind { opener, closer };
        let mut guard = self.table.write().unwrap_or_else(PoisonError::into_inner);

        match guard.admit(kind) {
            Ok(true) => {}
            Ok(false) => return Ok(kind),
            Err(err) => {
                debug!(%opener, %closer, %err, "rejected bracket kind");
                return Err(err);
            }
        }

        let mut table = Table::clone(&guard);
        table.insert(kind);
        *guard = Arc::new(table);

        debug!(%opener, %closer, "registered bracket kind");
        Ok(kind)
    }

    /// Alias of [`Registry::register`].
    #[inline]
    pub fn register_bracket(
        &self,
        opener: char,
        closer: char,
    ) -> std::result::Result<BracketKind, RegistryError> {
        self.register(opener, closer)
    }

    /// The closer registered for `opener`.
    pub fn lookup(&self, opener: char) -> Option<char> {
        self.snapshot().opener(opener).map(BracketKind::closer)
    }

    /// Take an immutable view of the current table.
    pub fn snapshot(&self) -> Snapshot {
        let guard = self.table.read().unwrap_or_else(PoisonError::into_inner);
        Snapshot(Arc::clone(&guard))
    }

    /// The current opener to closer mapping.
    pub fn current_brackets(&self) -> BTreeMap<char, char> {
        self.snapshot().brackets()
    }

    /// Parse all top-level expressions in `source` against the current table.
    pub fn parse(&self, source: &str) -> Result<Vec<Value>> {
        self.snapshot().parse(source)
    }

    /// Parse with options against the current table.
    pub fn parse_with(&self, source: &str, options: &ParseOptions) -> Result<Vec<Value>> {
        self.snapshot().parse_with(source, options)
    }

    /// Parse exactly one expression against the current table.
    pub fn loads(&self, source: &str, options: &ParseOptions) -> Result<Value> {
        self.snapshot().loads(source, options)
    }

    /// Serialize `value` against the current table.
    pub fn tosexp<T: Print>(
        &self,
        value: T,
        options: &SerializeOptions,
    ) -> std::result::Result<String, SerializeError> {
        self.snapshot().tosexp(value, options)
    }
}
