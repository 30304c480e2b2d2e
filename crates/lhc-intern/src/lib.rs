//! String interning for LHC.
//!
//! Every name the type checker handles (type constructors, type variables,
//! type classes, data constructors and fields) is interned once and passed
//! around as a [`Symbol`], a `Copy` handle that compares and hashes in
//! constant time.
//!
//! The interner is process-global and never frees its strings, so
//! [`Symbol::as_str`] can hand out `&'static str`.

#![warn(missing_docs)]

use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An interned string.
///
/// Equality and hashing use the interner index. Ordering compares the
/// underlying strings so that sorted collections of symbols print in a
/// stable, alphabetical order.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(u32);

#[derive(Default)]
struct Interner {
    names: FxHashMap<&'static str, Symbol>,
    strings: Vec<&'static str>,
}

impl Interner {
    fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.names.get(s) {
            return sym;
        }
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        #[allow(clippy::cast_possible_truncation)]
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(leaked);
        self.names.insert(leaked, sym);
        sym
    }
}

fn interner() -> &'static RwLock<Interner> {
    static INTERNER: OnceLock<RwLock<Interner>> = OnceLock::new();
    INTERNER.get_or_init(|| RwLock::new(Interner::default()))
}

impl Symbol {
    /// Intern a string, returning its symbol.
    #[must_use]
    pub fn intern(s: &str) -> Self {
        if let Some(&sym) = interner().read().names.get(s) {
            return sym;
        }
        interner().write().intern(s)
    }

    /// The interned string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        interner().read().strings[self.0 as usize]
    }

    /// The raw interner index.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Returns true if the first character is an uppercase letter.
    #[must_use]
    pub fn starts_uppercase(self) -> bool {
        self.as_str().chars().next().is_some_and(char::is_uppercase)
    }

    /// Returns true if the first character is a lowercase letter or `_`.
    #[must_use]
    pub fn starts_lowercase(self) -> bool {
        self.as_str()
            .chars()
            .next()
            .is_some_and(|c| c.is_lowercase() || c == '_')
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            Ordering::Equal
        } else {
            self.as_str().cmp(other.as_str())
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::intern(s)
    }
}

impl Serialize for Symbol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Symbol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::intern(&s))
    }
}
