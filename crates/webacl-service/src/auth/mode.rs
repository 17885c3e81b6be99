//! Access modes and their implication lattice.
//!
//! `Control ⇒ Write ⇒ {Append, Read}`. `Append` and `Read` imply nothing.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use salvo::http::Method;
use webacl_core::config::AppendPolicy;
use webacl_core::constants::acl;

/// A single access mode from the WAC vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessMode {
    Read,
    Append,
    Write,
    Control,
}

impl AccessMode {
    pub const ALL: [Self; 4] = [Self::Read, Self::Append, Self::Write, Self::Control];

    const fn bit(self) -> u8 {
        match self {
            Self::Read => 0b0001,
            Self::Append => 0b0010,
            Self::Write => 0b0100,
            Self::Control => 0b1000,
        }
    }

    /// Every mode granted by holding `self`, including itself.
    const fn implied(self) -> u8 {
        match self {
            Self::Read => 0b0001,
            Self::Append => 0b0010,
            Self::Write => 0b0111,
            Self::Control => 0b1111,
        }
    }

    /// Parses a mode IRI such as `http://www.w3.org/ns/auth/acl#Read`.
    #[must_use]
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            acl::READ => Some(Self::Read),
            acl::APPEND => Some(Self::Append),
            acl::WRITE => Some(Self::Write),
            acl::CONTROL => Some(Self::Control),
            _ => None,
        }
    }

    #[must_use]
    pub const fn iri(self) -> &'static str {
        match self {
            Self::Read => acl::READ,
            Self::Append => acl::APPEND,
            Self::Write => acl::WRITE,
            Self::Control => acl::CONTROL,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "Read",
            Self::Append => "Append",
            Self::Write => "Write",
            Self::Control => "Control",
        };
        f.write_str(name)
    }
}

/// A set of granted modes stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModeSet(u8);

impl ModeSet {
    pub const EMPTY: Self = Self(0);

    #[must_use]
    pub const fn of(mode: AccessMode) -> Self {
        Self(mode.bit())
    }

    pub const fn insert(&mut self, mode: AccessMode) {
        self.0 |= mode.bit();
    }

    /// Whether `mode` is literally in the set.
    #[must_use]
    pub const fn contains(self, mode: AccessMode) -> bool {
        self.0 & mode.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Adds every mode implied by a member.
    #[must_use]
    pub const fn closure(self) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < AccessMode::ALL.len() {
            let mode = AccessMode::ALL[i];
            if self.0 & mode.bit() != 0 {
                bits |= mode.implied();
            }
            i += 1;
        }
        Self(bits)
    }

    /// Whether some member of the set grants `mode` under the lattice.
    #[must_use]
    pub const fn permits(self, mode: AccessMode) -> bool {
        self.closure().contains(mode)
    }

    pub fn iter(self) -> impl Iterator<Item = AccessMode> {
        AccessMode::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl BitOr for ModeSet {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ModeSet {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<AccessMode> for ModeSet {
    fn from_iter<I: IntoIterator<Item = AccessMode>>(iter: I) -> Self {
        let mut set = Self::EMPTY;
        for mode in iter {
            set.insert(mode);
        }
        set
    }
}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|m| m.to_string()).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// ## Summary
/// Returns the mode an HTTP method requires, or `None` for methods the
/// server does not implement.
///
/// `PUT` needs `Write` unless `policy` lets `Append` replace documents.
#[must_use]
pub fn mode_for_method(method: &Method, policy: AppendPolicy) -> Option<AccessMode> {
    match *method {
        Method::GET | Method::HEAD | Method::OPTIONS => Some(AccessMode::Read),
        Method::PUT => Some(match policy {
            AppendPolicy::AppendOnly => AccessMode::Write,
            AppendPolicy::PermitsReplace => AccessMode::Append,
        }),
        Method::DELETE => Some(AccessMode::Write),
        _ => None,
    }
}
