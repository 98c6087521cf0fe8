use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;

/// Role
///
/// The closed set of roles the storefront knows about. Role names arrive from the
/// backend and from configuration as free text; `Role::parse` is the one place
/// where such text becomes a role. Text that is not a role here is still compared
/// by its canonical form inside `RoleSet`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Role {
    Admin,
    Staff,
    SupportStaff,
    Customer,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Staff, Role::SupportStaff, Role::Customer];

    /// Canonical upper-case name, identical to the backend's spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Staff => "STAFF",
            Role::SupportStaff => "SUPPORT_STAFF",
            Role::Customer => "CUSTOMER",
        }
    }

    /// Case-insensitive, whitespace-tolerant parse. Anything outside the closed set
    /// yields `None`.
    pub fn parse(name: &str) -> Option<Role> {
        let canonical = canonicalize(name);
        Role::ALL.into_iter().find(|r| r.as_str() == canonical)
    }

    /// Roles that land on the back office after login.
    pub fn is_back_office(self) -> bool {
        !matches!(self, Role::Customer)
    }
}

/// Single canonicalization rule for role text: trimmed and upper-cased.
pub fn canonicalize(name: &str) -> String {
    name.trim().to_ascii_uppercase()
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role `{0}`")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// RoleSet
///
/// An ordered set of canonical role names. Names outside the closed `Role` set
/// are kept as written (upper-cased), so they still match themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet(BTreeSet<String>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from free-text names. Blank names are skipped. Names that are
    /// not a known `Role` are kept in the set and also returned, so callers can
    /// decide whether to log them.
    pub fn from_names<I, S>(names: I) -> (RoleSet, Vec<String>)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = RoleSet::new();
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref();
            if !set.insert(name) {
                continue;
            }
            if Role::parse(name).is_none() {
                unknown.push(name.trim().to_string());
            }
        }
        (set, unknown)
    }

    /// Adds the canonical form of `name`. Returns false for blanks and duplicates.
    pub fn insert(&mut self, name: impl AsRef<str>) -> bool {
        let canonical = canonicalize(name.as_ref());
        !canonical.is_empty() && self.0.insert(canonical)
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.0.contains(&canonicalize(name.as_ref()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn intersects(&self, other: &RoleSet) -> bool {
        self.0.intersection(&other.0).next().is_some()
    }

    /// Canonical names, in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }

    /// The members that are known roles.
    pub fn known(&self) -> impl Iterator<Item = Role> + '_ {
        self.iter().filter_map(Role::parse)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl AsRef<str> for Role {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        RoleSet(iter.into_iter().map(|r| r.as_str().to_string()).collect())
    }
}
