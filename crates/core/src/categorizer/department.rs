//! The fixed department taxonomy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A department a ticket can be routed to.
///
/// Declaration order is significant: it is the tie-break order used by the
/// keyword scorer and the order departments are listed in prompts and API
/// responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Department {
    ItSupport,
    Hr,
    Facilities,
    Finance,
    General,
}

impl Department {
    /// All departments in enumeration order.
    pub const ALL: [Department; 5] = [
        Department::ItSupport,
        Department::Hr,
        Department::Facilities,
        Department::Finance,
        Department::General,
    ];

    /// Display name, as stored in the database and shown to users.
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::ItSupport => "IT Support",
            Department::Hr => "HR",
            Department::Facilities => "Facilities",
            Department::Finance => "Finance",
            Department::General => "General",
        }
    }

    /// Resolve a department from free text, ignoring case and surrounding whitespace.
    pub fn from_name_ignore_case(name: &str) -> Option<Department> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(name))
    }

    /// Display names of all departments in enumeration order.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(Department::as_str).collect()
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not an exact department name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid department '{0}'. Must be one of: IT Support, HR, Facilities, Finance, General")]
pub struct UnknownDepartment(pub String);

impl FromStr for Department {
    type Err = UnknownDepartment;

    /// Exact, case-sensitive membership test.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| UnknownDepartment(s.to_string()))
    }
}

impl Serialize for Department {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Department {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
