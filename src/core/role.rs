//! Current role
//!
//! The role is an unchecked label picked at startup. It scopes list views
//! and is recorded as author, sender, or uploader; it grants nothing.

use std::fmt;

/// Roles offered at login
pub const KNOWN_ROLES: [&str; 4] = ["OEM", "Supplier A", "Supplier B", "Auditor"];

pub const OEM: &str = "OEM";
pub const AUDITOR: &str = "Auditor";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Role(String);

impl Role {
    pub fn new(name: impl Into<String>) -> Self {
        Role(name.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_oem(&self) -> bool {
        self.0 == OEM
    }

    pub fn is_auditor(&self) -> bool {
        self.0 == AUDITOR
    }

    /// OEM and Auditor see every row; other roles only rows naming them
    pub fn sees_everything(&self) -> bool {
        self.is_oem() || self.is_auditor()
    }

    pub fn is_known(&self) -> bool {
        KNOWN_ROLES.contains(&self.0.as_str())
    }
}

impl Default for Role {
    fn default() -> Self {
        Role(OEM.to_string())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
