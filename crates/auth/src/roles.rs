use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Built-in role codes as plain strings, for static tables.
pub mod codes {
    pub const ADMIN: &str = "A001";
    pub const FINANCE: &str = "A002";
    pub const APPROVAL: &str = "A003";
    pub const CLAIMER: &str = "A004";
}

/// Role code carried by users and tokens (`A001`, `A002`, ...).
///
/// Codes are opaque strings so deployments can register more roles; the four
/// built-in codes below are the ones the claim workflow reasons about.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleCode(Cow<'static, str>);

impl RoleCode {
    pub const ADMIN: RoleCode = RoleCode(Cow::Borrowed(codes::ADMIN));
    pub const FINANCE: RoleCode = RoleCode(Cow::Borrowed(codes::FINANCE));
    pub const APPROVAL: RoleCode = RoleCode(Cow::Borrowed(codes::APPROVAL));
    /// Catch-all role for every remaining staff member.
    pub const CLAIMER: RoleCode = RoleCode(Cow::Borrowed(codes::CLAIMER));

    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name of a built-in role, if this is one.
    pub fn label(&self) -> Option<&'static str> {
        match self.as_str() {
            codes::ADMIN => Some("Admin"),
            codes::FINANCE => Some("Finance"),
            codes::APPROVAL => Some("Approval"),
            codes::CLAIMER => Some("Claimer"),
            _ => None,
        }
    }
}

impl core::fmt::Display for RoleCode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for RoleCode {
    fn from(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }
}

impl From<String> for RoleCode {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owned_and_borrowed_codes_compare_equal() {
        assert_eq!(RoleCode::from("A003".to_string()), RoleCode::APPROVAL);
        assert_eq!(RoleCode::APPROVAL.label(), Some("Approval"));
        assert_eq!(RoleCode::new("B999").label(), None);
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&RoleCode::FINANCE).unwrap();
        assert_eq!(json, "\"A002\"");
        let back: RoleCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, RoleCode::FINANCE);
    }
}
