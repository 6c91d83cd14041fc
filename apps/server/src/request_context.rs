//! Per-request context injected by middleware.

use std::str::FromStr;

/// Header carrying the caller's role, set by the authenticating gateway.
pub const CALLER_ROLE_HEADER: &str = "x-caller-role";

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    pub role: CallerRole,
}

/// Pre-verified caller role. Unknown or missing roles are treated as public.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CallerRole {
    #[default]
    Public,
    Staff,
    Admin,
}

impl CallerRole {
    /// Whether kinds restricted by configuration are visible to this caller.
    pub fn sees_restricted_kinds(&self) -> bool {
        matches!(self, CallerRole::Staff | CallerRole::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallerRole::Public => "public",
            CallerRole::Staff => "staff",
            CallerRole::Admin => "admin",
        }
    }

    pub fn from_header(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for CallerRole {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(CallerRole::Public),
            "staff" => Ok(CallerRole::Staff),
            "admin" => Ok(CallerRole::Admin),
            _ => Err(()),
        }
    }
}
