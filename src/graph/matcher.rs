//! Route match predicates.
//!
//! # Responsibilities
//! - Match request path (exact, prefix, regex)
//! - Match header presence or value
//! - Match HTTP method
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - An empty predicate always matches (the router catch-all)
//! - Regex forms are capability-gated; the compiler refuses to emit
//!   them for proxy builds that lack a safe regex engine

use serde::{Deserialize, Serialize};

/// Conditions a request must satisfy for a router rule to apply.
/// All populated fields must match (AND).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchPredicate {
    pub path: Option<PathMatch>,
    pub headers: Vec<HeaderMatch>,
    pub methods: Vec<String>,
}

impl MatchPredicate {
    /// True when the predicate matches every request.
    pub fn is_catch_all(&self) -> bool {
        self.path.is_none() && self.headers.is_empty() && self.methods.is_empty()
    }

    /// True when emitting this predicate requires the proxy's regex
    /// match support. A multi-method list compiles to a regex
    /// alternation, so it counts too.
    pub fn requires_regex(&self) -> bool {
        matches!(self.path, Some(PathMatch::Regex(_)))
            || self
                .headers
                .iter()
                .any(|h| matches!(h.kind, HeaderMatchKind::Regex(_)))
            || self.methods.len() > 1
    }
}

/// Path condition forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathMatch {
    Exact(String),
    Prefix(String),
    Regex(String),
}

/// Header condition: a name plus the way its value is tested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMatch {
    pub name: String,
    pub kind: HeaderMatchKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderMatchKind {
    Exact(String),
    Present,
    Regex(String),
}
