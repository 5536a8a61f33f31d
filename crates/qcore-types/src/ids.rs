//! Newtype identifiers shared across crate boundaries.

use std::collections::HashMap;
use std::fmt;
use uuid::Uuid;

/// The tag a gate carries for capability-set membership checks, e.g. `"h"`,
/// `"cx"`, `"rz"`. Lower-case ASCII by convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct GateTag(pub String);

impl GateTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl fmt::Display for GateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for GateTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A globally unique device name across all registered providers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct DeviceName(pub String);

impl DeviceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for DeviceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifies a provider family (e.g. `"local"`, `"ionq"`) within the
/// dispatcher's registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct ProviderTag(pub String);

impl ProviderTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }
}

impl fmt::Display for ProviderTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ProviderTag {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The dispatcher-level job identifier (`Job.id: Uuid`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ASCII bitstring over a classical register, MSB = classical bit 0.
/// Plain `String` is used as the wire type; this alias documents the
/// invariant at call sites.
pub type Bitstring = String;

/// A measurement-counts histogram: bitstring -> number of shots producing it.
pub type Counts = HashMap<Bitstring, u64>;
