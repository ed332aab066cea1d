//! Store Models

use rustc_hash::FxHashSet;
use serde::Deserialize;

/// A buyer's delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Address {
    pub recipient: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub postal_code: String,
    pub country: String,
}

/// Admin configuration for one delivery type.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeliveryTypeDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default = "enabled")]
    pub is_active: bool,
}

impl DeliveryTypeDescriptor {
    #[must_use]
    pub fn active(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            is_active: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Kinds switched on in `descriptors`. Anything absent is unavailable.
pub fn active_kinds(descriptors: &[DeliveryTypeDescriptor]) -> FxHashSet<String> {
    descriptors
        .iter()
        .filter(|descriptor| descriptor.is_active)
        .map(|descriptor| descriptor.kind.clone())
        .collect()
}
