//! Variants
//!
//! Cart lines select a product variant either through a legacy single-axis variant id or a
//! multi-axis `axis -> option` map. Both forms are normalized here so that line matching never
//! depends on the order a map happened to be serialized in.

use std::fmt;

use smallvec::SmallVec;

/// Normalized, order-independent composite key of `axis=option` pairs.
///
/// Pairs are sorted by axis name; a repeated axis keeps its last option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantKey(SmallVec<[(String, String); 3]>);

impl VariantKey {
    /// Build a key from `(axis, option)` pairs in any order.
    pub fn new<I, A, O>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (A, O)>,
        A: Into<String>,
        O: Into<String>,
    {
        let mut sorted: SmallVec<[(String, String); 3]> = SmallVec::new();

        for (axis, option) in pairs {
            let axis = axis.into();
            let option = option.into();

            match sorted.binary_search_by(|(existing, _)| existing.cmp(&axis)) {
                Ok(position) => {
                    if let Some(slot) = sorted.get_mut(position) {
                        slot.1 = option;
                    }
                }
                Err(position) => sorted.insert(position, (axis, option)),
            }
        }

        Self(sorted)
    }

    /// Iterate `(axis, option)` pairs in axis order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(axis, option)| (axis.as_str(), option.as_str()))
    }

    /// Option selected for `axis`, if any.
    pub fn option(&self, axis: &str) -> Option<&str> {
        self.0
            .binary_search_by(|(existing, _)| existing.as_str().cmp(axis))
            .ok()
            .and_then(|position| self.0.get(position))
            .map(|(_, option)| option.as_str())
    }

    /// Number of axes selected.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no axis is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, (axis, option)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str(";")?;
            }

            write!(f, "{axis}={option}")?;
        }

        Ok(())
    }
}

/// How a cart line selects a variant of its product.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum VariantSelector {
    /// The product has no variants, or none was chosen.
    #[default]
    None,

    /// Legacy single-axis variant id.
    Single(String),

    /// Multi-axis selection.
    Axes(VariantKey),
}

impl VariantSelector {
    /// Build a selector from the two optional wire fields.
    ///
    /// A non-empty multi-axis map takes priority over a legacy variant id.
    pub fn from_parts<I, A, O>(variant_id: Option<String>, selected: Option<I>) -> Self
    where
        I: IntoIterator<Item = (A, O)>,
        A: Into<String>,
        O: Into<String>,
    {
        let key = selected.map(VariantKey::new).unwrap_or_default();

        if !key.is_empty() {
            return Self::Axes(key);
        }

        match variant_id {
            Some(id) if !id.is_empty() => Self::Single(id),
            _ => Self::None,
        }
    }

    /// Legacy variant id, if this is a single-axis selector.
    pub fn variant_id(&self) -> Option<&str> {
        match self {
            Self::Single(id) => Some(id),
            Self::None | Self::Axes(_) => None,
        }
    }

    /// Multi-axis key, if this is a multi-axis selector.
    pub fn key(&self) -> Option<&VariantKey> {
        match self {
            Self::Axes(key) => Some(key),
            Self::None | Self::Single(_) => None,
        }
    }
}

impl fmt::Display for VariantSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("-"),
            Self::Single(id) => f.write_str(id),
            Self::Axes(key) => fmt::Display::fmt(key, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_order_independent() {
        let a = VariantKey::new([("size", "L"), ("colour", "red")]);
        let b = VariantKey::new([("colour", "red"), ("size", "L")]);

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "colour=red;size=L");
    }

    #[test]
    fn repeated_axis_keeps_last_option() {
        let key = VariantKey::new([("size", "S"), ("size", "M")]);

        assert_eq!(key.len(), 1);
        assert_eq!(key.option("size"), Some("M"));
    }

    #[test]
    fn option_lookup_misses_unknown_axis() {
        let key = VariantKey::new([("size", "S")]);

        assert_eq!(key.option("colour"), None);
    }

    #[test]
    fn selector_prefers_axes_over_variant_id() {
        let selector =
            VariantSelector::from_parts(Some("v1".to_string()), Some([("size", "S")]));

        assert!(matches!(selector, VariantSelector::Axes(_)));
    }

    #[test]
    fn selector_falls_back_to_variant_id() {
        let selector =
            VariantSelector::from_parts(Some("v1".to_string()), None::<[(&str, &str); 0]>);

        assert_eq!(selector.variant_id(), Some("v1"));
    }

    #[test]
    fn empty_parts_select_nothing() {
        let selector =
            VariantSelector::from_parts(Some(String::new()), Some([] as [(&str, &str); 0]));

        assert_eq!(selector, VariantSelector::None);
        assert_eq!(selector.to_string(), "-");
    }
}
