use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Quality rank of a data source, used to order conflicting facts.
///
/// Variants are declared lowest first so the derived `Ord` ranks
/// `Curated` highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceQuality {
    Aggregated,
    Partner,
    Original,
    Curated,
}

impl SourceQuality {
    pub fn score(&self) -> u8 {
        match self {
            SourceQuality::Curated => 40,
            SourceQuality::Original => 30,
            SourceQuality::Partner => 20,
            SourceQuality::Aggregated => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceQuality::Curated => "CURATED",
            SourceQuality::Original => "ORIGINAL",
            SourceQuality::Partner => "PARTNER",
            SourceQuality::Aggregated => "AGGREGATED",
        }
    }
}

impl fmt::Display for SourceQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of the provider record that asserted a fact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// The provider system, e.g. `chargepoint` or `nrel_afdc`
    pub system: String,
    pub quality: SourceQuality,
    /// Provider-local identifier of the record, when the provider has one
    pub record_id: Option<String>,
}

impl SourceRef {
    pub fn new(system: impl Into<String>, quality: SourceQuality) -> Self {
        Self {
            system: system.into(),
            quality,
            record_id: None,
        }
    }

    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }
}

/// A value that can be stored in a [`SourcedAttribute`].
pub trait AttributeValue: Clone + Ord {
    /// Blank values (empty strings, zero ids) are never recorded as facts.
    fn is_blank(&self) -> bool;

    /// Collapse the sorted, distinct values of a single-valued attribute
    /// into one reading.
    fn collapse(values: Vec<Self>) -> Option<Self> {
        values.into_iter().next()
    }
}

impl AttributeValue for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }

    /// Disagreeing sources are all kept, joined with `;`.
    fn collapse(values: Vec<Self>) -> Option<Self> {
        if values.is_empty() {
            None
        } else {
            Some(values.join(";"))
        }
    }
}

impl AttributeValue for u64 {
    fn is_blank(&self) -> bool {
        *self == 0
    }
}

/// One source's claim about a value. Two sources asserting the same value
/// are two distinct facts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourcedValue<T> {
    pub source: SourceRef,
    pub value: T,
}

impl<T> SourcedValue<T> {
    pub fn new(source: SourceRef, value: T) -> Self {
        Self { source, value }
    }
}

/// Every source's claims about one logical field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcedAttribute<T: AttributeValue> {
    values: BTreeSet<SourcedValue<T>>,
    multi: bool,
}

impl<T: AttributeValue> Default for SourcedAttribute<T> {
    fn default() -> Self {
        Self::single()
    }
}

impl<T: AttributeValue> SourcedAttribute<T> {
    /// An attribute expected to hold one value per entity.
    pub fn single() -> Self {
        Self {
            values: BTreeSet::new(),
            multi: false,
        }
    }

    /// An attribute that legitimately holds several values (cross-reference ids).
    pub fn multi() -> Self {
        Self {
            values: BTreeSet::new(),
            multi: true,
        }
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Record a fact. Blank values are ignored.
    pub fn set(&mut self, value: SourcedValue<T>) {
        if value.value.is_blank() {
            return;
        }
        self.values.insert(value);
    }

    pub fn set_from(&mut self, source: &SourceRef, value: T) {
        self.set(SourcedValue::new(source.clone(), value));
    }

    /// Sorted, distinct raw values, ignoring provenance.
    pub fn all(&self) -> Vec<T> {
        let distinct: BTreeSet<&T> = self.values.iter().map(|v| &v.value).collect();
        distinct.into_iter().cloned().collect()
    }

    /// The attribute's reading: every distinct value for a multi attribute,
    /// otherwise at most one collapsed value (see [`AttributeValue::collapse`]).
    pub fn get(&self) -> Vec<T> {
        if self.multi {
            return self.all();
        }
        T::collapse(self.all()).into_iter().collect()
    }

    /// The single reading of the attribute, if any.
    pub fn value(&self) -> Option<T> {
        if self.multi {
            return self.all().into_iter().next();
        }
        T::collapse(self.all())
    }

    /// Union of both attributes' facts.
    pub fn extend(&mut self, other: &SourcedAttribute<T>) {
        self.values.extend(other.values.iter().cloned());
    }

    /// A fresh attribute holding the facts of both sides.
    pub fn union(first: &SourcedAttribute<T>, second: &SourcedAttribute<T>) -> Self {
        let mut combined = Self {
            values: BTreeSet::new(),
            multi: first.multi || second.multi,
        };
        combined.extend(first);
        combined.extend(second);
        combined
    }

    pub fn contains(&self, value: &SourcedValue<T>) -> bool {
        self.values.contains(value)
    }

    pub fn sourced_values(&self) -> impl Iterator<Item = &SourcedValue<T>> {
        self.values.iter()
    }

    /// Facts ordered for presentation: best source first, then by value,
    /// then by system name.
    pub fn ranked(&self) -> Vec<&SourcedValue<T>> {
        let mut ranked: Vec<&SourcedValue<T>> = self.values.iter().collect();
        ranked.sort_by(|a, b| {
            b.source
                .quality
                .cmp(&a.source.quality)
                .then_with(|| a.value.cmp(&b.value))
                .then_with(|| a.source.system.cmp(&b.source.system))
        });
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(system: &str, quality: SourceQuality) -> SourceRef {
        SourceRef::new(system, quality)
    }

    #[test]
    fn blank_values_are_never_recorded() {
        let mut name: SourcedAttribute<String> = SourcedAttribute::single();
        name.set_from(&source("osm", SourceQuality::Aggregated), String::new());
        assert!(name.is_empty());

        let mut nrel: SourcedAttribute<u64> = SourcedAttribute::multi();
        nrel.set_from(&source("nrel", SourceQuality::Original), 0);
        assert!(nrel.is_empty());
    }

    #[test]
    fn same_value_from_two_sources_is_two_facts() {
        let mut city: SourcedAttribute<String> = SourcedAttribute::single();
        city.set_from(&source("osm", SourceQuality::Aggregated), "Boston".to_string());
        city.set_from(&source("nrel", SourceQuality::Original), "Boston".to_string());

        assert_eq!(city.len(), 2);
        assert_eq!(city.all(), vec!["Boston".to_string()]);
        assert_eq!(city.value(), Some("Boston".to_string()));
    }

    #[test]
    fn disagreeing_strings_are_joined() {
        let mut name: SourcedAttribute<String> = SourcedAttribute::single();
        name.set_from(&source("b", SourceQuality::Partner), "Town Hall".to_string());
        name.set_from(&source("a", SourceQuality::Curated), "City Hall".to_string());

        assert_eq!(name.get(), vec!["City Hall;Town Hall".to_string()]);
    }

    #[test]
    fn non_string_single_value_picks_smallest() {
        let mut id: SourcedAttribute<u64> = SourcedAttribute::single();
        id.set_from(&source("b", SourceQuality::Partner), 9);
        id.set_from(&source("a", SourceQuality::Partner), 4);

        assert_eq!(id.value(), Some(4));
    }

    #[test]
    fn multi_attribute_returns_every_value() {
        let mut ids: SourcedAttribute<u64> = SourcedAttribute::multi();
        ids.set_from(&source("a", SourceQuality::Partner), 7);
        ids.set_from(&source("b", SourceQuality::Partner), 3);
        ids.set_from(&source("c", SourceQuality::Partner), 7);

        assert_eq!(ids.get(), vec![3, 7]);
    }

    #[test]
    fn extend_unions_provenance() {
        let mut first: SourcedAttribute<String> = SourcedAttribute::single();
        first.set_from(&source("a", SourceQuality::Partner), "x".to_string());
        let mut second: SourcedAttribute<String> = SourcedAttribute::single();
        second.set_from(&source("b", SourceQuality::Partner), "x".to_string());

        let forward = SourcedAttribute::union(&first, &second);
        let backward = SourcedAttribute::union(&second, &first);

        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 2);
    }

    #[test]
    fn ranked_orders_by_quality_then_value() {
        let mut name: SourcedAttribute<String> = SourcedAttribute::single();
        name.set_from(&source("osm", SourceQuality::Aggregated), "A".to_string());
        name.set_from(&source("cp", SourceQuality::Original), "B".to_string());
        name.set_from(&source("edit", SourceQuality::Curated), "C".to_string());

        let systems: Vec<&str> = name.ranked().iter().map(|v| v.source.system.as_str()).collect();
        assert_eq!(systems, vec!["edit", "cp", "osm"]);
    }
}
