//! Reconciliation of stored effect sizes with the exposure × outcome ×
//! moderator cross product.
//!
//! A review only stores the effect sizes that have been edited. The form
//! shows one entry for every combination of the review's exposures, outcomes
//! and moderators, so missing combinations are filled with placeholders.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

use crate::domain::{
    labels,
    review::{EffectSize, EffectSizeField, Exposure, Moderator, Outcome, Review},
    validation::{FieldErrors, validate_record},
};

/// The compound key addressing an effect size.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectSizeKey {
    /// Identifier of the exposure.
    pub exposure_id: String,
    /// Identifier of the outcome.
    pub outcome_id: String,
    /// Identifier of the moderator.
    pub moderator_id: String,
}

impl EffectSizeKey {
    /// Creates a key from its three identifiers.
    #[must_use]
    pub fn new(
        exposure_id: impl Into<String>,
        outcome_id: impl Into<String>,
        moderator_id: impl Into<String>,
    ) -> Self {
        Self {
            exposure_id: exposure_id.into(),
            outcome_id: outcome_id.into(),
            moderator_id: moderator_id.into(),
        }
    }

    /// The key of a stored effect size.
    #[must_use]
    pub fn of(effect_size: &EffectSize) -> Self {
        Self::new(
            effect_size.exposure_id.as_str(),
            effect_size.outcome_id.as_str(),
            effect_size.moderator_id.as_str(),
        )
    }

    fn matches(&self, effect_size: &EffectSize) -> bool {
        self.exposure_id == effect_size.exposure_id
            && self.outcome_id == effect_size.outcome_id
            && self.moderator_id == effect_size.moderator_id
    }
}

/// Renders the key colon-delimited: `exposure:outcome:moderator`.
impl fmt::Display for EffectSizeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.exposure_id, self.outcome_id, self.moderator_id
        )
    }
}

/// A triple with no stored effect size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    key: EffectSizeKey,
    errors: FieldErrors<EffectSizeField>,
}

impl Placeholder {
    fn new(key: EffectSizeKey) -> Self {
        let blank = Self::blank_for(&key);
        Self {
            errors: validate_record(&blank).unwrap_or_default(),
            key,
        }
    }

    fn blank_for(key: &EffectSizeKey) -> EffectSize {
        EffectSize::blank(
            key.exposure_id.as_str(),
            key.outcome_id.as_str(),
            key.moderator_id.as_str(),
        )
    }

    /// The triple this placeholder stands in for.
    #[must_use]
    pub const fn key(&self) -> &EffectSizeKey {
        &self.key
    }

    /// The errors a fresh record for this triple would have.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors<EffectSizeField> {
        &self.errors
    }

    /// Creates the blank record to start editing this triple from.
    ///
    /// The record only becomes part of the review once it is upserted.
    #[must_use]
    pub fn materialize(&self) -> EffectSize {
        Self::blank_for(&self.key)
    }
}

/// Whether a visible entry is backed by stored data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<'a> {
    /// A stored effect size.
    Persisted(&'a EffectSize),
    /// No effect size is stored for the triple yet.
    Placeholder(Placeholder),
}

/// One entry of the effect-size form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleEffectSize<'a> {
    /// Human readable description of the triple.
    pub label: String,
    /// The stored record or its placeholder.
    pub slot: Slot<'a>,
}

impl VisibleEffectSize<'_> {
    /// The compound key of the entry.
    #[must_use]
    pub fn key(&self) -> EffectSizeKey {
        match &self.slot {
            Slot::Persisted(effect_size) => EffectSizeKey::of(effect_size),
            Slot::Placeholder(placeholder) => placeholder.key.clone(),
        }
    }

    /// Whether the entry is a placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.slot, Slot::Placeholder(_))
    }

    /// The record to edit for this entry.
    #[must_use]
    pub fn to_effect_size(&self) -> EffectSize {
        match &self.slot {
            Slot::Persisted(effect_size) => (*effect_size).clone(),
            Slot::Placeholder(placeholder) => placeholder.materialize(),
        }
    }

    /// Validation errors of the entry.
    #[must_use]
    pub fn errors(&self) -> FieldErrors<EffectSizeField> {
        match &self.slot {
            Slot::Persisted(effect_size) => validate_record(*effect_size).unwrap_or_default(),
            Slot::Placeholder(placeholder) => placeholder.errors.clone(),
        }
    }
}

/// Where a compound key collision was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionSource {
    /// Several stored effect sizes share the key; the last one is shown.
    Stored,
    /// Sibling records share an identifier, so the triple is produced
    /// several times.
    Siblings,
}

/// A compound key that does not identify a single entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    /// The colliding key.
    pub key: EffectSizeKey,
    /// Where the collision comes from.
    pub source: CollisionSource,
    /// How many times the key occurred.
    pub occurrences: usize,
}

/// The visible effect sizes of a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation<'a> {
    entries: Vec<VisibleEffectSize<'a>>,
    collisions: Vec<Collision>,
}

impl<'a> Reconciliation<'a> {
    /// The entries, exposure-major, then outcome, then moderator.
    #[must_use]
    pub fn entries(&self) -> &[VisibleEffectSize<'a>] {
        &self.entries
    }

    /// Consumes the reconciliation, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<VisibleEffectSize<'a>> {
        self.entries
    }

    /// Keys that did not resolve to a single entry.
    #[must_use]
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Number of entries that have no stored effect size.
    #[must_use]
    pub fn placeholders(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_placeholder()).count()
    }
}

/// Builds the label of an entry from the texts of its triple.
#[must_use]
pub fn label(exposure: &Exposure, outcome: &Outcome, moderator: &Moderator) -> String {
    format!(
        "{} {} {}: {}, {}: {}, {}: {}",
        labels::HEADING_EFFECT_SIZE,
        labels::SUBHEADING_EFFECT_SIZE_FOR,
        labels::SUBHEADING_EFFECT_SIZE_EXPOSURE,
        exposure.content_specifics,
        labels::SUBHEADING_EFFECT_SIZE_OUTCOME,
        outcome.specific_variable,
        labels::SUBHEADING_EFFECT_SIZE_MODERATOR,
        moderator.level,
    )
}

/// Produces one entry per exposure × outcome × moderator triple.
///
/// Stored effect sizes whose triple no longer exists are not shown. When
/// several stored effect sizes share a key the last one wins; every such key,
/// and every triple produced more than once because of duplicate sibling ids,
/// is reported in [`Reconciliation::collisions`].
#[must_use]
pub fn reconcile(review: &Review) -> Reconciliation<'_> {
    let mut stored: HashMap<EffectSizeKey, &EffectSize> = HashMap::new();
    let mut stored_counts: BTreeMap<EffectSizeKey, usize> = BTreeMap::new();
    for effect_size in &review.effect_sizes {
        let key = EffectSizeKey::of(effect_size);
        *stored_counts.entry(key.clone()).or_default() += 1;
        stored.insert(key, effect_size);
    }

    let capacity = review.exposures.len() * review.outcomes.len() * review.moderators.len();
    let mut entries = Vec::with_capacity(capacity);
    let mut produced: BTreeMap<EffectSizeKey, usize> = BTreeMap::new();

    for exposure in &review.exposures {
        for outcome in &review.outcomes {
            for moderator in &review.moderators {
                let key = EffectSizeKey::new(
                    exposure.id.as_str(),
                    outcome.id.as_str(),
                    moderator.id.as_str(),
                );
                *produced.entry(key.clone()).or_default() += 1;
                let slot = match stored.get(&key) {
                    Some(effect_size) => Slot::Persisted(effect_size),
                    None => Slot::Placeholder(Placeholder::new(key)),
                };
                entries.push(VisibleEffectSize {
                    label: label(exposure, outcome, moderator),
                    slot,
                });
            }
        }
    }

    let collisions: Vec<Collision> = collisions(stored_counts, CollisionSource::Stored)
        .chain(collisions(produced, CollisionSource::Siblings))
        .collect();
    for collision in &collisions {
        tracing::warn!(
            key = %collision.key,
            source = ?collision.source,
            occurrences = collision.occurrences,
            "effect size key collision"
        );
    }

    Reconciliation {
        entries,
        collisions,
    }
}

fn collisions(
    counts: BTreeMap<EffectSizeKey, usize>,
    source: CollisionSource,
) -> impl Iterator<Item = Collision> {
    counts
        .into_iter()
        .filter(|&(_, occurrences)| occurrences > 1)
        .map(move |(key, occurrences)| Collision {
            key,
            source,
            occurrences,
        })
}

/// Returns the review's effect sizes with `candidate` stored.
///
/// A stored effect size with the same key is replaced in place; otherwise the
/// candidate is appended. When the key is stored more than once the last copy
/// is replaced, since that is the one [`reconcile`] shows. The review is not
/// modified.
#[must_use]
pub fn upsert_effect_size(review: &Review, candidate: EffectSize) -> Vec<EffectSize> {
    let key = EffectSizeKey::of(&candidate);
    let mut effect_sizes = review.effect_sizes.clone();
    match effect_sizes
        .iter()
        .rposition(|effect_size| key.matches(effect_size))
    {
        Some(index) => effect_sizes[index] = candidate,
        None => effect_sizes.push(candidate),
    }
    effect_sizes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{review::Field, validation::ErrorKind};

    fn review_with(exposures: usize, outcomes: usize, moderators: usize) -> Review {
        let mut review = Review::blank_with_id("r1");
        review.exposures = (0..exposures)
            .map(|i| Exposure {
                id: format!("e{i}"),
                content_specifics: format!("exposure {i}"),
                ..Exposure::blank()
            })
            .collect();
        review.outcomes = (0..outcomes)
            .map(|i| Outcome {
                id: format!("o{i}"),
                specific_variable: format!("outcome {i}"),
                ..Outcome::blank()
            })
            .collect();
        review.moderators = (0..moderators)
            .map(|i| Moderator {
                id: format!("m{i}"),
                level: format!("level {i}"),
                ..Moderator::blank()
            })
            .collect();
        review
    }

    #[test]
    fn cross_product_is_exposure_major() {
        let review = review_with(2, 1, 3);

        let reconciliation = reconcile(&review);
        let keys: Vec<String> = reconciliation
            .entries()
            .iter()
            .map(|entry| entry.key().to_string())
            .collect();

        assert_eq!(
            keys,
            vec![
                "e0:o0:m0", "e0:o0:m1", "e0:o0:m2", "e1:o0:m0", "e1:o0:m1", "e1:o0:m2",
            ]
        );
        assert_eq!(reconciliation.placeholders(), 6);
        assert!(reconciliation.collisions().is_empty());
    }

    #[test]
    fn stored_effect_sizes_are_shown() {
        let mut review = review_with(1, 1, 2);
        let mut stored = EffectSize::blank("e0", "o0", "m1");
        stored.value = "0.4".to_string();
        review.effect_sizes.push(stored.clone());

        let reconciliation = reconcile(&review);
        let entries = reconciliation.entries();

        assert!(entries[0].is_placeholder());
        assert_eq!(entries[1].slot, Slot::Persisted(&stored));
        assert_eq!(entries[1].to_effect_size().value, "0.4");
    }

    #[test]
    fn placeholders_carry_blank_record_errors() {
        let review = review_with(1, 1, 1);
        let reconciliation = reconcile(&review);
        let entry = &reconciliation.entries()[0];

        let Slot::Placeholder(placeholder) = &entry.slot else {
            panic!("expected a placeholder");
        };
        assert_eq!(placeholder.errors().len(), EffectSizeField::ALL.len());
        assert!(placeholder.errors().values().all(|&kind| kind == ErrorKind::Empty));
        assert_eq!(placeholder.materialize(), EffectSize::blank("e0", "o0", "m0"));
    }

    #[test]
    fn labels_join_triple_texts() {
        let review = review_with(1, 1, 1);
        let reconciliation = reconcile(&review);

        assert_eq!(
            reconciliation.entries()[0].label,
            "Effect Size for Exposure: exposure 0, Outcome: outcome 0, Moderator: level 0"
        );
    }

    #[test]
    fn reconciling_twice_is_element_wise_equal() {
        let mut review = review_with(2, 2, 2);
        review.effect_sizes.push(EffectSize::blank("e1", "o0", "m1"));

        assert_eq!(reconcile(&review), reconcile(&review));
    }

    #[test]
    fn dangling_effect_sizes_are_not_shown() {
        let mut review = review_with(1, 1, 1);
        review.effect_sizes.push(EffectSize::blank("gone", "o0", "m0"));

        let reconciliation = reconcile(&review);

        assert_eq!(reconciliation.entries().len(), 1);
        assert!(reconciliation.entries()[0].is_placeholder());
    }

    #[test]
    fn empty_collection_yields_no_entries() {
        let review = review_with(3, 0, 2);
        assert!(reconcile(&review).entries().is_empty());
    }

    #[test]
    fn identifiers_containing_the_delimiter_do_not_collide() {
        let mut review = review_with(0, 0, 0);
        review.exposures = vec![
            Exposure {
                id: "a:b".to_string(),
                ..Exposure::blank()
            },
            Exposure {
                id: "a".to_string(),
                ..Exposure::blank()
            },
        ];
        review.outcomes = vec![
            Outcome {
                id: "c".to_string(),
                ..Outcome::blank()
            },
            Outcome {
                id: "b:c".to_string(),
                ..Outcome::blank()
            },
        ];
        review.moderators = vec![Moderator {
            id: "m".to_string(),
            ..Moderator::blank()
        }];
        review.effect_sizes.push(EffectSize::blank("a:b", "c", "m"));

        let reconciliation = reconcile(&review);
        let persisted: Vec<_> = reconciliation
            .entries()
            .iter()
            .filter(|entry| !entry.is_placeholder())
            .map(VisibleEffectSize::key)
            .collect();

        // "a:b" + "c" and "a" + "b:c" render identically but are distinct keys
        assert_eq!(persisted, vec![EffectSizeKey::new("a:b", "c", "m")]);
        assert!(reconciliation.collisions().is_empty());
    }

    #[test]
    fn duplicate_stored_keys_are_reported_and_last_wins() {
        let mut review = review_with(1, 1, 1);
        let mut first = EffectSize::blank("e0", "o0", "m0");
        first.value = "1".to_string();
        let mut second = first.clone();
        second.value = "2".to_string();
        review.effect_sizes = vec![first, second];

        let reconciliation = reconcile(&review);

        assert_eq!(reconciliation.entries()[0].to_effect_size().value, "2");
        assert_eq!(
            reconciliation.collisions(),
            &[Collision {
                key: EffectSizeKey::new("e0", "o0", "m0"),
                source: CollisionSource::Stored,
                occurrences: 2,
            }]
        );
    }

    #[test]
    fn duplicate_sibling_ids_are_reported() {
        let mut review = review_with(1, 1, 2);
        review.moderators[1].id = "m0".to_string();

        let reconciliation = reconcile(&review);

        assert_eq!(reconciliation.entries().len(), 2);
        assert_eq!(reconciliation.collisions().len(), 1);
        assert_eq!(reconciliation.collisions()[0].source, CollisionSource::Siblings);
    }

    #[test]
    fn upsert_replaces_existing_triple() {
        let mut review = review_with(1, 1, 2);
        review.effect_sizes = vec![
            EffectSize::blank("e0", "o0", "m0"),
            EffectSize::blank("e0", "o0", "m1"),
        ];
        let mut candidate = EffectSize::blank("e0", "o0", "m0");
        candidate.value = "0.25".to_string();

        let effect_sizes = upsert_effect_size(&review, candidate);

        assert_eq!(effect_sizes.len(), 2);
        assert_eq!(effect_sizes[0].value, "0.25");
        assert!(review.effect_sizes[0].value.is_empty());
    }

    #[test]
    fn upsert_of_duplicated_key_replaces_the_shown_copy() {
        let mut review = review_with(1, 1, 1);
        let mut first = EffectSize::blank("e0", "o0", "m0");
        first.value = "1".to_string();
        let mut second = first.clone();
        second.value = "2".to_string();
        review.effect_sizes = vec![first, second];

        let mut edited = reconcile(&review).entries()[0].to_effect_size();
        edited.value = "9".to_string();
        review.effect_sizes = upsert_effect_size(&review, edited);

        assert_eq!(review.effect_sizes.len(), 2);
        assert_eq!(review.effect_sizes[0].value, "1");
        assert_eq!(reconcile(&review).entries()[0].to_effect_size().value, "9");
    }

    #[test]
    fn upsert_appends_novel_triple() {
        let mut review = review_with(1, 1, 2);
        review.effect_sizes = vec![EffectSize::blank("e0", "o0", "m0")];

        let effect_sizes = upsert_effect_size(&review, EffectSize::blank("e0", "o0", "m1"));

        assert_eq!(effect_sizes.len(), 2);
        assert_eq!(EffectSizeKey::of(&effect_sizes[1]), EffectSizeKey::new("e0", "o0", "m1"));
        assert_eq!(review.effect_sizes.len(), 1);
    }
}
