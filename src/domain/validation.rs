//! Field-level validation of a review tree.
//!
//! Every text field carries a [`Rule`]. Rules never reject the inapplicable
//! markers `NA` and `NR` once the field is non-empty, so an extractor can
//! always mark a value as not applicable or not recorded.

use std::{collections::BTreeMap, fmt, sync::LazyLock};

use regex::Regex;
use serde::Serialize;

use crate::domain::{
    labels,
    review::{
        EffectSizeField, ExposureField, Field, ModeratorField, OutcomeField, Record, Review,
        ReviewField,
    },
};

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));
static DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(\.\d+)?").expect("valid regex"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{4}").expect("valid regex"));

/// The reason a field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The field is empty.
    Empty,
    /// The field does not contain an integer.
    NotAnInteger,
    /// The field does not contain a number.
    NotADecimal,
    /// The field does not contain a four digit year.
    NotAYear,
}

impl ErrorKind {
    /// The stable code of the error kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::NotAnInteger => "NOT_AN_INTEGER",
            Self::NotADecimal => "NOT_A_DECIMAL",
            Self::NotAYear => "NOT_A_YEAR",
        }
    }

    /// Guidance shown next to a field with this error.
    #[must_use]
    pub const fn message(self) -> &'static str {
        labels::validation_error(self)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Whether a value is one of the inapplicable markers (`na`, `nr`, any case).
#[must_use]
pub fn is_inapplicable(value: &str) -> bool {
    value.eq_ignore_ascii_case("na") || value.eq_ignore_ascii_case("nr")
}

/// Fails with [`ErrorKind::Empty`] when the value is the empty string.
///
/// # Errors
///
/// Returns the error kind when the value is empty.
pub fn not_empty(value: &str) -> Result<(), ErrorKind> {
    if value.is_empty() {
        Err(ErrorKind::Empty)
    } else {
        Ok(())
    }
}

/// Fails with [`ErrorKind::NotAnInteger`] unless the value is inapplicable or
/// contains a run of digits.
///
/// The match is not anchored, so `"12ab"` passes.
///
/// # Errors
///
/// Returns the error kind when no digit is present.
pub fn integer(value: &str) -> Result<(), ErrorKind> {
    check(value, &DIGITS, ErrorKind::NotAnInteger)
}

/// Fails with [`ErrorKind::NotADecimal`] unless the value is inapplicable or
/// contains digits, optionally followed by a fractional part.
///
/// # Errors
///
/// Returns the error kind when no number is present.
pub fn decimal(value: &str) -> Result<(), ErrorKind> {
    check(value, &DECIMAL, ErrorKind::NotADecimal)
}

/// Fails with [`ErrorKind::NotAYear`] unless the value is inapplicable or
/// contains four consecutive digits.
///
/// # Errors
///
/// Returns the error kind when no four digit run is present.
pub fn year(value: &str) -> Result<(), ErrorKind> {
    check(value, &YEAR, ErrorKind::NotAYear)
}

fn check(value: &str, pattern: &Regex, kind: ErrorKind) -> Result<(), ErrorKind> {
    if is_inapplicable(value) || pattern.is_match(value) {
        Ok(())
    } else {
        Err(kind)
    }
}

/// The validation applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Free text; must not be empty.
    Text,
    /// Must not be empty and must look like an integer.
    Integer,
    /// Must not be empty and must look like a number.
    Decimal,
    /// Must not be empty and must look like a year.
    Year,
}

impl Rule {
    /// Applies the rule to a value.
    ///
    /// # Errors
    ///
    /// Returns the first failing check.
    pub fn check(self, value: &str) -> Result<(), ErrorKind> {
        not_empty(value)?;
        match self {
            Self::Text => Ok(()),
            Self::Integer => integer(value),
            Self::Decimal => decimal(value),
            Self::Year => year(value),
        }
    }
}

/// Errors of a single record, keyed by field. Passing fields have no entry.
pub type FieldErrors<F> = BTreeMap<F, ErrorKind>;

/// Errors of a collection, positionally aligned with its elements.
pub type CollectionErrors<F> = Vec<Option<FieldErrors<F>>>;

/// Validates every field of a record.
///
/// Returns `None` when all fields pass.
#[must_use]
pub fn validate_record<R: Record>(record: &R) -> Option<FieldErrors<R::Field>> {
    let errors: FieldErrors<R::Field> = R::Field::ALL
        .iter()
        .filter_map(|&field| {
            field
                .rule()
                .check(record.value(field))
                .err()
                .map(|kind| (field, kind))
        })
        .collect();
    (!errors.is_empty()).then_some(errors)
}

/// Validates each element of a collection.
///
/// Returns `None` when no element has an error.
#[must_use]
pub fn validate_collection<R: Record>(records: &[R]) -> Option<CollectionErrors<R::Field>> {
    let errors: CollectionErrors<R::Field> = records.iter().map(validate_record).collect();
    errors.iter().any(Option::is_some).then_some(errors)
}

/// The error tree of a review, mirroring its shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReviewErrors {
    /// Errors of the review's own fields.
    pub fields: FieldErrors<ReviewField>,
    /// Errors of the exposures, if any exposure failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exposures: Option<CollectionErrors<ExposureField>>,
    /// Errors of the outcomes, if any outcome failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<CollectionErrors<OutcomeField>>,
    /// Errors of the moderators, if any moderator failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderators: Option<CollectionErrors<ModeratorField>>,
    /// Errors of the stored effect sizes, if any failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_sizes: Option<CollectionErrors<EffectSizeField>>,
}

impl ReviewErrors {
    /// Whether the tree holds no error at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.exposures.is_none()
            && self.outcomes.is_none()
            && self.moderators.is_none()
            && self.effect_sizes.is_none()
    }

    /// The error of a review field, if any.
    #[must_use]
    pub fn field(&self, field: ReviewField) -> Option<ErrorKind> {
        self.fields.get(&field).copied()
    }

    /// The errors of the exposure at `index`, if any.
    #[must_use]
    pub fn exposure(&self, index: usize) -> Option<&FieldErrors<ExposureField>> {
        element(self.exposures.as_ref(), index)
    }

    /// The errors of the outcome at `index`, if any.
    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<&FieldErrors<OutcomeField>> {
        element(self.outcomes.as_ref(), index)
    }

    /// The errors of the moderator at `index`, if any.
    #[must_use]
    pub fn moderator(&self, index: usize) -> Option<&FieldErrors<ModeratorField>> {
        element(self.moderators.as_ref(), index)
    }

    /// The errors of the stored effect size at `index`, if any.
    #[must_use]
    pub fn effect_size(&self, index: usize) -> Option<&FieldErrors<EffectSizeField>> {
        element(self.effect_sizes.as_ref(), index)
    }

    /// Flattens the tree into path/kind pairs such as `exposures[1].measure`.
    #[must_use]
    pub fn entries(&self) -> Vec<ErrorEntry> {
        let mut entries: Vec<ErrorEntry> = self
            .fields
            .iter()
            .map(|(field, &kind)| ErrorEntry {
                path: field.name().to_string(),
                label: field.label(),
                kind,
            })
            .collect();
        push_collection(&mut entries, "exposures", self.exposures.as_ref());
        push_collection(&mut entries, "outcomes", self.outcomes.as_ref());
        push_collection(&mut entries, "moderators", self.moderators.as_ref());
        push_collection(&mut entries, "effect_sizes", self.effect_sizes.as_ref());
        entries
    }

    /// Total number of failing fields in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries().len()
    }
}

fn element<F>(errors: Option<&CollectionErrors<F>>, index: usize) -> Option<&FieldErrors<F>> {
    errors.and_then(|errors| errors.get(index)).and_then(Option::as_ref)
}

fn push_collection<F: Field>(
    entries: &mut Vec<ErrorEntry>,
    name: &str,
    errors: Option<&CollectionErrors<F>>,
) {
    let Some(errors) = errors else {
        return;
    };
    for (index, record) in errors.iter().enumerate() {
        for (field, &kind) in record.iter().flatten() {
            entries.push(ErrorEntry {
                path: format!("{name}[{index}].{}", field.name()),
                label: field.label(),
                kind,
            });
        }
    }
}

/// One failing field of a review, located by path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// Dotted path of the field, e.g. `outcomes[0].category`.
    pub path: String,
    /// Label of the field.
    #[serde(skip)]
    pub label: &'static str,
    /// Why the field failed.
    pub kind: ErrorKind,
}

/// The outcome of validating a review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// Every field passed.
    Valid,
    /// At least one field failed.
    Invalid(ReviewErrors),
}

impl Validation {
    /// Whether the review passed validation.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// The error tree, when invalid.
    #[must_use]
    pub const fn errors(&self) -> Option<&ReviewErrors> {
        match self {
            Self::Valid => None,
            Self::Invalid(errors) => Some(errors),
        }
    }
}

/// Validates the review's own fields and all four sub-collections.
#[must_use]
pub fn validate_review(review: &Review) -> Validation {
    let errors = ReviewErrors {
        fields: validate_record(review).unwrap_or_default(),
        exposures: validate_collection(&review.exposures),
        outcomes: validate_collection(&review.outcomes),
        moderators: validate_collection(&review.moderators),
        effect_sizes: validate_collection(&review.effect_sizes),
    };
    if errors.is_empty() {
        Validation::Valid
    } else {
        tracing::debug!(errors = errors.len(), review = %review.id, "review failed validation");
        Validation::Invalid(errors)
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::domain::review::{EffectSize, Exposure, Moderator, Outcome};

    fn all_inapplicable() -> Review {
        let mut review = Review::blank_with_id("r1");
        for &field in ReviewField::ALL {
            *review.value_mut(field) = "NA".to_string();
        }
        review.moderators.clear();
        review
    }

    #[test]
    fn not_empty_rejects_only_the_empty_string() {
        assert_eq!(not_empty(""), Err(ErrorKind::Empty));
        assert_eq!(not_empty("x"), Ok(()));
        assert_eq!(not_empty(" "), Ok(()));
    }

    #[test_case("NA" ; "upper na")]
    #[test_case("na" ; "lower na")]
    #[test_case("NR" ; "upper nr")]
    #[test_case("nr" ; "lower nr")]
    #[test_case("Na" ; "mixed case")]
    fn inapplicable_markers_pass_every_type_rule(value: &str) {
        assert_eq!(integer(value), Ok(()));
        assert_eq!(decimal(value), Ok(()));
        assert_eq!(year(value), Ok(()));
    }

    #[test_case("12", Ok(()) ; "plain integer")]
    #[test_case("12ab", Ok(()) ; "digits anywhere pass")]
    #[test_case("abc", Err(ErrorKind::NotAnInteger) ; "no digits")]
    #[test_case("n/a", Err(ErrorKind::NotAnInteger) ; "not a marker")]
    fn integer_rule(value: &str, expected: Result<(), ErrorKind>) {
        assert_eq!(integer(value), expected);
    }

    #[test_case("0.45", Ok(()) ; "fraction")]
    #[test_case("3", Ok(()) ; "whole number")]
    #[test_case("-0.2", Ok(()) ; "sign is ignored")]
    #[test_case("low", Err(ErrorKind::NotADecimal) ; "text")]
    fn decimal_rule(value: &str, expected: Result<(), ErrorKind>) {
        assert_eq!(decimal(value), expected);
    }

    #[test_case("1999", Ok(()) ; "year")]
    #[test_case("c. 2004", Ok(()) ; "embedded year")]
    #[test_case("99", Err(ErrorKind::NotAYear) ; "two digits")]
    #[test_case("19 99", Err(ErrorKind::NotAYear) ; "split digits")]
    fn year_rule(value: &str, expected: Result<(), ErrorKind>) {
        assert_eq!(year(value), expected);
    }

    #[test]
    fn rule_reports_empty_before_type() {
        assert_eq!(Rule::Year.check(""), Err(ErrorKind::Empty));
        assert_eq!(Rule::Integer.check(""), Err(ErrorKind::Empty));
        assert_eq!(Rule::Text.check("anything"), Ok(()));
    }

    #[test]
    fn blank_review_fails_every_scalar_field_with_empty() {
        let Validation::Invalid(errors) = validate_review(&Review::blank()) else {
            panic!("blank review should be invalid");
        };

        assert_eq!(errors.fields.len(), ReviewField::ALL.len());
        assert!(errors.fields.len() >= 20);
        assert!(errors.fields.values().all(|&kind| kind == ErrorKind::Empty));
        // the seeded Overall moderator is complete
        assert!(errors.moderators.is_none());
    }

    #[test]
    fn all_inapplicable_review_is_valid() {
        assert_eq!(validate_review(&all_inapplicable()), Validation::Valid);
    }

    #[test]
    fn type_errors_are_reported_per_field() {
        let mut review = all_inapplicable();
        review.year_of_publication = "99".to_string();
        review.number_of_studies = "several".to_string();

        let errors = validate_review(&review);
        let errors = errors.errors().unwrap();

        assert_eq!(
            errors.field(ReviewField::YearOfPublication),
            Some(ErrorKind::NotAYear)
        );
        assert_eq!(
            errors.field(ReviewField::NumberOfStudies),
            Some(ErrorKind::NotAnInteger)
        );
        assert_eq!(errors.field(ReviewField::FirstAuthor), None);
    }

    #[test]
    fn collection_errors_are_positional() {
        let mut review = all_inapplicable();
        let mut complete = Outcome::blank();
        for &field in OutcomeField::ALL {
            *complete.value_mut(field) = "x".to_string();
        }
        review.outcomes = vec![complete, Outcome::blank()];

        let errors = validate_review(&review);
        let errors = errors.errors().unwrap();
        let outcomes = errors.outcomes.as_ref().unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].is_none());
        assert_eq!(
            errors.outcome(1).unwrap().get(&OutcomeField::Category),
            Some(&ErrorKind::Empty)
        );
        assert!(errors.exposures.is_none());
    }

    #[test]
    fn collection_without_errors_aggregates_to_none() {
        let moderators = vec![Moderator::overall(), Moderator::overall()];
        assert!(validate_collection(&moderators).is_none());
        assert!(validate_collection::<Exposure>(&[]).is_none());
    }

    #[test]
    fn effect_size_measures_must_be_numbers() {
        let mut effect_size = EffectSize::blank("e", "o", "m");
        for &field in EffectSizeField::ALL {
            *effect_size.value_mut(field) = "moderate".to_string();
        }

        let errors = validate_record(&effect_size).unwrap();

        assert_eq!(errors.len(), 4);
        assert_eq!(
            errors.get(&EffectSizeField::PValue),
            Some(&ErrorKind::NotADecimal)
        );
        assert!(!errors.contains_key(&EffectSizeField::Comments));
    }

    #[test]
    fn entries_locate_nested_errors() {
        let mut review = all_inapplicable();
        review.first_author = String::new();
        review.exposures = vec![Exposure::blank().fill_blank_except_measure()];

        let errors = validate_review(&review);
        let entries = errors.errors().unwrap().entries();

        let paths: Vec<_> = entries.iter().map(|entry| entry.path.as_str()).collect();
        assert_eq!(paths, vec!["first_author", "exposures[0].measure"]);
        assert!(entries.iter().all(|entry| entry.kind == ErrorKind::Empty));
    }

    #[test]
    fn error_kinds_serialize_as_codes() {
        let json = serde_json::to_string(&ErrorKind::NotADecimal).unwrap();
        assert_eq!(json, "\"NOT_A_DECIMAL\"");
        assert_eq!(ErrorKind::NotAYear.to_string(), "NOT_A_YEAR");
    }

    trait FillExceptMeasure {
        fn fill_blank_except_measure(self) -> Self;
    }

    impl FillExceptMeasure for Exposure {
        fn fill_blank_except_measure(mut self) -> Self {
            for &field in ExposureField::ALL {
                if field != ExposureField::Measure {
                    *self.value_mut(field) = "x".to_string();
                }
            }
            self
        }
    }
}
