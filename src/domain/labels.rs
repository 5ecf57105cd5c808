//! Text shown to the operator.
#![allow(missing_docs)]

use crate::domain::{
    review::{EffectSizeField, ExposureField, ModeratorField, OutcomeField, ReviewField},
    validation::ErrorKind,
};

pub const HEADING_LIST_VIEW: &str = "Screen Time Extraction Database";

pub const TABLE_HEADING_EXTRACTOR_NAME: &str = "Extractor";
pub const TABLE_HEADING_EXTRACTION_DATE: &str = "Date";
pub const TABLE_HEADING_FIRST_AUTHOR: &str = "Author";
pub const TABLE_HEADING_YEAR_OF_PUBLICATION: &str = "Year";

pub const BUTTON_ADD_REVIEW: &str = "Add Review";
pub const BUTTON_LIST_REVIEWS: &str = "Back to Review List";
pub const BUTTON_SAVE: &str = "Save";

pub const HEADING_REVIEW_DETAILS: &str = "Review details";
pub const LABEL_REVIEW_ARE_YOU_SURE: &str = "Are you SURE the review meets all inclusion criteria and none of the exclusion criteria?";
pub const LABEL_REVIEW_AMSTAR_2: &str = "AMSTAR 2";

pub const HEADING_EXPOSURES: &str = "Exposures";
pub const HEADING_EXPOSURE: &str = "Exposure";
pub const BUTTON_EXPOSURE_ADD: &str = "Add Exposure";
pub const TITLE_EXPOSURE_REMOVE: &str = "Remove Exposure";

pub const HEADING_OUTCOMES: &str = "Outcomes";
pub const HEADING_OUTCOME: &str = "Outcome";
pub const BUTTON_OUTCOME_ADD: &str = "Add Outcome";
pub const TITLE_OUTCOME_REMOVE: &str = "Remove Outcome";

pub const HEADING_MODERATORS: &str = "Moderators";
pub const HEADING_MODERATOR: &str = "Moderator";
pub const BUTTON_MODERATOR_ADD: &str = "Add Moderator";
pub const TITLE_MODERATOR_REMOVE: &str = "Remove Moderator";

pub const HEADING_EFFECT_SIZE: &str = "Effect Size";
pub const SUBHEADING_QUANTITATIVE_STRENGTH: &str = "Quantitative Strength of Association";
pub const SUBHEADING_EFFECT_SIZE_FOR: &str = "for";
pub const SUBHEADING_EFFECT_SIZE_EXPOSURE: &str = "Exposure";
pub const SUBHEADING_EFFECT_SIZE_OUTCOME: &str = "Outcome";
pub const SUBHEADING_EFFECT_SIZE_MODERATOR: &str = "Moderator";

pub const MESSAGE_REVIEW_SAVED: &str = "Review saved successfully.";
pub const MESSAGE_REVIEW_ERROR: &str = "An unexpected error has occurred.";
pub const MESSAGE_VALIDATION_ERROR: &str = "Please review the fields below and correct any errors.";

/// Label of a review field.
#[must_use]
pub const fn review_field(field: ReviewField) -> &'static str {
    match field {
        ReviewField::ExtractorName => "Extractor Name",
        ReviewField::ExtractionDate => "Extraction Date",
        ReviewField::FirstAuthor => "First Author",
        ReviewField::YearOfPublication => "Year of Publication",
        ReviewField::SearchStrategyDesc => "Search strategy description",
        ReviewField::SampleAgeDesc => "Sample age - description (use quote where possible)",
        ReviewField::SampleAgeLowestMean => "Sample age - lowest study mean",
        ReviewField::SampleAgeHighestMean => "Sample age - highest study mean",
        ReviewField::InclusionExclusionConcerns => "Inclusion/exclusion concerns",
        ReviewField::EarliestPublicationYear => "Earliest study publication year",
        ReviewField::LatestPublicationYear => "Latest study publication year",
        ReviewField::NumberOfStudies => "k (number of studies)",
        ReviewField::NumberOfSamples => "N (combined sample across studies)",
        ReviewField::RatingOfLowRiskBias => "Authors' rating of % low risk of bias studies",
        ReviewField::RatingOfModerateRiskBias => {
            "Authors' rating of % moderate risk of bias studies"
        }
        ReviewField::RatingOfHighRiskBias => "Authors' rating of % high risk of bias studies",
        ReviewField::BiasRatingSystem => "Authors' system for rating risk of bias",
        ReviewField::BiasRatingSystemReference => {
            "Reference for authors' system for rating risk of bias"
        }
        ReviewField::LevelOfEvidenceJudgement1 => "Level of Evidence Judgement 1",
        ReviewField::LevelOfEvidenceJudgement2 => "Level of Evidence Judgement 2",
        ReviewField::LevelOfEvidenceJudgement3 => "Level of Evidence Judgement 3",
    }
}

/// Label of an exposure field.
#[must_use]
pub const fn exposure_field(field: ExposureField) -> &'static str {
    match field {
        ExposureField::ContentSpecifics => "Exposure content specifics",
        ExposureField::ContentCategory => "Exposure content category",
        ExposureField::Measure => "Exposure measure",
        ExposureField::MeasureType => "Exposure measure type",
        ExposureField::DeviceType => "Exposure specific device type",
        ExposureField::DeviceCategory => "Exposure device category",
        ExposureField::DevicePortability => "Exposure device portability",
        ExposureField::Setting => "Exposure specific setting",
        ExposureField::SettingCategory => "Exposure setting category",
        ExposureField::SocialEnvironmentSpecific => "Specific social environment",
        ExposureField::SocialEnvironmentGeneral => "General social environment",
    }
}

/// Label of an outcome field.
#[must_use]
pub const fn outcome_field(field: OutcomeField) -> &'static str {
    match field {
        OutcomeField::Measure => "Measure",
        OutcomeField::MeasureType => "Measure type",
        OutcomeField::SpecificVariable => "Specific variable",
        OutcomeField::HigherOrderVariable => "Higher-order variable",
        OutcomeField::Category => "Outcome category",
    }
}

/// Label of a moderator field.
#[must_use]
pub const fn moderator_field(field: ModeratorField) -> &'static str {
    match field {
        ModeratorField::Level => "Moderator Level",
        ModeratorField::Category => "Moderator Category",
    }
}

/// Label of an effect size field.
#[must_use]
pub const fn effect_size_field(field: EffectSizeField) -> &'static str {
    match field {
        EffectSizeField::TeamNarrativeSummary => "Team's Narrative Summary",
        EffectSizeField::Value => "Value",
        EffectSizeField::ValueLowerBound => "Value - CI lower bound",
        EffectSizeField::ValueUpperBound => "Value - CI upper bound",
        EffectSizeField::PValue => "p-value",
        EffectSizeField::StatisticalTest => "Statistical Test",
        EffectSizeField::Comments => "Comments",
    }
}

/// Guidance for a failing field.
#[must_use]
pub const fn validation_error(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Empty => "Enter NA (not applicable) or NR (not recorded)",
        ErrorKind::NotAnInteger => "Must be an integer",
        ErrorKind::NotADecimal => "Must be a number",
        ErrorKind::NotAYear => "Must be a 4 digit year",
    }
}
