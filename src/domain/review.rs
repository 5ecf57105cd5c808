use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{labels, validation::Rule};

/// Token written into blank fields by [`Review::fill_blanks`].
pub const FILL_TOKEN: &str = "na";

/// Level and category of the moderator every new review starts with.
pub const OVERALL: &str = "Overall";

/// A scalar text field of a [`Record`].
///
/// Fields are closed enumerations so that validation errors, form prompts and
/// bulk rewrites can address a field without stringly-typed lookups.
pub trait Field: Copy + Eq + Ord + fmt::Debug + 'static {
    /// Every field of the record, in form order.
    const ALL: &'static [Self];

    /// The field name used on the wire.
    fn name(self) -> &'static str;

    /// The label shown next to the field.
    fn label(self) -> &'static str;

    /// The validation rule applied to the field.
    fn rule(self) -> Rule;
}

/// A record made of scalar text fields.
pub trait Record {
    /// The field enumeration of this record.
    type Field: Field;

    /// Returns the current value of a field.
    fn value(&self, field: Self::Field) -> &str;

    /// Returns a mutable reference to a field.
    fn value_mut(&mut self, field: Self::Field) -> &mut String;

    /// Returns a copy of the record with one field replaced.
    #[must_use]
    fn with_value(&self, field: Self::Field, value: impl Into<String>) -> Self
    where
        Self: Clone,
    {
        let mut record = self.clone();
        *record.value_mut(field) = value.into();
        record
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn fill_record<R: Record>(record: &mut R) {
    for &field in R::Field::ALL {
        let value = record.value_mut(field);
        if value.is_empty() {
            FILL_TOKEN.clone_into(value);
        }
    }
}

/// One systematic-review data extraction.
///
/// Numeric fields are kept as text until they are validated, so that the
/// inapplicable markers `NA` and `NR` can be stored verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Client-generated identifier.
    pub id: String,
    /// Who extracted the data.
    #[serde(default, deserialize_with = "lenient::text")]
    pub extractor_name: String,
    /// When the data was extracted.
    #[serde(default, deserialize_with = "lenient::text")]
    pub extraction_date: String,
    /// Surname of the first author.
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_author: String,
    /// Year the review was published.
    #[serde(default, deserialize_with = "lenient::text")]
    pub year_of_publication: String,
    /// How the review searched for studies.
    #[serde(default, deserialize_with = "lenient::text")]
    pub search_strategy_desc: String,
    /// Age range of the pooled samples.
    #[serde(default, deserialize_with = "lenient::text")]
    pub sample_age_desc: String,
    /// Lowest mean sample age.
    #[serde(default, deserialize_with = "lenient::text")]
    pub sample_age_lowest_mean: String,
    /// Highest mean sample age.
    #[serde(default, deserialize_with = "lenient::text")]
    pub sample_age_highest_mean: String,
    /// Whether the extractor confirmed the review meets the inclusion criteria.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub are_you_sure: bool,
    /// Concerns about the inclusion and exclusion criteria.
    #[serde(default, deserialize_with = "lenient::text")]
    pub inclusion_exclusion_concerns: String,
    /// Publication year of the earliest included study.
    #[serde(default, deserialize_with = "lenient::text")]
    pub earliest_publication_year: String,
    /// Publication year of the latest included study.
    #[serde(default, deserialize_with = "lenient::text")]
    pub latest_publication_year: String,
    /// Number of included studies.
    #[serde(default, deserialize_with = "lenient::text")]
    pub number_of_studies: String,
    /// Number of included samples.
    #[serde(default, deserialize_with = "lenient::text")]
    pub number_of_samples: String,
    /// Share of studies rated at low risk of bias.
    #[serde(default, deserialize_with = "lenient::text")]
    pub rating_of_low_risk_bias: String,
    /// Share of studies rated at moderate risk of bias.
    #[serde(default, deserialize_with = "lenient::text")]
    pub rating_of_moderate_risk_bias: String,
    /// Share of studies rated at high risk of bias.
    #[serde(default, deserialize_with = "lenient::text")]
    pub rating_of_high_risk_bias: String,
    /// Name of the risk of bias tool.
    #[serde(default, deserialize_with = "lenient::text")]
    pub bias_rating_system: String,
    /// Citation of the risk of bias tool.
    #[serde(default, deserialize_with = "lenient::text")]
    pub bias_rating_system_reference: String,
    /// First level of evidence judgement.
    #[serde(default, deserialize_with = "lenient::text")]
    pub level_of_evidence_judgement_1: String,
    /// Second level of evidence judgement.
    #[serde(default, deserialize_with = "lenient::text")]
    pub level_of_evidence_judgement_2: String,
    /// Third level of evidence judgement.
    #[serde(default, deserialize_with = "lenient::text")]
    pub level_of_evidence_judgement_3: String,
    /// AMSTAR 2 checklist answers.
    #[serde(default)]
    pub amstar_2: Vec<String>,
    /// Exposures studied, in entry order.
    #[serde(default)]
    pub exposures: Vec<Exposure>,
    /// Outcomes studied, in entry order.
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    /// Moderator levels; a blank review starts with the Overall one.
    #[serde(default)]
    pub moderators: Vec<Moderator>,
    /// Stored effect sizes. Sparse: not every triple has an entry.
    #[serde(default)]
    pub effect_sizes: Vec<EffectSize>,
}

impl Review {
    /// Creates a blank review with a fresh identifier.
    ///
    /// The review starts with the baseline "Overall" moderator.
    #[must_use]
    pub fn blank() -> Self {
        Self::blank_with_id(new_id())
    }

    /// Creates a blank review with the given identifier.
    #[must_use]
    pub fn blank_with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extractor_name: String::new(),
            extraction_date: String::new(),
            first_author: String::new(),
            year_of_publication: String::new(),
            search_strategy_desc: String::new(),
            sample_age_desc: String::new(),
            sample_age_lowest_mean: String::new(),
            sample_age_highest_mean: String::new(),
            are_you_sure: false,
            inclusion_exclusion_concerns: String::new(),
            earliest_publication_year: String::new(),
            latest_publication_year: String::new(),
            number_of_studies: String::new(),
            number_of_samples: String::new(),
            rating_of_low_risk_bias: String::new(),
            rating_of_moderate_risk_bias: String::new(),
            rating_of_high_risk_bias: String::new(),
            bias_rating_system: String::new(),
            bias_rating_system_reference: String::new(),
            level_of_evidence_judgement_1: String::new(),
            level_of_evidence_judgement_2: String::new(),
            level_of_evidence_judgement_3: String::new(),
            amstar_2: Vec::new(),
            exposures: Vec::new(),
            outcomes: Vec::new(),
            moderators: vec![Moderator::overall()],
            effect_sizes: Vec::new(),
        }
    }

    /// Returns a copy of the review with every empty text value replaced by
    /// [`FILL_TOKEN`], at any depth.
    ///
    /// Non-empty values are left untouched, so applying this twice is the
    /// same as applying it once.
    #[must_use]
    pub fn fill_blanks(&self) -> Self {
        let mut review = self.clone();
        fill_record(&mut review);
        for answer in &mut review.amstar_2 {
            if answer.is_empty() {
                FILL_TOKEN.clone_into(answer);
            }
        }
        review.exposures.iter_mut().for_each(fill_record);
        review.outcomes.iter_mut().for_each(fill_record);
        review.moderators.iter_mut().for_each(fill_record);
        review.effect_sizes.iter_mut().for_each(fill_record);
        review
    }
}

/// Scalar text fields of a [`Review`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ReviewField {
    ExtractorName,
    ExtractionDate,
    FirstAuthor,
    YearOfPublication,
    SearchStrategyDesc,
    SampleAgeDesc,
    SampleAgeLowestMean,
    SampleAgeHighestMean,
    InclusionExclusionConcerns,
    EarliestPublicationYear,
    LatestPublicationYear,
    NumberOfStudies,
    NumberOfSamples,
    RatingOfLowRiskBias,
    RatingOfModerateRiskBias,
    RatingOfHighRiskBias,
    BiasRatingSystem,
    BiasRatingSystemReference,
    LevelOfEvidenceJudgement1,
    LevelOfEvidenceJudgement2,
    LevelOfEvidenceJudgement3,
}

impl Field for ReviewField {
    const ALL: &'static [Self] = &[
        Self::ExtractorName,
        Self::ExtractionDate,
        Self::FirstAuthor,
        Self::YearOfPublication,
        Self::SearchStrategyDesc,
        Self::SampleAgeDesc,
        Self::SampleAgeLowestMean,
        Self::SampleAgeHighestMean,
        Self::InclusionExclusionConcerns,
        Self::EarliestPublicationYear,
        Self::LatestPublicationYear,
        Self::NumberOfStudies,
        Self::NumberOfSamples,
        Self::RatingOfLowRiskBias,
        Self::RatingOfModerateRiskBias,
        Self::RatingOfHighRiskBias,
        Self::BiasRatingSystem,
        Self::BiasRatingSystemReference,
        Self::LevelOfEvidenceJudgement1,
        Self::LevelOfEvidenceJudgement2,
        Self::LevelOfEvidenceJudgement3,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::ExtractorName => "extractor_name",
            Self::ExtractionDate => "extraction_date",
            Self::FirstAuthor => "first_author",
            Self::YearOfPublication => "year_of_publication",
            Self::SearchStrategyDesc => "search_strategy_desc",
            Self::SampleAgeDesc => "sample_age_desc",
            Self::SampleAgeLowestMean => "sample_age_lowest_mean",
            Self::SampleAgeHighestMean => "sample_age_highest_mean",
            Self::InclusionExclusionConcerns => "inclusion_exclusion_concerns",
            Self::EarliestPublicationYear => "earliest_publication_year",
            Self::LatestPublicationYear => "latest_publication_year",
            Self::NumberOfStudies => "number_of_studies",
            Self::NumberOfSamples => "number_of_samples",
            Self::RatingOfLowRiskBias => "rating_of_low_risk_bias",
            Self::RatingOfModerateRiskBias => "rating_of_moderate_risk_bias",
            Self::RatingOfHighRiskBias => "rating_of_high_risk_bias",
            Self::BiasRatingSystem => "bias_rating_system",
            Self::BiasRatingSystemReference => "bias_rating_system_reference",
            Self::LevelOfEvidenceJudgement1 => "level_of_evidence_judgement_1",
            Self::LevelOfEvidenceJudgement2 => "level_of_evidence_judgement_2",
            Self::LevelOfEvidenceJudgement3 => "level_of_evidence_judgement_3",
        }
    }

    fn label(self) -> &'static str {
        labels::review_field(self)
    }

    fn rule(self) -> Rule {
        match self {
            Self::YearOfPublication
            | Self::EarliestPublicationYear
            | Self::LatestPublicationYear => Rule::Year,
            Self::SampleAgeLowestMean
            | Self::SampleAgeHighestMean
            | Self::RatingOfLowRiskBias
            | Self::RatingOfModerateRiskBias
            | Self::RatingOfHighRiskBias => Rule::Decimal,
            Self::NumberOfStudies | Self::NumberOfSamples => Rule::Integer,
            _ => Rule::Text,
        }
    }
}

impl Record for Review {
    type Field = ReviewField;

    fn value(&self, field: ReviewField) -> &str {
        match field {
            ReviewField::ExtractorName => &self.extractor_name,
            ReviewField::ExtractionDate => &self.extraction_date,
            ReviewField::FirstAuthor => &self.first_author,
            ReviewField::YearOfPublication => &self.year_of_publication,
            ReviewField::SearchStrategyDesc => &self.search_strategy_desc,
            ReviewField::SampleAgeDesc => &self.sample_age_desc,
            ReviewField::SampleAgeLowestMean => &self.sample_age_lowest_mean,
            ReviewField::SampleAgeHighestMean => &self.sample_age_highest_mean,
            ReviewField::InclusionExclusionConcerns => &self.inclusion_exclusion_concerns,
            ReviewField::EarliestPublicationYear => &self.earliest_publication_year,
            ReviewField::LatestPublicationYear => &self.latest_publication_year,
            ReviewField::NumberOfStudies => &self.number_of_studies,
            ReviewField::NumberOfSamples => &self.number_of_samples,
            ReviewField::RatingOfLowRiskBias => &self.rating_of_low_risk_bias,
            ReviewField::RatingOfModerateRiskBias => &self.rating_of_moderate_risk_bias,
            ReviewField::RatingOfHighRiskBias => &self.rating_of_high_risk_bias,
            ReviewField::BiasRatingSystem => &self.bias_rating_system,
            ReviewField::BiasRatingSystemReference => &self.bias_rating_system_reference,
            ReviewField::LevelOfEvidenceJudgement1 => &self.level_of_evidence_judgement_1,
            ReviewField::LevelOfEvidenceJudgement2 => &self.level_of_evidence_judgement_2,
            ReviewField::LevelOfEvidenceJudgement3 => &self.level_of_evidence_judgement_3,
        }
    }

    fn value_mut(&mut self, field: ReviewField) -> &mut String {
        match field {
            ReviewField::ExtractorName => &mut self.extractor_name,
            ReviewField::ExtractionDate => &mut self.extraction_date,
            ReviewField::FirstAuthor => &mut self.first_author,
            ReviewField::YearOfPublication => &mut self.year_of_publication,
            ReviewField::SearchStrategyDesc => &mut self.search_strategy_desc,
            ReviewField::SampleAgeDesc => &mut self.sample_age_desc,
            ReviewField::SampleAgeLowestMean => &mut self.sample_age_lowest_mean,
            ReviewField::SampleAgeHighestMean => &mut self.sample_age_highest_mean,
            ReviewField::InclusionExclusionConcerns => &mut self.inclusion_exclusion_concerns,
            ReviewField::EarliestPublicationYear => &mut self.earliest_publication_year,
            ReviewField::LatestPublicationYear => &mut self.latest_publication_year,
            ReviewField::NumberOfStudies => &mut self.number_of_studies,
            ReviewField::NumberOfSamples => &mut self.number_of_samples,
            ReviewField::RatingOfLowRiskBias => &mut self.rating_of_low_risk_bias,
            ReviewField::RatingOfModerateRiskBias => &mut self.rating_of_moderate_risk_bias,
            ReviewField::RatingOfHighRiskBias => &mut self.rating_of_high_risk_bias,
            ReviewField::BiasRatingSystem => &mut self.bias_rating_system,
            ReviewField::BiasRatingSystemReference => &mut self.bias_rating_system_reference,
            ReviewField::LevelOfEvidenceJudgement1 => &mut self.level_of_evidence_judgement_1,
            ReviewField::LevelOfEvidenceJudgement2 => &mut self.level_of_evidence_judgement_2,
            ReviewField::LevelOfEvidenceJudgement3 => &mut self.level_of_evidence_judgement_3,
        }
    }
}

/// A screen-time exposure studied by the review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exposure {
    /// Client-generated identifier.
    pub id: String,
    /// What was watched or used.
    #[serde(default, deserialize_with = "lenient::text")]
    pub content_specifics: String,
    /// Category of the content.
    #[serde(default, deserialize_with = "lenient::text")]
    pub content_category: String,
    /// Instrument the exposure was measured with.
    #[serde(default, deserialize_with = "lenient::text")]
    pub measure: String,
    /// Kind of measure, e.g. self-report.
    #[serde(default, deserialize_with = "lenient::text")]
    pub measure_type: String,
    /// Device used.
    #[serde(default, deserialize_with = "lenient::text")]
    pub device_type: String,
    /// Category of the device.
    #[serde(default, deserialize_with = "lenient::text")]
    pub device_category: String,
    /// Whether the device is portable.
    #[serde(default, deserialize_with = "lenient::text")]
    pub device_portability: String,
    /// Where the exposure happened.
    #[serde(default, deserialize_with = "lenient::text")]
    pub setting: String,
    /// Category of the setting.
    #[serde(default, deserialize_with = "lenient::text")]
    pub setting_category: String,
    /// Who else was present.
    #[serde(default, deserialize_with = "lenient::text")]
    pub social_environment_specific: String,
    /// Category of the social environment.
    #[serde(default, deserialize_with = "lenient::text")]
    pub social_environment_general: String,
}

impl Exposure {
    /// Creates a blank exposure with a fresh identifier.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            content_specifics: String::new(),
            content_category: String::new(),
            measure: String::new(),
            measure_type: String::new(),
            device_type: String::new(),
            device_category: String::new(),
            device_portability: String::new(),
            setting: String::new(),
            setting_category: String::new(),
            social_environment_specific: String::new(),
            social_environment_general: String::new(),
        }
    }
}

/// Scalar text fields of an [`Exposure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ExposureField {
    ContentSpecifics,
    ContentCategory,
    Measure,
    MeasureType,
    DeviceType,
    DeviceCategory,
    DevicePortability,
    Setting,
    SettingCategory,
    SocialEnvironmentSpecific,
    SocialEnvironmentGeneral,
}

impl Field for ExposureField {
    const ALL: &'static [Self] = &[
        Self::ContentSpecifics,
        Self::ContentCategory,
        Self::Measure,
        Self::MeasureType,
        Self::DeviceType,
        Self::DeviceCategory,
        Self::DevicePortability,
        Self::Setting,
        Self::SettingCategory,
        Self::SocialEnvironmentSpecific,
        Self::SocialEnvironmentGeneral,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::ContentSpecifics => "content_specifics",
            Self::ContentCategory => "content_category",
            Self::Measure => "measure",
            Self::MeasureType => "measure_type",
            Self::DeviceType => "device_type",
            Self::DeviceCategory => "device_category",
            Self::DevicePortability => "device_portability",
            Self::Setting => "setting",
            Self::SettingCategory => "setting_category",
            Self::SocialEnvironmentSpecific => "social_environment_specific",
            Self::SocialEnvironmentGeneral => "social_environment_general",
        }
    }

    fn label(self) -> &'static str {
        labels::exposure_field(self)
    }

    fn rule(self) -> Rule {
        Rule::Text
    }
}

impl Record for Exposure {
    type Field = ExposureField;

    fn value(&self, field: ExposureField) -> &str {
        match field {
            ExposureField::ContentSpecifics => &self.content_specifics,
            ExposureField::ContentCategory => &self.content_category,
            ExposureField::Measure => &self.measure,
            ExposureField::MeasureType => &self.measure_type,
            ExposureField::DeviceType => &self.device_type,
            ExposureField::DeviceCategory => &self.device_category,
            ExposureField::DevicePortability => &self.device_portability,
            ExposureField::Setting => &self.setting,
            ExposureField::SettingCategory => &self.setting_category,
            ExposureField::SocialEnvironmentSpecific => &self.social_environment_specific,
            ExposureField::SocialEnvironmentGeneral => &self.social_environment_general,
        }
    }

    fn value_mut(&mut self, field: ExposureField) -> &mut String {
        match field {
            ExposureField::ContentSpecifics => &mut self.content_specifics,
            ExposureField::ContentCategory => &mut self.content_category,
            ExposureField::Measure => &mut self.measure,
            ExposureField::MeasureType => &mut self.measure_type,
            ExposureField::DeviceType => &mut self.device_type,
            ExposureField::DeviceCategory => &mut self.device_category,
            ExposureField::DevicePortability => &mut self.device_portability,
            ExposureField::Setting => &mut self.setting,
            ExposureField::SettingCategory => &mut self.setting_category,
            ExposureField::SocialEnvironmentSpecific => &mut self.social_environment_specific,
            ExposureField::SocialEnvironmentGeneral => &mut self.social_environment_general,
        }
    }
}

/// A health or wellbeing outcome studied by the review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Client-generated identifier.
    pub id: String,
    /// Instrument the outcome was measured with.
    #[serde(default, deserialize_with = "lenient::text")]
    pub measure: String,
    /// Kind of measure, e.g. self-report.
    #[serde(default, deserialize_with = "lenient::text")]
    pub measure_type: String,
    /// The variable as named by the review.
    #[serde(default, deserialize_with = "lenient::text")]
    pub specific_variable: String,
    /// The broader construct the variable belongs to.
    #[serde(default, deserialize_with = "lenient::text")]
    pub higher_order_variable: String,
    /// Outcome domain.
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
}

impl Outcome {
    /// Creates a blank outcome with a fresh identifier.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            measure: String::new(),
            measure_type: String::new(),
            specific_variable: String::new(),
            higher_order_variable: String::new(),
            category: String::new(),
        }
    }
}

/// Scalar text fields of an [`Outcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum OutcomeField {
    Measure,
    MeasureType,
    SpecificVariable,
    HigherOrderVariable,
    Category,
}

impl Field for OutcomeField {
    const ALL: &'static [Self] = &[
        Self::Measure,
        Self::MeasureType,
        Self::SpecificVariable,
        Self::HigherOrderVariable,
        Self::Category,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::Measure => "measure",
            Self::MeasureType => "measure_type",
            Self::SpecificVariable => "specific_variable",
            Self::HigherOrderVariable => "higher_order_variable",
            Self::Category => "category",
        }
    }

    fn label(self) -> &'static str {
        labels::outcome_field(self)
    }

    fn rule(self) -> Rule {
        Rule::Text
    }
}

impl Record for Outcome {
    type Field = OutcomeField;

    fn value(&self, field: OutcomeField) -> &str {
        match field {
            OutcomeField::Measure => &self.measure,
            OutcomeField::MeasureType => &self.measure_type,
            OutcomeField::SpecificVariable => &self.specific_variable,
            OutcomeField::HigherOrderVariable => &self.higher_order_variable,
            OutcomeField::Category => &self.category,
        }
    }

    fn value_mut(&mut self, field: OutcomeField) -> &mut String {
        match field {
            OutcomeField::Measure => &mut self.measure,
            OutcomeField::MeasureType => &mut self.measure_type,
            OutcomeField::SpecificVariable => &mut self.specific_variable,
            OutcomeField::HigherOrderVariable => &mut self.higher_order_variable,
            OutcomeField::Category => &mut self.category,
        }
    }
}

/// A moderator level the effect sizes are broken down by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moderator {
    /// Client-generated identifier.
    pub id: String,
    /// The subgroup, e.g. "Overall" or "Girls".
    #[serde(default, deserialize_with = "lenient::text")]
    pub level: String,
    /// What the subgroup is broken down by.
    #[serde(default, deserialize_with = "lenient::text")]
    pub category: String,
}

impl Moderator {
    /// Creates a blank moderator with a fresh identifier.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            id: new_id(),
            level: String::new(),
            category: String::new(),
        }
    }

    /// Creates the baseline moderator covering the whole sample.
    #[must_use]
    pub fn overall() -> Self {
        Self {
            id: new_id(),
            level: OVERALL.to_string(),
            category: OVERALL.to_string(),
        }
    }

    /// Whether this moderator is the "Overall" baseline.
    #[must_use]
    pub fn is_overall(&self) -> bool {
        self.level == OVERALL && self.category == OVERALL
    }
}

/// Scalar text fields of a [`Moderator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum ModeratorField {
    Level,
    Category,
}

impl Field for ModeratorField {
    const ALL: &'static [Self] = &[Self::Level, Self::Category];

    fn name(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Category => "category",
        }
    }

    fn label(self) -> &'static str {
        labels::moderator_field(self)
    }

    fn rule(self) -> Rule {
        Rule::Text
    }
}

impl Record for Moderator {
    type Field = ModeratorField;

    fn value(&self, field: ModeratorField) -> &str {
        match field {
            ModeratorField::Level => &self.level,
            ModeratorField::Category => &self.category,
        }
    }

    fn value_mut(&mut self, field: ModeratorField) -> &mut String {
        match field {
            ModeratorField::Level => &mut self.level,
            ModeratorField::Category => &mut self.category,
        }
    }
}

/// A quantitative result for one exposure, outcome and moderator.
///
/// Effect sizes have no identifier of their own; they are addressed by the
/// ids of the records they reference (see
/// [`EffectSizeKey`](crate::domain::EffectSizeKey)).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectSize {
    /// Id of the exposure.
    pub exposure_id: String,
    /// Id of the outcome.
    pub outcome_id: String,
    /// Id of the moderator.
    pub moderator_id: String,
    /// The team's narrative summary of the association.
    #[serde(default, deserialize_with = "lenient::text")]
    pub team_narrative_summary: String,
    /// Point estimate.
    #[serde(default, deserialize_with = "lenient::text")]
    pub value: String,
    /// Lower confidence bound.
    #[serde(default, deserialize_with = "lenient::text")]
    pub value_lower_bound: String,
    /// Upper confidence bound.
    #[serde(default, deserialize_with = "lenient::text")]
    pub value_upper_bound: String,
    /// Reported p-value.
    #[serde(default, deserialize_with = "lenient::text")]
    pub p_value: String,
    /// Test the estimate comes from.
    #[serde(default, deserialize_with = "lenient::text")]
    pub statistical_test: String,
    /// Free-text comments.
    #[serde(default, deserialize_with = "lenient::text")]
    pub comments: String,
}

impl EffectSize {
    /// Creates a blank effect size for the given triple.
    #[must_use]
    pub fn blank(
        exposure_id: impl Into<String>,
        outcome_id: impl Into<String>,
        moderator_id: impl Into<String>,
    ) -> Self {
        Self {
            exposure_id: exposure_id.into(),
            outcome_id: outcome_id.into(),
            moderator_id: moderator_id.into(),
            team_narrative_summary: String::new(),
            value: String::new(),
            value_lower_bound: String::new(),
            value_upper_bound: String::new(),
            p_value: String::new(),
            statistical_test: String::new(),
            comments: String::new(),
        }
    }
}

/// Scalar text fields of an [`EffectSize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[allow(missing_docs)]
pub enum EffectSizeField {
    TeamNarrativeSummary,
    Value,
    ValueLowerBound,
    ValueUpperBound,
    PValue,
    StatisticalTest,
    Comments,
}

impl Field for EffectSizeField {
    const ALL: &'static [Self] = &[
        Self::TeamNarrativeSummary,
        Self::Value,
        Self::ValueLowerBound,
        Self::ValueUpperBound,
        Self::PValue,
        Self::StatisticalTest,
        Self::Comments,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::TeamNarrativeSummary => "team_narrative_summary",
            Self::Value => "value",
            Self::ValueLowerBound => "value_lower_bound",
            Self::ValueUpperBound => "value_upper_bound",
            Self::PValue => "p_value",
            Self::StatisticalTest => "statistical_test",
            Self::Comments => "comments",
        }
    }

    fn label(self) -> &'static str {
        labels::effect_size_field(self)
    }

    fn rule(self) -> Rule {
        match self {
            Self::Value | Self::ValueLowerBound | Self::ValueUpperBound | Self::PValue => {
                Rule::Decimal
            }
            Self::TeamNarrativeSummary | Self::StatisticalTest | Self::Comments => Rule::Text,
        }
    }
}

impl Record for EffectSize {
    type Field = EffectSizeField;

    fn value(&self, field: EffectSizeField) -> &str {
        match field {
            EffectSizeField::TeamNarrativeSummary => &self.team_narrative_summary,
            EffectSizeField::Value => &self.value,
            EffectSizeField::ValueLowerBound => &self.value_lower_bound,
            EffectSizeField::ValueUpperBound => &self.value_upper_bound,
            EffectSizeField::PValue => &self.p_value,
            EffectSizeField::StatisticalTest => &self.statistical_test,
            EffectSizeField::Comments => &self.comments,
        }
    }

    fn value_mut(&mut self, field: EffectSizeField) -> &mut String {
        match field {
            EffectSizeField::TeamNarrativeSummary => &mut self.team_narrative_summary,
            EffectSizeField::Value => &mut self.value,
            EffectSizeField::ValueLowerBound => &mut self.value_lower_bound,
            EffectSizeField::ValueUpperBound => &mut self.value_upper_bound,
            EffectSizeField::PValue => &mut self.p_value,
            EffectSizeField::StatisticalTest => &mut self.statistical_test,
            EffectSizeField::Comments => &mut self.comments,
        }
    }
}

/// A row of the review list, as returned by `GET /reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewSummary {
    /// Identifier of the review.
    pub id: String,
    /// Who extracted the data.
    #[serde(default, deserialize_with = "lenient::text")]
    pub extractor_name: String,
    /// When the data was extracted.
    #[serde(default, deserialize_with = "lenient::text")]
    pub extraction_date: String,
    /// Surname of the first author.
    #[serde(default, deserialize_with = "lenient::text")]
    pub first_author: String,
    /// Year the review was published.
    #[serde(default, deserialize_with = "lenient::text")]
    pub year_of_publication: String,
}

/// Deserializers accepting the column types the backend stores.
///
/// Numeric columns come back as JSON numbers or `null`; the client always
/// works with their text form.
mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Option::<Scalar>::deserialize(deserializer)? {
            None => String::new(),
            Some(Scalar::Text(text)) => text,
            Some(Scalar::Number(number)) => number.to_string(),
            Some(Scalar::Flag(flag)) => flag.to_string(),
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_review_is_seeded_with_overall_moderator() {
        let review = Review::blank();

        assert_eq!(review.moderators.len(), 1);
        assert!(review.moderators[0].is_overall());
        assert!(review.exposures.is_empty());
        assert!(review.effect_sizes.is_empty());
        assert!(!review.are_you_sure);
    }

    #[test]
    fn factories_generate_distinct_ids() {
        let first = Exposure::blank();
        let second = Exposure::blank();
        assert_ne!(first.id, second.id);
        assert_ne!(Review::blank().id, Review::blank().id);
    }

    #[test]
    fn record_value_addresses_every_field() {
        let mut review = Review::blank_with_id("r1");
        for (i, &field) in ReviewField::ALL.iter().enumerate() {
            *review.value_mut(field) = i.to_string();
        }
        for (i, &field) in ReviewField::ALL.iter().enumerate() {
            assert_eq!(review.value(field), i.to_string());
        }
    }

    #[test]
    fn field_names_match_serialized_keys() {
        let review = Review::blank_with_id("r1");
        let json = serde_json::to_value(&review).unwrap();
        for &field in ReviewField::ALL {
            assert!(json.get(field.name()).is_some(), "missing {}", field.name());
        }

        let effect_size = EffectSize::blank("e", "o", "m");
        let json = serde_json::to_value(&effect_size).unwrap();
        for &field in EffectSizeField::ALL {
            assert!(json.get(field.name()).is_some(), "missing {}", field.name());
        }
    }

    #[test]
    fn fill_blanks_only_touches_empty_values() {
        let mut review = Review::blank_with_id("r1");
        review.first_author = "Smith".to_string();
        review.amstar_2 = vec![String::new(), "yes".to_string()];
        let mut exposure = Exposure::blank();
        exposure.measure = "hours/day".to_string();
        review.exposures.push(exposure);
        review.effect_sizes.push(EffectSize::blank("e", "o", "m"));

        let filled = review.fill_blanks();

        assert_eq!(filled.first_author, "Smith");
        assert_eq!(filled.extractor_name, FILL_TOKEN);
        assert_eq!(filled.amstar_2, vec!["na".to_string(), "yes".to_string()]);
        assert_eq!(filled.exposures[0].measure, "hours/day");
        assert_eq!(filled.exposures[0].setting, FILL_TOKEN);
        assert_eq!(filled.effect_sizes[0].p_value, FILL_TOKEN);
        // identifiers are not text fields
        assert_eq!(filled.effect_sizes[0].exposure_id, "e");
        assert_eq!(filled.moderators[0].level, OVERALL);
    }

    #[test]
    fn fill_blanks_is_idempotent() {
        let mut review = Review::blank_with_id("r1");
        review.outcomes.push(Outcome::blank());

        let once = review.fill_blanks();
        let twice = once.fill_blanks();

        assert_eq!(once, twice);
    }

    #[test]
    fn fill_blanks_leaves_input_untouched() {
        let review = Review::blank_with_id("r1");
        let _ = review.fill_blanks();
        assert!(review.extractor_name.is_empty());
    }

    #[test]
    fn deserializes_numeric_and_null_columns_as_text() {
        let json = r#"{
            "id": "r1",
            "first_author": "Smith",
            "year_of_publication": 2015,
            "sample_age_lowest_mean": 12.5,
            "number_of_studies": null,
            "are_you_sure": null,
            "effect_sizes": [
                {"exposure_id": "e", "outcome_id": "o", "moderator_id": "m", "value": 0.3}
            ]
        }"#;

        let review: Review = serde_json::from_str(json).unwrap();

        assert_eq!(review.year_of_publication, "2015");
        assert_eq!(review.sample_age_lowest_mean, "12.5");
        assert_eq!(review.number_of_studies, "");
        assert!(!review.are_you_sure);
        assert!(review.moderators.is_empty());
        assert_eq!(review.effect_sizes[0].value, "0.3");
        assert_eq!(review.effect_sizes[0].comments, "");
    }

    #[test]
    fn with_value_returns_modified_copy() {
        let moderator = Moderator::blank();
        let updated = moderator.with_value(ModeratorField::Level, "Girls");

        assert_eq!(updated.level, "Girls");
        assert_eq!(updated.id, moderator.id);
        assert!(moderator.level.is_empty());
    }
}
