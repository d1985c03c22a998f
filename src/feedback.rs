//! Step-by-step feedback collection for a selected parking.
//!
//! The backend reports which structured attributes it has no value for. Each
//! one becomes a question, asked in the reported order, after which a fixed
//! general form is shown. Only the general step can be submitted.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("feedback can only be edited or submitted at the general step")]
    NotAtGeneralStep,
    #[error("all questions have already been answered")]
    AlreadyAtGeneralStep,
    #[error("question `{0}` does not take a yes/no answer")]
    NotABooleanQuestion(String),
    #[error("question `{0}` does not take a capacity")]
    NotACapacityQuestion(String),
    #[error("question `{0}` cannot be skipped")]
    NotSkippable(String),
    #[error("capacity must be a positive whole number, got `{0}`")]
    InvalidCapacity(String),
    #[error("no feedback panel is open")]
    NoActiveFeedback,
}

/// A structured attribute the backend has no recorded value for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingField {
    Covered,
    Paid,
    Capacity,
    /// A name this client has no question for. It is skipped, never asked.
    Unsupported(String),
}

impl MissingField {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "covered" => Self::Covered,
            "paid" => Self::Paid,
            "capacity" => Self::Capacity,
            other => Self::Unsupported(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Covered => "covered",
            Self::Paid => "paid",
            Self::Capacity => "capacity",
            Self::Unsupported(name) => name,
        }
    }

    pub fn question(&self) -> Option<&'static str> {
        match self {
            Self::Covered => Some("Is the parking covered?"),
            Self::Paid => Some("Is it paid parking?"),
            Self::Capacity => Some("Roughly how many spaces does it have?"),
            Self::Unsupported(_) => None,
        }
    }

    fn is_skippable(&self) -> bool {
        matches!(self, Self::Capacity | Self::Unsupported(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    #[default]
    Clear,
    Rain,
    Snow,
    Fog,
}

impl Weather {
    pub const ALL: &[Self] = &[Self::Clear, Self::Rain, Self::Snow, Self::Fog];

    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::Rain => "Rain",
            Self::Snow => "Snow",
            Self::Fog => "Fog",
        }
    }
}

/// Answers collected during the dynamic questions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldAnswers {
    pub covered: Option<bool>,
    pub paid: Option<bool>,
    pub capacity: Option<u32>,
}

impl FieldAnswers {
    pub fn is_empty(&self) -> bool {
        self.covered.is_none() && self.paid.is_none() && self.capacity.is_none()
    }
}

/// The fixed form shown once every question is handled.
///
/// `free_spots` is kept as typed so the form can echo it back; it is coerced
/// on submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneralFeedback {
    pub free_spots: String,
    pub parked_success: bool,
    pub weather: Weather,
    pub event_context: Option<String>,
    pub photo_url: String,
}

impl Default for GeneralFeedback {
    fn default() -> Self {
        Self {
            free_spots: "0".to_string(),
            parked_success: true,
            weather: Weather::Clear,
            event_context: None,
            photo_url: String::new(),
        }
    }
}

/// Parse a typed free-spots count. Anything that is not a non-negative
/// number counts as zero; fractions are truncated.
pub fn coerce_free_spots(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() && value > 0.0 => value.trunc().min(u32::MAX as f64) as u32,
        _ => 0,
    }
}

fn parse_capacity(raw: &str) -> Result<u32, FeedbackError> {
    match raw.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(FeedbackError::InvalidCapacity(raw.to_string())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Asking about `fields[index]`.
    Question(usize),
    /// Showing the general form.
    Final,
}

#[derive(Debug, Clone)]
pub struct FeedbackStepMachine {
    fields: Vec<MissingField>,
    step: Step,
    answers: FieldAnswers,
    general: GeneralFeedback,
}

impl FeedbackStepMachine {
    pub fn new(fields: Vec<MissingField>) -> Self {
        let step = if fields.is_empty() {
            Step::Final
        } else {
            Step::Question(0)
        };
        Self {
            fields,
            step,
            answers: FieldAnswers::default(),
            general: GeneralFeedback::default(),
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn is_final(&self) -> bool {
        self.step == Step::Final
    }

    pub fn fields(&self) -> &[MissingField] {
        &self.fields
    }

    /// The field being asked about, or `None` at the general step.
    pub fn current_field(&self) -> Option<&MissingField> {
        match self.step {
            Step::Question(index) => self.fields.get(index),
            Step::Final => None,
        }
    }

    pub fn answers(&self) -> &FieldAnswers {
        &self.answers
    }

    pub fn general(&self) -> &GeneralFeedback {
        &self.general
    }

    pub fn general_mut(&mut self) -> Result<&mut GeneralFeedback, FeedbackError> {
        if !self.is_final() {
            return Err(FeedbackError::NotAtGeneralStep);
        }
        Ok(&mut self.general)
    }

    /// Answer a yes/no question (`covered`, `paid`) and move on.
    pub fn answer_bool(&mut self, value: bool) -> Result<Step, FeedbackError> {
        let field = self.expect_question()?;
        match field {
            MissingField::Covered => self.answers.covered = Some(value),
            MissingField::Paid => self.answers.paid = Some(value),
            other => {
                return Err(FeedbackError::NotABooleanQuestion(other.as_str().to_string()));
            }
        }
        Ok(self.advance())
    }

    /// Record a capacity and move on.
    pub fn answer_capacity(&mut self, capacity: u32) -> Result<Step, FeedbackError> {
        let field = self.expect_question()?;
        if field != MissingField::Capacity {
            return Err(FeedbackError::NotACapacityQuestion(field.as_str().to_string()));
        }
        if capacity == 0 {
            return Err(FeedbackError::InvalidCapacity(capacity.to_string()));
        }
        self.answers.capacity = Some(capacity);
        Ok(self.advance())
    }

    /// Like [`Self::answer_capacity`] but from typed text. Bad input leaves the
    /// step unchanged.
    pub fn answer_capacity_input(&mut self, raw: &str) -> Result<Step, FeedbackError> {
        let field = self.expect_question()?;
        if field != MissingField::Capacity {
            return Err(FeedbackError::NotACapacityQuestion(field.as_str().to_string()));
        }
        let capacity = parse_capacity(raw)?;
        self.answer_capacity(capacity)
    }

    /// Move past a capacity or unsupported question without recording anything.
    pub fn skip(&mut self) -> Result<Step, FeedbackError> {
        let field = self.expect_question()?;
        if !field.is_skippable() {
            return Err(FeedbackError::NotSkippable(field.as_str().to_string()));
        }
        Ok(self.advance())
    }

    /// Merge the answers with the general form into a draft ready to send.
    ///
    /// The machine is left untouched so a failed send can be retried.
    pub fn submit(&self) -> Result<FeedbackDraft, FeedbackError> {
        if !self.is_final() {
            return Err(FeedbackError::NotAtGeneralStep);
        }
        let event_context = self
            .general
            .event_context
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(FeedbackDraft {
            answers: self.answers.clone(),
            free_spots: coerce_free_spots(&self.general.free_spots),
            parked_success: self.general.parked_success,
            weather: self.general.weather,
            event_context,
            photo_url: self.general.photo_url.trim().to_string(),
        })
    }

    /// Throw away everything collected so far.
    pub fn cancel(self) {
        debug!(
            answered = !self.answers.is_empty(),
            step = ?self.step,
            "Feedback cancelled"
        );
    }

    fn expect_question(&self) -> Result<MissingField, FeedbackError> {
        self.current_field()
            .cloned()
            .ok_or(FeedbackError::AlreadyAtGeneralStep)
    }

    fn advance(&mut self) -> Step {
        self.step = match self.step {
            Step::Question(index) if index + 1 < self.fields.len() => Step::Question(index + 1),
            _ => Step::Final,
        };
        self.step
    }
}

/// Everything the user entered, minus the parking it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackDraft {
    pub answers: FieldAnswers,
    pub free_spots: u32,
    pub parked_success: bool,
    pub weather: Weather,
    pub event_context: Option<String>,
    pub photo_url: String,
}

impl Default for FeedbackDraft {
    fn default() -> Self {
        Self {
            answers: FieldAnswers::default(),
            free_spots: 0,
            parked_success: true,
            weather: Weather::Clear,
            event_context: None,
            photo_url: String::new(),
        }
    }
}

impl FeedbackDraft {
    pub fn into_record(self, parking_id: &str) -> FeedbackRecord {
        FeedbackRecord {
            parking_id: parking_id.to_string(),
            covered: self.answers.covered,
            paid: self.answers.paid,
            capacity: self.answers.capacity,
            free_spots: self.free_spots,
            parked_success: self.parked_success,
            weather: self.weather,
            event_context: self.event_context,
            photo_url: self.photo_url,
        }
    }
}

/// JSON body of `POST /submit-feedback`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub parking_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub covered: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    pub free_spots: u32,
    pub parked_success: bool,
    pub weather: Weather,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_context: Option<String>,
    #[serde(default)]
    pub photo_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(names: &[&str]) -> Vec<MissingField> {
        names.iter().map(|n| MissingField::parse(n)).collect()
    }

    #[test]
    fn empty_field_list_starts_at_general_step() {
        let machine = FeedbackStepMachine::new(Vec::new());

        assert_eq!(machine.step(), Step::Final);
        assert!(machine.current_field().is_none());
        assert!(machine.answers().is_empty());
    }

    #[test]
    fn reaches_general_step_after_one_action_per_field() -> Result<(), FeedbackError> {
        let mut machine = FeedbackStepMachine::new(fields(&["covered", "paid", "capacity"]));

        assert_eq!(machine.answer_bool(true)?, Step::Question(1));
        assert_eq!(machine.answer_bool(false)?, Step::Question(2));
        assert_eq!(machine.answer_capacity(80)?, Step::Final);

        assert_eq!(
            machine.answers(),
            &FieldAnswers {
                covered: Some(true),
                paid: Some(false),
                capacity: Some(80),
            }
        );
        Ok(())
    }

    #[test]
    fn capacity_can_be_skipped_without_an_answer() -> Result<(), FeedbackError> {
        let mut machine = FeedbackStepMachine::new(fields(&["capacity", "paid"]));

        assert_eq!(machine.skip()?, Step::Question(1));
        assert_eq!(machine.answers().capacity, None);
        assert_eq!(
            machine.skip(),
            Err(FeedbackError::NotSkippable("paid".to_string()))
        );
        Ok(())
    }

    #[test]
    fn unsupported_fields_are_skipped_not_stalled() -> Result<(), FeedbackError> {
        let mut machine = FeedbackStepMachine::new(fields(&["lighting", "covered"]));

        assert_eq!(
            machine.current_field(),
            Some(&MissingField::Unsupported("lighting".to_string()))
        );
        assert_eq!(
            machine.answer_bool(true),
            Err(FeedbackError::NotABooleanQuestion("lighting".to_string()))
        );
        assert_eq!(machine.skip()?, Step::Question(1));
        assert_eq!(machine.answer_bool(false)?, Step::Final);
        Ok(())
    }

    #[test]
    fn wrong_answer_kind_does_not_advance() {
        let mut machine = FeedbackStepMachine::new(fields(&["covered"]));

        assert_eq!(
            machine.answer_capacity(10),
            Err(FeedbackError::NotACapacityQuestion("covered".to_string()))
        );
        assert_eq!(machine.step(), Step::Question(0));
    }

    #[test]
    fn invalid_capacity_text_keeps_the_question_open() -> Result<(), FeedbackError> {
        let mut machine = FeedbackStepMachine::new(fields(&["capacity"]));

        assert_eq!(
            machine.answer_capacity_input("lots"),
            Err(FeedbackError::InvalidCapacity("lots".to_string()))
        );
        assert_eq!(
            machine.answer_capacity_input("0"),
            Err(FeedbackError::InvalidCapacity("0".to_string()))
        );
        assert_eq!(machine.step(), Step::Question(0));

        assert_eq!(machine.answer_capacity_input(" 50 ")?, Step::Final);
        assert_eq!(machine.answers().capacity, Some(50));
        Ok(())
    }

    #[test]
    fn actions_after_general_step_are_rejected() {
        let mut machine = FeedbackStepMachine::new(Vec::new());

        assert_eq!(
            machine.answer_bool(true),
            Err(FeedbackError::AlreadyAtGeneralStep)
        );
        assert_eq!(machine.skip(), Err(FeedbackError::AlreadyAtGeneralStep));
        assert_eq!(machine.step(), Step::Final);
    }

    #[test]
    fn submit_and_general_edits_require_general_step() {
        let mut machine = FeedbackStepMachine::new(fields(&["paid"]));

        assert_eq!(machine.submit(), Err(FeedbackError::NotAtGeneralStep));
        assert!(matches!(
            machine.general_mut(),
            Err(FeedbackError::NotAtGeneralStep)
        ));
    }

    #[test]
    fn submit_merges_answers_with_general_form() -> Result<(), FeedbackError> {
        let mut machine = FeedbackStepMachine::new(fields(&["capacity"]));
        machine.answer_capacity(50)?;
        {
            let general = machine.general_mut()?;
            general.weather = Weather::Rain;
            general.free_spots = "3".to_string();
            general.event_context = Some("   ".to_string());
        }

        let draft = machine.submit()?;

        assert_eq!(draft.answers.capacity, Some(50));
        assert_eq!(draft.free_spots, 3);
        assert_eq!(draft.weather, Weather::Rain);
        assert!(draft.parked_success);
        assert_eq!(draft.event_context, None);
        assert!(machine.is_final());
        Ok(())
    }

    #[test]
    fn free_spots_coercion_defaults_to_zero() {
        assert_eq!(coerce_free_spots("3"), 3);
        assert_eq!(coerce_free_spots(" 7 "), 7);
        assert_eq!(coerce_free_spots("2.9"), 2);
        assert_eq!(coerce_free_spots(""), 0);
        assert_eq!(coerce_free_spots("many"), 0);
        assert_eq!(coerce_free_spots("-4"), 0);
        assert_eq!(coerce_free_spots("NaN"), 0);
    }

    #[test]
    fn record_omits_unanswered_fields() {
        let draft = FeedbackDraft {
            answers: FieldAnswers {
                capacity: Some(50),
                ..FieldAnswers::default()
            },
            free_spots: 3,
            weather: Weather::Rain,
            ..FeedbackDraft::default()
        };

        let value = serde_json::to_value(draft.into_record("park_1")).expect("serialize record");

        assert_eq!(
            value,
            json!({
                "parking_id": "park_1",
                "capacity": 50,
                "free_spots": 3,
                "parked_success": true,
                "weather": "rain",
                "photo_url": ""
            })
        );
    }

    #[test]
    fn missing_field_names_round_trip() {
        for name in ["covered", "paid", "capacity", "height_limit"] {
            assert_eq!(MissingField::parse(name).as_str(), name);
        }
        assert!(MissingField::parse("height_limit").question().is_none());
    }
}
