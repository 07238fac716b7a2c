//! Practice test items (IELTS/TOEIC style): question payloads, learner
//! responses and grading.
//!
//! Each question kind carries only its own fields. On the wire a payload is a
//! JSON object with a `"type"` discriminator:
//!
//! ```
//! use subcodec_core::practice::QuestionPayload;
//!
//! let q: QuestionPayload =
//!     serde_json::from_str(r#"{"type": "mcq", "options": ["a", "b"], "answer": 1}"#).unwrap();
//! assert!(q.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Answer key for true/false/not given and yes/no/not given questions.
///
/// Inside a question payload the answer is written with the labels of its
/// kind: `TRUE`/`FALSE`/`NOT GIVEN` for `truefalse`, `YES`/`NO`/`NOT GIVEN`
/// for `yesno_ng`. Standalone (as in a learner's [`Response::Judgement`]) it
/// is written `yes`/`no`/`not_given`. Every label is accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    #[serde(rename = "yes", alias = "YES", alias = "true", alias = "TRUE")]
    Yes,
    #[serde(rename = "no", alias = "NO", alias = "false", alias = "FALSE")]
    No,
    #[serde(rename = "not_given", alias = "NOT GIVEN")]
    NotGiven,
}

impl TriState {
    pub fn true_false_label(self) -> &'static str {
        match self {
            TriState::Yes => "TRUE",
            TriState::No => "FALSE",
            TriState::NotGiven => "NOT GIVEN",
        }
    }

    pub fn yes_no_label(self) -> &'static str {
        match self {
            TriState::Yes => "YES",
            TriState::No => "NO",
            TriState::NotGiven => "NOT GIVEN",
        }
    }
}

/// Writes a [`TriState`] with `TRUE`/`FALSE`/`NOT GIVEN` labels.
mod true_false_labels {
    use super::TriState;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TriState, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.true_false_label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TriState, D::Error> {
        TriState::deserialize(d)
    }
}

/// Writes a [`TriState`] with `YES`/`NO`/`NOT GIVEN` labels.
mod yes_no_labels {
    use super::TriState;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &TriState, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.yes_no_label())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<TriState, D::Error> {
        TriState::deserialize(d)
    }
}

/// The question part of a practice item, one variant per question kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionPayload {
    /// Multiple choice; `answer` indexes into `options`.
    Mcq { options: Vec<String>, answer: usize },
    /// Gap fill; one accepted answer per gap.
    Gap { answers: Vec<String> },
    #[serde(rename = "truefalse")]
    TrueFalse {
        #[serde(with = "true_false_labels")]
        answer: TriState,
    },
    #[serde(rename = "yesno_ng")]
    YesNoNg {
        #[serde(with = "yes_no_labels")]
        answer: TriState,
    },
    /// `pairs[i]` is the option that belongs to `prompts[i]`.
    Matching {
        prompts: Vec<String>,
        options: Vec<String>,
        pairs: Vec<usize>,
    },
    /// Pick the heading that fits a paragraph; `answer` indexes into `headings`.
    Heading { headings: Vec<String>, answer: usize },
    /// Free speaking task, graded by a teacher.
    Speaking { prompt: String },
}

/// What a learner submitted for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Selected option for mcq and heading questions.
    Choice { index: usize },
    Gaps { answers: Vec<String> },
    /// Chosen judgement for truefalse and yesno_ng questions.
    Judgement { answer: TriState },
    /// `pairs[i]` is the option chosen for prompt `i`, if any.
    Matching { pairs: Vec<Option<usize>> },
    Spoken {
        #[serde(default)]
        transcript: Option<String>,
        #[serde(default)]
        audio_url: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("question has no options")]
    NoOptions,
    #[error("answer {answer} is out of range for {len} option(s)")]
    AnswerOutOfRange { answer: usize, len: usize },
    #[error("gap question has no gaps")]
    NoGaps,
    #[error("gap {0} has an empty answer")]
    EmptyGapAnswer(usize),
    #[error("{prompts} prompt(s) but {pairs} pair(s)")]
    PairCountMismatch { prompts: usize, pairs: usize },
    #[error("speaking prompt is empty")]
    EmptyPrompt,
    #[error("score {0} is not a non-negative number")]
    InvalidScore(f64),
}

/// Outcome of automatic grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Grade {
    Scored { correct: u32, total: u32 },
    NeedsTeacher,
}

fn check_index(answer: usize, len: usize) -> Result<(), PayloadError> {
    if len == 0 {
        return Err(PayloadError::NoOptions);
    }
    if answer >= len {
        return Err(PayloadError::AnswerOutOfRange { answer, len });
    }
    Ok(())
}

impl QuestionPayload {
    /// Check that an assembled payload is consistent before it is submitted.
    pub fn validate(&self) -> Result<(), PayloadError> {
        match self {
            QuestionPayload::Mcq { options, answer } => check_index(*answer, options.len()),
            QuestionPayload::Heading { headings, answer } => check_index(*answer, headings.len()),
            QuestionPayload::Gap { answers } => {
                if answers.is_empty() {
                    return Err(PayloadError::NoGaps);
                }
                match answers.iter().position(|a| a.trim().is_empty()) {
                    Some(i) => Err(PayloadError::EmptyGapAnswer(i)),
                    None => Ok(()),
                }
            }
            QuestionPayload::TrueFalse { .. } | QuestionPayload::YesNoNg { .. } => Ok(()),
            QuestionPayload::Matching {
                prompts,
                options,
                pairs,
            } => {
                if prompts.len() != pairs.len() {
                    return Err(PayloadError::PairCountMismatch {
                        prompts: prompts.len(),
                        pairs: pairs.len(),
                    });
                }
                pairs
                    .iter()
                    .try_for_each(|&p| check_index(p, options.len()))
            }
            QuestionPayload::Speaking { prompt } => {
                if prompt.trim().is_empty() {
                    Err(PayloadError::EmptyPrompt)
                } else {
                    Ok(())
                }
            }
        }
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn normalise(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Grade a response against its question. Speaking items, and responses of
/// the wrong kind for the question, are left to a teacher.
pub fn auto_grade(payload: &QuestionPayload, response: &Response) -> Grade {
    trace!("auto_grade payload={:?}", payload);
    let single = |hit: bool| Grade::Scored {
        correct: u32::from(hit),
        total: 1,
    };
    match (payload, response) {
        (QuestionPayload::Mcq { answer, .. }, Response::Choice { index })
        | (QuestionPayload::Heading { answer, .. }, Response::Choice { index }) => {
            single(answer == index)
        }
        (QuestionPayload::TrueFalse { answer }, Response::Judgement { answer: given })
        | (QuestionPayload::YesNoNg { answer }, Response::Judgement { answer: given }) => {
            single(answer == given)
        }
        (QuestionPayload::Gap { answers }, Response::Gaps { answers: given }) => {
            let correct = answers
                .iter()
                .zip(given.iter())
                .filter(|(key, given)| normalise(key) == normalise(given))
                .count();
            Grade::Scored {
                correct: count(correct),
                total: count(answers.len()),
            }
        }
        (QuestionPayload::Matching { pairs, .. }, Response::Matching { pairs: given }) => {
            let correct = pairs
                .iter()
                .zip(given.iter())
                .filter(|(key, given)| Some(**key) == **given)
                .count();
            Grade::Scored {
                correct: count(correct),
                total: count(pairs.len()),
            }
        }
        _ => Grade::NeedsTeacher,
    }
}

/// A teacher's manual mark for a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeacherGrade {
    pub score: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// A learner's response to one item, with its automatic and manual grades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub response: Response,
    pub auto: Grade,
    #[serde(default)]
    pub teacher: Option<TeacherGrade>,
}

impl Submission {
    pub fn new(payload: &QuestionPayload, response: Response) -> Self {
        let auto = auto_grade(payload, &response);
        Self {
            response,
            auto,
            teacher: None,
        }
    }

    /// Record a teacher's score; it replaces the automatic one.
    pub fn apply_teacher_grade(
        &mut self,
        score: f64,
        comment: Option<String>,
    ) -> Result<(), PayloadError> {
        if !score.is_finite() || score < 0.0 {
            return Err(PayloadError::InvalidScore(score));
        }
        self.teacher = Some(TeacherGrade { score, comment });
        Ok(())
    }

    /// The score that counts: the teacher's if present, else the automatic
    /// one. `None` while a teacher still has to look at it.
    pub fn final_score(&self) -> Option<f64> {
        match (&self.teacher, self.auto) {
            (Some(t), _) => Some(t.score),
            (None, Grade::Scored { correct, .. }) => Some(f64::from(correct)),
            (None, Grade::NeedsTeacher) => None,
        }
    }
}
