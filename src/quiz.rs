//! Multiple-choice bookkeeping and the question oracle backed by it.

use crate::core::QuestionOracle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Result of a student's work on one multiple-choice question.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestionScore {
    pub score: f64,
    pub tries: u32,
}

/// Serializable view of a [`QuizLog`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizRecord {
    pub scores: BTreeMap<String, QuestionScore>,
    /// Questions completed without a score, such as slideshows.
    pub completed: Vec<String>,
}

/// Shared record of answered questions.
///
/// Scores are recorded from the page's callbacks while stage machines read
/// completion through [`QuestionOracle`], so the log uses interior
/// mutability and is shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct QuizLog {
    inner: RwLock<QuizRecord>,
}

impl QuizLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: QuizRecord) -> Self {
        Self {
            inner: RwLock::new(record),
        }
    }

    /// Record a scored answer. The question counts as completed afterwards.
    ///
    /// A later answer to the same question replaces the earlier score.
    pub fn record_score(&self, question_id: &str, score: f64, tries: u32) {
        let mut record = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        record
            .scores
            .insert(question_id.to_string(), QuestionScore { score, tries });
        tracing::debug!(question_id, score, tries, "question scored");
    }

    /// Mark a question completed without a score.
    pub fn mark_completed(&self, question_id: &str) {
        let mut record = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !record.completed.iter().any(|q| q == question_id) {
            record.completed.push(question_id.to_string());
            tracing::debug!(question_id, "question completed");
        }
    }

    pub fn score(&self, question_id: &str) -> Option<QuestionScore> {
        let record = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        record.scores.get(question_id).copied()
    }

    /// Sum of all recorded scores.
    pub fn total_score(&self) -> f64 {
        let record = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        record.scores.values().map(|s| s.score).sum()
    }

    pub fn record(&self) -> QuizRecord {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl QuestionOracle for QuizLog {
    fn question_completed(&self, question_id: &str) -> bool {
        let record = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        record.scores.contains_key(question_id) || record.completed.iter().any(|q| q == question_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scored_question_is_completed() {
        let quiz = QuizLog::new();
        assert!(!quiz.question_completed("pro-dat1"));

        quiz.record_score("pro-dat1", 10.0, 1);

        assert!(quiz.question_completed("pro-dat1"));
        assert_eq!(
            quiz.score("pro-dat1"),
            Some(QuestionScore {
                score: 10.0,
                tries: 1
            })
        );
    }

    #[test]
    fn rescoring_replaces_previous_score() {
        let quiz = QuizLog::new();
        quiz.record_score("ang_meas_consensus", 5.0, 2);
        quiz.record_score("ang_meas_consensus", 3.0, 3);

        assert_eq!(quiz.score("ang_meas_consensus").map(|s| s.tries), Some(3));
        assert_eq!(quiz.total_score(), 3.0);
    }

    #[test]
    fn unscored_completion_is_recorded_once() {
        let quiz = QuizLog::new();
        quiz.mark_completed("uncertainty-slideshow");
        quiz.mark_completed("uncertainty-slideshow");

        assert!(quiz.question_completed("uncertainty-slideshow"));
        assert_eq!(quiz.score("uncertainty-slideshow"), None);
        assert_eq!(quiz.record().completed.len(), 1);
    }

    #[test]
    fn record_round_trips_through_json() {
        let quiz = QuizLog::new();
        quiz.record_score("pro-dat2", 7.5, 2);
        quiz.mark_completed("histogram-range");

        let json = serde_json::to_string(&quiz.record()).unwrap();
        let restored = QuizLog::from_record(serde_json::from_str(&json).unwrap());

        assert!(restored.question_completed("pro-dat2"));
        assert!(restored.question_completed("histogram-range"));
        assert_eq!(restored.record(), quiz.record());
    }
}
