use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::room::AnswerOutcome;

/// Payload of `POST /game/answer`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    /// Room of the running game.
    #[validate(length(min = 1, message = "Room ID is required"))]
    pub room_id: String,
    /// Free text answer. The client submits an empty string when its timer expires.
    #[serde(default)]
    pub answer: String,
    /// Zero-based index of the answered question.
    pub question_index: usize,
}

/// Result of a recorded answer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// Whether the answer matched.
    pub is_correct: bool,
    /// Canonical answer of the question.
    pub correct_answer: String,
    /// Whether this submission finished the game.
    pub game_ended: bool,
    /// Shared room cursor; `null` once the game ended.
    pub next_question_index: Option<usize>,
    /// Caller's score after this submission.
    pub current_score: u32,
}

impl From<AnswerOutcome> for SubmitAnswerResponse {
    fn from(value: AnswerOutcome) -> Self {
        Self {
            success: true,
            is_correct: value.correct,
            correct_answer: value.correct_answer,
            game_ended: value.game_ended,
            next_question_index: value.next_question_index,
            current_score: value.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_answer_defaults_to_empty() {
        let request: SubmitAnswerRequest =
            serde_json::from_str(r#"{"roomId": "ROOMX", "questionIndex": 3}"#).unwrap();
        assert_eq!(request.answer, "");
        assert_eq!(request.question_index, 3);
    }

    #[test]
    fn ended_game_serializes_null_next_index() {
        let response = SubmitAnswerResponse::from(AnswerOutcome {
            correct: true,
            correct_answer: "Paris".into(),
            game_ended: true,
            next_question_index: None,
            score: 4,
        });
        let value = serde_json::to_value(response).unwrap();
        assert_eq!(value["isCorrect"], true);
        assert_eq!(value["gameEnded"], true);
        assert!(value["nextQuestionIndex"].is_null());
        assert_eq!(value["currentScore"], 4);
    }
}
