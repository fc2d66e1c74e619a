use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{GameHistoryEntity, HistoryQuestionEntity},
    dto::format_system_time,
};

/// One finished game seen from a single player.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GameHistorySummary {
    /// Record id, stable per room and player.
    pub id: Uuid,
    /// Room the game was played in.
    pub room_id: String,
    /// Owner of the record.
    pub player_id: String,
    /// Email at the time of the game.
    pub player_email: String,
    /// Display name at the time of the game.
    pub player_username: String,
    /// Questions in the game.
    pub total_questions: usize,
    /// Accepted answers.
    pub correct_answers: usize,
    /// Final score.
    pub score: usize,
    /// 1-based rank; ties share a rank.
    pub rank: usize,
    /// RFC 3339 end time.
    pub completed_at: String,
    /// Per-question breakdown in game order.
    pub questions: Vec<HistoryQuestionSummary>,
}

/// One line of a game's breakdown.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuestionSummary {
    /// Prompt.
    pub question: String,
    /// Player's answer, or "No answer".
    pub user_answer: String,
    /// Canonical answer.
    pub correct_answer: String,
    /// Whether the player's answer was accepted.
    pub is_correct: bool,
}

impl From<HistoryQuestionEntity> for HistoryQuestionSummary {
    fn from(value: HistoryQuestionEntity) -> Self {
        Self {
            question: value.question,
            user_answer: value.user_answer,
            correct_answer: value.correct_answer,
            is_correct: value.is_correct,
        }
    }
}

impl From<GameHistoryEntity> for GameHistorySummary {
    fn from(value: GameHistoryEntity) -> Self {
        Self {
            id: value.id,
            room_id: value.room_id,
            player_id: value.player_id,
            player_email: value.player_email,
            player_username: value.player_username,
            total_questions: value.total_questions,
            correct_answers: value.correct_answers,
            score: value.score,
            rank: value.rank,
            completed_at: format_system_time(value.completed_at),
            questions: value.questions.into_iter().map(Into::into).collect(),
        }
    }
}
