use std::{collections::BTreeMap, time::SystemTime};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Identity captured from the auth layer when a player enters a room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    /// Stable identifier issued by the identity provider.
    pub id: String,
    /// Email address attached to the identity.
    pub email: String,
    /// Display name shown to other players.
    pub username: String,
}

/// Question/answer pair drawn from the question bank.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionEntity {
    /// Identifier of the question inside the pool.
    pub id: String,
    /// Prompt shown to the players.
    pub question: String,
    /// Canonical answer, compared case and surrounding-whitespace insensitively.
    pub answer: String,
}

/// Lifecycle status of a room. Only moves forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// Players can join; no questions drawn yet.
    Waiting,
    /// Questions are loaded and answers are accepted.
    Playing,
    /// The game ended and history records were written.
    Finished,
}

impl RoomStatus {
    /// Wire representation, identical to the serde form.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Playing => "playing",
            RoomStatus::Finished => "finished",
        }
    }
}

/// A recorded answer. Written once per (player, question index).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerEntity {
    /// Raw text submitted by the player.
    pub answer: String,
    /// Whether the text matched the canonical answer.
    pub correct: bool,
    /// Time the submission was accepted.
    pub timestamp: SystemTime,
}

/// Aggregate room record persisted by the storage layer and shared across layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomEntity {
    /// Store key of the room.
    pub room_id: String,
    /// Players in join order.
    pub players: Vec<PlayerEntity>,
    /// Player allowed to start the game.
    pub admin_id: String,
    /// Capacity fixed at creation.
    pub max_players: usize,
    /// Current lifecycle status.
    pub status: RoomStatus,
    /// Questions drawn when the game started.
    pub questions: Vec<QuestionEntity>,
    /// Shared cursor advanced by the lead player.
    pub current_question_index: usize,
    /// Correct-answer count per player id.
    pub scores: IndexMap<String, u32>,
    /// Recorded answers per player id, keyed by question index.
    pub answers: IndexMap<String, BTreeMap<usize, AnswerEntity>>,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// One line of the per-question breakdown stored in a history record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuestionEntity {
    /// Prompt of the question.
    pub question: String,
    /// What the player answered, or the "No answer" placeholder.
    pub user_answer: String,
    /// Canonical answer.
    pub correct_answer: String,
    /// Whether the player's answer was accepted.
    pub is_correct: bool,
}

/// Immutable per-player summary of one finished game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameHistoryEntity {
    /// Primary key of the record.
    pub id: Uuid,
    /// Room the game was played in.
    pub room_id: String,
    /// Player the record belongs to.
    pub player_id: String,
    /// Player email at the time of the game.
    pub player_email: String,
    /// Player display name at the time of the game.
    pub player_username: String,
    /// Number of questions in the game.
    pub total_questions: usize,
    /// Number of accepted answers.
    pub correct_answers: usize,
    /// Final score, mirrors `correct_answers`.
    pub score: usize,
    /// 1-based rank; ties share a rank and the next distinct score skips.
    pub rank: usize,
    /// Time the game ended.
    pub completed_at: SystemTime,
    /// Per-question breakdown in game order.
    pub questions: Vec<HistoryQuestionEntity>,
}
