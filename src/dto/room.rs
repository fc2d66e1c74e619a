use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::{AnswerEntity, PlayerEntity, QuestionEntity, RoomEntity, RoomStatus},
    dto::format_system_time,
};

/// Payload of `POST /rooms`.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    /// Capacity of the room, between 2 and 10.
    #[validate(range(min = 2, max = 10, message = "Max players must be between 2 and 10"))]
    pub max_players: usize,
}

/// Payload shared by the join, leave and start routes.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomIdRequest {
    /// Target room.
    #[validate(length(min = 1, message = "Room ID is required"))]
    pub room_id: String,
}

/// Identifiers of a freshly created room.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// Identifier to share with the other players.
    pub room_id: String,
    /// The creator, who may start the game.
    pub admin_id: String,
}

/// Room as it stands after the join.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinRoomResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
    /// Updated room.
    pub room: RoomSnapshot,
}

/// Plain acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct AckResponse {
    /// Always `true`; failures use the error body.
    pub success: bool,
}

impl AckResponse {
    /// Successful acknowledgement.
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Full room view returned to pollers.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Room identifier.
    pub room_id: String,
    /// Players in join order.
    pub players: Vec<PlayerSummary>,
    /// Player allowed to start the game.
    pub admin_id: String,
    /// Capacity fixed at creation.
    pub max_players: usize,
    /// Lifecycle status.
    pub status: RoomStatus,
    /// Questions drawn at start; empty while waiting.
    pub questions: Vec<QuestionSummary>,
    /// Shared cursor.
    pub current_question_index: usize,
    /// Player id → correct answers so far.
    #[schema(value_type = Object)]
    pub scores: IndexMap<String, u32>,
    /// Player id → question index → recorded answer.
    #[schema(value_type = Object)]
    pub answers: IndexMap<String, BTreeMap<usize, AnswerSummary>>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Public identity of a room member.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlayerSummary {
    /// Player id from the identity headers.
    pub id: String,
    /// Player email.
    pub email: String,
    /// Display name.
    pub username: String,
}

/// One drawn question with its canonical answer.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuestionSummary {
    /// Identifier inside the question pool.
    pub id: String,
    /// Prompt.
    pub question: String,
    /// Canonical answer.
    pub answer: String,
}

/// A recorded submission.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnswerSummary {
    /// Text as submitted.
    pub answer: String,
    /// Whether it matched.
    pub correct: bool,
    /// RFC 3339 submission time.
    pub timestamp: String,
}

impl From<PlayerEntity> for PlayerSummary {
    fn from(value: PlayerEntity) -> Self {
        Self {
            id: value.id,
            email: value.email,
            username: value.username,
        }
    }
}

impl From<QuestionEntity> for QuestionSummary {
    fn from(value: QuestionEntity) -> Self {
        Self {
            id: value.id,
            question: value.question,
            answer: value.answer,
        }
    }
}

impl From<AnswerEntity> for AnswerSummary {
    fn from(value: AnswerEntity) -> Self {
        Self {
            answer: value.answer,
            correct: value.correct,
            timestamp: format_system_time(value.timestamp),
        }
    }
}

impl From<RoomEntity> for RoomSnapshot {
    fn from(value: RoomEntity) -> Self {
        let answers = value
            .answers
            .into_iter()
            .map(|(player_id, by_index)| {
                let by_index = by_index
                    .into_iter()
                    .map(|(index, answer)| (index, answer.into()))
                    .collect();
                (player_id, by_index)
            })
            .collect();

        Self {
            room_id: value.room_id,
            players: value.players.into_iter().map(Into::into).collect(),
            admin_id: value.admin_id,
            max_players: value.max_players,
            status: value.status,
            questions: value.questions.into_iter().map(Into::into).collect(),
            current_question_index: value.current_question_index,
            scores: value.scores,
            answers,
            created_at: format_system_time(value.created_at),
        }
    }
}
