//! Per-player records written when a game ends, and their retrieval.

use std::time::SystemTime;

use futures::future::try_join_all;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::{
        models::{GameHistoryEntity, HistoryQuestionEntity, RoomEntity},
        room_store::RoomStore,
    },
    dto::history::GameHistorySummary,
    error::ServiceError,
    state::SharedState,
};

/// Most records returned by [`list_history`].
pub const HISTORY_LIMIT: usize = 20;
/// Shown in place of a missing or blank answer.
const NO_ANSWER: &str = "No answer";
const HISTORY_ID_NAMESPACE: Uuid = Uuid::from_u128(0x5b2f_0c4e_8d1a_4f6b_9a3e_71c2_d4e8_f016);

/// Stable id of a player's record for one room, so rewriting a game is a no-op.
pub fn history_id(room_id: &str, player_id: &str) -> Uuid {
    Uuid::new_v5(
        &HISTORY_ID_NAMESPACE,
        format!("{room_id}/{player_id}").as_bytes(),
    )
}

/// One record per player currently in the finished room.
pub fn build_records(room: &RoomEntity, completed_at: SystemTime) -> Vec<GameHistoryEntity> {
    room.players
        .iter()
        .map(|player| {
            let answers = room.answers.get(&player.id);
            let questions = room
                .questions
                .iter()
                .enumerate()
                .map(|(index, question)| {
                    let recorded = answers.and_then(|by_index| by_index.get(&index));
                    HistoryQuestionEntity {
                        question: question.question.clone(),
                        user_answer: recorded
                            .map(|answer| answer.answer.as_str())
                            .filter(|text| !text.is_empty())
                            .unwrap_or(NO_ANSWER)
                            .to_string(),
                        correct_answer: question.answer.clone(),
                        is_correct: recorded.is_some_and(|answer| answer.correct),
                    }
                })
                .collect();
            let correct_answers = room.correct_answers_of(&player.id);

            GameHistoryEntity {
                id: history_id(&room.room_id, &player.id),
                room_id: room.room_id.clone(),
                player_id: player.id.clone(),
                player_email: player.email.clone(),
                player_username: player.username.clone(),
                total_questions: room.questions.len(),
                correct_answers,
                score: correct_answers,
                rank: room.rank_of(&player.id),
                completed_at,
                questions,
            }
        })
        .collect()
}

/// Insert every player's record concurrently and wait for all of them.
///
/// Safe to repeat after a partial failure: records already stored keep their
/// first version.
pub async fn record_game(
    store: &dyn RoomStore,
    room: &RoomEntity,
    completed_at: SystemTime,
) -> Result<usize, ServiceError> {
    let records = build_records(room, completed_at);
    let count = records.len();
    try_join_all(records.into_iter().map(|record| store.insert_history(record))).await?;
    info!(room_id = %room.room_id, records = count, "game history recorded");
    Ok(count)
}

/// Most recent games of `player_id`, newest first.
pub async fn list_history(
    state: &SharedState,
    player_id: &str,
) -> Result<Vec<GameHistorySummary>, ServiceError> {
    let store = state.require_room_store().await?;
    let records = store
        .list_history(player_id.to_string(), HISTORY_LIMIT)
        .await?;
    Ok(records.into_iter().map(Into::into).collect())
}
