use std::collections::BTreeMap;

use indexmap::IndexMap;
use mongodb::bson::{Bson, DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::MongoDaoError;
use crate::dao::{
    models::{
        AnswerEntity, GameHistoryEntity, HistoryQuestionEntity, PlayerEntity, QuestionEntity,
        RoomEntity, RoomStatus,
    },
    room_store::RoomUpdate,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoRoomDocument {
    room_id: String,
    players: Vec<PlayerEntity>,
    admin_id: String,
    max_players: usize,
    status: RoomStatus,
    questions: Vec<QuestionEntity>,
    current_question_index: usize,
    scores: IndexMap<String, u32>,
    // BSON documents only accept string keys, so question indexes are stringified.
    answers: IndexMap<String, IndexMap<String, MongoAnswerDocument>>,
    created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoAnswerDocument {
    answer: String,
    correct: bool,
    timestamp: DateTime,
}

impl From<RoomEntity> for MongoRoomDocument {
    fn from(value: RoomEntity) -> Self {
        let answers = value
            .answers
            .into_iter()
            .map(|(player_id, by_index)| {
                let by_index = by_index
                    .into_iter()
                    .map(|(index, answer)| (index.to_string(), answer.into()))
                    .collect();
                (player_id, by_index)
            })
            .collect();

        Self {
            room_id: value.room_id,
            players: value.players,
            admin_id: value.admin_id,
            max_players: value.max_players,
            status: value.status,
            questions: value.questions,
            current_question_index: value.current_question_index,
            scores: value.scores,
            answers,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoRoomDocument> for RoomEntity {
    type Error = MongoDaoError;

    fn try_from(value: MongoRoomDocument) -> Result<Self, Self::Error> {
        let room_id = value.room_id;
        let mut answers = IndexMap::with_capacity(value.answers.len());
        for (player_id, by_key) in value.answers {
            let mut by_index = BTreeMap::new();
            for (key, answer) in by_key {
                let index = key
                    .parse::<usize>()
                    .map_err(|_| MongoDaoError::CorruptAnswerKey {
                        room_id: room_id.clone(),
                        key: key.clone(),
                    })?;
                by_index.insert(index, answer.into());
            }
            answers.insert(player_id, by_index);
        }

        Ok(Self {
            room_id,
            players: value.players,
            admin_id: value.admin_id,
            max_players: value.max_players,
            status: value.status,
            questions: value.questions,
            current_question_index: value.current_question_index,
            scores: value.scores,
            answers,
            created_at: value.created_at.to_system_time(),
        })
    }
}

impl From<AnswerEntity> for MongoAnswerDocument {
    fn from(value: AnswerEntity) -> Self {
        Self {
            answer: value.answer,
            correct: value.correct,
            timestamp: DateTime::from_system_time(value.timestamp),
        }
    }
}

impl From<MongoAnswerDocument> for AnswerEntity {
    fn from(value: MongoAnswerDocument) -> Self {
        Self {
            answer: value.answer,
            correct: value.correct,
            timestamp: value.timestamp.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MongoHistoryDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    room_id: String,
    player_id: String,
    player_email: String,
    player_username: String,
    total_questions: usize,
    correct_answers: usize,
    score: usize,
    rank: usize,
    completed_at: DateTime,
    questions: Vec<HistoryQuestionEntity>,
}

impl From<GameHistoryEntity> for MongoHistoryDocument {
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
            completed_at: DateTime::from_system_time(value.completed_at),
            questions: value.questions,
        }
    }
}

impl From<MongoHistoryDocument> for GameHistoryEntity {
    fn from(value: MongoHistoryDocument) -> Self {
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
            completed_at: value.completed_at.to_system_time(),
            questions: value.questions,
        }
    }
}

pub fn room_filter(room_id: &str) -> Document {
    doc! { "roomId": room_id }
}

/// Translate targeted room updates into a single `$set` / `$push` update document.
pub fn update_document(updates: Vec<RoomUpdate>) -> Document {
    let mut set = Document::new();
    let mut pushed_players = Vec::new();

    for update in updates {
        match update {
            RoomUpdate::PushPlayer(player) => pushed_players.push(Bson::Document(doc! {
                "id": player.id,
                "email": player.email,
                "username": player.username,
            })),
            RoomUpdate::SetScore { player_id, score } => {
                set.insert(format!("scores.{player_id}"), i64::from(score));
            }
            RoomUpdate::SetStatus(status) => {
                set.insert("status", status.as_str());
            }
            RoomUpdate::SetQuestions(questions) => {
                let questions = questions
                    .into_iter()
                    .map(|question| {
                        Bson::Document(doc! {
                            "id": question.id,
                            "question": question.question,
                            "answer": question.answer,
                        })
                    })
                    .collect::<Vec<_>>();
                set.insert("questions", questions);
            }
            RoomUpdate::SetCurrentQuestionIndex(index) => {
                set.insert("currentQuestionIndex", index as i64);
            }
        }
    }

    let mut update = Document::new();
    if !set.is_empty() {
        update.insert("$set", set);
    }
    if !pushed_players.is_empty() {
        update.insert("$push", doc! { "players": { "$each": pushed_players } });
    }
    update
}
