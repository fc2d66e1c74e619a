//! Pure room rules: membership, game start, answer scoring, cursor movement,
//! end-of-game detection and ranking. Nothing here touches storage; services
//! load a room, run one of these operations and persist the outcome.

use std::time::SystemTime;

use indexmap::IndexMap;
use thiserror::Error;

use crate::{
    dao::{
        models::{AnswerEntity, PlayerEntity, QuestionEntity, RoomEntity, RoomStatus},
        room_store::RoomUpdate,
    },
    state::status::{InvalidTransition, RoomEvent},
};

/// Number of questions drawn for every game.
pub const QUESTIONS_PER_GAME: usize = 10;
/// Highest value the shared cursor can take.
pub const LAST_QUESTION_INDEX: usize = QUESTIONS_PER_GAME - 1;
/// Smallest allowed room capacity, also the minimum head count to start.
pub const MIN_PLAYERS: usize = 2;
/// Largest allowed room capacity.
pub const MAX_PLAYERS: usize = 10;

/// Rule violations raised by room operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomRuleError {
    #[error("max players must be between {MIN_PLAYERS} and {MAX_PLAYERS} (got {0})")]
    InvalidMaxPlayers(usize),
    #[error(transparent)]
    InvalidTransition(#[from] InvalidTransition),
    #[error("room is not accepting players (status {})", .0.as_str())]
    NotAcceptingPlayers(RoomStatus),
    #[error("game is not active (status {})", .0.as_str())]
    GameNotActive(RoomStatus),
    #[error("room is full ({0} players)")]
    RoomFull(usize),
    #[error("player `{0}` already joined this room")]
    AlreadyJoined(String),
    #[error("only the room admin can start the game")]
    NotAdmin,
    #[error("player `{0}` is not in this room")]
    NotMember(String),
    #[error("need at least {MIN_PLAYERS} players to start (got {0})")]
    InsufficientPlayers(usize),
    #[error("no questions available")]
    NoQuestions,
    #[error("question index {index} is out of bounds ({len} questions)")]
    QuestionOutOfBounds { index: usize, len: usize },
    #[error("question {0} was already answered")]
    AlreadyAnswered(usize),
}

/// What a departure did to the room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// The room emptied or lost its admin and must be deleted.
    Closed,
    /// Other players remain; the reduced room must be persisted.
    Remaining,
}

/// Result of one accepted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    /// Whether the submission matched the canonical answer.
    pub correct: bool,
    /// Canonical answer of the question.
    pub correct_answer: String,
    /// Whether this answer finished the game.
    pub game_ended: bool,
    /// Shared cursor after the answer, `None` once the game ended.
    pub next_question_index: Option<usize>,
    /// Submitter's score including this answer.
    pub score: u32,
}

/// Case-insensitive comparison ignoring surrounding whitespace.
pub fn answers_match(submitted: &str, canonical: &str) -> bool {
    submitted.trim().to_lowercase() == canonical.trim().to_lowercase()
}

impl RoomEntity {
    /// Build a waiting room owned by `admin`, who is also its first player.
    pub fn open(
        room_id: String,
        admin: PlayerEntity,
        max_players: usize,
        created_at: SystemTime,
    ) -> Result<Self, RoomRuleError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&max_players) {
            return Err(RoomRuleError::InvalidMaxPlayers(max_players));
        }

        Ok(Self {
            room_id,
            admin_id: admin.id.clone(),
            scores: IndexMap::from([(admin.id.clone(), 0)]),
            players: vec![admin],
            max_players,
            status: RoomStatus::Waiting,
            questions: Vec::new(),
            current_question_index: 0,
            answers: IndexMap::new(),
            created_at,
        })
    }

    /// Whether `player_id` is in the room.
    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|player| player.id == player_id)
    }

    /// Current score, 0 for unknown players.
    pub fn score_of(&self, player_id: &str) -> u32 {
        self.scores.get(player_id).copied().unwrap_or(0)
    }

    /// Add `player` to a waiting room and return the targeted updates to persist.
    pub fn admit(&mut self, player: PlayerEntity) -> Result<Vec<RoomUpdate>, RoomRuleError> {
        if self.status != RoomStatus::Waiting {
            return Err(RoomRuleError::NotAcceptingPlayers(self.status));
        }
        if self.players.len() >= self.max_players {
            return Err(RoomRuleError::RoomFull(self.players.len()));
        }
        if self.has_player(&player.id) {
            return Err(RoomRuleError::AlreadyJoined(player.id));
        }

        let updates = vec![
            RoomUpdate::SetScore {
                player_id: player.id.clone(),
                score: 0,
            },
            RoomUpdate::PushPlayer(player),
        ];
        self.apply_updates(&updates);
        Ok(updates)
    }

    /// Drop a player together with their scores and answers.
    ///
    /// An admin departure closes the room instead of promoting another player.
    pub fn depart(&mut self, player_id: &str) -> Departure {
        self.players.retain(|player| player.id != player_id);
        self.scores.shift_remove(player_id);
        self.answers.shift_remove(player_id);

        if self.players.is_empty() || self.admin_id == player_id {
            Departure::Closed
        } else {
            Departure::Remaining
        }
    }

    /// Start the game on behalf of `requester_id`, drawing questions only once
    /// every precondition holds. Returns the targeted updates to persist.
    pub fn begin<F>(&mut self, requester_id: &str, draw: F) -> Result<Vec<RoomUpdate>, RoomRuleError>
    where
        F: FnOnce() -> Vec<QuestionEntity>,
    {
        if self.admin_id != requester_id {
            return Err(RoomRuleError::NotAdmin);
        }
        let next = self.status.next(RoomEvent::Start)?;
        if self.players.len() < MIN_PLAYERS {
            return Err(RoomRuleError::InsufficientPlayers(self.players.len()));
        }

        let questions = draw();
        if questions.is_empty() {
            return Err(RoomRuleError::NoQuestions);
        }

        let updates = vec![
            RoomUpdate::SetStatus(next),
            RoomUpdate::SetQuestions(questions),
            RoomUpdate::SetCurrentQuestionIndex(0),
        ];
        self.apply_updates(&updates);
        Ok(updates)
    }

    /// Record `player_id`'s answer to question `index`.
    ///
    /// The first answer wins: a second submission for the same index is rejected
    /// and leaves the score untouched.
    pub fn record_answer(
        &mut self,
        player_id: &str,
        index: usize,
        submitted: String,
        at: SystemTime,
    ) -> Result<AnswerOutcome, RoomRuleError> {
        if self.status != RoomStatus::Playing {
            return Err(RoomRuleError::GameNotActive(self.status));
        }
        if self.questions.is_empty() {
            return Err(RoomRuleError::NoQuestions);
        }
        let Some(question) = self.questions.get(index) else {
            return Err(RoomRuleError::QuestionOutOfBounds {
                index,
                len: self.questions.len(),
            });
        };
        let correct_answer = question.answer.clone();
        if !self.has_player(player_id) {
            return Err(RoomRuleError::NotMember(player_id.to_owned()));
        }

        let correct = answers_match(&submitted, &correct_answer);
        let recorded = self.answers.entry(player_id.to_owned()).or_default();
        if recorded.contains_key(&index) {
            return Err(RoomRuleError::AlreadyAnswered(index));
        }
        recorded.insert(
            index,
            AnswerEntity {
                answer: submitted,
                correct,
                timestamp: at,
            },
        );

        let score = self.scores.entry(player_id.to_owned()).or_insert(0);
        if correct {
            *score += 1;
        }
        let score = *score;

        // Only an answer to the question under the cursor moves it.
        if index == self.current_question_index {
            self.current_question_index = (index + 1).min(LAST_QUESTION_INDEX);
        }

        let game_ended = self.is_complete();
        if game_ended {
            self.status = self.status.next(RoomEvent::Finish)?;
        }

        Ok(AnswerOutcome {
            correct,
            correct_answer,
            game_ended,
            next_question_index: (!game_ended).then_some(self.current_question_index),
            score,
        })
    }

    /// The game is over once the cursor reached the last question or every
    /// current player answered a full game's worth of questions.
    pub fn is_complete(&self) -> bool {
        let cursor_at_end = self.current_question_index >= LAST_QUESTION_INDEX;
        let everyone_done = self.players.iter().all(|player| {
            self.answers
                .get(&player.id)
                .is_some_and(|answers| answers.len() >= QUESTIONS_PER_GAME)
        });
        cursor_at_end || everyone_done
    }

    /// 1 + number of players with a strictly greater score. Ties share a rank
    /// and the following rank is skipped (scores 7, 7, 5 rank 1, 1, 3).
    pub fn rank_of(&self, player_id: &str) -> usize {
        let score = self.score_of(player_id);
        1 + self
            .players
            .iter()
            .filter(|player| self.score_of(&player.id) > score)
            .count()
    }

    /// Accepted answers recorded for `player_id`.
    pub fn correct_answers_of(&self, player_id: &str) -> usize {
        self.answers
            .get(player_id)
            .map(|answers| answers.values().filter(|answer| answer.correct).count())
            .unwrap_or(0)
    }

    fn apply_updates(&mut self, updates: &[RoomUpdate]) {
        for update in updates.iter().cloned() {
            update.apply(self);
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn player(id: &str) -> PlayerEntity {
        PlayerEntity {
            id: id.into(),
            email: format!("{id}@example.com"),
            username: id.into(),
        }
    }

    pub(crate) fn questions() -> Vec<QuestionEntity> {
        (0..QUESTIONS_PER_GAME)
            .map(|i| QuestionEntity {
                id: (i + 1).to_string(),
                question: format!("Question {i}?"),
                answer: format!("Answer {i}"),
            })
            .collect()
    }

    fn waiting_room(max_players: usize, ids: &[&str]) -> RoomEntity {
        let mut room =
            RoomEntity::open("ROOMTEST".into(), player(ids[0]), max_players, SystemTime::now())
                .unwrap();
        for id in &ids[1..] {
            room.admit(player(id)).unwrap();
        }
        room
    }

    fn playing_room(ids: &[&str]) -> RoomEntity {
        let mut room = waiting_room(ids.len().max(MIN_PLAYERS), ids);
        room.begin(ids[0], questions).unwrap();
        room
    }

    fn answer(room: &mut RoomEntity, id: &str, index: usize, correct: bool) -> AnswerOutcome {
        let text = if correct {
            format!("answer {index}")
        } else {
            String::new()
        };
        room.record_answer(id, index, text, SystemTime::now()).unwrap()
    }

    #[test]
    fn open_accepts_every_capacity_in_range() {
        for max in MIN_PLAYERS..=MAX_PLAYERS {
            let room = RoomEntity::open("R".into(), player("a"), max, SystemTime::now()).unwrap();
            assert_eq!(room.admin_id, "a");
            assert_eq!(room.status, RoomStatus::Waiting);
            assert_eq!(room.scores.get("a"), Some(&0));
            assert!(room.questions.is_empty());
        }
    }

    #[test]
    fn open_rejects_capacity_out_of_range() {
        for max in [0, 1, 11, 100] {
            let err = RoomEntity::open("R".into(), player("a"), max, SystemTime::now()).unwrap_err();
            assert_eq!(err, RoomRuleError::InvalidMaxPlayers(max));
        }
    }

    #[test]
    fn admit_rejects_full_rooms_and_duplicates() {
        let mut room = waiting_room(2, &["a"]);
        assert_eq!(
            room.admit(player("a")).unwrap_err(),
            RoomRuleError::AlreadyJoined("a".into())
        );

        let updates = room.admit(player("b")).unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(room.players.len(), 2);
        assert_eq!(room.scores.get("b"), Some(&0));

        assert_eq!(
            room.admit(player("c")).unwrap_err(),
            RoomRuleError::RoomFull(2)
        );
        // Full is reported before duplicate membership.
        assert_eq!(
            room.admit(player("b")).unwrap_err(),
            RoomRuleError::RoomFull(2)
        );
    }

    #[test]
    fn admit_requires_waiting_room() {
        let mut room = playing_room(&["a", "b"]);
        assert_eq!(
            room.admit(player("c")).unwrap_err(),
            RoomRuleError::NotAcceptingPlayers(RoomStatus::Playing)
        );
    }

    #[test]
    fn admin_departure_closes_room() {
        let mut room = waiting_room(3, &["a", "b", "c"]);
        assert_eq!(room.depart("a"), Departure::Closed);
    }

    #[test]
    fn player_departure_removes_their_entries() {
        let mut room = playing_room(&["a", "b", "c"]);
        answer(&mut room, "b", 0, true);

        assert_eq!(room.depart("b"), Departure::Remaining);
        assert!(!room.has_player("b"));
        assert!(!room.scores.contains_key("b"));
        assert!(!room.answers.contains_key("b"));
    }

    #[test]
    fn begin_checks_admin_then_status_then_head_count() {
        let mut lonely = waiting_room(4, &["a"]);
        assert_eq!(
            lonely.begin("someone", questions).unwrap_err(),
            RoomRuleError::NotAdmin
        );
        assert_eq!(
            lonely.begin("a", questions).unwrap_err(),
            RoomRuleError::InsufficientPlayers(1)
        );

        let mut room = playing_room(&["a", "b"]);
        assert!(matches!(
            room.begin("a", questions).unwrap_err(),
            RoomRuleError::InvalidTransition(_)
        ));
    }

    #[test]
    fn begin_loads_questions_and_resets_cursor() {
        let mut room = waiting_room(2, &["a", "b"]);
        let updates = room.begin("a", questions).unwrap();
        assert_eq!(updates.len(), 3);
        assert_eq!(room.status, RoomStatus::Playing);
        assert_eq!(room.questions.len(), QUESTIONS_PER_GAME);
        assert_eq!(room.current_question_index, 0);
    }

    #[test]
    fn answers_compare_case_and_whitespace_insensitively() {
        assert!(answers_match(" Paris ", "Paris"));
        assert!(answers_match("pARIS", "  paris"));
        assert!(!answers_match("Par is", "Paris"));
        assert!(!answers_match("", "Paris"));
    }

    #[test]
    fn second_answer_is_rejected_and_score_kept() {
        let mut room = playing_room(&["a", "b"]);
        let first = answer(&mut room, "a", 0, true);
        assert!(first.correct);
        assert_eq!(first.score, 1);
        assert_eq!(first.correct_answer, "Answer 0");

        let err = room
            .record_answer("a", 0, "Answer 0".into(), SystemTime::now())
            .unwrap_err();
        assert_eq!(err, RoomRuleError::AlreadyAnswered(0));
        assert_eq!(room.score_of("a"), 1);
    }

    #[test]
    fn answer_preconditions() {
        let mut waiting = waiting_room(2, &["a", "b"]);
        assert_eq!(
            waiting
                .record_answer("a", 0, "x".into(), SystemTime::now())
                .unwrap_err(),
            RoomRuleError::GameNotActive(RoomStatus::Waiting)
        );

        let mut room = playing_room(&["a", "b"]);
        assert_eq!(
            room.record_answer("a", 10, "x".into(), SystemTime::now())
                .unwrap_err(),
            RoomRuleError::QuestionOutOfBounds { index: 10, len: 10 }
        );
        assert_eq!(
            room.record_answer("stranger", 0, "x".into(), SystemTime::now())
                .unwrap_err(),
            RoomRuleError::NotMember("stranger".into())
        );
        assert!(!room.scores.contains_key("stranger"));
    }

    #[test]
    fn cursor_moves_only_for_the_current_question() {
        let mut room = playing_room(&["a", "b"]);

        let out_of_turn = answer(&mut room, "b", 4, true);
        assert_eq!(out_of_turn.next_question_index, Some(0));

        let lead = answer(&mut room, "a", 0, false);
        assert_eq!(lead.next_question_index, Some(1));

        // A trailing player answering an earlier question never moves it back.
        let trailing = answer(&mut room, "b", 0, true);
        assert_eq!(trailing.next_question_index, Some(1));
    }

    #[test]
    fn cursor_reaching_last_index_ends_the_game() {
        let mut room = playing_room(&["a", "b"]);
        for index in 0..LAST_QUESTION_INDEX - 1 {
            let outcome = answer(&mut room, "a", index, true);
            assert!(!outcome.game_ended);
        }

        let outcome = answer(&mut room, "a", LAST_QUESTION_INDEX - 1, true);
        assert!(outcome.game_ended);
        assert_eq!(outcome.next_question_index, None);
        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(room.current_question_index, LAST_QUESTION_INDEX);
    }

    #[test]
    fn everyone_answering_everything_ends_the_game() {
        let mut room = playing_room(&["a", "b"]);
        // Answering from the last question down keeps the cursor at 1 at most.
        for id in ["a", "b"] {
            for index in (0..QUESTIONS_PER_GAME).rev() {
                let outcome = answer(&mut room, id, index, index % 2 == 0);
                let finished = id == "b" && index == 0;
                assert_eq!(outcome.game_ended, finished);
            }
        }
        assert!(room.current_question_index < LAST_QUESTION_INDEX);
        assert_eq!(room.status, RoomStatus::Finished);
        assert_eq!(room.score_of("a"), 5);
        assert_eq!(room.correct_answers_of("b"), 5);
    }

    #[test]
    fn finished_game_rejects_answers() {
        let mut room = playing_room(&["a", "b"]);
        for index in 0..LAST_QUESTION_INDEX {
            answer(&mut room, "a", index, true);
        }
        assert_eq!(
            room.record_answer("b", 0, "x".into(), SystemTime::now())
                .unwrap_err(),
            RoomRuleError::GameNotActive(RoomStatus::Finished)
        );
    }

    #[test]
    fn ties_share_rank_and_skip_the_next() {
        let mut room = waiting_room(3, &["a", "b", "c"]);
        room.scores.insert("a".into(), 7);
        room.scores.insert("b".into(), 7);
        room.scores.insert("c".into(), 5);

        assert_eq!(room.rank_of("a"), 1);
        assert_eq!(room.rank_of("b"), 1);
        assert_eq!(room.rank_of("c"), 3);
    }
}
