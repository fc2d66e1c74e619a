use thiserror::Error;

use crate::dao::models::RoomStatus;

/// Events that move a room through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEvent {
    /// The admin starts the game.
    Start,
    /// The last answer of the game was recorded.
    Finish,
}

/// Error returned when an event does not apply to the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {}", from.as_str())]
pub struct InvalidTransition {
    /// Status the room was in when the event was received.
    pub from: RoomStatus,
    /// The rejected event.
    pub event: RoomEvent,
}

impl RoomStatus {
    /// Compute the status that follows `event`. Transitions never go backwards.
    pub fn next(self, event: RoomEvent) -> Result<RoomStatus, InvalidTransition> {
        match (self, event) {
            (RoomStatus::Waiting, RoomEvent::Start) => Ok(RoomStatus::Playing),
            (RoomStatus::Playing, RoomEvent::Finish) => Ok(RoomStatus::Finished),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_moves_forward() {
        let playing = RoomStatus::Waiting.next(RoomEvent::Start).unwrap();
        assert_eq!(playing, RoomStatus::Playing);
        assert_eq!(
            playing.next(RoomEvent::Finish).unwrap(),
            RoomStatus::Finished
        );
    }

    #[test]
    fn no_transition_leaves_finished() {
        for event in [RoomEvent::Start, RoomEvent::Finish] {
            let err = RoomStatus::Finished.next(event).unwrap_err();
            assert_eq!(err.from, RoomStatus::Finished);
            assert_eq!(err.event, event);
        }
    }

    #[test]
    fn cannot_restart_or_finish_early() {
        assert!(RoomStatus::Playing.next(RoomEvent::Start).is_err());
        assert!(RoomStatus::Waiting.next(RoomEvent::Finish).is_err());
    }
}
