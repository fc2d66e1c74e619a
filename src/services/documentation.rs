use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the quiz rooms backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::join_room,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::start_game,
        crate::routes::rooms::get_room,
        crate::routes::sse::room_stream,
        crate::routes::game::submit_answer,
        crate::routes::history::list_history,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::CreateRoomResponse,
            crate::dto::room::RoomIdRequest,
            crate::dto::room::JoinRoomResponse,
            crate::dto::room::AckResponse,
            crate::dto::room::RoomSnapshot,
            crate::dto::room::PlayerSummary,
            crate::dto::room::QuestionSummary,
            crate::dto::room::AnswerSummary,
            crate::dto::game::SubmitAnswerRequest,
            crate::dto::game::SubmitAnswerResponse,
            crate::dto::history::GameHistorySummary,
            crate::dto::history::HistoryQuestionSummary,
            crate::dto::sse::RoomClosedEvent,
            crate::dao::models::RoomStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room lifecycle"),
        (name = "game", description = "Answer submission"),
        (name = "history", description = "Finished games per player"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
