use crate::signaling::{ApiError, SignalingService};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use pairlink_core::{
    AppendReceipt, CandidateRecord, Entry, ErrorCode, RoomId, SessionDescription, Slot, SlotValue,
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
pub struct CandidateQuery {
    /// Index of the first candidate to return.
    pub from: Option<usize>,
}

pub async fn health() -> &'static str {
    "ok"
}

/// `GET /rooms/{room}/{slot}`
pub async fn get_slot(
    Path((room, slot)): Path<(String, Slot)>,
    Query(query): Query<CandidateQuery>,
    State(service): State<SignalingService>,
) -> Result<Response, ApiError> {
    let room_id = RoomId::from(room.as_str());

    match slot {
        Slot::Candidates => {
            let from = query.from.unwrap_or(0);
            let candidates = service
                .store()
                .candidates_since(&room_id, from)
                .ok_or_else(|| ApiError::room_not_found(&room))?;
            debug!(
                "Room {} served {} candidate(s) from #{}",
                room,
                candidates.len(),
                from
            );
            Ok(Json(candidates).into_response())
        }

        Slot::Offer | Slot::Answer => match service.store().get(&room_id, slot) {
            Some(SlotValue::Description(desc)) => Ok(Json(desc).into_response()),
            _ if service.store().contains(&room_id) => Err(ApiError::new(
                StatusCode::NOT_FOUND,
                ErrorCode::SlotEmpty,
                format!("room '{room}' has no {slot} yet"),
            )),
            _ => Err(ApiError::room_not_found(&room)),
        },
    }
}

/// `PUT /rooms/{room}/{offer|answer}`
pub async fn put_description(
    Path((room, slot)): Path<(String, Slot)>,
    State(service): State<SignalingService>,
    Json(desc): Json<SessionDescription>,
) -> Result<StatusCode, ApiError> {
    if slot == Slot::Candidates {
        return Err(ApiError::bad_request(
            "candidates are appended with POST, not written with PUT",
        ));
    }

    service
        .store()
        .put(&RoomId::from(room), slot, Entry::Description(desc))?;

    Ok(StatusCode::CREATED)
}

/// `POST /rooms/{room}/candidates`
pub async fn append_candidate(
    Path((room, slot)): Path<(String, Slot)>,
    State(service): State<SignalingService>,
    Json(record): Json<CandidateRecord>,
) -> Result<Json<AppendReceipt>, ApiError> {
    if slot != Slot::Candidates {
        return Err(ApiError::bad_request(format!(
            "the {slot} slot is write-once, use PUT"
        )));
    }

    let len = service
        .store()
        .put(&RoomId::from(room), slot, Entry::Candidate(record))?;

    Ok(Json(AppendReceipt { len }))
}
