use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, Sse};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use super::{ApiError, AppState};

pub async fn session_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let rx = state.registry.get(&id)?.subscribe();
    let stream = BroadcastStream::new(rx).map(|result| {
        let event = match result {
            Ok(evt) => Event::default()
                .event(evt.name())
                .data(serde_json::to_string(&evt).unwrap_or_default()),
            Err(_) => Event::default().comment("missed event"),
        };
        Ok(event)
    });

    Ok(Sse::new(stream))
}
