use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::server::app::AppState;

/// Server-sent stream of project update events. Subscribers that fall behind
/// the broadcast buffer miss events rather than stalling the publisher.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|message| match message {
        Ok(update) => Event::default()
            .event("project_updated")
            .json_data(&update)
            .ok()
            .map(Ok::<_, Infallible>),
        // lagged receiver, skip
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
