use crate::server::{notes::NoteHub, telemetry::increment_notes_recorded};
use routeguide_core::{Error, proto::RouteNote};
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt};
use tonic::Status;

/// Runs one `RouteChat` session.
///
/// For every inbound note: record it in `hub` and send the resulting mailbox
/// for that location (oldest first, the new note last) back on `resp_tx`.
/// The loop ends cleanly when the client half-closes.
///
/// # Errors
///
/// - [`Error::Transport`] if receiving the next note fails.
/// - [`Error::ChannelError`] if an echo cannot be sent; the rest of that
///   snapshot is dropped.
pub async fn route_chat<S>(
    hub: &NoteHub,
    notes: S,
    resp_tx: &mpsc::Sender<Result<RouteNote, Status>>,
) -> routeguide_core::Result<()>
where
    S: Stream<Item = Result<RouteNote, Status>>,
{
    futures::pin_mut!(notes);

    while let Some(note) = notes.next().await {
        let mailbox = hub.record(note?);
        increment_notes_recorded();

        for echo in mailbox {
            if let Err(e) = resp_tx.send(Ok(echo)).await {
                return Err(Error::ChannelError {
                    context: format!("Failed to forward note: {e}"),
                });
            }
        }
    }

    Ok(())
}
