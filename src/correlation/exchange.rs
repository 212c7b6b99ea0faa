//! Single-outstanding-request exchange with one client.

use std::time::{Duration, Instant};

use tokio::time::{sleep_until, timeout_at};

use crate::correlation::Outcome;
use crate::observability::metrics;
use crate::registry::{ClientId, Registry};

/// Send `message` to client `id` and wait for its next line.
///
/// Steps: look up the session, take the session's response slot, drop any
/// stale line left from an earlier exchange, write the message verbatim,
/// then wait for a reply.
///
/// `response_timeout` bounds the whole exchange: time spent queued for the
/// slot and writing counts against it. Exchanges on the same client are
/// serialized by the slot lock.
pub async fn send_and_await(
    registry: &Registry,
    id: &ClientId,
    message: &str,
    response_timeout: Duration,
) -> Outcome {
    let started = Instant::now();
    let outcome = exchange(registry, id, message, response_timeout).await;

    metrics::record_exchange(outcome.label(), started);
    tracing::debug!(
        client_id = %id,
        outcome = outcome.label(),
        elapsed = ?started.elapsed(),
        "Exchange finished"
    );
    outcome
}

async fn exchange(
    registry: &Registry,
    id: &ClientId,
    message: &str,
    response_timeout: Duration,
) -> Outcome {
    let deadline = tokio::time::Instant::now() + response_timeout;

    let Some(session) = registry.lookup(id) else {
        return Outcome::ClientNotFound;
    };

    let Ok(mut inbound) = timeout_at(deadline, session.lock_inbound()).await else {
        tracing::debug!(client_id = %id, "Another exchange held the response slot");
        return Outcome::Timeout;
    };

    if let Ok(stale) = inbound.try_recv() {
        tracing::debug!(client_id = %id, bytes = stale.len(), "Discarded stale line");
    }

    match timeout_at(deadline, session.write_message(message.as_bytes())).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::warn!(client_id = %id, error = %e, "Write to client failed");
            return Outcome::WriteFailed;
        }
        Err(_) => {
            tracing::warn!(client_id = %id, "Write to client stalled");
            return Outcome::WriteFailed;
        }
    }

    let mut closed = session.closed_signal();
    tokio::select! {
        biased;
        line = inbound.recv() => match line {
            Some(line) => Outcome::Delivered(line),
            None => Outcome::ClientGone,
        },
        _ = closed.wait_for(|closed| *closed) => Outcome::ClientGone,
        _ = sleep_until(deadline) => Outcome::Timeout,
    }
}
