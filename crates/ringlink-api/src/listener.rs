//! Background read loop that captures the response to an exchange.
//!
//! The hub has no request/response correlation, so the listener watches
//! every inbound text frame and keeps the most recent one containing the
//! exchange's marker (last write wins, no queueing). The captured frame is
//! handed to the coordinator through a [`tokio::sync::watch`] channel: the
//! loop is the only writer, and the coordinator reads it after the wait
//! step, so there is no window in which both touch the slot unsynchronized.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use crate::codec::RawFrame;
use crate::connection::FrameStream;

/// How long [`ResponseListener::stop`] lets the loop drain after the
/// connection was closed before cancelling it.
pub const LISTENER_GRACE: Duration = Duration::from_millis(250);

// ── Wait policy ──────────────────────────────────────────────────────

/// How the coordinator waits for a response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WaitPolicy {
    /// Return as soon as a matching frame is captured, or when the window
    /// elapses, whichever comes first.
    #[default]
    FirstMatch,
    /// Always sit out the whole window; frames keep overwriting the slot
    /// until it ends.
    FullWindow,
}

/// Why a wait returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Matched,
    WindowElapsed,
    /// The read loop ended (socket closed or failed) before a match.
    ListenerEnded,
    Cancelled,
}

// ── ResultSlot ───────────────────────────────────────────────────────

/// Read side of the listener's single-frame result slot.
#[derive(Debug)]
pub struct ResultSlot {
    rx: watch::Receiver<Option<RawFrame>>,
}

impl ResultSlot {
    /// Wait up to `window` for the listener to capture a matching frame.
    pub async fn wait(
        &mut self,
        window: Duration,
        policy: WaitPolicy,
        cancel: &CancellationToken,
    ) -> WaitOutcome {
        let deadline = tokio::time::sleep(window);
        tokio::pin!(deadline);

        let wake_on_match = policy == WaitPolicy::FirstMatch;

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return WaitOutcome::Cancelled,
                () = &mut deadline => return WaitOutcome::WindowElapsed,
                changed = self.rx.changed(), if wake_on_match => {
                    match changed {
                        Ok(()) => {
                            if self.rx.borrow_and_update().is_some() {
                                return WaitOutcome::Matched;
                            }
                        }
                        Err(_) => return WaitOutcome::ListenerEnded,
                    }
                }
            }
        }
    }

    /// The most recent matching frame, if any.
    pub fn latest(&self) -> Option<RawFrame> {
        self.rx.borrow().clone()
    }
}

// ── ResponseListener ─────────────────────────────────────────────────

/// Handle to a running read loop. One per connection, one per exchange.
#[derive(Debug)]
pub struct ResponseListener {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

impl ResponseListener {
    /// Spawn the read loop over `stream`, capturing frames that contain
    /// `marker`. The loop also stops when `parent` is cancelled.
    pub fn start(
        stream: FrameStream,
        marker: impl Into<String>,
        parent: &CancellationToken,
    ) -> (Self, ResultSlot) {
        let (tx, rx) = watch::channel(None);
        let cancel = parent.child_token();
        let marker = marker.into();

        let task_cancel = cancel.clone();
        let handle = tokio::spawn(async move {
            read_loop(stream, &marker, &tx, &task_cancel).await;
        });

        (Self { handle, cancel }, ResultSlot { rx })
    }

    /// Let the loop finish on its own (the socket was just closed), then
    /// cancel it if it is still running after [`LISTENER_GRACE`].
    pub async fn stop(mut self) {
        if tokio::time::timeout(LISTENER_GRACE, &mut self.handle)
            .await
            .is_err()
        {
            tracing::debug!("Listener still reading after close, cancelling");
            self.cancel.cancel();
            if let Err(e) = self.handle.await {
                tracing::warn!(error = %e, "Listener task failed");
            }
        }
    }
}

/// Read frames until the socket ends, fails, or the loop is cancelled.
///
/// Read errors end the loop and are logged only; the slot is the sole
/// observable effect.
async fn read_loop(
    mut stream: FrameStream,
    marker: &str,
    slot: &watch::Sender<Option<RawFrame>>,
    cancel: &CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!("Listener cancelled");
                return;
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        let raw = RawFrame::new(text.as_str());
                        tracing::trace!(len = raw.len(), "Frame received");
                        if raw.contains(marker) {
                            tracing::debug!(marker, "Captured matching frame");
                            slot.send_replace(Some(raw));
                        }
                    }
                    Some(Ok(Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::debug!(code = %cf.code, reason = %cf.reason, "Close frame received");
                        } else {
                            tracing::debug!("Close frame received (no payload)");
                        }
                        return;
                    }
                    Some(Ok(_)) => {
                        // Binary, Ping, Pong -- not part of the exchange
                    }
                    Some(Err(e)) => {
                        tracing::warn!(error = %e, "Socket read failed, listener exiting");
                        return;
                    }
                    None => {
                        tracing::debug!("Socket stream ended");
                        return;
                    }
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use futures_util::stream;

    use super::*;
    use crate::error::Error;

    fn text(s: &str) -> Result<Message, Error> {
        Ok(Message::text(s.to_owned()))
    }

    fn scripted(frames: Vec<Result<Message, Error>>) -> FrameStream {
        Box::pin(stream::iter(frames))
    }

    fn live(frames: Vec<Result<Message, Error>>) -> FrameStream {
        Box::pin(stream::iter(frames).chain(stream::pending()))
    }

    #[tokio::test(start_paused = true)]
    async fn last_matching_frame_wins() {
        let cancel = CancellationToken::new();
        let frames = vec![
            text("first A-marker"),
            text("unrelated"),
            text("second B-marker"),
            text("third A-marker"),
        ];
        let (listener, slot) = ResponseListener::start(scripted(frames), "marker", &cancel);
        listener.stop().await;

        assert_eq!(slot.latest(), Some(RawFrame::new("third A-marker")));
    }

    #[tokio::test(start_paused = true)]
    async fn non_matching_frames_leave_slot_empty() {
        let cancel = CancellationToken::new();
        let frames = vec![text("hello"), Ok(Message::Ping(Vec::new().into())), text("bye")];
        let (listener, slot) = ResponseListener::start(scripted(frames), "marker", &cancel);
        listener.stop().await;

        assert!(slot.latest().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn read_error_ends_loop_but_keeps_slot() {
        let cancel = CancellationToken::new();
        let frames = vec![
            text("got marker"),
            Err(Error::Write("reset by peer".into())),
            text("never read marker"),
        ];
        let (listener, slot) = ResponseListener::start(scripted(frames), "marker", &cancel);
        listener.stop().await;

        assert_eq!(slot.latest(), Some(RawFrame::new("got marker")));
    }

    #[tokio::test(start_paused = true)]
    async fn close_frame_ends_loop() {
        let cancel = CancellationToken::new();
        let frames = vec![Ok(Message::Close(None)), text("after close marker")];
        let (listener, slot) = ResponseListener::start(scripted(frames), "marker", &cancel);
        listener.stop().await;

        assert!(slot.latest().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn first_match_wakes_before_window() {
        let cancel = CancellationToken::new();
        let (listener, mut slot) =
            ResponseListener::start(live(vec![text("x marker")]), "marker", &cancel);

        let started = tokio::time::Instant::now();
        let outcome = slot
            .wait(Duration::from_secs(3), WaitPolicy::FirstMatch, &cancel)
            .await;

        assert_eq!(outcome, WaitOutcome::Matched);
        assert!(started.elapsed() < Duration::from_secs(3));
        listener.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn full_window_sits_out_the_window() {
        let cancel = CancellationToken::new();
        let (listener, mut slot) =
            ResponseListener::start(live(vec![text("x marker")]), "marker", &cancel);

        let started = tokio::time::Instant::now();
        let outcome = slot
            .wait(Duration::from_secs(3), WaitPolicy::FullWindow, &cancel)
            .await;

        assert_eq!(outcome, WaitOutcome::WindowElapsed);
        assert!(started.elapsed() >= Duration::from_secs(3));
        assert_eq!(slot.latest(), Some(RawFrame::new("x marker")));
        listener.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn window_elapses_without_match() {
        let cancel = CancellationToken::new();
        let (listener, mut slot) =
            ResponseListener::start(live(vec![text("noise")]), "marker", &cancel);

        let outcome = slot
            .wait(Duration::from_millis(500), WaitPolicy::FirstMatch, &cancel)
            .await;

        assert_eq!(outcome, WaitOutcome::WindowElapsed);
        assert!(slot.latest().is_none());
        listener.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn ended_listener_stops_the_wait() {
        let cancel = CancellationToken::new();
        let (listener, mut slot) =
            ResponseListener::start(scripted(vec![text("noise")]), "marker", &cancel);

        let outcome = slot
            .wait(Duration::from_secs(3), WaitPolicy::FirstMatch, &cancel)
            .await;

        assert_eq!(outcome, WaitOutcome::ListenerEnded);
        listener.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_wait_and_loop() {
        let cancel = CancellationToken::new();
        let (listener, mut slot) = ResponseListener::start(live(Vec::new()), "marker", &cancel);

        cancel.cancel();
        let outcome = slot
            .wait(Duration::from_secs(3), WaitPolicy::FirstMatch, &cancel)
            .await;

        assert_eq!(outcome, WaitOutcome::Cancelled);
        listener.stop().await;
    }
}
