//! Timer-driven session loop
//!
//! Runs [`Session::tick`] on a fixed interval on the current task until the
//! shutdown future resolves or the session hits a fatal error. Ticks never
//! overlap: a slow tick delays the next one instead of bursting to catch up.
//! The transport is closed on every exit path.

use super::{Session, SessionCounters};
use crate::error::Result;
use crate::render::RenderSink;
use crate::transport::Transport;
use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Drive a session until `shutdown` resolves or a fatal error occurs
///
/// Returns the final counters on a clean stop.
///
/// # Example
///
/// ```ignore
/// let counters = session::run(
///     &mut session,
///     &mut transport,
///     &mut sink,
///     Duration::from_millis(100),
///     async { let _ = tokio::signal::ctrl_c().await; },
/// )
/// .await?;
/// ```
pub async fn run<T, S, F>(
    session: &mut Session,
    transport: &mut T,
    sink: &mut S,
    tick_interval: Duration,
    shutdown: F,
) -> Result<SessionCounters>
where
    T: Transport + ?Sized,
    S: RenderSink + ?Sized,
    F: Future<Output = ()>,
{
    let result = drive(session, transport, sink, tick_interval, shutdown).await;
    transport.close();

    let counters = *session.counters();
    match &result {
        Ok(()) => tracing::info!(
            "Session ended: {} accepted, {} rejected, {} read errors over {} ticks",
            counters.accepted,
            counters.rejected,
            counters.read_errors,
            counters.ticks
        ),
        Err(e) => tracing::error!("Session aborted after {} ticks: {}", counters.ticks, e),
    }

    result.map(|()| counters)
}

async fn drive<T, S, F>(
    session: &mut Session,
    transport: &mut T,
    sink: &mut S,
    tick_interval: Duration,
    shutdown: F,
) -> Result<()>
where
    T: Transport + ?Sized,
    S: RenderSink + ?Sized,
    F: Future<Output = ()>,
{
    session.start(sink)?;

    let mut ticker = tokio::time::interval(tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                tracing::info!("Stop requested");
                return Ok(());
            }
            _ = ticker.tick() => {
                session.tick(transport, sink)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::FrameDecoder;
    use crate::render::RecordingSink;
    use crate::transport::{ScriptStep, ScriptedTransport};

    fn session() -> Session {
        Session::new(FrameDecoder::new(2), Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_disconnect_ends_loop_and_closes() {
        let mut s = session();
        let mut t = ScriptedTransport::new([
            ScriptStep::line("1,2"),
            ScriptStep::line("x"),
            ScriptStep::Disconnect,
        ]);
        let mut sink = RecordingSink::default();

        let result = run(
            &mut s,
            &mut t,
            &mut sink,
            Duration::from_millis(1),
            std::future::pending(),
        )
        .await;

        assert!(result.unwrap_err().is_disconnect());
        assert!(t.is_closed());
        assert_eq!(s.counters().accepted, 1);
        assert_eq!(s.counters().rejected, 1);
    }

    #[tokio::test]
    async fn test_shutdown_stops_cleanly() {
        let mut s = session();
        let mut t = ScriptedTransport::from_lines(["1,2"]);
        let mut sink = RecordingSink::default();

        let counters = run(
            &mut s,
            &mut t,
            &mut sink,
            Duration::from_millis(1),
            tokio::time::sleep(Duration::from_millis(30)),
        )
        .await
        .unwrap();

        assert!(t.is_closed());
        assert_eq!(t.close_calls(), 1);
        assert_eq!(counters.accepted, 1);
        assert!(counters.idle_ticks > 0);
        assert_eq!(sink.waiting_calls, 1);
        assert_eq!(sink.frames.len(), 1);
    }

    #[tokio::test]
    async fn test_immediate_shutdown_still_closes() {
        let mut s = session();
        let mut t = ScriptedTransport::from_lines(["1,2"]);
        let mut sink = RecordingSink::default();

        let counters = run(
            &mut s,
            &mut t,
            &mut sink,
            Duration::from_millis(1),
            std::future::ready(()),
        )
        .await
        .unwrap();

        assert_eq!(counters.ticks, 0);
        assert!(t.is_closed());
    }

    #[tokio::test]
    async fn test_render_failure_closes_transport() {
        let mut s = session();
        let mut t = ScriptedTransport::from_lines(["1,2"]);
        let mut sink = RecordingSink::failing();

        let result = run(
            &mut s,
            &mut t,
            &mut sink,
            Duration::from_millis(1),
            std::future::pending(),
        )
        .await;

        assert!(result.is_err());
        assert!(t.is_closed());
    }
}
