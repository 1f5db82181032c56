//! Integration tests for the session lifecycle
//!
//! These tests validate the session state machine over scripted transports:
//! - Startup with no frames shows the waiting state
//! - Good lines replace the held frame, bad lines leave it untouched
//! - Statistics follow the held frame
//! - Fatal transport errors end the session

mod common;

use common::assert_float_eq;
use common::builders::LineBuilder;
use common::mock_helpers::{firmware_stream, test_session};
use linescan_viewer::render::RecordingSink;
use linescan_viewer::session::{RenderPolicy, TickOutcome};
use linescan_viewer::transport::{ScriptStep, ScriptedTransport};
use linescan_viewer::{Frame, Rejection, SessionState};

#[test]
fn test_start_without_frames_is_awaiting() {
    let mut session = test_session(128);
    let mut sink = RecordingSink::default();
    session.start(&mut sink).unwrap();

    assert_eq!(session.state(), &SessionState::AwaitingFirstFrame);
    assert!(session.state().frame().is_none());
    assert!(session.state().stats().is_none());
    assert_eq!(sink.waiting_calls, 1);
    assert!(sink.frames.is_empty());
}

#[test]
fn test_reference_frame_statistics() {
    let mut session = test_session(4);
    let mut transport = ScriptedTransport::from_lines(["0,255,128,128"]);
    let mut sink = RecordingSink::default();

    session.tick(&mut transport, &mut sink).unwrap();

    let stats = session.state().stats().copied().unwrap();
    assert_eq!(stats.min, 0);
    assert_eq!(stats.max, 255);
    assert_float_eq(stats.mean, 127.75, 1e-9);
    assert_float_eq(stats.stddev, 90.1565, 1e-3);
    assert_eq!(sink.frames[0].1, stats);
}

#[test]
fn test_rejection_runs_keep_frame() {
    let mut session = test_session(3);
    let mut steps = vec![ScriptStep::line("10,20,30")];
    for i in 0..500 {
        steps.push(match i % 5 {
            0 => ScriptStep::line("Sharpness,10,20,30"),
            1 => ScriptStep::line("1,2"),
            2 => ScriptStep::line("a,b,c,d"),
            3 => ScriptStep::Partial(b"40,50".to_vec()),
            _ => ScriptStep::Line(vec![0xc3, 0x28, 0x2c, 0x31]),
        });
    }
    let mut transport = ScriptedTransport::new(steps);
    let mut sink = RecordingSink::default();

    assert_eq!(session.tick(&mut transport, &mut sink).unwrap(), TickOutcome::Accepted);
    let held = session.state().clone();

    for _ in 0..500 {
        let outcome = session.tick(&mut transport, &mut sink).unwrap();
        assert!(matches!(outcome, TickOutcome::Rejected(_)));
        assert_eq!(session.state(), &held);
    }

    assert_eq!(session.state().frame(), Some(&Frame::new(vec![10, 20, 30])));
    assert_eq!(session.counters().accepted, 1);
    assert_eq!(session.counters().rejected, 500);
    // Default policy renders only on new frames
    assert_eq!(sink.frames.len(), 1);
}

#[test]
fn test_rejections_before_first_frame_stay_awaiting() {
    let mut session = test_session(4);
    let mut transport = ScriptedTransport::from_lines(["Sharpness,9", "1,2", ""]);
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        session.tick(&mut transport, &mut sink).unwrap();
    }
    assert_eq!(session.state(), &SessionState::AwaitingFirstFrame);
    assert_eq!(session.counters().rejected, 3);
}

#[test]
fn test_firmware_stream() {
    let mut session = test_session(128);
    let mut transport = firmware_stream(128, 5);
    let mut sink = RecordingSink::default();

    let mut outcomes = Vec::new();
    while transport.remaining() > 0 {
        outcomes.push(session.tick(&mut transport, &mut sink).unwrap());
    }

    assert_eq!(outcomes[0], TickOutcome::Rejected(Rejection::Marker));
    assert_eq!(
        outcomes[1],
        TickOutcome::Rejected(Rejection::InsufficientSamples {
            found: 64,
            expected: 128
        })
    );
    assert!(outcomes[2..].iter().all(|o| *o == TickOutcome::Accepted));

    let frame = session.state().frame().unwrap();
    assert_eq!(frame.len(), 128);
    assert_eq!(frame.samples()[0], 4);
    assert_eq!(sink.frames.len(), 5);
}

#[test]
fn test_every_tick_policy_rerenders_held_frame() {
    let mut session = test_session(2).with_render_policy(RenderPolicy::EveryTick);
    let mut transport = ScriptedTransport::new([
        ScriptStep::line("1,2"),
        ScriptStep::line("bad"),
        ScriptStep::Idle,
    ]);
    let mut sink = RecordingSink::default();

    for _ in 0..3 {
        session.tick(&mut transport, &mut sink).unwrap();
    }
    assert_eq!(sink.frames.len(), 3);
    assert!(sink.frames.iter().all(|(f, _)| f.samples() == [1, 2]));
}

#[test]
fn test_line_with_only_whitespace_is_rejected() {
    let mut session = test_session(1);
    let mut transport = ScriptedTransport::from_lines(["   \r\n"]);
    let mut sink = RecordingSink::default();

    let outcome = session.tick(&mut transport, &mut sink).unwrap();
    assert_eq!(
        outcome,
        TickOutcome::Rejected(Rejection::InsufficientSamples {
            found: 0,
            expected: 1
        })
    );
}

#[test]
fn test_disconnect_is_fatal() {
    let mut session = test_session(2);
    let mut transport = ScriptedTransport::new([ScriptStep::line("1,2"), ScriptStep::Disconnect]);
    let mut sink = RecordingSink::default();

    session.tick(&mut transport, &mut sink).unwrap();
    let err = session.tick(&mut transport, &mut sink).unwrap_err();
    assert!(err.is_disconnect());
    // The last good frame is still observable after the failure
    assert_eq!(session.state().frame().unwrap().samples(), &[1, 2]);
}

#[test]
fn test_transient_errors_skip_ticks() {
    let mut session = test_session(2).with_max_consecutive_errors(3);
    let mut transport = ScriptedTransport::new([
        ScriptStep::ReadError("framing error".into()),
        ScriptStep::ReadError("framing error".into()),
        ScriptStep::line("3,4"),
        ScriptStep::ReadError("framing error".into()),
        ScriptStep::ReadError("framing error".into()),
        ScriptStep::ReadError("framing error".into()),
    ]);
    let mut sink = RecordingSink::default();

    assert_eq!(session.tick(&mut transport, &mut sink).unwrap(), TickOutcome::ReadError);
    assert_eq!(session.tick(&mut transport, &mut sink).unwrap(), TickOutcome::ReadError);
    assert_eq!(session.tick(&mut transport, &mut sink).unwrap(), TickOutcome::Accepted);
    assert_eq!(session.tick(&mut transport, &mut sink).unwrap(), TickOutcome::ReadError);
    assert_eq!(session.tick(&mut transport, &mut sink).unwrap(), TickOutcome::ReadError);
    assert!(session.tick(&mut transport, &mut sink).unwrap_err().is_disconnect());
    assert_eq!(session.counters().read_errors, 5);
}

#[test]
fn test_builder_lines_feed_session() {
    let mut session = test_session(16);
    let line = LineBuilder::ramp(16, 17).trailing("cs").crlf();
    let mut transport = ScriptedTransport::from_lines([line.build()]);
    let mut sink = RecordingSink::default();

    session.tick(&mut transport, &mut sink).unwrap();
    let stats = session.state().stats().unwrap();
    assert_eq!(stats.min, 0);
    assert_eq!(stats.max, 255);
    assert_eq!(stats.range(), 255);
}
