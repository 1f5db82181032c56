//! Transport and session construction helpers

use super::builders::LineBuilder;
use super::test_timeout;
use linescan_viewer::decoder::FrameDecoder;
use linescan_viewer::session::Session;
use linescan_viewer::transport::{ScriptStep, ScriptedTransport};

/// Session decoding `pixels` samples with the default marker filter
pub fn test_session(pixels: usize) -> Session {
    Session::new(FrameDecoder::new(pixels), test_timeout())
}

/// A stream shaped like real firmware output: a marker line, a truncated
/// frame, then `frames` good frames of `pixels` samples, each with a
/// trailing checksum token
pub fn firmware_stream(pixels: usize, frames: usize) -> ScriptedTransport {
    let mut steps = vec![
        ScriptStep::line("Sharpness,1234"),
        ScriptStep::line(LineBuilder::ramp(pixels / 2, 1).build()),
    ];
    for n in 0..frames {
        let line = LineBuilder::new((0..pixels as u32).map(|i| (i + n as u32) % 256))
            .trailing("42")
            .crlf();
        steps.push(ScriptStep::line(line.build()));
    }
    let mut transport = ScriptedTransport::new(steps);
    transport.set_name("firmware");
    transport
}
