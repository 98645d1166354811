//! `rodio`-backed audio output for preview clips.
//!
//! The output stream is opened lazily on the first clip, so a machine with no
//! audio device only fails when something is actually played.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tracing::debug;

use super::types::{AudioHandle, AudioOutput, PlaybackError};

/// Last error reported by the output stream callback.
type Fault = Arc<Mutex<Option<String>>>;

pub struct RodioOutput {
    stream: Option<OutputStream>,
    volume: f32,
    fault: Fault,
}

impl RodioOutput {
    pub fn new(volume: f32) -> Self {
        Self {
            stream: None,
            volume: volume.clamp(0.0, 1.0),
            fault: Arc::new(Mutex::new(None)),
        }
    }

    /// Wrap `sink` for a new session. Faults reported before this point
    /// belong to earlier sessions and are discarded.
    fn session_handle(&self, sink: Sink) -> RodioHandle {
        if let Ok(mut slot) = self.fault.lock() {
            if let Some(old) = slot.take() {
                debug!("discarding output error from an earlier session: {old}");
            }
        }
        RodioHandle {
            sink,
            fault: Arc::clone(&self.fault),
        }
    }
}

impl AudioOutput for RodioOutput {
    fn open(&mut self, clip: Vec<u8>) -> Result<Box<dyn AudioHandle>, PlaybackError> {
        if self.stream.is_none() {
            let fault = Arc::clone(&self.fault);
            let mut stream = OutputStreamBuilder::from_default_device()
                .map_err(|e| PlaybackError::Blocked(e.to_string()))?
                .with_error_callback(move |e| {
                    if let Ok(mut slot) = fault.lock() {
                        *slot = Some(e.to_string());
                    }
                })
                .open_stream_or_fallback()
                .map_err(|e| PlaybackError::Blocked(e.to_string()))?;
            // rodio logs to stderr when the stream is dropped, which would
            // land on top of the TUI.
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| PlaybackError::Blocked("no audio output".to_string()))?;

        let source =
            Decoder::new(Cursor::new(clip)).map_err(|e| PlaybackError::Decode(e.to_string()))?;

        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(self.volume);
        sink.append(source);
        sink.pause();
        Ok(Box::new(self.session_handle(sink)))
    }
}

struct RodioHandle {
    sink: Sink,
    fault: Fault,
}

impl AudioHandle for RodioHandle {
    fn play(&mut self) -> Result<(), PlaybackError> {
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn is_finished(&self) -> bool {
        self.sink.empty()
    }

    fn take_error(&mut self) -> Option<PlaybackError> {
        self.fault
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .map(PlaybackError::Blocked)
    }

    fn release(self: Box<Self>) {
        self.sink.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(output: &RodioOutput, message: &str) {
        *output.fault.lock().unwrap() = Some(message.to_string());
    }

    #[test]
    fn new_session_does_not_inherit_earlier_fault() {
        let output = RodioOutput::new(1.0);

        let (sink, _queue) = Sink::new();
        let mut first = output.session_handle(sink);
        report(&output, "device lost");
        assert!(first.take_error().is_some());

        report(&output, "late error for the first session");
        Box::new(first).release();

        let (sink, _queue) = Sink::new();
        let mut second = output.session_handle(sink);
        assert_eq!(second.take_error(), None);

        report(&output, "device lost again");
        assert_eq!(
            second.take_error(),
            Some(PlaybackError::Blocked("device lost again".to_string()))
        );
        assert_eq!(second.take_error(), None);
    }
}
