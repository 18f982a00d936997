//! Ambient sound playback driven by the timer.
//!
//! [`AudioController`] reconciles "should be playing source X" against the
//! sink and only issues the calls needed to get there.

/// Host audio capability.
pub trait AudioSink {
    fn set_source(&mut self, url: &str);
    fn set_looping(&mut self, looping: bool);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to_start(&mut self);
}

pub struct AudioController {
    sink: Box<dyn AudioSink>,
    source: Option<String>,
    playing: bool,
}

impl AudioController {
    pub fn new(mut sink: Box<dyn AudioSink>) -> Self {
        sink.set_looping(true);
        Self {
            sink,
            source: None,
            playing: false,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Play `url` while `running`, otherwise pause. An empty url is silence.
    pub fn sync(&mut self, running: bool, url: &str) {
        if running && !url.is_empty() {
            if self.source.as_deref() != Some(url) {
                self.sink.set_source(url);
                self.source = Some(url.to_string());
                self.sink.play();
                self.playing = true;
            } else if !self.playing {
                self.sink.play();
                self.playing = true;
            }
        } else if self.playing {
            self.sink.pause();
            self.playing = false;
        }
    }

    /// Rewind to the start of the current source.
    pub fn rewind(&mut self) {
        self.sink.seek_to_start();
    }
}

/// Sink for hosts without an audio device; logs what would have played.
#[derive(Debug, Default)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn set_source(&mut self, url: &str) {
        tracing::debug!(url, "audio source");
    }
    fn set_looping(&mut self, looping: bool) {
        tracing::trace!(looping, "audio looping");
    }
    fn play(&mut self) {
        tracing::debug!("audio play");
    }
    fn pause(&mut self) {
        tracing::debug!("audio pause");
    }
    fn seek_to_start(&mut self) {
        tracing::trace!("audio seek to start");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{AudioCall, RecordingAudio};
    use super::*;

    const RAIN: &str = "https://example.test/rain.mp3";
    const OCEAN: &str = "https://example.test/ocean.mp3";

    fn controller() -> (RecordingAudio, AudioController) {
        let log = RecordingAudio::new();
        let controller = AudioController::new(Box::new(log.clone()));
        assert_eq!(log.take(), vec![AudioCall::SetLooping(true)]);
        (log, controller)
    }

    #[test]
    fn plays_while_running_and_pauses_otherwise() {
        let (log, mut audio) = controller();
        audio.sync(true, RAIN);
        audio.sync(true, RAIN);
        audio.sync(false, RAIN);
        audio.sync(false, RAIN);
        assert_eq!(
            log.take(),
            vec![AudioCall::SetSource(RAIN.into()), AudioCall::Play, AudioCall::Pause]
        );
    }

    #[test]
    fn switching_source_while_running_keeps_playing() {
        let (log, mut audio) = controller();
        audio.sync(true, RAIN);
        log.take();
        audio.sync(true, OCEAN);
        assert_eq!(log.take(), vec![AudioCall::SetSource(OCEAN.into()), AudioCall::Play]);
        assert_eq!(audio.source(), Some(OCEAN));
    }

    #[test]
    fn muting_pauses() {
        let (log, mut audio) = controller();
        audio.sync(true, RAIN);
        log.take();
        audio.sync(true, "");
        assert_eq!(log.take(), vec![AudioCall::Pause]);
        assert!(!audio.is_playing());
    }
}
