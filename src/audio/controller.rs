//! Ambient audio controller.
//!
//! Owns one [`AudioSink`] and tracks the selected track, play/pause intent,
//! volume and the last error. No operation panics or returns a failure the
//! caller must handle to stay consistent: every failure is also recorded in
//! [`AudioState::last_error`] and leaves playback stopped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use super::tracks;

/// Playback backend. Implementations wrap whatever actually makes sound.
pub trait AudioSink: Send + 'static {
    fn load(&mut self, asset: &str) -> anyhow::Result<()>;
    fn play(&mut self) -> anyhow::Result<()>;
    fn pause(&mut self) -> anyhow::Result<()>;
    /// Stop and release the current source. Must not fail.
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("unknown track: {0}")]
    UnknownTrack(String),

    #[error("no track selected")]
    NoTrackSelected,

    #[error("failed to load {track}: {reason}")]
    Load { track: String, reason: String },

    #[error("playback failed: {0}")]
    Playback(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioState {
    pub selected: Option<String>,
    pub playing: bool,
    /// A resume is waiting out the settle delay. Counts as play intent for
    /// the next selection, so rapid re-selection keeps the music going.
    pub resume_pending: bool,
    pub volume: f32,
    pub last_error: Option<AudioError>,
}

pub struct AudioController<S: AudioSink> {
    sink: Mutex<S>,
    state: Mutex<AudioState>,
    /// Bumped by every selection and toggle; a pending resume only proceeds
    /// if nothing newer happened during its settle delay.
    generation: AtomicU64,
    settle: Duration,
}

fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

impl<S: AudioSink> AudioController<S> {
    pub fn new(sink: S, volume: f32, settle: Duration) -> Self {
        Self {
            sink: Mutex::new(sink),
            state: Mutex::new(AudioState {
                selected: None,
                playing: false,
                resume_pending: false,
                volume: clamp_volume(volume),
                last_error: None,
            }),
            generation: AtomicU64::new(0),
            settle,
        }
    }

    // Lock order is always state, then sink.
    fn state(&self) -> MutexGuard<'_, AudioState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sink(&self) -> MutexGuard<'_, S> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> AudioState {
        self.state().clone()
    }

    /// Run `f` on the sink; read it back for inspection in tests and tools.
    pub fn with_sink<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        f(&self.sink())
    }

    fn fail(&self, state: &mut AudioState, sink: &mut S, err: AudioError) -> AudioError {
        warn!("audio: {}", err);
        sink.stop();
        state.playing = false;
        state.resume_pending = false;
        state.last_error = Some(err.clone());
        err
    }

    /// Switch to track `id`. Playback resumes after the settle delay when it
    /// was playing (or about to resume) before the switch or when `autoplay`
    /// is set. A selection or toggle arriving during the delay takes over the
    /// pending resume.
    pub async fn select_track(&self, id: &str, autoplay: bool) -> Result<(), AudioError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let resume = {
            let mut state = self.state();
            let mut sink = self.sink();
            let resume = state.playing || state.resume_pending || autoplay;

            let Some(track) = tracks::track(id) else {
                return Err(self.fail(&mut state, &mut sink, AudioError::UnknownTrack(id.to_string())));
            };

            sink.stop();
            state.playing = false;
            state.selected = Some(track.id.to_string());

            if let Err(e) = sink.load(track.asset) {
                let err = AudioError::Load {
                    track: track.id.to_string(),
                    reason: e.to_string(),
                };
                return Err(self.fail(&mut state, &mut sink, err));
            }
            if let Err(e) = sink.set_volume(state.volume) {
                let err = AudioError::Load {
                    track: track.id.to_string(),
                    reason: e.to_string(),
                };
                return Err(self.fail(&mut state, &mut sink, err));
            }
            state.last_error = None;
            state.resume_pending = resume;
            debug!("audio: loaded {} (resume={})", track.id, resume);
            resume
        };

        if !resume {
            return Ok(());
        }

        if !self.settle.is_zero() {
            tokio::time::sleep(self.settle).await;
        }
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!("audio: resume of {} superseded", id);
            return Ok(());
        }

        let mut state = self.state();
        let mut sink = self.sink();
        state.resume_pending = false;
        match sink.play() {
            Ok(()) => {
                state.playing = true;
                state.last_error = None;
                info!("audio: playing {}", id);
                Ok(())
            }
            Err(e) => Err(self.fail(&mut state, &mut sink, AudioError::Playback(e.to_string()))),
        }
    }

    /// Play if stopped, pause if playing. A pending resume counts as
    /// playing: toggling cancels it. Returns the new playing flag.
    pub fn toggle_playback(&self) -> Result<bool, AudioError> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        let mut sink = self.sink();

        if state.selected.is_none() {
            return Err(self.fail(&mut state, &mut sink, AudioError::NoTrackSelected));
        }
        if state.resume_pending {
            state.resume_pending = false;
            debug!("audio: pending resume cancelled by toggle");
            return Ok(false);
        }

        let result = if state.playing { sink.pause() } else { sink.play() };
        match result {
            Ok(()) => {
                state.playing = !state.playing;
                state.last_error = None;
                Ok(state.playing)
            }
            Err(e) => Err(self.fail(&mut state, &mut sink, AudioError::Playback(e.to_string()))),
        }
    }

    /// Pause if playing and drop any pending resume. No-op otherwise.
    pub fn pause(&self) -> Result<(), AudioError> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state();
        let mut sink = self.sink();
        state.resume_pending = false;
        if !state.playing {
            return Ok(());
        }
        match sink.pause() {
            Ok(()) => {
                state.playing = false;
                Ok(())
            }
            Err(e) => Err(self.fail(&mut state, &mut sink, AudioError::Playback(e.to_string()))),
        }
    }

    /// Clamp to `0.0..=1.0`, apply to the sink and remember it for later
    /// tracks. Returns the applied volume.
    pub fn set_volume(&self, volume: f32) -> f32 {
        let volume = clamp_volume(volume);
        let mut state = self.state();
        state.volume = volume;
        if let Err(e) = self.sink().set_volume(volume) {
            warn!("audio: set_volume failed: {}", e);
            state.last_error = Some(AudioError::Playback(e.to_string()));
        }
        volume
    }
}

/// Sink that only logs; used by the headless binary.
#[derive(Debug, Default)]
pub struct LoggingSink {
    pub loaded: Option<String>,
}

impl AudioSink for LoggingSink {
    fn load(&mut self, asset: &str) -> anyhow::Result<()> {
        info!("[audio] load {}", asset);
        self.loaded = Some(asset.to_string());
        Ok(())
    }

    fn play(&mut self) -> anyhow::Result<()> {
        match &self.loaded {
            Some(asset) => {
                info!("[audio] play {}", asset);
                Ok(())
            }
            None => Err(anyhow::anyhow!("nothing loaded")),
        }
    }

    fn pause(&mut self) -> anyhow::Result<()> {
        info!("[audio] pause");
        Ok(())
    }

    fn stop(&mut self) {
        if self.loaded.take().is_some() {
            info!("[audio] stop");
        }
    }

    fn set_volume(&mut self, volume: f32) -> anyhow::Result<()> {
        info!("[audio] volume {:.2}", volume);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_and_handles_nan() {
        assert_eq!(clamp_volume(1.7), 1.0);
        assert_eq!(clamp_volume(-0.2), 0.0);
        assert_eq!(clamp_volume(f32::NAN), 0.0);
        assert_eq!(clamp_volume(0.25), 0.25);
    }

    #[test]
    fn logging_sink_refuses_play_without_source() {
        let mut sink = LoggingSink::default();
        assert!(sink.play().is_err());
        sink.load("a.mp3").unwrap();
        assert!(sink.play().is_ok());
    }
}
