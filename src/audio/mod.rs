//! Ambient background audio: a fixed track catalog and a controller that
//! switches tracks while keeping play/pause intent and volume.

pub mod controller;
pub mod tracks;

pub use controller::{AudioController, AudioError, AudioSink, AudioState, LoggingSink};
pub use tracks::{collection, track, Track, TrackCollection, TRACKS};
