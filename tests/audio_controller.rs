/// Audio controller tests with a recording sink that can be told to fail.
use std::time::Duration;

use anyhow::{anyhow, Result};
use lettuce_garden::audio::{AudioController, AudioError, AudioSink};

#[derive(Debug, Default)]
struct RecordingSink {
    events: Vec<String>,
    fail_load: Option<String>,
    fail_play: bool,
    loaded: Option<String>,
    volume: f32,
}

impl AudioSink for RecordingSink {
    fn load(&mut self, asset: &str) -> Result<()> {
        self.events.push(format!("load {asset}"));
        if self.fail_load.as_deref().is_some_and(|bad| asset.contains(bad)) {
            return Err(anyhow!("decoder error"));
        }
        self.loaded = Some(asset.to_string());
        Ok(())
    }

    fn play(&mut self) -> Result<()> {
        self.events.push("play".to_string());
        if self.fail_play {
            return Err(anyhow!("autoplay blocked"));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.events.push("pause".to_string());
        Ok(())
    }

    fn stop(&mut self) {
        self.events.push("stop".to_string());
        self.loaded = None;
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.events.push(format!("volume {volume:.2}"));
        self.volume = volume;
        Ok(())
    }
}

fn controller(sink: RecordingSink) -> AudioController<RecordingSink> {
    AudioController::new(sink, 0.5, Duration::from_millis(300))
}

#[tokio::test(start_paused = true)]
async fn test_select_without_autoplay_stays_paused() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", false).await.unwrap();

    let state = audio.snapshot();
    assert_eq!(state.selected.as_deref(), Some("sunny-meadow"));
    assert!(!state.playing);
    assert_eq!(state.last_error, None);
    audio.with_sink(|s| {
        assert_eq!(s.loaded.as_deref(), Some("assets/audio/bright/sunny-meadow.mp3"));
        assert!(!s.events.contains(&"play".to_string()));
    });
}

#[tokio::test(start_paused = true)]
async fn test_switch_while_playing_resumes_after_settle() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", true).await.unwrap();
    assert!(audio.snapshot().playing);

    let started = tokio::time::Instant::now();
    audio.select_track("quiet-soil", false).await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(300));

    let state = audio.snapshot();
    assert_eq!(state.selected.as_deref(), Some("quiet-soil"));
    assert!(state.playing);
    audio.with_sink(|s| {
        let tail: Vec<&str> = s.events.iter().rev().take(4).rev().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "stop",
                "load assets/audio/muted/quiet-soil.mp3",
                "volume 0.50",
                "play"
            ]
        );
    });
}

#[tokio::test(start_paused = true)]
async fn test_switch_while_paused_stays_paused() {
    let audio = controller(RecordingSink::default());
    audio.select_track("morning-dew", true).await.unwrap();
    assert_eq!(audio.toggle_playback(), Ok(false));

    audio.select_track("moonlit-rows", false).await.unwrap();
    assert!(!audio.snapshot().playing);
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_records_error_and_stops() {
    let sink = RecordingSink {
        fail_load: Some("bumblebee".to_string()),
        ..Default::default()
    };
    let audio = controller(sink);
    audio.select_track("sunny-meadow", true).await.unwrap();

    let err = audio.select_track("bumblebee-waltz", false).await.unwrap_err();
    assert!(matches!(err, AudioError::Load { ref track, .. } if track == "bumblebee-waltz"));

    let state = audio.snapshot();
    assert!(!state.playing);
    assert_eq!(state.last_error, Some(err));

    // A good track afterwards clears the error
    audio.select_track("rainy-greenhouse", true).await.unwrap();
    let state = audio.snapshot();
    assert!(state.playing);
    assert_eq!(state.last_error, None);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_track_stops_playback() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", true).await.unwrap();

    let err = audio.select_track("polka-of-doom", false).await.unwrap_err();
    assert_eq!(err, AudioError::UnknownTrack("polka-of-doom".to_string()));
    let state = audio.snapshot();
    assert!(!state.playing);
    assert_eq!(state.last_error, Some(err));
}

#[tokio::test(start_paused = true)]
async fn test_play_rejection_is_reported() {
    let sink = RecordingSink {
        fail_play: true,
        ..Default::default()
    };
    let audio = controller(sink);

    let err = audio.select_track("sunny-meadow", true).await.unwrap_err();
    assert!(matches!(err, AudioError::Playback(_)));
    assert!(!audio.snapshot().playing);
    assert!(matches!(audio.toggle_playback(), Err(AudioError::Playback(_))));
}

#[test]
fn test_toggle_without_selection_fails() {
    let audio = controller(RecordingSink::default());
    assert_eq!(audio.toggle_playback(), Err(AudioError::NoTrackSelected));
    assert_eq!(audio.snapshot().last_error, Some(AudioError::NoTrackSelected));
}

#[tokio::test(start_paused = true)]
async fn test_toggle_flips_playing() {
    let audio = controller(RecordingSink::default());
    audio.select_track("morning-dew", false).await.unwrap();

    assert_eq!(audio.toggle_playback(), Ok(true));
    assert_eq!(audio.toggle_playback(), Ok(false));
    assert_eq!(audio.toggle_playback(), Ok(true));
    assert!(audio.snapshot().playing);
}

#[tokio::test(start_paused = true)]
async fn test_volume_is_clamped_and_kept_across_tracks() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", false).await.unwrap();

    assert_eq!(audio.set_volume(1.8), 1.0);
    assert_eq!(audio.set_volume(-3.0), 0.0);
    assert_eq!(audio.set_volume(0.3), 0.3);

    audio.select_track("quiet-soil", false).await.unwrap();
    assert_eq!(audio.snapshot().volume, 0.3);
    audio.with_sink(|s| assert_eq!(s.volume, 0.3));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_switches_play_only_latest() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", true).await.unwrap();

    let first = audio.select_track("morning-dew", false);
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        audio.select_track("moonlit-rows", true).await
    };
    let (a, b) = tokio::join!(first, second);
    a.unwrap();
    b.unwrap();

    let state = audio.snapshot();
    assert_eq!(state.selected.as_deref(), Some("moonlit-rows"));
    assert!(state.playing);
    audio.with_sink(|s| {
        assert_eq!(s.loaded.as_deref(), Some("assets/audio/muted/moonlit-rows.mp3"));
        let plays_after_last_load = s
            .events
            .iter()
            .rev()
            .take_while(|e| !e.starts_with("load"))
            .filter(|e| *e == "play")
            .count();
        assert_eq!(plays_after_last_load, 1);
    });
    // The superseded resume never fired: two plays total (initial + latest)
    audio.with_sink(|s| assert_eq!(s.events.iter().filter(|e| *e == "play").count(), 2));
}

#[tokio::test(start_paused = true)]
async fn test_rapid_switches_keep_play_intent() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", true).await.unwrap();

    let first = audio.select_track("morning-dew", false);
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        // Mid-settle: nothing is audible, but a resume is pending
        assert!(audio.snapshot().resume_pending);
        audio.select_track("moonlit-rows", false).await
    };
    let (a, b) = tokio::join!(first, second);
    a.unwrap();
    b.unwrap();

    let state = audio.snapshot();
    assert_eq!(state.selected.as_deref(), Some("moonlit-rows"));
    assert!(state.playing);
    assert!(!state.resume_pending);
    audio.with_sink(|s| assert_eq!(s.events.iter().filter(|e| *e == "play").count(), 2));
}

#[tokio::test(start_paused = true)]
async fn test_toggle_during_settle_cancels_resume() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", true).await.unwrap();

    let switch = audio.select_track("quiet-soil", false);
    let pause = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        audio.toggle_playback()
    };
    let (switched, toggled) = tokio::join!(switch, pause);
    switched.unwrap();
    // The pending resume counted as playing, so the toggle paused
    assert_eq!(toggled, Ok(false));

    let state = audio.snapshot();
    assert!(!state.playing);
    assert!(!state.resume_pending);
    audio.with_sink(|s| assert_eq!(s.events.iter().filter(|e| *e == "play").count(), 1));

    // Next switch after the cancelled resume stays paused
    audio.select_track("moonlit-rows", false).await.unwrap();
    assert!(!audio.snapshot().playing);
}

#[tokio::test(start_paused = true)]
async fn test_pause_only_acts_when_playing() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", false).await.unwrap();

    audio.pause().unwrap();
    let state = audio.snapshot();
    assert!(!state.playing);
    audio.with_sink(|s| {
        assert!(!s.events.iter().any(|e| e == "play" || e == "pause"));
    });

    assert_eq!(audio.toggle_playback(), Ok(true));
    audio.pause().unwrap();
    assert!(!audio.snapshot().playing);
    audio.with_sink(|s| assert_eq!(s.events.last().map(String::as_str), Some("pause")));
}

#[tokio::test(start_paused = true)]
async fn test_pause_during_settle_drops_resume() {
    let audio = controller(RecordingSink::default());
    audio.select_track("sunny-meadow", true).await.unwrap();

    let switch = audio.select_track("quiet-soil", false);
    let pause = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        audio.pause()
    };
    let (switched, paused) = tokio::join!(switch, pause);
    switched.unwrap();
    paused.unwrap();

    let state = audio.snapshot();
    assert!(!state.playing);
    assert!(!state.resume_pending);
}
