//! The DJ deck unlocked by the Thai persona.
//!
//! A small transport state machine over track metadata: play, pause, skip,
//! and a position that advances with frame time. Audio output belongs to the
//! host; the deck only decides what should be playing and where.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DeckError;

/// `previous` restarts the current track instead of skipping back once
/// playback has passed this point.
const RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// One entry of the playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub artist: String,
    /// Length in seconds.
    pub seconds: u64,
}

impl Track {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, seconds: u64) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            seconds,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs(self.seconds)
    }

    /// Tracks shipped with the site.
    pub fn default_playlist() -> Vec<Track> {
        vec![
            Track::new("Night Market Groove", "Studio House", 214),
            Track::new("Chao Phraya Drift", "Studio House", 187),
            Track::new("Server Room Sunrise", "Studio House", 242),
        ]
    }
}

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Playlist and transport.
#[derive(Debug, Clone)]
pub struct Deck {
    tracks: Vec<Track>,
    current: usize,
    playback: Playback,
    position: Duration,
    unlocked: bool,
}

impl Deck {
    /// Build a locked deck. Playlists must not be empty.
    pub fn new(tracks: Vec<Track>) -> Result<Self, DeckError> {
        if tracks.is_empty() {
            return Err(DeckError::EmptyPlaylist);
        }
        Ok(Self {
            tracks,
            current: 0,
            playback: Playback::Stopped,
            position: Duration::ZERO,
            unlocked: false,
        })
    }

    /// Lock or unlock the deck. Locking stops playback.
    pub fn set_unlocked(&mut self, unlocked: bool) {
        self.unlocked = unlocked;
        if !unlocked {
            self.playback = Playback::Stopped;
            self.position = Duration::ZERO;
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_track(&self) -> &Track {
        &self.tracks[self.current]
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    /// Fraction of the current track played, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        let total = self.current_track().duration();
        if total.is_zero() {
            return 0.0;
        }
        (self.position.as_secs_f32() / total.as_secs_f32()).min(1.0)
    }

    fn ensure_unlocked(&self) -> Result<(), DeckError> {
        if self.unlocked {
            Ok(())
        } else {
            Err(DeckError::Locked)
        }
    }

    pub fn play(&mut self) -> Result<(), DeckError> {
        self.ensure_unlocked()?;
        self.playback = Playback::Playing;
        debug!(track = %self.current_track().title, "deck playing");
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), DeckError> {
        self.ensure_unlocked()?;
        if self.playback == Playback::Playing {
            self.playback = Playback::Paused;
        }
        Ok(())
    }

    /// Play if not playing, pause otherwise.
    pub fn toggle(&mut self) -> Result<(), DeckError> {
        match self.playback {
            Playback::Playing => self.pause(),
            Playback::Paused | Playback::Stopped => self.play(),
        }
    }

    pub fn stop(&mut self) -> Result<(), DeckError> {
        self.ensure_unlocked()?;
        self.playback = Playback::Stopped;
        self.position = Duration::ZERO;
        Ok(())
    }

    /// Skip to the next track, wrapping to the first.
    pub fn next(&mut self) -> Result<(), DeckError> {
        self.ensure_unlocked()?;
        self.select((self.current + 1) % self.tracks.len());
        Ok(())
    }

    /// Restart the track, or skip to the previous one near its start.
    pub fn previous(&mut self) -> Result<(), DeckError> {
        self.ensure_unlocked()?;
        if self.position > RESTART_THRESHOLD {
            self.position = Duration::ZERO;
        } else {
            let len = self.tracks.len();
            self.select((self.current + len - 1) % len);
        }
        Ok(())
    }

    /// Advance the playhead. Finished tracks roll over into the next one.
    pub fn tick(&mut self, elapsed: Duration) {
        if !self.unlocked || self.playback != Playback::Playing {
            return;
        }
        let mut remaining = elapsed;
        loop {
            let left = self.current_track().duration().saturating_sub(self.position);
            if remaining < left {
                self.position += remaining;
                return;
            }
            remaining -= left;
            self.select((self.current + 1) % self.tracks.len());
            if self.tracks.iter().all(|t| t.seconds == 0) {
                return;
            }
        }
    }

    fn select(&mut self, index: usize) {
        self.current = index;
        self.position = Duration::ZERO;
        debug!(index, track = %self.current_track().title, "deck track selected");
    }
}
