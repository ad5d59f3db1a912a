use crate::analysis::SongAnalyzer;
use crate::clock::{MediaTransport, PlaybackClock};
use crate::error::AnalysisError;
use crate::exporter::{self, MidiExport};
use crate::model::settings::TransformSettings;
use crate::model::song::Song;
use crate::resolver;
use anyhow::bail;
use log::{debug, info, warn};
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// One play-along session: the single active song, the clock that drives it,
/// and the read-time transform settings.
///
/// Transport and export operations issued with no song loaded are silent
/// no-ops. A load replaces the song wholesale; the load token makes sure a
/// superseded analysis can neither install its song nor report stale progress.
#[derive(Debug)]
pub struct Session<M: MediaTransport + 'static> {
    clock: PlaybackClock<M>,
    song: Mutex<Option<Song>>,
    settings: Mutex<TransformSettings>,
    playback_enabled: AtomicBool,
    load_token: AtomicU64,
    progress: Mutex<Option<u8>>,
}

impl<M: MediaTransport + 'static> Session<M> {
    pub fn new(media: M) -> Self {
        Self {
            clock: PlaybackClock::new(media),
            song: Mutex::new(None),
            settings: Mutex::new(TransformSettings::default()),
            playback_enabled: AtomicBool::new(true),
            load_token: AtomicU64::new(0),
            progress: Mutex::new(None),
        }
    }

    /// Runs the analyzer over `bytes` and installs the produced song.
    ///
    /// On failure nothing changes: no partial song, no running clock, and the
    /// progress indicator is cleared. A load that is overtaken by a newer one
    /// drops its result and reports [`AnalysisError::Superseded`].
    pub fn load_song<A: SongAnalyzer>(
        &self,
        analyzer: &A,
        bytes: &[u8],
    ) -> Result<(), AnalysisError> {
        let token = self.load_token.fetch_add(1, Ordering::SeqCst) + 1;

        let result = analyzer.analyze(bytes, &mut |pct| {
            if self.load_token.load(Ordering::SeqCst) != token {
                debug!("Dropping stale progress update ({}%)..!", pct);
                return;
            }

            if let Ok(mut progress) = self.progress.lock() {
                *progress = Some(pct);
            }
        });

        if let Ok(mut progress) = self.progress.lock() {
            *progress = None;
        }

        let song = result?;

        if self.load_token.load(Ordering::SeqCst) != token {
            debug!("A newer load superseded '{}', dropping it..!", song.name);
            return Err(AnalysisError::Superseded);
        }

        if let Err(why) = self.clock.stop() {
            warn!("Failed to stop the clock for the new song: {:?}", why);
        }
        if let Err(why) = self.clock.seek(0.0) {
            warn!("Failed to rewind the clock for the new song: {:?}", why);
        }

        info!(
            "Loaded song: '{}' with {} notes..!",
            song.name,
            song.notes.len()
        );

        match self.song.lock() {
            Ok(mut slot) => *slot = Some(song),
            Err(_) => warn!("Failed to lock the song slot, dropping '{}'..!", song.name),
        }

        Ok(())
    }

    /// Analysis progress of an in-flight load, if any.
    pub fn progress(&self) -> Option<u8> {
        self.progress.lock().map(|p| *p).unwrap_or(None)
    }

    pub fn has_song(&self) -> bool {
        self.song.lock().map(|slot| slot.is_some()).unwrap_or(false)
    }

    pub fn song_name(&self) -> Option<String> {
        self.song
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|song| song.name.clone()))
    }

    pub fn duration_ms(&self) -> Option<u64> {
        self.song
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|song| song.duration_ms))
    }

    pub fn cursor_ms(&self) -> f64 {
        self.clock.cursor_ms()
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    pub fn start(&self) -> anyhow::Result<()> {
        if !self.has_song() {
            debug!("No song loaded, ignoring start..!");
            return Ok(());
        }

        self.clock.start()
    }

    pub fn stop(&self) -> anyhow::Result<()> {
        self.clock.stop()
    }

    pub fn seek(&self, to_ms: f64) -> anyhow::Result<()> {
        if !self.has_song() {
            debug!("No song loaded, ignoring seek..!");
            return Ok(());
        }

        self.clock.seek(to_ms)
    }

    /// Rewinds to the beginning of the song.
    pub fn restart(&self) -> anyhow::Result<()> {
        self.seek(0.0)
    }

    pub fn set_speed(&self, speed: f64) -> anyhow::Result<()> {
        self.clock.set_speed(speed)
    }

    pub fn set_silent(&self, silent: bool) -> anyhow::Result<()> {
        self.clock.set_silent(silent)
    }

    /// Turns play-along highlighting on or off without touching the song or
    /// the clock. Off means `active_keys` yields the empty set.
    pub fn set_playback_enabled(&self, enabled: bool) {
        self.playback_enabled.store(enabled, Ordering::SeqCst);
    }

    pub fn playback_enabled(&self) -> bool {
        self.playback_enabled.load(Ordering::SeqCst)
    }

    pub fn set_transpose(&self, semitones: i32) {
        if let Ok(mut settings) = self.settings.lock() {
            settings.set_transpose(semitones);
        } else {
            warn!("Failed to lock settings for transposition..!");
        }
    }

    pub fn transpose(&self) -> i32 {
        self.settings
            .lock()
            .map(|settings| settings.transpose())
            .unwrap_or(0)
    }

    /// The keys to highlight at the current cursor. Empty with no song
    /// loaded or while play-along highlighting is disabled.
    ///
    /// Transposition deliberately plays no part here: highlighting always
    /// follows the original key symbols.
    pub fn active_keys(&self) -> HashSet<String> {
        if !self.playback_enabled() {
            return HashSet::new();
        }

        let Ok(slot) = self.song.lock() else {
            warn!("Failed to lock the song slot for highlighting..!");
            return HashSet::new();
        };

        match slot.as_ref() {
            Some(song) => resolver::active_keys(self.clock.cursor_ms(), &song.notes),
            None => HashSet::new(),
        }
    }

    /// Serializes the active song with the current transform settings.
    /// `None` when no song is loaded. Independent of playback state.
    pub fn export_midi(&self) -> anyhow::Result<Option<MidiExport>> {
        let Ok(slot) = self.song.lock() else {
            bail!("Failed to lock the song slot..!")
        };

        let Some(song) = slot.as_ref() else {
            debug!("No song loaded, ignoring export..!");
            return Ok(None);
        };

        let settings = {
            let Ok(settings) = self.settings.lock() else {
                bail!("Failed to lock settings..!")
            };
            *settings
        };

        Ok(Some(exporter::export_song(song, &settings)?))
    }
}
