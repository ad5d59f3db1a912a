use serde::{Deserialize, Serialize};

/// A single timed key-press event within a song.
///
/// `key` is the on-screen keyboard symbol as the analysis produced it; the
/// resolver canonicalizes case at lookup time, so "c" and "C" light the same
/// key. Notes may overlap (chords), and a zero `duration_ms` marks an
/// instantaneous note.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SongNote {
    pub key: String,
    pub time_ms: u64,
    pub duration_ms: u64,
}

/// An analyzed song: a named, immutable sequence of timed note events.
///
/// Nothing in this crate mutates a song once it exists; the session replaces
/// the whole value when a new one is loaded. The note list keeps whatever
/// order the analysis emitted, which is also the order the exporter walks.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Song {
    pub id: String,
    pub name: String,
    pub notes: Vec<SongNote>,
    pub duration_ms: u64,
}

impl Song {
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}
