use crate::model::pitch::pitch_for_key;
use crate::model::settings::TransformSettings;
use crate::model::song::Song;
use anyhow::anyhow;
use log::{debug, warn};
use midly::num::{u4, u7, u15, u28};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

/// Resolution of the exported file; fixed, no tempo map is written.
pub const TICKS_PER_QUARTER: u16 = 480;

/// MIME type of the produced artifact.
pub const MIDI_MIME: &str = "audio/midi";

// Every note-off trails its note-on by this fixed delta, which the
// variable-length encoding turns into the two bytes 0x81 0x40.
const NOTE_GAP_TICKS: u32 = 192;

const NOTE_ON_VELOCITY: u8 = 0x64;

/// A serialized song, ready to hand to the user as a download.
#[derive(Debug, Clone)]
pub struct MidiExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Serializes a song into a single-track standard MIDI file.
///
/// The walk is in note-list order and depends on nothing but the song and the
/// transform settings, so the same inputs always produce byte-identical
/// output. Keys without a pitch mapping are skipped with a warning.
pub fn song_to_midi(song: &Song, settings: &TransformSettings) -> anyhow::Result<Vec<u8>> {
    let mut track: Track = Vec::new();

    for note in song.notes.iter() {
        let Some(base) = pitch_for_key(&note.key) else {
            warn!(
                "No pitch mapping for key '{}': skipping note at {}ms..!",
                note.key, note.time_ms
            );
            continue;
        };

        let pitch = (base as i32 + settings.transpose()).clamp(0, 127) as u8;

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOn {
                    key: u7::new(pitch),
                    vel: u7::new(NOTE_ON_VELOCITY),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(NOTE_GAP_TICKS),
            kind: TrackEventKind::Midi {
                channel: u4::new(0),
                message: MidiMessage::NoteOff {
                    key: u7::new(pitch),
                    vel: u7::new(0),
                },
            },
        });
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let smf = Smf {
        header: Header {
            format: Format::SingleTrack,
            timing: Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
        },
        tracks: vec![track],
    };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| anyhow!("Failed to serialize MIDI: {:?}", e))?;

    debug!(
        "Serialized '{}' into {} bytes of MIDI..!",
        song.name,
        bytes.len()
    );

    Ok(bytes)
}

/// Serializes a song and names the artifact after it.
pub fn export_song(song: &Song, settings: &TransformSettings) -> anyhow::Result<MidiExport> {
    let bytes = song_to_midi(song, settings)?;

    Ok(MidiExport {
        filename: format!("{}.mid", song.name),
        bytes,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::song::SongNote;

    const HEADER: &[u8] = &[
        0x4D, 0x54, 0x68, 0x64, // "MThd"
        0x00, 0x00, 0x00, 0x06, // header length
        0x00, 0x00, // format 0
        0x00, 0x01, // one track
        0x01, 0xE0, // 480 ticks per quarter note
    ];

    fn song(notes: Vec<SongNote>) -> Song {
        Song {
            id: "test".to_string(),
            name: "Test Song".to_string(),
            duration_ms: notes
                .iter()
                .map(|n| n.time_ms + n.duration_ms)
                .max()
                .unwrap_or(0),
            notes,
        }
    }

    fn note(key: &str, time_ms: u64, duration_ms: u64) -> SongNote {
        SongNote {
            key: key.to_string(),
            time_ms,
            duration_ms,
        }
    }

    #[test]
    fn single_note_file_is_byte_exact() {
        env_logger::try_init().unwrap_or(());

        let song = song(vec![note("A", 0, 200)]);
        let bytes = song_to_midi(&song, &TransformSettings::default()).unwrap();

        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(&[
            0x4D, 0x54, 0x72, 0x6B, // "MTrk"
            0x00, 0x00, 0x00, 0x0D, // track length: 13 bytes follow
            0x00, 0x90, 0x3C, 0x64, // delta 0, note-on ch0, pitch 60, velocity 100
            0x81, 0x40, 0x80, 0x3C, 0x00, // delta 192, note-off ch0, pitch 60
            0x00, 0xFF, 0x2F, 0x00, // end of track
        ]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn export_is_deterministic() {
        env_logger::try_init().unwrap_or(());

        let song = song(vec![note("C", 0, 100), note("e", 100, 400), note("G", 500, 250)]);
        let settings = TransformSettings::new(3);

        let first = song_to_midi(&song, &settings).unwrap();
        let second = song_to_midi(&song, &settings).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn transposition_shifts_the_pitch_bytes() {
        env_logger::try_init().unwrap_or(());

        let song = song(vec![note("A", 0, 200)]);

        let plain = song_to_midi(&song, &TransformSettings::default()).unwrap();
        let shifted = song_to_midi(&song, &TransformSettings::new(2)).unwrap();

        assert_eq!(plain[HEADER.len() + 10], 0x3C);
        assert_eq!(shifted[HEADER.len() + 10], 0x3E);
        assert_eq!(plain.len(), shifted.len());
    }

    #[test]
    fn notes_are_written_in_list_order() {
        env_logger::try_init().unwrap_or(());

        // Deliberately unsorted; the exporter must not reorder.
        let song = song(vec![note("Z", 500, 100), note("A", 0, 100)]);
        let bytes = song_to_midi(&song, &TransformSettings::default()).unwrap();

        let track = &bytes[HEADER.len() + 8..];
        assert_eq!(track[2], 85); // Z first
        assert_eq!(track[11], 60); // then A
    }

    #[test]
    fn unmapped_keys_are_skipped() {
        env_logger::try_init().unwrap_or(());

        let song = song(vec![note("?", 0, 100), note("A", 100, 100)]);
        let bytes = song_to_midi(&song, &TransformSettings::default()).unwrap();

        // One on/off pair plus the end-of-track marker.
        assert_eq!(bytes.len(), HEADER.len() + 8 + 13);
    }

    #[test]
    fn empty_song_still_frames_a_track() {
        env_logger::try_init().unwrap_or(());

        let song = song(Vec::new());
        let bytes = song_to_midi(&song, &TransformSettings::default()).unwrap();

        let mut expected = HEADER.to_vec();
        expected.extend_from_slice(&[
            0x4D, 0x54, 0x72, 0x6B, 0x00, 0x00, 0x00, 0x04, 0x00, 0xFF, 0x2F, 0x00,
        ]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn artifact_is_named_after_the_song() {
        env_logger::try_init().unwrap_or(());

        let song = song(vec![note("A", 0, 100)]);
        let export = export_song(&song, &TransformSettings::default()).unwrap();

        assert_eq!(export.filename, "Test Song.mid");
        assert!(!export.bytes.is_empty());
        assert_eq!(MIDI_MIME, "audio/midi");
    }
}
