use crate::error::AnalysisError;
use crate::model::song::Song;
use log::debug;

/// The analysis collaborator boundary.
///
/// Implementations turn raw file bytes into a song, reporting monotonically
/// non-decreasing progress in 0..=100 along the way. A failure must leave no
/// partial song behind; the session treats it as "no song produced".
pub trait SongAnalyzer {
    fn analyze(
        &self,
        bytes: &[u8],
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<Song, AnalysisError>;
}

/// Stand-in analyzer for songs that were already analyzed elsewhere:
/// accepts the serialized song model as JSON bytes.
#[derive(Debug, Default)]
pub struct JsonSongAnalyzer;

impl SongAnalyzer for JsonSongAnalyzer {
    fn analyze(
        &self,
        bytes: &[u8],
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<Song, AnalysisError> {
        on_progress(0);

        let song: Song = serde_json::from_slice(bytes)
            .map_err(|e| AnalysisError::Undecodable(e.to_string()))?;

        debug!(
            "Decoded song '{}' with {} notes..!",
            song.name,
            song.notes.len()
        );

        on_progress(100);

        Ok(song)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TWINKLE: &str = r#"{
        "id": "twinkle-1",
        "name": "Twinkle Twinkle",
        "duration_ms": 1400,
        "notes": [
            { "key": "C", "time_ms": 0, "duration_ms": 400 },
            { "key": "C", "time_ms": 400, "duration_ms": 400 },
            { "key": "G", "time_ms": 800, "duration_ms": 600 }
        ]
    }"#;

    #[test]
    fn decodes_an_analyzed_song() {
        env_logger::try_init().unwrap_or(());

        let mut reported: Vec<u8> = Vec::new();
        let song = JsonSongAnalyzer
            .analyze(TWINKLE.as_bytes(), &mut |pct| reported.push(pct))
            .unwrap();

        assert_eq!(song.name, "Twinkle Twinkle");
        assert_eq!(song.notes.len(), 3);
        assert_eq!(song.duration_ms, 1400);

        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reported.last(), Some(&100));
    }

    #[test]
    fn garbage_bytes_fail_with_no_song() {
        env_logger::try_init().unwrap_or(());

        let result = JsonSongAnalyzer.analyze(b"\xffnot json", &mut |_| {});

        assert!(matches!(result, Err(AnalysisError::Undecodable(_))));
    }
}
