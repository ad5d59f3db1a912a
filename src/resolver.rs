use crate::model::pitch::canonical_key;
use crate::model::song::SongNote;
use std::collections::HashSet;

/// Answers "which keys are down right now" for highlighting.
///
/// A note is active while the cursor sits inside `[time, time + duration]`,
/// inclusive on both ends; a zero-duration note is active only at the exact
/// instant of its start. Pure function of its inputs, recomputed on every
/// tick; keys come back canonicalized so "c" and "C" collapse to one entry.
pub fn active_keys(cursor_ms: f64, notes: &[SongNote]) -> HashSet<String> {
    notes
        .iter()
        .filter(|note| {
            let start = note.time_ms as f64;
            let end = (note.time_ms + note.duration_ms) as f64;

            cursor_ms >= start && cursor_ms <= end
        })
        .map(|note| canonical_key(&note.key))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn note(key: &str, time_ms: u64, duration_ms: u64) -> SongNote {
        SongNote {
            key: key.to_string(),
            time_ms,
            duration_ms,
        }
    }

    fn keys(set: &HashSet<String>) -> Vec<&str> {
        let mut keys: Vec<&str> = set.iter().map(String::as_str).collect();
        keys.sort();
        keys
    }

    #[test]
    fn single_note_window() {
        let notes = vec![note("C", 1000, 500)];

        assert_eq!(keys(&active_keys(1200.0, &notes)), vec!["C"]);
        assert!(active_keys(1600.0, &notes).is_empty());
        assert!(active_keys(999.0, &notes).is_empty());
    }

    #[test]
    fn window_is_inclusive_on_both_ends() {
        let notes = vec![note("D", 100, 50)];

        assert_eq!(active_keys(100.0, &notes).len(), 1);
        assert_eq!(active_keys(150.0, &notes).len(), 1);
        assert!(active_keys(150.1, &notes).is_empty());
    }

    #[test]
    fn zero_duration_is_active_only_at_its_instant() {
        let notes = vec![note("E", 300, 0)];

        assert_eq!(active_keys(300.0, &notes).len(), 1);
        assert!(active_keys(299.9, &notes).is_empty());
        assert!(active_keys(300.1, &notes).is_empty());
    }

    #[test]
    fn chords_yield_multiple_keys() {
        let notes = vec![note("C", 0, 1000), note("E", 0, 1000), note("G", 500, 1000)];

        assert_eq!(keys(&active_keys(250.0, &notes)), vec!["C", "E"]);
        assert_eq!(keys(&active_keys(750.0, &notes)), vec!["C", "E", "G"]);
    }

    #[test]
    fn case_collapses_to_one_key() {
        let notes = vec![note("c", 0, 100), note("C", 0, 100)];

        assert_eq!(keys(&active_keys(50.0, &notes)), vec!["C"]);
    }

    #[test]
    fn empty_song_yields_empty_set() {
        assert!(active_keys(0.0, &[]).is_empty());
    }
}
