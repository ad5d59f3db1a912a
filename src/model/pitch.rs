/// Middle C; the pitch the key symbol "A" exports as.
pub const BASE_PITCH: u8 = 60;

// -----------------------------------------------------------------------------
// Hardcoded mapping: key symbol "A" .. "Z" -> MIDI 60 (C4) .. MIDI 85 (C#6)
//
// The table is intentionally total over the canonical key symbols: one letter
// per semitone starting at middle C. Anything that isn't a single A-Z letter
// has no pitch and the exporter skips it rather than emit an undefined byte.
// -----------------------------------------------------------------------------

pub const KEY_PITCHES: &[(char, u8)] = &[
    ('A', 60),
    ('B', 61),
    ('C', 62),
    ('D', 63),
    ('E', 64),
    ('F', 65),
    ('G', 66),
    ('H', 67),
    ('I', 68),
    ('J', 69),
    ('K', 70),
    ('L', 71),
    ('M', 72),
    ('N', 73),
    ('O', 74),
    ('P', 75),
    ('Q', 76),
    ('R', 77),
    ('S', 78),
    ('T', 79),
    ('U', 80),
    ('V', 81),
    ('W', 82),
    ('X', 83),
    ('Y', 84),
    ('Z', 85),
];

/// The canonical form of an on-screen key symbol.
///
/// Both the resolver and the exporter go through this, so "c" and "C"
/// collapse to the same highlighted key and the same exported pitch.
pub fn canonical_key(key: &str) -> String {
    key.to_ascii_uppercase()
}

/// Looks up the exported MIDI pitch for a key symbol, or `None` when the
/// symbol is not a single mapped letter.
pub fn pitch_for_key(key: &str) -> Option<u8> {
    let canonical = canonical_key(key);
    let mut chars = canonical.chars();
    let first = chars.next()?;

    if chars.next().is_some() {
        return None;
    }

    KEY_PITCHES
        .iter()
        .find(|(symbol, _)| *symbol == first)
        .map(|&(_, pitch)| pitch)
}
