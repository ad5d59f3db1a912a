use log::debug;
use serde::{Deserialize, Serialize};

pub const MIN_TRANSPOSE: i32 = -12;
pub const MAX_TRANSPOSE: i32 = 12;

pub const MIN_SPEED: f64 = 0.5;
pub const MAX_SPEED: f64 = 1.5;

/// Read-time pitch transform for the exporter.
///
/// The song itself stays canonical: transposition only reinterprets the pitch
/// written to the MIDI file, never which on-screen key lights up. Values
/// outside the allowed range clamp to the nearest bound instead of failing.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransformSettings {
    transpose_semitones: i32,
}

impl TransformSettings {
    pub fn new(transpose_semitones: i32) -> Self {
        let mut settings = Self::default();
        settings.set_transpose(transpose_semitones);
        settings
    }

    pub fn transpose(&self) -> i32 {
        self.transpose_semitones
    }

    pub fn set_transpose(&mut self, semitones: i32) {
        let clamped = semitones.clamp(MIN_TRANSPOSE, MAX_TRANSPOSE);

        if clamped != semitones {
            debug!(
                "Transposition {} is out of range, clamping to {}..!",
                semitones, clamped
            );
        }

        self.transpose_semitones = clamped;
    }
}

/// Clamps a playback speed factor into the supported range.
pub fn clamp_speed(speed: f64) -> f64 {
    let clamped = speed.clamp(MIN_SPEED, MAX_SPEED);

    if clamped != speed {
        debug!("Speed {} is out of range, clamping to {}..!", speed, clamped);
    }

    clamped
}
