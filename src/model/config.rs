use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "keylight",
    about = "Follow an analyzed song along on the keyboard, or export it as MIDI!"
)]
pub struct Args {
    /// Path to an analyzed song file (JSON).
    pub song: PathBuf,

    /// Transpose the exported pitch in semitones (clamped to [-12..=12]).
    #[arg(short, long, default_value_t = 0)]
    pub transpose: i32,

    /// Playback speed factor (clamped to [0.5..=1.5]).
    #[arg(short, long, default_value_t = 1.0)]
    pub speed: f64,

    /// Write the song out as a standard MIDI file to this path and exit.
    #[arg(short, long)]
    pub export: Option<PathBuf>,

    /// Dry run (print first dry_run_max notes and exit).
    #[arg(short, long, default_value_t = false)]
    pub dry_run: bool,

    /// Maximum notes to print in dry run.
    #[arg(long, default_value_t = 80)]
    pub dry_run_max: usize,

    /// Prints the highlighted keys on every change during playback.
    #[arg(short, long)]
    pub verbose: bool,
}
