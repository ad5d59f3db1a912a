use anyhow::Result;
use clap::Parser;
use keylight::{Args, JsonSongAnalyzer, MIDI_MIME, NullMedia, Session, SongAnalyzer, pitch_for_key};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    info!("Loading analyzed song: '{}'...", args.song.display());
    let bytes = fs::read(&args.song)?;

    if args.dry_run {
        let song = JsonSongAnalyzer.analyze(&bytes, &mut |pct| {
            debug!("Analysis progress: {}%..!", pct);
        })?;

        info!("Previewing at most {} notes of '{}'..!", args.dry_run_max, song.name);
        for (i, note) in song.notes.iter().enumerate() {
            if i >= args.dry_run_max {
                break;
            }
            let pitch = pitch_for_key(&note.key)
                .map(|p| p.to_string())
                .unwrap_or_else(|| "<no-mapping>".into());

            info!(
                "Note {}: key={} time_ms={} dur_ms={} pitch={}",
                i, note.key, note.time_ms, note.duration_ms, pitch
            );
        }
        return Ok(());
    }

    // The CLI decodes no real audio, so the clock always runs simulated.
    let session = Session::new(NullMedia);
    session.set_silent(true)?;
    session.set_transpose(args.transpose);
    session.set_speed(args.speed)?;
    session.load_song(&JsonSongAnalyzer, &bytes)?;

    if let Some(path) = args.export.as_ref() {
        let Some(export) = session.export_midi()? else {
            warn!("Nothing to export..!");
            return Ok(());
        };

        fs::write(path, &export.bytes)?;
        info!(
            "Wrote '{}' to {} ({} bytes, {})..!",
            export.filename,
            path.display(),
            export.bytes.len(),
            MIDI_MIME
        );
        return Ok(());
    }

    let session = Arc::new(session);
    let session_for_handler = Arc::clone(&session);
    let (done_tx, _done_rx) = mpsc::channel::<()>();

    ctrlc::set_handler(move || {
        warn!("Ctrl-C received, stopping playback..!");
        let _ = session_for_handler.stop();
        let _ = done_tx.send(());
    })
    .expect("Error setting Ctrl-C handler..!");

    let duration_ms = session.duration_ms().unwrap_or(0) as f64;
    session.start()?;
    info!(
        "Playing '{}' ({:.0}ms)..!",
        session.song_name().unwrap_or_default(),
        duration_ms
    );

    let mut last_keys: HashSet<String> = HashSet::new();
    while session.is_running() && session.cursor_ms() <= duration_ms {
        spin_sleep::sleep(Duration::from_millis(16));

        if args.verbose {
            let keys = session.active_keys();
            if keys != last_keys {
                let mut sorted: Vec<&str> = keys.iter().map(String::as_str).collect();
                sorted.sort();
                info!(
                    "{:>10.0}ms | keys down: [{}]",
                    session.cursor_ms(),
                    sorted.join(" ")
                );
                last_keys = keys;
            }
        }
    }

    session.stop()?;
    info!("Playback finished, exiting..!");

    Ok(())
}
