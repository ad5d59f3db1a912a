mod transport;

pub use transport::*;

/// The media-playback surface the clock drives when it isn't silent.
///
/// The decoded-audio position is the authoritative time source in media mode,
/// so the clock reads it back on every tick instead of integrating locally.
/// The handle is owned exclusively by the playback clock; nothing else in the
/// crate may start, stop, or seek it directly.
pub trait MediaTransport: Send + Sync {
    /// Current decoded-audio position in milliseconds.
    fn position_ms(&self) -> f64;

    fn play(&self) -> anyhow::Result<()>;

    fn pause(&self) -> anyhow::Result<()>;

    fn seek_to(&self, ms: f64) -> anyhow::Result<()>;

    fn set_rate(&self, rate: f64) -> anyhow::Result<()>;
}

/// A transport that decodes nothing and goes nowhere.
///
/// Used when playback runs in silent mode end to end (the CLI), where the
/// clock never consults the transport anyway.
#[derive(Debug, Default)]
pub struct NullMedia;

impl MediaTransport for NullMedia {
    fn position_ms(&self) -> f64 {
        0.0
    }

    fn play(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn pause(&self) -> anyhow::Result<()> {
        Ok(())
    }

    fn seek_to(&self, _ms: f64) -> anyhow::Result<()> {
        Ok(())
    }

    fn set_rate(&self, _rate: f64) -> anyhow::Result<()> {
        Ok(())
    }
}
