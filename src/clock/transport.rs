use crate::clock::MediaTransport;
use crate::model::settings::clamp_speed;
use anyhow::bail;
use log::{debug, warn};
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::sync::mpsc::{Sender, TryRecvError};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

/// Tick period of the playback clock (~60Hz).
pub const TICK_MS: f64 = 16.0;

const TICK_PERIOD: Duration = Duration::from_millis(16);

enum ControlMsg {
    Stop,
}

/// Where the next tick reads its time from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    /// Track the decoded-audio position reported by the media transport.
    Media,
    /// Free-running simulated advance of `TICK_MS * speed` per tick.
    Simulated,
}

#[derive(Debug)]
struct ClockState {
    cursor_ms: f64,
    running: bool,
    speed: f64,
    silent: bool,
}

impl ClockState {
    fn source(&self) -> ClockSource {
        if self.silent {
            ClockSource::Simulated
        } else {
            ClockSource::Media
        }
    }
}

/// The single authoritative time cursor for the active song.
///
/// While running, a dedicated worker thread ticks the cursor every 16ms,
/// reading the media transport's position in media mode or integrating
/// `speed` in silent mode. Exactly one worker exists per running period;
/// `stop()` joins it synchronously, so nothing mutates the cursor afterwards.
#[derive(Debug)]
pub struct PlaybackClock<M: MediaTransport> {
    media: Arc<M>,
    state: Arc<Mutex<ClockState>>,
    control_tx: Mutex<Option<Sender<ControlMsg>>>,
    worker_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<M: MediaTransport + 'static> PlaybackClock<M> {
    pub fn new(media: M) -> Self {
        Self {
            media: Arc::new(media),
            state: Arc::new(Mutex::new(ClockState {
                cursor_ms: 0.0,
                running: false,
                speed: 1.0,
                silent: false,
            })),
            control_tx: Mutex::new(None),
            worker_handle: Mutex::new(None),
        }
    }

    pub fn cursor_ms(&self) -> f64 {
        self.state.lock().map(|st| st.cursor_ms).unwrap_or(0.0)
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().map(|st| st.running).unwrap_or(false)
    }

    pub fn speed(&self) -> f64 {
        self.state.lock().map(|st| st.speed).unwrap_or(1.0)
    }

    pub fn source(&self) -> ClockSource {
        self.state
            .lock()
            .map(|st| st.source())
            .unwrap_or(ClockSource::Simulated)
    }

    /// Starts the clock and its tick worker. Idempotent while running.
    pub fn start(&self) -> anyhow::Result<()> {
        {
            let Ok(guard) = self.worker_handle.lock() else {
                bail!("Failed to lock worker handle..!")
            };

            if guard.is_some() {
                debug!("Playback already running..!");
                return Ok(());
            }
        }

        {
            let Ok(mut st) = self.state.lock() else {
                bail!("Failed to lock clock state..!")
            };

            if !st.silent {
                self.media.seek_to(st.cursor_ms)?;
                self.media.set_rate(st.speed)?;
                self.media.play()?;
            }

            st.running = true;
        }

        let (tx, rx) = mpsc::channel::<ControlMsg>();

        {
            let Ok(mut ctl) = self.control_tx.lock() else {
                bail!("Failed to lock control_tx..!")
            };

            *ctl = Some(tx);
        }

        let state = Arc::clone(&self.state);
        let media = Arc::clone(&self.media);

        let handle = thread::spawn(move || {
            let ctrl_rx = rx;
            let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);

            loop {
                // A dropped sender counts as a stop too; a worker whose
                // channel is gone must never keep mutating the cursor.
                if !matches!(ctrl_rx.try_recv(), Err(TryRecvError::Empty)) {
                    debug!("Tick worker stopped via control message..!");
                    return;
                }

                sleeper.sleep(TICK_PERIOD);

                // A stop issued during the sleep takes effect before the
                // next tick reads the clock.
                if !matches!(ctrl_rx.try_recv(), Err(TryRecvError::Empty)) {
                    debug!("Tick worker stopped during wait..!");
                    return;
                }

                advance(&state, media.as_ref());
            }
        });

        let Ok(mut wh) = self.worker_handle.lock() else {
            bail!("Failed to lock worker handle..!")
        };

        *wh = Some(handle);

        Ok(())
    }

    /// Stops the clock, joining the tick worker before returning.
    pub fn stop(&self) -> anyhow::Result<()> {
        let tx = {
            let Ok(mut lock) = self.control_tx.lock() else {
                bail!("Failed to lock control_tx..!")
            };
            lock.take()
        };

        if let Some(tx) = tx {
            let _ = tx.send(ControlMsg::Stop);
        } else {
            debug!("No tick worker is running..!");
        }

        {
            let Ok(mut lock) = self.worker_handle.lock() else {
                bail!("Failed to lock worker_handle..!")
            };

            if let Some(handle) = lock.take() {
                let _ = handle.join();
                debug!("Tick worker joined..!");
            }
        }

        let Ok(mut st) = self.state.lock() else {
            bail!("Failed to lock clock state..!")
        };

        if st.running {
            st.running = false;

            if !st.silent {
                self.media.pause()?;
            }
        }

        Ok(())
    }

    /// Moves the cursor; callers pass `0.0` for "restart".
    pub fn seek(&self, to_ms: f64) -> anyhow::Result<()> {
        let Ok(mut st) = self.state.lock() else {
            bail!("Failed to lock clock state..!")
        };

        st.cursor_ms = to_ms.max(0.0);

        if !st.silent {
            self.media.seek_to(st.cursor_ms)?;
        }

        Ok(())
    }

    /// Sets the speed factor, clamped to the supported range. Applied to the
    /// media transport immediately; silent mode picks it up on the next tick.
    pub fn set_speed(&self, speed: f64) -> anyhow::Result<()> {
        let speed = clamp_speed(speed);

        let Ok(mut st) = self.state.lock() else {
            bail!("Failed to lock clock state..!")
        };

        st.speed = speed;

        if !st.silent {
            self.media.set_rate(speed)?;
        }

        Ok(())
    }

    /// Switches between the media-driven and simulated clock sources.
    ///
    /// The cursor is kept as-is; only the source consulted by the next tick
    /// changes. The media transport is paused or resumed to match.
    pub fn set_silent(&self, silent: bool) -> anyhow::Result<()> {
        let Ok(mut st) = self.state.lock() else {
            bail!("Failed to lock clock state..!")
        };

        if st.silent == silent {
            return Ok(());
        }

        st.silent = silent;

        if st.running {
            if silent {
                self.media.pause()?;
            } else {
                self.media.seek_to(st.cursor_ms)?;
                self.media.set_rate(st.speed)?;
                self.media.play()?;
            }
        }

        Ok(())
    }
}

impl<M: MediaTransport> Drop for PlaybackClock<M> {
    fn drop(&mut self) {
        let tx = self
            .control_tx
            .lock()
            .ok()
            .and_then(|mut lock| lock.take());

        if let Some(tx) = tx {
            let _ = tx.send(ControlMsg::Stop);
        }

        if let Ok(mut lock) = self.worker_handle.lock()
            && let Some(handle) = lock.take()
        {
            let _ = handle.join();
            debug!("Tick worker joined on drop..!");
        }
    }
}

/// One tick: read the authoritative source and update the cursor.
fn advance<M: MediaTransport>(state: &Mutex<ClockState>, media: &M) {
    let Ok(mut st) = state.lock() else {
        warn!("Failed to lock clock state for a tick..!");
        return;
    };

    if !st.running {
        return;
    }

    match st.source() {
        ClockSource::Media => st.cursor_ms = media.position_ms(),
        ClockSource::Simulated => st.cursor_ms += TICK_MS * st.speed,
    }
}
