//! # drumtune - Drum Tuning Aid
//!
//! Terminal front end for the drum tuner. Strike one drum at a time near the
//! microphone; each strike is analysed and compared with the target band of
//! the selected style, drum and head.
//!
//! ## Architecture
//! - **Main Thread**: argument parsing, then waits for Ctrl-C or `--seconds`
//! - **Audio Thread**: owns the stream, the analyser and the session
//! - **Communication**: Crossbeam channels for audio chunks and shutdown

mod ui;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cpal::traits::StreamTrait;
use crossbeam_channel::{Receiver, Sender};
use drumtune_core::{
    DrumId, Selection, Session, SkinSide, SpectrumAnalyser, Style, TunerConfig, audio, catalog,
};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use ui::presenter::TerminalPresenter;

/// Command line options.
#[derive(Parser, Debug)]
#[command(name = "drumtune", version, about = "Strike-triggered drum tuning aid")]
struct Args {
    /// Tuning style: tight or rock
    #[arg(long, default_value = "tight")]
    style: Style,

    /// Drum: snare, tomHigh, tomMid or tomLow
    #[arg(long, default_value = "snare")]
    drum: DrumId,

    /// Head being tuned: batter or reso
    #[arg(long, default_value = "batter")]
    skin: SkinSide,

    /// JSON file overriding detection and capture parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop listening after this many seconds
    #[arg(long)]
    seconds: Option<u64>,

    /// Print the target catalog and exit
    #[arg(long)]
    list: bool,
}

/// Audio thread handle.
///
/// Holds the channel used to ask the thread to stop and the handle used to
/// collect its result.
struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<Result<()>>>,
}

impl AudioWorker {
    /// Spawns the audio thread. `done_tx` is signalled when it exits on its own.
    fn spawn(config: TunerConfig, selection: Selection, done_tx: Sender<()>) -> Self {
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let thread_handle = thread::spawn(move || {
            log::info!("[AUDIO-THREAD] Starting audio thread...");
            let result = run_audio_loop(&config, selection, &shutdown_rx);
            if let Err(e) = &result {
                log::error!("[AUDIO-THREAD] Fatal error: {:#}", e);
            }
            let _ = done_tx.try_send(());
            result
        });

        Self {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        }
    }

    /// Asks the thread to stop and returns its result.
    fn shutdown(mut self) -> Result<()> {
        // The thread may already be gone, in which case nobody is listening.
        let _ = self.shutdown_tx.try_send(());
        match self.thread_handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| anyhow!("audio thread panicked"))?,
            None => Ok(()),
        }
    }
}

/// Body of the audio thread: capture, poll the session, tear down.
fn run_audio_loop(
    config: &TunerConfig,
    selection: Selection,
    shutdown_rx: &Receiver<()>,
) -> Result<()> {
    let (raw_audio_tx, raw_audio_rx) = crossbeam_channel::bounded::<Vec<f32>>(256);
    let (stream, sample_rate) =
        audio::start_audio_capture(raw_audio_tx).context("could not open the microphone")?;

    let mut analyser = SpectrumAnalyser::new(sample_rate, &config.analyser);
    let mut frame = vec![0.0; analyser.time_buffer_len()];
    let poll_interval = config.analyser.poll_interval(sample_rate);

    let mut presenter = TerminalPresenter::new(std::io::stdout());
    let (profile, target, band) = catalog::resolve(selection);
    presenter.show_target(profile.label, target.label, selection.skin.label(), band);

    let mut session = Session::start(config);
    let mut samples_seen: u64 = 0;
    let mut since_poll: usize = 0;

    log::info!("[AUDIO-THREAD] Entering audio processing loop...");
    loop {
        crossbeam_channel::select! {
            recv(raw_audio_rx) -> msg => match msg {
                Ok(chunk) => {
                    analyser.push_samples(&chunk);
                    samples_seen += chunk.len() as u64;
                    since_poll += chunk.len();

                    if since_poll >= poll_interval {
                        since_poll %= poll_interval;
                        let now = Duration::from_secs_f64(samples_seen as f64 / sample_rate as f64);
                        analyser.time_domain(&mut frame);
                        session.tick(&frame, now, selection, &mut analyser, &mut presenter);
                    }
                }
                Err(_) => {
                    log::warn!("[AUDIO-THREAD] Audio channel closed");
                    break;
                }
            },
            recv(shutdown_rx) -> _ => {
                log::info!("[AUDIO-THREAD] Received shutdown signal");
                break;
            },
        }
    }

    session.stop();
    if let Err(e) = stream.pause() {
        log::warn!("[AUDIO-THREAD] Error pausing stream: {}", e);
    }
    drop(stream);
    log::info!("[AUDIO-THREAD] Audio thread finished");
    Ok(())
}

/// Prints every style, drum and band in the catalog.
fn print_catalog() {
    for style in Style::ALL {
        let profile = catalog::profile(style);
        println!("{} ({})", profile.label, style.id());
        for (drum, target) in &profile.targets {
            println!(
                "  {:<8} {:<22} batter {:>3}–{:<3} Hz   reso {:>3}–{:<3} Hz",
                drum.id(),
                target.label,
                target.batter.min_hz,
                target.batter.max_hz,
                target.reso.min_hz,
                target.reso.max_hz
            );
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if args.list {
        print_catalog();
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => TunerConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => TunerConfig::default(),
    };
    let selection = Selection {
        style: args.style,
        drum: args.drum,
        skin: args.skin,
    };

    let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(2);
    let ctrlc_tx = stop_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.try_send(());
    })
    .context("failed to install Ctrl-C handler")?;

    let worker = AudioWorker::spawn(config, selection, stop_tx);

    match args.seconds {
        Some(seconds) => {
            let _ = stop_rx.recv_timeout(Duration::from_secs(seconds));
        }
        None => {
            let _ = stop_rx.recv();
        }
    }

    log::info!("[MAIN] Shutting down...");
    worker.shutdown()
}
