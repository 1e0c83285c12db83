//! # Audio Capture Module
//!
//! Real-time microphone capture through CPAL. Input of any sample format and
//! channel count is converted to mono `f32` and forwarded in fixed-size
//! chunks over a channel to the analysis thread.
//!
//! ## Features
//! - Default input device selection
//! - Sample format conversion and channel down-mixing
//! - Fixed chunk size regardless of the driver's callback size

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, StreamConfig};
use crossbeam_channel::Sender;

use crate::error::{Result, TunerError};

/// Number of mono samples per chunk sent to the analysis thread.
///
/// Small enough that the detector can be polled at its own cadence.
pub const CHUNK_SIZE: usize = 256;

/// Starts capturing from the default input device.
///
/// # Arguments
/// * `sender` - Channel receiving mono chunks of `CHUNK_SIZE` samples
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and its sample rate
/// * `Err(TunerError::DeviceUnavailable)` - No device or access refused
pub fn start_audio_capture(sender: Sender<Vec<f32>>) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| TunerError::DeviceUnavailable("no input device available".into()))?;

    let name = device.name().unwrap_or_else(|_| "<unnamed>".to_string());
    log::info!("[AUDIO] Using input device: {}", name);

    let supported = device
        .default_input_config()
        .map_err(|e| TunerError::DeviceUnavailable(e.to_string()))?;
    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();
    let sample_rate = config.sample_rate.0;

    log::info!(
        "[AUDIO] {} Hz, {} channel(s), {:?}",
        sample_rate,
        config.channels,
        sample_format
    );

    let stream = match sample_format {
        SampleFormat::F32 => build_stream::<f32>(&device, &config, sender)?,
        SampleFormat::I16 => build_stream::<i16>(&device, &config, sender)?,
        SampleFormat::I32 => build_stream::<i32>(&device, &config, sender)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, sender)?,
        SampleFormat::F64 => build_stream::<f64>(&device, &config, sender)?,
        other => {
            return Err(TunerError::StreamConfig(format!(
                "sample format {:?} not supported",
                other
            )));
        }
    };

    stream.play()?;

    Ok((stream, sample_rate))
}

/// Builds an input stream for one concrete sample type.
fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    sender: Sender<Vec<f32>>,
) -> Result<cpal::Stream>
where
    T: Sample + SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let channels = config.channels.max(1) as usize;
    let mut pending = MonoChunker::new(CHUNK_SIZE);

    let err_fn = |err: cpal::StreamError| log::error!("[AUDIO] Stream error: {}", err);

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            pending.push_interleaved(data, channels, |chunk| {
                // Dropping a chunk is better than blocking the audio callback.
                let _ = sender.try_send(chunk);
            });
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}

/// Down-mixes interleaved input and cuts it into equal chunks.
struct MonoChunker {
    chunk_size: usize,
    buffer: Vec<f32>,
}

impl MonoChunker {
    fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            buffer: Vec::with_capacity(chunk_size * 2),
        }
    }

    fn push_interleaved<T, F>(&mut self, data: &[T], channels: usize, mut emit: F)
    where
        T: Sample,
        f32: FromSample<T>,
        F: FnMut(Vec<f32>),
    {
        for frame in data.chunks(channels) {
            let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
            self.buffer.push(sum / frame.len() as f32);
        }

        while self.buffer.len() >= self.chunk_size {
            let chunk = self.buffer.drain(..self.chunk_size).collect();
            emit(chunk);
        }
    }
}
