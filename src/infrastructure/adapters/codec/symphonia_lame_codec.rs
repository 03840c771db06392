//! Audio Codec - 基于 symphonia 解码、LAME 编码
//!
//! 支持：
//! - MP3 / WAV 解码为 f32 交错 PCM
//! - PCM 编码为 MP3（CBR）
//! - PCM 编码为 16 位 WAV（合成服务替身和测试使用）

use mp3lame_encoder::{Bitrate, Builder, FlushNoGap, InterleavedPcm, MonoPcm, Quality};
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::application::ports::{AudioCodecPort, AudioFormat, CodecError, EncodeConfig};
use crate::domain::audio::AudioBuffer;

/// MPEG-1 Layer III 支持的采样率，其它采样率导出前重采样到 44.1kHz
const MPEG1_SAMPLE_RATES: [u32; 3] = [32000, 44100, 48000];
const EXPORT_SAMPLE_RATE: u32 = 44100;

/// 比特率（kbps）→ LAME 常量
fn lame_bitrate(kbps: u32) -> Option<Bitrate> {
    let bitrate = match kbps {
        64 => Bitrate::Kbps64,
        96 => Bitrate::Kbps96,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        _ => return None,
    };
    Some(bitrate)
}

/// 是否为支持的导出比特率
pub fn is_supported_bitrate(kbps: u32) -> bool {
    lame_bitrate(kbps).is_some()
}

/// 将 f32 样本转换为 i16
fn to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * 32767.0) as i16)
        .collect()
}

/// 将 PCM 编码为 16 位 WAV
pub fn encode_wav(audio: &AudioBuffer) -> Vec<u8> {
    let bits_per_sample: u16 = 16;
    let num_channels = audio.channels();
    let sample_rate = audio.sample_rate();
    let byte_rate = sample_rate * num_channels as u32 * (bits_per_sample / 8) as u32;
    let block_align = num_channels * (bits_per_sample / 8);

    let pcm_data = to_i16(audio.samples());
    let data_size = pcm_data.len() * 2;
    let file_size = 36 + data_size;

    let mut wav = Vec::with_capacity(44 + data_size);

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&(file_size as u32).to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    wav.extend_from_slice(&1u16.to_le_bytes()); // PCM format
    wav.extend_from_slice(&num_channels.to_le_bytes());
    wav.extend_from_slice(&sample_rate.to_le_bytes());
    wav.extend_from_slice(&byte_rate.to_le_bytes());
    wav.extend_from_slice(&block_align.to_le_bytes());
    wav.extend_from_slice(&bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&(data_size as u32).to_le_bytes());

    for sample in pcm_data {
        wav.extend_from_slice(&sample.to_le_bytes());
    }

    wav
}

/// symphonia + LAME 编解码器
#[derive(Debug, Default, Clone)]
pub struct SymphoniaLameCodec;

impl SymphoniaLameCodec {
    pub fn new() -> Self {
        Self
    }
}

impl AudioCodecPort for SymphoniaLameCodec {
    fn decode(&self, data: &[u8], format: Option<AudioFormat>) -> Result<AudioBuffer, CodecError> {
        if data.is_empty() {
            return Err(CodecError::InvalidInput("Empty audio data".to_string()));
        }

        let cursor = Cursor::new(data.to_vec());
        let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

        let mut hint = Hint::new();
        if let Some(format) = format {
            hint.with_extension(format.extension());
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| CodecError::UnsupportedFormat(format!("Probe failed: {}", e)))?;

        let mut reader = probed.format;

        let track = reader
            .default_track()
            .ok_or_else(|| CodecError::DecodingError("No audio track found".to_string()))?;

        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track.codec_params.channels.map(|c| c.count() as u16);
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| CodecError::DecodingError(format!("Decoder creation failed: {}", e)))?;

        let mut samples: Vec<f32> = Vec::new();

        loop {
            let packet = match reader.next_packet() {
                Ok(p) => p,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(e) => {
                    return Err(CodecError::DecodingError(format!(
                        "Packet read error: {}",
                        e
                    )));
                }
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(SymphoniaError::DecodeError(e)) => {
                    tracing::warn!("Decode error (skipping packet): {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(CodecError::DecodingError(e.to_string()));
                }
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count() as u16);

            let num_frames = decoded.frames();
            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);
            let actual_samples = num_frames * spec.channels.count();
            samples.extend(&sample_buf.samples()[..actual_samples]);
        }

        let sample_rate =
            sample_rate.ok_or_else(|| CodecError::DecodingError("Unknown sample rate".to_string()))?;
        let channels =
            channels.ok_or_else(|| CodecError::DecodingError("Unknown channel count".to_string()))?;

        let audio = AudioBuffer::new(samples, sample_rate, channels);

        tracing::debug!(
            format = ?format,
            sample_rate,
            channels,
            duration_ms = audio.duration_ms(),
            "Audio decoded"
        );

        Ok(audio)
    }

    fn encode_mp3(&self, audio: &AudioBuffer, config: &EncodeConfig) -> Result<Vec<u8>, CodecError> {
        let bitrate = lame_bitrate(config.bitrate_kbps).ok_or_else(|| {
            CodecError::InvalidInput(format!("Unsupported bitrate: {} kbps", config.bitrate_kbps))
        })?;

        let channels = audio.channels().min(2);
        let sample_rate = if MPEG1_SAMPLE_RATES.contains(&audio.sample_rate()) {
            audio.sample_rate()
        } else {
            EXPORT_SAMPLE_RATE
        };
        let audio = audio.converted(sample_rate, channels);

        let mut builder = Builder::new()
            .ok_or_else(|| CodecError::EncodingError("Failed to create LAME encoder".to_string()))?;
        builder
            .set_num_channels(channels as u8)
            .map_err(|e| CodecError::EncodingError(format!("Invalid channel count: {:?}", e)))?;
        builder
            .set_sample_rate(sample_rate)
            .map_err(|e| CodecError::EncodingError(format!("Invalid sample rate: {:?}", e)))?;
        builder
            .set_brate(bitrate)
            .map_err(|e| CodecError::EncodingError(format!("Invalid bitrate: {:?}", e)))?;
        builder
            .set_quality(Quality::Best)
            .map_err(|e| CodecError::EncodingError(format!("Invalid quality: {:?}", e)))?;
        let mut encoder = builder
            .build()
            .map_err(|e| CodecError::EncodingError(format!("Failed to initialize LAME: {:?}", e)))?;

        let pcm = to_i16(audio.samples());
        let mut mp3 = Vec::new();
        mp3.reserve(mp3lame_encoder::max_required_buffer_size(pcm.len()));

        let encoded = if channels == 1 {
            encoder.encode_to_vec(MonoPcm(&pcm), &mut mp3)
        } else {
            encoder.encode_to_vec(InterleavedPcm(&pcm), &mut mp3)
        };
        encoded.map_err(|e| CodecError::EncodingError(format!("Encode failed: {:?}", e)))?;

        encoder
            .flush_to_vec::<FlushNoGap>(&mut mp3)
            .map_err(|e| CodecError::EncodingError(format!("Flush failed: {:?}", e)))?;

        tracing::debug!(
            sample_rate,
            channels,
            bitrate_kbps = config.bitrate_kbps,
            size = mp3.len(),
            "MP3 encoded"
        );

        Ok(mp3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(secs: f32, freq: f32, sample_rate: u32, channels: u16) -> AudioBuffer {
        let frames = (secs * sample_rate as f32) as usize;
        let mono: Vec<f32> = (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        AudioBuffer::new(mono, sample_rate, 1).with_channels(channels)
    }

    #[test]
    fn test_encode_wav_header() {
        let wav = encode_wav(&sine(1.0, 440.0, 16000, 1));
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 32000);
    }

    #[test]
    fn test_decode_wav() {
        let codec = SymphoniaLameCodec::new();
        let wav = encode_wav(&sine(1.0, 440.0, 16000, 2));

        let audio = codec.decode(&wav, Some(AudioFormat::Wav)).unwrap();
        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(audio.channels(), 2);
        assert_eq!(audio.frames(), 16000);
        assert!((audio.peak() - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_decode_without_hint() {
        let codec = SymphoniaLameCodec::new();
        let wav = encode_wav(&sine(0.5, 440.0, 22050, 1));
        let audio = codec.decode(&wav, None).unwrap();
        assert_eq!(audio.frames(), 11025);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let codec = SymphoniaLameCodec::new();
        assert!(codec.decode(&[], None).is_err());
        assert!(codec.decode(b"definitely not audio", None).is_err());
    }

    #[test]
    fn test_mp3_roundtrip_duration() {
        let codec = SymphoniaLameCodec::new();
        let source = sine(1.0, 440.0, 24000, 1);

        let mp3 = codec.encode_mp3(&source, &EncodeConfig::default()).unwrap();
        assert!(!mp3.is_empty());

        let decoded = codec.decode(&mp3, Some(AudioFormat::Mp3)).unwrap();
        // 低于 32kHz 的输入导出时被提升到 44.1kHz
        assert_eq!(decoded.sample_rate(), 44100);
        assert_eq!(decoded.channels(), 1);
        // 编码器延迟和帧填充会带来少量额外样本
        let diff = decoded.duration_ms() as i64 - 1000;
        assert!(diff.abs() < 150, "duration drift {}ms", diff);
    }

    #[test]
    fn test_mp3_bitrate_matches_config() {
        let codec = SymphoniaLameCodec::new();
        let mp3 = codec
            .encode_mp3(&sine(2.0, 440.0, 44100, 2), &EncodeConfig { bitrate_kbps: 192 })
            .unwrap();
        // CBR 192kbps，2 秒约 48000 字节
        let expected = 192_000 / 8 * 2;
        assert!((mp3.len() as i64 - expected as i64).abs() < 4000, "size {}", mp3.len());
    }

    #[test]
    fn test_unsupported_bitrate() {
        let codec = SymphoniaLameCodec::new();
        let err = codec
            .encode_mp3(&sine(0.1, 440.0, 44100, 1), &EncodeConfig { bitrate_kbps: 193 })
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidInput(_)));
        assert!(is_supported_bitrate(192));
        assert!(!is_supported_bitrate(193));
    }
}
