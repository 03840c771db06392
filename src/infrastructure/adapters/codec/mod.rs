//! Codec Adapter - 音频编解码实现

mod symphonia_lame_codec;

pub use symphonia_lame_codec::{encode_wav, is_supported_bitrate, SymphoniaLameCodec};
