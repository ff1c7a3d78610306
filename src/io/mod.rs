// Purpose - sample format conversion at the device boundary

pub mod converter;

pub use converter::{
    deinterleave_channel, f32_to_i16, i16_to_f32, interleave_channel, I16_FULL_SCALE,
};
