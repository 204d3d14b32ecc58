/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A pure Rust baseline and progressive JPEG (ITU-T T.81) decoder.
//!
//! # Features
//!  - Baseline (sequential) and progressive DCT decoding, Huffman coding only.
//!  - Fixed-point integer IDCT and color conversion, no floating point on the
//!    hot path.
//!  - Grayscale and YCbCr (4:4:4, 4:2:2, 4:2:0, and other power-of-two
//!    sampling ratios) input, always decoded to 8-bit-per-channel RGBA.
//!
//! # Usage
//!
//! ```no_run
//! use zjpeg::decode_buffer;
//!
//! let bytes = std::fs::read("image.jpg").unwrap();
//! let image = decode_buffer(&bytes).unwrap();
//! println!("{}x{}", image.width(), image.height());
//! ```
//!
//! Out of scope: 12-bit samples, arithmetic coding, hierarchical and
//! lossless modes, CMYK/YCCK, extended sequential DCT (SOF1), and
//! multi-threaded decoding. APP/COM segments are skipped; no metadata is
//! extracted.

#![warn(clippy::correctness, clippy::perf)]
#![allow(clippy::needless_return, clippy::similar_names, clippy::many_single_char_names)]

#[macro_use]
extern crate log;

pub use crate::decoder::JpegDecoder;
pub use crate::errors::DecodeErrors;
pub use crate::image::RgbaImage;
pub use crate::options::DecoderOptions;

mod bitstream;
mod block;
mod color_convert;
mod components;
mod decoder;
mod errors;
mod headers;
mod huffman;
mod idct;
mod image;
mod marker;
mod mcu;
mod misc;
mod options;
mod upsample;

/// Decode a raw JPEG byte sequence into an RGBA image.
///
/// # Errors
///
/// Returns [`DecodeErrors`] for any malformed, truncated, or unsupported
/// stream. There is no partial-image recovery: an error means the decode
/// produced nothing.
pub fn decode_buffer(data: &[u8]) -> Result<RgbaImage, DecodeErrors> {
    JpegDecoder::new(data).decode()
}

/// Decode a JPEG stream held as an opaque string of bytes (for callers that
/// already have the stream as text-like data, e.g. out of a `data:` URI
/// decoder) into an RGBA image.
///
/// # Errors
///
/// Same as [`decode_buffer`].
pub fn decode_str(data: &str) -> Result<RgbaImage, DecodeErrors> {
    decode_buffer(data.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_image_with_no_frame() {
        let err = decode_buffer(&[0xFF, 0xD8, 0xFF, 0xD9]);
        assert!(err.is_err());
    }
}
