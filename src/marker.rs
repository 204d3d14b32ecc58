/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! JPEG marker codes and the logic for turning a raw byte into one.

/// A JPEG marker, as it appears immediately after a `0xFF` prefix byte.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
#[allow(clippy::upper_case_acronyms)]
pub enum Marker {
    /// Start of image, 0xD8
    SOI,
    /// End of image, 0xD9
    EOI,
    /// Start of frame, baseline DCT, 0xC0
    SOF0,
    /// Start of frame, extended sequential DCT, 0xC1 (unsupported)
    SOF1,
    /// Start of frame, progressive DCT, 0xC2
    SOF2,
    /// Define Huffman table(s), 0xC4
    DHT,
    /// Define quantization table(s), 0xDB
    DQT,
    /// Define restart interval, 0xDD
    DRI,
    /// Start of scan, 0xDA
    SOS,
    /// Restart marker 0..=7, 0xD0..=0xD7
    RST(u8),
    /// Application segment, 0xE0..=0xEF
    APP(u8),
    /// Comment segment, 0xFE
    COM,
    /// Anything else we don't need to special-case, kept for diagnostics.
    Other(u8),
}

impl Marker {
    /// Build a marker from the byte that follows a `0xFF` prefix.
    ///
    /// Returns `None` for `0x00` and `0xFF`, neither of which is a real
    /// marker (the former is byte-stuffing, the latter is a fill byte).
    pub fn from_u8(byte: u8) -> Option<Marker> {
        match byte {
            0x00 | 0xFF => None,
            0xD8 => Some(Marker::SOI),
            0xD9 => Some(Marker::EOI),
            0xC0 => Some(Marker::SOF0),
            0xC1 => Some(Marker::SOF1),
            0xC2 => Some(Marker::SOF2),
            0xC4 => Some(Marker::DHT),
            0xDB => Some(Marker::DQT),
            0xDD => Some(Marker::DRI),
            0xDA => Some(Marker::SOS),
            0xD0..=0xD7 => Some(Marker::RST(byte - 0xD0)),
            0xE0..=0xEF => Some(Marker::APP(byte - 0xE0)),
            0xFE => Some(Marker::COM),
            other => Some(Marker::Other(other)),
        }
    }
}
