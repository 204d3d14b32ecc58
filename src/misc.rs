/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Small shared tables and helpers.

/// Maps a position in zigzag scan order to its natural (row-major) index
/// inside an 8x8 block. The 16 trailing `63` entries absorb an
/// out-of-range write from a miscounted run instead of panicking; callers
/// still validate the zigzag cursor independently before indexing with it.
#[rustfmt::skip]
pub const ZIGZAG_ORDER: [usize; 64 + 16] = [
     0,  1,  8, 16,  9,  2,  3, 10,
    17, 24, 32, 25, 18, 11,  4,  5,
    12, 19, 26, 33, 40, 48, 41, 34,
    27, 20, 13,  6,  7, 14, 21, 28,
    35, 42, 49, 56, 57, 50, 43, 36,
    29, 22, 15, 23, 30, 37, 44, 51,
    58, 59, 52, 45, 38, 31, 39, 46,
    53, 60, 61, 54, 47, 55, 62, 63,
    63, 63, 63, 63, 63, 63, 63, 63,
    63, 63, 63, 63, 63, 63, 63, 63,
];

/// Which Start-of-Frame variant a marker denotes, and whether we implement
/// it.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum FrameKind {
    /// SOF0, sequential DCT with Huffman coding.
    Baseline,
    /// SOF2, progressive DCT with Huffman coding.
    Progressive,
}
