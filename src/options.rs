/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoder configuration.
//!
//! Options are deliberately small: this decoder has no SIMD paths to toggle
//! and no multi-threading to configure, so the knobs that remain are the
//! ones that protect a caller from a hostile or corrupt input.

/// Tunable limits applied while decoding.
///
/// Construct with [`DecoderOptions::default`] and adjust with the setters,
/// mirroring the builder style used across the rest of this family of
/// decoders.
#[derive(Clone, Copy, Debug)]
pub struct DecoderOptions {
    max_width: usize,
    max_height: usize,
    max_scans: usize,
    strict_mode: bool,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        DecoderOptions {
            max_width: 1 << 16,
            max_height: 1 << 16,
            max_scans: 1 << 10,
            strict_mode: false,
        }
    }
}

impl DecoderOptions {
    /// Create options with default limits.
    pub fn new_fast() -> Self {
        Self::default()
    }

    /// Largest width, in pixels, this decoder will allocate for.
    pub fn get_max_width(&self) -> usize {
        self.max_width
    }

    /// Set the largest width, in pixels, this decoder will allocate for.
    #[must_use]
    pub fn set_max_width(mut self, width: usize) -> Self {
        self.max_width = width;
        self
    }

    /// Largest height, in pixels, this decoder will allocate for.
    pub fn get_max_height(&self) -> usize {
        self.max_height
    }

    /// Set the largest height, in pixels, this decoder will allocate for.
    #[must_use]
    pub fn set_max_height(mut self, height: usize) -> Self {
        self.max_height = height;
        self
    }

    /// Upper bound on the number of SOS scans a progressive image may carry.
    ///
    /// Guards against a crafted stream that alternates DHT/SOS forever.
    pub fn get_max_scans(&self) -> usize {
        self.max_scans
    }

    /// Set the upper bound on the number of SOS scans a progressive image
    /// may carry.
    #[must_use]
    pub fn set_max_scans(mut self, scans: usize) -> Self {
        self.max_scans = scans;
        self
    }

    /// Whether unknown/malformed markers outside APPn/COM should be treated
    /// as fatal even when this decoder could plausibly skip past them.
    pub fn get_strict_mode(&self) -> bool {
        self.strict_mode
    }

    /// Toggle strict mode.
    #[must_use]
    pub fn set_strict_mode(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }
}
