/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Byte and bit level access to the compressed stream.
//!
//! A single reader serves both jobs. Header parsing uses the plain byte
//! methods (`read_u8`, `read_u16_be`, `skip`), which never perform
//! byte-stuffing removal because marker bytes must stay visible while we're
//! walking segments. Entropy decoding uses the bit methods, which do remove
//! stuffing as they refill the accumulator.

use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;

/// Reads a JPEG byte stream, exposing both raw byte access (for markers and
/// segments) and a destuffing bit accumulator (for entropy-coded data).
pub struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
    accumulator: u32,
    bits_left: u32,
    /// Set once the bit-level reader has run into a real marker (a `0xFF`
    /// byte followed by anything other than `0x00`). `pos` is left pointing
    /// at that `0xFF` so a caller can read the marker itself with the byte
    /// methods. Further `refill` calls shift in zero bytes instead of
    /// reading past it.
    hit_marker: bool,
}

impl<'a> BitReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        BitReader { data, pos: 0, accumulator: 0, bits_left: 0, hit_marker: false }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    pub fn has_hit_marker(&self) -> bool {
        self.hit_marker
    }

    // ---- raw byte access, used for marker/segment parsing ----

    pub fn read_u8(&mut self) -> Result<u8, DecodeErrors> {
        let byte = *self
            .data
            .get(self.pos)
            .ok_or(DecodeErrors::FormatStatic("unexpected end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_u16_be(&mut self) -> Result<u16, DecodeErrors> {
        let hi = self.read_u8()?;
        let lo = self.read_u8()?;
        Ok(u16::from(hi) << 8 | u16::from(lo))
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeErrors> {
        if self.pos + n > self.data.len() {
            return Err(DecodeErrors::FormatStatic("unexpected end of input"));
        }
        self.pos += n;
        Ok(())
    }

    /// Skip a segment whose length (including the two length bytes
    /// themselves) is the next big-endian u16.
    pub fn skip_segment(&mut self) -> Result<(), DecodeErrors> {
        let length = self.read_u16_be()?;
        if length < 2 {
            return Err(DecodeErrors::FormatStatic("segment length shorter than its own header"));
        }
        self.skip(usize::from(length) - 2)
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), DecodeErrors> {
        if self.pos + buf.len() > self.data.len() {
            return Err(DecodeErrors::FormatStatic("unexpected end of input"));
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }

    // ---- bit access, used for entropy-coded scan data ----

    /// Drop any partially consumed bits and clear the accumulator. Called at
    /// the start of every scan and after every restart marker.
    pub fn reset_bits(&mut self) {
        self.accumulator = 0;
        self.bits_left = 0;
        self.hit_marker = false;
    }

    /// Pull the next destuffed byte out of the entropy-coded data. Runs of
    /// `0xFF` fill bytes are tolerated; only the byte that terminates the
    /// run decides whether this is a stuffed `0xFF` or a real marker.
    fn next_entropy_byte(&mut self) -> u8 {
        if self.hit_marker || self.pos >= self.data.len() {
            self.hit_marker = true;
            return 0;
        }
        let byte = self.data[self.pos];
        if byte != 0xFF {
            self.pos += 1;
            return byte;
        }
        let mut lookahead = self.pos + 1;
        while lookahead < self.data.len() && self.data[lookahead] == 0xFF {
            lookahead += 1;
        }
        if lookahead >= self.data.len() {
            self.hit_marker = true;
            return 0;
        }
        if self.data[lookahead] == 0x00 {
            self.pos = lookahead + 1;
            0xFF
        } else {
            // Real marker. Leave `pos` at the leading 0xFF so the caller can
            // read it back with the byte-level methods.
            self.hit_marker = true;
            0
        }
    }

    /// Refill the accumulator until it holds more than 24 bits.
    pub fn refill(&mut self) {
        while self.bits_left <= 24 {
            let byte = self.next_entropy_byte();
            self.accumulator |= u32::from(byte) << (24 - self.bits_left);
            self.bits_left += 8;
        }
    }

    pub fn bits_available(&self) -> u32 {
        self.bits_left
    }

    pub fn peek_bits(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        if self.bits_left < n {
            self.refill();
        }
        self.accumulator >> (32 - n)
    }

    pub fn consume_bits(&mut self, n: u32) {
        if n == 0 {
            return;
        }
        self.accumulator = self.accumulator.wrapping_shl(n);
        self.bits_left = self.bits_left.saturating_sub(n);
    }

    pub fn get_bits(&mut self, n: u32) -> u32 {
        let value = self.peek_bits(n);
        self.consume_bits(n);
        value
    }

    /// JPEG's signed-integer-of-width-n decode: read `n` bits MSB first; if
    /// the top bit is 1 the bits are the unsigned magnitude directly, if 0
    /// the value is `bits - (2^n - 1)`. Width 0 always yields 0; widths
    /// above 16 never occur in a valid stream.
    pub fn receive_extend(&mut self, n: u8) -> Result<i32, DecodeErrors> {
        if n == 0 {
            return Ok(0);
        }
        if n > 16 {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "category {n} exceeds the 16 bit limit for a coefficient"
            )));
        }
        let value = self.get_bits(u32::from(n)) as i32;
        if value < (1 << (n - 1)) {
            Ok(value - (1 << n) + 1)
        } else {
            Ok(value)
        }
    }

    /// Decode one Huffman symbol using the fast 9-bit table, falling back to
    /// the canonical length scan.
    pub fn decode_huffman(&mut self, table: &HuffmanTable) -> Result<u8, DecodeErrors> {
        self.refill();
        let top16 = self.peek_bits(16);
        let fast_index = (top16 >> 7) as usize;
        let fast_symbol = table.fast[fast_index];
        if fast_symbol != 255 {
            let size = u32::from(table.code_sizes[fast_symbol as usize]);
            if size <= self.bits_left {
                self.consume_bits(size);
                return Ok(table.vals[fast_symbol as usize]);
            }
        }
        let top16 = top16 as i32;
        for size in 10..=16u32 {
            if top16 < table.max_code[size as usize] {
                if size > self.bits_left {
                    return Err(DecodeErrors::HuffmanDecode(
                        "Huffman code is longer than the bits remaining in the stream".into(),
                    ));
                }
                let bits = top16 >> (16 - size);
                let symbol_index = (bits + table.delta[size as usize]) as usize;
                self.consume_bits(size);
                return Ok(table.vals[symbol_index]);
            }
        }
        Err(DecodeErrors::HuffmanDecode("no Huffman code matched a 16 bit prefix".into()))
    }
}
