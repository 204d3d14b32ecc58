/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Canonical Huffman table construction and the fast-lookup decode table.

use crate::errors::DecodeErrors;

/// Size of the direct-lookup fast table, indexed by the next 9 bits.
const FAST_BITS: u32 = 9;
const FAST_SIZE: usize = 1 << FAST_BITS;
/// Marks a fast-table slot with no match (code longer than 9 bits).
const NO_FAST_MATCH: u8 = 255;

/// A derived canonical Huffman table, built from the 16 length counts and
/// symbol list that DHT carries on the wire.
///
/// `delta[i]` and `max_code[i]` let the decoder test a 16-bit lookahead
/// window against increasing code lengths without re-deriving anything per
/// symbol; `fast` shortcuts the overwhelmingly common case where the code is
/// 9 bits or shorter.
pub struct HuffmanTable {
    pub(crate) fast: [u8; FAST_SIZE],
    pub(crate) delta: [i32; 18],
    pub(crate) max_code: [i32; 18],
    pub(crate) vals: [u8; 256],
    pub(crate) code_sizes: [u8; 256],
    num_symbols: usize,
}

impl HuffmanTable {
    /// Build a table from DHT's 16 length counts (`bits[i]` = number of
    /// codes of length `i + 1`) and the symbol list in canonical order.
    pub fn build(bits: &[u8; 16], symbols: &[u8]) -> Result<HuffmanTable, DecodeErrors> {
        let num_symbols: usize = bits.iter().map(|&b| b as usize).sum();
        if num_symbols != symbols.len() || num_symbols > 256 {
            return Err(DecodeErrors::DqtError(
                "Huffman table symbol count does not match its length counts".into(),
            ));
        }

        // huffsize[k] = code length assigned to the k-th symbol in `symbols`.
        let mut huffsize = [0u8; 256];
        let mut k = 0usize;
        for (length, &count) in bits.iter().enumerate() {
            for _ in 0..count {
                huffsize[k] = (length + 1) as u8;
                k += 1;
            }
        }

        // huffcode[k] = canonical code assigned to the k-th symbol.
        let mut huffcode = [0u32; 256];
        let mut code: u32 = 0;
        let mut size = huffsize[0];
        let mut k = 0usize;
        while k < num_symbols && huffsize[k] != 0 {
            while k < num_symbols && huffsize[k] == size {
                huffcode[k] = code;
                code += 1;
                k += 1;
            }
            code <<= 1;
            size += 1;
        }

        let mut delta = [0i32; 18];
        let mut max_code = [-1i32; 18];
        let mut min_code = [0u32; 18];
        let mut val_ptr = [0usize; 18];
        let mut p = 0usize;
        for length in 1..=16usize {
            let count = bits[length - 1] as usize;
            if count != 0 {
                val_ptr[length] = p;
                min_code[length] = huffcode[p];
                p += count;
                max_code[length] = huffcode[p - 1] as i32;
                delta[length] = val_ptr[length] as i32 - min_code[length] as i32;
            } else {
                max_code[length] = -1;
            }
        }
        max_code[17] = i32::MAX;

        // max_code is stored shifted so the decoder can compare it directly
        // against a 16-bit lookahead window without shifting at decode time.
        for length in 1..=16usize {
            if max_code[length] != -1 {
                max_code[length] = (max_code[length] + 1) << (16 - length);
            }
        }

        let mut vals = [0u8; 256];
        vals[..num_symbols].copy_from_slice(&symbols[..num_symbols]);

        let mut code_sizes = [0u8; 256];
        code_sizes[..num_symbols].copy_from_slice(&huffsize[..num_symbols]);

        let mut fast = [NO_FAST_MATCH; FAST_SIZE];
        for idx in 0..num_symbols {
            let len = huffsize[idx] as u32;
            if len == 0 || len > FAST_BITS {
                continue;
            }
            let shift = FAST_BITS - len;
            let base = (huffcode[idx] as usize) << shift;
            for fill in 0..(1usize << shift) {
                fast[base + fill] = idx as u8;
            }
        }

        Ok(HuffmanTable { fast, delta, max_code, vals, code_sizes, num_symbols })
    }

    #[cfg(test)]
    pub(crate) fn num_symbols(&self) -> usize {
        self.num_symbols
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitReader;

    /// Three symbols, all canonical codes of length 2: `00`, `01`, `10`.
    /// Concatenating them gives the bit string `000110`, which this test
    /// packs into a byte and feeds back through the bit-level decoder.
    #[test]
    fn canonical_codes_round_trip_through_the_bit_reader() {
        let mut counts = [0u8; 16];
        counts[1] = 3;
        let symbols = [10u8, 20, 30];
        let table = HuffmanTable::build(&counts, &symbols).unwrap();
        assert_eq!(table.num_symbols(), 3);

        let mut reader = BitReader::new(&[0b0001_1000, 0x00]);
        assert_eq!(reader.decode_huffman(&table).unwrap(), 10);
        assert_eq!(reader.decode_huffman(&table).unwrap(), 20);
        assert_eq!(reader.decode_huffman(&table).unwrap(), 30);
    }

    #[test]
    fn rejects_a_symbol_count_mismatch() {
        let mut counts = [0u8; 16];
        counts[0] = 2;
        let symbols = [1u8];
        assert!(HuffmanTable::build(&counts, &symbols).is_err());
    }
}
