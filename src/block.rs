/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per-block coefficient decoding: baseline, progressive first-scan, and
//! progressive refinement, for both the DC and AC coefficient ranges.
//!
//! Each routine reads exactly one 8x8 block's worth of symbols (or, for a
//! refinement scan under an active EOB run, zero new symbols) from the bit
//! reader and writes into natural-order coefficient storage via
//! [`crate::misc::ZIGZAG_ORDER`].

use crate::bitstream::BitReader;
use crate::decoder::JpegDecoder;
use crate::errors::DecodeErrors;
use crate::misc::ZIGZAG_ORDER;

/// JPEG's `HUFF_EXTEND`: given a category `s` and its `s` raw bits, recover
/// the signed difference/coefficient value.
#[inline]
fn extend(bits: i32, s: u8) -> i32 {
    if s == 0 {
        return 0;
    }
    if bits < (1 << (s - 1)) {
        bits - (1 << s) + 1
    } else {
        bits
    }
}

/// Dispatch a single block to the baseline or progressive decoder, whichever
/// the frame is using. Called once per block by [`crate::mcu::decode_scan`].
pub(crate) fn decode_block(
    decoder: &mut JpegDecoder, component_index: usize, block_row: usize, block_col: usize,
) -> Result<(), DecodeErrors> {
    if decoder.is_progressive {
        decode_progressive_block(decoder, component_index, block_row, block_col)
    } else {
        decode_baseline_block(decoder, component_index, block_row, block_col)
    }
}

/// Decode one baseline block: DC category + difference, then AC run/category
/// pairs until EOB or ZRL exhausts the 63 AC coefficients.
pub(crate) fn decode_baseline_block(
    decoder: &mut JpegDecoder, component_index: usize, block_row: usize, block_col: usize,
) -> Result<(), DecodeErrors> {
    let JpegDecoder { stream, dc_huffman_tables, ac_huffman_tables, components, .. } = decoder;
    let component = &mut components[component_index];
    let dc_table = dc_huffman_tables[component.dc_table]
        .as_ref()
        .ok_or_else(|| DecodeErrors::DqtError("scan references an undefined DC Huffman table".into()))?;
    let ac_table = ac_huffman_tables[component.ac_table]
        .as_ref()
        .ok_or_else(|| DecodeErrors::DqtError("scan references an undefined AC Huffman table".into()))?;
    let block = component.block_at_mut(block_row, block_col);

    let s = stream.decode_huffman(dc_table)?;
    let diff = if s == 0 { 0 } else { extend(stream.get_bits(u32::from(s)) as i32, s) };
    component.dc_pred = component.dc_pred.wrapping_add(diff);
    block[0] = component.dc_pred as i16;

    let mut k = 1usize;
    while k < 64 {
        let rs = stream.decode_huffman(ac_table)?;
        let r = rs >> 4;
        let s = rs & 0x0F;
        if s == 0 {
            if r == 15 {
                k += 16;
                continue;
            }
            break; // EOB: remainder of the block stays zero.
        }
        k += r as usize;
        if k >= 64 {
            return Err(DecodeErrors::HuffmanDecode(
                "AC coefficient run advanced past the end of the block".into(),
            ));
        }
        let bits = stream.get_bits(u32::from(s)) as i32;
        block[ZIGZAG_ORDER[k]] = extend(bits, s) as i16;
        k += 1;
    }
    Ok(())
}

/// Dispatch a progressive block to the right of the four successive
/// -approximation routines based on the current scan's spectral range and
/// approximation-high bit.
pub(crate) fn decode_progressive_block(
    decoder: &mut JpegDecoder, component_index: usize, block_row: usize, block_col: usize,
) -> Result<(), DecodeErrors> {
    if decoder.spectral_start == 0 {
        if decoder.succ_high == 0 {
            decode_dc_first(decoder, component_index, block_row, block_col)
        } else {
            decode_dc_refine(decoder, component_index, block_row, block_col)
        }
    } else if decoder.succ_high == 0 {
        decode_ac_first(decoder, component_index, block_row, block_col)
    } else {
        decode_ac_refine(decoder, component_index, block_row, block_col)
    }
}

fn decode_dc_first(
    decoder: &mut JpegDecoder, component_index: usize, block_row: usize, block_col: usize,
) -> Result<(), DecodeErrors> {
    let succ_low = decoder.succ_low;
    let JpegDecoder { stream, dc_huffman_tables, components, .. } = decoder;
    let component = &mut components[component_index];
    let dc_table = dc_huffman_tables[component.dc_table]
        .as_ref()
        .ok_or_else(|| DecodeErrors::DqtError("scan references an undefined DC Huffman table".into()))?;
    let block = component.block_at_mut(block_row, block_col);

    let s = stream.decode_huffman(dc_table)?;
    let diff = if s == 0 { 0 } else { extend(stream.get_bits(u32::from(s)) as i32, s) };
    component.dc_pred = component.dc_pred.wrapping_add(diff);
    block[0] = ((component.dc_pred) << succ_low) as i16;
    Ok(())
}

fn decode_dc_refine(
    decoder: &mut JpegDecoder, component_index: usize, block_row: usize, block_col: usize,
) -> Result<(), DecodeErrors> {
    let succ_low = decoder.succ_low;
    let block = decoder.components[component_index].block_at_mut(block_row, block_col);
    if decoder.stream.get_bits(1) == 1 {
        block[0] |= 1 << succ_low;
    }
    Ok(())
}

/// Progressive AC first scan. On entry, `decoder.eob_run > 0` means a prior
/// block already started a run of all-zero blocks; this block contributes
/// nothing and the run is decremented.
fn decode_ac_first(
    decoder: &mut JpegDecoder, component_index: usize, block_row: usize, block_col: usize,
) -> Result<(), DecodeErrors> {
    if decoder.eob_run > 0 {
        decoder.eob_run -= 1;
        return Ok(());
    }

    let spectral_start = decoder.spectral_start;
    let spectral_end = decoder.spectral_end;
    let succ_low = decoder.succ_low;
    let JpegDecoder { stream, ac_huffman_tables, components, eob_run, .. } = decoder;
    let component = &mut components[component_index];
    let ac_table = ac_huffman_tables[component.ac_table]
        .as_ref()
        .ok_or_else(|| DecodeErrors::DqtError("scan references an undefined AC Huffman table".into()))?;
    let block = component.block_at_mut(block_row, block_col);

    let mut k = spectral_start as usize;
    while k <= spectral_end as usize {
        let rs = stream.decode_huffman(ac_table)?;
        let r = rs >> 4;
        let s = rs & 0x0F;
        if s == 0 {
            if r < 15 {
                *eob_run = (1u32 << r) + stream.get_bits(u32::from(r)) - 1;
                break;
            }
            k += 16;
            continue;
        }
        k += r as usize;
        if k > spectral_end as usize {
            return Err(DecodeErrors::HuffmanDecode(
                "AC coefficient run advanced past the scan's spectral range".into(),
            ));
        }
        let bits = stream.get_bits(u32::from(s)) as i32;
        block[ZIGZAG_ORDER[k]] = (extend(bits, s) << succ_low) as i16;
        k += 1;
    }
    Ok(())
}

/// Progressive AC refinement scan. Every already-nonzero coefficient in
/// `[spectral_start, spectral_end]` may gain one correction bit; newly
/// promoted coefficients are placed at the first zero slot a nonzero
/// Huffman symbol points past.
fn decode_ac_refine(
    decoder: &mut JpegDecoder, component_index: usize, block_row: usize, block_col: usize,
) -> Result<(), DecodeErrors> {
    let spectral_start = decoder.spectral_start;
    let spectral_end = decoder.spectral_end;
    let bit = 1i16 << decoder.succ_low;

    if decoder.eob_run == 0 {
        let JpegDecoder { stream, ac_huffman_tables, components, eob_run, .. } = decoder;
        let component = &mut components[component_index];
        let ac_table = ac_huffman_tables[component.ac_table]
            .as_ref()
            .ok_or_else(|| DecodeErrors::DqtError("scan references an undefined AC Huffman table".into()))?;
        let block = component.block_at_mut(block_row, block_col);

        let mut k = spectral_start as usize;
        while k <= spectral_end as usize {
            let rs = stream.decode_huffman(ac_table)?;
            let mut r = (rs >> 4) as i32;
            let s = rs & 0x0F;

            let mut new_value = 0i16;
            if s == 0 {
                if r < 15 {
                    *eob_run = (1u32 << r) + stream.get_bits(r as u32);
                    refine_existing_run(stream, block, &mut k, spectral_end, bit);
                    *eob_run -= 1;
                    return Ok(());
                }
                // r == 15: a ZRL-style 16 zero-history skip, refining any
                // nonzero coefficients it passes over exactly as the run
                // below does, but with no new coefficient at the end.
            } else {
                new_value = if stream.get_bits(1) == 1 { bit } else { -bit };
            }

            // Advance over already-nonzero coefficients, appending a
            // correction bit to each, until `r` zero coefficients have been
            // skipped (or the new coefficient's slot is reached).
            while k <= spectral_end as usize {
                let coeff = &mut block[ZIGZAG_ORDER[k]];
                if *coeff != 0 {
                    if stream.get_bits(1) == 1 && (*coeff & bit) == 0 {
                        if *coeff >= 0 {
                            *coeff += bit;
                        } else {
                            *coeff -= bit;
                        }
                    }
                } else {
                    if r == 0 {
                        break;
                    }
                    r -= 1;
                }
                k += 1;
            }

            if new_value != 0 && k <= spectral_end as usize {
                block[ZIGZAG_ORDER[k]] = new_value;
            }
            k += 1;
        }
        return Ok(());
    }

    // A pending EOB run: refine this block's already-nonzero coefficients
    // only, then tick the run down.
    let JpegDecoder { stream, components, eob_run, .. } = decoder;
    let component = &mut components[component_index];
    let block = component.block_at_mut(block_row, block_col);
    let mut k = spectral_start as usize;
    refine_existing_run(stream, block, &mut k, spectral_end, bit);
    *eob_run -= 1;
    Ok(())
}

/// Refine already-nonzero coefficients from `*k` to `spectral_end`,
/// inclusive, advancing `*k` past the end. Used for the tail of a
/// newly-started EOB run and for blocks consumed entirely by a
/// previously-started one.
fn refine_existing_run(
    stream: &mut BitReader, block: &mut [i16; 64], k: &mut usize, spectral_end: u8, bit: i16,
) {
    while *k <= spectral_end as usize {
        let coeff = &mut block[ZIGZAG_ORDER[*k]];
        if *coeff != 0 && stream.get_bits(1) == 1 && (*coeff & bit) == 0 {
            if *coeff >= 0 {
                *coeff += bit;
            } else {
                *coeff -= bit;
            }
        }
        *k += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::extend;

    #[test]
    fn extend_maps_bit_patterns_to_the_signed_range() {
        // category 3: 3-bit patterns map to [-7,-4] u [4,7]
        assert_eq!(extend(0b000, 3), -7);
        assert_eq!(extend(0b011, 3), -4);
        assert_eq!(extend(0b100, 3), 4);
        assert_eq!(extend(0b111, 3), 7);
        assert_eq!(extend(0, 0), 0);
    }
}
