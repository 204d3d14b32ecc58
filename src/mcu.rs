/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! MCU scheduling: walks one scan's entropy-coded data in the order the scan
//! demands (interleaved MCUs for a multi-component scan, raw block order for
//! a non-interleaved one) and handles restart marker resynchronization.

use log::trace;

use crate::block;
use crate::decoder::JpegDecoder;
use crate::errors::DecodeErrors;

/// Decode every block of the scan that `decoder`'s current SOS state
/// describes, leaving the bit reader positioned at the marker that follows
/// (typically another SOS or EOI).
pub(crate) fn decode_scan(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    decoder.stream.reset_bits();
    for &index in &decoder.scan_components {
        decoder.components[index].dc_pred = 0;
    }
    decoder.eob_run = 0;

    let mut todo = if decoder.restart_interval > 0 { decoder.restart_interval } else { usize::MAX };
    let mut next_rst = 0u8;

    if decoder.scan_components.len() == 1 {
        decode_non_interleaved(decoder, &mut todo, &mut next_rst)
    } else {
        decode_interleaved(decoder, &mut todo, &mut next_rst)
    }
}

/// Three-component (or, in principle, two) scans: one MCU at a time, in
/// raster order, each MCU covering every scan component's `V_i x H_i` blocks.
fn decode_interleaved(decoder: &mut JpegDecoder, todo: &mut usize, next_rst: &mut u8) -> Result<(), DecodeErrors> {
    let scan_components = decoder.scan_components.clone();

    for mcu_y in 0..decoder.mcu_height {
        for mcu_x in 0..decoder.mcu_width {
            for &component_index in &scan_components {
                let (h_samp, v_samp) = {
                    let component = &decoder.components[component_index];
                    (component.horizontal_sample, component.vertical_sample)
                };
                for cy in 0..v_samp {
                    for cx in 0..h_samp {
                        let block_row = mcu_y * v_samp + cy;
                        let block_col = mcu_x * h_samp + cx;
                        block::decode_block(decoder, component_index, block_row, block_col)?;
                    }
                }
            }

            *todo -= 1;
            if *todo == 0 {
                let is_last_mcu = mcu_y == decoder.mcu_height - 1 && mcu_x == decoder.mcu_width - 1;
                if !is_last_mcu {
                    handle_restart(decoder, next_rst)?;
                }
                *todo = if decoder.restart_interval > 0 { decoder.restart_interval } else { usize::MAX };
            }
        }
    }
    Ok(())
}

/// Single-component scans: walk the component's real (non-MCU-padded) block
/// grid directly, row then column.
fn decode_non_interleaved(decoder: &mut JpegDecoder, todo: &mut usize, next_rst: &mut u8) -> Result<(), DecodeErrors> {
    let component_index = decoder.scan_components[0];
    let (block_width, block_height) = {
        let component = &decoder.components[component_index];
        component.real_block_dims(decoder.width, decoder.height, decoder.h_max, decoder.v_max)
    };

    for block_row in 0..block_height {
        for block_col in 0..block_width {
            block::decode_block(decoder, component_index, block_row, block_col)?;

            *todo -= 1;
            if *todo == 0 {
                let is_last_block = block_row == block_height - 1 && block_col == block_width - 1;
                if !is_last_block {
                    handle_restart(decoder, next_rst)?;
                }
                *todo = if decoder.restart_interval > 0 { decoder.restart_interval } else { usize::MAX };
            }
        }
    }
    Ok(())
}

/// Drop the remaining entropy bits, consume the two-byte `0xFF 0xD{n}`
/// marker that must be sitting at the current byte position, and reset every
/// DC predictor plus the EOB run counter. `next_rst` tracks the 0..=7 cycle
/// the marker's low bits must follow; it wraps on overflow the same way the
/// encoder's counter does.
fn handle_restart(decoder: &mut JpegDecoder, next_rst: &mut u8) -> Result<(), DecodeErrors> {
    decoder.stream.reset_bits();

    let marker_hi = decoder.stream.read_u8()?;
    let marker_lo = decoder.stream.read_u8()?;
    if marker_hi != 0xFF || !(0xD0..=0xD7).contains(&marker_lo) {
        return Err(DecodeErrors::Format(format!(
            "expected restart marker 0xFF 0xD{next_rst:X}, found 0x{marker_hi:02X} 0x{marker_lo:02X}"
        )));
    }
    let seen = marker_lo - 0xD0;
    if seen != *next_rst {
        return Err(DecodeErrors::Format(format!(
            "restart marker out of sequence: expected RST{next_rst}, found RST{seen}"
        )));
    }
    trace!("restart marker RST{seen}");

    *next_rst = (*next_rst + 1) % 8;
    decoder.eob_run = 0;
    for component in &mut decoder.components {
        component.dc_pred = 0;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Component;
    use crate::options::DecoderOptions;

    #[test]
    fn handle_restart_rejects_a_non_marker_byte_pair() {
        let data = [0x00, 0x00];
        let mut decoder = JpegDecoder::new_with_options(DecoderOptions::default(), &data);
        decoder.components.push(Component::new(1, 1, 1, 0).unwrap());
        let mut next_rst = 0u8;
        assert!(handle_restart(&mut decoder, &mut next_rst).is_err());
    }

    #[test]
    fn handle_restart_accepts_rst0_and_resets_predictors() {
        let data = [0xFF, 0xD0];
        let mut decoder = JpegDecoder::new_with_options(DecoderOptions::default(), &data);
        let mut component = Component::new(1, 1, 1, 0).unwrap();
        component.dc_pred = 42;
        decoder.components.push(component);
        let mut next_rst = 0u8;
        handle_restart(&mut decoder, &mut next_rst).unwrap();
        assert_eq!(decoder.components[0].dc_pred, 0);
        assert_eq!(next_rst, 1);
    }
}
