/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Marker segment parsing: DQT, DHT, DRI, SOF0/SOF2, SOS.
//!
//! APPn and COM segments are never routed here; the top-level marker loop in
//! [`crate::decoder`] skips them with [`crate::bitstream::BitReader::skip_segment`]
//! directly, since this decoder extracts no metadata.

use log::trace;

use crate::components::Component;
use crate::decoder::{check_component_count, JpegDecoder, MAX_TABLES};
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::misc::{FrameKind, ZIGZAG_ORDER};

/// **B.2.4.1 Quantization table-specification syntax.** A single DQT segment
/// may carry more than one table back to back; each is consumed until the
/// segment's declared length is exhausted.
pub(crate) fn parse_dqt(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    let mut remaining = i32::from(decoder.stream.read_u16_be()?) - 2;
    if remaining < 0 {
        return Err(DecodeErrors::FormatStatic("DQT segment shorter than its own length field"));
    }

    while remaining > 0 {
        let info = decoder.stream.read_u8()?;
        let precision = info >> 4;
        let table_id = (info & 0x0F) as usize;

        if precision != 0 {
            return Err(DecodeErrors::Unsupported(
                "16-bit quantization tables are not supported, only 8-bit precision".into(),
            ));
        }
        if table_id >= MAX_TABLES {
            return Err(DecodeErrors::DqtError(format!(
                "quantization table id {table_id} out of range, expected 0..=3"
            )));
        }

        let mut raw = [0u8; 64];
        decoder.stream.read_exact(&mut raw)?;
        remaining -= 65;

        let mut natural = [0u16; 64];
        for (zigzag_index, &value) in raw.iter().enumerate() {
            natural[ZIGZAG_ORDER[zigzag_index]] = u16::from(value);
        }
        trace!("assigning quantization table {table_id}");
        decoder.quant_tables[table_id] = Some(natural);
    }

    if remaining != 0 {
        return Err(DecodeErrors::FormatStatic("DQT segment length did not divide evenly into tables"));
    }
    Ok(())
}

/// **B.2.4.2 Huffman table-specification syntax.**
pub(crate) fn parse_huffman(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    let mut remaining = i32::from(decoder.stream.read_u16_be()?) - 2;
    if remaining < 0 {
        return Err(DecodeErrors::FormatStatic("DHT segment shorter than its own length field"));
    }

    while remaining > 16 {
        let info = decoder.stream.read_u8()?;
        let is_ac = (info >> 4) != 0;
        let table_id = (info & 0x0F) as usize;
        if table_id >= MAX_TABLES {
            return Err(DecodeErrors::DqtError(format!(
                "Huffman table id {table_id} out of range, expected 0..=3"
            )));
        }

        let mut counts = [0u8; 16];
        decoder.stream.read_exact(&mut counts)?;
        remaining -= 1 + 16;

        let num_symbols: i32 = counts.iter().map(|&c| i32::from(c)).sum();
        if num_symbols > 256 {
            return Err(DecodeErrors::FormatStatic("Huffman table declares more than 256 symbols"));
        }
        if num_symbols > remaining {
            return Err(DecodeErrors::HuffmanDecode(format!(
                "Huffman table of {num_symbols} symbols exceeds the {remaining} bytes left in DHT"
            )));
        }
        remaining -= num_symbols;

        let mut symbols = vec![0u8; num_symbols as usize];
        decoder.stream.read_exact(&mut symbols)?;

        let table = HuffmanTable::build(&counts, &symbols)?;
        trace!("assigning {} Huffman table {table_id}", if is_ac { "AC" } else { "DC" });
        if is_ac {
            decoder.ac_huffman_tables[table_id] = Some(table);
        } else {
            decoder.dc_huffman_tables[table_id] = Some(table);
        }
    }

    if remaining != 0 {
        return Err(DecodeErrors::FormatStatic("bogus Huffman table definition, trailing bytes left in DHT"));
    }
    Ok(())
}

/// **B.2.4.4 Restart interval definition syntax.**
pub(crate) fn parse_dri(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    let length = decoder.stream.read_u16_be()?;
    if length != 4 {
        return Err(DecodeErrors::FormatStatic("DRI segment length must be 4"));
    }
    decoder.restart_interval = decoder.stream.read_u16_be()? as usize;
    trace!("restart interval set to {}", decoder.restart_interval);
    Ok(())
}

/// **B.2.2 Frame header syntax.** Handles both SOF0 (baseline) and SOF2
/// (progressive); they share every field except the meaning of the marker
/// itself.
pub(crate) fn parse_start_of_frame(kind: FrameKind, decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    if decoder.frame_kind.is_some() {
        return Err(DecodeErrors::FormatStatic("more than one start-of-frame marker in the same stream"));
    }

    let length = decoder.stream.read_u16_be()?;
    let precision = decoder.stream.read_u8()?;
    if precision != 8 {
        return Err(DecodeErrors::Unsupported(format!(
            "{precision}-bit sample precision is not supported, only 8-bit"
        )));
    }

    let height = decoder.stream.read_u16_be()? as usize;
    let width = decoder.stream.read_u16_be()? as usize;
    if width == 0 || height == 0 {
        return Err(DecodeErrors::FormatStatic("image width or height is zero"));
    }
    if width > decoder.options.get_max_width() {
        return Err(DecodeErrors::Format(format!(
            "image width {width} exceeds the configured limit {}",
            decoder.options.get_max_width()
        )));
    }
    if height > decoder.options.get_max_height() {
        return Err(DecodeErrors::Format(format!(
            "image height {height} exceeds the configured limit {}",
            decoder.options.get_max_height()
        )));
    }

    let num_components = decoder.stream.read_u8()? as usize;
    check_component_count(num_components)?;

    let expected_length = 8 + 3 * num_components as u16;
    if length != expected_length {
        return Err(DecodeErrors::Format(format!(
            "start-of-frame length {length} does not match the {expected_length} bytes its component count implies"
        )));
    }

    let mut components = Vec::with_capacity(num_components);
    for _ in 0..num_components {
        let id = decoder.stream.read_u8()?;
        let sampling = decoder.stream.read_u8()?;
        let quant_table = decoder.stream.read_u8()?;
        let horizontal = sampling >> 4;
        let vertical = sampling & 0x0F;
        components.push(Component::new(id, horizontal, vertical, quant_table)?);
    }

    let h_max = components.iter().map(|c| c.horizontal_sample).max().unwrap_or(1);
    let v_max = components.iter().map(|c| c.vertical_sample).max().unwrap_or(1);
    let mcu_pixel_width = 8 * h_max;
    let mcu_pixel_height = 8 * v_max;
    let mcu_width = (width + mcu_pixel_width - 1) / mcu_pixel_width;
    let mcu_height = (height + mcu_pixel_height - 1) / mcu_pixel_height;

    for component in &mut components {
        if (h_max / component.horizontal_sample) * component.horizontal_sample != h_max
            || (v_max / component.vertical_sample) * component.vertical_sample != v_max
        {
            return Err(DecodeErrors::Unsupported(
                "non power-of-two chroma sampling ratio is not supported".into(),
            ));
        }
        component.allocate(mcu_width, mcu_height);
    }

    trace!(
        "frame: {width}x{height}, {num_components} component(s), h_max={h_max} v_max={v_max}, {:?}",
        kind
    );

    decoder.width = width;
    decoder.height = height;
    decoder.h_max = h_max;
    decoder.v_max = v_max;
    decoder.mcu_width = mcu_width;
    decoder.mcu_height = mcu_height;
    decoder.components = components;
    decoder.is_progressive = kind == FrameKind::Progressive;
    decoder.frame_kind = Some(kind);
    decoder.seen_sof = true;

    Ok(())
}

/// **Start of scan.** Fills in the scan's component order, Huffman table
/// bindings, spectral selection, and successive-approximation parameters.
pub(crate) fn parse_sos(decoder: &mut JpegDecoder) -> Result<(), DecodeErrors> {
    let length = decoder.stream.read_u16_be()?;
    let num_scan_components = decoder.stream.read_u8()? as usize;

    if !(1..=3).contains(&num_scan_components) {
        return Err(DecodeErrors::Format(format!(
            "scan declares {num_scan_components} components, expected 1 or 3"
        )));
    }
    let expected_length = 6 + 2 * num_scan_components as u16;
    if length != expected_length {
        return Err(DecodeErrors::Format(format!(
            "start-of-scan length {length} does not match the {expected_length} bytes its component count implies"
        )));
    }

    let mut scan_components = Vec::with_capacity(num_scan_components);
    for _ in 0..num_scan_components {
        let id = decoder.stream.read_u8()?;
        let tables = decoder.stream.read_u8()?;

        let index = decoder
            .components
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DecodeErrors::Format(format!("scan references component id {id} not declared in SOF")))?;

        let component = &mut decoder.components[index];
        component.dc_table = (tables >> 4) as usize;
        component.ac_table = (tables & 0x0F) as usize;
        if component.dc_table >= MAX_TABLES || component.ac_table >= MAX_TABLES {
            return Err(DecodeErrors::DqtError(format!(
                "component {id} references a Huffman table id outside 0..=3"
            )));
        }
        scan_components.push(index);
    }

    let spectral_start = decoder.stream.read_u8()?;
    let spectral_end = decoder.stream.read_u8()?;
    let approx = decoder.stream.read_u8()?;
    let succ_high = approx >> 4;
    let succ_low = approx & 0x0F;

    if spectral_start > 63 || spectral_end > 63 {
        return Err(DecodeErrors::Format(format!(
            "spectral selection {spectral_start}..={spectral_end} out of the 0..=63 range"
        )));
    }
    if spectral_start > spectral_end {
        return Err(DecodeErrors::Format(format!(
            "spectral selection start {spectral_start} greater than end {spectral_end}"
        )));
    }
    if succ_high > 13 || succ_low > 13 {
        return Err(DecodeErrors::Format(format!(
            "successive approximation {succ_high}/{succ_low} out of the 0..=13 range"
        )));
    }

    if !decoder.is_progressive {
        if spectral_start != 0 || spectral_end != 63 || succ_high != 0 || succ_low != 0 {
            return Err(DecodeErrors::Format(
                "baseline scan must cover the full 0..=63 spectral range with no successive approximation".into(),
            ));
        }
    } else if spectral_start == 0 {
        if spectral_end != 0 {
            return Err(DecodeErrors::FormatStatic(
                "progressive DC scan (spectral start 0) must have spectral end 0",
            ));
        }
    } else if num_scan_components != 1 {
        return Err(DecodeErrors::Format(
            "progressive AC scans (spectral start > 0) must be non-interleaved, single component".into(),
        ));
    }

    trace!(
        "scan: components={scan_components:?} ss={spectral_start} se={spectral_end} ah={succ_high} al={succ_low}"
    );

    decoder.scan_components = scan_components;
    decoder.spectral_start = spectral_start;
    decoder.spectral_end = spectral_end;
    decoder.succ_high = succ_high;
    decoder.succ_low = succ_low;
    decoder.eob_run = 0;
    for component in &mut decoder.components {
        component.dc_pred = 0;
    }
    decoder.stream.reset_bits();

    Ok(())
}
