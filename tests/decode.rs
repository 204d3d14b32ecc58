/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Byte-level integration tests: each test hand-assembles a minimal JPEG
//! stream (real marker segments, small enough Huffman tables to hand-encode
//! the entropy data directly) and feeds it through the public entry points.

use zjpeg::{DecoderOptions, JpegDecoder};

/// Appends a marker segment (`0xFF <marker> <len hi> <len lo> <payload>`);
/// the two-byte length is computed from `payload`, never hand-counted.
fn segment(out: &mut Vec<u8>, marker: u8, payload: &[u8]) {
    out.push(0xFF);
    out.push(marker);
    let length = (payload.len() + 2) as u16;
    out.extend_from_slice(&length.to_be_bytes());
    out.extend_from_slice(payload);
}

/// A DQT payload for one 8-bit identity table (every entry `1`) at `id`.
fn dqt_identity(id: u8) -> Vec<u8> {
    let mut payload = vec![id];
    payload.extend(std::iter::repeat(1u8).take(64));
    payload
}

/// A DHT payload for a single table holding one symbol, whose canonical code
/// is therefore the one-bit code `0`.
fn dht_single_symbol(is_ac: bool, id: u8, symbol: u8) -> Vec<u8> {
    let mut payload = vec![(u8::from(is_ac) << 4) | id];
    let mut counts = [0u8; 16];
    counts[0] = 1;
    payload.extend_from_slice(&counts);
    payload.push(symbol);
    payload
}

fn sof0(width: u16, height: u16, components: &[(u8, u8, u8)]) -> Vec<u8> {
    let mut payload = vec![8u8];
    payload.extend_from_slice(&height.to_be_bytes());
    payload.extend_from_slice(&width.to_be_bytes());
    payload.push(components.len() as u8);
    for &(id, sampling, quant) in components {
        payload.push(id);
        payload.push(sampling);
        payload.push(quant);
    }
    payload
}

fn sof2(width: u16, height: u16, components: &[(u8, u8, u8)]) -> Vec<u8> {
    sof0(width, height, components)
}

fn sos(components: &[(u8, u8)], spectral_start: u8, spectral_end: u8, approx: u8) -> Vec<u8> {
    let mut payload = vec![components.len() as u8];
    for &(id, tables) in components {
        payload.push(id);
        payload.push(tables);
    }
    payload.push(spectral_start);
    payload.push(spectral_end);
    payload.push(approx);
    payload
}

/// Packs a sequence of `'0'`/`'1'` characters into bytes, MSB first, zero
/// -padding the final byte out to a full 8 bits.
fn pack_bits(bits: &str) -> Vec<u8> {
    let mut out = Vec::new();
    let mut current = 0u8;
    let mut filled = 0u32;
    for c in bits.chars() {
        current = (current << 1) | u8::from(c == '1');
        filled += 1;
        if filled == 8 {
            out.push(current);
            current = 0;
            filled = 0;
        }
    }
    if filled > 0 {
        current <<= 8 - filled;
        out.push(current);
    }
    out
}

#[test]
fn decodes_a_minimal_single_component_image() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    let mut dht = dht_single_symbol(false, 0, 0);
    dht.extend(dht_single_symbol(true, 0, 0x00));
    segment(&mut data, 0xC4, &dht);
    segment(&mut data, 0xC0, &sof0(1, 1, &[(1, 0x11, 0)]));
    segment(&mut data, 0xDA, &sos(&[(1, 0x00)], 0, 63, 0));
    // DC symbol "0" (category 0, diff 0) then AC symbol "0" (EOB).
    data.extend(pack_bits("00"));
    data.extend_from_slice(&[0xFF, 0xD9]);

    let image = zjpeg::decode_buffer(&data).expect("minimal single-component image should decode");
    assert_eq!((image.width(), image.height()), (1, 1));
    assert_eq!(image.get_pixel(0, 0), (128, 128, 128, 255));
}

#[test]
fn decodes_a_4_2_0_mcu() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    let mut dht = dht_single_symbol(false, 0, 0);
    dht.extend(dht_single_symbol(true, 0, 0x00));
    segment(&mut data, 0xC4, &dht);
    // Y at 2x2 sampling, Cb/Cr at 1x1: one 16x16 MCU covers the whole image.
    segment(
        &mut data,
        0xC0,
        &sof0(16, 16, &[(1, 0x22, 0), (2, 0x11, 0), (3, 0x11, 0)]),
    );
    segment(&mut data, 0xDA, &sos(&[(1, 0x00), (2, 0x00), (3, 0x00)], 0, 63, 0));
    // 6 blocks per MCU (4 Y + 1 Cb + 1 Cr), each "DC 0, AC EOB" = 2 bits.
    data.extend(pack_bits(&"00".repeat(6)));
    data.extend_from_slice(&[0xFF, 0xD9]);

    let image = zjpeg::decode_buffer(&data).expect("a single 4:2:0 MCU should decode");
    assert_eq!((image.width(), image.height()), (16, 16));
    // Every coefficient is zero, so the whole frame is neutral gray.
    for y in 0..16 {
        for x in 0..16 {
            assert_eq!(image.get_pixel(x, y), (128, 128, 128, 255));
        }
    }
}

#[test]
fn decodes_a_progressive_dc_only_scan() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    segment(&mut data, 0xC4, &dht_single_symbol(false, 0, 3));
    segment(&mut data, 0xC2, &sof2(8, 8, &[(1, 0x11, 0)]));
    // Progressive DC first scan: Ss=0, Se=0, Ah=0, Al=0.
    segment(&mut data, 0xDA, &sos(&[(1, 0x00)], 0, 0, 0));
    // Huffman symbol "0" selects category 3, then 3 raw magnitude bits "100" (diff = +4).
    data.extend(pack_bits("0100"));
    data.extend_from_slice(&[0xFF, 0xD9]);

    let image = zjpeg::decode_buffer(&data).expect("a DC-only progressive scan should decode");
    assert_eq!((image.width(), image.height()), (8, 8));
    assert!(image.get_pixel(0, 0).0 > 128, "a positive DC coefficient should brighten the block");
}

#[test]
fn restart_markers_reset_the_dc_predictor() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    let mut dht = dht_single_symbol(false, 0, 3);
    dht.extend(dht_single_symbol(true, 0, 0x00));
    segment(&mut data, 0xC4, &dht);
    segment(&mut data, 0xDD, &4u16.to_be_bytes()); // DRI, restart_interval = 1
    segment(&mut data, 0xC0, &sof0(16, 8, &[(1, 0x11, 0)]));
    segment(&mut data, 0xDA, &sos(&[(1, 0x00)], 0, 63, 0));

    // Block 0: DC category-3 symbol "0", magnitude bits "100" (diff = +4), AC EOB "0".
    data.extend(pack_bits("01000"));
    data.extend_from_slice(&[0xFF, 0xD0]); // RST0
    // Block 1: identical bits. With the predictor reset by RST0 this again
    // decodes to a DC diff of +4 from zero, not +8 from the first block's DC.
    data.extend(pack_bits("01000"));
    data.extend_from_slice(&[0xFF, 0xD9]);

    let image = zjpeg::decode_buffer(&data).expect("a restart-interval-1 scan should decode");
    assert_eq!((image.width(), image.height()), (16, 8));
    let left = image.get_pixel(0, 0);
    let right = image.get_pixel(8, 0);
    assert_eq!(left, right, "both blocks decode the same DC diff once the predictor resets");
    assert!(left.0 > 128, "a positive DC diff should brighten the block above neutral gray");
}

#[test]
fn a_stray_marker_between_scans_is_tolerated_outside_strict_mode() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    let mut dht = dht_single_symbol(false, 0, 0);
    dht.extend(dht_single_symbol(true, 0, 0x00));
    segment(&mut data, 0xC4, &dht);
    segment(&mut data, 0xC0, &sof0(1, 1, &[(1, 0x11, 0)]));
    segment(&mut data, 0xDA, &sos(&[(1, 0x00)], 0, 63, 0));
    data.extend(pack_bits("00"));
    // A restart marker has no business appearing here (no DRI was ever set);
    // non-strict mode treats it as an implicit end of image instead of
    // failing the whole decode.
    data.extend_from_slice(&[0xFF, 0xD0]);

    let image = zjpeg::decode_buffer(&data).expect("a stray marker should not fail a non-strict decode");
    assert_eq!((image.width(), image.height()), (1, 1));
    assert_eq!(image.get_pixel(0, 0), (128, 128, 128, 255));
}

#[test]
fn a_stray_marker_between_scans_is_fatal_in_strict_mode() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    let mut dht = dht_single_symbol(false, 0, 0);
    dht.extend(dht_single_symbol(true, 0, 0x00));
    segment(&mut data, 0xC4, &dht);
    segment(&mut data, 0xC0, &sof0(1, 1, &[(1, 0x11, 0)]));
    segment(&mut data, 0xDA, &sos(&[(1, 0x00)], 0, 63, 0));
    data.extend(pack_bits("00"));
    data.extend_from_slice(&[0xFF, 0xD0]);

    let options = DecoderOptions::default().set_strict_mode(true);
    let mut decoder = JpegDecoder::new_with_options(options, &data);
    decoder.decode().unwrap_err();
}

#[test]
fn decoder_options_reject_oversized_frames() {
    let mut data = vec![0xFF, 0xD8];
    segment(&mut data, 0xDB, &dqt_identity(0));
    let mut dht = dht_single_symbol(false, 0, 0);
    dht.extend(dht_single_symbol(true, 0, 0x00));
    segment(&mut data, 0xC4, &dht);
    segment(&mut data, 0xC0, &sof0(1, 1, &[(1, 0x11, 0)]));

    let options = DecoderOptions::default().set_max_width(0);
    let mut decoder = JpegDecoder::new_with_options(options, &data);
    decoder.decode_headers().unwrap_err();
}
