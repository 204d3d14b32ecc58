/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Structural failure cases: inputs that must be rejected before any pixel
//! is produced.

use zjpeg::{decode_buffer, DecodeErrors};

#[test]
fn rejects_empty_input() {
    let err = decode_buffer(&[]).unwrap_err();
    assert!(matches!(err, DecodeErrors::FormatStatic(_)));
}

#[test]
fn rejects_a_stream_missing_the_soi_marker() {
    let err = decode_buffer(&[0x00, 0x01, 0x02, 0x03]).unwrap_err();
    assert!(matches!(err, DecodeErrors::FormatStatic(_)));
}

#[test]
fn rejects_end_of_image_before_any_frame() {
    let err = decode_buffer(&[0xFF, 0xD8, 0xFF, 0xD9]).unwrap_err();
    assert!(matches!(err, DecodeErrors::FormatStatic(_)));
}

#[test]
fn rejects_extended_sequential_dct() {
    // SOI, then SOF1 (0xC1): unsupported, and rejected before its body is
    // even read.
    let err = decode_buffer(&[0xFF, 0xD8, 0xFF, 0xC1]).unwrap_err();
    assert!(matches!(err, DecodeErrors::Unsupported(_)));
}

#[test]
fn rejects_a_truncated_marker_segment() {
    // DQT claims a 67-byte segment (1 table) but the stream ends after the
    // info byte.
    let err = decode_buffer(&[0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x43, 0x00]).unwrap_err();
    assert!(matches!(err, DecodeErrors::FormatStatic(_)));
}

#[test]
fn rejects_a_restart_marker_outside_a_scan() {
    let err = decode_buffer(&[0xFF, 0xD8, 0xFF, 0xD0]).unwrap_err();
    assert!(matches!(err, DecodeErrors::FormatStatic(_)));
}

#[test]
fn rejects_sixteen_bit_quantization_precision() {
    // DQT info byte 0x10: precision nibble 1 (16-bit), not supported.
    let data = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x03, 0x10];
    let err = decode_buffer(&data).unwrap_err();
    assert!(matches!(err, DecodeErrors::Unsupported(_)));
}

#[test]
fn rejects_an_out_of_range_quantization_table_id() {
    // DQT info byte 0x04: table id 4, only 0..=3 exist.
    let data = [0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x03, 0x04];
    let err = decode_buffer(&data).unwrap_err();
    assert!(matches!(err, DecodeErrors::DqtError(_)));
}
