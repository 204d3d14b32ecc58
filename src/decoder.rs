/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Top-level decoder state and the public decode entry points.

use log::{trace, warn};

use crate::bitstream::BitReader;
use crate::components::Component;
use crate::errors::DecodeErrors;
use crate::huffman::HuffmanTable;
use crate::image::RgbaImage;
use crate::marker::Marker;
use crate::misc::FrameKind;
use crate::options::DecoderOptions;
use crate::{headers, mcu};

/// How many quantization/Huffman table ids a JPEG stream may use.
pub(crate) const MAX_TABLES: usize = 4;
/// Component counts this decoder accepts: grayscale or YCbCr.
pub(crate) const SUPPORTED_COMPONENT_COUNTS: [usize; 2] = [1, 3];

/// Owns every piece of state a decode needs: the input reader, the tables
/// DQT/DHT fill in, the per-component block grids SOF allocates, and the
/// scan parameters each SOS updates.
pub struct JpegDecoder<'a> {
    pub(crate) stream: BitReader<'a>,
    pub(crate) options: DecoderOptions,

    pub(crate) quant_tables: [Option<[u16; 64]>; MAX_TABLES],
    pub(crate) dc_huffman_tables: [Option<HuffmanTable>; MAX_TABLES],
    pub(crate) ac_huffman_tables: [Option<HuffmanTable>; MAX_TABLES],

    pub(crate) components: Vec<Component>,
    pub(crate) width: usize,
    pub(crate) height: usize,
    pub(crate) h_max: usize,
    pub(crate) v_max: usize,
    pub(crate) mcu_width: usize,
    pub(crate) mcu_height: usize,

    pub(crate) frame_kind: Option<FrameKind>,
    pub(crate) is_progressive: bool,
    pub(crate) restart_interval: usize,
    pub(crate) num_scans_seen: usize,

    pub(crate) scan_components: Vec<usize>,
    pub(crate) spectral_start: u8,
    pub(crate) spectral_end: u8,
    pub(crate) succ_high: u8,
    pub(crate) succ_low: u8,
    pub(crate) eob_run: u32,

    seen_sof: bool,
    headers_decoded: bool,
}

impl<'a> JpegDecoder<'a> {
    /// Build a decoder over `data` with default options.
    pub fn new(data: &'a [u8]) -> JpegDecoder<'a> {
        JpegDecoder::new_with_options(DecoderOptions::default(), data)
    }

    /// Build a decoder over `data` with caller-supplied limits.
    pub fn new_with_options(options: DecoderOptions, data: &'a [u8]) -> JpegDecoder<'a> {
        JpegDecoder {
            stream: BitReader::new(data),
            options,
            quant_tables: [None; MAX_TABLES],
            dc_huffman_tables: [None, None, None, None],
            ac_huffman_tables: [None, None, None, None],
            components: Vec::new(),
            width: 0,
            height: 0,
            h_max: 1,
            v_max: 1,
            mcu_width: 0,
            mcu_height: 0,
            frame_kind: None,
            is_progressive: false,
            restart_interval: 0,
            num_scans_seen: 0,
            scan_components: Vec::new(),
            spectral_start: 0,
            spectral_end: 63,
            succ_high: 0,
            succ_low: 0,
            eob_run: 0,
            seen_sof: false,
            headers_decoded: false,
        }
    }

    /// Image width in pixels. Only meaningful after [`JpegDecoder::decode_headers`].
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels. Only meaningful after [`JpegDecoder::decode_headers`].
    pub fn height(&self) -> usize {
        self.height
    }

    /// Parse every marker up to and including the entropy-coded scan data,
    /// leaving the decoder positioned to decode pixels. Calling this before
    /// [`JpegDecoder::decode`] is optional; `decode` calls it itself if it
    /// hasn't run yet.
    pub fn decode_headers(&mut self) -> Result<(), DecodeErrors> {
        if self.headers_decoded {
            return Ok(());
        }

        let marker = self
            .stream
            .read_u16_be()
            .map_err(|_| DecodeErrors::FormatStatic("input too short to be a JPEG"))?;
        if marker != 0xFFD8 {
            return Err(DecodeErrors::FormatStatic("missing SOI marker, not a JPEG"));
        }

        loop {
            let byte = self.stream.read_u8()?;
            if byte != 0xFF {
                continue;
            }
            let mut marker_byte = self.stream.read_u8()?;
            while marker_byte == 0xFF {
                marker_byte = self.stream.read_u8()?;
            }
            let marker = Marker::from_u8(marker_byte)
                .ok_or_else(|| DecodeErrors::Format(format!("unknown marker 0xFF{marker_byte:X}")))?;

            match marker {
                Marker::SOI => continue,
                Marker::EOI => {
                    return Err(DecodeErrors::FormatStatic(
                        "hit end of image before any scan was decoded",
                    ));
                }
                Marker::DQT => headers::parse_dqt(self)?,
                Marker::DHT => headers::parse_huffman(self)?,
                Marker::DRI => headers::parse_dri(self)?,
                Marker::SOF0 => headers::parse_start_of_frame(FrameKind::Baseline, self)?,
                Marker::SOF2 => headers::parse_start_of_frame(FrameKind::Progressive, self)?,
                Marker::SOF1 => {
                    return Err(DecodeErrors::Unsupported(
                        "unsupported extended sequential DCT format (SOF1)".into(),
                    ));
                }
                Marker::SOS => {
                    if !self.seen_sof {
                        return Err(DecodeErrors::FormatStatic("SOS marker before SOF"));
                    }
                    headers::parse_sos(self)?;
                    self.headers_decoded = true;
                    return Ok(());
                }
                Marker::RST(_) => {
                    return Err(DecodeErrors::FormatStatic("restart marker outside of a scan"));
                }
                Marker::APP(_) | Marker::COM => {
                    self.stream.skip_segment()?;
                }
                Marker::Other(code) => {
                    return Err(DecodeErrors::Format(format!(
                        "unsupported or unknown marker 0x{code:X}"
                    )));
                }
            }
        }
    }

    /// Decode the full image, running every scan and producing an RGBA
    /// raster at exactly `(width, height)`.
    pub fn decode(&mut self) -> Result<RgbaImage, DecodeErrors> {
        self.decode_headers()?;

        loop {
            mcu::decode_scan(self)?;
            self.num_scans_seen += 1;
            if self.num_scans_seen > self.options.get_max_scans() {
                return Err(DecodeErrors::Format(format!(
                    "progressive image exceeded the {} scan limit",
                    self.options.get_max_scans()
                )));
            }

            match self.advance_to_next_marker()? {
                Marker::EOI => break,
                Marker::SOS => headers::parse_sos(self)?,
                Marker::DHT => headers::parse_huffman(self)?,
                Marker::DQT => headers::parse_dqt(self)?,
                Marker::DRI => headers::parse_dri(self)?,
                Marker::APP(_) | Marker::COM => self.stream.skip_segment()?,
                other => {
                    if self.options.get_strict_mode() {
                        return Err(DecodeErrors::Format(format!(
                            "unexpected marker {other:?} between scans"
                        )));
                    }
                    warn!("unexpected marker {other:?} between scans, possibly corrupt JPEG, stopping decode");
                    break;
                }
            }
        }

        let quant_ids: Vec<usize> = self.components.iter().map(|c| c.quantization_table).collect();
        for (index, quant_id) in quant_ids.into_iter().enumerate() {
            let quant = self.quant_tables[quant_id].ok_or_else(|| {
                DecodeErrors::DqtError(format!("component {index} references an undefined quantization table"))
            })?;
            crate::idct::dequantize_and_idct(&mut self.components[index], &quant);
        }

        crate::image::assemble(self)
    }

    /// Read bytes until the next real marker (tolerating `0xFF` fill bytes)
    /// and return it. Used between scans, where the entropy reader has
    /// already stopped at a marker boundary.
    fn advance_to_next_marker(&mut self) -> Result<Marker, DecodeErrors> {
        loop {
            let byte = self.stream.read_u8()?;
            if byte != 0xFF {
                continue;
            }
            let mut marker_byte = self.stream.read_u8()?;
            while marker_byte == 0xFF {
                marker_byte = self.stream.read_u8()?;
            }
            if marker_byte == 0x00 {
                continue;
            }
            let marker = Marker::from_u8(marker_byte)
                .ok_or_else(|| DecodeErrors::Format(format!("unknown marker 0xFF{marker_byte:X}")))?;
            trace!("marker between scans: {marker:?}");
            return Ok(marker);
        }
    }
}

pub(crate) fn check_component_count(num_components: usize) -> Result<(), DecodeErrors> {
    if !SUPPORTED_COMPONENT_COUNTS.contains(&num_components) {
        return Err(DecodeErrors::Unsupported(format!(
            "{num_components} components in frame, only 1 (grayscale) or 3 (YCbCr) are supported"
        )));
    }
    Ok(())
}

