/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Per-component state: sampling factors, table bindings, coefficient
//! storage, and the decoded sample plane.

use crate::errors::DecodeErrors;

/// One color component (e.g. Y, Cb, or Cr) as declared by SOF.
pub struct Component {
    /// Component id as it appears on the wire (not necessarily 0/1/2).
    pub id: u8,
    /// Horizontal sampling factor, 1..=4.
    pub horizontal_sample: usize,
    /// Vertical sampling factor, 1..=4.
    pub vertical_sample: usize,
    /// Which of the up-to-4 quantization tables this component dequantizes
    /// with.
    pub quantization_table: usize,
    /// Which DC Huffman table id SOS bound to this component (updated by
    /// every SOS segment).
    pub dc_table: usize,
    /// Which AC Huffman table id SOS bound to this component.
    pub ac_table: usize,
    /// Running DC predictor, reset to zero at the start of every scan and
    /// after every restart marker.
    pub dc_pred: i32,
    /// Blocks per MCU row for this component.
    pub blocks_per_mcu_width: usize,
    /// Blocks per MCU column for this component.
    pub blocks_per_mcu_height: usize,
    /// Coefficient storage, one 64-entry block (natural order) per MCU-grid
    /// position, row-major by block row then column.
    pub coefficients: Vec<[i16; 64]>,
    /// MCU-aligned sample plane width (`blocks_per_mcu_width * 8` times the
    /// number of MCU columns).
    pub width_stride: usize,
    /// MCU-aligned sample plane height.
    pub height_stride: usize,
    /// Decoded 8-bit samples, `width_stride * height_stride` of them,
    /// populated by dequantize+IDCT.
    pub samples: Vec<u8>,
}

impl Component {
    /// Validate a component as parsed out of SOF and set up the fields that
    /// don't depend on the frame's MCU geometry yet.
    pub fn new(
        id: u8, horizontal_sample: u8, vertical_sample: u8, quantization_table: u8,
    ) -> Result<Component, DecodeErrors> {
        if !(1..=4).contains(&horizontal_sample) || !(1..=4).contains(&vertical_sample) {
            return Err(DecodeErrors::DqtError(format!(
                "component {id} has sampling factors outside 1..=4"
            )));
        }
        if quantization_table > 3 {
            return Err(DecodeErrors::DqtError(format!(
                "component {id} references quantization table {quantization_table}, only 0..=3 exist"
            )));
        }
        Ok(Component {
            id,
            horizontal_sample: horizontal_sample as usize,
            vertical_sample: vertical_sample as usize,
            quantization_table: quantization_table as usize,
            dc_table: 0,
            ac_table: 0,
            dc_pred: 0,
            blocks_per_mcu_width: 0,
            blocks_per_mcu_height: 0,
            coefficients: Vec::new(),
            width_stride: 0,
            height_stride: 0,
            samples: Vec::new(),
        })
    }

    /// Allocate the coefficient and sample storage once the frame's MCU grid
    /// is known. Called once, right after SOF is fully parsed.
    pub fn allocate(&mut self, mcu_width: usize, mcu_height: usize) {
        self.blocks_per_mcu_width = mcu_width * self.horizontal_sample;
        self.blocks_per_mcu_height = mcu_height * self.vertical_sample;
        let num_blocks = self.blocks_per_mcu_width * self.blocks_per_mcu_height;
        self.coefficients = vec![[0i16; 64]; num_blocks];
        self.width_stride = self.blocks_per_mcu_width * 8;
        self.height_stride = self.blocks_per_mcu_height * 8;
        self.samples = vec![0u8; self.width_stride * self.height_stride];
    }

    /// Pixel width of this component before upsampling (it may be smaller
    /// than `width_stride`, which is rounded up to a whole number of MCUs).
    pub fn real_dimensions(&self, image_width: usize, image_height: usize, h_max: usize, v_max: usize) -> (usize, usize) {
        let w = (image_width * self.horizontal_sample + h_max - 1) / h_max;
        let h = (image_height * self.vertical_sample + v_max - 1) / v_max;
        (w, h)
    }

    /// Block-grid extent for a non-interleaved scan: the real (non-MCU
    /// -padded) pixel extent of this component rounded up to whole 8x8
    /// blocks. Interleaved scans instead walk the full MCU-aligned grid
    /// (`blocks_per_mcu_width`/`height`).
    pub fn real_block_dims(&self, image_width: usize, image_height: usize, h_max: usize, v_max: usize) -> (usize, usize) {
        let (w, h) = self.real_dimensions(image_width, image_height, h_max, v_max);
        ((w + 7) / 8, (h + 7) / 8)
    }

    pub fn block_at(&self, block_row: usize, block_col: usize) -> &[i16; 64] {
        &self.coefficients[block_row * self.blocks_per_mcu_width + block_col]
    }

    pub fn block_at_mut(&mut self, block_row: usize, block_col: usize) -> &mut [i16; 64] {
        &mut self.coefficients[block_row * self.blocks_per_mcu_width + block_col]
    }
}
