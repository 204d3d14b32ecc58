/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Chroma upsampling: repeated 2x doubling in X then Y until a component's
//! effective sampling matches the frame's `h_max`/`v_max`.
//!
//! Only power-of-two sampling ratios are supported, per the explicit license
//! in the design notes to reject rather than implement a general polyphase
//! filter for factor-of-three ratios.

use crate::components::Component;
use crate::errors::DecodeErrors;

/// Double a `width x height` plane horizontally into a `2*width x height`
/// one. Interior outputs are a `(3*near + far + 2) >> 2` weighted average;
/// the first and last column of each row are copied straight from the
/// nearest input sample.
fn double_x(input: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut output = vec![0u8; width * 2 * height];
    for row in 0..height {
        let src = &input[row * width..row * width + width];
        let dst = &mut output[row * width * 2..row * width * 2 + width * 2];

        dst[0] = src[0];
        if width == 1 {
            dst[1] = src[0];
            continue;
        }
        dst[1] = weighted(src[0], src[1]);
        for i in 1..width - 1 {
            dst[2 * i] = weighted(src[i], src[i - 1]);
            dst[2 * i + 1] = weighted(src[i], src[i + 1]);
        }
        dst[2 * (width - 1)] = weighted(src[width - 1], src[width - 2]);
        dst[2 * (width - 1) + 1] = src[width - 1];
    }
    output
}

/// Double a `width x height` plane vertically into a `width x 2*height` one,
/// symmetric to [`double_x`] but operating down columns.
fn double_y(input: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut output = vec![0u8; width * height * 2];
    for col in 0..width {
        let at = |row: usize| input[row * width + col];

        output[col] = at(0);
        if height == 1 {
            output[width + col] = at(0);
            continue;
        }
        output[width + col] = weighted(at(0), at(1));
        for row in 1..height - 1 {
            output[(2 * row) * width + col] = weighted(at(row), at(row - 1));
            output[(2 * row + 1) * width + col] = weighted(at(row), at(row + 1));
        }
        output[(2 * (height - 1)) * width + col] = weighted(at(height - 1), at(height - 2));
        output[(2 * (height - 1) + 1) * width + col] = at(height - 1);
    }
    output
}

#[inline]
fn weighted(near: u8, far: u8) -> u8 {
    ((3 * u32::from(near) + u32::from(far) + 2) >> 2) as u8
}

/// Produce a component's samples upsampled to the frame's `h_max x v_max`
/// sampling, as a plane `mcu_width*h_max*8 x mcu_height*v_max*8` pixels.
/// Components already at full sampling are returned unchanged (cloned).
pub(crate) fn upsample_component(
    component: &Component, h_max: usize, v_max: usize,
) -> Result<Vec<u8>, DecodeErrors> {
    let mut plane = component.samples.clone();
    let mut width = component.width_stride;
    let mut height = component.height_stride;

    let mut h_ratio = h_max / component.horizontal_sample;
    let mut v_ratio = v_max / component.vertical_sample;

    while h_ratio > 1 {
        if h_ratio % 2 != 0 {
            return Err(DecodeErrors::Unsupported(
                "non power-of-two horizontal chroma sampling ratio is not supported".into(),
            ));
        }
        plane = double_x(&plane, width, height);
        width *= 2;
        h_ratio /= 2;
    }
    while v_ratio > 1 {
        if v_ratio % 2 != 0 {
            return Err(DecodeErrors::Unsupported(
                "non power-of-two vertical chroma sampling ratio is not supported".into(),
            ));
        }
        plane = double_y(&plane, width, height);
        height *= 2;
        v_ratio /= 2;
    }

    Ok(plane)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn double_x_copies_edges_and_averages_interior() {
        let input = [0u8, 255, 0];
        let out = double_x(&input, 3, 1);
        assert_eq!(out[0], 0);
        assert_eq!(out[5], 0);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn double_y_copies_edges_and_averages_interior() {
        let input = [0u8, 255, 0];
        let out = double_y(&input, 1, 3);
        assert_eq!(out[0], 0);
        assert_eq!(out[5], 0);
        assert_eq!(out.len(), 6);
    }

    #[test]
    fn single_pixel_plane_doubles_without_panicking() {
        let out = double_x(&[42], 1, 1);
        assert_eq!(out, [42, 42]);
    }
}
