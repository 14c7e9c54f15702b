// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::frame::Frame;
use crate::utils::*;
use crate::AnimError;
use crate::AnimResult;
use crate::PixelFormat;

use std::fs::File;

use super::Writer;

/// Writes composited frames as 8-bit RGBA PNG files.
#[derive(Default)]
pub struct PngWriter;

impl Writer for PngWriter {
    fn write_frame(&mut self, file: &mut File, frame: &Frame) -> AnimResult<()> {
        if frame.format != PixelFormat::Rgba {
            return AnimError::invalid_input("only RGBA frames can be written as PNG");
        }
        let mut encoder = png::Encoder::new(file, frame.width, frame.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().or(AnimError::invalid_input(
            "Could not write the PNG header",
        ))?;
        let width_bytes = usize_from_u32(frame.width)? * 4;
        let mut rgba_pixel_buffer: Vec<u8> = Vec::with_capacity(width_bytes * frame.height as usize);
        for y in 0..frame.height {
            rgba_pixel_buffer.extend_from_slice(frame.row(y)?);
        }
        writer
            .write_image_data(&rgba_pixel_buffer)
            .or(AnimError::invalid_input("Could not write PNG image data"))?;
        writer
            .finish()
            .or(AnimError::invalid_input("Could not finish writing the PNG"))?;
        Ok(())
    }
}
