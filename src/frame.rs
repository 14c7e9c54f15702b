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

use crate::utils::*;
use crate::*;

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum PictureType {
    #[default]
    None,
    // Independently presentable picture. Every composited animation frame is
    // one of these.
    Intra,
}

/// A decoded picture as handed back to the host.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub row_bytes: u32,
    /// Presentation timestamp in milliseconds.
    pub pts: i64,
    pub dts: i64,
    pub picture_type: PictureType,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn row(&self, y: u32) -> AnimResult<&[u8]> {
        if y >= self.height {
            return AnimError::invalid_input(format!("row {y} is out of bounds"));
        }
        let row_bytes = usize_from_u32(self.row_bytes)?;
        let start = usize_from_u32(y)? * row_bytes;
        let width_bytes = usize_from_u32(self.width)? * self.format.bytes_per_pixel();
        self.data
            .get(start..start + width_bytes)
            .ok_or(AnimError::InvalidInput("frame buffer is too small".into()))
    }

    // Resizes the backing buffer to hold a tightly packed picture of the
    // given dimensions. Existing allocations are reused when large enough.
    pub fn allocate(&mut self, width: u32, height: u32, format: PixelFormat) -> AnimResult<()> {
        let size = canvas_size(width, height, format.bytes_per_pixel())?;
        let row_bytes = u32::try_from(format.bytes_per_pixel())
            .ok()
            .and_then(|bytes_per_pixel| width.checked_mul(bytes_per_pixel))
            .ok_or(AnimError::ResourceExhausted(format!("row of {width} pixels is too large")))?;
        if self.data.capacity() < size {
            let additional = size - self.data.len();
            if self.data.try_reserve_exact(additional).is_err() {
                return AnimError::resource_exhausted(format!(
                    "cannot allocate {size} bytes for a {width}x{height} frame"
                ));
            }
        }
        self.data.resize(size, 0);
        self.width = width;
        self.height = height;
        self.format = format;
        self.row_bytes = row_bytes;
        Ok(())
    }
}

/// Hands out output buffers to the decoder.
///
/// Returning an error aborts the current decode step before any pixel is
/// written.
pub trait FrameSink {
    fn acquire_frame(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> AnimResult<&mut Frame>;
}

// The simplest host: a single frame that is reused for every step.
impl FrameSink for Frame {
    fn acquire_frame(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> AnimResult<&mut Frame> {
        self.allocate(width, height, format)?;
        Ok(self)
    }
}
