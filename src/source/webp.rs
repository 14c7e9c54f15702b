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

use crate::packet::Payload;
use crate::source::*;
use crate::utils::*;
use crate::*;

use image_webp::LoopCount;
use image_webp::WebPDecoder;

use std::io::Cursor;

type Reader = Cursor<Payload>;

/// Animated (or still) WebP frames, composited by `image-webp`.
pub struct WebpSource {
    // Reads from its own reference to the payload.
    decoder: WebPDecoder<Reader>,
    info: SourceInfo,
    animated: bool,
    has_alpha: bool,
    frame_count: u32,
    next_frame_index: u32,
    timestamp_ms: i64,
    // Canvas as written by the decoder, RGB or RGBA depending on the file.
    canvas: Vec<u8>,
    // RGBA copy of |canvas|, only used when the file has no alpha.
    rgba: Vec<u8>,
}

fn open(payload: Payload) -> AnimResult<WebPDecoder<Reader>> {
    WebPDecoder::new(Cursor::new(payload)).map_err(AnimError::map_resource_exhausted)
}

impl WebpSource {
    pub fn create(payload: Payload, options: &SourceOptions) -> AnimResult<Self> {
        options.validate()?;
        // image-webp decodes on the calling thread, use_threads has nothing
        // to drive here.
        let decoder = open(payload)?;
        let (canvas_width, canvas_height) = decoder.dimensions();
        let animated = decoder.is_animated();
        let has_alpha = decoder.has_alpha();
        let loop_count = if animated {
            match decoder.loop_count() {
                LoopCount::Forever => 0,
                LoopCount::Times(count) => u32::from(count.get()),
            }
        } else {
            // A still image is a single pass of a single frame.
            1
        };
        let frame_count = if animated { decoder.num_frames() } else { 1 };
        if frame_count == 0 {
            return AnimError::resource_exhausted("animated webp has no frames");
        }
        let output_size = decoder
            .output_buffer_size()
            .ok_or(AnimError::ResourceExhausted("webp canvas is too large".into()))?;
        let mut canvas = Vec::new();
        if canvas.try_reserve_exact(output_size).is_err() {
            return AnimError::resource_exhausted("cannot allocate webp canvas");
        }
        canvas.resize(output_size, 0);
        let mut rgba = Vec::new();
        if !has_alpha {
            let rgba_size = canvas_size(canvas_width, canvas_height, 4)?;
            if rgba.try_reserve_exact(rgba_size).is_err() {
                return AnimError::resource_exhausted("cannot allocate webp canvas");
            }
            rgba.resize(rgba_size, 0);
        }
        log::debug!(
            "webp source: {canvas_width}x{canvas_height}, {frame_count} frame(s), animated: \
             {animated}, alpha: {has_alpha}, loop count: {loop_count}"
        );
        Ok(Self {
            decoder,
            info: SourceInfo {
                canvas_width,
                canvas_height,
                loop_count,
            },
            animated,
            has_alpha,
            frame_count,
            next_frame_index: 0,
            timestamp_ms: 0,
            canvas,
            rgba,
        })
    }
}

impl FrameSource for WebpSource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn has_more_frames(&mut self) -> bool {
        self.next_frame_index < self.frame_count
    }

    fn reset(&mut self) -> AnimResult<()> {
        // Rewinds to the first ANMF chunk without parsing the container
        // again. A still image is simply read again.
        if self.animated {
            self.decoder.reset_animation();
        }
        self.next_frame_index = 0;
        self.timestamp_ms = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> AnimResult<SourceFrame<'_>> {
        if !self.has_more_frames() {
            return AnimError::invalid_input("no webp frames remaining in this pass");
        }
        if self.animated {
            let duration_ms = self
                .decoder
                .read_frame(&mut self.canvas)
                .map_err(AnimError::map_invalid_input)?;
            self.timestamp_ms += i64::from(duration_ms);
        } else {
            self.decoder
                .read_image(&mut self.canvas)
                .map_err(AnimError::map_invalid_input)?;
        }
        self.next_frame_index += 1;
        let pixels = if self.has_alpha {
            &self.canvas[..]
        } else {
            rgb_to_rgba(&self.canvas, &mut self.rgba);
            &self.rgba[..]
        };
        Ok(SourceFrame {
            pixels,
            timestamp_ms: self.timestamp_ms,
        })
    }
}
