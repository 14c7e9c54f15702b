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
use crate::source::FrameSource;
use crate::source::SourceFrame;
use crate::source::SourceInfo;
use crate::source::SourceOptions;
use crate::utils::*;
use crate::AnimError;
use crate::AnimResult;

use std::io::Cursor;
use std::sync::Arc;

type Reader = Cursor<Payload>;

/// GIF frames, composited with the disposal rules from `gif-dispose`.
pub struct GifSource {
    payload: Payload,
    decoder: ::gif::Decoder<Reader>,
    screen: gif_dispose::Screen,
    // Frame, or read error, read ahead by has_more_frames().
    pending: Option<AnimResult<::gif::Frame<'static>>>,
    pass_finished: bool,
    info: SourceInfo,
    timestamp_ms: i64,
    rgba: Vec<u8>,
}

fn open(payload: &Payload) -> AnimResult<::gif::Decoder<Reader>> {
    let mut options = ::gif::DecodeOptions::new();
    // gif-dispose does the palette lookup itself.
    options.set_color_output(::gif::ColorOutput::Indexed);
    options
        .read_info(Cursor::new(Arc::clone(payload)))
        .map_err(AnimError::map_resource_exhausted)
}

impl GifSource {
    pub fn create(payload: Payload, options: &SourceOptions) -> AnimResult<Self> {
        options.validate()?;
        let mut decoder = open(&payload)?;
        // The loop extension sits between the header and the first frame, so
        // the repeat count is only known once that frame has been read.
        let first_frame = match decoder.read_next_frame() {
            Ok(Some(frame)) => frame.clone(),
            Ok(None) => return AnimError::resource_exhausted("gif has no frames"),
            Err(err) => {
                return AnimError::resource_exhausted(format!("error reading gif frame: {err}"))
            }
        };
        let canvas_width = u32::from(decoder.width());
        let canvas_height = u32::from(decoder.height());
        // The NETSCAPE extension counts repetitions after the first pass.
        let loop_count = match decoder.repeat() {
            ::gif::Repeat::Infinite => 0,
            ::gif::Repeat::Finite(count) => u32::from(count) + 1,
        };
        let size = canvas_size(canvas_width, canvas_height, 4)?;
        let mut rgba = Vec::new();
        if rgba.try_reserve_exact(size).is_err() {
            return AnimError::resource_exhausted("cannot allocate gif canvas");
        }
        rgba.resize(size, 0);
        log::debug!("gif source: {canvas_width}x{canvas_height}, loop count: {loop_count}");
        Ok(Self {
            screen: gif_dispose::Screen::new_decoder(&decoder),
            payload,
            decoder,
            pending: Some(Ok(first_frame)),
            pass_finished: false,
            info: SourceInfo {
                canvas_width,
                canvas_height,
                loop_count,
            },
            timestamp_ms: 0,
            rgba,
        })
    }

    fn read_next(&mut self) -> AnimResult<Option<::gif::Frame<'static>>> {
        if self.pass_finished {
            return Ok(None);
        }
        match self.decoder.read_next_frame() {
            Ok(Some(frame)) => Ok(Some(frame.clone())),
            Ok(None) => {
                self.pass_finished = true;
                Ok(None)
            }
            Err(err) => {
                self.pass_finished = true;
                AnimError::invalid_input(format!("error reading gif frame: {err}"))
            }
        }
    }
}

impl FrameSource for GifSource {
    fn info(&self) -> SourceInfo {
        self.info
    }

    fn has_more_frames(&mut self) -> bool {
        if self.pending.is_none() {
            // A read error counts as a remaining frame so that next_frame()
            // reports it.
            self.pending = self.read_next().transpose();
        }
        self.pending.is_some()
    }

    fn reset(&mut self) -> AnimResult<()> {
        self.decoder = open(&self.payload)?;
        self.screen = gif_dispose::Screen::new_decoder(&self.decoder);
        self.pending = None;
        self.pass_finished = false;
        self.timestamp_ms = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> AnimResult<SourceFrame<'_>> {
        let frame = match self.pending.take() {
            Some(frame) => frame?,
            None => match self.read_next()? {
                Some(frame) => frame,
                None => return AnimError::invalid_input("no gif frames remaining in this pass"),
            },
        };
        self.screen
            .blit_frame(&frame)
            .or(AnimError::invalid_input("error disposing gif frame"))?;
        let (pixels, width, height) = self.screen.pixels_rgba().to_contiguous_buf();
        if width != usize_from_u32(self.info.canvas_width)?
            || height != usize_from_u32(self.info.canvas_height)?
        {
            return AnimError::invalid_input("width/height mismatch between gif decoder and screen");
        }
        for (dst, src) in self.rgba.chunks_exact_mut(4).zip(pixels.iter()) {
            dst.copy_from_slice(&[src.r, src.g, src.b, src.a]);
        }
        // GIF delay is in centi-seconds.
        self.timestamp_ms += i64::from(frame.delay) * 10;
        Ok(SourceFrame {
            pixels: &self.rgba,
            timestamp_ms: self.timestamp_ms,
        })
    }
}
