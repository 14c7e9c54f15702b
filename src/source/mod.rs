// Copyright 2024 Google LLC
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

#[cfg(feature = "gif")]
pub mod gif;

#[cfg(feature = "webp")]
pub mod webp;

use crate::packet::Payload;
use crate::*;

#[cfg(feature = "gif")]
use crate::source::gif::GifSource;
#[cfg(feature = "webp")]
use crate::source::webp::WebpSource;

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum ColorMode {
    #[default]
    Rgba,
}

/// Preferences passed through to the frame source untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceOptions {
    pub color_mode: ColorMode,
    pub use_threads: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Rgba,
            use_threads: true,
        }
    }
}

impl SourceOptions {
    pub fn validate(&self) -> AnimResult<()> {
        match self.color_mode {
            ColorMode::Rgba => Ok(()),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SourceInfo {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Number of passes declared by the container. 0 means forever.
    pub loop_count: u32,
}

/// One composited canvas.
#[derive(Debug)]
pub struct SourceFrame<'a> {
    /// Tightly packed RGBA, `canvas_width * canvas_height * 4` bytes.
    pub pixels: &'a [u8],
    /// End time of this frame within the current pass, in milliseconds.
    pub timestamp_ms: i64,
}

pub trait FrameSource: Send {
    fn info(&self) -> SourceInfo;
    // Whether the current pass has frames left.
    fn has_more_frames(&mut self) -> bool;
    // Rewinds to the first frame of the animation. The payload is not parsed
    // again from scratch where the backend allows it.
    fn reset(&mut self) -> AnimResult<()>;
    fn next_frame(&mut self) -> AnimResult<SourceFrame<'_>>;
    // Destruction must be implemented using Drop.
}

pub type GenericSource = Box<dyn FrameSource>;

/// Builds a frame source from the stream payload. Used to plug in backends
/// that this crate does not ship.
pub type SourceCreator =
    Box<dyn FnMut(Payload, &SourceOptions) -> AnimResult<GenericSource> + Send>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SourceChoice {
    #[default]
    Auto,
    Webp,
    Gif,
}

impl SourceChoice {
    fn detect(data: &[u8]) -> Option<SourceChoice> {
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(SourceChoice::Webp);
        }
        if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            return Some(SourceChoice::Gif);
        }
        None
    }

    pub fn create(&self, payload: Payload, options: &SourceOptions) -> AnimResult<GenericSource> {
        options.validate()?;
        let choice = match self {
            SourceChoice::Auto => match Self::detect(&payload) {
                Some(choice) => choice,
                None => return AnimError::no_source_available(),
            },
            choice => *choice,
        };
        match choice {
            #[cfg(feature = "webp")]
            SourceChoice::Webp => Ok(Box::new(WebpSource::create(payload, options)?)),
            #[cfg(feature = "gif")]
            SourceChoice::Gif => Ok(Box::new(GifSource::create(payload, options)?)),
            _ => AnimError::no_source_available(),
        }
    }

    pub fn is_available(&self) -> bool {
        match self {
            SourceChoice::Auto => cfg!(any(feature = "webp", feature = "gif")),
            SourceChoice::Webp => cfg!(feature = "webp"),
            SourceChoice::Gif => cfg!(feature = "gif"),
        }
    }
}

/// Returns true if one of the compiled in frame sources recognizes `data`.
pub fn peek_compatible_file_type(data: &[u8]) -> bool {
    SourceChoice::detect(data).is_some_and(|choice| choice.is_available())
}

// Widens tightly packed RGB into RGBA with an opaque alpha channel.
#[cfg(any(feature = "webp", test))]
pub(crate) fn rgb_to_rgba(rgb: &[u8], rgba: &mut [u8]) {
    for (src, dst) in rgb.chunks_exact(3).zip(rgba.chunks_exact_mut(4)) {
        dst[..3].copy_from_slice(src);
        dst[3] = 255;
    }
}
