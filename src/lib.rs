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

//! Pull-based decoding of animated images.
//!
//! A [`decoder::Decoder`] is fed the whole container once, in the first
//! [`packet::Packet`], and then hands out one composited RGBA
//! [`frame::Frame`] per call until the animation has played the requested
//! number of times.

pub mod decoder;
pub mod frame;
pub mod packet;
pub mod source;
pub mod utils;

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum PixelFormat {
    #[default]
    None,
    Rgba,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            PixelFormat::None => 0,
            PixelFormat::Rgba => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    #[error("no frame source available for this payload")]
    NoSourceAvailable,
}

pub type AnimResult<T> = Result<T, AnimError>;
