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

use crate::*;

pub(crate) mod error;
#[cfg(feature = "png")]
pub mod writer;

// Timebases and frame rates are stored as (numerator, denominator). A zero
// denominator is allowed and marks an undefined (variable) rate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UFraction(pub u32, pub u32);

impl UFraction {
    pub fn is_valid(&self) -> AnimResult<()> {
        match self.1 {
            0 => AnimError::invalid_input("fraction has a zero denominator"),
            _ => Ok(()),
        }
    }

    pub fn is_undefined(&self) -> bool {
        self.1 == 0
    }

    pub fn as_f64(&self) -> AnimResult<f64> {
        self.is_valid()?;
        Ok(self.0 as f64 / self.1 as f64)
    }
}

pub(crate) fn usize_from_u32(value: u32) -> AnimResult<usize> {
    usize::try_from(value).or(AnimError::invalid_input("value does not fit in usize"))
}

// Size in bytes of a tightly packed canvas of the given dimensions.
pub(crate) fn canvas_size(width: u32, height: u32, bytes_per_pixel: usize) -> AnimResult<usize> {
    usize_from_u32(width)?
        .checked_mul(usize_from_u32(height)?)
        .and_then(|x| x.checked_mul(bytes_per_pixel))
        .ok_or(AnimError::ResourceExhausted("canvas size overflows usize".into()))
}
