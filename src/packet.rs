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

use std::sync::Arc;

/// Complete container bytes. Shared read-only between the decoder session and
/// its frame source for as long as either is alive.
pub type Payload = Arc<[u8]>;

/// Input handed to [`crate::decoder::Decoder::decode_step`].
///
/// The first packet of a stream carries the whole container, every later one
/// is empty.
#[derive(Clone, Debug, Default)]
pub struct Packet {
    data: Option<Payload>,
}

impl Packet {
    pub fn new(data: Payload) -> Self {
        Self { data: Some(data) }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn size(&self) -> usize {
        self.data.as_ref().map_or(0, |data| data.len())
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn data(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    // Returns a new reference to the backing storage, if there is any data.
    pub(crate) fn payload(&self) -> Option<Payload> {
        match &self.data {
            Some(data) if !data.is_empty() => Some(Arc::clone(data)),
            _ => None,
        }
    }
}

impl From<Vec<u8>> for Packet {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data.into())
    }
}

impl From<&[u8]> for Packet {
    fn from(data: &[u8]) -> Self {
        Self::new(data.into())
    }
}
