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

// Not all functions are used from all test targets. So allow dead code in this module.
#![allow(dead_code)]

use flipbook::decoder::*;
use flipbook::frame::*;
use flipbook::packet::*;
use flipbook::source::*;
use flipbook::*;

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Default)]
pub struct Counters {
    pub created: AtomicUsize,
    pub resets: AtomicUsize,
    pub dropped: AtomicUsize,
    pub frames: AtomicUsize,
}

impl Counters {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }
    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::SeqCst)
    }
    pub fn frames(&self) -> usize {
        self.frames.load(Ordering::SeqCst)
    }
}

#[derive(Clone, Debug)]
pub struct MockAnimation {
    pub width: u32,
    pub height: u32,
    pub frame_count: usize,
    pub loop_count: u32,
    pub frame_duration_ms: i64,
    // next_frame() fails when asked for this frame index.
    pub fail_at_frame: Option<usize>,
    pub fail_creation: bool,
    pub fail_reset: bool,
}

impl MockAnimation {
    pub fn new(frame_count: usize, loop_count: u32) -> Self {
        Self {
            width: 4,
            height: 3,
            frame_count,
            loop_count,
            frame_duration_ms: 100,
            fail_at_frame: None,
            fail_creation: false,
            fail_reset: false,
        }
    }
}

// The value every byte of frame |index| is filled with.
pub fn frame_marker(index: usize) -> u8 {
    (index + 1) as u8
}

/// Scripted frame source that plays back uniformly filled canvases.
pub struct MockSource {
    animation: MockAnimation,
    counters: Arc<Counters>,
    // Keeps the payload alive the same way real sources do.
    _payload: Payload,
    next_frame: usize,
    canvas: Vec<u8>,
}

impl FrameSource for MockSource {
    fn info(&self) -> SourceInfo {
        SourceInfo {
            canvas_width: self.animation.width,
            canvas_height: self.animation.height,
            loop_count: self.animation.loop_count,
        }
    }

    fn has_more_frames(&mut self) -> bool {
        self.next_frame < self.animation.frame_count
    }

    fn reset(&mut self) -> AnimResult<()> {
        if self.animation.fail_reset {
            return Err(AnimError::InvalidInput("cannot rewind".into()));
        }
        self.counters.resets.fetch_add(1, Ordering::SeqCst);
        self.next_frame = 0;
        Ok(())
    }

    fn next_frame(&mut self) -> AnimResult<SourceFrame<'_>> {
        let index = self.next_frame;
        if Some(index) == self.animation.fail_at_frame || index >= self.animation.frame_count {
            return Err(AnimError::InvalidInput(format!("cannot produce frame {index}")));
        }
        self.next_frame += 1;
        self.counters.frames.fetch_add(1, Ordering::SeqCst);
        self.canvas.fill(frame_marker(index));
        Ok(SourceFrame {
            pixels: &self.canvas,
            timestamp_ms: self.animation.frame_duration_ms * (index as i64 + 1),
        })
    }
}

impl Drop for MockSource {
    fn drop(&mut self) {
        self.counters.dropped.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn mock_creator(animation: MockAnimation, counters: Arc<Counters>) -> SourceCreator {
    Box::new(move |payload: Payload, options: &SourceOptions| -> AnimResult<GenericSource> {
        assert_eq!(options.color_mode, ColorMode::Rgba);
        assert!(options.use_threads);
        if animation.fail_creation {
            return Err(AnimError::InvalidInput("not an animation".into()));
        }
        counters.created.fetch_add(1, Ordering::SeqCst);
        let size = (animation.width * animation.height * 4) as usize;
        Ok(Box::new(MockSource {
            animation: animation.clone(),
            counters: counters.clone(),
            _payload: payload,
            next_frame: 0,
            canvas: vec![0; size],
        }))
    })
}

pub fn mock_decoder(animation: MockAnimation, ignore_loop: bool) -> (Decoder, Arc<Counters>) {
    init_logging();
    let counters = Arc::new(Counters::default());
    let mut decoder = Decoder::create(Settings {
        ignore_loop,
        ..Default::default()
    })
    .expect("failed to create decoder");
    decoder.set_source_creator(mock_creator(animation, counters.clone()));
    (decoder, counters)
}

pub fn mock_payload() -> Packet {
    Packet::from(b"mock animation payload".to_vec())
}

/// Drives |decoder| the way a host does: the payload first, empty packets
/// afterwards. Returns the frames produced before end of stream, stopping
/// after |max_steps| calls.
pub fn decode_all(decoder: &mut Decoder, first: Packet, max_steps: usize) -> (Vec<Frame>, bool) {
    let mut frames = Vec::new();
    let mut packet = first;
    for _ in 0..max_steps {
        let mut frame = Frame::default();
        let status = decoder.decode_step(&packet, &mut frame).expect("decode step failed");
        packet = Packet::empty();
        match status {
            DecodeStatus::FrameProduced => frames.push(frame),
            DecodeStatus::EndOfStream => return (frames, true),
        }
    }
    (frames, false)
}

pub const PALETTE: [[u8; 3]; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]];

/// Builds a GIF whose frames each fill the whole canvas with one palette
/// color.
pub fn create_gif(
    width: u16,
    height: u16,
    color_indices: &[u8],
    delay_cs: u16,
    repeat: Option<::gif::Repeat>,
) -> Vec<u8> {
    let palette: Vec<u8> = PALETTE.iter().flatten().copied().collect();
    let mut data = Vec::new();
    {
        let mut encoder =
            ::gif::Encoder::new(&mut data, width, height, &palette).expect("gif encoder");
        if let Some(repeat) = repeat {
            encoder.set_repeat(repeat).expect("gif repeat");
        }
        for &color_index in color_indices {
            let frame = ::gif::Frame {
                width,
                height,
                delay: delay_cs,
                buffer: std::borrow::Cow::Owned(vec![
                    color_index;
                    width as usize * height as usize
                ]),
                ..::gif::Frame::default()
            };
            encoder.write_frame(&frame).expect("gif frame");
        }
    }
    data
}

pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    rgba.iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect()
}

/// Encodes a lossless still WebP.
pub fn create_still_webp(width: u32, height: u32, rgba: &[u8]) -> Vec<u8> {
    let mut data = Vec::new();
    image_webp::WebPEncoder::new(&mut data)
        .encode(rgba, width, height, image_webp::ColorType::Rgba8)
        .expect("webp encoder");
    data
}

fn riff_chunk(fourcc: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut chunk = Vec::with_capacity(payload.len() + 9);
    chunk.extend_from_slice(fourcc);
    chunk.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    chunk.extend_from_slice(payload);
    if payload.len() % 2 == 1 {
        chunk.push(0);
    }
    chunk
}

fn u24(value: u32) -> [u8; 3] {
    let bytes = value.to_le_bytes();
    [bytes[0], bytes[1], bytes[2]]
}

// Returns the complete image chunk (header included) of a still WebP file.
fn image_chunk(still: &[u8]) -> Vec<u8> {
    let mut offset = 12;
    while offset + 8 <= still.len() {
        let size = u32::from_le_bytes(still[offset + 4..offset + 8].try_into().unwrap()) as usize;
        let end = offset + 8 + size + (size % 2);
        let fourcc = &still[offset..offset + 4];
        if fourcc == b"VP8L" || fourcc == b"VP8 " {
            return still[offset..end.min(still.len())].to_vec();
        }
        offset = end;
    }
    panic!("no image chunk in webp");
}

/// Wraps full-canvas lossless frames into an animated WebP container. Frames
/// neither blend nor dispose, so every composited canvas equals its frame.
pub fn create_animated_webp(
    width: u32,
    height: u32,
    frames: &[Vec<u8>],
    duration_ms: u32,
    loop_count: u16,
) -> Vec<u8> {
    let mut vp8x = vec![0x10 | 0x02, 0, 0, 0];
    vp8x.extend_from_slice(&u24(width - 1));
    vp8x.extend_from_slice(&u24(height - 1));

    let mut anim = vec![0, 0, 0, 0];
    anim.extend_from_slice(&loop_count.to_le_bytes());

    let mut chunks = riff_chunk(b"VP8X", &vp8x);
    chunks.extend(riff_chunk(b"ANIM", &anim));
    for rgba in frames {
        let mut anmf = Vec::new();
        anmf.extend_from_slice(&u24(0));
        anmf.extend_from_slice(&u24(0));
        anmf.extend_from_slice(&u24(width - 1));
        anmf.extend_from_slice(&u24(height - 1));
        anmf.extend_from_slice(&u24(duration_ms));
        // Do not blend, do not dispose.
        anmf.push(0x02);
        anmf.extend(image_chunk(&create_still_webp(width, height, rgba)));
        chunks.extend(riff_chunk(b"ANMF", &anmf));
    }

    let mut data = Vec::new();
    data.extend_from_slice(b"RIFF");
    data.extend_from_slice(&((chunks.len() + 4) as u32).to_le_bytes());
    data.extend_from_slice(b"WEBP");
    data.extend(chunks);
    data
}
