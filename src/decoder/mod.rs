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

use crate::frame::*;
use crate::packet::*;
use crate::source::*;
use crate::utils::*;
use crate::*;

use std::sync::Arc;

/// Packet timestamps are in milliseconds.
pub const MILLISECOND_TIMEBASE: UFraction = UFraction(1, 1000);
/// Animation timing is explicit per frame, so there is no fixed frame rate.
pub const UNKNOWN_FRAMERATE: UFraction = UFraction(1, 0);

#[derive(Debug, Clone)]
pub struct Settings {
    /// Play the animation exactly once, whatever loop count the container
    /// declares.
    pub ignore_loop: bool,
    pub source_choice: SourceChoice,
    pub source_options: SourceOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ignore_loop: true,
            source_choice: Default::default(),
            source_options: Default::default(),
        }
    }
}

fn parse_bool(value: &str) -> AnimResult<bool> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => AnimError::invalid_input(format!("invalid boolean value: {value}")),
    }
}

impl Settings {
    /// Sets an option from its string form, the way host option tables
    /// deliver them.
    pub fn set_option(&mut self, key: &str, value: &str) -> AnimResult<()> {
        match key {
            "ignore_loop" => self.ignore_loop = parse_bool(value)?,
            _ => return AnimError::invalid_input(format!("unknown option: {key}")),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    FrameProduced,
    /// The animation has played the requested number of times. Not an error.
    EndOfStream,
}

struct Session {
    // Declared before |payload| so that the source is dropped first.
    source: GenericSource,
    payload: Payload,
    width: u32,
    height: u32,
    // 0 means loop forever.
    loop_target: u32,
    loops_completed: u32,
}

#[derive(Default)]
enum State {
    #[default]
    Uninitialized,
    Active(Box<Session>),
    Closed,
}

/// Decoding session for one animated image stream.
///
/// The first call to [`Decoder::decode_step`] must carry the complete
/// container; every later call passes an empty packet and receives the next
/// composited frame until [`DecodeStatus::EndOfStream`].
#[derive(Default)]
pub struct Decoder {
    pub settings: Settings,
    state: State,
    source_creator: Option<SourceCreator>,
}

impl Decoder {
    pub fn create(settings: Settings) -> AnimResult<Self> {
        if let Err(err) = settings.source_options.validate() {
            return AnimError::resource_exhausted(format!("cannot initialize source options: {err}"));
        }
        log::debug!("Animated image decoder initialized.");
        Ok(Self {
            settings,
            ..Default::default()
        })
    }

    /// Replaces the built-in frame sources. Only effective before the first
    /// decode step.
    pub fn set_source_creator(&mut self, creator: SourceCreator) {
        self.source_creator = Some(creator);
    }

    fn session(&self) -> Option<&Session> {
        match &self.state {
            State::Active(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    /// Canvas width. 0 until the first successful decode step.
    pub fn width(&self) -> u32 {
        self.session().map_or(0, |session| session.width)
    }

    /// Canvas height. 0 until the first successful decode step.
    pub fn height(&self) -> u32 {
        self.session().map_or(0, |session| session.height)
    }

    pub fn pixel_format(&self) -> PixelFormat {
        PixelFormat::Rgba
    }

    pub fn timebase(&self) -> UFraction {
        MILLISECOND_TIMEBASE
    }

    pub fn framerate(&self) -> UFraction {
        UNKNOWN_FRAMERATE
    }

    pub fn source_info(&self) -> Option<SourceInfo> {
        self.session().map(|session| session.source.info())
    }

    /// Number of passes to play before end of stream. `Some(0)` means forever.
    pub fn loop_target(&self) -> Option<u32> {
        self.session().map(|session| session.loop_target)
    }

    pub fn loops_completed(&self) -> u32 {
        self.session().map_or(0, |session| session.loops_completed)
    }

    /// Payload bytes held by the session, if it has been initialized.
    pub fn payload(&self) -> Option<&[u8]> {
        self.session().map(|session| &session.payload[..])
    }

    fn initialize(&mut self, packet: &Packet) -> AnimResult<()> {
        let payload = match packet.payload() {
            Some(payload) => payload,
            None => {
                log::error!("No input data provided on first call.");
                return AnimError::invalid_input("no input data provided on first call");
            }
        };
        let options = self.settings.source_options;
        let source = match &mut self.source_creator {
            Some(creator) => creator(Arc::clone(&payload), &options),
            None => self.settings.source_choice.create(Arc::clone(&payload), &options),
        };
        // On failure |payload| is released on return and the session stays
        // uninitialized.
        let source = match source {
            Ok(source) => source,
            Err(err) => {
                log::error!("Error creating frame source: {err}");
                return AnimError::resource_exhausted(format!("error creating frame source: {err}"));
            }
        };
        let info = source.info();
        let loop_target = if self.settings.ignore_loop { 1 } else { info.loop_count };
        log::debug!(
            "Animation canvas {}x{}, declared loop count {}, playing {} pass(es).",
            info.canvas_width,
            info.canvas_height,
            info.loop_count,
            if loop_target == 0 { "unlimited".to_string() } else { loop_target.to_string() }
        );
        self.state = State::Active(Box::new(Session {
            source,
            payload,
            width: info.canvas_width,
            height: info.canvas_height,
            loop_target,
            loops_completed: 0,
        }));
        Ok(())
    }

    /// Runs one step of the decode protocol.
    ///
    /// On [`DecodeStatus::FrameProduced`] the frame acquired from `sink` holds
    /// the composited RGBA canvas, stamped with its presentation timestamp in
    /// [`MILLISECOND_TIMEBASE`] units.
    pub fn decode_step(
        &mut self,
        packet: &Packet,
        sink: &mut dyn FrameSink,
    ) -> AnimResult<DecodeStatus> {
        if matches!(self.state, State::Uninitialized) {
            self.initialize(packet)?;
        } else if self.is_initialized() && !packet.is_empty() {
            log::debug!("Ignoring {} byte packet, the stream is already loaded.", packet.size());
        }
        let session = match &mut self.state {
            State::Active(session) => session,
            _ => return AnimError::invalid_input("decoder is closed"),
        };

        if !session.source.has_more_frames() {
            session.source.reset()?;
            session.loops_completed = session.loops_completed.saturating_add(1);
        }
        if session.loop_target != 0 && session.loops_completed >= session.loop_target {
            log::debug!("End of animated stream.");
            return Ok(DecodeStatus::EndOfStream);
        }

        let width = session.width;
        let height = session.height;
        let size = canvas_size(width, height, PixelFormat::Rgba.bytes_per_pixel())?;
        let frame = session.source.next_frame().map_err(|err| {
            log::error!("Error getting next frame: {err}");
            match err {
                AnimError::InvalidInput(_) => err,
                _ => AnimError::InvalidInput(err.to_string()),
            }
        })?;
        if frame.pixels.len() < size {
            return AnimError::invalid_input(format!(
                "frame source returned {} bytes, expected {size}",
                frame.pixels.len()
            ));
        }

        let output = match sink.acquire_frame(width, height, PixelFormat::Rgba) {
            Ok(output) if output.data.len() >= size => output,
            Ok(_) => return AnimError::resource_exhausted("output frame buffer is too small"),
            Err(err) => {
                log::error!("Failed to allocate buffer: {err}");
                return AnimError::resource_exhausted(format!("failed to allocate buffer: {err}"));
            }
        };
        output.data[..size].copy_from_slice(&frame.pixels[..size]);
        output.width = width;
        output.height = height;
        output.format = PixelFormat::Rgba;
        output.row_bytes = width.saturating_mul(4);
        output.pts = frame.timestamp_ms;
        output.dts = 0;
        output.picture_type = PictureType::Intra;
        Ok(DecodeStatus::FrameProduced)
    }

    /// Releases the frame source and the payload. Safe to call any number of
    /// times, including before the first decode step.
    pub fn close(&mut self) {
        if self.is_initialized() {
            log::debug!("Closing animated image decoder.");
        }
        self.state = State::Closed;
    }
}
