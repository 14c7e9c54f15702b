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

use clap::Parser;

use flipbook::decoder::*;
use flipbook::frame::Frame;
use flipbook::packet::Packet;
use flipbook::source::SourceChoice;
use flipbook::utils::writer::png::PngWriter;
use flipbook::utils::writer::Writer;
use flipbook::*;

use std::fs::File;
use std::path::PathBuf;

fn source_parser(s: &str) -> Result<SourceChoice, String> {
    match s {
        "auto" => Ok(SourceChoice::Auto),
        "webp" => Ok(SourceChoice::Webp),
        "gif" => Ok(SourceChoice::Gif),
        _ => Err("Value must be one of auto, webp or gif".into()),
    }
}

#[derive(Parser)]
struct CommandLineArgs {
    /// Honor the loop count declared by the file instead of playing it once
    #[arg(long, default_value = "false")]
    no_ignore_loop: bool,

    /// Stop after this many frames (0 means no limit). Needed to bound files
    /// that loop forever when --no-ignore-loop is passed
    #[arg(long, default_value = "0")]
    max_frames: u64,

    /// Frame source to use
    #[arg(long, default_value = "auto", value_parser = source_parser)]
    source: SourceChoice,

    /// Print stream information and one line per frame
    #[arg(short = 'i', long, default_value = "false")]
    info: bool,

    /// Directory in which every decoded frame is saved as frame_NNNN.png
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Input animated image (WebP or GIF)
    #[arg(allow_hyphen_values = false)]
    input_file: PathBuf,
}

fn print_stream_info(decoder: &Decoder) {
    let loops = match decoder.loop_target() {
        Some(0) => "Infinite".to_string(),
        Some(count) => format!("{count}"),
        None => "Unknown".to_string(),
    };
    let declared = match decoder.source_info() {
        Some(info) if info.loop_count == 0 => "Infinite".to_string(),
        Some(info) => format!("{}", info.loop_count),
        None => "Unknown".to_string(),
    };
    println!(" * Resolution     : {}x{}", decoder.width(), decoder.height());
    println!(" * Format         : {:#?}", decoder.pixel_format());
    println!(" * Declared loops : {declared}");
    println!(" * Playing loops  : {loops}");
}

fn run(args: &CommandLineArgs) -> AnimResult<()> {
    let data = std::fs::read(&args.input_file).or(Err(AnimError::InvalidInput(format!(
        "Cannot open input file {}",
        args.input_file.display()
    ))))?;
    let settings = Settings {
        ignore_loop: !args.no_ignore_loop,
        source_choice: args.source,
        ..Default::default()
    };
    let mut decoder = Decoder::create(settings)?;
    let mut writer = PngWriter;
    let mut frame = Frame::default();
    let mut packet = Packet::from(data);
    let mut index: u64 = 0;
    while args.max_frames == 0 || index < args.max_frames {
        let status = decoder.decode_step(&packet, &mut frame)?;
        if index == 0 {
            packet = Packet::empty();
            if args.info {
                println!("Animation: {}", args.input_file.display());
                print_stream_info(&decoder);
            }
        }
        if status == DecodeStatus::EndOfStream {
            break;
        }
        if args.info {
            println!(
                "     * Decoded frame [{index}] [pts {} ms] [pass {}] [{}x{}]",
                frame.pts,
                decoder.loops_completed() + 1,
                frame.width,
                frame.height
            );
        }
        if let Some(output_dir) = &args.output_dir {
            let path = output_dir.join(format!("frame_{index:04}.png"));
            let mut file = File::create(&path).or(Err(AnimError::InvalidInput(format!(
                "Could not open output file {}",
                path.display()
            ))))?;
            writer.write_frame(&mut file, &frame)?;
        }
        index += 1;
    }
    decoder.close();
    println!(
        "Decoded {index} frame{} from {}",
        if index == 1 { "" } else { "s" },
        args.input_file.display()
    );
    Ok(())
}

fn main() {
    env_logger::init();
    let args = CommandLineArgs::parse();
    if let Err(err) = run(&args) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}
