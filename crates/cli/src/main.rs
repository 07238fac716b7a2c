//! Binary entry point for converting lesson subtitles between caption text
//! and the JSON track stored by the backend.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Read, Write};
use std::path::Path;
use subcodec_core::{decode_with_report, encode, track, Decoded, SubtitleSegment};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Command line options for the binary.
#[derive(Parser)]
#[command(about = "Convert lesson subtitles between caption text and JSON")]
struct Cli {
    /// Enable verbose debug and trace logs.
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Turn caption text into a JSON track.
    Decode {
        /// File to read, or `-` for standard input.
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        input: String,
        /// File to write, or `-` for standard output.
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        output: String,
        /// Fail instead of dropping lines that are not captions.
        #[arg(long)]
        strict: bool,
    },
    /// Turn a JSON track into caption text.
    Encode {
        /// File to read, or `-` for standard input.
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        input: String,
        /// File to write, or `-` for standard output.
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        output: String,
    },
    /// Report lines that would be dropped and segments with suspicious values.
    Check {
        /// File to read, or `-` for standard input.
        #[arg(short, long, value_name = "FILE", default_value = "-")]
        input: String,
    },
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read from stdin")?;
    Ok(buffer)
}

fn print_stdout(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{content}").context("failed to write to stdout")
}

/// Read caption text from a file, or from stdin for `-`.
fn read_captions(input: &str) -> Result<Decoded> {
    if input == "-" {
        Ok(decode_with_report(&read_stdin()?))
    } else {
        track::read_text(Path::new(input))
    }
}

/// Read a JSON track from a file, or from stdin for `-`.
fn read_track(input: &str) -> Result<Vec<SubtitleSegment>> {
    if input == "-" {
        track::from_json(&read_stdin()?)
    } else {
        track::load(Path::new(input))
    }
}

fn write_track(output: &str, segments: &[SubtitleSegment]) -> Result<()> {
    if output == "-" {
        print_stdout(&track::to_json(segments)?)
    } else {
        track::save(segments, Path::new(output))?;
        info!("wrote {output}");
        Ok(())
    }
}

fn write_captions(output: &str, segments: &[SubtitleSegment]) -> Result<()> {
    if output == "-" {
        print_stdout(&encode(segments))
    } else {
        track::write_text(segments, Path::new(output))?;
        info!("wrote {output}");
        Ok(())
    }
}

fn warn_skipped(decoded: &Decoded) {
    for line in &decoded.skipped {
        warn!("line {} is not a caption: {:?}", line.line_number, line.content);
    }
}

fn run_decode(input: &str, output: &str, strict: bool) -> Result<()> {
    let decoded = read_captions(input)?;
    warn_skipped(&decoded);
    if strict && !decoded.is_clean() {
        bail!(
            "{} line(s) in '{input}' are not captions",
            decoded.skipped.len()
        );
    }
    info!("decoded {} segments", decoded.segments.len());
    write_track(output, &decoded.segments)
}

fn run_encode(input: &str, output: &str) -> Result<()> {
    let segments =
        read_track(input).with_context(|| format!("failed to parse track '{input}'"))?;
    info!("encoding {} segments", segments.len());
    write_captions(output, &segments)
}

fn run_check(input: &str) -> Result<()> {
    let decoded = read_captions(input)?;
    warn_skipped(&decoded);
    let mut problems = decoded.skipped.len();
    for (i, segment) in decoded.segments.iter().enumerate() {
        for issue in segment.issues() {
            warn!("segment {}: {issue}", i + 1);
            problems += 1;
        }
    }
    if problems > 0 {
        bail!("found {problems} problem(s) in '{input}'");
    }
    info!("{} segments, no problems", decoded.segments.len());
    Ok(())
}

/// Application entry point which parses CLI args and performs actions.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let filter = if cli.debug {
        EnvFilter::default()
            .add_directive("subcodec=trace".parse()?)
            .add_directive("subcodec_core=trace".parse()?)
            .add_directive("info".parse()?)
    } else {
        EnvFilter::default()
            .add_directive("subcodec=info".parse()?)
            .add_directive("subcodec_core=info".parse()?)
            .add_directive("warn".parse()?)
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    match &cli.command {
        Command::Decode {
            input,
            output,
            strict,
        } => run_decode(input, output, *strict),
        Command::Encode { input, output } => run_encode(input, output),
        Command::Check { input } => run_check(input),
    }
}
