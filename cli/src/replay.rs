//! Offline rendering of a captured draw stream.
//!
//! Each input line is either a bare draw op or a full wire frame. `draw`
//! frames paint, `clear` frames wipe the board, and every other event, blank
//! line, or non-object line is skipped.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use canvas::raster::Pixmap;
use canvas::render::draw_op;
use canvas::surface::Surface;
use frames::{DrawOp, Frame};
use serde_json::Value;
use tracing::info;

use crate::{CliError, ReplayArgs};

/// One parsed input line.
#[derive(Debug, PartialEq)]
enum Entry {
    Draw(DrawOp),
    Clear,
}

#[derive(Debug, Default, PartialEq, Eq)]
struct ReplayStats {
    drawn: usize,
    cleared: usize,
    skipped: usize,
}

pub(crate) fn run(args: &ReplayArgs) -> Result<(), CliError> {
    let reader: Box<dyn BufRead> = if args.input == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        Box::new(BufReader::new(File::open(&args.input)?))
    };

    let mut pixmap = Pixmap::new(args.width, args.height);
    let stats = replay(reader, &mut pixmap)?;
    pixmap.save_png(&args.out)?;

    info!(out = %args.out.display(), drawn = stats.drawn, cleared = stats.cleared, skipped = stats.skipped, "replay complete");
    eprintln!("replayed {} ops ({} clears, {} skipped) -> {}", stats.drawn, stats.cleared, stats.skipped, args.out.display());
    Ok(())
}

fn replay(reader: impl BufRead, pixmap: &mut Pixmap) -> Result<ReplayStats, CliError> {
    let mut stats = ReplayStats::default();
    for (index, line) in reader.lines().enumerate() {
        match parse_line(&line?).map_err(|source| CliError::BadLine { line: index + 1, source })? {
            Some(Entry::Draw(op)) => {
                draw_op(pixmap, &op);
                stats.drawn += 1;
            }
            Some(Entry::Clear) => {
                pixmap.fill_background();
                stats.cleared += 1;
            }
            None => stats.skipped += 1,
        }
    }
    Ok(stats)
}

fn parse_line(line: &str) -> Result<Option<Entry>, serde_json::Error> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let value = serde_json::from_str::<Value>(trimmed)?;
    let Some(map) = value.as_object() else {
        return Ok(None);
    };

    if map.contains_key("event") {
        return Ok(match serde_json::from_value::<Frame>(value)? {
            Frame::Draw(frame) => Some(Entry::Draw(frame.op)),
            Frame::Clear(_) => Some(Entry::Clear),
            _ => None,
        });
    }
    serde_json::from_value::<DrawOp>(value).map(|op| Some(Entry::Draw(op)))
}
