use std::io::{Read, Seek};
use std::path::Path;
use std::time::Instant;

use anyhow::Context;

use edenmc_anvil::compression::{unwrap_and_decompress_chunk, wrap_payload};
use edenmc_anvil::document::verify_chunk_coords;
use edenmc_anvil::{Compressor, RegionDirectory};
use edenmc_eden::{ColumnScratch, EdenWorld};
use edenmc_gen::{ChunkBuilder, EDEN_SECTIONS, translate};
use edenmc_stats::{ConversionStats, SkipReason};

/// Log a progress line every this many exported chunks.
const PROGRESS_INTERVAL: usize = 128;

#[derive(Debug, Clone, Copy, Default)]
pub struct ConvertOptions {
    /// Shift chunks so the player's chunk lands on (0, 0).
    pub recenter: bool,
    /// Decode each payload before it is written.
    pub verify: bool,
}

/// Fills `builder` from one source column.
pub fn fill_chunk(builder: &mut ChunkBuilder, column: &ColumnScratch) {
    builder.clear();
    column.for_each_solid(|x, y, z, id, color| {
        if let Some(block) = translate(id, color) {
            builder.set(x, y, z, block);
        }
    });
}

fn verify_payload(compressed: &[u8], chunk_x: i32, chunk_z: i32) -> anyhow::Result<()> {
    let document = unwrap_and_decompress_chunk(&wrap_payload(compressed))?;
    verify_chunk_coords(&document, chunk_x, chunk_z)
}

/// Converts every column of `world` into region files under `output`.
///
/// Per-chunk failures are logged and recorded as skips; failing to open
/// the output or a region file aborts the run.
pub fn convert<R, C>(
    world: &mut EdenWorld<R>,
    output: &Path,
    compressor: &C,
    options: ConvertOptions,
) -> anyhow::Result<ConversionStats>
where
    R: Read + Seek,
    C: Compressor,
{
    let mut stats = ConversionStats::new();
    stats.columns_in_directory = world.directory().len();

    let (offset_x, offset_z) = if options.recenter { world.player_chunk() } else { (0, 0) };
    log::info!("Chunk offset: ({}, {})", offset_x, offset_z);

    let mut regions = RegionDirectory::create(output)
        .with_context(|| format!("cannot create output world at {}", output.display()))?;

    let mut scratch = ColumnScratch::new();
    let mut builder = ChunkBuilder::new(EDEN_SECTIONS);
    let entries = world.directory().to_vec();

    for entry in &entries {
        let (Some(chunk_x), Some(chunk_z)) = (entry.x.checked_sub(offset_x), entry.z.checked_sub(offset_z)) else {
            log::warn!("Skipping column ({}, {}): coordinates overflow after recentering", entry.x, entry.z);
            stats.record_skip(entry.x, entry.z, SkipReason::CoordinateOverflow);
            continue;
        };

        let start = Instant::now();
        match world.read_column(entry, &mut scratch) {
            Ok(()) => stats.record_read(start.elapsed()),
            Err(e) if !e.is_fatal() => {
                log::warn!("Skipping chunk ({}, {}): {}", chunk_x, chunk_z, e);
                stats.record_skip(chunk_x, chunk_z, SkipReason::ReadFailed(e.to_string()));
                continue;
            }
            Err(e) => return Err(e).context("reading source world"),
        }

        let start = Instant::now();
        fill_chunk(&mut builder, &scratch);
        let document = match builder.build(chunk_x, chunk_z) {
            Ok(document) => document,
            Err(e) => {
                log::warn!("Skipping chunk ({}, {}): {}", chunk_x, chunk_z, e);
                stats.record_skip(chunk_x, chunk_z, SkipReason::SerializeFailed(e.to_string()));
                continue;
            }
        };
        stats.record_serialization(start.elapsed(), document.len());

        let start = Instant::now();
        let compressed = compressor.compress(&document);
        stats.record_compression(start.elapsed(), compressed.len());

        if options.verify && !compressed.is_empty() {
            if let Err(e) = verify_payload(&compressed, chunk_x, chunk_z) {
                log::warn!("Skipping chunk ({}, {}): {}", chunk_x, chunk_z, e);
                stats.record_skip(chunk_x, chunk_z, SkipReason::VerifyFailed(e.to_string()));
                continue;
            }
        }

        let start = Instant::now();
        match regions.write_chunk(chunk_x, chunk_z, &compressed) {
            Ok(Some(location)) => {
                stats.record_write(start.elapsed());
                stats.record_export(chunk_x, chunk_z);
                log::debug!("Chunk ({}, {}) written at {}", chunk_x, chunk_z, location);
            }
            Ok(None) => {
                log::warn!("Skipping chunk ({}, {}): compression produced no data", chunk_x, chunk_z);
                stats.record_skip(chunk_x, chunk_z, SkipReason::EmptyCompression);
                continue;
            }
            Err(e) if e.is_fatal() => {
                log::error!("Cannot write chunk ({}, {}): {}", chunk_x, chunk_z, e);
                return Err(e).context("opening region file");
            }
            Err(e) => {
                log::warn!("Skipping chunk ({}, {}): {}", chunk_x, chunk_z, e);
                stats.record_skip(chunk_x, chunk_z, SkipReason::WriteFailed(e.to_string()));
                continue;
            }
        }

        if stats.chunks_exported % PROGRESS_INTERVAL == 0 {
            log::info!(
                "Exported {} / {} chunks ({} regions)",
                stats.chunks_exported,
                entries.len(),
                regions.len()
            );
        }
    }

    stats.regions_opened = regions.len();
    regions.close().context("closing region files")?;

    match stats.chunk_range {
        Some(r) => log::info!(
            "Exported {} chunks, x [{}, {}], z [{}, {}]",
            stats.chunks_exported, r.min_x, r.max_x, r.min_z, r.max_z
        ),
        None => log::info!("No chunks exported"),
    }
    Ok(stats)
}
