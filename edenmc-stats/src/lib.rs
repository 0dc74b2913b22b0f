use std::time::{Duration, Instant};

/// Why a chunk did not make it into a region file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ReadFailed(String),
    SerializeFailed(String),
    EmptyCompression,
    VerifyFailed(String),
    WriteFailed(String),
    CoordinateOverflow,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::ReadFailed(e) => write!(f, "read failed: {}", e),
            SkipReason::SerializeFailed(e) => write!(f, "serialize failed: {}", e),
            SkipReason::EmptyCompression => write!(f, "compression produced no data"),
            SkipReason::VerifyFailed(e) => write!(f, "verification failed: {}", e),
            SkipReason::WriteFailed(e) => write!(f, "write failed: {}", e),
            SkipReason::CoordinateOverflow => write!(f, "chunk coordinates overflow after recentering"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedChunk {
    pub x: i32,
    pub z: i32,
    pub reason: SkipReason,
}

/// Inclusive bounds of exported chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkRange {
    pub min_x: i32,
    pub max_x: i32,
    pub min_z: i32,
    pub max_z: i32,
}

impl ChunkRange {
    fn include(range: Option<Self>, x: i32, z: i32) -> Self {
        match range {
            None => Self { min_x: x, max_x: x, min_z: z, max_z: z },
            Some(r) => Self {
                min_x: r.min_x.min(x),
                max_x: r.max_x.max(x),
                min_z: r.min_z.min(z),
                max_z: r.max_z.max(z),
            },
        }
    }
}

#[derive(Debug, Default)]
pub struct ConversionStats {
    // Source
    pub columns_in_directory: usize,
    pub columns_read: usize,
    pub total_read_time_us: u64,

    // Chunks
    pub chunks_exported: usize,
    pub skipped: Vec<SkippedChunk>,
    pub chunk_range: Option<ChunkRange>,

    // Output
    pub regions_opened: usize,
    pub total_raw_bytes: u64,
    pub total_compressed_bytes: u64,

    // Detailed Breakdown
    pub total_serialization_us: u64,
    pub total_compression_us: u64,
    pub total_write_us: u64,

    // Session
    pub start_time: Option<Instant>,
}

fn micros(duration: Duration) -> u64 {
    duration.as_micros() as u64
}

impl ConversionStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn record_read(&mut self, duration: Duration) {
        self.columns_read += 1;
        self.total_read_time_us += micros(duration);
    }

    pub fn record_serialization(&mut self, duration: Duration, raw_bytes: usize) {
        self.total_serialization_us += micros(duration);
        self.total_raw_bytes += raw_bytes as u64;
    }

    pub fn record_compression(&mut self, duration: Duration, compressed_bytes: usize) {
        self.total_compression_us += micros(duration);
        self.total_compressed_bytes += compressed_bytes as u64;
    }

    pub fn record_write(&mut self, duration: Duration) {
        self.total_write_us += micros(duration);
    }

    pub fn record_export(&mut self, x: i32, z: i32) {
        self.chunks_exported += 1;
        self.chunk_range = Some(ChunkRange::include(self.chunk_range, x, z));
    }

    pub fn record_skip(&mut self, x: i32, z: i32, reason: SkipReason) {
        self.skipped.push(SkippedChunk { x, z, reason });
    }

    pub fn chunks_skipped(&self) -> usize {
        self.skipped.len()
    }

    /// Compressed size as a percentage of serialized size.
    pub fn compression_ratio(&self) -> f64 {
        if self.total_raw_bytes > 0 {
            self.total_compressed_bytes as f64 / self.total_raw_bytes as f64 * 100.0
        } else {
            0.0
        }
    }

    pub fn generate_report(&self) -> String {
        let uptime = self.start_time.unwrap_or_else(Instant::now).elapsed();
        let exported = self.chunks_exported;
        let per_chunk = |us: u64| {
            if exported > 0 { us as f64 / 1000.0 / exported as f64 } else { 0.0 }
        };
        let read_avg = if self.columns_read > 0 {
            self.total_read_time_us as f64 / 1000.0 / self.columns_read as f64
        } else {
            0.0
        };

        let range = match self.chunk_range {
            Some(r) => format!("x [{}, {}], z [{}, {}]", r.min_x, r.max_x, r.min_z, r.max_z),
            None => "none".to_string(),
        };

        let mut report = format!(
            "EdenMC Conversion Report\n\
             ========================\n\
             Session Duration: {:.2?}\n\n\
             [Source]\n\
             Columns in Directory: {}\n\
             Columns Read: {}\n\
             Avg Read Time: {:.2} ms/column\n\n\
             [Chunks]\n\
             Exported: {}\n\
             Skipped: {}\n\
             Range: {}\n\
               - Serialization: {:.2} ms/chunk\n\
               - Compression: {:.2} ms/chunk\n\
               - Write: {:.2} ms/chunk\n\n\
             [Output]\n\
             Regions: {}\n\
             Serialized: {} bytes\n\
             Compressed: {} bytes ({:.1}%)\n",
            uptime,
            self.columns_in_directory, self.columns_read, read_avg,
            exported, self.chunks_skipped(), range,
            per_chunk(self.total_serialization_us),
            per_chunk(self.total_compression_us),
            per_chunk(self.total_write_us),
            self.regions_opened,
            self.total_raw_bytes,
            self.total_compressed_bytes, self.compression_ratio()
        );

        if !self.skipped.is_empty() {
            report.push_str("\n[Skipped]\n");
            for skip in &self.skipped {
                report.push_str(&format!("({}, {}): {}\n", skip.x, skip.z, skip.reason));
            }
        }
        report
    }
}
