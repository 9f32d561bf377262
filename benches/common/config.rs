use std::env;

/// Configuration for benchmarks, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Size of each generated document in bytes (from DOC_BYTES env var, defaults to 16 KiB)
    pub document_bytes: usize,

    /// Number of documents per run (from DOC_COUNT env var, defaults to 100)
    pub document_count: usize,

    /// Sample size for benchmarks (from BENCH_SAMPLE_SIZE env var, defaults to 50)
    pub sample_size: usize,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            document_bytes: env::var("DOC_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16 * 1024),
            document_count: env::var("DOC_COUNT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            sample_size: env::var("BENCH_SAMPLE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(50),
        }
    }
}

impl BenchConfig {
    pub fn new() -> Self {
        let config = Self::default();
        eprintln!("Benchmark Configuration:");
        eprintln!("  Document Size: {} bytes", config.document_bytes);
        eprintln!("  Document Count: {}", config.document_count);
        eprintln!("  Sample Size: {}", config.sample_size);
        config
    }
}
