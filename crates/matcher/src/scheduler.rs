//! Fork-join scan of one historical table against the daily table.
//!
//! The table is cut into `ceil(n / workers)`-row contiguous blocks. Each block
//! is scanned on the engine's bounded pool and the per-block outputs are joined
//! in block order, so output order depends only on input order and block size.

use rayon::prelude::*;

use crate::error::MatchError;
use crate::model::{DailyTable, Row};
use crate::policy::Policy;

/// Progress for one finished block, reported from the worker that scanned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkReport {
    pub index: usize,
    pub rows: usize,
    pub matches: usize,
}

pub struct ChunkScheduler {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for ChunkScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkScheduler")
            .field("workers", &self.workers)
            .finish()
    }
}

/// Requested worker count, or the available hardware parallelism. Never 0.
pub fn resolve_workers(requested: Option<usize>) -> usize {
    requested
        .filter(|&n| n > 0)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
        .max(1)
}

/// Rows per block for `n` rows over `workers` workers (capped at `n`).
pub fn block_size(n: usize, workers: usize) -> usize {
    if n == 0 {
        return 0;
    }
    n.div_ceil(workers.clamp(1, n))
}

impl ChunkScheduler {
    pub fn new(workers: Option<usize>) -> Result<Self, MatchError> {
        let workers = resolve_workers(workers);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("zmatch-worker-{i}"))
            .build()
            .map_err(|e| MatchError::WorkerPool(e.to_string()))?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Scan `historical` against `daily`. Returns matched rows in block order;
    /// `on_chunk` is called once per block, from the worker thread.
    pub fn run<P, F>(
        &self,
        historical: &[Row],
        daily: &DailyTable<'_>,
        policy: &P,
        on_chunk: &F,
    ) -> Vec<Row>
    where
        P: Policy,
        F: Fn(&ChunkReport) + Sync,
    {
        let size = block_size(historical.len(), self.workers);
        if size == 0 {
            return Vec::new();
        }

        let blocks: Vec<Vec<Row>> = self.pool.install(|| {
            historical
                .par_chunks(size)
                .enumerate()
                .map(|(index, block)| {
                    let matches = scan_block(block, daily, policy);
                    on_chunk(&ChunkReport {
                        index,
                        rows: block.len(),
                        matches: matches.len(),
                    });
                    matches
                })
                .collect()
        });

        blocks.into_iter().flatten().collect()
    }
}

/// Sequential scan of one block: each historical row is decoded once, then
/// tested against every daily record in order.
pub fn scan_block<P: Policy>(block: &[Row], daily: &DailyTable<'_>, policy: &P) -> Vec<Row> {
    let mut out = Vec::new();

    for hist_row in block {
        let Some(record) = policy.prepare(hist_row) else {
            continue;
        };

        for daily_record in &daily.records {
            if policy.matches(daily_record, &record) {
                tracing::trace!(daily_row = daily_record.row_index, id = %daily_record.id(), "match");
                let mut row = daily.raw_row(daily_record).clone();
                row.extend_from_slice(hist_row);
                out.push(row);
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
