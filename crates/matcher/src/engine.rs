use crate::config::{MatchConfig, PolicyConfig, PolicyKind};
use crate::error::MatchError;
use crate::model::{DailyTable, FileReport, Row, RunMeta, RunOutcome, RunSummary, Table};
use crate::policy::{ColumnPolicy, CountPolicy};
use crate::record::filter_daily;
use crate::scheduler::{block_size, ChunkReport, ChunkScheduler};
use crate::schema::ColumnMap;

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress hooks for a front end. `chunk_finished` is called from worker
/// threads; the others from the thread driving the run.
pub trait RunObserver: Sync {
    fn file_started(&self, _name: &str, _rows: usize) {}
    fn chunk_finished(&self, _name: &str, _chunk: &ChunkReport) {}
    fn file_finished(&self, _report: &FileReport) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Schema, policy and worker pool for a run. Build once, reuse for any
/// number of runs.
#[derive(Debug)]
pub struct MatchEngine {
    columns: ColumnMap,
    policy: PolicyConfig,
    scheduler: ChunkScheduler,
}

impl MatchEngine {
    /// `workers = None` uses the available hardware parallelism.
    pub fn new(config: &MatchConfig, workers: Option<usize>) -> Result<Self, MatchError> {
        let columns = ColumnMap::new(&config.schema)?;
        let scheduler = ChunkScheduler::new(workers)?;
        Ok(Self {
            columns,
            policy: config.policy,
            scheduler,
        })
    }

    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    pub fn policy(&self) -> PolicyConfig {
        self.policy
    }

    pub fn workers(&self) -> usize {
        self.scheduler.workers()
    }

    /// Start a run: slices the daily table once. Feed historical tables to
    /// [`MatchRun::process`] in file order, then call [`MatchRun::finish`].
    pub fn begin<'a>(&'a self, daily: &'a [Row], observer: &'a dyn RunObserver) -> MatchRun<'a> {
        let daily = filter_daily(daily, &self.columns);
        tracing::debug!(
            daily_rows = daily.len(),
            workers = self.workers(),
            policy = %self.policy.kind,
            "run started"
        );
        MatchRun {
            engine: self,
            daily,
            observer,
            rows: Vec::new(),
            files: Vec::new(),
            run_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Run every `(name, table)` in order. For callers that already hold all
    /// historical tables in memory.
    pub fn run<I>(&self, daily: &[Row], historical: I) -> RunOutcome
    where
        I: IntoIterator<Item = (String, Table)>,
    {
        let observer = NoopObserver;
        let mut run = self.begin(daily, &observer);
        for (name, table) in historical {
            run.process(&name, &table);
        }
        run.finish()
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// One in-progress run. Tables are processed one at a time; each is fully
/// joined before `process` returns.
pub struct MatchRun<'a> {
    engine: &'a MatchEngine,
    daily: DailyTable<'a>,
    observer: &'a dyn RunObserver,
    rows: Table,
    files: Vec<FileReport>,
    run_at: String,
}

impl MatchRun<'_> {
    pub fn daily_records(&self) -> usize {
        self.daily.len()
    }

    #[tracing::instrument(level = "debug", skip(self, historical), fields(rows = historical.len()))]
    pub fn process(&mut self, name: &str, historical: &[Row]) -> FileReport {
        self.observer.file_started(name, historical.len());

        let observer = self.observer;
        let on_chunk = |chunk: &ChunkReport| {
            tracing::debug!(
                file = name,
                chunk = chunk.index,
                rows = chunk.rows,
                matches = chunk.matches,
                "chunk finished"
            );
            observer.chunk_finished(name, chunk);
        };

        let engine = self.engine;
        let policy = engine.policy;
        let matches = match policy.kind {
            PolicyKind::Column => {
                let column = ColumnPolicy::new(&engine.columns)
                    .require_same_id(policy.require_same_id)
                    .require_comparable_column(policy.require_comparable_column);
                engine.scheduler.run(historical, &self.daily, &column, &on_chunk)
            }
            PolicyKind::Count => {
                let count = CountPolicy::new(&engine.columns);
                engine.scheduler.run(historical, &self.daily, &count, &on_chunk)
            }
        };

        let size = block_size(historical.len(), engine.workers());
        let report = FileReport {
            name: name.to_string(),
            historical_rows: historical.len(),
            chunks: if size == 0 { 0 } else { historical.len().div_ceil(size) },
            matches: matches.len(),
        };

        tracing::info!(
            file = name,
            rows = report.historical_rows,
            matches = report.matches,
            "historical table processed"
        );

        self.rows.extend(matches);
        self.observer.file_finished(&report);
        self.files.push(report.clone());
        report
    }

    /// Close the run. Fully-empty rows are dropped here.
    pub fn finish(self) -> RunOutcome {
        let mut rows = self.rows;
        let before = rows.len();
        rows.retain(|row| row.iter().any(|cell| !cell.is_empty()));
        let empty_rows_dropped = before - rows.len();

        let summary = RunSummary {
            files_processed: self.files.len(),
            historical_rows: self.files.iter().map(|f| f.historical_rows).sum(),
            matches: rows.len(),
            empty_rows_dropped,
        };

        tracing::info!(
            files = summary.files_processed,
            matches = summary.matches,
            "run finished"
        );

        RunOutcome {
            meta: RunMeta {
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                policy: self.engine.policy,
                workers: self.engine.workers(),
                daily_rows: self.daily.len(),
                run_at: self.run_at,
            },
            summary,
            files: self.files,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
