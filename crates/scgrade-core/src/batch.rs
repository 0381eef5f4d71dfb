//! Batch grading of many attempts on one question.
//!
//! Every job runs on its own copy of the question, so order caching and
//! repair in one job can never be observed by another.

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::attempt::{QuestionAttempt, SubmitOutcome};
use crate::engine::GradingEngine;
use crate::error::{GradingError, Result};
use crate::model::{OutcomeState, Question};
use crate::traits::{RowRef, RowSource, StepData};

/// One learner's tries, to be graded as a single attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub id: String,
    /// Persisted order. Without one a fresh order is created.
    #[serde(default)]
    pub order: Option<String>,
    /// Seed for the fresh order.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Tries in submission order.
    pub responses: Vec<crate::response::Response>,
}

/// Result of one graded job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub job_id: String,
    pub order: String,
    pub edited_question: bool,
    /// Tries recorded as graded.
    pub tries: usize,
    /// Tries dropped as ungradable or unchanged.
    pub rejected: usize,
    pub fraction: f64,
    pub state: OutcomeState,
    pub final_fraction: f64,
    pub summary: String,
}

/// A job that could not be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    pub job_id: String,
    pub error: String,
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub id: Uuid,
    pub question_id: String,
    pub outcomes: Vec<BatchOutcome>,
    pub failures: Vec<BatchFailure>,
    pub duration_ms: u64,
}

impl BatchSummary {
    pub fn mean_final_fraction(&self) -> f64 {
        if self.outcomes.is_empty() {
            return 0.0;
        }
        self.outcomes.iter().map(|o| o.final_fraction).sum::<f64>() / self.outcomes.len() as f64
    }
}

/// Progress reporting trait.
pub trait BatchProgress: Send + Sync {
    fn on_job_complete(&self, outcome: &BatchOutcome);
    fn on_job_error(&self, job_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopProgress;

impl BatchProgress for NoopProgress {
    fn on_job_complete(&self, _: &BatchOutcome) {}
    fn on_job_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Grade every job in `jobs`, at most `parallelism` at a time.
///
/// Jobs run on the blocking thread pool, each with its own copy of the
/// engine and question. `rows` is read once up front and shared as a
/// snapshot. A failing job is logged and reported, never aborting the batch.
/// Outcomes come back in job order.
pub async fn grade_batch(
    engine: &GradingEngine,
    question: &Question,
    rows: &dyn RowSource,
    jobs: Vec<BatchJob>,
    parallelism: usize,
    progress: &dyn BatchProgress,
) -> BatchSummary {
    let start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
    let order_of: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();

    let engine = Arc::new(engine.clone());
    let shared_question = Arc::new(question.clone());
    let snapshot = Arc::new(RowSnapshot::take(rows, question));

    let mut futures = FuturesUnordered::new();
    for job in jobs {
        let semaphore = Arc::clone(&semaphore);
        let engine = Arc::clone(&engine);
        let question = Arc::clone(&shared_question);
        let snapshot = Arc::clone(&snapshot);
        futures.push(async move {
            let job_id = job.id.clone();
            let result = match semaphore.acquire_owned().await {
                Ok(permit) => {
                    let task = tokio::task::spawn_blocking(move || {
                        let _permit = permit;
                        grade_job(&engine, &question, snapshot.as_ref(), job)
                    });
                    match task.await {
                        Ok(result) => result,
                        Err(e) => Err(GradingError::Host(anyhow::anyhow!("grading task failed: {e}"))),
                    }
                }
                Err(_) => Err(GradingError::Host(anyhow::anyhow!("semaphore closed"))),
            };
            (job_id, result)
        });
    }

    let total = futures.len();
    let mut outcomes = Vec::new();
    let mut failures = Vec::new();

    while let Some((job_id, result)) = futures.next().await {
        match result {
            Ok(outcome) => {
                progress.on_job_complete(&outcome);
                outcomes.push(outcome);
            }
            Err(e) => {
                tracing::error!("grading failed for job {job_id}: {e}");
                progress.on_job_error(&job_id, &e.to_string());
                failures.push(BatchFailure {
                    job_id,
                    error: e.to_string(),
                });
            }
        }
    }

    let position = |id: &str| order_of.iter().position(|j| j == id);
    outcomes.sort_by_key(|o| position(&o.job_id));
    failures.sort_by_key(|f| position(&f.job_id));

    let elapsed = start.elapsed();
    progress.on_batch_complete(total, outcomes.len(), failures.len(), elapsed);
    tracing::info!(
        question = %question.id,
        total,
        failed = failures.len(),
        "batch graded"
    );

    BatchSummary {
        id: Uuid::new_v4(),
        question_id: question.id.clone(),
        outcomes,
        failures,
        duration_ms: elapsed.as_millis() as u64,
    }
}

/// The rows of one question, read once so that jobs on other threads can
/// repair orders without touching the host's source.
struct RowSnapshot {
    rows: std::result::Result<Vec<RowRef>, String>,
}

impl RowSnapshot {
    fn take(source: &dyn RowSource, question: &Question) -> Self {
        let rows = source
            .fetch_rows(&question.id, question.number_of_rows)
            .map_err(|e| format!("{e:#}"));
        Self { rows }
    }
}

impl RowSource for RowSnapshot {
    fn fetch_rows(&self, _question_id: &str, limit: usize) -> anyhow::Result<Vec<RowRef>> {
        match &self.rows {
            Ok(rows) => Ok(rows.iter().take(limit).cloned().collect()),
            Err(message) => Err(anyhow::anyhow!("{message}")),
        }
    }
}

fn grade_job(
    engine: &GradingEngine,
    question: &Question,
    rows: &dyn RowSource,
    job: BatchJob,
) -> Result<BatchOutcome> {
    let mut attempt = match &job.order {
        Some(order) => QuestionAttempt::resume(
            question,
            StepData::with_order(order.as_str()),
            rows,
            engine.config().staleness_check,
        )?,
        None => match job.seed {
            Some(seed) => QuestionAttempt::start(question, &mut StdRng::seed_from_u64(seed))?,
            None => QuestionAttempt::start(question, &mut rand::thread_rng())?,
        },
    };

    let mut rejected = 0;
    for response in job.responses {
        match attempt.submit(engine, response)? {
            SubmitOutcome::Accepted => {}
            SubmitOutcome::Unchanged | SubmitOutcome::Invalid { .. } => rejected += 1,
        }
    }

    let graded = attempt.grade(engine)?;
    let final_fraction = attempt.final_grade(engine)?;
    let summary = match attempt.responses().last() {
        Some(last) => engine.summarize_response(attempt.question(), last)?,
        None => String::new(),
    };

    Ok(BatchOutcome {
        job_id: job.id,
        order: attempt.order()?.persisted(),
        edited_question: attempt.edited_question(),
        tries: attempt.responses().len(),
        rejected,
        fraction: graded.fraction,
        state: graded.state,
        final_fraction,
        summary,
    })
}
