//! Public normalization facade.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use timex_engine::{RuleEngine, TemporalEngine};
use timex_types::{
    AnchorPoint, FailurePolicy, NormalizationRequest, NormalizeError, NormalizerConfig, Outcome,
    OutputFormat, TemporalText, TimeoutMillis,
};

use crate::anchor::{AnchorResolver, AnchorSpec, Clock, SystemClock};
use crate::classify;
use crate::diagnostics::{Diagnostics, DiagnosticsSnapshot};
use crate::worker::{Occupancy, Worker};

/// Observable lifecycle of a [`Normalizer`]. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Ready,
    Busy,
    Closed,
}

/// Builder for [`Normalizer`]. Every setting is independently defaulted:
/// 1000 ms timeout, simple format, strict policy, [`RuleEngine`], system clock.
pub struct NormalizerBuilder {
    timeout_ms: u64,
    output_format: OutputFormat,
    failure_policy: FailurePolicy,
    engine: Option<Arc<dyn TemporalEngine>>,
    clock: Option<Arc<dyn Clock>>,
}

impl Default for NormalizerBuilder {
    fn default() -> Self {
        Self {
            timeout_ms: TimeoutMillis::DEFAULT.as_millis(),
            output_format: OutputFormat::default(),
            failure_policy: FailurePolicy::default(),
            engine: None,
            clock: None,
        }
    }
}

impl NormalizerBuilder {
    /// Checked against `[100, 10000]` in [`build`](Self::build).
    pub fn timeout_ms(mut self, millis: u64) -> Self {
        self.timeout_ms = millis;
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn config(self, config: NormalizerConfig) -> Self {
        self.timeout_ms(config.timeout.as_millis())
            .output_format(config.output_format)
            .failure_policy(config.failure_policy)
    }

    pub fn engine(self, engine: impl TemporalEngine + 'static) -> Self {
        self.shared_engine(Arc::new(engine))
    }

    pub fn shared_engine(mut self, engine: Arc<dyn TemporalEngine>) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    /// Validate settings and start the worker thread.
    pub fn build(self) -> Result<Normalizer, NormalizeError> {
        let config = NormalizerConfig {
            timeout: TimeoutMillis::new(self.timeout_ms)?,
            output_format: self.output_format,
            failure_policy: self.failure_policy,
        };
        let engine: Arc<dyn TemporalEngine> = match self.engine {
            Some(engine) => engine,
            None => Arc::new(RuleEngine::new()),
        };
        let clock: Arc<dyn Clock> = match self.clock {
            Some(clock) => clock,
            None => Arc::new(SystemClock),
        };

        let diagnostics = Arc::new(Diagnostics::default());
        let worker =
            Worker::spawn(engine, Arc::clone(&diagnostics)).map_err(NormalizeError::WorkerSpawn)?;

        debug!(
            timeout_ms = config.timeout.as_millis(),
            output_format = config.output_format.as_str(),
            failure_policy = config.failure_policy.as_str(),
            "normalizer ready"
        );

        Ok(Normalizer {
            config,
            resolver: AnchorResolver::new(clock),
            worker,
            diagnostics,
        })
    }
}

impl fmt::Debug for NormalizerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalizerBuilder")
            .field("timeout_ms", &self.timeout_ms)
            .field("output_format", &self.output_format)
            .field("failure_policy", &self.failure_policy)
            .field("custom_engine", &self.engine.is_some())
            .field("custom_clock", &self.clock.is_some())
            .finish()
    }
}

/// Normalizes temporal expressions on a dedicated worker under a per-call
/// wall-clock timeout.
///
/// Calls are serialized on the worker. The worker is released by
/// [`close`](Self::close) or on drop; afterwards every call fails with
/// [`NormalizeError::Disposed`].
#[derive(Debug)]
pub struct Normalizer {
    config: NormalizerConfig,
    resolver: AnchorResolver,
    worker: Worker,
    diagnostics: Arc<Diagnostics>,
}

impl Normalizer {
    #[must_use]
    pub fn builder() -> NormalizerBuilder {
        NormalizerBuilder::default()
    }

    /// Defaults: 1000 ms timeout, simple format, strict policy.
    pub fn new() -> Result<Self, NormalizeError> {
        Self::builder().build()
    }

    /// Normalize relative to the current wall-clock time.
    pub fn normalize(&self, text: &str) -> Result<String, NormalizeError> {
        self.normalize_with(text, AnchorSpec::Now)
    }

    /// Normalize relative to the start of a calendar day.
    pub fn normalize_on(
        &self,
        text: &str,
        year: i32,
        month: u32,
        day: u32,
    ) -> Result<String, NormalizeError> {
        self.normalize_with(text, AnchorSpec::Date { year, month, day })
    }

    /// Normalize relative to a date and time-of-day.
    pub fn normalize_at(
        &self,
        text: &str,
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<String, NormalizeError> {
        self.normalize_with(
            text,
            AnchorSpec::DateTime {
                year,
                month,
                day,
                hour,
                minute,
            },
        )
    }

    pub fn normalize_anchored(
        &self,
        text: &str,
        anchor: AnchorPoint,
    ) -> Result<String, NormalizeError> {
        self.normalize_with(text, anchor)
    }

    /// Normalize and apply the configured failure policy.
    ///
    /// Strict: every per-call failure is an error. Lenient: per-call failures
    /// return `Ok("")`. [`NormalizeError::Disposed`] is returned under both.
    pub fn normalize_with(
        &self,
        text: &str,
        anchor: impl Into<AnchorSpec>,
    ) -> Result<String, NormalizeError> {
        let outcome = self.evaluate(text, anchor)?;
        classify::settle(outcome, self.config.failure_policy, &self.diagnostics)
    }

    /// Like [`normalize`](Self::normalize), but any failure yields `""`.
    #[must_use]
    pub fn normalize_or_empty(&self, text: &str) -> String {
        self.normalize(text).unwrap_or_else(|err| {
            debug!(error = %err, "normalization failed, returning empty result");
            String::new()
        })
    }

    /// Run one attempt and return its outcome without applying the policy.
    ///
    /// Errors only with [`NormalizeError::Disposed`].
    pub fn evaluate(
        &self,
        text: &str,
        anchor: impl Into<AnchorSpec>,
    ) -> Result<Outcome, NormalizeError> {
        if self.worker.is_shut_down() {
            self.diagnostics.record_disposed();
            return Err(NormalizeError::Disposed);
        }

        let outcome = match self.prepare(text, anchor.into()) {
            Ok(request) => self.submit(&request)?,
            Err(invalid) => invalid,
        };
        self.diagnostics.record_outcome(outcome.kind());
        Ok(outcome)
    }

    fn prepare(&self, text: &str, anchor: AnchorSpec) -> Result<NormalizationRequest, Outcome> {
        let text = TemporalText::new(text)?;
        let anchor = self.resolver.resolve(anchor)?;
        Ok(NormalizationRequest::new(
            text,
            anchor,
            self.config.output_format,
        ))
    }

    fn submit(&self, request: &NormalizationRequest) -> Result<Outcome, NormalizeError> {
        let started = Instant::now();
        let task = self
            .worker
            .run(
                request.text().collapsed(),
                *request.anchor(),
                self.config.timeout.as_duration(),
            )
            .map_err(|_| {
                self.diagnostics.record_disposed();
                NormalizeError::Disposed
            })?;
        // Anything that finishes after close reports the close.
        if self.worker.is_shut_down() {
            self.diagnostics.record_disposed();
            return Err(NormalizeError::Disposed);
        }
        let outcome = classify::classify(task, request, self.config.timeout);

        debug!(
            text = %request.text(),
            anchor = %request.anchor(),
            kind = %outcome.kind(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "normalization attempt finished"
        );
        Ok(outcome)
    }

    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout.as_millis()
    }

    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        self.config.output_format
    }

    #[must_use]
    pub fn is_simple_format(&self) -> bool {
        self.config.output_format == OutputFormat::Simple
    }

    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.config.failure_policy
    }

    #[must_use]
    pub fn config(&self) -> NormalizerConfig {
        self.config
    }

    #[must_use]
    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        self.worker.occupancy()
    }

    /// Calls accepted by the worker but not yet started.
    #[must_use]
    pub fn queued_tasks(&self) -> usize {
        self.worker.queued()
    }

    #[must_use]
    pub fn lifecycle(&self) -> Lifecycle {
        if self.worker.is_shut_down() {
            Lifecycle::Closed
        } else if self.worker.occupancy().is_busy() {
            Lifecycle::Busy
        } else {
            Lifecycle::Ready
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.worker.is_shut_down()
    }

    /// Release the worker. Safe to call more than once.
    pub fn close(&self) {
        if self.worker.shutdown() {
            info!(
                engine_calls = self.diagnostics.snapshot().engine_calls,
                "normalizer closed"
            );
        }
    }
}
