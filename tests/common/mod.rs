//! Shared test utilities and fixtures
//!
//! Fake engines with controllable timing and failure behaviour.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use timex_core::{
    AnchorPoint, CancellationToken, EngineFailure, Temporal, TemporalEngine, checkpoint,
};

/// Records every text it is handed and answers with a fixed value.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    seen: Mutex<Vec<String>>,
}

impl RecordingEngine {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl TemporalEngine for RecordingEngine {
    fn parse(
        &self,
        text: &str,
        anchor: &AnchorPoint,
        _cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        self.seen.lock().unwrap().push(text.to_string());
        Ok(Temporal::new(anchor.to_string(), format!("Echo({text})")))
    }
}

/// Ignores cancellation. Texts containing `stall` block for `stall`; anything
/// else answers immediately.
#[derive(Debug)]
pub struct StubbornEngine {
    stall: Duration,
    calls: AtomicUsize,
}

impl StubbornEngine {
    pub fn shared(stall: Duration) -> Arc<Self> {
        Arc::new(Self {
            stall,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TemporalEngine for StubbornEngine {
    fn parse(
        &self,
        text: &str,
        _anchor: &AnchorPoint,
        _cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if text.contains("stall") {
            thread::sleep(self.stall);
        }
        Ok(Temporal::new("done", "Done"))
    }
}

/// Never finishes on its own; returns as soon as it is cancelled.
#[derive(Debug, Default)]
pub struct CooperativeEngine;

impl TemporalEngine for CooperativeEngine {
    fn parse(
        &self,
        _text: &str,
        _anchor: &AnchorPoint,
        cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        loop {
            checkpoint(cancel)?;
            thread::sleep(Duration::from_millis(2));
        }
    }
}

#[derive(Debug)]
pub struct FailingEngine(pub &'static str);

impl TemporalEngine for FailingEngine {
    fn parse(
        &self,
        _text: &str,
        _anchor: &AnchorPoint,
        _cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        Err(EngineFailure::new(self.0))
    }
}

#[derive(Debug)]
pub struct PanickingEngine;

impl TemporalEngine for PanickingEngine {
    fn parse(
        &self,
        _text: &str,
        _anchor: &AnchorPoint,
        _cancel: &CancellationToken,
    ) -> Result<Temporal, EngineFailure> {
        panic!("rule table exhausted");
    }
}

pub fn new_year_2024() -> AnchorPoint {
    AnchorPoint::date(2024, 1, 1).unwrap()
}

/// Poll `condition` for up to two seconds.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}
