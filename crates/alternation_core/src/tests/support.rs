use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex as StdMutex,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::SlotRole;
use tokio::sync::{Mutex, Semaphore};

use crate::{
    NavigationRegistry, NavigationTarget, RenderNotifier, TransitionDescriptor, TransitionEffect,
};

#[derive(Clone, Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) calls: Arc<StdMutex<Vec<SlotRole>>>,
    pub(crate) fail_with: Option<String>,
}

impl RecordingNotifier {
    pub(crate) fn failing(err: impl Into<String>) -> Self {
        Self {
            calls: Arc::default(),
            fail_with: Some(err.into()),
        }
    }

    pub(crate) fn count(&self) -> usize {
        self.calls.lock().expect("notifier calls").len()
    }
}

impl RenderNotifier for RecordingNotifier {
    fn request_rerender(&self, slot: SlotRole) -> Result<()> {
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        self.calls.lock().expect("notifier calls").push(slot);
        Ok(())
    }
}

pub(crate) struct RecordingEffect<R> {
    pub(crate) invocations: Arc<Mutex<Vec<TransitionDescriptor<R>>>>,
    pub(crate) fail_with: Option<String>,
}

impl<R> RecordingEffect<R> {
    pub(crate) fn ok() -> Self {
        Self {
            invocations: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub(crate) fn failing(err: impl Into<String>) -> Self {
        Self {
            invocations: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(err.into()),
        }
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> TransitionEffect<R> for RecordingEffect<R> {
    async fn invoke_transition(&self, descriptor: &TransitionDescriptor<R>) -> Result<()> {
        self.invocations.lock().await.push(descriptor.clone());
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        Ok(())
    }
}

/// Holds every invocation until the test hands out a permit.
pub(crate) struct GatedEffect {
    pub(crate) entered: Arc<AtomicUsize>,
    pub(crate) gate: Arc<Semaphore>,
}

impl GatedEffect {
    pub(crate) fn new() -> Self {
        Self {
            entered: Arc::new(AtomicUsize::new(0)),
            gate: Arc::new(Semaphore::new(0)),
        }
    }
}

#[async_trait]
impl<R: Send + Sync> TransitionEffect<R> for GatedEffect {
    async fn invoke_transition(&self, _descriptor: &TransitionDescriptor<R>) -> Result<()> {
        self.entered.fetch_add(1, Ordering::SeqCst);
        self.gate.acquire().await?.forget();
        Ok(())
    }
}

pub(crate) async fn wait_for_entries(entered: &AtomicUsize, expected: usize) {
    while entered.load(Ordering::SeqCst) < expected {
        tokio::task::yield_now().await;
    }
}

#[derive(Clone, Default)]
pub(crate) struct RecordingRegistry {
    pub(crate) registrations: Arc<Mutex<Vec<(SlotRole, bool)>>>,
}

#[async_trait]
impl NavigationRegistry for RecordingRegistry {
    async fn register_for_navigation(
        &self,
        target: Arc<dyn NavigationTarget>,
        initial_is_active: bool,
    ) -> Result<()> {
        self.registrations
            .lock()
            .await
            .push((target.slot(), initial_is_active));
        Ok(())
    }
}
