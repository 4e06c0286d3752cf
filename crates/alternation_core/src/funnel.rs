use std::sync::{Arc, Weak};

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use shared::domain::SlotRole;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{NavigationRegistry, NavigationTarget};

struct RegisteredTarget {
    slot: SlotRole,
    initial_is_active: bool,
    target: Weak<dyn NavigationTarget>,
}

#[derive(Default)]
pub struct NavigationFunnel {
    targets: Mutex<Vec<RegisteredTarget>>,
    in_flight: Mutex<()>,
}

impl NavigationFunnel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn initially_active_slots(&self) -> Vec<SlotRole> {
        self.targets
            .lock()
            .await
            .iter()
            .filter(|registered| registered.initial_is_active)
            .map(|registered| registered.slot)
            .collect()
    }

    pub async fn registered_slots(&self) -> Vec<SlotRole> {
        self.targets
            .lock()
            .await
            .iter()
            .filter(|registered| registered.target.strong_count() > 0)
            .map(|registered| registered.slot)
            .collect()
    }

    /// Every slot runs to completion even if another fails; the first error
    /// in registration order is returned.
    pub async fn deliver(&self, backwards: bool) -> Result<()> {
        let _in_flight = self.in_flight.lock().await;

        let targets: Vec<Arc<dyn NavigationTarget>> = {
            let mut guard = self.targets.lock().await;
            guard.retain(|registered| registered.target.strong_count() > 0);
            guard
                .iter()
                .filter_map(|registered| registered.target.upgrade())
                .collect()
        };

        if targets.is_empty() {
            warn!(backwards, "funnel: navigation dropped, no slot registered");
            return Ok(());
        }

        info!(
            backwards,
            targets = targets.len(),
            "funnel: delivering navigation"
        );
        let results = join_all(targets.iter().map(|target| target.navigate(backwards))).await;
        results.into_iter().collect::<Result<Vec<()>>>()?;
        Ok(())
    }
}

#[async_trait]
impl NavigationRegistry for NavigationFunnel {
    async fn register_for_navigation(
        &self,
        target: Arc<dyn NavigationTarget>,
        initial_is_active: bool,
    ) -> Result<()> {
        let slot = target.slot();
        let mut guard = self.targets.lock().await;
        guard.retain(|registered| registered.slot != slot);
        guard.push(RegisteredTarget {
            slot,
            initial_is_active,
            target: Arc::downgrade(&target),
        });
        debug!(
            slot = %slot,
            initial_is_active,
            registered = guard.len(),
            "funnel: slot registered"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/funnel_tests.rs"]
mod tests;
