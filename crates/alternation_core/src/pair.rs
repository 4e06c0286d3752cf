use std::sync::Arc;

use anyhow::Result;
use shared::{domain::SlotRole, error::PairingError};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    config::AlternationOptions, funnel::NavigationFunnel, view::AlternatingView,
    NavigationRegistry, RenderNotifier, TransitionEffect,
};

pub struct ViewPair<R> {
    primary: Arc<AlternatingView<R>>,
    secondary: Arc<AlternatingView<R>>,
    funnel: Arc<NavigationFunnel>,
    in_flight: Mutex<()>,
}

impl<R: Clone + Send + Sync + 'static> ViewPair<R> {
    pub async fn new(
        options: AlternationOptions,
        render_notifier: Arc<dyn RenderNotifier>,
        transition_effect: Arc<dyn TransitionEffect<R>>,
    ) -> Self {
        let funnel = NavigationFunnel::new();
        let registry: Arc<dyn NavigationRegistry> = funnel.clone();

        let primary = AlternatingView::new_with_dependencies(
            SlotRole::Primary,
            options,
            render_notifier.clone(),
            transition_effect.clone(),
            registry.clone(),
        );
        let secondary = AlternatingView::new_with_dependencies(
            SlotRole::Secondary,
            options,
            render_notifier,
            transition_effect,
            registry,
        );
        secondary.make_secondary().await;
        debug!(
            forget_state_on_transition = options.forget_state_on_transition,
            transition_duration_ms = options.transition_duration_milliseconds,
            "pair: slots constructed"
        );

        Self {
            primary,
            secondary,
            funnel,
            in_flight: Mutex::new(()),
        }
    }

    pub fn primary(&self) -> &Arc<AlternatingView<R>> {
        &self.primary
    }

    pub fn secondary(&self) -> &Arc<AlternatingView<R>> {
        &self.secondary
    }

    pub fn slot(&self, role: SlotRole) -> &Arc<AlternatingView<R>> {
        match role {
            SlotRole::Primary => &self.primary,
            SlotRole::Secondary => &self.secondary,
        }
    }

    pub fn funnel(&self) -> &Arc<NavigationFunnel> {
        &self.funnel
    }

    pub async fn mount(&self, route_data: R) -> Result<()> {
        let _in_flight = self.in_flight.lock().await;
        self.bind_route(Some(route_data)).await;
        self.primary.attach().await?;
        self.secondary.attach().await?;
        let active = self.active_slot().await.ok();
        info!(active = ?active, "pair: mounted");
        Ok(())
    }

    pub async fn route_changed(&self, route_data: R, backwards: bool) -> Result<()> {
        let _in_flight = self.in_flight.lock().await;
        self.bind_route(Some(route_data)).await;
        self.funnel.deliver(backwards).await
    }

    async fn bind_route(&self, route_data: Option<R>) {
        self.primary.set_route_data(route_data.clone()).await;
        self.secondary.set_route_data(route_data).await;
    }

    /// Diagnostic only: a wiring fault is reported here but never corrected.
    pub async fn active_slot(&self) -> Result<SlotRole, PairingError> {
        match (self.primary.is_active().await, self.secondary.is_active().await) {
            (true, false) => Ok(SlotRole::Primary),
            (false, true) => Ok(SlotRole::Secondary),
            (true, true) => Err(PairingError::BothActive),
            (false, false) => Err(PairingError::NoActiveSlot),
        }
    }

    pub async fn active(&self) -> Result<&Arc<AlternatingView<R>>, PairingError> {
        let role = self.active_slot().await?;
        Ok(self.slot(role))
    }
}

#[cfg(test)]
#[path = "tests/pair_tests.rs"]
mod tests;
