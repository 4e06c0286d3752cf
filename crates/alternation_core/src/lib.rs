use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::SlotRole;

pub mod config;
pub mod descriptor;
pub mod funnel;
pub mod pair;
pub mod view;

pub use config::{load_settings, load_settings_from, AlternationOptions};
pub use descriptor::TransitionDescriptor;
pub use funnel::NavigationFunnel;
pub use pair::ViewPair;
pub use view::{AlternatingView, SlotEvent};

pub trait RenderNotifier: Send + Sync {
    fn request_rerender(&self, slot: SlotRole) -> Result<()>;
}

/// Pluggable visual transition driver.
///
/// The returned future must eventually resolve; nothing here imposes a timeout.
#[async_trait]
pub trait TransitionEffect<R>: Send + Sync {
    async fn invoke_transition(&self, descriptor: &TransitionDescriptor<R>) -> Result<()>;
}

#[async_trait]
pub trait NavigationTarget: Send + Sync {
    fn slot(&self) -> SlotRole;
    async fn navigate(&self, backwards: bool) -> Result<()>;
}

#[async_trait]
pub trait NavigationRegistry: Send + Sync {
    async fn register_for_navigation(
        &self,
        target: Arc<dyn NavigationTarget>,
        initial_is_active: bool,
    ) -> Result<()>;
}

pub struct NoopRenderNotifier;

impl RenderNotifier for NoopRenderNotifier {
    fn request_rerender(&self, _slot: SlotRole) -> Result<()> {
        Ok(())
    }
}

pub struct ImmediateTransition;

#[async_trait]
impl<R: Send + Sync> TransitionEffect<R> for ImmediateTransition {
    async fn invoke_transition(&self, _descriptor: &TransitionDescriptor<R>) -> Result<()> {
        Ok(())
    }
}

pub struct UnroutedNavigation;

#[async_trait]
impl NavigationRegistry for UnroutedNavigation {
    async fn register_for_navigation(
        &self,
        target: Arc<dyn NavigationTarget>,
        initial_is_active: bool,
    ) -> Result<()> {
        tracing::debug!(
            slot = %target.slot(),
            initial_is_active,
            "alternation: registration dropped, no navigation funnel configured"
        );
        Ok(())
    }
}

impl<F> RenderNotifier for F
where
    F: Fn(SlotRole) -> Result<()> + Send + Sync,
{
    fn request_rerender(&self, slot: SlotRole) -> Result<()> {
        self(slot)
    }
}

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
