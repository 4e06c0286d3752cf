use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{NavigationSeq, SlotRole};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, trace};

use crate::{
    config::AlternationOptions, descriptor::TransitionDescriptor, ImmediateTransition,
    NavigationRegistry, NavigationTarget, NoopRenderNotifier, RenderNotifier, TransitionEffect,
    UnroutedNavigation,
};

const SLOT_EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEvent {
    Attached {
        slot: SlotRole,
        initial_is_active: bool,
    },
    TransitionBuilt {
        slot: SlotRole,
        seq: NavigationSeq,
        is_entering_active: bool,
        backwards: bool,
        first_render: bool,
    },
    EffectCompleted {
        slot: SlotRole,
        seq: NavigationSeq,
    },
    Flipped {
        slot: SlotRole,
        seq: NavigationSeq,
        is_active: bool,
    },
    ViewReset {
        slot: SlotRole,
        seq: NavigationSeq,
    },
}

struct SlotState<R> {
    is_active: bool,
    demoted: bool,
    attached: bool,
    route_data: Option<R>,
    last_route_data: Option<R>,
    transition: Option<TransitionDescriptor<R>>,
    seq: NavigationSeq,
}

pub struct AlternatingView<R> {
    role: SlotRole,
    options: AlternationOptions,
    render_notifier: Arc<dyn RenderNotifier>,
    transition_effect: Arc<dyn TransitionEffect<R>>,
    navigation_registry: Arc<dyn NavigationRegistry>,
    notifications_silenced: AtomicBool,
    inner: Mutex<SlotState<R>>,
    events: broadcast::Sender<SlotEvent>,
}

impl<R: Clone + Send + Sync + 'static> AlternatingView<R> {
    pub fn new(role: SlotRole, options: AlternationOptions) -> Arc<Self> {
        Self::new_with_dependencies(
            role,
            options,
            Arc::new(NoopRenderNotifier),
            Arc::new(ImmediateTransition),
            Arc::new(UnroutedNavigation),
        )
    }

    pub fn new_with_dependencies(
        role: SlotRole,
        options: AlternationOptions,
        render_notifier: Arc<dyn RenderNotifier>,
        transition_effect: Arc<dyn TransitionEffect<R>>,
        navigation_registry: Arc<dyn NavigationRegistry>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(SLOT_EVENT_CAPACITY);
        Arc::new(Self {
            role,
            options,
            render_notifier,
            transition_effect,
            navigation_registry,
            notifications_silenced: AtomicBool::new(false),
            inner: Mutex::new(SlotState {
                is_active: true,
                demoted: false,
                attached: false,
                route_data: None,
                last_route_data: None,
                transition: None,
                seq: NavigationSeq::default(),
            }),
            events,
        })
    }

    pub fn role(&self) -> SlotRole {
        self.role
    }

    pub fn options(&self) -> AlternationOptions {
        self.options
    }

    /// One-way demotion issued once by whoever lays out the pair.
    pub async fn make_secondary(&self) {
        let mut guard = self.inner.lock().await;
        if guard.demoted {
            trace!(slot = %self.role, "alternation: repeated demotion ignored");
            return;
        }
        guard.demoted = true;
        guard.is_active = false;
        debug!(slot = %self.role, "alternation: slot demoted to inactive");
    }

    pub async fn set_route_data(&self, route_data: Option<R>) {
        self.inner.lock().await.route_data = route_data;
    }

    pub async fn route_data(&self) -> Option<R> {
        self.inner.lock().await.route_data.clone()
    }

    pub async fn last_route_data(&self) -> Option<R> {
        self.inner.lock().await.last_route_data.clone()
    }

    pub async fn is_active(&self) -> bool {
        self.inner.lock().await.is_active
    }

    pub async fn transition(&self) -> Option<TransitionDescriptor<R>> {
        self.inner.lock().await.transition.clone()
    }

    pub async fn navigation_seq(&self) -> NavigationSeq {
        self.inner.lock().await.seq
    }

    pub fn set_notifications_silenced(&self, silenced: bool) {
        self.notifications_silenced.store(silenced, Ordering::Release);
    }

    pub fn notifications_silenced(&self) -> bool {
        self.notifications_silenced.load(Ordering::Acquire)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SlotEvent> {
        self.events.subscribe()
    }

    pub async fn attach(self: &Arc<Self>) -> Result<()> {
        let initial_is_active = {
            let mut guard = self.inner.lock().await;
            if guard.attached {
                debug!(slot = %self.role, "alternation: slot already attached");
                return Ok(());
            }
            guard.attached = true;
            guard.is_active
        };

        let target: Arc<dyn NavigationTarget> = self.clone();
        if let Err(err) = self
            .navigation_registry
            .register_for_navigation(target, initial_is_active)
            .await
        {
            // Only a successful registration counts as the first attachment.
            self.inner.lock().await.attached = false;
            return Err(err);
        }
        info!(
            slot = %self.role,
            initial_is_active,
            "alternation: slot attached"
        );
        let _ = self.events.send(SlotEvent::Attached {
            slot: self.role,
            initial_is_active,
        });

        self.navigate_with_phase(false, true).await
    }

    /// Overlapping calls on the same slot are not serialized; callers must
    /// serialize upstream, as [`crate::NavigationFunnel`] does.
    pub async fn navigate(&self, backwards: bool) -> Result<()> {
        self.navigate_with_phase(backwards, false).await
    }

    pub(crate) async fn navigate_with_phase(&self, backwards: bool, first_render: bool) -> Result<()> {
        let (seq, descriptor) = {
            let mut guard = self.inner.lock().await;
            guard.seq = guard.seq.next();

            let (route_data_to_use, switched_route_data) = if guard.is_active {
                (guard.route_data.clone(), guard.last_route_data.clone())
            } else {
                (guard.last_route_data.clone(), guard.route_data.clone())
            };
            // The sibling's perspective may be empty before any view was held.
            let switched_route_data = switched_route_data.or_else(|| guard.route_data.clone());

            let descriptor = TransitionDescriptor::new(
                route_data_to_use,
                switched_route_data,
                guard.is_active,
                backwards,
                first_render,
            );
            guard.transition = Some(descriptor.clone());
            (guard.seq, descriptor)
        };

        debug!(
            slot = %self.role,
            %seq,
            backwards,
            first_render,
            is_entering_active = descriptor.is_entering_active,
            "alternation: transition built"
        );
        let _ = self.events.send(SlotEvent::TransitionBuilt {
            slot: self.role,
            seq,
            is_entering_active: descriptor.is_entering_active,
            backwards,
            first_render,
        });
        self.notify_render()?;

        let can_reset_on_exit =
            self.options.forget_state_on_transition && !descriptor.is_entering_active;

        // Let the pending render commit before the effect reads the tree.
        tokio::task::yield_now().await;

        let drives_effect = self.inner.lock().await.is_active;
        if drives_effect {
            debug!(slot = %self.role, %seq, "alternation: invoking transition effect");
            self.transition_effect.invoke_transition(&descriptor).await?;
            let _ = self.events.send(SlotEvent::EffectCompleted {
                slot: self.role,
                seq,
            });
        }

        let is_active = {
            let mut guard = self.inner.lock().await;
            guard.is_active = !guard.is_active;
            guard.last_route_data = guard.route_data.clone();
            guard.is_active
        };
        info!(
            slot = %self.role,
            %seq,
            is_active,
            backwards,
            first_render,
            "alternation: ownership flipped"
        );
        let _ = self.events.send(SlotEvent::Flipped {
            slot: self.role,
            seq,
            is_active,
        });

        if can_reset_on_exit {
            self.inner.lock().await.transition = Some(descriptor.reset());
            debug!(
                slot = %self.role,
                %seq,
                delay_ms = self.options.transition_duration_milliseconds,
                "alternation: view reset scheduled"
            );
            tokio::time::sleep(self.options.transition_duration()).await;
            self.notify_render()?;
            debug!(slot = %self.role, %seq, "alternation: view reset notified");
            let _ = self.events.send(SlotEvent::ViewReset {
                slot: self.role,
                seq,
            });
        }

        Ok(())
    }

    fn notify_render(&self) -> Result<()> {
        if self.notifications_silenced() {
            trace!(slot = %self.role, "alternation: render notification silenced");
            return Ok(());
        }
        self.render_notifier.request_rerender(self.role)
    }
}

#[async_trait]
impl<R: Clone + Send + Sync + 'static> NavigationTarget for AlternatingView<R> {
    fn slot(&self) -> SlotRole {
        self.role
    }

    async fn navigate(&self, backwards: bool) -> Result<()> {
        self.navigate_with_phase(backwards, false).await
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
