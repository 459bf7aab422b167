// src/scheduler/mod.rs

//! Cooperative polling scheduler.
//!
//! The host main loop owns the clock and calls [`PollingScheduler::run_pending`]
//! (or the non-blocking [`PollingScheduler::poll`]) with the current instant.
//! Components are borrowed for the scheduler's lifetime, so there is no
//! global component table.

pub mod registry;

pub use registry::{build_sensor, BusRegistry};

use crate::common::{ComponentStatus, Instant, RegistryError, Schedulable};
use arrayvec::ArrayVec;
use core::cmp::Reverse;
use core::convert::Infallible;
use core::time::Duration;

/// Handle to a registered component.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ComponentSlot(usize);

struct Slot<'a, T: Instant> {
    component: &'a mut dyn Schedulable<T>,
    interval: Duration,
    next_due: T,
}

/// Fixed-capacity scheduler for up to `N` components.
pub struct PollingScheduler<'a, T: Instant, const N: usize> {
    slots: ArrayVec<Slot<'a, T>, N>,
}

impl<'a, T: Instant, const N: usize> PollingScheduler<'a, T, N> {
    pub fn new() -> Self {
        PollingScheduler {
            slots: ArrayVec::new(),
        }
    }

    /// Adds a component. Its interval is read once here; the first tick is
    /// due at `now`.
    pub fn register(
        &mut self,
        component: &'a mut dyn Schedulable<T>,
        now: T,
    ) -> Result<ComponentSlot, RegistryError> {
        let interval = component.update_interval();
        log_debug!(
            "Registering '{}' every {}ms",
            component.name(),
            interval.as_millis() as u64
        );
        self.slots
            .try_push(Slot {
                component,
                interval,
                next_due: now,
            })
            .map_err(|_| RegistryError::SchedulerFull)?;
        Ok(ComponentSlot(self.slots.len() - 1))
    }

    /// Runs `setup` on every component, highest [`SetupPriority`](crate::common::SetupPriority)
    /// first, registration order among equals.
    pub fn setup_all(&mut self) {
        let mut order: ArrayVec<usize, N> = (0..self.slots.len()).collect();
        order.sort_unstable_by_key(|&i| (Reverse(self.slots[i].component.setup_priority()), i));

        for i in order {
            let component = &mut *self.slots[i].component;
            component.setup();
            if component.status().is_failed() {
                log_error!("Component '{}' failed setup, not scheduling", component.name());
            }
        }
    }

    /// Ticks every due, non-failed component. Returns how many were ticked.
    pub fn run_pending(&mut self, now: T) -> usize {
        let mut ticked = 0;
        for slot in self.slots.iter_mut() {
            if slot.component.status().is_failed() || now < slot.next_due {
                continue;
            }

            log_trace!("Tick '{}'", slot.component.name());
            slot.component.on_tick(now);
            ticked += 1;

            slot.next_due = slot.next_due + slot.interval;
            if slot.next_due <= now {
                // Fell behind by more than one interval; skip the backlog.
                slot.next_due = now + slot.interval;
            }
        }
        ticked
    }

    /// Non-blocking variant of [`run_pending`](Self::run_pending):
    /// `WouldBlock` when nothing was due.
    pub fn poll(&mut self, now: T) -> nb::Result<usize, Infallible> {
        match self.run_pending(now) {
            0 => Err(nb::Error::WouldBlock),
            n => Ok(n),
        }
    }

    /// Earliest deadline among components still being scheduled.
    pub fn next_deadline(&self) -> Option<T> {
        self.slots
            .iter()
            .filter(|s| !s.component.status().is_failed())
            .map(|s| s.next_due)
            .min()
    }

    pub fn status(&self, slot: ComponentSlot) -> Option<ComponentStatus> {
        self.slots.get(slot.0).map(|s| s.component.status())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl<T: Instant, const N: usize> Default for PollingScheduler<'_, T, N> {
    fn default() -> Self {
        Self::new()
    }
}
