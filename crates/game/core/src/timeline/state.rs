//! The shared timeline resource: current world, transition energy, mastery.
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::{Mastery, Timeline};
use crate::config::TimelineConfig;
use crate::error::TransitionError;
use crate::observer::{ObserverList, SubscriptionId};

/// Receives timeline notifications synchronously, after the state change.
///
/// Only the first two callbacks are required; the rest default to no-ops so
/// simple collaborators (a HUD, an audio cue) stay small.
pub trait TimelineListener {
    fn on_timeline_state_changed(&self, new_state: Timeline);

    fn on_transition_progress(&self, progress: f32);

    fn on_transition_started(&self, _from: Timeline, _to: Timeline) {}

    fn on_transition_completed(&self, _timeline: Timeline) {}

    fn on_transition_cancelled(&self, _target: Timeline) {}

    fn on_energy_changed(&self, _energy: f32, _max_energy: f32) {}

    fn on_mastery_gained(&self, _timeline: Timeline, _mastery: f32) {}
}

/// An in-flight transition. Present on [`TimelineState`] iff one is running.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transition {
    pub target: Timeline,
    /// Fraction completed, in `[0, 1]`.
    pub progress: f32,
}

/// Coarse state-machine view of [`TimelineState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionPhase {
    Idle,
    Transitioning,
}

/// What a single [`TimelineState::tick`] did.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TickOutcome {
    /// Set when a transition finished during this tick.
    pub completed: Option<Timeline>,
    /// Energy actually restored by regeneration (after clamping).
    pub regenerated: f32,
}

/// Flat persisted shape of [`TimelineState`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineSnapshot {
    pub current: Timeline,
    pub energy: f32,
    pub max_energy: f32,
    pub mastery: Mastery,
    pub transition: Option<Transition>,
}

impl TimelineSnapshot {
    /// Clamps every field into its valid range.
    ///
    /// Returns the names of the fields that had to be repaired.
    pub fn repair(&mut self) -> Vec<&'static str> {
        let mut repaired = Vec::new();

        if !self.max_energy.is_finite() || self.max_energy < 1.0 {
            self.max_energy = if self.max_energy.is_finite() {
                self.max_energy.max(1.0)
            } else {
                TimelineConfig::DEFAULT_MAX_ENERGY
            };
            repaired.push("max_energy");
        }

        let energy = if self.energy.is_finite() {
            self.energy.clamp(0.0, self.max_energy)
        } else {
            0.0
        };
        if energy != self.energy {
            self.energy = energy;
            repaired.push("energy");
        }

        if self.mastery.repair() {
            repaired.push("mastery");
        }

        if let Some(transition) = self.transition.as_mut() {
            if !transition.target.is_concrete() || transition.target == self.current {
                self.transition = None;
                repaired.push("transition");
            } else {
                let progress = if transition.progress.is_finite() {
                    transition.progress.clamp(0.0, 1.0)
                } else {
                    0.0
                };
                if progress != transition.progress {
                    transition.progress = progress;
                    repaired.push("transition.progress");
                }
            }
        }

        repaired
    }
}

/// Single source of truth for the active timeline.
///
/// Mutated only through its own methods. Commands come in two flavours: the
/// `try_*` methods report a [`TransitionError`] on rejection, the plain ones
/// return `bool`. A rejected command never changes state or notifies.
pub struct TimelineState {
    config: TimelineConfig,
    current: Timeline,
    energy: f32,
    max_energy: f32,
    mastery: Mastery,
    transition: Option<Transition>,
    listeners: ObserverList<dyn TimelineListener>,
}

impl TimelineState {
    /// Creates a state in `BrightWorld` with full energy.
    ///
    /// An invalid config is replaced by [`TimelineConfig::default`].
    pub fn new(config: TimelineConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(error) => {
                warn!(%error, "invalid timeline config, using defaults");
                TimelineConfig::default()
            }
        };
        Self {
            current: Timeline::BrightWorld,
            energy: config.max_energy,
            max_energy: config.max_energy,
            mastery: Mastery::default(),
            transition: None,
            listeners: ObserverList::new(),
            config,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn current(&self) -> Timeline {
        self.current
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    pub fn max_energy(&self) -> f32 {
        self.max_energy
    }

    pub fn mastery(&self, timeline: Timeline) -> f32 {
        self.mastery.get(timeline)
    }

    pub fn mastery_levels(&self) -> &Mastery {
        &self.mastery
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    pub fn transition_progress(&self) -> Option<f32> {
        self.transition.map(|t| t.progress)
    }

    pub fn transition_target(&self) -> Option<Timeline> {
        self.transition.map(|t| t.target)
    }

    pub fn phase(&self) -> TransitionPhase {
        if self.transition.is_some() {
            TransitionPhase::Transitioning
        } else {
            TransitionPhase::Idle
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Authoritative overwrite of the current timeline. No energy cost.
    ///
    /// Notifies listeners only when the value actually changes.
    pub fn set_state(&mut self, new_state: Timeline) {
        if new_state == self.current {
            return;
        }
        let previous = self.current;
        self.current = new_state;
        info!(from = %previous, to = %new_state, "timeline changed");
        self.listeners
            .notify(|l| l.on_timeline_state_changed(new_state));
    }

    /// Starts a paid transition toward `target`.
    ///
    /// Rejected while another transition is in flight, when `target` is the
    /// current timeline or the `Any` wildcard, or when energy is below the
    /// configured transition cost.
    pub fn try_start_transition(&mut self, target: Timeline) -> Result<(), TransitionError> {
        if let Some(transition) = self.transition {
            return Err(TransitionError::AlreadyTransitioning {
                target: transition.target,
            });
        }
        if target == self.current {
            return Err(TransitionError::SameTimeline(target));
        }
        if !target.is_concrete() {
            return Err(TransitionError::WildcardTarget(target));
        }
        let cost = self.config.min_transition_energy;
        if self.energy < cost {
            return Err(TransitionError::InsufficientEnergy {
                required: cost,
                available: self.energy,
            });
        }

        self.energy -= cost;
        self.transition = Some(Transition {
            target,
            progress: 0.0,
        });

        let from = self.current;
        info!(%from, to = %target, energy = self.energy, "transition started");
        self.notify_energy();
        self.listeners.notify(|l| l.on_transition_started(from, target));
        Ok(())
    }

    /// Boolean form of [`Self::try_start_transition`].
    pub fn start_transition(&mut self, target: Timeline) -> bool {
        match self.try_start_transition(target) {
            Ok(()) => true,
            Err(error) => {
                debug!(%error, "transition rejected");
                false
            }
        }
    }

    /// Abandons the in-flight transition. Spent energy is not refunded.
    ///
    /// Returns false when nothing was in flight.
    pub fn cancel_transition(&mut self) -> bool {
        let Some(transition) = self.transition.take() else {
            return false;
        };
        info!(to = %transition.target, progress = transition.progress, "transition cancelled");
        self.listeners.notify(|l| l.on_transition_progress(0.0));
        self.listeners
            .notify(|l| l.on_transition_cancelled(transition.target));
        true
    }

    /// Advances the transition and regenerates energy.
    ///
    /// Both effects run on every call. Non-positive or non-finite deltas are
    /// ignored.
    pub fn tick(&mut self, delta_time: f32) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return outcome;
        }

        if let Some(transition) = self.transition.as_mut() {
            transition.progress =
                (transition.progress + delta_time / self.config.transition_duration).min(1.0);
            let Transition { target, progress } = *transition;
            self.listeners.notify(|l| l.on_transition_progress(progress));

            if progress >= 1.0 {
                self.transition = None;
                self.set_state(target);
                info!(timeline = %target, "transition completed");
                self.listeners.notify(|l| l.on_transition_completed(target));
                outcome.completed = Some(target);
            }
        }

        if self.energy < self.max_energy {
            let amount = self.config.energy_regen_rate
                * delta_time
                * (1.0 + self.mastery.get(self.current));
            outcome.regenerated = self.apply_energy_delta(amount);
        }

        outcome
    }

    /// Spends `amount` energy if available. Negative or non-finite amounts are rejected.
    pub fn consume_energy(&mut self, amount: f32) -> bool {
        if !(amount.is_finite() && amount >= 0.0) || self.energy < amount {
            debug!(amount, energy = self.energy, "energy consumption rejected");
            return false;
        }
        self.apply_energy_delta(-amount);
        true
    }

    /// Adds `amount` energy, clamped to `[0, max_energy]`.
    pub fn restore_energy(&mut self, amount: f32) {
        if amount.is_finite() {
            self.apply_energy_delta(amount);
        }
    }

    /// Adjusts a timeline's mastery, clamped into `[0, 1]`. No-op for `Any`.
    pub fn add_mastery(&mut self, timeline: Timeline, amount: f32) {
        if !timeline.is_concrete() {
            return;
        }
        let applied = self.mastery.add(timeline, amount);
        if applied != 0.0 {
            let level = self.mastery.get(timeline);
            debug!(%timeline, level, "mastery changed");
            self.listeners.notify(|l| l.on_mastery_gained(timeline, level));
        }
    }

    /// Converts in-timeline activity to mastery using the configured gain rate.
    pub fn record_activity(&mut self, timeline: Timeline, activity: f32) {
        let amount = self.config.mastery_for(activity);
        self.add_mastery(timeline, amount);
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    /// Registers a listener. Returns `None` for a listener already registered.
    pub fn subscribe(&self, listener: Rc<dyn TimelineListener>) -> Option<SubscriptionId> {
        self.listeners.subscribe(listener)
    }

    /// Registers a listener and immediately tells it the current timeline.
    pub fn subscribe_and_sync(
        &self,
        listener: Rc<dyn TimelineListener>,
    ) -> Option<SubscriptionId> {
        let id = self.listeners.subscribe(Rc::clone(&listener))?;
        listener.on_timeline_state_changed(self.current);
        Some(id)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Shared handle to the listener registry.
    ///
    /// Listeners that need to unsubscribe themselves from inside a callback
    /// keep a clone of this handle.
    pub fn listeners(&self) -> ObserverList<dyn TimelineListener> {
        self.listeners.clone()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            current: self.current,
            energy: self.energy,
            max_energy: self.max_energy,
            mastery: self.mastery,
            transition: self.transition,
        }
    }

    /// Loads persisted values, repairing anything out of range.
    ///
    /// Listeners stay registered; the timeline is applied through
    /// [`Self::set_state`] so they hear about a changed world.
    pub fn restore(&mut self, mut snapshot: TimelineSnapshot) {
        for field in snapshot.repair() {
            warn!(field, "repaired persisted timeline value");
        }
        self.max_energy = snapshot.max_energy;
        self.energy = snapshot.energy;
        self.mastery = snapshot.mastery;
        self.transition = snapshot.transition;
        self.set_state(snapshot.current);
        self.notify_energy();
    }

    fn apply_energy_delta(&mut self, amount: f32) -> f32 {
        let before = self.energy;
        self.energy = (self.energy + amount).clamp(0.0, self.max_energy);
        let applied = self.energy - before;
        if applied != 0.0 {
            self.notify_energy();
        }
        applied
    }

    fn notify_energy(&self) {
        let (energy, max) = (self.energy, self.max_energy);
        self.listeners.notify(|l| l.on_energy_changed(energy, max));
    }
}

impl Default for TimelineState {
    fn default() -> Self {
        Self::new(TimelineConfig::default())
    }
}

impl std::fmt::Debug for TimelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineState")
            .field("current", &self.current)
            .field("energy", &self.energy)
            .field("max_energy", &self.max_energy)
            .field("mastery", &self.mastery)
            .field("transition", &self.transition)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
