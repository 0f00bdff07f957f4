//! Observers that forward timeline and class notifications to `tracing`.
use echoes_core::{CharacterId, ClassEvent, ClassObserver, Timeline, TimelineListener};
use tracing::{debug, info, trace};

/// Logs every timeline notification with structured fields.
#[derive(Clone, Debug, Default)]
pub struct TracingTimelineListener {
    session: String,
}

impl TracingTimelineListener {
    pub fn new(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
        }
    }
}

impl TimelineListener for TracingTimelineListener {
    fn on_timeline_state_changed(&self, new_state: Timeline) {
        info!(session = %self.session, timeline = %new_state, "timeline state changed");
    }

    fn on_transition_progress(&self, progress: f32) {
        trace!(session = %self.session, progress, "transition progress");
    }

    fn on_transition_started(&self, from: Timeline, to: Timeline) {
        debug!(session = %self.session, %from, %to, "transition started");
    }

    fn on_transition_completed(&self, timeline: Timeline) {
        debug!(session = %self.session, %timeline, "transition completed");
    }

    fn on_transition_cancelled(&self, target: Timeline) {
        debug!(session = %self.session, %target, "transition cancelled");
    }

    fn on_energy_changed(&self, energy: f32, max_energy: f32) {
        trace!(session = %self.session, energy, max_energy, "timeline energy");
    }

    fn on_mastery_gained(&self, timeline: Timeline, mastery: f32) {
        debug!(session = %self.session, %timeline, mastery, "mastery changed");
    }
}

/// Logs every class event, keyed by character.
#[derive(Clone, Debug, Default)]
pub struct TracingClassObserver;

impl ClassObserver for TracingClassObserver {
    fn on_class_event(&self, character: CharacterId, event: &ClassEvent) {
        match event {
            ClassEvent::ThresholdReached(pool) => {
                info!(character = character.0, %pool, "threshold reached")
            }
            ClassEvent::ThresholdLost(pool) => {
                info!(character = character.0, %pool, "threshold lost")
            }
            ClassEvent::LeveledUp { level } => {
                info!(character = character.0, level, "leveled up")
            }
            other => debug!(character = character.0, event = ?other, "class event"),
        }
    }
}
