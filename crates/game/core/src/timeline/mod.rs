//! Timeline identity, mastery bookkeeping and the shared timeline resource.
//!
//! The world exists in two concrete timelines. [`Timeline::Any`] is a wildcard
//! used by requirements and preferences ("works in either timeline") and is
//! only ever the *current* timeline before the first explicit state change.
mod mastery;
mod state;

pub use mastery::Mastery;
pub use state::{
    TickOutcome, TimelineListener, TimelineSnapshot, TimelineState, Transition, TransitionPhase,
};

/// One of the two parallel worlds, or the wildcard.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timeline {
    #[default]
    #[strum(to_string = "bright", serialize = "BrightWorld")]
    BrightWorld,
    #[strum(to_string = "dark", serialize = "DarkWorld")]
    DarkWorld,
    #[strum(to_string = "any", serialize = "Any")]
    Any,
}

impl Timeline {
    /// Both concrete timelines in declaration order.
    pub const CONCRETE: [Timeline; 2] = [Timeline::BrightWorld, Timeline::DarkWorld];

    /// True for `BrightWorld` and `DarkWorld`.
    pub const fn is_concrete(self) -> bool {
        !matches!(self, Timeline::Any)
    }

    /// The other concrete timeline. `Any` has no opposite.
    pub const fn opposite(self) -> Option<Timeline> {
        match self {
            Timeline::BrightWorld => Some(Timeline::DarkWorld),
            Timeline::DarkWorld => Some(Timeline::BrightWorld),
            Timeline::Any => None,
        }
    }

    /// True when `self` and `other` are distinct concrete timelines.
    pub fn opposes(self, other: Timeline) -> bool {
        self.is_concrete() && other.is_concrete() && self != other
    }

    /// Requirement check: `Any` accepts every timeline.
    pub fn accepts(self, current: Timeline) -> bool {
        self == Timeline::Any || self == current
    }

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

/// The timeline a character currently observes.
///
/// A character that is not bound to a [`TimelineState`] sees an unbound
/// context: modifiers evaluate to neutral values and timeline-gated abilities
/// are unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TimelineContext {
    current: Option<Timeline>,
}

impl TimelineContext {
    /// Context with no timeline source.
    pub const UNBOUND: TimelineContext = TimelineContext { current: None };

    pub const fn bound(current: Timeline) -> Self {
        Self {
            current: Some(current),
        }
    }

    pub fn from_state(state: &TimelineState) -> Self {
        Self::bound(state.current())
    }

    pub const fn current(self) -> Option<Timeline> {
        self.current
    }

    pub const fn is_bound(self) -> bool {
        self.current.is_some()
    }

    /// True when bound and the current timeline equals `timeline`.
    pub fn is(self, timeline: Timeline) -> bool {
        self.current == Some(timeline)
    }
}

impl From<Timeline> for TimelineContext {
    fn from(timeline: Timeline) -> Self {
        Self::bound(timeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn opposition_only_between_concrete_timelines() {
        assert!(Timeline::BrightWorld.opposes(Timeline::DarkWorld));
        assert!(Timeline::DarkWorld.opposes(Timeline::BrightWorld));
        assert!(!Timeline::DarkWorld.opposes(Timeline::DarkWorld));
        for timeline in Timeline::iter() {
            assert!(!Timeline::Any.opposes(timeline));
            assert!(!timeline.opposes(Timeline::Any));
        }
    }

    #[test]
    fn wildcard_accepts_everything() {
        for timeline in Timeline::iter() {
            assert!(Timeline::Any.accepts(timeline));
        }
        assert!(!Timeline::DarkWorld.accepts(Timeline::BrightWorld));
    }

    #[test]
    fn parses_short_and_long_names() {
        assert_eq!("dark".parse::<Timeline>(), Ok(Timeline::DarkWorld));
        assert_eq!("BrightWorld".parse::<Timeline>(), Ok(Timeline::BrightWorld));
        assert_eq!(Timeline::DarkWorld.to_string(), "dark");
    }

    #[test]
    fn unbound_context_matches_nothing() {
        let ctx = TimelineContext::UNBOUND;
        assert!(!ctx.is_bound());
        for timeline in Timeline::iter() {
            assert!(!ctx.is(timeline));
        }
    }
}
