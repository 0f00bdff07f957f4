//! Deterministic timeline rules shared by the runtime and offline tools.
//!
//! `echoes-core` defines the dual-timeline resource ([`TimelineState`]), the
//! per-character combat math ([`ModifierPipeline`]) and the four class kits
//! layered on top of it. Everything here is pure and single-threaded: time
//! only moves when a caller invokes `tick`/`advance` with a frame delta, and
//! every notification is delivered synchronously.
pub mod character;
pub mod config;
pub mod error;
pub mod kits;
pub mod modifier;
pub mod observer;
pub mod stats;
pub mod timeline;

mod math;

pub use character::{
    Character, CharacterId, CharacterSheet, CharacterSnapshot, ClassEvent, ClassKind,
    ClassObserver, ClassTemplate, PoolKind, TimedEffect, Vitals,
};
pub use config::TimelineConfig;
pub use error::{AbilityError, ConfigError, ErrorSeverity, GameError, TransitionError};
pub use kits::{
    ClassKit, KitContext, LightAbility, LightPaladin, TimeWarrior, TimelineAssassin, VoidAbility,
    VoidMage, WarriorCombo,
};
pub use math::Vec3;
pub use modifier::{Modifier, ModifierContributor, ModifierPipeline, ModifierSource, ModifierStack};
pub use observer::{ObserverList, SubscriptionId};
pub use stats::{ClassStats, Meter, Specialization, SpecializationTable, TimelineAffinity};
pub use timeline::{
    Mastery, TickOutcome, Timeline, TimelineContext, TimelineListener, TimelineSnapshot,
    TimelineState, Transition, TransitionPhase,
};

/// Asserts two floats are equal within `1e-4` (or a given tolerance).
#[cfg(test)]
#[macro_export]
macro_rules! assert_approx {
    ($left:expr, $right:expr) => {
        $crate::assert_approx!($left, $right, 1e-4)
    };
    ($left:expr, $right:expr, $tolerance:expr) => {{
        let (left, right): (f32, f32) = ($left, $right);
        assert!(
            (left - right).abs() <= $tolerance,
            "assertion failed: {} ≈ {} (tolerance {})",
            left,
            right,
            $tolerance
        );
    }};
}
