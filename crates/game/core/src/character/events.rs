use super::CharacterId;
use crate::kits::{LightAbility, VoidAbility, WarriorCombo};
use crate::math::Vec3;
use crate::stats::Specialization;
use crate::timeline::Timeline;

/// Which threshold pool an event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolKind {
    /// Light power; its threshold state is resonance.
    Light,
    /// Void power; its threshold state is corruption.
    Void,
}

/// Time-boxed effects that expire on their own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimedEffect {
    LightBarrier,
    VoidPortal,
    TimeShift,
    Stealth,
    PhaseShift,
}

/// Something a character or its class kit did.
///
/// Emitted synchronously, after the state change it describes.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ClassEvent {
    LeveledUp {
        level: u32,
    },
    SpecializationUnlocked(Specialization),

    ChannelStarted(PoolKind),
    ChannelStopped(PoolKind),
    /// Buildup crossed the threshold (resonance / corruption began).
    ThresholdReached(PoolKind),
    /// Buildup fell back below the threshold.
    ThresholdLost(PoolKind),

    LightAbilityCast {
        ability: LightAbility,
        healing: f32,
    },
    HealingPerformed {
        target: Vec3,
        amount: f32,
    },
    /// Resonance empowered healing and extended the barrier.
    ResonanceEmpowered,
    VoidAbilityCast {
        ability: VoidAbility,
        damage_multiplier: f32,
    },
    /// Health lost to corruption when it takes hold.
    CorruptionBacklash {
        health_lost: f32,
    },

    /// A time-boxed effect started.
    Activated {
        effect: TimedEffect,
        duration: f32,
        location: Option<Vec3>,
    },
    /// A time-boxed effect ended, either expired or ended by command.
    Deactivated {
        effect: TimedEffect,
        expired: bool,
    },

    StanceChanged(Timeline),
    StanceAbilityUsed {
        stance: Timeline,
        energy_cost: f32,
    },
    ComboInput {
        input: Timeline,
        length: usize,
    },
    ComboExecuted {
        combo: WarriorCombo,
        damage_multiplier: f32,
    },
    ComboReset,
}

/// Receives [`ClassEvent`]s for the characters it is subscribed to.
pub trait ClassObserver {
    fn on_class_event(&self, character: CharacterId, event: &ClassEvent);
}
