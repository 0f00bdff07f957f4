//! Specializations as declarative adjustment tables.
//!
//! Each variant maps to one [`SpecializationTable`]; the modifier pipeline
//! reads the table instead of branching on the variant, so adding an
//! archetype means adding a table.
use crate::timeline::Timeline;

/// Mutually exclusive character archetype.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Specialization {
    #[default]
    None,
    TimelineWeaver,
    VoidWalker,
    LightBringer,
    ChronoMaster,
}

impl Specialization {
    pub const fn table(self) -> &'static SpecializationTable {
        match self {
            Specialization::None => &SpecializationTable::NONE,
            Specialization::TimelineWeaver => &SpecializationTable::TIMELINE_WEAVER,
            Specialization::VoidWalker => &SpecializationTable::VOID_WALKER,
            Specialization::LightBringer => &SpecializationTable::LIGHT_BRINGER,
            Specialization::ChronoMaster => &SpecializationTable::CHRONO_MASTER,
        }
    }
}

/// Multipliers applied once to the sheet when a specialization is active.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatMultipliers {
    pub health: f32,
    pub timeline_energy: f32,
    pub stamina_regen: f32,
    pub timeline_power: f32,
    pub critical_chance: f32,
    pub dodge_chance: f32,
    pub energy_efficiency: f32,
    pub damage_bonus: f32,
    pub resistance: f32,
}

impl StatMultipliers {
    pub const IDENTITY: StatMultipliers = StatMultipliers {
        health: 1.0,
        timeline_energy: 1.0,
        stamina_regen: 1.0,
        timeline_power: 1.0,
        critical_chance: 1.0,
        dodge_chance: 1.0,
        energy_efficiency: 1.0,
        damage_bonus: 1.0,
        resistance: 1.0,
    };
}

/// An elemental leaning toward one concrete timeline.
///
/// Damage of that element is amplified, attacks from the opposing element
/// land harder, and synergy rises while the element's timeline is current.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementalBias {
    pub element: Timeline,
    pub damage_factor: f32,
    pub weakness_factor: f32,
    pub synergy_bonus: f32,
}

/// How strongly the synergy score feeds each modifier (`1 + synergy * k`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SynergyScaling {
    pub damage: f32,
    pub defense: f32,
    pub energy: f32,
}

impl SynergyScaling {
    pub const NONE: SynergyScaling = SynergyScaling {
        damage: 0.0,
        defense: 0.0,
        energy: 0.0,
    };
}

/// Fixed constants a specialization contributes to the modifier pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpecializationTable {
    /// Unconditional damage multiplier.
    pub damage_factor: f32,
    /// Unconditional defense multiplier.
    pub defense_factor: f32,
    /// Unconditional energy-efficiency multiplier.
    pub energy_factor: f32,
    pub elemental: Option<ElementalBias>,
    /// Synergy added regardless of the current timeline.
    pub synergy_bonus: f32,
    pub synergy_scaling: SynergyScaling,
    /// Ignores timeline requirements on abilities.
    pub unrestricted_abilities: bool,
    /// Sheet bonuses applied once while this specialization is active.
    pub bonuses: StatMultipliers,
}

impl SpecializationTable {
    pub const NONE: SpecializationTable = SpecializationTable {
        damage_factor: 1.0,
        defense_factor: 1.0,
        energy_factor: 1.0,
        elemental: None,
        synergy_bonus: 0.0,
        synergy_scaling: SynergyScaling::NONE,
        unrestricted_abilities: false,
        bonuses: StatMultipliers::IDENTITY,
    };

    pub const TIMELINE_WEAVER: SpecializationTable = SpecializationTable {
        damage_factor: 1.2,
        defense_factor: 1.1,
        energy_factor: 1.3,
        synergy_bonus: 0.2,
        unrestricted_abilities: true,
        bonuses: StatMultipliers {
            energy_efficiency: 1.5,
            damage_bonus: 1.3,
            ..StatMultipliers::IDENTITY
        },
        ..Self::NONE
    };

    pub const VOID_WALKER: SpecializationTable = SpecializationTable {
        elemental: Some(ElementalBias {
            element: Timeline::DarkWorld,
            damage_factor: 1.3,
            weakness_factor: 0.8,
            synergy_bonus: 0.4,
        }),
        bonuses: StatMultipliers {
            critical_chance: 1.5,
            dodge_chance: 1.3,
            ..StatMultipliers::IDENTITY
        },
        ..Self::NONE
    };

    pub const LIGHT_BRINGER: SpecializationTable = SpecializationTable {
        elemental: Some(ElementalBias {
            element: Timeline::BrightWorld,
            damage_factor: 1.3,
            weakness_factor: 0.8,
            synergy_bonus: 0.4,
        }),
        bonuses: StatMultipliers {
            health: 1.3,
            timeline_power: 1.3,
            ..StatMultipliers::IDENTITY
        },
        ..Self::NONE
    };

    pub const CHRONO_MASTER: SpecializationTable = SpecializationTable {
        synergy_bonus: 0.3,
        synergy_scaling: SynergyScaling {
            damage: 1.0,
            defense: 0.5,
            energy: 1.0,
        },
        unrestricted_abilities: true,
        bonuses: StatMultipliers {
            resistance: 1.3,
            energy_efficiency: 1.3,
            ..StatMultipliers::IDENTITY
        },
        ..Self::NONE
    };

    /// Synergy this table adds given the current timeline.
    pub fn synergy(&self, current: Timeline) -> f32 {
        let elemental = self
            .elemental
            .filter(|bias| bias.element == current)
            .map_or(0.0, |bias| bias.synergy_bonus);
        self.synergy_bonus + elemental
    }

    pub fn damage_term(&self, damage_timeline: Timeline, synergy: f32) -> f32 {
        let elemental = self
            .elemental
            .filter(|bias| bias.element == damage_timeline)
            .map_or(1.0, |bias| bias.damage_factor);
        self.damage_factor * elemental * (1.0 + synergy * self.synergy_scaling.damage)
    }

    pub fn defense_term(&self, attack_timeline: Timeline, synergy: f32) -> f32 {
        let weakness = self
            .elemental
            .filter(|bias| bias.element.opposes(attack_timeline))
            .map_or(1.0, |bias| bias.weakness_factor);
        self.defense_factor * weakness * (1.0 + synergy * self.synergy_scaling.defense)
    }

    pub fn energy_term(&self, synergy: f32) -> f32 {
        self.energy_factor * (1.0 + synergy * self.synergy_scaling.energy)
    }
}
