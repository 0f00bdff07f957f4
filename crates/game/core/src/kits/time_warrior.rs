//! Time Warrior: melee stances keyed by timeline, timeline-input combos and
//! a temporary time shift.
use arrayvec::ArrayVec;

use super::KitContext;
use super::timer::Countdown;
use crate::character::{ClassEvent, TimedEffect};
use crate::error::AbilityError;
use crate::modifier::{ModifierContributor, ModifierSource, ModifierStack};
use crate::timeline::{Timeline, TimelineContext};

pub const MAX_COMBO_LENGTH: usize = 4;

/// Multipliers of one stance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stance {
    pub damage: f32,
    pub defense: f32,
    pub speed: f32,
    /// Scales the energy cost of stance abilities.
    pub energy_rate: f32,
}

impl Stance {
    pub const fn for_timeline(timeline: Timeline) -> Stance {
        match timeline {
            Timeline::Any => Stance {
                damage: 1.0,
                defense: 1.0,
                speed: 1.0,
                energy_rate: 1.0,
            },
            Timeline::DarkWorld => Stance {
                damage: 1.4,
                defense: 0.8,
                speed: 1.2,
                energy_rate: 1.2,
            },
            Timeline::BrightWorld => Stance {
                damage: 1.2,
                defense: 1.3,
                speed: 0.9,
                energy_rate: 1.3,
            },
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarriorCombo {
    CrossTimelineSlash,
    TimelineSurge,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComboProfile {
    pub sequence: &'static [Timeline],
    pub damage_multiplier: f32,
    pub energy_cost: f32,
    pub cooldown: f32,
    pub requires_time_shift: bool,
}

impl WarriorCombo {
    pub const fn profile(self) -> ComboProfile {
        match self {
            WarriorCombo::CrossTimelineSlash => ComboProfile {
                sequence: &[Timeline::DarkWorld, Timeline::BrightWorld],
                damage_multiplier: 2.0,
                energy_cost: 40.0,
                cooldown: 5.0,
                requires_time_shift: true,
            },
            WarriorCombo::TimelineSurge => ComboProfile {
                sequence: &[Timeline::Any, Timeline::Any, Timeline::Any],
                damage_multiplier: 2.5,
                energy_cost: 60.0,
                cooldown: 8.0,
                requires_time_shift: false,
            },
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWarriorConfig {
    pub stance_cooldown: f32,
    pub combo_window: f32,
    pub time_shift_duration: f32,
    pub time_shift_cooldown: f32,
    pub time_shift_cost: f32,
    pub stance_ability_cost: f32,
    /// Seconds added to a running time shift on entering the stance's timeline.
    pub matching_timeline_extension: f32,
}

impl Default for TimeWarriorConfig {
    fn default() -> Self {
        Self {
            stance_cooldown: 2.0,
            combo_window: 3.0,
            time_shift_duration: 10.0,
            time_shift_cooldown: 15.0,
            time_shift_cost: 50.0,
            stance_ability_cost: 30.0,
            matching_timeline_extension: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeWarrior {
    config: TimeWarriorConfig,
    stance: Timeline,
    stance_cooldown: Countdown,
    combo: ArrayVec<Timeline, MAX_COMBO_LENGTH>,
    combo_window: Countdown,
    combo_cooldowns: [Countdown; 2],
    time_shift: Countdown,
    time_shift_target: Option<Timeline>,
    time_shift_cooldown: Countdown,
}

impl TimeWarrior {
    pub fn new(config: TimeWarriorConfig) -> Self {
        Self {
            config,
            stance: Timeline::Any,
            stance_cooldown: Countdown::default(),
            combo: ArrayVec::new(),
            combo_window: Countdown::default(),
            combo_cooldowns: [Countdown::default(); 2],
            time_shift: Countdown::default(),
            time_shift_target: None,
            time_shift_cooldown: Countdown::default(),
        }
    }

    pub fn config(&self) -> &TimeWarriorConfig {
        &self.config
    }

    pub fn stance(&self) -> Timeline {
        self.stance
    }

    pub fn stance_profile(&self) -> Stance {
        Stance::for_timeline(self.stance)
    }

    pub fn combo_inputs(&self) -> &[Timeline] {
        &self.combo
    }

    pub fn combo_window_remaining(&self) -> f32 {
        self.combo_window.remaining()
    }

    pub fn is_time_shifted(&self) -> bool {
        self.time_shift.is_active()
    }

    pub fn time_shift_target(&self) -> Option<Timeline> {
        self.time_shift_target
    }

    pub fn time_shift_remaining(&self) -> f32 {
        self.time_shift.remaining()
    }

    pub fn movement_speed(&self) -> f32 {
        self.stance_profile().speed
    }

    /// Stance damage, boosted when the current timeline matches the stance.
    pub fn stance_bonus(&self, context: TimelineContext) -> f32 {
        let bonus = self.stance_profile().damage;
        if context.current() == Some(self.stance) {
            bonus * 1.2
        } else {
            bonus
        }
    }

    /// 1.3 when the timeline matches the stance, 0.8 when a concrete stance
    /// meets the other concrete timeline.
    pub fn timeline_stance_modifier(&self, context: TimelineContext) -> f32 {
        match context.current() {
            None => 1.0,
            Some(current) if current == self.stance => 1.3,
            Some(current) if current.opposes(self.stance) => 0.8,
            Some(_) => 1.0,
        }
    }

    pub fn switch_stance(
        &mut self,
        stance: Timeline,
        cx: &mut KitContext<'_>,
    ) -> Result<(), AbilityError> {
        if stance == self.stance {
            return Err(AbilityError::AlreadyActive("stance"));
        }
        if self.stance_cooldown.is_active() {
            return Err(AbilityError::OnCooldown {
                ability: "stance switch",
                remaining: self.stance_cooldown.remaining(),
            });
        }
        self.stance = stance;
        self.stance_cooldown.start(self.config.stance_cooldown);
        cx.emit(ClassEvent::StanceChanged(stance));
        Ok(())
    }

    /// Appends a timeline input to the combo and reopens the window.
    /// Returns the new combo length.
    pub fn register_combo_input(
        &mut self,
        input: Timeline,
        cx: &mut KitContext<'_>,
    ) -> Result<usize, AbilityError> {
        self.combo
            .try_push(input)
            .map_err(|_| AbilityError::ComboFull)?;
        self.combo_window.start(self.config.combo_window);
        let length = self.combo.len();
        cx.emit(ClassEvent::ComboInput { input, length });
        Ok(length)
    }

    /// Executes `combo` if the registered inputs match it and returns the
    /// damage multiplier of the finisher.
    pub fn execute_combo(
        &mut self,
        combo: WarriorCombo,
        cx: &mut KitContext<'_>,
    ) -> Result<f32, AbilityError> {
        let profile = combo.profile();
        if self.combo.as_slice() != profile.sequence {
            return Err(AbilityError::ComboMismatch(combo.into()));
        }
        let cooldown = &self.combo_cooldowns[combo.slot()];
        if cooldown.is_active() {
            return Err(AbilityError::OnCooldown {
                ability: combo.into(),
                remaining: cooldown.remaining(),
            });
        }
        if profile.requires_time_shift && !self.is_time_shifted() {
            return Err(AbilityError::NotAllowed("combo requires time shift"));
        }
        cx.spend_energy(profile.energy_cost * cx.energy_modifier())?;

        let damage_multiplier = profile.damage_multiplier * self.combo_bonus();
        self.combo_cooldowns[combo.slot()].start(profile.cooldown);
        self.reset_combo(cx);
        cx.emit(ClassEvent::ComboExecuted {
            combo,
            damage_multiplier,
        });
        Ok(damage_multiplier)
    }

    pub fn reset_combo(&mut self, cx: &mut KitContext<'_>) {
        self.combo.clear();
        self.combo_window.stop();
        cx.emit(ClassEvent::ComboReset);
    }

    pub fn time_shift(
        &mut self,
        target: Timeline,
        cx: &mut KitContext<'_>,
    ) -> Result<(), AbilityError> {
        if self.time_shift.is_active() {
            return Err(AbilityError::AlreadyActive("time shift"));
        }
        if self.time_shift_cooldown.is_active() {
            return Err(AbilityError::OnCooldown {
                ability: "time shift",
                remaining: self.time_shift_cooldown.remaining(),
            });
        }
        cx.spend_energy(self.config.time_shift_cost * cx.energy_modifier())?;

        self.time_shift.start(self.config.time_shift_duration);
        self.time_shift_cooldown.start(self.config.time_shift_cooldown);
        self.time_shift_target = Some(target);
        cx.emit(ClassEvent::Activated {
            effect: TimedEffect::TimeShift,
            duration: self.config.time_shift_duration,
            location: None,
        });
        Ok(())
    }

    pub fn end_time_shift(&mut self, cx: &mut KitContext<'_>) -> bool {
        self.finish_time_shift(false, cx)
    }

    /// Uses the stance ability and returns the energy it cost.
    pub fn execute_stance_ability(&mut self, cx: &mut KitContext<'_>) -> Result<f32, AbilityError> {
        let energy_cost = self.config.stance_ability_cost
            * self.stance_profile().energy_rate
            * cx.energy_modifier();
        cx.spend_energy(energy_cost)?;
        cx.emit(ClassEvent::StanceAbilityUsed {
            stance: self.stance,
            energy_cost,
        });
        Ok(energy_cost)
    }

    pub(crate) fn advance(&mut self, delta_time: f32, cx: &mut KitContext<'_>) {
        self.stance_cooldown.advance(delta_time);
        if self.combo_window.advance(delta_time) {
            self.reset_combo(cx);
        }
        for cooldown in &mut self.combo_cooldowns {
            cooldown.advance(delta_time);
        }
        if self.time_shift.advance(delta_time) {
            self.time_shift_target = None;
            cx.emit(ClassEvent::Deactivated {
                effect: TimedEffect::TimeShift,
                expired: true,
            });
        }
        self.time_shift_cooldown.advance(delta_time);
    }

    pub(crate) fn on_timeline_changed(&mut self, new_state: Timeline, _cx: &mut KitContext<'_>) {
        if self.time_shift.is_active() && new_state == self.stance {
            self.time_shift
                .extend(self.config.matching_timeline_extension);
        }
    }

    pub(crate) fn repair(&mut self) -> bool {
        let mut changed = self.stance_cooldown.repair();
        changed |= self.combo_window.repair();
        changed |= self.time_shift.repair();
        changed |= self.time_shift_cooldown.repair();
        for cooldown in &mut self.combo_cooldowns {
            changed |= cooldown.repair();
        }
        if !self.time_shift.is_active() && self.time_shift_target.take().is_some() {
            changed = true;
        }
        if !self.combo_window.is_active() && !self.combo.is_empty() {
            self.combo.clear();
            changed = true;
        }
        changed
    }

    fn combo_bonus(&self) -> f32 {
        let mut bonus = self.stance_profile().damage;
        if self.is_time_shifted() {
            bonus *= 1.2;
        }
        bonus * (1.0 + self.combo.len() as f32 * 0.1)
    }

    fn finish_time_shift(&mut self, expired: bool, cx: &mut KitContext<'_>) -> bool {
        if !self.time_shift.stop() {
            return false;
        }
        self.time_shift_target = None;
        cx.emit(ClassEvent::Deactivated {
            effect: TimedEffect::TimeShift,
            expired,
        });
        true
    }
}

impl Default for TimeWarrior {
    fn default() -> Self {
        Self::new(TimeWarriorConfig::default())
    }
}

impl ModifierContributor for TimeWarrior {
    fn contribute_damage(
        &self,
        context: TimelineContext,
        _damage_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push(
            ModifierSource::Stance,
            self.stance_profile().damage * self.timeline_stance_modifier(context),
        );
        stack.push_if(self.is_time_shifted(), ModifierSource::TimeShift, 1.3);
    }

    fn contribute_defense(
        &self,
        context: TimelineContext,
        _attack_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push(
            ModifierSource::Stance,
            self.stance_profile().defense * self.timeline_stance_modifier(context),
        );
        stack.push_if(self.is_time_shifted(), ModifierSource::TimeShift, 1.2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx;
    use crate::character::{Character, CharacterId, ClassKind, ClassTemplate};

    fn warrior() -> Character {
        Character::new(
            CharacterId(3),
            "Kael",
            &ClassTemplate::builtin(ClassKind::TimeWarrior),
        )
    }

    fn dark() -> TimelineContext {
        TimelineContext::bound(Timeline::DarkWorld)
    }

    #[test]
    fn stance_switch_has_cooldown() {
        let mut hero = warrior();
        let first = hero.time_warrior(dark(), |k, cx| k.switch_stance(Timeline::DarkWorld, cx));
        assert_eq!(first, Some(Ok(())));
        let second = hero.time_warrior(dark(), |k, cx| k.switch_stance(Timeline::BrightWorld, cx));
        assert!(matches!(second, Some(Err(AbilityError::OnCooldown { .. }))));

        hero.advance(2.0, dark());
        let third = hero.time_warrior(dark(), |k, cx| k.switch_stance(Timeline::BrightWorld, cx));
        assert_eq!(third, Some(Ok(())));
        assert_approx!(hero.movement_speed(), 0.9);
    }

    #[test]
    fn combo_holds_four_inputs_and_expires() {
        let mut hero = warrior();
        for _ in 0..MAX_COMBO_LENGTH {
            let pushed = hero.time_warrior(dark(), |k, cx| k.register_combo_input(Timeline::Any, cx));
            assert!(matches!(pushed, Some(Ok(_))));
        }
        let full = hero.time_warrior(dark(), |k, cx| k.register_combo_input(Timeline::Any, cx));
        assert_eq!(full, Some(Err(AbilityError::ComboFull)));

        hero.advance(3.0, dark());
        let kit = hero.kit().as_time_warrior().cloned().unwrap_or_default();
        assert!(kit.combo_inputs().is_empty());
    }

    #[test]
    fn surge_multiplier_includes_length_bonus() {
        let mut hero = warrior();
        for _ in 0..3 {
            hero.time_warrior(dark(), |k, cx| k.register_combo_input(Timeline::Any, cx));
        }
        let result = hero.time_warrior(dark(), |k, cx| k.execute_combo(WarriorCombo::TimelineSurge, cx));
        let multiplier = result.and_then(Result::ok).unwrap_or_default();
        // neutral stance, not shifted, three inputs
        assert_approx!(multiplier, 2.5 * 1.3);
        let kit = hero.kit().as_time_warrior().cloned().unwrap_or_default();
        assert!(kit.combo_inputs().is_empty());
    }

    #[test]
    fn cross_slash_requires_time_shift() {
        let mut hero = warrior();
        for input in [Timeline::DarkWorld, Timeline::BrightWorld] {
            hero.time_warrior(dark(), |k, cx| k.register_combo_input(input, cx));
        }
        let refused =
            hero.time_warrior(dark(), |k, cx| k.execute_combo(WarriorCombo::CrossTimelineSlash, cx));
        assert_eq!(
            refused,
            Some(Err(AbilityError::NotAllowed("combo requires time shift")))
        );

        let shifted = hero.time_warrior(dark(), |k, cx| k.time_shift(Timeline::BrightWorld, cx));
        assert_eq!(shifted, Some(Ok(())));
        let slash =
            hero.time_warrior(dark(), |k, cx| k.execute_combo(WarriorCombo::CrossTimelineSlash, cx));
        let multiplier = slash.and_then(Result::ok).unwrap_or_default();
        assert_approx!(multiplier, 2.0 * 1.2 * 1.2);
    }

    #[test]
    fn mismatched_inputs_are_rejected() {
        let mut hero = warrior();
        hero.time_warrior(dark(), |k, cx| k.register_combo_input(Timeline::DarkWorld, cx));
        let result = hero.time_warrior(dark(), |k, cx| k.execute_combo(WarriorCombo::TimelineSurge, cx));
        assert!(matches!(result, Some(Err(AbilityError::ComboMismatch(_)))));
    }

    #[test]
    fn matching_timeline_extends_time_shift() {
        let mut kit = TimeWarrior::default();
        kit.stance = Timeline::DarkWorld;
        kit.time_shift.start(10.0);
        let mut hero = warrior();
        hero.time_warrior(dark(), |k, _| *k = kit.clone());
        hero.on_timeline_changed(Timeline::DarkWorld, dark());
        let state = hero.kit().as_time_warrior().cloned().unwrap_or_default();
        assert_approx!(state.time_shift_remaining(), 12.0);
    }

    #[test]
    fn stance_contribution_follows_timeline() {
        let mut kit = TimeWarrior::default();
        kit.stance = Timeline::DarkWorld;
        let mut stack = ModifierStack::new();
        kit.contribute_damage(dark(), Timeline::DarkWorld, &mut stack);
        assert_approx!(stack.factor_of(ModifierSource::Stance), 1.4 * 1.3);

        let mut stack = ModifierStack::new();
        kit.contribute_defense(
            TimelineContext::bound(Timeline::BrightWorld),
            Timeline::DarkWorld,
            &mut stack,
        );
        assert_approx!(stack.factor_of(ModifierSource::Stance), 0.8 * 0.8);
        assert_approx!(kit.stance_bonus(dark()), 1.4 * 1.2);
    }
}
