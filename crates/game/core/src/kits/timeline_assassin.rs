//! Timeline Assassin: stealth, phase shifting and positional finishers.
use super::KitContext;
use super::timer::Countdown;
use crate::character::{ClassEvent, TimedEffect};
use crate::error::AbilityError;
use crate::math::Vec3;
use crate::modifier::{ModifierContributor, ModifierSource, ModifierStack};
use crate::timeline::{Timeline, TimelineContext};

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineAssassinConfig {
    pub stealth_duration: f32,
    pub stealth_cost: f32,
    pub stealth_speed: f32,
    pub detection_radius: f32,
    pub phase_shift_cost: f32,
    pub phase_shift_speed: f32,
    /// Stealth duration bonus while phase-shifted.
    pub phase_stealth_bonus: f32,
    pub assassination_range: f32,
    /// Widest angle, in degrees, between the approach and the target's facing.
    pub backstab_angle: f32,
}

impl Default for TimelineAssassinConfig {
    fn default() -> Self {
        Self {
            stealth_duration: 30.0,
            stealth_cost: 30.0,
            stealth_speed: 0.7,
            detection_radius: 300.0,
            phase_shift_cost: 50.0,
            phase_shift_speed: 1.3,
            phase_stealth_bonus: 0.5,
            assassination_range: 200.0,
            backstab_angle: 60.0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimelineAssassin {
    config: TimelineAssassinConfig,
    stealth: Countdown,
    phase_shift: Countdown,
}

impl TimelineAssassin {
    pub fn new(config: TimelineAssassinConfig) -> Self {
        Self {
            config,
            stealth: Countdown::default(),
            phase_shift: Countdown::default(),
        }
    }

    pub fn config(&self) -> &TimelineAssassinConfig {
        &self.config
    }

    pub fn is_stealthed(&self) -> bool {
        self.stealth.is_active()
    }

    pub fn is_phase_shifted(&self) -> bool {
        self.phase_shift.is_active()
    }

    pub fn stealth_remaining(&self) -> f32 {
        self.stealth.remaining()
    }

    pub fn phase_shift_remaining(&self) -> f32 {
        self.phase_shift.remaining()
    }

    /// Phase shift speed wins over the stealth penalty.
    pub fn movement_speed(&self) -> f32 {
        if self.is_phase_shifted() {
            self.config.phase_shift_speed
        } else if self.is_stealthed() {
            self.config.stealth_speed
        } else {
            1.0
        }
    }

    pub fn stealth_bonus(&self, context: TimelineContext) -> f32 {
        let mut bonus = 0.0;
        if context.is(Timeline::DarkWorld) {
            bonus += 0.3;
        }
        if self.is_phase_shifted() {
            bonus += self.config.phase_stealth_bonus;
        }
        bonus
    }

    /// Radius at which enemies notice a stealthed assassin.
    pub fn detection_radius(&self, context: TimelineContext) -> f32 {
        match context.current() {
            Some(Timeline::DarkWorld) => self.config.detection_radius * 0.7,
            Some(Timeline::BrightWorld) => self.config.detection_radius * 1.3,
            _ => self.config.detection_radius,
        }
    }

    pub fn phase_shift_duration(context: TimelineContext) -> f32 {
        match context.current() {
            Some(Timeline::DarkWorld) => 7.0,
            Some(Timeline::BrightWorld) => 4.0,
            _ => 5.0,
        }
    }

    pub fn assassination_multiplier(context: TimelineContext) -> f32 {
        match context.current() {
            Some(Timeline::DarkWorld) => 6.0,
            Some(Timeline::BrightWorld) => 4.0,
            _ => 5.0,
        }
    }

    pub fn attempt_stealth(&mut self, cx: &mut KitContext<'_>) -> Result<f32, AbilityError> {
        if self.stealth.is_active() {
            return Err(AbilityError::AlreadyActive("stealth"));
        }
        cx.spend_energy(self.config.stealth_cost * cx.energy_modifier())?;

        let duration = self.config.stealth_duration * (1.0 + self.stealth_bonus(cx.timeline()));
        self.stealth.start(duration);
        cx.emit(ClassEvent::Activated {
            effect: TimedEffect::Stealth,
            duration,
            location: None,
        });
        Ok(duration)
    }

    pub fn break_stealth(&mut self, cx: &mut KitContext<'_>) -> bool {
        end_effect(&mut self.stealth, TimedEffect::Stealth, false, cx)
    }

    pub fn attempt_phase_shift(&mut self, cx: &mut KitContext<'_>) -> Result<f32, AbilityError> {
        if self.phase_shift.is_active() {
            return Err(AbilityError::AlreadyActive("phase shift"));
        }
        cx.spend_energy(self.config.phase_shift_cost * cx.energy_modifier())?;

        let duration = Self::phase_shift_duration(cx.timeline());
        self.phase_shift.start(duration);
        cx.emit(ClassEvent::Activated {
            effect: TimedEffect::PhaseShift,
            duration,
            location: None,
        });
        Ok(duration)
    }

    pub fn end_phase_shift(&mut self, cx: &mut KitContext<'_>) -> bool {
        end_effect(&mut self.phase_shift, TimedEffect::PhaseShift, false, cx)
    }

    /// Stealthed, within range, and approaching from behind the target.
    pub fn can_assassinate(&self, origin: Vec3, target: Vec3, target_facing: Vec3) -> bool {
        if !self.is_stealthed() || origin.distance(target) > self.config.assassination_range {
            return false;
        }
        (target - origin)
            .angle_degrees(target_facing)
            .is_some_and(|angle| angle <= self.config.backstab_angle)
    }

    pub fn assassination_damage(&self, base: f32, context: TimelineContext) -> f32 {
        let mut damage = base * Self::assassination_multiplier(context);
        if context.is(Timeline::DarkWorld) {
            damage *= 1.5;
        }
        if self.is_phase_shifted() {
            damage *= 1.3;
        }
        damage
    }

    pub(crate) fn advance(&mut self, delta_time: f32, cx: &mut KitContext<'_>) {
        if self.stealth.advance(delta_time) {
            cx.emit(ClassEvent::Deactivated {
                effect: TimedEffect::Stealth,
                expired: true,
            });
        }
        if self.phase_shift.advance(delta_time) {
            cx.emit(ClassEvent::Deactivated {
                effect: TimedEffect::PhaseShift,
                expired: true,
            });
        }
    }

    pub(crate) fn repair(&mut self) -> bool {
        let stealth = self.stealth.repair();
        let phase = self.phase_shift.repair();
        stealth || phase
    }
}

impl ModifierContributor for TimelineAssassin {
    fn contribute_damage(
        &self,
        context: TimelineContext,
        damage_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push_if(self.is_stealthed(), ModifierSource::Stealth, 2.0);
        stack.push_if(self.is_phase_shifted(), ModifierSource::PhaseShift, 1.5);
        stack.push_if(
            context.is(Timeline::DarkWorld) && damage_timeline == Timeline::DarkWorld,
            ModifierSource::DarkAffinity,
            1.3,
        );
    }

    fn contribute_defense(
        &self,
        _context: TimelineContext,
        _attack_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push_if(self.is_stealthed(), ModifierSource::Stealth, 0.7);
        stack.push_if(self.is_phase_shifted(), ModifierSource::PhaseShift, 0.8);
    }
}

fn end_effect(
    timer: &mut Countdown,
    effect: TimedEffect,
    expired: bool,
    cx: &mut KitContext<'_>,
) -> bool {
    if !timer.stop() {
        return false;
    }
    cx.emit(ClassEvent::Deactivated { effect, expired });
    true
}
