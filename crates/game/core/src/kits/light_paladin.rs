//! Light Paladin: a healer-tank built around a light pool whose buildup
//! turns into resonance.
use super::KitContext;
use super::pool::{PoolConfig, PoolRates, ThresholdEdge, ThresholdPool};
use super::timer::Countdown;
use crate::character::{ClassEvent, PoolKind, TimedEffect};
use crate::error::AbilityError;
use crate::math::Vec3;
use crate::modifier::{ModifierContributor, ModifierSource, ModifierStack};
use crate::timeline::{Timeline, TimelineContext};

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
pub enum LightAbility {
    LightBlessing,
    DivineProtection,
}

/// Cost and effect of one light ability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightAbilityProfile {
    pub light_cost: f32,
    pub resonance_gain: f32,
    pub cooldown: f32,
    pub healing_multiplier: f32,
    pub requires_bright: bool,
}

impl LightAbility {
    pub const fn profile(self) -> LightAbilityProfile {
        match self {
            LightAbility::LightBlessing => LightAbilityProfile {
                light_cost: 30.0,
                resonance_gain: 10.0,
                cooldown: 5.0,
                healing_multiplier: 1.5,
                requires_bright: false,
            },
            LightAbility::DivineProtection => LightAbilityProfile {
                light_cost: 80.0,
                resonance_gain: 30.0,
                cooldown: 20.0,
                healing_multiplier: 2.0,
                requires_bright: true,
            },
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightPaladinConfig {
    pub pool: PoolConfig,
    /// Timeline energy to begin channeling, before the energy modifier.
    pub channel_energy_cost: f32,
    pub barrier_duration: f32,
    pub barrier_range: f32,
    pub barrier_cost: f32,
    pub base_healing: f32,
    pub healing_range: f32,
    pub healing_cost: f32,
    /// Fraction of healing power restored to self per second while resonating.
    pub resonance_heal_rate: f32,
    pub resonance_barrier_extension: f32,
    pub resonance_healing_boost: f32,
}

impl Default for LightPaladinConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig {
                max_power: 200.0,
                threshold: 100.0,
                channel_rate: 10.0,
                buildup_rate: 5.0,
                buildup_decay: 5.0,
                idle_power_rate: -2.0,
                active_capacity: 1.0,
                buildup_cap: 2.0,
            },
            channel_energy_cost: 20.0,
            barrier_duration: 20.0,
            barrier_range: 800.0,
            barrier_cost: 50.0,
            base_healing: 50.0,
            healing_range: 500.0,
            healing_cost: 30.0,
            resonance_heal_rate: 0.1,
            resonance_barrier_extension: 5.0,
            resonance_healing_boost: 1.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightPaladin {
    config: LightPaladinConfig,
    pool: ThresholdPool,
    barrier: Countdown,
    barrier_location: Option<Vec3>,
    cooldowns: [Countdown; 2],
    /// Healing boost granted by resonance; cleared when resonance ends.
    empowered: bool,
}

impl LightPaladin {
    pub fn new(config: LightPaladinConfig) -> Self {
        Self {
            pool: ThresholdPool::new(config.pool),
            barrier: Countdown::default(),
            barrier_location: None,
            cooldowns: [Countdown::default(); 2],
            empowered: false,
            config,
        }
    }

    pub fn config(&self) -> &LightPaladinConfig {
        &self.config
    }

    pub fn light_power(&self) -> f32 {
        self.pool.power()
    }

    pub fn resonance(&self) -> f32 {
        self.pool.buildup()
    }

    pub fn is_resonating(&self) -> bool {
        self.pool.is_active()
    }

    pub fn is_channeling(&self) -> bool {
        self.pool.is_channeling()
    }

    pub fn is_empowered(&self) -> bool {
        self.empowered
    }

    pub fn has_barrier(&self) -> bool {
        self.barrier.is_active()
    }

    pub fn barrier_location(&self) -> Option<Vec3> {
        self.barrier_location
    }

    pub fn barrier_remaining(&self) -> f32 {
        self.barrier.remaining()
    }

    pub fn cooldown_remaining(&self, ability: LightAbility) -> f32 {
        self.cooldowns[ability.slot()].remaining()
    }

    /// Channel and healing multipliers for the current timeline.
    fn timeline_rates(context: TimelineContext) -> (f32, f32) {
        match context.current() {
            Some(Timeline::BrightWorld) => (1.5, 1.3),
            Some(Timeline::DarkWorld) => (0.7, 0.7),
            _ => (1.0, 1.0),
        }
    }

    /// Light power as a damage/healing bonus.
    pub fn light_bonus(&self, context: TimelineContext) -> f32 {
        let mut bonus = self.pool.power_ratio();
        if self.is_resonating() {
            bonus *= 1.5;
        }
        if context.is(Timeline::BrightWorld) {
            bonus *= 1.3;
        }
        bonus
    }

    pub fn healing_power(&self, context: TimelineContext) -> f32 {
        let (_, healing_rate) = Self::timeline_rates(context);
        let mut healing = self.config.base_healing * healing_rate;
        healing *= 1.0 + self.light_bonus(context);
        if self.is_resonating() {
            healing *= 1.5;
        }
        if context.is(Timeline::BrightWorld) {
            healing *= 1.3;
        }
        if self.empowered {
            healing *= self.config.resonance_healing_boost;
        }
        healing
    }

    /// Starts channeling light. Costs timeline energy scaled by the
    /// character's energy modifier.
    pub fn channel_light_power(&mut self, cx: &mut KitContext<'_>) -> Result<(), AbilityError> {
        if self.pool.is_channeling() {
            return Err(AbilityError::AlreadyActive("light channel"));
        }
        let cost = self.config.channel_energy_cost * cx.energy_modifier();
        cx.spend_energy(cost)?;
        self.pool.set_channeling(true);
        cx.emit(ClassEvent::ChannelStarted(PoolKind::Light));
        Ok(())
    }

    pub fn stop_channeling(&mut self, cx: &mut KitContext<'_>) -> bool {
        if !self.pool.set_channeling(false) {
            return false;
        }
        cx.emit(ClassEvent::ChannelStopped(PoolKind::Light));
        true
    }

    /// Casts a light ability and returns the healing it produced.
    pub fn cast_light_ability(
        &mut self,
        ability: LightAbility,
        cx: &mut KitContext<'_>,
    ) -> Result<f32, AbilityError> {
        let profile = ability.profile();
        if profile.requires_bright && !cx.timeline().is(Timeline::BrightWorld) {
            return Err(AbilityError::WrongTimeline {
                ability: ability.into(),
                required: Timeline::BrightWorld,
            });
        }
        let cooldown = &self.cooldowns[ability.slot()];
        if cooldown.is_active() {
            return Err(AbilityError::OnCooldown {
                ability: ability.into(),
                remaining: cooldown.remaining(),
            });
        }
        if !self.pool.spend(profile.light_cost) {
            return Err(light_shortfall(profile.light_cost, self.pool.power()));
        }

        self.cooldowns[ability.slot()].start(profile.cooldown);
        let edge = self.pool.add_buildup(profile.resonance_gain);
        self.handle_edge(edge, cx);
        if self.is_resonating() {
            self.apply_resonance_effects(cx);
        }

        let healing = self.healing_power(cx.timeline()) * profile.healing_multiplier;
        cx.emit(ClassEvent::LightAbilityCast { ability, healing });
        Ok(healing)
    }

    pub fn create_light_barrier(
        &mut self,
        origin: Vec3,
        location: Vec3,
        cx: &mut KitContext<'_>,
    ) -> Result<(), AbilityError> {
        if self.barrier.is_active() {
            return Err(AbilityError::AlreadyActive("light barrier"));
        }
        if self.pool.power() < self.config.barrier_cost {
            return Err(light_shortfall(self.config.barrier_cost, self.pool.power()));
        }
        let distance = origin.distance(location);
        if distance > self.config.barrier_range {
            return Err(AbilityError::OutOfRange {
                distance,
                range: self.config.barrier_range,
            });
        }

        self.pool.spend(self.config.barrier_cost);
        self.barrier.start(self.config.barrier_duration);
        self.barrier_location = Some(location);
        cx.emit(ClassEvent::Activated {
            effect: TimedEffect::LightBarrier,
            duration: self.config.barrier_duration,
            location: Some(location),
        });
        Ok(())
    }

    pub fn dismiss_light_barrier(&mut self, cx: &mut KitContext<'_>) -> bool {
        self.end_barrier(false, cx)
    }

    /// Heals a target in range and returns the amount.
    pub fn attempt_healing(
        &mut self,
        origin: Vec3,
        target: Vec3,
        cx: &mut KitContext<'_>,
    ) -> Result<f32, AbilityError> {
        if self.pool.power() < self.config.healing_cost {
            return Err(light_shortfall(self.config.healing_cost, self.pool.power()));
        }
        let distance = origin.distance(target);
        if distance > self.config.healing_range {
            return Err(AbilityError::OutOfRange {
                distance,
                range: self.config.healing_range,
            });
        }

        let amount = self.healing_power(cx.timeline());
        self.pool.spend(self.config.healing_cost);
        cx.emit(ClassEvent::HealingPerformed { target, amount });
        Ok(amount)
    }

    pub(crate) fn advance(&mut self, delta_time: f32, cx: &mut KitContext<'_>) {
        let (channel, _) = Self::timeline_rates(cx.timeline());
        let rates = PoolRates {
            channel,
            ..PoolRates::NEUTRAL
        };
        let edge = self.pool.advance(delta_time, rates);
        self.handle_edge(edge, cx);

        if self.is_resonating() {
            let heal =
                self.healing_power(cx.timeline()) * self.config.resonance_heal_rate * delta_time;
            cx.vitals_mut().health.restore(heal);
        }

        if self.barrier.advance(delta_time) {
            self.barrier_location = None;
            cx.emit(ClassEvent::Deactivated {
                effect: TimedEffect::LightBarrier,
                expired: true,
            });
        }
        for cooldown in &mut self.cooldowns {
            cooldown.advance(delta_time);
        }
    }

    pub(crate) fn on_timeline_changed(&mut self, new_state: Timeline, cx: &mut KitContext<'_>) {
        if self.is_resonating() && new_state == Timeline::BrightWorld {
            self.apply_resonance_effects(cx);
        }
    }

    pub(crate) fn repair(&mut self) -> bool {
        let mut changed = self.pool.repair();
        changed |= self.barrier.repair();
        for cooldown in &mut self.cooldowns {
            changed |= cooldown.repair();
        }
        if !self.barrier.is_active() && self.barrier_location.take().is_some() {
            changed = true;
        }
        if !self.is_resonating() && self.empowered {
            self.empowered = false;
            changed = true;
        }
        changed
    }

    fn apply_resonance_effects(&mut self, cx: &mut KitContext<'_>) {
        self.empowered = true;
        self.barrier.extend(self.config.resonance_barrier_extension);
        cx.emit(ClassEvent::ResonanceEmpowered);
    }

    fn handle_edge(&mut self, edge: Option<ThresholdEdge>, cx: &mut KitContext<'_>) {
        match edge {
            Some(ThresholdEdge::Rising) => cx.emit(ClassEvent::ThresholdReached(PoolKind::Light)),
            Some(ThresholdEdge::Falling) => {
                self.empowered = false;
                cx.emit(ClassEvent::ThresholdLost(PoolKind::Light));
            }
            None => {}
        }
    }

    fn end_barrier(&mut self, expired: bool, cx: &mut KitContext<'_>) -> bool {
        if !self.barrier.stop() {
            return false;
        }
        self.barrier_location = None;
        cx.emit(ClassEvent::Deactivated {
            effect: TimedEffect::LightBarrier,
            expired,
        });
        true
    }
}

impl Default for LightPaladin {
    fn default() -> Self {
        Self::new(LightPaladinConfig::default())
    }
}

impl ModifierContributor for LightPaladin {
    fn contribute_damage(
        &self,
        context: TimelineContext,
        damage_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push_if(
            damage_timeline == Timeline::DarkWorld && self.is_resonating(),
            ModifierSource::Resonance,
            1.5,
        );
        stack.push(ModifierSource::LightPower, 1.0 + self.light_bonus(context));
    }

    fn contribute_defense(
        &self,
        _context: TimelineContext,
        attack_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push_if(
            attack_timeline == Timeline::DarkWorld && self.is_resonating(),
            ModifierSource::Resonance,
            1.5,
        );
        stack.push_if(self.has_barrier(), ModifierSource::Barrier, 1.3);
    }
}

fn light_shortfall(required: f32, available: f32) -> AbilityError {
    AbilityError::InsufficientResource {
        resource: "light power",
        required,
        available,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::assert_approx;
    use crate::character::{Character, CharacterId, ClassKind, ClassObserver, ClassTemplate};

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<ClassEvent>>,
    }

    impl ClassObserver for Recorder {
        fn on_class_event(&self, _character: CharacterId, event: &ClassEvent) {
            self.events.borrow_mut().push(event.clone());
        }
    }

    impl Recorder {
        fn count(&self, wanted: &ClassEvent) -> usize {
            self.events.borrow().iter().filter(|e| *e == wanted).count()
        }
    }

    fn paladin() -> Character {
        Character::new(
            CharacterId(1),
            "Aurelia",
            &ClassTemplate::builtin(ClassKind::LightPaladin),
        )
    }

    fn bright() -> TimelineContext {
        TimelineContext::bound(Timeline::BrightWorld)
    }

    fn charge(hero: &mut Character, seconds: f32) {
        let started = hero.light_paladin(bright(), |kit, cx| kit.channel_light_power(cx));
        assert_eq!(started, Some(Ok(())));
        let steps = (seconds / 0.5) as u32;
        for _ in 0..steps {
            hero.advance(0.5, bright());
        }
    }

    #[test]
    fn channeling_costs_scaled_energy() {
        let mut hero = paladin();
        let before = hero.vitals().energy.current();
        let result = hero.light_paladin(bright(), |kit, cx| kit.channel_light_power(cx));
        assert_eq!(result, Some(Ok(())));
        // efficiency 1.3, preferred timeline x1.5
        assert_approx!(before - hero.vitals().energy.current(), 20.0 * 1.3 * 1.5);

        let again = hero.light_paladin(bright(), |kit, cx| kit.channel_light_power(cx));
        assert_eq!(again, Some(Err(AbilityError::AlreadyActive("light channel"))));
    }

    #[test]
    fn bright_world_channels_faster() {
        let mut hero = paladin();
        charge(&mut hero, 2.0);
        let kit = hero.kit().as_light_paladin().map(|k| k.light_power());
        assert_approx!(kit.unwrap_or_default(), 30.0);
    }

    #[test]
    fn divine_protection_requires_bright_world() {
        let mut hero = paladin();
        charge(&mut hero, 10.0);
        let dark = TimelineContext::bound(Timeline::DarkWorld);
        let result = hero.light_paladin(dark, |kit, cx| {
            kit.cast_light_ability(LightAbility::DivineProtection, cx)
        });
        assert!(matches!(
            result,
            Some(Err(AbilityError::WrongTimeline { .. }))
        ));
    }

    #[test]
    fn cast_spends_light_and_starts_cooldown() {
        let mut hero = paladin();
        charge(&mut hero, 10.0);
        let result = hero.light_paladin(bright(), |kit, cx| {
            kit.cast_light_ability(LightAbility::LightBlessing, cx)
        });
        assert!(matches!(result, Some(Ok(h)) if h > 0.0));

        let kit = hero.kit().as_light_paladin().cloned().unwrap_or_default();
        assert_approx!(kit.light_power(), 150.0 - 30.0);
        assert_approx!(kit.cooldown_remaining(LightAbility::LightBlessing), 5.0);

        let again = hero.light_paladin(bright(), |kit, cx| {
            kit.cast_light_ability(LightAbility::LightBlessing, cx)
        });
        assert!(matches!(again, Some(Err(AbilityError::OnCooldown { .. }))));
    }

    #[test]
    fn barrier_range_and_expiry() {
        let mut hero = paladin();
        charge(&mut hero, 10.0);
        let far = hero.light_paladin(bright(), |kit, cx| {
            kit.create_light_barrier(Vec3::ZERO, Vec3::new(900.0, 0.0, 0.0), cx)
        });
        assert!(matches!(far, Some(Err(AbilityError::OutOfRange { .. }))));

        let near = hero.light_paladin(bright(), |kit, cx| {
            kit.create_light_barrier(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), cx)
        });
        assert_eq!(near, Some(Ok(())));
        assert_approx!(
            hero.modify_defense(100.0, Timeline::BrightWorld, bright()),
            100.0 * 1.4 * 1.3
        );

        for _ in 0..41 {
            hero.advance(0.5, bright());
        }
        let kit = hero.kit().as_light_paladin().cloned().unwrap_or_default();
        assert!(!kit.has_barrier());
        assert_eq!(kit.barrier_location(), None);
    }

    #[test]
    fn resonance_adds_damage_against_darkness() {
        let mut kit = LightPaladin::default();
        kit.pool.add_buildup(120.0);
        assert!(kit.is_resonating());
        let mut stack = ModifierStack::new();
        kit.contribute_damage(TimelineContext::UNBOUND, Timeline::DarkWorld, &mut stack);
        assert_approx!(stack.factor_of(ModifierSource::Resonance), 1.5);
        // no light power stored
        assert!(!stack.contains(ModifierSource::LightPower));
    }

    #[test]
    fn casting_into_resonance_reports_the_edge_once() {
        let mut hero = paladin();
        let recorder = Rc::new(Recorder::default());
        hero.subscribe(recorder.clone());

        // 18s of bright channeling: power capped at 200, resonance 90
        charge(&mut hero, 18.0);
        let blessing = hero.light_paladin(bright(), |kit, cx| {
            kit.cast_light_ability(LightAbility::LightBlessing, cx)
        });
        assert!(matches!(blessing, Some(Ok(_))));
        let kit = hero.kit().as_light_paladin().cloned().unwrap_or_default();
        assert!(kit.is_resonating());
        assert!(kit.is_empowered());

        let protection = hero.light_paladin(bright(), |kit, cx| {
            kit.cast_light_ability(LightAbility::DivineProtection, cx)
        });
        assert!(matches!(protection, Some(Ok(_))));

        let reached = ClassEvent::ThresholdReached(PoolKind::Light);
        assert_eq!(recorder.count(&reached), 1);
        assert_eq!(recorder.count(&ClassEvent::ResonanceEmpowered), 2);
        let events = recorder.events.borrow();
        let edge = events.iter().position(|e| *e == reached);
        let empowered = events
            .iter()
            .position(|e| *e == ClassEvent::ResonanceEmpowered);
        assert!(edge < empowered);
    }

    #[test]
    fn resonance_heals_while_it_lasts() {
        let mut hero = paladin();
        let dark = TimelineContext::bound(Timeline::DarkWorld);
        hero.light_paladin(dark, |kit, _| kit.pool.add_buildup(120.0));
        hero.take_damage(50.0);
        let before = hero.vitals().health.current();

        hero.advance(1.0, dark);
        // base 50 * 0.7 in the DarkWorld, x1.5 resonating, 10% per second
        assert_approx!(hero.vitals().health.current(), before + 5.25, 1e-3);

        // idle decay drops resonance below the threshold after 5 more seconds
        for _ in 0..5 {
            hero.advance(1.0, dark);
        }
        let healed = hero.vitals().health.current();
        hero.advance(1.0, dark);
        assert_approx!(hero.vitals().health.current(), healed);
    }

    #[test]
    fn entering_bright_world_empowers_until_resonance_fades() {
        let mut hero = paladin();
        charge(&mut hero, 10.0);
        let placed = hero.light_paladin(bright(), |kit, cx| {
            kit.stop_channeling(cx);
            kit.create_light_barrier(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), cx)
        });
        assert_eq!(placed, Some(Ok(())));
        hero.light_paladin(bright(), |kit, _| kit.pool.add_buildup(70.0));

        let recorder = Rc::new(Recorder::default());
        hero.subscribe(recorder.clone());
        hero.on_timeline_changed(Timeline::BrightWorld, bright());

        let kit = hero.kit().as_light_paladin().cloned().unwrap_or_default();
        assert!(kit.is_empowered());
        assert_approx!(kit.barrier_remaining(), 20.0 + 5.0);

        // resonance 120 decays by 5 per second; the barrier lasts 25s
        for _ in 0..30 {
            hero.advance(1.0, bright());
        }
        let kit = hero.kit().as_light_paladin().cloned().unwrap_or_default();
        assert!(!kit.is_resonating());
        assert!(!kit.is_empowered());
        assert!(!kit.has_barrier());
        assert_eq!(
            *recorder.events.borrow(),
            vec![
                ClassEvent::ResonanceEmpowered,
                ClassEvent::ThresholdLost(PoolKind::Light),
                ClassEvent::Deactivated {
                    effect: TimedEffect::LightBarrier,
                    expired: true,
                },
            ]
        );
    }

    #[test]
    fn leaving_for_darkness_does_not_empower() {
        let mut hero = paladin();
        hero.light_paladin(bright(), |kit, _| kit.pool.add_buildup(120.0));
        let dark = TimelineContext::bound(Timeline::DarkWorld);
        hero.on_timeline_changed(Timeline::DarkWorld, dark);
        let kit = hero.kit().as_light_paladin().cloned().unwrap_or_default();
        assert!(kit.is_resonating());
        assert!(!kit.is_empowered());
    }

    #[test]
    fn healing_power_formula() {
        let mut kit = LightPaladin::default();
        kit.pool.set_channeling(true);
        kit.pool.advance(10.0, PoolRates::NEUTRAL);
        // 100 light, 50 resonance: not resonating
        assert_approx!(kit.healing_power(TimelineContext::UNBOUND), 50.0 * 1.5);
        let bright_bonus = 0.5 * 1.3;
        assert_approx!(
            kit.healing_power(bright()),
            50.0 * 1.3 * (1.0 + bright_bonus) * 1.3,
            1e-3
        );
    }
}
