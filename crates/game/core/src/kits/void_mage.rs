//! Void Mage: glass-cannon caster. Channeling void power builds corruption,
//! which trades health and defense for damage and capacity.
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
pub enum VoidAbility {
    VoidBlast,
    VoidEruption,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoidAbilityProfile {
    pub void_cost: f32,
    pub corruption_gain: f32,
    pub cooldown: f32,
    pub damage_multiplier: f32,
    pub requires_dark: bool,
}

impl VoidAbility {
    pub const fn profile(self) -> VoidAbilityProfile {
        match self {
            VoidAbility::VoidBlast => VoidAbilityProfile {
                void_cost: 30.0,
                corruption_gain: 10.0,
                cooldown: 3.0,
                damage_multiplier: 2.0,
                requires_dark: false,
            },
            VoidAbility::VoidEruption => VoidAbilityProfile {
                void_cost: 80.0,
                corruption_gain: 30.0,
                cooldown: 15.0,
                damage_multiplier: 4.0,
                requires_dark: true,
            },
        }
    }

    const fn slot(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoidMageConfig {
    pub pool: PoolConfig,
    pub channel_energy_cost: f32,
    pub portal_duration: f32,
    pub portal_range: f32,
    pub portal_cost: f32,
    /// Self-damage per second per point of corruption.
    pub corruption_damage_rate: f32,
    /// Fraction of current health kept when corruption takes hold.
    pub corruption_health_factor: f32,
}

impl Default for VoidMageConfig {
    fn default() -> Self {
        Self {
            pool: PoolConfig {
                max_power: 200.0,
                threshold: 100.0,
                channel_rate: 10.0,
                buildup_rate: 5.0,
                buildup_decay: 5.0,
                idle_power_rate: 5.0,
                active_capacity: 1.2,
                buildup_cap: 2.0,
            },
            channel_energy_cost: 20.0,
            portal_duration: 15.0,
            portal_range: 1000.0,
            portal_cost: 50.0,
            corruption_damage_rate: 0.1,
            corruption_health_factor: 0.8,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VoidMage {
    config: VoidMageConfig,
    pool: ThresholdPool,
    portal: Countdown,
    portal_location: Option<Vec3>,
    cooldowns: [Countdown; 2],
}

impl VoidMage {
    pub fn new(config: VoidMageConfig) -> Self {
        Self {
            pool: ThresholdPool::new(config.pool),
            portal: Countdown::default(),
            portal_location: None,
            cooldowns: [Countdown::default(); 2],
            config,
        }
    }

    pub fn config(&self) -> &VoidMageConfig {
        &self.config
    }

    pub fn void_power(&self) -> f32 {
        self.pool.power()
    }

    pub fn max_void_power(&self) -> f32 {
        self.pool.max_power()
    }

    pub fn corruption(&self) -> f32 {
        self.pool.buildup()
    }

    pub fn is_corrupted(&self) -> bool {
        self.pool.is_active()
    }

    pub fn is_channeling(&self) -> bool {
        self.pool.is_channeling()
    }

    pub fn has_portal(&self) -> bool {
        self.portal.is_active()
    }

    pub fn portal_location(&self) -> Option<Vec3> {
        self.portal_location
    }

    pub fn cooldown_remaining(&self, ability: VoidAbility) -> f32 {
        self.cooldowns[ability.slot()].remaining()
    }

    /// Corrupted mages can only draw on the void inside the DarkWorld.
    pub fn can_use_void_power(&self, context: TimelineContext) -> bool {
        !self.is_corrupted() || context.is(Timeline::DarkWorld)
    }

    fn rates(context: TimelineContext) -> PoolRates {
        match context.current() {
            Some(Timeline::DarkWorld) => PoolRates {
                channel: 1.5,
                buildup: 0.7,
            },
            Some(Timeline::BrightWorld) => PoolRates {
                channel: 0.7,
                buildup: 1.5,
            },
            _ => PoolRates::NEUTRAL,
        }
    }

    pub fn void_bonus(&self, context: TimelineContext) -> f32 {
        let mut bonus = self.pool.power_ratio();
        if self.is_corrupted() {
            bonus *= 1.5;
        }
        if context.is(Timeline::DarkWorld) {
            bonus *= 1.3;
        }
        bonus
    }

    pub fn channel_void_power(&mut self, cx: &mut KitContext<'_>) -> Result<(), AbilityError> {
        if self.pool.is_channeling() {
            return Err(AbilityError::AlreadyActive("void channel"));
        }
        if !self.can_use_void_power(cx.timeline()) {
            return Err(AbilityError::NotAllowed("void power while corrupted"));
        }
        let cost = self.config.channel_energy_cost * cx.energy_modifier();
        cx.spend_energy(cost)?;
        self.pool.set_channeling(true);
        cx.emit(ClassEvent::ChannelStarted(PoolKind::Void));
        Ok(())
    }

    pub fn stop_channeling(&mut self, cx: &mut KitContext<'_>) -> bool {
        if !self.pool.set_channeling(false) {
            return false;
        }
        cx.emit(ClassEvent::ChannelStopped(PoolKind::Void));
        true
    }

    /// Casts a void ability and returns its damage multiplier.
    ///
    /// The caller feeds `base * multiplier` through the character's damage
    /// pipeline to get the final hit.
    pub fn cast_void_ability(
        &mut self,
        ability: VoidAbility,
        cx: &mut KitContext<'_>,
    ) -> Result<f32, AbilityError> {
        let profile = ability.profile();
        if profile.requires_dark && !cx.timeline().is(Timeline::DarkWorld) {
            return Err(AbilityError::WrongTimeline {
                ability: ability.into(),
                required: Timeline::DarkWorld,
            });
        }
        if !self.can_use_void_power(cx.timeline()) {
            return Err(AbilityError::NotAllowed("void power while corrupted"));
        }
        let cooldown = &self.cooldowns[ability.slot()];
        if cooldown.is_active() {
            return Err(AbilityError::OnCooldown {
                ability: ability.into(),
                remaining: cooldown.remaining(),
            });
        }
        if !self.pool.spend(profile.void_cost) {
            return Err(void_shortfall(profile.void_cost, self.pool.power()));
        }

        self.cooldowns[ability.slot()].start(profile.cooldown);
        let edge = self.pool.add_buildup(profile.corruption_gain);
        self.handle_edge(edge, cx);
        cx.emit(ClassEvent::VoidAbilityCast {
            ability,
            damage_multiplier: profile.damage_multiplier,
        });
        Ok(profile.damage_multiplier)
    }

    pub fn create_void_portal(
        &mut self,
        origin: Vec3,
        location: Vec3,
        cx: &mut KitContext<'_>,
    ) -> Result<(), AbilityError> {
        if self.portal.is_active() {
            return Err(AbilityError::AlreadyActive("void portal"));
        }
        if self.pool.power() < self.config.portal_cost {
            return Err(void_shortfall(self.config.portal_cost, self.pool.power()));
        }
        let distance = origin.distance(location);
        if distance > self.config.portal_range {
            return Err(AbilityError::OutOfRange {
                distance,
                range: self.config.portal_range,
            });
        }

        self.pool.spend(self.config.portal_cost);
        self.portal.start(self.config.portal_duration);
        self.portal_location = Some(location);
        cx.emit(ClassEvent::Activated {
            effect: TimedEffect::VoidPortal,
            duration: self.config.portal_duration,
            location: Some(location),
        });
        Ok(())
    }

    pub fn close_void_portal(&mut self, cx: &mut KitContext<'_>) -> bool {
        if !self.portal.stop() {
            return false;
        }
        self.portal_location = None;
        cx.emit(ClassEvent::Deactivated {
            effect: TimedEffect::VoidPortal,
            expired: false,
        });
        true
    }

    pub(crate) fn advance(&mut self, delta_time: f32, cx: &mut KitContext<'_>) {
        let edge = self.pool.advance(delta_time, Self::rates(cx.timeline()));
        self.handle_edge(edge, cx);

        if self.is_corrupted() {
            let damage = self.pool.buildup() * self.config.corruption_damage_rate * delta_time;
            cx.vitals_mut().health.drain(damage);
        }

        if self.portal.advance(delta_time) {
            self.portal_location = None;
            cx.emit(ClassEvent::Deactivated {
                effect: TimedEffect::VoidPortal,
                expired: true,
            });
        }
        for cooldown in &mut self.cooldowns {
            cooldown.advance(delta_time);
        }
    }

    pub(crate) fn on_timeline_changed(&mut self, new_state: Timeline, cx: &mut KitContext<'_>) {
        if self.is_corrupted() && new_state == Timeline::DarkWorld {
            self.corruption_backlash(cx);
        }
    }

    pub(crate) fn repair(&mut self) -> bool {
        let mut changed = self.pool.repair();
        changed |= self.portal.repair();
        for cooldown in &mut self.cooldowns {
            changed |= cooldown.repair();
        }
        if !self.portal.is_active() && self.portal_location.take().is_some() {
            changed = true;
        }
        changed
    }

    fn corruption_backlash(&mut self, cx: &mut KitContext<'_>) {
        let health = &mut cx.vitals_mut().health;
        let cost = health.current() * (1.0 - self.config.corruption_health_factor);
        let health_lost = health.drain(cost);
        cx.emit(ClassEvent::CorruptionBacklash { health_lost });
    }

    fn handle_edge(&mut self, edge: Option<ThresholdEdge>, cx: &mut KitContext<'_>) {
        match edge {
            Some(ThresholdEdge::Rising) => {
                cx.emit(ClassEvent::ThresholdReached(PoolKind::Void));
                self.corruption_backlash(cx);
            }
            Some(ThresholdEdge::Falling) => cx.emit(ClassEvent::ThresholdLost(PoolKind::Void)),
            None => {}
        }
    }
}

impl Default for VoidMage {
    fn default() -> Self {
        Self::new(VoidMageConfig::default())
    }
}

impl ModifierContributor for VoidMage {
    fn contribute_damage(
        &self,
        context: TimelineContext,
        _damage_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push_if(self.is_corrupted(), ModifierSource::Corruption, 1.5);
        stack.push(ModifierSource::VoidPower, 1.0 + self.void_bonus(context));
    }

    fn contribute_defense(
        &self,
        _context: TimelineContext,
        _attack_timeline: Timeline,
        stack: &mut ModifierStack,
    ) {
        stack.push_if(self.is_corrupted(), ModifierSource::Corruption, 0.7);
        stack.push_if(self.is_channeling(), ModifierSource::Channeling, 0.8);
    }
}

fn void_shortfall(required: f32, available: f32) -> AbilityError {
    AbilityError::InsufficientResource {
        resource: "void power",
        required,
        available,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_approx;
    use crate::character::{Character, CharacterId, ClassKind, ClassTemplate};

    fn dark() -> TimelineContext {
        TimelineContext::bound(Timeline::DarkWorld)
    }

    fn mage() -> Character {
        Character::new(
            CharacterId(7),
            "Nyx",
            &ClassTemplate::builtin(ClassKind::VoidMage),
        )
    }

    #[test]
    fn idle_void_power_regenerates() {
        let mut hero = mage();
        hero.advance(4.0, dark());
        let power = hero.kit().as_void_mage().map(VoidMage::void_power);
        assert_approx!(power.unwrap_or_default(), 20.0);
    }

    #[test]
    fn corruption_fires_once_and_costs_health() {
        let mut kit = VoidMage::default();
        kit.pool.set_channeling(true);
        let mut hero = mage();
        let before = hero.vitals().health.current();
        hero.void_mage(dark(), |k, _| *k = kit.clone());

        // corruption builds at 5 * 0.7 per second in the DarkWorld
        for _ in 0..60 {
            hero.advance(0.5, dark());
        }
        let state = hero.kit().as_void_mage().cloned().unwrap_or_default();
        assert!(state.is_corrupted());
        assert!(hero.vitals().health.current() < before * 0.8 + 1.0);
    }

    #[test]
    fn eruption_needs_darkness_and_power() {
        let mut kit = VoidMage::default();
        kit.pool.advance(20.0, PoolRates::NEUTRAL);
        assert_approx!(kit.void_power(), 100.0);

        let mut hero = mage();
        hero.void_mage(dark(), |k, _| *k = kit.clone());
        let bright = TimelineContext::bound(Timeline::BrightWorld);
        let refused =
            hero.void_mage(bright, |k, cx| k.cast_void_ability(VoidAbility::VoidEruption, cx));
        assert!(matches!(refused, Some(Err(AbilityError::WrongTimeline { .. }))));

        let cast = hero.void_mage(dark(), |k, cx| k.cast_void_ability(VoidAbility::VoidEruption, cx));
        assert_eq!(cast, Some(Ok(4.0)));
        let state = hero.kit().as_void_mage().cloned().unwrap_or_default();
        assert_approx!(state.void_power(), 20.0);
        assert_approx!(state.corruption(), 30.0);
    }

    #[test]
    fn corrupted_mage_is_fragile() {
        let mut kit = VoidMage::default();
        kit.pool.add_buildup(150.0);
        kit.pool.set_channeling(true);
        let mut stack = ModifierStack::new();
        kit.contribute_defense(dark(), Timeline::BrightWorld, &mut stack);
        assert_approx!(stack.product(), 0.7 * 0.8);
        assert_approx!(kit.max_void_power(), 240.0);
        assert!(!kit.can_use_void_power(TimelineContext::bound(Timeline::BrightWorld)));
        assert!(kit.can_use_void_power(dark()));
    }

    #[test]
    fn portal_expires_after_duration() {
        let mut kit = VoidMage::default();
        kit.pool.advance(20.0, PoolRates::NEUTRAL);
        let mut hero = mage();
        hero.void_mage(dark(), |k, _| *k = kit.clone());
        let opened = hero.void_mage(dark(), |k, cx| {
            k.create_void_portal(Vec3::ZERO, Vec3::new(0.0, 600.0, 0.0), cx)
        });
        assert_eq!(opened, Some(Ok(())));
        for _ in 0..30 {
            hero.advance(0.5, dark());
        }
        let state = hero.kit().as_void_mage().cloned().unwrap_or_default();
        assert!(!state.has_portal());
    }
}
