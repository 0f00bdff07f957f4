//! A playable character: progression sheet, vitals, class kit and observers.
mod events;
mod sheet;

pub use events::{ClassEvent, ClassObserver, PoolKind, TimedEffect};
pub use sheet::{CharacterSheet, ClassKind, ClassTemplate};

use std::rc::Rc;

use crate::kits::{ClassKit, KitContext, LightPaladin, TimeWarrior, TimelineAssassin, VoidMage};
use crate::modifier::{ModifierPipeline, ModifierStack};
use crate::observer::{ObserverList, SubscriptionId};
use crate::stats::{ClassStats, Meter, Specialization};
use crate::timeline::{Timeline, TimelineContext};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterId(pub u32);

impl std::fmt::Display for CharacterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Health and timeline energy of a character.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vitals {
    pub health: Meter,
    pub energy: Meter,
}

impl Vitals {
    pub fn from_stats(stats: &ClassStats) -> Self {
        Self {
            health: Meter::full(stats.health),
            energy: Meter::full(stats.timeline_energy),
        }
    }

    pub fn repair(&mut self) -> bool {
        let health = self.health.repair();
        let energy = self.energy.repair();
        health || energy
    }
}

/// Persisted form of a [`Character`]. Observers are not saved.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterSnapshot {
    pub id: CharacterId,
    pub name: String,
    pub sheet: CharacterSheet,
    pub vitals: Vitals,
    pub kit: ClassKit,
}

#[derive(Debug)]
pub struct Character {
    id: CharacterId,
    name: String,
    sheet: CharacterSheet,
    vitals: Vitals,
    kit: ClassKit,
    observers: ObserverList<dyn ClassObserver>,
}

impl Character {
    pub fn new(id: CharacterId, name: impl Into<String>, template: &ClassTemplate) -> Self {
        let sheet = CharacterSheet::from_template(template);
        Self {
            id,
            name: name.into(),
            vitals: Vitals::from_stats(&sheet.stats()),
            sheet,
            kit: ClassKit::for_class(template.kind),
            observers: ObserverList::new(),
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ClassKind {
        self.kit.kind()
    }

    pub fn sheet(&self) -> &CharacterSheet {
        &self.sheet
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn kit(&self) -> &ClassKit {
        &self.kit
    }

    pub fn level(&self) -> u32 {
        self.sheet.level()
    }

    pub fn specialization(&self) -> Specialization {
        self.sheet.specialization()
    }

    pub fn is_defeated(&self) -> bool {
        self.vitals.health.is_empty()
    }

    pub fn movement_speed(&self) -> f32 {
        self.kit.movement_speed()
    }

    pub fn level_up(&mut self) -> u32 {
        let level = self.sheet.level_up();
        tracing::info!(character = self.id.0, level, "level up");
        self.emit(ClassEvent::LeveledUp { level });
        level
    }

    /// Switches specialization. False if the class does not offer it.
    pub fn unlock_specialization(&mut self, specialization: Specialization) -> bool {
        if !self.sheet.unlock_specialization(specialization) {
            tracing::debug!(
                character = self.id.0,
                %specialization,
                "specialization not available"
            );
            return false;
        }
        self.emit(ClassEvent::SpecializationUnlocked(specialization));
        true
    }

    /// Full modifier pipeline, including the class kit stage.
    pub fn pipeline(&self, context: TimelineContext) -> ModifierPipeline<'_> {
        self.sheet.pipeline(context).with_contributor(&self.kit)
    }

    pub fn synergy(&self, context: TimelineContext) -> f32 {
        self.pipeline(context).synergy()
    }

    pub fn damage_stack(
        &self,
        damage_timeline: Timeline,
        context: TimelineContext,
    ) -> ModifierStack {
        self.pipeline(context).damage_stack(damage_timeline)
    }

    pub fn defense_stack(
        &self,
        attack_timeline: Timeline,
        context: TimelineContext,
    ) -> ModifierStack {
        self.pipeline(context).defense_stack(attack_timeline)
    }

    pub fn modify_damage(
        &self,
        base: f32,
        damage_timeline: Timeline,
        context: TimelineContext,
    ) -> f32 {
        self.pipeline(context).modify_damage(base, damage_timeline)
    }

    pub fn modify_defense(
        &self,
        base: f32,
        attack_timeline: Timeline,
        context: TimelineContext,
    ) -> f32 {
        self.pipeline(context).modify_defense(base, attack_timeline)
    }

    pub fn timeline_energy_modifier(&self, context: TimelineContext) -> f32 {
        self.pipeline(context).energy_modifier()
    }

    pub fn can_use_timeline_ability(&self, required: Timeline, context: TimelineContext) -> bool {
        self.pipeline(context).can_use_timeline_ability(required)
    }

    pub fn effective_stats(&self, context: TimelineContext) -> ClassStats {
        self.sheet.effective_stats(context)
    }

    /// Removes up to `amount` health and returns what was removed.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.vitals.health.drain(amount)
    }

    pub fn heal(&mut self, amount: f32) -> f32 {
        self.vitals.health.restore(amount)
    }

    /// One frame: vitals follow the effective stats, energy regenerates at
    /// the stamina rate, then the kit updates its pools and timers.
    pub fn advance(&mut self, delta_time: f32, context: TimelineContext) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return;
        }
        let stats = self.effective_stats(context);
        self.vitals.health.set_maximum(stats.health);
        self.vitals.energy.set_maximum(stats.timeline_energy);
        self.vitals.energy.restore(stats.stamina_regen * delta_time);

        let (kit, mut cx) = self.split(context);
        kit.advance(delta_time, &mut cx);
    }

    /// Reacts to a completed timeline change.
    pub fn on_timeline_changed(&mut self, new_state: Timeline, context: TimelineContext) {
        let (kit, mut cx) = self.split(context);
        kit.on_timeline_changed(new_state, &mut cx);
    }

    pub fn subscribe(&self, observer: Rc<dyn ClassObserver>) -> Option<SubscriptionId> {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    pub fn observers(&self) -> &ObserverList<dyn ClassObserver> {
        &self.observers
    }

    /// Replaces the observer registry, e.g. to keep subscribers across a reload.
    pub fn with_observers(mut self, observers: ObserverList<dyn ClassObserver>) -> Self {
        self.observers = observers;
        self
    }

    /// Runs `f` against the kit with a borrowed view of this character.
    pub fn with_kit<R>(
        &mut self,
        context: TimelineContext,
        f: impl FnOnce(&mut ClassKit, &mut KitContext<'_>) -> R,
    ) -> R {
        let (kit, mut cx) = self.split(context);
        f(kit, &mut cx)
    }

    /// Runs `f` if this character is a Light Paladin.
    pub fn light_paladin<R>(
        &mut self,
        context: TimelineContext,
        f: impl FnOnce(&mut LightPaladin, &mut KitContext<'_>) -> R,
    ) -> Option<R> {
        self.with_kit(context, |kit, cx| match kit {
            ClassKit::LightPaladin(kit) => Some(f(kit, cx)),
            _ => None,
        })
    }

    pub fn void_mage<R>(
        &mut self,
        context: TimelineContext,
        f: impl FnOnce(&mut VoidMage, &mut KitContext<'_>) -> R,
    ) -> Option<R> {
        self.with_kit(context, |kit, cx| match kit {
            ClassKit::VoidMage(kit) => Some(f(kit, cx)),
            _ => None,
        })
    }

    pub fn time_warrior<R>(
        &mut self,
        context: TimelineContext,
        f: impl FnOnce(&mut TimeWarrior, &mut KitContext<'_>) -> R,
    ) -> Option<R> {
        self.with_kit(context, |kit, cx| match kit {
            ClassKit::TimeWarrior(kit) => Some(f(kit, cx)),
            _ => None,
        })
    }

    pub fn timeline_assassin<R>(
        &mut self,
        context: TimelineContext,
        f: impl FnOnce(&mut TimelineAssassin, &mut KitContext<'_>) -> R,
    ) -> Option<R> {
        self.with_kit(context, |kit, cx| match kit {
            ClassKit::TimelineAssassin(kit) => Some(f(kit, cx)),
            _ => None,
        })
    }

    pub fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            name: self.name.clone(),
            sheet: self.sheet.clone(),
            vitals: self.vitals,
            kit: self.kit.clone(),
        }
    }

    /// Rebuilds a character from a snapshot, repairing out-of-range values.
    pub fn from_snapshot(snapshot: CharacterSnapshot) -> Self {
        let CharacterSnapshot {
            id,
            name,
            mut sheet,
            mut vitals,
            mut kit,
        } = snapshot;
        if sheet.repair() {
            tracing::warn!(character = id.0, "repaired character sheet on load");
        }
        if vitals.repair() {
            tracing::warn!(character = id.0, "repaired vitals on load");
        }
        if kit.repair() {
            tracing::warn!(character = id.0, kind = %kit.kind(), "repaired class kit on load");
        }
        Self {
            id,
            name,
            sheet,
            vitals,
            kit,
            observers: ObserverList::new(),
        }
    }

    fn split(&mut self, context: TimelineContext) -> (&mut ClassKit, KitContext<'_>) {
        let cx = KitContext::new(
            self.id,
            context,
            &self.sheet,
            &mut self.vitals,
            &self.observers,
        );
        (&mut self.kit, cx)
    }

    fn emit(&self, event: ClassEvent) {
        publish(&self.observers, self.id, &event);
    }
}

pub(crate) fn publish(
    observers: &ObserverList<dyn ClassObserver>,
    id: CharacterId,
    event: &ClassEvent,
) {
    tracing::debug!(character = id.0, ?event, "class event");
    observers.notify(|observer| observer.on_class_event(id, event));
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::assert_approx;

    #[derive(Default)]
    struct Journal {
        events: RefCell<Vec<(CharacterId, ClassEvent)>>,
    }

    impl ClassObserver for Journal {
        fn on_class_event(&self, character: CharacterId, event: &ClassEvent) {
            self.events.borrow_mut().push((character, event.clone()));
        }
    }

    fn hero(kind: ClassKind) -> Character {
        Character::new(CharacterId(1), "Rin", &ClassTemplate::builtin(kind))
    }

    #[test]
    fn new_character_starts_full() {
        let hero = hero(ClassKind::VoidMage);
        assert_eq!(hero.kind(), ClassKind::VoidMage);
        assert_approx!(hero.vitals().health.current(), 700.0);
        assert_approx!(hero.vitals().energy.current(), 200.0);
        assert!(hero.kit().as_void_mage().is_some());
    }

    #[test]
    fn observers_receive_progression_events() {
        let mut hero = hero(ClassKind::LightPaladin);
        let journal = Rc::new(Journal::default());
        assert!(hero.subscribe(journal.clone()).is_some());
        assert!(hero.subscribe(journal.clone()).is_none());

        hero.level_up();
        assert!(!hero.unlock_specialization(Specialization::VoidWalker));
        assert!(hero.unlock_specialization(Specialization::LightBringer));

        let events = journal.events.borrow();
        assert_eq!(
            *events,
            vec![
                (CharacterId(1), ClassEvent::LeveledUp { level: 2 }),
                (
                    CharacterId(1),
                    ClassEvent::SpecializationUnlocked(Specialization::LightBringer)
                ),
            ]
        );
    }

    #[test]
    fn energy_regenerates_at_stamina_rate() {
        let mut hero = hero(ClassKind::TimelineAssassin);
        let cx = TimelineContext::UNBOUND;
        let spent = hero.with_kit(cx, |_, kcx| kcx.spend_energy(100.0));
        assert_eq!(spent, Ok(()));
        hero.advance(2.0, cx);
        assert_approx!(hero.vitals().energy.current(), 50.0 + 30.0);
    }

    #[test]
    fn kit_terms_join_the_pipeline() {
        let mut hero = hero(ClassKind::TimelineAssassin);
        let dark = TimelineContext::bound(Timeline::DarkWorld);
        let plain = hero.modify_damage(100.0, Timeline::DarkWorld, dark);
        // damage bonus 1.3, dark affinity 1.3
        assert_approx!(plain, 100.0 * 1.3 * 1.3);

        hero.timeline_assassin(dark, |kit, cx| kit.attempt_stealth(cx));
        let stealthed = hero.modify_damage(100.0, Timeline::DarkWorld, dark);
        assert_approx!(stealthed, plain * 2.0);
    }

    #[test]
    fn wrong_kit_accessor_returns_none() {
        let mut hero = hero(ClassKind::Adventurer);
        let result = hero.light_paladin(TimelineContext::UNBOUND, |_, _| ());
        assert!(result.is_none());
    }

    #[test]
    fn snapshot_restores_and_repairs() {
        let mut hero = hero(ClassKind::VoidMage);
        hero.take_damage(200.0);
        let mut snapshot = hero.snapshot();
        let restored = Character::from_snapshot(snapshot.clone());
        assert_eq!(restored.snapshot(), snapshot);

        snapshot.vitals.energy = Meter::full(-5.0);
        let restored = Character::from_snapshot(snapshot);
        assert_eq!(restored.vitals().energy.maximum(), 0.0);
        assert_approx!(restored.vitals().health.current(), 500.0);
    }
}
