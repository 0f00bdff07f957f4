//! Session context: one shared timeline and the characters living in it.
//!
//! [`GameSession`] is the single owner of the [`TimelineState`]. Characters
//! never hold a reference to it; every call that needs the current world
//! receives a [`TimelineContext`] built from the state at call time. Frame
//! order is fixed by [`GameSession::advance`]: the timeline ticks first, then
//! every character advances against the post-tick context, then characters
//! hear about a timeline change that happened during the frame.
use std::collections::BTreeMap;
use std::rc::Rc;

use echoes_content::{ClassCatalog, LoadedContent};
use echoes_core::{
    Character, CharacterId, ClassKind, ClassObserver, SubscriptionId, TickOutcome, Timeline,
    TimelineConfig, TimelineContext, TimelineListener, TimelineState,
};
use tracing::{debug, info};

use crate::error::{Result, SessionError};
use crate::repository::{SAVE_FORMAT_VERSION, SaveRepository, SessionSnapshot};

pub struct GameSession {
    id: String,
    timeline: TimelineState,
    characters: BTreeMap<CharacterId, Character>,
    catalog: ClassCatalog,
    next_id: u32,
}

impl GameSession {
    pub fn new(id: impl Into<String>, config: TimelineConfig, catalog: ClassCatalog) -> Self {
        Self {
            id: id.into(),
            timeline: TimelineState::new(config),
            characters: BTreeMap::new(),
            catalog,
            next_id: 1,
        }
    }

    /// Session built from loaded tunables and class templates.
    pub fn from_content(id: impl Into<String>, content: LoadedContent) -> Self {
        Self::new(id, content.timeline, content.classes)
    }

    /// Rebuilds a session from a snapshot, repairing out-of-range values.
    pub fn from_snapshot(
        snapshot: SessionSnapshot,
        config: TimelineConfig,
        catalog: ClassCatalog,
    ) -> Self {
        let mut session = Self::new(snapshot.session_id.clone(), config, catalog);
        session.restore(snapshot);
        session
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn timeline(&self) -> &TimelineState {
        &self.timeline
    }

    pub fn catalog(&self) -> &ClassCatalog {
        &self.catalog
    }

    /// Timeline view handed to character queries right now.
    pub fn context(&self) -> TimelineContext {
        TimelineContext::from_state(&self.timeline)
    }

    // ========================================================================
    // Roster
    // ========================================================================

    /// Creates a level-1 character of `kind` from the catalog template.
    pub fn spawn(&mut self, name: impl Into<String>, kind: ClassKind) -> Result<CharacterId> {
        let id = CharacterId(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or(SessionError::IdsExhausted)?;
        let character = Character::new(id, name, self.catalog.get(kind));
        info!(session = %self.id, character = id.0, %kind, "character spawned");
        self.characters.insert(id, character);
        Ok(id)
    }

    /// Adds an existing character, keeping its id.
    pub fn insert(&mut self, character: Character) -> Result<()> {
        let id = character.id();
        if self.characters.contains_key(&id) {
            return Err(SessionError::DuplicateCharacter(id));
        }
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        self.characters.insert(id, character);
        Ok(())
    }

    pub fn despawn(&mut self, id: CharacterId) -> Option<Character> {
        let removed = self.characters.remove(&id);
        if removed.is_some() {
            info!(session = %self.id, character = id.0, "character despawned");
        }
        removed
    }

    pub fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Runs `f` against a character with the current timeline context.
    pub fn with_character<R>(
        &mut self,
        id: CharacterId,
        f: impl FnOnce(&mut Character, TimelineContext) -> R,
    ) -> Result<R> {
        let context = TimelineContext::from_state(&self.timeline);
        let character = self
            .characters
            .get_mut(&id)
            .ok_or(SessionError::UnknownCharacter(id))?;
        Ok(f(character, context))
    }

    // ========================================================================
    // Timeline commands
    // ========================================================================

    pub fn try_start_transition(&mut self, target: Timeline) -> Result<()> {
        self.timeline.try_start_transition(target)?;
        Ok(())
    }

    pub fn start_transition(&mut self, target: Timeline) -> bool {
        self.timeline.start_transition(target)
    }

    pub fn cancel_transition(&mut self) -> bool {
        self.timeline.cancel_transition()
    }

    /// Authoritative overwrite; characters react immediately if it changed.
    pub fn set_state(&mut self, new_state: Timeline) {
        let previous = self.timeline.current();
        self.timeline.set_state(new_state);
        self.notify_if_changed(previous);
    }

    pub fn consume_energy(&mut self, amount: f32) -> bool {
        self.timeline.consume_energy(amount)
    }

    pub fn restore_energy(&mut self, amount: f32) {
        self.timeline.restore_energy(amount);
    }

    pub fn add_mastery(&mut self, timeline: Timeline, amount: f32) {
        self.timeline.add_mastery(timeline, amount);
    }

    pub fn record_activity(&mut self, timeline: Timeline, activity: f32) {
        self.timeline.record_activity(timeline, activity);
    }

    // ========================================================================
    // Per-character queries
    // ========================================================================

    pub fn modify_damage(
        &self,
        id: CharacterId,
        base: f32,
        damage_timeline: Timeline,
    ) -> Result<f32> {
        let character = self.require(id)?;
        Ok(character.modify_damage(base, damage_timeline, self.context()))
    }

    pub fn modify_defense(
        &self,
        id: CharacterId,
        base: f32,
        attack_timeline: Timeline,
    ) -> Result<f32> {
        let character = self.require(id)?;
        Ok(character.modify_defense(base, attack_timeline, self.context()))
    }

    pub fn energy_modifier(&self, id: CharacterId) -> Result<f32> {
        let character = self.require(id)?;
        Ok(character.timeline_energy_modifier(self.context()))
    }

    pub fn can_use_timeline_ability(&self, id: CharacterId, required: Timeline) -> Result<bool> {
        let character = self.require(id)?;
        Ok(character.can_use_timeline_ability(required, self.context()))
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Runs one frame. Non-positive or non-finite deltas do nothing.
    pub fn advance(&mut self, delta_time: f32) -> TickOutcome {
        if !(delta_time.is_finite() && delta_time > 0.0) {
            return TickOutcome::default();
        }
        let previous = self.timeline.current();
        let outcome = self.timeline.tick(delta_time);

        let context = TimelineContext::from_state(&self.timeline);
        for character in self.characters.values_mut() {
            character.advance(delta_time, context);
        }
        self.notify_if_changed(previous);
        outcome
    }

    // ========================================================================
    // Subscription
    // ========================================================================

    pub fn subscribe_timeline(
        &self,
        listener: Rc<dyn TimelineListener>,
    ) -> Option<SubscriptionId> {
        self.timeline.subscribe(listener)
    }

    pub fn unsubscribe_timeline(&self, id: SubscriptionId) -> bool {
        self.timeline.unsubscribe(id)
    }

    pub fn subscribe_character(
        &self,
        id: CharacterId,
        observer: Rc<dyn ClassObserver>,
    ) -> Result<Option<SubscriptionId>> {
        Ok(self.require(id)?.subscribe(observer))
    }

    /// Subscribes `observer` to every character currently in the session.
    pub fn subscribe_all_characters(&self, observer: Rc<dyn ClassObserver>) -> usize {
        self.characters
            .values()
            .filter_map(|character| character.subscribe(Rc::clone(&observer)))
            .count()
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SAVE_FORMAT_VERSION,
            session_id: self.id.clone(),
            timeline: self.timeline.snapshot(),
            characters: self.characters.values().map(Character::snapshot).collect(),
        }
    }

    /// Replaces timeline and roster with `snapshot`.
    ///
    /// Timeline listeners stay registered. Characters that keep their id
    /// keep their observers; new ones start without any.
    pub fn restore(&mut self, snapshot: SessionSnapshot) {
        let SessionSnapshot {
            session_id,
            timeline,
            characters,
            ..
        } = snapshot;

        self.id = session_id;
        self.timeline.restore(timeline);

        let mut previous = std::mem::take(&mut self.characters);
        for snapshot in characters {
            let id = snapshot.id;
            let mut character = Character::from_snapshot(snapshot);
            if let Some(old) = previous.remove(&id) {
                character = character.with_observers(old.observers().clone());
            }
            self.next_id = self.next_id.max(id.0.saturating_add(1));
            self.characters.insert(id, character);
        }
        info!(
            session = %self.id,
            characters = self.characters.len(),
            timeline = %self.timeline.current(),
            "session restored"
        );
    }

    pub fn save(&self, repository: &dyn SaveRepository, slot: &str) -> Result<()> {
        repository.save(slot, &self.snapshot())?;
        info!(session = %self.id, slot, "session saved");
        Ok(())
    }

    pub fn load(&mut self, repository: &dyn SaveRepository, slot: &str) -> Result<()> {
        let snapshot = repository
            .load(slot)?
            .ok_or_else(|| SessionError::EmptySlot(slot.to_string()))?;
        self.restore(snapshot);
        Ok(())
    }

    fn require(&self, id: CharacterId) -> Result<&Character> {
        self.characters
            .get(&id)
            .ok_or(SessionError::UnknownCharacter(id))
    }

    fn notify_if_changed(&mut self, previous: Timeline) {
        let current = self.timeline.current();
        if current == previous {
            return;
        }
        debug!(session = %self.id, from = %previous, to = %current, "notifying characters");
        let context = TimelineContext::from_state(&self.timeline);
        for character in self.characters.values_mut() {
            character.on_timeline_changed(current, context);
        }
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("timeline", &self.timeline)
            .field("characters", &self.characters.len())
            .finish()
    }
}
