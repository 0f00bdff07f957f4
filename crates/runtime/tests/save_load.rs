use std::cell::Cell;
use std::fs;
use std::rc::Rc;

use echoes_content::ClassCatalog;
use echoes_core::{
    AbilityError, CharacterId, ClassEvent, ClassKind, ClassObserver, LightAbility, Timeline,
    TimelineConfig, Vec3,
};
use echoes_runtime::{
    FileSaveRepository, GameSession, MemorySaveRepository, RepositoryError, SaveRepository,
    SessionError,
};
use tempfile::TempDir;

fn populated_session() -> GameSession {
    let mut session =
        GameSession::new("campaign", TimelineConfig::default(), ClassCatalog::builtin());
    session.spawn("Lumen", ClassKind::LightPaladin).expect("spawn");
    session.spawn("Nyx", ClassKind::VoidMage).expect("spawn");
    session.spawn("Kael", ClassKind::TimeWarrior).expect("spawn");
    session.add_mastery(Timeline::DarkWorld, 0.4);
    assert!(session.start_transition(Timeline::DarkWorld));
    for _ in 0..3 {
        session.advance(0.25);
    }
    session
}

#[test]
fn file_repository_round_trips_a_session() {
    let temp = TempDir::new().expect("temp dir");
    let repo = FileSaveRepository::new(temp.path()).expect("repository");

    let session = populated_session();
    session.save(&repo, "slot1").expect("save");
    assert!(repo.exists("slot1"));
    assert_eq!(repo.list_slots().expect("list"), vec!["slot1".to_string()]);

    let mut restored =
        GameSession::new("fresh", TimelineConfig::default(), ClassCatalog::builtin());
    restored.load(&repo, "slot1").expect("load");

    assert_eq!(restored.id(), "campaign");
    assert_eq!(restored.snapshot(), session.snapshot());
    assert!(restored.timeline().is_transitioning());

    // Fresh ids continue after the restored roster.
    assert_eq!(
        restored
            .spawn("Vesper", ClassKind::TimelineAssassin)
            .expect("spawn"),
        CharacterId(4)
    );
}

#[test]
fn active_effects_survive_a_file_round_trip() {
    let temp = TempDir::new().expect("temp dir");
    let repo = FileSaveRepository::new(temp.path()).expect("repository");
    let mut session = GameSession::new("raid", TimelineConfig::default(), ClassCatalog::builtin());
    let paladin = session.spawn("Lumen", ClassKind::LightPaladin).expect("spawn");
    let warrior = session.spawn("Kael", ClassKind::TimeWarrior).expect("spawn");

    let channel = session
        .with_character(paladin, |hero, cx| {
            hero.light_paladin(cx, |kit, kcx| kit.channel_light_power(kcx))
        })
        .expect("paladin exists");
    assert_eq!(channel, Some(Ok(())));
    // 21s of bright channeling latches resonance
    for _ in 0..42 {
        session.advance(0.5);
    }

    let opened = session
        .with_character(paladin, |hero, cx| {
            hero.light_paladin(cx, |kit, kcx| -> Result<(), AbilityError> {
                kit.cast_light_ability(LightAbility::LightBlessing, kcx)?;
                kit.create_light_barrier(Vec3::ZERO, Vec3::new(100.0, 0.0, 0.0), kcx)
            })
        })
        .expect("paladin exists");
    assert_eq!(opened, Some(Ok(())));

    let shifted = session
        .with_character(warrior, |hero, cx| {
            hero.time_warrior(cx, |kit, kcx| -> Result<(), AbilityError> {
                kit.switch_stance(Timeline::DarkWorld, kcx)?;
                kit.time_shift(Timeline::BrightWorld, kcx)
            })
        })
        .expect("warrior exists");
    assert_eq!(shifted, Some(Ok(())));
    session.advance(0.5);

    session.save(&repo, "midfight").expect("save");
    let mut restored =
        GameSession::new("fresh", TimelineConfig::default(), ClassCatalog::builtin());
    restored.load(&repo, "midfight").expect("load");
    assert_eq!(restored.snapshot(), session.snapshot());

    let light = restored
        .character(paladin)
        .and_then(|hero| hero.kit().as_light_paladin())
        .expect("paladin kit");
    assert!(light.is_resonating());
    assert!(light.has_barrier());
    assert_eq!(light.barrier_remaining(), 19.5);
    assert_eq!(light.cooldown_remaining(LightAbility::LightBlessing), 4.5);

    let time = restored
        .character(warrior)
        .and_then(|hero| hero.kit().as_time_warrior())
        .expect("warrior kit");
    assert!(time.is_time_shifted());
    assert_eq!(time.stance(), Timeline::DarkWorld);

    let snapshot = restored.snapshot();
    let json = serde_json::to_string(&snapshot.characters[1].kit).expect("json");
    assert!(json.contains("TimeWarrior"));
}

#[test]
fn tampered_saves_are_rejected() {
    let temp = TempDir::new().expect("temp dir");
    let repo = FileSaveRepository::new(temp.path()).expect("repository");
    populated_session().save(&repo, "slot1").expect("save");

    let path = repo.save_path("slot1").expect("path");
    let mut bytes = fs::read(&path).expect("read save");
    if let Some(byte) = bytes.last_mut() {
        *byte ^= 0x5a;
    }
    fs::write(&path, bytes).expect("write save");

    let mut session =
        GameSession::new("fresh", TimelineConfig::default(), ClassCatalog::builtin());
    let result = session.load(&repo, "slot1");
    assert!(matches!(
        result,
        Err(SessionError::Repository(RepositoryError::ChecksumMismatch { .. }))
    ));
    assert!(session.is_empty());
}

#[test]
fn slot_names_are_validated_and_deletable() {
    let temp = TempDir::new().expect("temp dir");
    let repo = FileSaveRepository::new(temp.path()).expect("repository");
    let snapshot = populated_session().snapshot();

    assert!(matches!(
        repo.save("../escape", &snapshot),
        Err(RepositoryError::InvalidSlot(_))
    ));
    assert!(!repo.exists("../escape"));

    repo.save("b", &snapshot).expect("save b");
    repo.save("a", &snapshot).expect("save a");
    assert_eq!(repo.list_slots().expect("list"), vec!["a", "b"]);

    repo.delete("a").expect("delete");
    repo.delete("a").expect("deleting twice is fine");
    assert_eq!(repo.list_slots().expect("list"), vec!["b"]);
    assert!(repo.load("a").expect("load").is_none());
}

#[test]
fn empty_slots_report_an_error() {
    let repo = MemorySaveRepository::new();
    let mut session = populated_session();
    assert!(matches!(
        session.load(&repo, "missing"),
        Err(SessionError::EmptySlot(slot)) if slot == "missing"
    ));
}

#[test]
fn out_of_range_values_are_repaired_on_load() {
    let repo = MemorySaveRepository::new();
    let mut snapshot = populated_session().snapshot();
    snapshot.timeline.energy = 500.0;
    snapshot.timeline.max_energy = -3.0;
    if let Some(transition) = snapshot.timeline.transition.as_mut() {
        transition.progress = 4.0;
    }
    repo.save("broken", &snapshot).expect("save");

    let loaded = repo.load("broken").expect("load").expect("slot present");
    let session =
        GameSession::from_snapshot(loaded, TimelineConfig::default(), ClassCatalog::builtin());

    let timeline = session.timeline();
    assert_eq!(timeline.max_energy(), 1.0);
    assert_eq!(timeline.energy(), 1.0);
    assert_eq!(timeline.transition_progress(), Some(1.0));
    assert_eq!(session.len(), 3);
}

#[derive(Default)]
struct Counter {
    seen: Cell<usize>,
}

impl ClassObserver for Counter {
    fn on_class_event(&self, _character: CharacterId, _event: &ClassEvent) {
        self.seen.set(self.seen.get() + 1);
    }
}

#[test]
fn restoring_keeps_observers_of_surviving_characters() {
    let repo = MemorySaveRepository::new();
    let mut session = populated_session();
    session.save(&repo, "quick").expect("save");

    let counter = Rc::new(Counter::default());
    session
        .subscribe_character(CharacterId(1), counter.clone())
        .expect("paladin exists");

    session.load(&repo, "quick").expect("load");
    session
        .with_character(CharacterId(1), |hero, _| hero.level_up())
        .expect("paladin exists");
    assert_eq!(counter.seen.get(), 1);
}
