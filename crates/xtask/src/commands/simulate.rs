//! Run a scripted session and print how modifiers evolve
//!
//! Builds a session from content data, spawns one character of the chosen
//! class, opens with the class's signature ability, then flips the timeline
//! to DarkWorld at one third of the run and back to BrightWorld at two thirds.

use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use echoes_content::ContentFactory;
use echoes_core::{AbilityError, CharacterId, ClassKind, ClassKit, Timeline};
use echoes_runtime::{
    FileSaveRepository, GameSession, SessionConfig, TracingClassObserver, TracingTimelineListener,
};

use crate::{dirs, logging};

/// Run a scripted session
#[derive(Parser, Debug)]
pub struct Simulate {
    /// Number of frames to run
    #[arg(long, default_value_t = 180)]
    frames: u32,

    /// Seconds per frame (defaults to 1 / ECHOES_FRAME_RATE)
    #[arg(long)]
    dt: Option<f32>,

    /// Class of the simulated character
    #[arg(long, value_parser = parse_class, default_value = "void-mage")]
    class: ClassKind,

    /// Print a report row every N frames
    #[arg(long, default_value_t = 30)]
    every: u32,

    /// Content directory with timeline.toml / classes.ron (defaults to bundled data)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Save the final session into this slot
    #[arg(long, value_name = "SLOT")]
    save: Option<String>,
}

impl Simulate {
    pub fn execute(self) -> Result<()> {
        let config = SessionConfig::from_env();
        let _guard = logging::setup_logging(&config.session_id)?;

        let factory = match &self.data_dir {
            Some(dir) => ContentFactory::new(dir.clone()),
            None => ContentFactory::bundled(),
        };
        let content = factory.load().with_context(|| {
            format!(
                "Failed to load content from {}",
                factory.data_dir().display()
            )
        })?;

        let dt = self.dt.unwrap_or_else(|| config.frame_delta());
        if !(dt.is_finite() && dt > 0.0) {
            anyhow::bail!("--dt must be a positive number of seconds");
        }

        let mut session = GameSession::from_content(config.session_id.clone(), content);
        session.subscribe_timeline(Rc::new(TracingTimelineListener::new(session.id())));
        let hero = session.spawn("Echo", self.class)?;
        session.subscribe_all_characters(Rc::new(TracingClassObserver));

        println!(
            "{} {} for {} frames at {:.4}s",
            style("Simulating").bold().cyan(),
            style(self.class).bold(),
            self.frames,
            dt
        );
        match open_with_signature(&mut session, hero) {
            Ok(()) => println!("  {} signature ability active", style("✓").green()),
            Err(error) => println!("  {} opening rejected: {}", style("✗").red(), error),
        }
        println!();
        print_header();

        let dark_at = self.frames / 3;
        let bright_at = 2 * self.frames / 3;
        let every = self.every.max(1);

        for frame in 0..self.frames {
            if frame == dark_at && !session.start_transition(Timeline::DarkWorld) {
                println!("{}", style("  transition to dark rejected").yellow());
            }
            if frame == bright_at && !session.start_transition(Timeline::BrightWorld) {
                println!("{}", style("  transition to bright rejected").yellow());
            }
            let current = session.timeline().current();
            session.record_activity(current, dt);

            let outcome = session.advance(dt);
            if let Some(timeline) = outcome.completed {
                println!("  {} entered {}", style("→").cyan(), style(timeline).bold());
            }
            if frame % every == 0 || frame + 1 == self.frames {
                print_row(&session, hero, frame)?;
            }
        }

        println!();
        print_kit(&session, hero);

        if let Some(slot) = self.save {
            let save_dir = dirs::save_dir();
            let repo = FileSaveRepository::new(&save_dir).with_context(|| {
                format!("Failed to open save directory: {}", save_dir.display())
            })?;
            session
                .save(&repo, &slot)
                .with_context(|| format!("Failed to save slot '{}'", slot))?;
            println!();
            println!(
                "{} {}",
                style("✓ Saved slot").green().bold(),
                repo.save_path(&slot)?.display()
            );
        }

        Ok(())
    }
}

fn parse_class(value: &str) -> Result<ClassKind, String> {
    value.parse().map_err(|_| {
        format!(
            "unknown class '{}' (expected adventurer, light-paladin, void-mage, \
             time-warrior or timeline-assassin)",
            value
        )
    })
}

fn open_with_signature(session: &mut GameSession, hero: CharacterId) -> Result<()> {
    let opened = session.with_character(hero, |character, context| {
        character.with_kit(context, |kit, cx| -> Result<(), AbilityError> {
            match kit {
                ClassKit::None => Ok(()),
                ClassKit::LightPaladin(kit) => kit.channel_light_power(cx),
                ClassKit::VoidMage(kit) => kit.channel_void_power(cx),
                ClassKit::TimeWarrior(kit) => {
                    kit.switch_stance(Timeline::DarkWorld, cx)?;
                    kit.time_shift(Timeline::DarkWorld, cx)
                }
                ClassKit::TimelineAssassin(kit) => kit.attempt_stealth(cx).map(|_| ()),
            }
        })
    })?;
    Ok(opened?)
}

fn print_header() {
    println!(
        "{}",
        style(format!(
            "{:>6} {:>8} {:>8} {:>10} {:>10} {:>9} {:>8}",
            "frame", "world", "energy", "dmg dark", "dmg light", "defense", "cost"
        ))
        .bold()
        .yellow()
    );
}

fn print_row(session: &GameSession, hero: CharacterId, frame: u32) -> Result<()> {
    let timeline = session.timeline();
    let world = match timeline.transition_target() {
        Some(target) => format!("→{}", target),
        None => timeline.current().to_string(),
    };
    println!(
        "{:>6} {:>8} {:>8.1} {:>10.3} {:>10.3} {:>9.3} {:>8.3}",
        frame,
        world,
        timeline.energy(),
        session.modify_damage(hero, 1.0, Timeline::DarkWorld)?,
        session.modify_damage(hero, 1.0, Timeline::BrightWorld)?,
        session.modify_defense(hero, 1.0, Timeline::Any)?,
        session.energy_modifier(hero)?,
    );
    Ok(())
}

fn print_kit(session: &GameSession, hero: CharacterId) {
    let Some(character) = session.character(hero) else {
        return;
    };
    println!("{}", style("=== Final Character ===").bold().green());
    println!(
        "  Vitals: health {:.1} / {:.1}, energy {:.1} / {:.1}",
        character.vitals().health.current(),
        character.vitals().health.maximum(),
        character.vitals().energy.current(),
        character.vitals().energy.maximum(),
    );
    println!("  Movement speed: {:.2}", character.movement_speed());
    match character.kit() {
        ClassKit::None => {}
        ClassKit::LightPaladin(kit) => println!(
            "  Light power {:.1}, resonance {:.1}{}",
            kit.light_power(),
            kit.resonance(),
            if kit.is_resonating() { " (resonating)" } else { "" }
        ),
        ClassKit::VoidMage(kit) => println!(
            "  Void power {:.1} / {:.1}, corruption {:.1}{}",
            kit.void_power(),
            kit.max_void_power(),
            kit.corruption(),
            if kit.is_corrupted() { " (corrupted)" } else { "" }
        ),
        ClassKit::TimeWarrior(kit) => println!(
            "  Stance {}, time shift {:.1}s left",
            kit.stance(),
            kit.time_shift_remaining()
        ),
        ClassKit::TimelineAssassin(kit) => println!(
            "  Stealth {:.1}s, phase shift {:.1}s left",
            kit.stealth_remaining(),
            kit.phase_shift_remaining()
        ),
    }
}
