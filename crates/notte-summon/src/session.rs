//! The summon simulator as seen by chat users.
//!
//! [`SummonService`] routes the `single`, `tenfold`, and `showcase` commands
//! for an actor: it looks up the actor's showcase, draws on its banner, and
//! records the new pity, all under the actor's profile lock.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use notte_core::{Entity, EntityStore, Message};

use crate::banner::Summoned;
use crate::error::{SummonError, SummonResult};
use crate::pity::PityState;
use crate::rates::TOP_RARITY;
use crate::showcase::{ShowcaseCatalog, SummonShowcase};
use crate::store::{ActorKey, PityStore, SummonProfile};

/// Summon commands for every actor.
#[derive(Debug)]
pub struct SummonService {
    catalog: RwLock<Arc<ShowcaseCatalog>>,
    profiles: PityStore,
    rng: Mutex<StdRng>,
}

impl SummonService {
    /// A service over the showcases in `store`, with a seeded generator.
    pub fn new(store: &EntityStore, seed: u64) -> SummonResult<Self> {
        Self::with_rng(store, StdRng::seed_from_u64(seed))
    }

    /// A service seeded from the operating system.
    pub fn from_entropy(store: &EntityStore) -> SummonResult<Self> {
        Self::with_rng(store, StdRng::from_os_rng())
    }

    fn with_rng(store: &EntityStore, rng: StdRng) -> SummonResult<Self> {
        Ok(Self {
            catalog: RwLock::new(Arc::new(ShowcaseCatalog::from_store(store)?)),
            profiles: PityStore::new(),
            rng: Mutex::new(rng),
        })
    }

    /// Rebuild showcases from reloaded data. Actors keep their pity; an
    /// actor whose showcase disappeared falls back to the generic one.
    pub fn reload(&self, store: &EntityStore) -> SummonResult<()> {
        let catalog = Arc::new(ShowcaseCatalog::from_store(store)?);
        *self.catalog.write() = catalog;
        info!("Summon showcases reloaded");
        Ok(())
    }

    /// The current showcase catalog.
    pub fn catalog(&self) -> Arc<ShowcaseCatalog> {
        Arc::clone(&self.catalog.read())
    }

    /// The actor's stored profile.
    pub fn profile(&self, actor: ActorKey) -> SummonProfile {
        self.profiles.profile(actor)
    }

    fn current_showcase(catalog: &ShowcaseCatalog, profile: &SummonProfile) -> Arc<SummonShowcase> {
        profile
            .showcase
            .as_deref()
            .and_then(|name| catalog.get(name))
            .unwrap_or_else(|| catalog.generic())
    }

    /// Dispatch one summon command.
    pub fn process(&self, actor: ActorKey, command: &str, args: &str) -> SummonResult<Message> {
        match command {
            "single" => self.single(actor),
            "tenfold" => self.tenfold(actor),
            "showcase" => self.showcase(actor, args),
            other => Err(SummonError::UnknownCommand(other.to_string())),
        }
    }

    /// One pull on the actor's showcase.
    pub fn single(&self, actor: ActorKey) -> SummonResult<Message> {
        let catalog = self.catalog();
        self.profiles.with_profile(actor, |profile| -> SummonResult<Message> {
            let showcase = Self::current_showcase(&catalog, profile);
            let (result, pity) = {
                let mut rng = self.rng.lock();
                showcase.banner.perform_single(profile.pity, &mut rng)?
            };
            profile.pity = pity;
            debug!(%actor, unit = result.name(), "Single summon");
            Ok(Message::text(summon_report(
                std::slice::from_ref(&result),
                &showcase,
                pity,
            )))
        })
    }

    /// Ten pulls on the actor's showcase.
    pub fn tenfold(&self, actor: ActorKey) -> SummonResult<Message> {
        let catalog = self.catalog();
        self.profiles.with_profile(actor, |profile| -> SummonResult<Message> {
            let showcase = Self::current_showcase(&catalog, profile);
            let (results, pity) = {
                let mut rng = self.rng.lock();
                showcase.banner.perform_multi(profile.pity, &mut rng)?
            };
            profile.pity = pity;
            debug!(%actor, tops = results.iter().filter(|r| r.is_top_rarity()).count(), "Tenfold summon");
            Ok(Message::text(summon_report(&results, &showcase, pity)))
        })
    }

    /// `showcase [list | info [name] | none | <name>]`.
    pub fn showcase(&self, actor: ActorKey, args: &str) -> SummonResult<Message> {
        let args = args.trim();
        let catalog = self.catalog();
        let first = args.split(' ').next().unwrap_or_default().to_lowercase();

        if args == "list" {
            let names: Vec<&str> = catalog.list().iter().map(|s| s.name()).collect();
            return Ok(Message::text(names.join(", ")));
        }

        if first == "info" || args.is_empty() {
            let name = args.get(4..).unwrap_or_default().trim();
            if name.is_empty() {
                let profile = self.profiles.profile(actor);
                let showcase = Self::current_showcase(&catalog, &profile);
                let text = current_showcase_text(&showcase, profile.pity);
                return Ok(match &showcase.showcase {
                    Some(sc) => Message::text(text).with_embed(sc.render()),
                    None => Message::text(text),
                });
            }
            return match catalog.find(name) {
                Some(found) => match &found.showcase {
                    Some(sc) => Ok(Message::embed(sc.render())),
                    None => Err(SummonError::UnknownShowcase(name.to_string())),
                },
                None => Err(SummonError::UnknownShowcase(name.to_string())),
            };
        }

        let Some(selected) = catalog.find(args) else {
            return Err(SummonError::UnknownShowcase(args.to_string()));
        };
        let text = self.profiles.with_profile(actor, |profile| {
            let previous = Self::current_showcase(&catalog, profile);
            if Arc::ptr_eq(&previous, &selected) {
                return format!("You're already summoning on {}.", selected.name());
            }
            profile.showcase = selected.showcase.as_ref().map(|sc| sc.name.clone());
            profile.pity = PityState::default();
            info!(%actor, showcase = selected.name(), "Showcase selected");
            if selected.is_generic() {
                "Showcase set to the generic showcase. Your pity has been reset.".to_string()
            } else {
                format!("Showcase set to {}. Your pity has been reset.", selected.name())
            }
        });
        Ok(Message::text(text))
    }
}

fn pity_line(showcase: &SummonShowcase, pity: PityState) -> String {
    let banner = &showcase.banner;
    let rate = if banner.is_pity_capped(pity.pity) {
        100.0
    } else {
        banner.base_top_rate() + pity.pity
    };
    format!(
        "Next {TOP_RARITY}★ rate: {rate:.2}% (pity progress {}/10)",
        pity.progress
    )
}

fn summon_report(results: &[Summoned], showcase: &SummonShowcase, pity: PityState) -> String {
    let mut lines: Vec<String> = results.iter().map(ToString::to_string).collect();
    lines.push(String::new());
    lines.push(format!("Showcase: {}", showcase.name()));
    lines.push(pity_line(showcase, pity));
    lines.join("\n")
}

fn current_showcase_text(showcase: &SummonShowcase, pity: PityState) -> String {
    let name = if showcase.is_generic() {
        "the generic showcase".to_string()
    } else {
        showcase.name().to_string()
    };
    format!(
        "You're currently summoning on {name}.\n{}",
        pity_line(showcase, pity)
    )
}
