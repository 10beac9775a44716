//! Source-to-destination id mapping.

use tracing::{info, warn};

use super::prompt::{MappingRequest, Prompt};
use super::EntityKind;
use crate::api::EntityRef;
use crate::error::Result;
use crate::storage::{Config, ConfigStore, MappingTable, DO_NOT_MAP};

/// Fills gaps in the mapping tables by asking the operator.
///
/// Destination lists are fetched on the first gap of each kind and reused
/// for the rest of the resolver's lifetime, so one instance should cover one
/// run.
#[derive(Debug, Default)]
pub struct MappingResolver {
    projects: Option<Vec<EntityRef>>,
    activities: Option<Vec<EntityRef>>,
}

impl MappingResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map every entity in `sources` that the table for `kind` lacks.
    ///
    /// Each accepted answer is written to `config` and persisted through
    /// `store` before the next entity is considered. Returns the number of
    /// mappings added.
    ///
    /// # Errors
    ///
    /// Fails if listing the destination, prompting or persisting fails.
    /// Rejected answers are not errors; they are asked again.
    pub fn resolve<L, P>(
        &mut self,
        kind: EntityKind,
        sources: &[EntityRef],
        config: &mut Config,
        store: &ConfigStore,
        mut list_destination: L,
        prompt: &mut P,
    ) -> Result<usize>
    where
        L: FnMut() -> Result<Vec<EntityRef>>,
        P: Prompt + ?Sized,
    {
        let mut added = 0;
        for entity in sources {
            if table_mut(config, kind).contains(entity.id) {
                continue;
            }
            info!(%kind, id = entity.id, name = %entity.name, "mapping missing");

            let candidates = self.candidates(kind, &mut list_destination)?;
            let target = ask_until_valid(prompt, kind, entity, candidates)?;

            table_mut(config, kind).insert(entity.id, target.as_str());
            store.persist(config)?;
            info!(%kind, id = entity.id, target = %target, "mapping stored");
            added += 1;
        }
        Ok(added)
    }

    fn candidates<L>(&mut self, kind: EntityKind, list_destination: &mut L) -> Result<&[EntityRef]>
    where
        L: FnMut() -> Result<Vec<EntityRef>>,
    {
        let slot = match kind {
            EntityKind::Project => &mut self.projects,
            EntityKind::Activity => &mut self.activities,
        };
        if slot.is_none() {
            let mut fetched = list_destination()?;
            fetched.sort_by_key(|e| e.id);
            *slot = Some(fetched);
        }
        Ok(slot.as_deref().unwrap_or(&[]))
    }
}

pub(crate) fn table_mut(config: &mut Config, kind: EntityKind) -> &mut MappingTable {
    match kind {
        EntityKind::Project => &mut config.project_mapping,
        EntityKind::Activity => &mut config.activity_mapping,
    }
}

/// Accept a candidate id, or the skip sentinel where `kind` allows it.
fn validate(answer: &str, kind: EntityKind, candidates: &[EntityRef]) -> Option<String> {
    let answer = answer.trim();
    if kind.allows_skip() && answer == DO_NOT_MAP {
        return Some(DO_NOT_MAP.to_string());
    }
    let id: u64 = answer.parse().ok()?;
    candidates
        .iter()
        .any(|c| c.id == id)
        .then(|| id.to_string())
}

fn ask_until_valid<P>(
    prompt: &mut P,
    kind: EntityKind,
    entity: &EntityRef,
    candidates: &[EntityRef],
) -> Result<String>
where
    P: Prompt + ?Sized,
{
    let mut attempt = 1;
    loop {
        let request = MappingRequest {
            kind,
            entity,
            candidates,
            attempt,
        };
        let answer = prompt.choose(&request)?;
        if let Some(target) = validate(&answer, kind, candidates) {
            return Ok(target);
        }
        warn!(%kind, id = entity.id, answer = %answer.trim(), "not an allowed choice");
        attempt += 1;
    }
}
