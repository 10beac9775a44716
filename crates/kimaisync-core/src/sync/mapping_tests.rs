//! Tests for the mapping resolver.

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::super::mapping::*;
    use super::super::prompt::ScriptedPrompt;
    use super::super::EntityKind;
    use crate::api::EntityRef;
    use crate::error::SyncError;
    use crate::storage::{Config, ConfigStore, DO_NOT_MAP};
    use tempfile::TempDir;

    fn destination_projects() -> Vec<EntityRef> {
        vec![EntityRef::new(101, "Intranet"), EntityRef::new(100, "Website")]
    }

    fn store() -> (TempDir, ConfigStore) {
        let dir = TempDir::new().unwrap();
        let store = ConfigStore::new(dir.path().join("sync.toml"));
        (dir, store)
    }

    #[test]
    fn fills_missing_entries_and_persists() {
        let (_dir, store) = store();
        let mut config = Config::default();
        let mut prompt = ScriptedPrompt::new().with_choices(["100"]);

        let added = MappingResolver::new()
            .resolve(
                EntityKind::Project,
                &[EntityRef::new(10, "Web")],
                &mut config,
                &store,
                || Ok(destination_projects()),
                &mut prompt,
            )
            .unwrap();

        assert_eq!(added, 1);
        assert_eq!(config.project_mapping.get(10), Some("100"));
        assert_eq!(store.load().unwrap().project_mapping.get(10), Some("100"));
    }

    #[test]
    fn already_mapped_entities_are_not_asked() {
        let (_dir, store) = store();
        let mut config = Config::default();
        config.activity_mapping.insert(20, "200");
        let fetches = Cell::new(0);
        let mut prompt = ScriptedPrompt::new();

        let added = MappingResolver::new()
            .resolve(
                EntityKind::Activity,
                &[EntityRef::new(20, "Dev")],
                &mut config,
                &store,
                || {
                    fetches.set(fetches.get() + 1);
                    Ok(vec![])
                },
                &mut prompt,
            )
            .unwrap();

        assert_eq!(added, 0);
        assert_eq!(fetches.get(), 0, "destination must not be listed without a gap");
        assert!(prompt.asked.is_empty());
    }

    #[test]
    fn destination_list_is_fetched_once_per_kind() {
        let (_dir, store) = store();
        let mut config = Config::default();
        let fetches = Cell::new(0);
        let mut prompt = ScriptedPrompt::new().with_choices(["100", "101", "100"]);
        let mut resolver = MappingResolver::new();
        let lister = || {
            fetches.set(fetches.get() + 1);
            Ok(destination_projects())
        };

        resolver
            .resolve(
                EntityKind::Project,
                &[EntityRef::new(1, "A"), EntityRef::new(2, "B")],
                &mut config,
                &store,
                lister,
                &mut prompt,
            )
            .unwrap();
        resolver
            .resolve(
                EntityKind::Project,
                &[EntityRef::new(3, "C")],
                &mut config,
                &store,
                lister,
                &mut prompt,
            )
            .unwrap();

        assert_eq!(fetches.get(), 1);
        assert_eq!(config.project_mapping.len(), 3);
    }

    #[test]
    fn invalid_answers_are_asked_again() {
        let (_dir, store) = store();
        let mut config = Config::default();
        let mut prompt = ScriptedPrompt::new().with_choices(["999", "web", " 101 "]);

        MappingResolver::new()
            .resolve(
                EntityKind::Project,
                &[EntityRef::new(10, "Web")],
                &mut config,
                &store,
                || Ok(destination_projects()),
                &mut prompt,
            )
            .unwrap();

        assert_eq!(config.project_mapping.get(10), Some("101"));
        assert_eq!(
            prompt.asked,
            vec![
                (EntityKind::Project, 10, 1),
                (EntityKind::Project, 10, 2),
                (EntityKind::Project, 10, 3),
            ]
        );
    }

    #[test]
    fn projects_accept_do_not_map() {
        let (_dir, store) = store();
        let mut config = Config::default();
        let mut prompt = ScriptedPrompt::new().with_choices([DO_NOT_MAP]);

        MappingResolver::new()
            .resolve(
                EntityKind::Project,
                &[EntityRef::new(10, "Web")],
                &mut config,
                &store,
                || Ok(destination_projects()),
                &mut prompt,
            )
            .unwrap();

        assert!(config.project_mapping.is_ignored(10));
    }

    #[test]
    fn activities_reject_do_not_map() {
        let (_dir, store) = store();
        let mut config = Config::default();
        let mut prompt = ScriptedPrompt::new().with_choices([DO_NOT_MAP, "200"]);

        MappingResolver::new()
            .resolve(
                EntityKind::Activity,
                &[EntityRef::new(20, "Dev")],
                &mut config,
                &store,
                || Ok(vec![EntityRef::new(200, "Development")]),
                &mut prompt,
            )
            .unwrap();

        assert_eq!(config.activity_mapping.get(20), Some("200"));
        assert_eq!(prompt.asked.len(), 2);
    }

    #[test]
    fn earlier_answers_survive_a_failed_prompt() {
        let (_dir, store) = store();
        let mut config = Config::default();
        let mut prompt = ScriptedPrompt::new().with_choices(["100"]);

        let err = MappingResolver::new()
            .resolve(
                EntityKind::Project,
                &[EntityRef::new(10, "Web"), EntityRef::new(11, "Shop")],
                &mut config,
                &store,
                || Ok(destination_projects()),
                &mut prompt,
            )
            .unwrap_err();

        assert!(matches!(err, SyncError::Prompt(_)));
        let saved = store.load().unwrap();
        assert_eq!(saved.project_mapping.get(10), Some("100"));
        assert!(!saved.project_mapping.contains(11));
    }

    #[test]
    fn candidates_are_presented_sorted_by_id() {
        struct Recorder(Vec<u64>);
        impl crate::sync::Prompt for Recorder {
            fn ask_value(
                &mut self,
                key: crate::storage::ConfigKey,
            ) -> Result<String, SyncError> {
                Err(SyncError::Prompt(key.to_string()))
            }
            fn choose(
                &mut self,
                request: &crate::sync::MappingRequest<'_>,
            ) -> Result<String, SyncError> {
                self.0 = request.candidates.iter().map(|c| c.id).collect();
                Ok("100".into())
            }
        }

        let (_dir, store) = store();
        let mut config = Config::default();
        let mut prompt = Recorder(vec![]);
        MappingResolver::new()
            .resolve(
                EntityKind::Project,
                &[EntityRef::new(10, "Web")],
                &mut config,
                &store,
                || Ok(destination_projects()),
                &mut prompt,
            )
            .unwrap();

        assert_eq!(prompt.0, vec![100, 101]);
    }
}
