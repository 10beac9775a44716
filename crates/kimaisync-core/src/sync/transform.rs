//! Source record to destination payload.

use serde_json::{Map, Value};

use super::EntityKind;
use crate::api::Timesheet;
use crate::error::{ConfigError, Result, SyncError};
use crate::storage::MappingTable;

/// Fields that are computed by, or meaningless on, the destination.
pub const EXCLUDED_FIELDS: [&str; 7] = [
    "user",
    "id",
    "tags",
    "duration",
    "rate",
    "internalRate",
    "metaFields",
];

/// Build the create payload for `timesheet`.
///
/// # Errors
///
/// [`SyncError::UnmappedEntity`] if the project or activity has no mapping,
/// and an invalid-value config error if the stored target is not an id.
pub fn transfer_payload(
    timesheet: &Timesheet,
    projects: &MappingTable,
    activities: &MappingTable,
) -> Result<Map<String, Value>> {
    let mut payload = timesheet.extra.clone();
    for field in EXCLUDED_FIELDS {
        payload.remove(field);
    }

    payload.insert("begin".into(), Value::String(timesheet.begin.clone()));
    if let Some(end) = &timesheet.end {
        payload.insert("end".into(), Value::String(end.clone()));
    }
    payload.insert(
        "project".into(),
        translate(projects, EntityKind::Project, timesheet.project)?.into(),
    );
    payload.insert(
        "activity".into(),
        translate(activities, EntityKind::Activity, timesheet.activity)?.into(),
    );
    Ok(payload)
}

fn translate(table: &MappingTable, kind: EntityKind, id: u64) -> Result<u64> {
    let target = table
        .get(id)
        .ok_or(SyncError::UnmappedEntity { kind, id })?;
    target.parse().map_err(|_| {
        ConfigError::InvalidValue {
            key: format!("{kind}_mapping.{id}"),
            message: format!("'{target}' is not a destination id"),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source_record() -> Timesheet {
        serde_json::from_value(json!({
            "id": 5,
            "begin": "2024-01-01T09:00:00",
            "end": "2024-01-01T10:00:00",
            "project": 10,
            "activity": 20,
            "description": "planning",
            "user": 3,
            "tags": ["x"],
            "duration": 3600,
            "rate": 80.0,
            "internalRate": 40.0,
            "metaFields": [],
            "exported": false
        }))
        .unwrap()
    }

    #[test]
    fn strips_excluded_fields_and_rewrites_ids() {
        let payload = transfer_payload(
            &source_record(),
            &MappingTable::from([(10, 100)]),
            &MappingTable::from([(20, 200)]),
        )
        .unwrap();

        for field in EXCLUDED_FIELDS {
            assert!(!payload.contains_key(field), "{field} leaked");
        }
        assert_eq!(
            Value::Object(payload),
            json!({
                "begin": "2024-01-01T09:00:00",
                "end": "2024-01-01T10:00:00",
                "project": 100,
                "activity": 200,
                "description": "planning",
                "exported": false
            })
        );
    }

    #[test]
    fn missing_activity_mapping_is_fatal() {
        let err = transfer_payload(
            &source_record(),
            &MappingTable::from([(10, 100)]),
            &MappingTable::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SyncError::UnmappedEntity { kind: EntityKind::Activity, id: 20 }
        ));
    }

    #[test]
    fn non_numeric_target_is_a_config_error() {
        let mut projects = MappingTable::default();
        projects.insert(10, "web");
        let err = transfer_payload(&source_record(), &projects, &MappingTable::from([(20, 200)]))
            .unwrap_err();
        assert!(matches!(err, SyncError::Config(ConfigError::InvalidValue { .. })));
    }
}
