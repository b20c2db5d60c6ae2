//! Local list updates mirroring admin mutations.
//!
//! Clients keep the full record list of an event in memory and apply the same
//! mutation they sent to the server instead of re-fetching.

use std::collections::HashSet;

use accreditation_db::entities::accreditation::{self, AccreditationStatus};
use serde::{Deserialize, Serialize};

/// A change already accepted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    StatusChanged {
        ids: Vec<String>,
        status: AccreditationStatus,
        #[serde(default)]
        rejection_reason: Option<String>,
    },
    ZoneChanged {
        id: String,
        zone_id: Option<i32>,
    },
    Deleted {
        ids: Vec<String>,
    },
    /// New rows go first; rows with the same id are replaced.
    Inserted {
        records: Vec<accreditation::Model>,
    },
}

/// Apply `mutation` to `previous`, returning the new list.
#[must_use]
pub fn apply_mutation(
    previous: &[accreditation::Model],
    mutation: &Mutation,
) -> Vec<accreditation::Model> {
    match mutation {
        Mutation::StatusChanged {
            ids,
            status,
            rejection_reason,
        } => {
            let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
            previous
                .iter()
                .cloned()
                .map(|mut r| {
                    if ids.contains(r.id.as_str()) {
                        r.status = *status;
                        r.rejection_reason = match status {
                            AccreditationStatus::Rejected => rejection_reason
                                .clone()
                                .or(r.rejection_reason),
                            _ => None,
                        };
                    }
                    r
                })
                .collect()
        }
        Mutation::ZoneChanged { id, zone_id } => previous
            .iter()
            .cloned()
            .map(|mut r| {
                if &r.id == id {
                    r.zone_id = *zone_id;
                }
                r
            })
            .collect(),
        Mutation::Deleted { ids } => {
            let ids: HashSet<&str> = ids.iter().map(String::as_str).collect();
            previous
                .iter()
                .filter(|r| !ids.contains(r.id.as_str()))
                .cloned()
                .collect()
        }
        Mutation::Inserted { records } => {
            let new_ids: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
            records
                .iter()
                .cloned()
                .chain(
                    previous
                        .iter()
                        .filter(|r| !new_ids.contains(r.id.as_str()))
                        .cloned(),
                )
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str) -> accreditation::Model {
        accreditation::Model {
            id: id.to_string(),
            event_id: 1,
            given_name: "Ana".to_string(),
            first_surname: "Soto".to_string(),
            second_surname: None,
            national_id: format!("{id}-1"),
            email: "ana@canalx.cl".to_string(),
            role: "Periodista".to_string(),
            credential_type: None,
            credential_number: None,
            area: "prensa".to_string(),
            company: "Canal X".to_string(),
            zone_id: None,
            status: AccreditationStatus::Pending,
            rejection_reason: None,
            submitter_name: "Jefa".to_string(),
            submitter_first_surname: "Prensa".to_string(),
            submitter_second_surname: None,
            submitter_national_id: "11111111-1".to_string(),
            submitter_email: "jefa@canalx.cl".to_string(),
            submitter_phone: None,
            created_at: Utc::now().into(),
        }
    }

    fn ids(list: &[accreditation::Model]) -> Vec<&str> {
        list.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_status_changed_touches_only_listed_ids() {
        let list = vec![record("a"), record("b"), record("c")];
        let next = apply_mutation(
            &list,
            &Mutation::StatusChanged {
                ids: vec!["a".to_string(), "c".to_string()],
                status: AccreditationStatus::Rejected,
                rejection_reason: Some("Sin credencial".to_string()),
            },
        );

        assert_eq!(next[0].status, AccreditationStatus::Rejected);
        assert_eq!(next[0].rejection_reason.as_deref(), Some("Sin credencial"));
        assert_eq!(next[1].status, AccreditationStatus::Pending);
        assert_eq!(next[2].status, AccreditationStatus::Rejected);
        // input untouched
        assert_eq!(list[0].status, AccreditationStatus::Pending);
    }

    #[test]
    fn test_reopening_clears_reason() {
        let mut rejected = record("a");
        rejected.status = AccreditationStatus::Rejected;
        rejected.rejection_reason = Some("Duplicado".to_string());

        let next = apply_mutation(
            &[rejected],
            &Mutation::StatusChanged {
                ids: vec!["a".to_string()],
                status: AccreditationStatus::Pending,
                rejection_reason: None,
            },
        );
        assert_eq!(next[0].status, AccreditationStatus::Pending);
        assert!(next[0].rejection_reason.is_none());
    }

    #[test]
    fn test_zone_changed_and_unassign() {
        let list = vec![record("a"), record("b")];
        let assigned = apply_mutation(
            &list,
            &Mutation::ZoneChanged {
                id: "b".to_string(),
                zone_id: Some(7),
            },
        );
        assert_eq!(assigned[0].zone_id, None);
        assert_eq!(assigned[1].zone_id, Some(7));

        let cleared = apply_mutation(
            &assigned,
            &Mutation::ZoneChanged {
                id: "b".to_string(),
                zone_id: None,
            },
        );
        assert_eq!(cleared[1].zone_id, None);
    }

    #[test]
    fn test_deleted_keeps_order() {
        let list = vec![record("a"), record("b"), record("c")];
        let next = apply_mutation(
            &list,
            &Mutation::Deleted {
                ids: vec!["b".to_string(), "missing".to_string()],
            },
        );
        assert_eq!(ids(&next), vec!["a", "c"]);
    }

    #[test]
    fn test_inserted_prepends_and_replaces() {
        let list = vec![record("a"), record("b")];
        let mut updated_b = record("b");
        updated_b.status = AccreditationStatus::Approved;

        let next = apply_mutation(
            &list,
            &Mutation::Inserted {
                records: vec![record("z"), updated_b],
            },
        );
        assert_eq!(ids(&next), vec!["z", "b", "a"]);
        assert_eq!(next[1].status, AccreditationStatus::Approved);
    }

    #[test]
    fn test_mutation_wire_format() {
        let json = serde_json::json!({ "kind": "zone_changed", "id": "a", "zone_id": null });
        let parsed: Mutation = serde_json::from_value(json).unwrap_or(Mutation::Deleted { ids: vec![] });
        assert_eq!(
            parsed,
            Mutation::ZoneChanged {
                id: "a".to_string(),
                zone_id: None
            }
        );
    }
}
