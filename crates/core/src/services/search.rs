//! In-memory search and filtering for the admin list.
//!
//! Text matching is accent- and case-insensitive on every field except the
//! RUT, which is matched as a raw substring.

use std::collections::HashMap;

use accreditation_db::entities::{
    accreditation::{self, AccreditationStatus},
    zone,
};
use unicode_normalization::UnicodeNormalization;

use super::quota::AreaDefinition;

/// Label shown for rows without a zone.
pub const UNASSIGNED_ZONE_LABEL: &str = "Sin asignar";

/// Zone and area display names for one event.
#[derive(Debug, Clone, Default)]
pub struct DisplayNames {
    zones: HashMap<i32, String>,
    areas: HashMap<String, String>,
}

impl DisplayNames {
    #[must_use]
    pub fn new(zones: &[zone::Model], areas: &[AreaDefinition]) -> Self {
        Self {
            zones: zones.iter().map(|z| (z.id, z.name.clone())).collect(),
            areas: areas
                .iter()
                .map(|a| (a.code.to_lowercase(), a.name.clone()))
                .collect(),
        }
    }

    /// Zone name, or the unassigned label.
    #[must_use]
    pub fn zone_name(&self, zone_id: Option<i32>) -> &str {
        zone_id
            .and_then(|id| self.zones.get(&id))
            .map_or(UNASSIGNED_ZONE_LABEL, String::as_str)
    }

    /// Area display name, or the code itself when unknown.
    #[must_use]
    pub fn area_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.areas
            .get(&code.to_lowercase())
            .map_or(code, String::as_str)
    }
}

/// Lower-case, decompose (NFD) and drop combining marks U+0300..=U+036F.
#[must_use]
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect()
}

fn matches_text(record: &accreditation::Model, term: &str, raw_term: &str, names: &DisplayNames) -> bool {
    if record.national_id.contains(raw_term) {
        return true;
    }

    let fields = [
        Some(record.full_name()),
        Some(record.email.clone()),
        Some(record.company.clone()),
        Some(names.area_name(&record.area).to_string()),
        Some(record.role.clone()),
        record.credential_type.clone(),
        record.credential_number.clone(),
        Some(names.zone_name(record.zone_id).to_string()),
    ];

    fields
        .iter()
        .flatten()
        .any(|field| normalize(field).contains(term))
}

/// Records matching `term` (any field) and `status` (exact), in input order.
#[must_use]
pub fn filter_records<'a>(
    records: &'a [accreditation::Model],
    term: &str,
    status: Option<AccreditationStatus>,
    names: &DisplayNames,
) -> Vec<&'a accreditation::Model> {
    let raw_term = term.trim();
    let normalized = normalize(raw_term);

    records
        .iter()
        .filter(|r| status.is_none_or(|s| r.status == s))
        .filter(|r| raw_term.is_empty() || matches_text(r, &normalized, raw_term, names))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, surname: &str, rut: &str, status: AccreditationStatus) -> accreditation::Model {
        accreditation::Model {
            id: id.to_string(),
            event_id: 1,
            given_name: "Ana".to_string(),
            first_surname: surname.to_string(),
            second_surname: None,
            national_id: rut.to_string(),
            email: "ana@canalx.cl".to_string(),
            role: "Periodista".to_string(),
            credential_type: Some("Colegio de Periodistas".to_string()),
            credential_number: Some("CP-1234".to_string()),
            area: "prensa".to_string(),
            company: "Canal X".to_string(),
            zone_id: None,
            status,
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

    fn names() -> DisplayNames {
        DisplayNames::new(
            &[zone::Model {
                id: 3,
                event_id: 1,
                name: "Tribuna Andes".to_string(),
            }],
            &[AreaDefinition {
                code: "prensa".to_string(),
                name: "Prensa Escrita".to_string(),
                max_quota: 10,
            }],
        )
    }

    #[test]
    fn test_normalize_strips_accents() {
        assert_eq!(normalize("Álvarez"), "alvarez");
        assert_eq!(normalize("ÑUÑOA"), "nunoa");
        assert_eq!(normalize("Fotógrafo"), "fotografo");
    }

    #[test]
    fn test_accent_insensitive_surname() {
        let records = vec![
            record("a", "Álvarez", "12345678-5", AccreditationStatus::Pending),
            record("b", "Pérez", "11111111-1", AccreditationStatus::Pending),
        ];
        let found = filter_records(&records, "alvarez", None, &names());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[test]
    fn test_raw_national_id_substring() {
        let records = vec![
            record("a", "Álvarez", "12345678-5", AccreditationStatus::Pending),
            record("b", "Pérez", "11111111-1", AccreditationStatus::Pending),
        ];
        let found = filter_records(&records, "5678-5", None, &names());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "a");
    }

    #[test]
    fn test_empty_term_is_identity() {
        let records = vec![
            record("a", "Álvarez", "12345678-5", AccreditationStatus::Pending),
            record("b", "Pérez", "11111111-1", AccreditationStatus::Approved),
        ];
        assert_eq!(filter_records(&records, "  ", None, &names()).len(), 2);
    }

    #[test]
    fn test_status_filter_is_anded() {
        let records = vec![
            record("a", "Álvarez", "12345678-5", AccreditationStatus::Pending),
            record("b", "Álvarez", "11111111-1", AccreditationStatus::Approved),
        ];
        let found = filter_records(
            &records,
            "alvarez",
            Some(AccreditationStatus::Approved),
            &names(),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "b");
    }

    #[test]
    fn test_zone_and_area_display_names_match() {
        let mut assigned = record("a", "Soto", "12345678-5", AccreditationStatus::Pending);
        assigned.zone_id = Some(3);
        let unassigned = record("b", "Rojas", "11111111-1", AccreditationStatus::Pending);
        let records = vec![assigned, unassigned];

        let by_zone = filter_records(&records, "andes", None, &names());
        assert_eq!(by_zone.len(), 1);
        assert_eq!(by_zone[0].id, "a");

        let by_fallback = filter_records(&records, "sin asignar", None, &names());
        assert_eq!(by_fallback.len(), 1);
        assert_eq!(by_fallback[0].id, "b");

        assert_eq!(filter_records(&records, "escrita", None, &names()).len(), 2);
    }

    #[test]
    fn test_credential_fields_match() {
        let records = vec![record("a", "Soto", "12345678-5", AccreditationStatus::Pending)];
        assert_eq!(filter_records(&records, "cp-1234", None, &names()).len(), 1);
    }
}
