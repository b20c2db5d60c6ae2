//! Spreadsheet shapes for exporting accreditation lists.

use accreditation_db::entities::accreditation::{self, AccreditationStatus};
use serde::{Deserialize, Serialize};

use super::search::DisplayNames;
use super::validation::format_national_id;

/// Export layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Every field.
    #[default]
    Complete,
    /// Reduced column set for the ticketing provider.
    Ticketing,
}

/// A table ready to be written to a spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

const COMPLETE_HEADERS: [&str; 20] = [
    "Nombre",
    "Primer Apellido",
    "Segundo Apellido",
    "RUT",
    "Email",
    "Cargo",
    "Tipo Credencial",
    "N° Credencial",
    "Área",
    "Empresa",
    "Zona",
    "Estado",
    "Motivo Rechazo",
    "Responsable",
    "Apellido Responsable",
    "RUT Responsable",
    "Email Responsable",
    "Teléfono Responsable",
    "Evento",
    "Fecha Solicitud",
];

const TICKETING_HEADERS: [&str; 6] = ["Nombre", "Apellido", "RUT", "Empresa", "Área", "Zona"];

/// Spanish label for a status.
#[must_use]
pub const fn status_label(status: AccreditationStatus) -> &'static str {
    match status {
        AccreditationStatus::Pending => "Pendiente",
        AccreditationStatus::Approved => "Aprobado",
        AccreditationStatus::Rejected => "Rechazado",
    }
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|h| (*h).to_string()).collect()
}

fn opt(value: Option<&String>) -> String {
    value.cloned().unwrap_or_default()
}

/// Every column, one row per record, in input order.
#[must_use]
pub fn export_complete(records: &[&accreditation::Model], names: &DisplayNames) -> ExportSheet {
    let rows = records
        .iter()
        .map(|r| {
            vec![
                r.given_name.clone(),
                r.first_surname.clone(),
                opt(r.second_surname.as_ref()),
                format_national_id(&r.national_id),
                r.email.clone(),
                r.role.clone(),
                opt(r.credential_type.as_ref()),
                opt(r.credential_number.as_ref()),
                names.area_name(&r.area).to_string(),
                r.company.clone(),
                names.zone_name(r.zone_id).to_string(),
                status_label(r.status).to_string(),
                opt(r.rejection_reason.as_ref()),
                r.submitter_name.clone(),
                r.submitter_first_surname.clone(),
                format_national_id(&r.submitter_national_id),
                r.submitter_email.clone(),
                opt(r.submitter_phone.as_ref()),
                r.event_id.to_string(),
                r.created_at.format("%Y-%m-%d %H:%M").to_string(),
            ]
        })
        .collect();

    ExportSheet {
        headers: headers(&COMPLETE_HEADERS),
        rows,
    }
}

/// Name, surnames, RUT, company, area and zone.
#[must_use]
pub fn export_ticketing(records: &[&accreditation::Model], names: &DisplayNames) -> ExportSheet {
    let rows = records
        .iter()
        .map(|r| {
            let surname = match r.second_surname.as_deref().filter(|s| !s.trim().is_empty()) {
                Some(second) => format!("{} {second}", r.first_surname),
                None => r.first_surname.clone(),
            };
            vec![
                r.given_name.clone(),
                surname,
                format_national_id(&r.national_id),
                r.company.clone(),
                names.area_name(&r.area).to_string(),
                names.zone_name(r.zone_id).to_string(),
            ]
        })
        .collect();

    ExportSheet {
        headers: headers(&TICKETING_HEADERS),
        rows,
    }
}

/// Build the sheet for `format`.
#[must_use]
pub fn export(
    format: ExportFormat,
    records: &[&accreditation::Model],
    names: &DisplayNames,
) -> ExportSheet {
    match format {
        ExportFormat::Complete => export_complete(records, names),
        ExportFormat::Ticketing => export_ticketing(records, names),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::quota::AreaDefinition;
    use accreditation_db::entities::zone;
    use chrono::Utc;

    fn record() -> accreditation::Model {
        accreditation::Model {
            id: "a".to_string(),
            event_id: 4,
            given_name: "Ana".to_string(),
            first_surname: "Álvarez".to_string(),
            second_surname: Some("Rojas".to_string()),
            national_id: "123456785".to_string(),
            email: "ana@canalx.cl".to_string(),
            role: "Periodista".to_string(),
            credential_type: None,
            credential_number: None,
            area: "prensa".to_string(),
            company: "Canal X".to_string(),
            zone_id: Some(2),
            status: AccreditationStatus::Rejected,
            rejection_reason: Some("Cupo".to_string()),
            submitter_name: "Jefa".to_string(),
            submitter_first_surname: "Prensa".to_string(),
            submitter_second_surname: None,
            submitter_national_id: "11111111-1".to_string(),
            submitter_email: "jefa@canalx.cl".to_string(),
            submitter_phone: Some("+56911111111".to_string()),
            created_at: Utc::now().into(),
        }
    }

    fn names() -> DisplayNames {
        DisplayNames::new(
            &[zone::Model {
                id: 2,
                event_id: 4,
                name: "Prensa".to_string(),
            }],
            &[AreaDefinition {
                code: "prensa".to_string(),
                name: "Prensa Escrita".to_string(),
                max_quota: 10,
            }],
        )
    }

    #[test]
    fn test_complete_shape() {
        let r = record();
        let sheet = export_complete(&[&r], &names());
        assert_eq!(sheet.headers.len(), COMPLETE_HEADERS.len());
        assert_eq!(sheet.rows.len(), 1);
        let row = &sheet.rows[0];
        assert_eq!(row.len(), sheet.headers.len());
        assert_eq!(row[3], "12.345.678-5");
        assert_eq!(row[8], "Prensa Escrita");
        assert_eq!(row[10], "Prensa");
        assert_eq!(row[11], "Rechazado");
        assert_eq!(row[12], "Cupo");
    }

    #[test]
    fn test_ticketing_shape() {
        let mut r = record();
        r.zone_id = None;
        let sheet = export(ExportFormat::Ticketing, &[&r], &names());
        assert_eq!(
            sheet.headers,
            vec!["Nombre", "Apellido", "RUT", "Empresa", "Área", "Zona"]
        );
        assert_eq!(
            sheet.rows[0],
            vec!["Ana", "Álvarez Rojas", "12.345.678-5", "Canal X", "Prensa Escrita", "Sin asignar"]
        );
    }

    #[test]
    fn test_empty_export_keeps_headers() {
        let sheet = export(ExportFormat::Complete, &[], &names());
        assert!(sheet.rows.is_empty());
        assert!(!sheet.headers.is_empty());
    }
}
