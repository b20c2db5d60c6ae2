//! Batch accreditation intake.
//!
//! Every step is a gate: the first failure aborts the request and nothing is
//! written.
//!
//! The quota count and the insert are separate store calls, so two concurrent
//! batches for the same (event, area, company) can both pass the check.

use accreditation_common::{AppError, AppResult, IdGenerator, config::IntakeSettings};
use accreditation_db::{
    entities::accreditation::{self, AccreditationStatus},
    repositories::{AccreditationRepository, AreaRepository, ZoneRepository},
};
use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

use super::{
    event::EventService,
    quota::{AreaDefinition, QuotaService, find_area},
    validation::{validate_email, validate_national_id},
    zone_resolver::resolve_zone_for_role,
};

/// Defaults injected into the pipeline.
#[derive(Debug, Clone)]
pub struct IntakeDefaults {
    /// Event used when no event is active.
    pub default_event_id: i32,
    /// Areas used when the area table cannot be read.
    pub fallback_areas: Vec<AreaDefinition>,
}

impl From<&IntakeSettings> for IntakeDefaults {
    fn from(settings: &IntakeSettings) -> Self {
        Self {
            default_event_id: settings.default_event_id,
            fallback_areas: settings
                .fallback_areas
                .iter()
                .map(AreaDefinition::from)
                .collect(),
        }
    }
}

/// One person to accredit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeIndividual {
    #[serde(default)]
    pub nombre: String,
    #[serde(default)]
    pub primer_apellido: String,
    #[serde(default)]
    pub segundo_apellido: Option<String>,
    #[serde(default)]
    pub rut: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub cargo: String,
    #[serde(default)]
    pub tipo_credencial: Option<String>,
    #[serde(default)]
    pub numero_credencial: Option<String>,
}

/// A batch submitted by one responsible person for one company and area.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntakeRequest {
    #[serde(default)]
    pub responsable_nombre: String,
    #[serde(default)]
    pub responsable_primer_apellido: String,
    #[serde(default)]
    pub responsable_segundo_apellido: Option<String>,
    #[serde(default)]
    pub responsable_rut: String,
    #[serde(default)]
    pub responsable_email: String,
    #[serde(default)]
    pub responsable_telefono: Option<String>,
    #[serde(default)]
    pub empresa: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub acreditados: Vec<IntakeIndividual>,
    #[serde(default)]
    pub evento_id: Option<i32>,
}

/// Result of an accepted batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IntakeOutcome {
    pub event_id: i32,
    pub inserted: u64,
}

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

fn non_blank(s: Option<&String>) -> Option<String> {
    s.map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Required-field check over the submitter, company, area and individuals.
fn check_required(request: &IntakeRequest) -> AppResult<()> {
    let mut missing = Vec::new();
    if blank(&request.responsable_nombre) {
        missing.push("responsable_nombre");
    }
    if blank(&request.responsable_primer_apellido) {
        missing.push("responsable_primer_apellido");
    }
    if blank(&request.responsable_rut) {
        missing.push("responsable_rut");
    }
    if blank(&request.responsable_email) {
        missing.push("responsable_email");
    }
    if blank(&request.empresa) {
        missing.push("empresa");
    }
    if blank(&request.area) {
        missing.push("area");
    }
    if request.acreditados.is_empty() {
        missing.push("acreditados");
    }
    if !missing.is_empty() {
        return Err(AppError::IncompleteData(missing.join(", ")));
    }

    for (i, person) in request.acreditados.iter().enumerate() {
        if blank(&person.nombre)
            || blank(&person.primer_apellido)
            || blank(&person.rut)
            || blank(&person.email)
        {
            return Err(AppError::IncompleteData(format!(
                "acreditado {} (nombre, primer_apellido, rut y email son obligatorios)",
                i + 1
            )));
        }
    }

    Ok(())
}

/// RUT checksum and email syntax for the submitter and every individual.
fn check_identities(request: &IntakeRequest) -> AppResult<()> {
    if !validate_email(&request.responsable_email) {
        return Err(AppError::Validation(format!(
            "Email del responsable inválido: {}",
            request.responsable_email.trim()
        )));
    }

    for person in &request.acreditados {
        if !validate_national_id(&person.rut) {
            return Err(AppError::Validation(format!(
                "RUT inválido: {}",
                person.rut.trim()
            )));
        }
        if !validate_email(&person.email) {
            return Err(AppError::Validation(format!(
                "Email inválido: {}",
                person.email.trim()
            )));
        }
    }

    Ok(())
}

/// Store form of a RUT: no dots, uppercase check character.
fn normalize_national_id(rut: &str) -> String {
    rut.trim().replace('.', "").to_uppercase()
}

/// Orchestrates validation, quota, zone resolution and the atomic insert.
#[derive(Clone)]
pub struct IntakeService {
    accreditation_repo: AccreditationRepository,
    area_repo: AreaRepository,
    zone_repo: ZoneRepository,
    event_service: EventService,
    quota_service: QuotaService,
    defaults: IntakeDefaults,
    id_gen: IdGenerator,
}

impl IntakeService {
    #[must_use]
    pub const fn new(
        accreditation_repo: AccreditationRepository,
        area_repo: AreaRepository,
        zone_repo: ZoneRepository,
        event_service: EventService,
        quota_service: QuotaService,
        defaults: IntakeDefaults,
    ) -> Self {
        Self {
            accreditation_repo,
            area_repo,
            zone_repo,
            event_service,
            quota_service,
            defaults,
            id_gen: IdGenerator::new(),
        }
    }

    /// Areas of an event, or the fallback table when the lookup fails.
    async fn load_areas(&self, event_id: i32) -> Vec<AreaDefinition> {
        match self.area_repo.find_by_event(event_id).await {
            Ok(rows) => rows.into_iter().map(AreaDefinition::from).collect(),
            Err(e) => {
                tracing::warn!(error = %e, event_id, "Area lookup failed, using fallback areas");
                self.defaults.fallback_areas.clone()
            }
        }
    }

    /// Submit a batch.
    pub async fn submit_batch(&self, request: IntakeRequest) -> AppResult<IntakeOutcome> {
        check_required(&request)?;
        check_identities(&request)?;

        let event_id = self.event_service.resolve_event(request.evento_id).await;

        let areas = self.load_areas(event_id).await;
        let area = find_area(&areas, &request.area)
            .ok_or_else(|| AppError::AreaNotFound(request.area.trim().to_string()))?;

        let company = request.empresa.trim();
        self.quota_service
            .check(event_id, area, company, request.acreditados.len())
            .await?;

        let zones = match self.zone_repo.find_by_event(event_id).await {
            Ok(zones) => zones,
            Err(e) => {
                tracing::warn!(error = %e, event_id, "Zone lookup failed, rows stay unassigned");
                Vec::new()
            }
        };

        let now = Utc::now();
        let models: Vec<accreditation::ActiveModel> = request
            .acreditados
            .iter()
            .map(|person| accreditation::ActiveModel {
                id: Set(self.id_gen.generate()),
                event_id: Set(event_id),
                given_name: Set(person.nombre.trim().to_string()),
                first_surname: Set(person.primer_apellido.trim().to_string()),
                second_surname: Set(non_blank(person.segundo_apellido.as_ref())),
                national_id: Set(normalize_national_id(&person.rut)),
                email: Set(person.email.trim().to_lowercase()),
                role: Set(person.cargo.trim().to_string()),
                credential_type: Set(non_blank(person.tipo_credencial.as_ref())),
                credential_number: Set(non_blank(person.numero_credencial.as_ref())),
                area: Set(area.code.clone()),
                company: Set(company.to_string()),
                zone_id: Set(resolve_zone_for_role(&person.cargo, &zones)),
                status: Set(AccreditationStatus::Pending),
                rejection_reason: Set(None),
                submitter_name: Set(request.responsable_nombre.trim().to_string()),
                submitter_first_surname: Set(request.responsable_primer_apellido.trim().to_string()),
                submitter_second_surname: Set(non_blank(
                    request.responsable_segundo_apellido.as_ref(),
                )),
                submitter_national_id: Set(normalize_national_id(&request.responsable_rut)),
                submitter_email: Set(request.responsable_email.trim().to_lowercase()),
                submitter_phone: Set(non_blank(request.responsable_telefono.as_ref())),
                created_at: Set(now.into()),
            })
            .collect();

        let inserted = self.accreditation_repo.insert_batch(models).await?;

        tracing::info!(
            event_id,
            area = %area.code,
            empresa = %company,
            count = inserted,
            "Accreditation batch accepted"
        );

        Ok(IntakeOutcome { event_id, inserted })
    }
}
