//! Approval and rejection email rendering.
//!
//! Overrides are looked up per (event, type, zone key). A missing field falls
//! back to the `default` zone key, then to the event's own description, then
//! to built-in copy.

use accreditation_common::{AppError, AppResult, IdGenerator};
use accreditation_db::{
    entities::{
        accreditation::{self, AccreditationStatus},
        email_template::{self, TemplateType, ZoneKey},
        event,
    },
    repositories::{EmailTemplateRepository, EventRepository},
};
use chrono::Utc;
use sea_orm::{IntoActiveModel, Set};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::search::DisplayNames;

/// Zone whose applicants get field-access instructions.
pub const FIELD_ZONE_NAME: &str = "Cancha";

const DEFAULT_MATCH: &str = "el evento";

const FIELD_INSTRUCTIONS: &str = "Tu acreditación te permite trabajar en el sector de cancha. \
Ingresa por el acceso de prensa con tu cédula de identidad, retira tu credencial y el peto \
identificatorio, y permanece detrás de la línea de publicidad durante todo el partido. \
No está permitido ingresar al campo de juego ni a la zona de bancas.";

const PRESS_INSTRUCTIONS: &str = "Ingresa por el acceso de prensa con tu cédula de identidad \
y retira tu credencial en el punto de acreditación. Tu ubicación será el sector de prensa \
asignado; la zona mixta se habilita al término del partido.";

const GENERAL_INFO: &str = "La acreditación es personal e intransferible y debe portarse en \
un lugar visible durante toda la jornada. El uso indebido de la credencial significará su \
retiro inmediato.";

/// Escape text for interpolation into HTML.
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Escape free text and turn newlines into `<br>`.
#[must_use]
pub fn escape_multiline(s: &str) -> String {
    escape_html(s).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Template variant for a zone name.
#[must_use]
pub fn zone_key_for(zone_name: &str) -> ZoneKey {
    if zone_name.trim() == FIELD_ZONE_NAME {
        ZoneKey::Cancha
    } else {
        ZoneKey::Default
    }
}

/// Text fields after override resolution. `None` means use built-in copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFields {
    pub subject: Option<String>,
    pub match_description: Option<String>,
    pub event_date: Option<String>,
    pub venue: Option<String>,
    pub arrival_time: Option<String>,
    pub start_time: Option<String>,
    pub contact_email: Option<String>,
    pub intro_text: Option<String>,
    pub instructions_text: Option<String>,
    pub general_info_text: Option<String>,
}

fn pick(values: &[Option<&String>]) -> Option<String> {
    values
        .iter()
        .flatten()
        .map(|v| v.trim())
        .find(|v| !v.is_empty())
        .map(ToString::to_string)
}

impl TemplateFields {
    /// Merge overrides, most specific first.
    #[must_use]
    pub fn resolve(
        specific: Option<&email_template::Model>,
        fallback: Option<&email_template::Model>,
        event: Option<&event::Model>,
    ) -> Self {
        macro_rules! field {
            ($name:ident) => {
                pick(&[
                    specific.and_then(|t| t.$name.as_ref()),
                    fallback.and_then(|t| t.$name.as_ref()),
                ])
            };
        }

        Self {
            subject: field!(subject),
            match_description: pick(&[
                specific.and_then(|t| t.match_description.as_ref()),
                fallback.and_then(|t| t.match_description.as_ref()),
                event.and_then(|e| e.description.as_ref()),
                event.map(|e| &e.name),
            ]),
            event_date: pick(&[
                specific.and_then(|t| t.event_date.as_ref()),
                fallback.and_then(|t| t.event_date.as_ref()),
                event.and_then(|e| e.event_date.as_ref()),
            ]),
            venue: pick(&[
                specific.and_then(|t| t.venue.as_ref()),
                fallback.and_then(|t| t.venue.as_ref()),
                event.and_then(|e| e.venue.as_ref()),
            ]),
            arrival_time: field!(arrival_time),
            start_time: field!(start_time),
            contact_email: field!(contact_email),
            intro_text: field!(intro_text),
            instructions_text: field!(instructions_text),
            general_info_text: field!(general_info_text),
        }
    }

    fn match_label(&self) -> &str {
        self.match_description.as_deref().unwrap_or(DEFAULT_MATCH)
    }

    /// Built-in intro sentence from the event's descriptive fields.
    fn default_intro(&self, outcome: &str) -> String {
        let mut intro = format!(
            "Tu solicitud de acreditación para <strong>{}</strong>",
            escape_html(self.match_label())
        );
        if let Some(date) = &self.event_date {
            intro.push_str(&format!(", el {}", escape_html(date)));
        }
        if let Some(venue) = &self.venue {
            intro.push_str(&format!(" en {}", escape_html(venue)));
        }
        intro.push_str(&format!(", {outcome}."));
        intro
    }

    fn intro(&self, outcome: &str) -> String {
        self.intro_text
            .as_deref()
            .map_or_else(|| self.default_intro(outcome), escape_multiline)
    }

    fn contact_line(&self) -> String {
        self.contact_email.as_deref().map_or_else(String::new, |email| {
            let email = escape_html(email);
            format!("<p>Consultas: <a href=\"mailto:{email}\">{email}</a></p>")
        })
    }
}

/// A rendered message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub template_type: TemplateType,
    pub subject: String,
    pub html: String,
}

fn wrap_html(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; line-height: 1.6; color: #1f2937; max-width: 600px; margin: 0 auto; padding: 20px; }}
        .box {{ margin: 16px 0; padding: 12px 16px; border-left: 4px solid #1d4ed8; background: #f3f4f6; }}
    </style>
</head>
<body>
    {content}
</body>
</html>"#
    )
}

/// Approval body.
#[must_use]
pub fn render_approval(
    given_name: &str,
    surname: &str,
    zone_name: &str,
    area_name: &str,
    fields: &TemplateFields,
) -> String {
    let instructions = fields.instructions_text.as_deref().map_or_else(
        || {
            if zone_key_for(zone_name) == ZoneKey::Cancha {
                FIELD_INSTRUCTIONS.to_string()
            } else {
                PRESS_INSTRUCTIONS.to_string()
            }
        },
        escape_multiline,
    );

    let mut schedule = String::new();
    if let Some(arrival) = &fields.arrival_time {
        schedule.push_str(&format!(
            "<p><strong>Hora de llegada:</strong> {}</p>",
            escape_html(arrival)
        ));
    }
    if let Some(start) = &fields.start_time {
        schedule.push_str(&format!(
            "<p><strong>Inicio:</strong> {}</p>",
            escape_html(start)
        ));
    }

    let general = fields
        .general_info_text
        .as_deref()
        .map_or_else(|| GENERAL_INFO.to_string(), escape_multiline);

    wrap_html(&format!(
        "<p>Hola {} {}:</p>\
         <p>{}</p>\
         <div class=\"box\"><p><strong>Zona:</strong> {}</p><p><strong>Área:</strong> {}</p>{}</div>\
         <p>{}</p>\
         <p>{}</p>\
         {}",
        escape_html(given_name),
        escape_html(surname),
        fields.intro("ha sido <strong>aprobada</strong>"),
        escape_html(zone_name),
        escape_html(area_name),
        schedule,
        instructions,
        general,
        fields.contact_line(),
    ))
}

/// Rejection body.
#[must_use]
pub fn render_rejection(
    given_name: &str,
    surname: &str,
    reason: Option<&str>,
    fields: &TemplateFields,
) -> String {
    let reason = reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map_or_else(String::new, |r| {
            format!("<div class=\"box\"><p><strong>Motivo:</strong> {}</p></div>", escape_multiline(r))
        });

    wrap_html(&format!(
        "<p>Hola {} {}:</p>\
         <p>{}</p>\
         {}\
         {}",
        escape_html(given_name),
        escape_html(surname),
        fields.intro("no ha sido aprobada"),
        reason,
        fields.contact_line(),
    ))
}

/// All overrides of one event, loaded once and rendered many times.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    pub event: Option<event::Model>,
    pub overrides: Vec<email_template::Model>,
}

impl TemplateSet {
    fn find(&self, template_type: TemplateType, zone_key: ZoneKey) -> Option<&email_template::Model> {
        self.overrides
            .iter()
            .find(|t| t.template_type == template_type && t.zone_key == zone_key)
    }

    /// Resolved fields for a type and zone key.
    #[must_use]
    pub fn fields(&self, template_type: TemplateType, zone_key: ZoneKey) -> TemplateFields {
        let fallback = self.find(template_type, ZoneKey::Default);
        let specific = if zone_key == ZoneKey::Default {
            None
        } else {
            self.find(template_type, zone_key)
        };
        TemplateFields::resolve(specific, fallback, self.event.as_ref())
    }

    /// Render the message matching the record's status.
    ///
    /// Pending records have no notification.
    #[must_use]
    pub fn render_for(
        &self,
        record: &accreditation::Model,
        names: &DisplayNames,
    ) -> Option<RenderedEmail> {
        let surname = match record.second_surname.as_deref() {
            Some(second) if !second.trim().is_empty() => {
                format!("{} {}", record.first_surname, second)
            }
            _ => record.first_surname.clone(),
        };

        match record.status {
            AccreditationStatus::Pending => None,
            AccreditationStatus::Approved => {
                let zone_name = names.zone_name(record.zone_id);
                let fields = self.fields(TemplateType::Approval, zone_key_for(zone_name));
                Some(RenderedEmail {
                    template_type: TemplateType::Approval,
                    subject: fields.subject.clone().unwrap_or_else(|| {
                        format!("Acreditación aprobada - {}", fields.match_label())
                    }),
                    html: render_approval(
                        &record.given_name,
                        &surname,
                        zone_name,
                        names.area_name(&record.area),
                        &fields,
                    ),
                })
            }
            AccreditationStatus::Rejected => {
                let fields = self.fields(TemplateType::Rejection, ZoneKey::Default);
                Some(RenderedEmail {
                    template_type: TemplateType::Rejection,
                    subject: fields.subject.clone().unwrap_or_else(|| {
                        format!("Solicitud de acreditación - {}", fields.match_label())
                    }),
                    html: render_rejection(
                        &record.given_name,
                        &surname,
                        record.rejection_reason.as_deref(),
                        &fields,
                    ),
                })
            }
        }
    }
}

/// Input for creating or replacing an override row. Blank fields clear the override.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTemplateInput {
    pub event_id: i32,
    pub template_type: TemplateType,
    #[serde(default)]
    pub zone_key: ZoneKey,
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(max = 500))]
    pub match_description: Option<String>,
    #[validate(length(max = 100))]
    pub event_date: Option<String>,
    #[validate(length(max = 200))]
    pub venue: Option<String>,
    #[validate(length(max = 50))]
    pub arrival_time: Option<String>,
    #[validate(length(max = 50))]
    pub start_time: Option<String>,
    #[validate(email)]
    pub contact_email: Option<String>,
    #[validate(length(max = 5000))]
    pub intro_text: Option<String>,
    #[validate(length(max = 5000))]
    pub instructions_text: Option<String>,
    #[validate(length(max = 5000))]
    pub general_info_text: Option<String>,
}

fn cleared(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Stores template overrides and loads them for rendering.
#[derive(Clone)]
pub struct EmailTemplateService {
    template_repo: EmailTemplateRepository,
    event_repo: EventRepository,
    id_gen: IdGenerator,
}

impl EmailTemplateService {
    #[must_use]
    pub const fn new(template_repo: EmailTemplateRepository, event_repo: EventRepository) -> Self {
        Self {
            template_repo,
            event_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Everything needed to render an event's emails.
    pub async fn load_set(&self, event_id: i32) -> AppResult<TemplateSet> {
        let event = self.event_repo.find_by_id(event_id).await?;
        let overrides = self.template_repo.find_by_event(event_id).await?;
        Ok(TemplateSet { event, overrides })
    }

    /// Override rows of an event.
    pub async fn list(&self, event_id: i32) -> AppResult<Vec<email_template::Model>> {
        self.template_repo.find_by_event(event_id).await
    }

    /// One override row.
    pub async fn get(
        &self,
        event_id: i32,
        template_type: TemplateType,
        zone_key: ZoneKey,
    ) -> AppResult<email_template::Model> {
        self.template_repo
            .find(event_id, template_type, zone_key)
            .await?
            .ok_or_else(|| AppError::NotFound("Email template not found".to_string()))
    }

    /// Create or replace the override row for the input's key.
    pub async fn upsert(&self, input: UpsertTemplateInput) -> AppResult<email_template::Model> {
        input.validate()?;
        self.event_repo.get_by_id(input.event_id).await?;

        let existing = self
            .template_repo
            .find(input.event_id, input.template_type, input.zone_key)
            .await?;

        let (mut model, is_new) = match existing {
            Some(row) => (row.into_active_model(), false),
            None => (
                email_template::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    event_id: Set(input.event_id),
                    template_type: Set(input.template_type),
                    zone_key: Set(input.zone_key),
                    ..Default::default()
                },
                true,
            ),
        };

        model.subject = Set(cleared(input.subject));
        model.match_description = Set(cleared(input.match_description));
        model.event_date = Set(cleared(input.event_date));
        model.venue = Set(cleared(input.venue));
        model.arrival_time = Set(cleared(input.arrival_time));
        model.start_time = Set(cleared(input.start_time));
        model.contact_email = Set(cleared(input.contact_email));
        model.intro_text = Set(cleared(input.intro_text));
        model.instructions_text = Set(cleared(input.instructions_text));
        model.general_info_text = Set(cleared(input.general_info_text));
        model.updated_at = Set(Utc::now().into());

        let saved = if is_new {
            self.template_repo.create(model).await?
        } else {
            self.template_repo.update(model).await?
        };

        tracing::info!(
            event_id = saved.event_id,
            template_type = ?saved.template_type,
            zone_key = ?saved.zone_key,
            "Email template saved"
        );

        Ok(saved)
    }
}
