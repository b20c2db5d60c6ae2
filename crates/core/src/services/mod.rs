//! Business logic services.

#![allow(missing_docs)]

pub mod accreditation;
pub mod delivery_status;
pub mod email;
pub mod email_template;
pub mod event;
pub mod export;
pub mod intake;
pub mod optimistic;
pub mod quota;
pub mod search;
pub mod validation;
pub mod zone_resolver;

pub use accreditation::{
    AccreditationAdminService, AccreditationList, BulkAction, BulkEmailOutcome, BulkOutcome,
    BulkStatusOutcome, EmailOutcome, StatusChange, StatusCounts,
};
pub use delivery_status::{
    DeliveryStatusService, DeliveryWebhook, DeliveryWebhookData, Recipients, parse_event_type,
    verify_webhook_signature,
};
pub use email::{EmailSender, LogSender, OutgoingEmail, ResendSender, SendReceipt, SmtpSender, build_sender};
pub use email_template::{
    EmailTemplateService, RenderedEmail, TemplateFields, TemplateSet, UpsertTemplateInput,
    render_approval, render_rejection,
};
pub use event::EventService;
pub use export::{ExportFormat, ExportSheet, export, export_complete, export_ticketing};
pub use intake::{IntakeDefaults, IntakeIndividual, IntakeOutcome, IntakeRequest, IntakeService};
pub use optimistic::{Mutation, apply_mutation};
pub use quota::{AreaDefinition, Capacity, QuotaService};
pub use search::{DisplayNames, filter_records, normalize};
pub use validation::{format_national_id, validate_email, validate_national_id};
pub use zone_resolver::resolve_zone_for_role;
