//! Database repositories.

mod accreditation;
mod area;
mod email_log;
mod email_template;
mod event;
mod zone;

pub use accreditation::{AccreditationRepository, is_unique_violation};
pub use area::AreaRepository;
pub use email_log::EmailLogRepository;
pub use email_template::EmailTemplateRepository;
pub use event::EventRepository;
pub use zone::ZoneRepository;
