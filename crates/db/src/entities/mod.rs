//! Database entities.

pub mod accreditation;
pub mod area;
pub mod email_log;
pub mod email_template;
pub mod event;
pub mod zone;

pub use accreditation::Entity as Accreditation;
pub use area::Entity as Area;
pub use email_log::Entity as EmailLog;
pub use email_template::Entity as EmailTemplate;
pub use event::Entity as Event;
pub use zone::Entity as Zone;
