pub mod event;
pub mod registration;
pub mod user;
pub mod volunteer;

pub use event::{Event, EventStatus};
pub use registration::{Registration, RegistrationStatus};
pub use user::{Role, User};
pub use volunteer::{Volunteer, VolunteerStatus};
