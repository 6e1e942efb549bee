pub use super::event_registrations::Entity as EventRegistrations;
pub use super::events::Entity as Events;
pub use super::users::Entity as Users;
pub use super::volunteers::Entity as Volunteers;
