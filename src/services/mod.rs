pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, RegisterInput};
pub use auth_service_impl::SeaOrmAuthService;

pub mod event_service;
pub mod event_service_impl;
pub use event_service::{EventError, EventFilter, EventService};
pub use event_service_impl::SeaOrmEventService;

pub mod volunteer_service;
pub mod volunteer_service_impl;
pub use volunteer_service::{VolunteerError, VolunteerService};
pub use volunteer_service_impl::SeaOrmVolunteerService;

pub mod registration_service;
pub mod registration_service_impl;
pub use registration_service::{RegistrationError, RegistrationService};
pub use registration_service_impl::SeaOrmRegistrationService;
