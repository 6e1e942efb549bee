use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::notifications::Notifier;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, EventService, RegistrationService, SeaOrmAuthService, SeaOrmEventService,
    SeaOrmRegistrationService, SeaOrmVolunteerService, VolunteerService,
};

/// Application-wide state: configuration, the store, the domain services,
/// and the notification bus. Built once at startup and injected into every
/// handler; nothing here is a module-level singleton.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub event_service: Arc<dyn EventService>,

    pub volunteer_service: Arc<dyn VolunteerService>,

    pub registration_service: Arc<dyn RegistrationService>,

    pub notifier: Notifier,

    pub start_time: std::time::Instant,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let notifier = Notifier::new(config.server.event_bus_buffer_size);

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let event_service =
            Arc::new(SeaOrmEventService::new(store.clone())) as Arc<dyn EventService>;

        let volunteer_service =
            Arc::new(SeaOrmVolunteerService::new(store.clone())) as Arc<dyn VolunteerService>;

        let registration_service = Arc::new(SeaOrmRegistrationService::new(store.clone()))
            as Arc<dyn RegistrationService>;

        Ok(Arc::new(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            auth_service,
            event_service,
            volunteer_service,
            registration_service,
            notifier,
            start_time: std::time::Instant::now(),
        }))
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
