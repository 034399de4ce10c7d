pub mod donation_service;
pub mod export_service;

use std::sync::Arc;
use sqlx::SqlitePool;
use crate::auth::AuthService;
use crate::config::Settings;
use crate::payments::PaymentGateway;
use crate::repository::*;
use donation_service::DonationService;

pub struct ServiceContext {
    pub profile_repo: Arc<dyn ProfileRepository>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub auth_service: Arc<AuthService>,
    pub donation_service: Arc<DonationService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        profile_repo: Arc<dyn ProfileRepository>,
        donation_repo: Arc<dyn DonationRepository>,
        payment_gateway: Arc<dyn PaymentGateway>,
        auth_service: Arc<AuthService>,
        settings: &Settings,
        db_pool: SqlitePool,
    ) -> Self {
        let donation_service = Arc::new(DonationService::new(
            donation_repo,
            payment_gateway.clone(),
            settings.donations.clone(),
        ));

        Self {
            profile_repo,
            payment_gateway,
            auth_service,
            donation_service,
            db_pool,
        }
    }

    /// Wires the SQLite repositories and the given gateway onto one pool.
    pub fn from_pool(
        db_pool: SqlitePool,
        payment_gateway: Arc<dyn PaymentGateway>,
        settings: &Settings,
    ) -> Self {
        let profile_repo = Arc::new(SqliteProfileRepository::new(db_pool.clone()));
        let donation_repo = Arc::new(SqliteDonationRepository::new(db_pool.clone()));
        let auth_service = Arc::new(AuthService::new(db_pool.clone(), &settings.auth));

        Self::new(
            profile_repo,
            donation_repo,
            payment_gateway,
            auth_service,
            settings,
            db_pool,
        )
    }
}
