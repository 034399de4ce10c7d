use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::DonationConfig,
    domain::*,
    error::{AppError, Result},
    payments::{ChargeRequest, PaymentGateway},
    repository::DonationRepository,
};

pub struct DonationService {
    repo: Arc<dyn DonationRepository>,
    gateway: Arc<dyn PaymentGateway>,
    config: DonationConfig,
}

impl DonationService {
    pub fn new(
        repo: Arc<dyn DonationRepository>,
        gateway: Arc<dyn PaymentGateway>,
        config: DonationConfig,
    ) -> Self {
        Self { repo, gateway, config }
    }

    pub fn currency(&self) -> &str {
        &self.config.currency
    }

    pub fn preset_amounts(&self) -> &[u32] {
        &self.config.preset_amounts
    }

    /// Records a new donation in `pending`. Nothing is charged yet.
    pub async fn initiate(&self, user_id: Uuid, request: CreateDonationRequest) -> Result<Donation> {
        request.validate()?;
        let amount_minor = amount_to_minor_units(request.amount, self.config.max_amount_minor)?;

        let notes = request
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let donation = self.repo
            .create(NewDonation { user_id, amount_minor, notes })
            .await?;

        tracing::info!(
            "Donation {} initiated by {} for {} {}",
            donation.id,
            user_id,
            format_minor_units(amount_minor),
            self.config.currency
        );

        Ok(donation)
    }

    /// Runs the payment for a pending donation and stores the outcome.
    pub async fn settle(&self, user_id: Uuid, donation_id: Uuid, simulate_success: bool) -> Result<Donation> {
        let donation = self.get_for_user(user_id, donation_id).await?;

        if donation.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Donation has already been marked {}",
                donation.status
            )));
        }

        let request = ChargeRequest::for_donation(&donation, &self.config.currency, simulate_success);
        let settlement = self.gateway.charge(request).await?;
        let settled = self.repo.settle(donation.id, settlement).await?;

        tracing::info!("Donation {} settled as {}", settled.id, settled.status);
        Ok(settled)
    }

    /// Fetches one donation, hiding other users' records behind `NotFound`.
    pub async fn get_for_user(&self, user_id: Uuid, donation_id: Uuid) -> Result<Donation> {
        self.repo
            .find_by_id(donation_id)
            .await?
            .filter(|d| d.user_id == user_id)
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))
    }

    pub async fn history(&self, user_id: Uuid) -> Result<Vec<Donation>> {
        self.repo.find_by_user(user_id).await
    }

    pub async fn list_with_donors(&self, filter: &DonationFilter) -> Result<Vec<DonationWithDonor>> {
        let records = self.repo.list_with_donors().await?;
        Ok(filter.apply(records))
    }

    pub async fn stats(&self) -> Result<DonationStats> {
        let donations = self.repo.list().await?;
        Ok(DonationStats::from_donations(&donations))
    }
}
