use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    domain::{Donation, DonationSettlement},
    error::Result,
};

pub mod sandbox;

pub use sandbox::SandboxGateway;

/// A charge against a pending donation.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub donation_id: Uuid,
    pub amount_minor: i64,
    pub currency: String,
    /// Outcome requested by the donor in the sandbox checkout.
    pub simulate_success: bool,
}

impl ChargeRequest {
    pub fn for_donation(donation: &Donation, currency: &str, simulate_success: bool) -> Self {
        Self {
            donation_id: donation.id,
            amount_minor: donation.amount_minor,
            currency: currency.to_string(),
            simulate_success,
        }
    }
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Short identifier recorded as the donation's payment method.
    fn name(&self) -> &'static str;

    /// Runs the charge and reports the terminal state the donation should take.
    async fn charge(&self, request: ChargeRequest) -> Result<DonationSettlement>;
}
