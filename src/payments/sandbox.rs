use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;

use crate::{
    domain::{DonationSettlement, DonationStatus},
    error::Result,
    payments::{ChargeRequest, PaymentGateway},
};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Test-mode gateway. No money moves: the donor picks the outcome and a
/// successful charge is given an opaque reference so it can be searched for
/// later. Nothing here proves that a `success` matches a real transfer.
#[derive(Debug, Default, Clone)]
pub struct SandboxGateway;

impl SandboxGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentGateway for SandboxGateway {
    fn name(&self) -> &'static str {
        "sandbox"
    }

    async fn charge(&self, request: ChargeRequest) -> Result<DonationSettlement> {
        let settlement = if request.simulate_success {
            DonationSettlement {
                status: DonationStatus::Success,
                payment_id: Some(generate_payment_id()),
                payment_method: Some(self.name().to_string()),
            }
        } else {
            DonationSettlement {
                status: DonationStatus::Failed,
                payment_id: None,
                payment_method: Some(self.name().to_string()),
            }
        };

        tracing::info!(
            "Sandbox charge for donation {} ({} minor units {}): {}",
            request.donation_id,
            request.amount_minor,
            request.currency,
            settlement.status
        );

        Ok(settlement)
    }
}

/// `PAY_<unix millis>_<9 base-36 chars>`. Unique enough to search on, not a
/// security token.
pub fn generate_payment_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("PAY_{}_{}", Utc::now().timestamp_millis(), suffix)
}
