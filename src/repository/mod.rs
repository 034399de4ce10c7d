use async_trait::async_trait;
use uuid::Uuid;
use crate::domain::*;
use crate::error::Result;

pub mod donation_repository;
pub mod profile_repository;

pub use donation_repository::SqliteDonationRepository;
pub use profile_repository::SqliteProfileRepository;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>>;
    async fn list(&self) -> Result<Vec<Profile>>;
    async fn count(&self) -> Result<i64>;
    async fn update(&self, user_id: Uuid, update: UpdateProfileRequest) -> Result<Profile>;
    async fn set_role(&self, user_id: Uuid, role: Role) -> Result<Profile>;
}

#[async_trait]
pub trait DonationRepository: Send + Sync {
    async fn create(&self, donation: NewDonation) -> Result<Donation>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>>;
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Donation>>;
    async fn list(&self) -> Result<Vec<Donation>>;
    async fn list_with_donors(&self) -> Result<Vec<DonationWithDonor>>;
    /// Moves a pending donation to its terminal state. Fails with `Conflict`
    /// when the donation has already settled.
    async fn settle(&self, id: Uuid, settlement: DonationSettlement) -> Result<Donation>;
}
