use async_trait::async_trait;
use chrono::{DateTime, Utc, NaiveDateTime};
use sqlx::{SqlitePool, FromRow};
use uuid::Uuid;

use crate::{
    domain::{Donation, DonationSettlement, DonationStatus, DonationWithDonor, DonorInfo, NewDonation},
    error::{AppError, Result},
    repository::DonationRepository,
};

#[derive(FromRow)]
struct DonationRow {
    id: String,
    user_id: String,
    amount_minor: i64,
    status: String,
    payment_id: Option<String>,
    payment_method: Option<String>,
    notes: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct DonationWithDonorRow {
    #[sqlx(flatten)]
    donation: DonationRow,
    donor_email: Option<String>,
    donor_full_name: Option<String>,
    donor_phone: Option<String>,
}

pub struct SqliteDonationRepository {
    pool: SqlitePool,
}

impl SqliteDonationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_donation(row: DonationRow) -> Result<Donation> {
        Ok(Donation {
            id: Uuid::parse_str(&row.id).map_err(|e| AppError::Database(e.to_string()))?,
            user_id: Uuid::parse_str(&row.user_id).map_err(|e| AppError::Database(e.to_string()))?,
            amount_minor: row.amount_minor,
            status: DonationStatus::parse(&row.status)
                .ok_or_else(|| AppError::Database(format!("Invalid donation status: {}", row.status)))?,
            payment_id: row.payment_id,
            payment_method: row.payment_method,
            notes: row.notes,
            created_at: DateTime::from_naive_utc_and_offset(row.created_at, Utc),
            updated_at: DateTime::from_naive_utc_and_offset(row.updated_at, Utc),
        })
    }

    fn row_to_donation_with_donor(row: DonationWithDonorRow) -> Result<DonationWithDonor> {
        Ok(DonationWithDonor {
            donation: Self::row_to_donation(row.donation)?,
            donor: DonorInfo {
                email: row.donor_email,
                full_name: row.donor_full_name,
                phone: row.donor_phone,
            },
        })
    }
}

#[async_trait]
impl DonationRepository for SqliteDonationRepository {
    async fn create(&self, donation: NewDonation) -> Result<Donation> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO donations (
                id, user_id, amount_minor, status, notes, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#
        )
        .bind(id.to_string())
        .bind(donation.user_id.to_string())
        .bind(donation.amount_minor)
        .bind(DonationStatus::Pending.as_str())
        .bind(&donation.notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created donation".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Donation>> {
        let row = sqlx::query_as::<_, DonationRow>(
            r#"
            SELECT id, user_id, amount_minor, status, payment_id, payment_method,
                   notes, created_at, updated_at
            FROM donations
            WHERE id = ?
            "#
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_donation).transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            r#"
            SELECT id, user_id, amount_minor, status, payment_id, payment_method,
                   notes, created_at, updated_at
            FROM donations
            WHERE user_id = ?
            ORDER BY created_at DESC
            "#
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_donation)
            .collect()
    }

    async fn list(&self) -> Result<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            r#"
            SELECT id, user_id, amount_minor, status, payment_id, payment_method,
                   notes, created_at, updated_at
            FROM donations
            ORDER BY created_at DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_donation)
            .collect()
    }

    async fn list_with_donors(&self) -> Result<Vec<DonationWithDonor>> {
        let rows = sqlx::query_as::<_, DonationWithDonorRow>(
            r#"
            SELECT d.id, d.user_id, d.amount_minor, d.status, d.payment_id,
                   d.payment_method, d.notes, d.created_at, d.updated_at,
                   p.email AS donor_email,
                   p.full_name AS donor_full_name,
                   p.phone AS donor_phone
            FROM donations d
            LEFT JOIN profiles p ON p.user_id = d.user_id
            ORDER BY d.created_at DESC
            "#
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(Self::row_to_donation_with_donor)
            .collect()
    }

    async fn settle(&self, id: Uuid, settlement: DonationSettlement) -> Result<Donation> {
        if !DonationStatus::Pending.can_transition_to(settlement.status) {
            return Err(AppError::BadRequest(format!(
                "Cannot settle a donation as {}",
                settlement.status
            )));
        }

        let now = Utc::now().naive_utc();

        // Only a pending row is eligible, so a second settlement is a no-op here
        let result = sqlx::query(
            r#"
            UPDATE donations
            SET status = ?,
                payment_id = ?,
                payment_method = ?,
                updated_at = ?
            WHERE id = ? AND status = ?
            "#
        )
        .bind(settlement.status.as_str())
        .bind(&settlement.payment_id)
        .bind(&settlement.payment_method)
        .bind(now)
        .bind(id.to_string())
        .bind(DonationStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        let donation = self.find_by_id(id).await?
            .ok_or_else(|| AppError::NotFound("Donation not found".to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "Donation has already been marked {}",
                donation.status
            )));
        }

        Ok(donation)
    }
}
