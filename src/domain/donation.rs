use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub status: DonationStatus,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DonationStatus {
    Pending,
    Success,
    Failed,
}

impl DonationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DonationStatus::Pending => "pending",
            DonationStatus::Success => "success",
            DonationStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DonationStatus::Pending),
            "success" => Some(DonationStatus::Success),
            "failed" => Some(DonationStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DonationStatus::Pending)
    }

    /// `pending` may move to either terminal state; terminal states never move.
    pub fn can_transition_to(&self, next: DonationStatus) -> bool {
        matches!(self, DonationStatus::Pending) && next.is_terminal()
    }
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Donor columns joined from the owning profile.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DonorInfo {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationWithDonor {
    #[serde(flatten)]
    pub donation: Donation,
    pub donor: DonorInfo,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDonationRequest {
    /// Major units, as typed into the form.
    pub amount: f64,
    #[validate(length(max = 1000, message = "Message must be at most 1000 characters"))]
    pub notes: Option<String>,
}

/// Values the repository needs to insert a pending donation.
#[derive(Debug, Clone)]
pub struct NewDonation {
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub notes: Option<String>,
}

/// Terminal update applied once a payment outcome is known.
#[derive(Debug, Clone)]
pub struct DonationSettlement {
    pub status: DonationStatus,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
}

/// Converts a user-entered amount into minor units, rejecting anything that
/// is not a positive finite number no larger than `max_minor`. Amounts with
/// more than two decimal places are rejected rather than rounded.
pub fn amount_to_minor_units(amount: f64, max_minor: i64) -> Result<i64> {
    let invalid = || AppError::Validation("Please enter a valid donation amount".to_string());

    if !amount.is_finite() || amount <= 0.0 {
        return Err(invalid());
    }

    let scaled = amount * 100.0;
    let minor = scaled.round();
    if minor < 1.0 {
        return Err(invalid());
    }
    // Tolerance only absorbs binary float noise, e.g. 0.1 + 0.2
    if (scaled - minor).abs() > 1e-4 {
        return Err(AppError::Validation(
            "Donation amount can have at most two decimal places".to_string(),
        ));
    }
    if minor > max_minor as f64 {
        return Err(AppError::Validation(format!(
            "Donation amount cannot exceed {}",
            format_minor_units(max_minor)
        )));
    }

    Ok(minor as i64)
}

/// Renders minor units as a fixed two-decimal string, e.g. `50050` -> `500.50`.
pub fn format_minor_units(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DonationStats {
    pub total_amount_minor: i64,
    pub successful_donations: u64,
    pub pending_donations: u64,
    pub failed_donations: u64,
}

impl DonationStats {
    pub fn from_donations<'a, I>(donations: I) -> Self
    where
        I: IntoIterator<Item = &'a Donation>,
    {
        donations.into_iter().fold(Self::default(), |mut stats, donation| {
            match donation.status {
                DonationStatus::Success => {
                    stats.successful_donations += 1;
                    stats.total_amount_minor += donation.amount_minor;
                }
                DonationStatus::Pending => stats.pending_donations += 1,
                DonationStatus::Failed => stats.failed_donations += 1,
            }
            stats
        })
    }
}

/// Admin-side filter over joined donation records.
#[derive(Debug, Clone, Default)]
pub struct DonationFilter {
    pub search: Option<String>,
    pub status: Option<DonationStatus>,
}

impl DonationFilter {
    /// Builds a filter from raw query parameters. `status` accepts `all`
    /// (or nothing) plus the three lifecycle values.
    pub fn from_query(search: Option<&str>, status: Option<&str>) -> Result<Self> {
        let search = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let status = match status.map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(value) => Some(DonationStatus::parse(value).ok_or_else(|| {
                AppError::BadRequest(format!("Invalid status filter: {}", value))
            })?),
        };

        Ok(Self { search, status })
    }

    pub fn matches(&self, record: &DonationWithDonor) -> bool {
        if let Some(status) = self.status {
            if record.donation.status != status {
                return false;
            }
        }

        let Some(needle) = &self.search else {
            return true;
        };

        [
            record.donor.email.as_deref(),
            record.donor.full_name.as_deref(),
            record.donation.payment_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(needle.as_str()))
    }

    pub fn apply(&self, records: Vec<DonationWithDonor>) -> Vec<DonationWithDonor> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation(status: DonationStatus, amount_minor: i64) -> Donation {
        Donation {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount_minor,
            status,
            payment_id: None,
            payment_method: None,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn with_donor(donation: Donation, email: &str, name: Option<&str>) -> DonationWithDonor {
        DonationWithDonor {
            donation,
            donor: DonorInfo {
                email: Some(email.to_string()),
                full_name: name.map(str::to_string),
                phone: None,
            },
        }
    }

    #[test]
    fn test_status_transitions() {
        use DonationStatus::*;
        assert!(Pending.can_transition_to(Success));
        assert!(Pending.can_transition_to(Failed));
        assert!(!Pending.can_transition_to(Pending));
        assert!(!Success.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Success));
        assert!(!Success.can_transition_to(Pending));
    }

    #[test]
    fn test_status_enum_is_closed() {
        for value in ["pending", "success", "failed"] {
            assert_eq!(DonationStatus::parse(value).map(|s| s.as_str()), Some(value));
        }
        assert_eq!(DonationStatus::parse("refunded"), None);
        assert_eq!(DonationStatus::parse("Success"), None);
        assert!(serde_json::from_str::<DonationStatus>("\"cancelled\"").is_err());
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert_eq!(amount_to_minor_units(500.0, 1_000_000).unwrap(), 50_000);
        assert_eq!(amount_to_minor_units(0.1 + 0.2, 1_000_000).unwrap(), 30);
        assert!(amount_to_minor_units(0.0, 1_000_000).is_err());
        assert!(amount_to_minor_units(-10.0, 1_000_000).is_err());
        assert!(amount_to_minor_units(0.001, 1_000_000).is_err());
        assert!(amount_to_minor_units(f64::NAN, 1_000_000).is_err());
        assert!(amount_to_minor_units(f64::INFINITY, 1_000_000).is_err());
        assert!(amount_to_minor_units(10_001.0, 1_000_000).is_err());
        assert!(amount_to_minor_units(0.005, 1_000_000).is_err());
        assert!(amount_to_minor_units(100.999, 1_000_000).is_err());
        assert_eq!(amount_to_minor_units(100.99, 1_000_000).unwrap(), 10_099);
        assert_eq!(amount_to_minor_units(9_999_999.99, 1_000_000_000).unwrap(), 999_999_999);
    }

    #[test]
    fn test_format_minor_units() {
        assert_eq!(format_minor_units(50_050), "500.50");
        assert_eq!(format_minor_units(5), "0.05");
        assert_eq!(format_minor_units(0), "0.00");
    }

    #[test]
    fn test_stats_sum_only_successful() {
        let donations = vec![
            donation(DonationStatus::Success, 10_000),
            donation(DonationStatus::Success, 50_050),
            donation(DonationStatus::Pending, 99_900),
            donation(DonationStatus::Failed, 1_000),
            donation(DonationStatus::Failed, 2_000),
        ];

        let stats = DonationStats::from_donations(&donations);
        assert_eq!(stats.total_amount_minor, 60_050);
        assert_eq!(stats.successful_donations, 2);
        assert_eq!(stats.pending_donations, 1);
        assert_eq!(stats.failed_donations, 2);

        assert_eq!(DonationStats::from_donations(&Vec::<Donation>::new()), DonationStats::default());
    }

    #[test]
    fn test_filter_by_status_and_search() {
        let mut paid = donation(DonationStatus::Success, 100);
        paid.payment_id = Some("PAY_1700000000000_abc123xyz".to_string());
        let records = vec![
            with_donor(paid, "asha@example.com", Some("Asha Rao")),
            with_donor(donation(DonationStatus::Pending, 100), "ben@example.com", None),
            with_donor(donation(DonationStatus::Failed, 100), "cara@example.com", Some("Cara Ng")),
        ];

        let all = DonationFilter::from_query(None, Some("all")).unwrap();
        assert_eq!(all.apply(records.clone()).len(), 3);

        let pending = DonationFilter::from_query(Some("  "), Some("pending")).unwrap();
        assert_eq!(pending.apply(records.clone()).len(), 1);

        let by_name = DonationFilter::from_query(Some("ASHA"), None).unwrap();
        assert_eq!(by_name.apply(records.clone()).len(), 1);

        let by_payment = DonationFilter::from_query(Some("abc123"), None).unwrap();
        assert_eq!(by_payment.apply(records.clone()).len(), 1);

        let mismatch = DonationFilter::from_query(Some("asha"), Some("failed")).unwrap();
        assert!(mismatch.apply(records).is_empty());

        assert!(DonationFilter::from_query(None, Some("refunded")).is_err());
    }
}
