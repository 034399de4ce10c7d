use chrono::NaiveDate;

use crate::domain::{format_minor_units, DonationWithDonor, Profile};

const DONATION_HEADERS: &[&str] = &[
    "id",
    "created_at",
    "donor_name",
    "donor_email",
    "donor_phone",
    "amount",
    "currency",
    "status",
    "payment_id",
    "payment_method",
    "notes",
];

const PROFILE_HEADERS: &[&str] = &[
    "id",
    "user_id",
    "created_at",
    "full_name",
    "email",
    "phone",
    "address",
    "role",
];

/// One header row plus one row per record.
pub fn donations_csv(records: &[DonationWithDonor], currency: &str) -> String {
    let mut csv = String::new();
    push_row(&mut csv, DONATION_HEADERS.iter().copied());

    for record in records {
        let donation = &record.donation;
        let id = donation.id.to_string();
        let created_at = donation.created_at.to_rfc3339();
        let amount = format_minor_units(donation.amount_minor);

        push_row(&mut csv, [
            id.as_str(),
            created_at.as_str(),
            record.donor.full_name.as_deref().unwrap_or(""),
            record.donor.email.as_deref().unwrap_or(""),
            record.donor.phone.as_deref().unwrap_or(""),
            amount.as_str(),
            currency,
            donation.status.as_str(),
            donation.payment_id.as_deref().unwrap_or(""),
            donation.payment_method.as_deref().unwrap_or(""),
            donation.notes.as_deref().unwrap_or(""),
        ]);
    }

    csv
}

pub fn profiles_csv(profiles: &[Profile]) -> String {
    let mut csv = String::new();
    push_row(&mut csv, PROFILE_HEADERS.iter().copied());

    for profile in profiles {
        let id = profile.id.to_string();
        let user_id = profile.user_id.to_string();
        let created_at = profile.created_at.to_rfc3339();

        push_row(&mut csv, [
            id.as_str(),
            user_id.as_str(),
            created_at.as_str(),
            profile.full_name.as_deref().unwrap_or(""),
            profile.email.as_str(),
            profile.phone.as_deref().unwrap_or(""),
            profile.address.as_deref().unwrap_or(""),
            profile.role.as_str(),
        ]);
    }

    csv
}

/// e.g. `donations_2026-10-19.csv`
pub fn export_filename(kind: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", kind, date.format("%Y-%m-%d"))
}

fn push_row<'a, I>(csv: &mut String, fields: I)
where
    I: IntoIterator<Item = &'a str>,
{
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            csv.push(',');
        }
        csv.push_str(&escape_field(field));
    }
    csv.push('\n');
}

/// Quotes a field when needed. A leading formula trigger gets a `'` prefix so
/// spreadsheets show donor-entered text instead of evaluating it.
fn escape_field(field: &str) -> String {
    let field = if field.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Donation, DonationStatus, DonorInfo, Role};
    use chrono::Utc;
    use uuid::Uuid;

    fn record(notes: Option<&str>) -> DonationWithDonor {
        DonationWithDonor {
            donation: Donation {
                id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
                amount_minor: 100_050,
                status: DonationStatus::Success,
                payment_id: Some("PAY_1_abcdefghi".to_string()),
                payment_method: Some("sandbox".to_string()),
                notes: notes.map(str::to_string),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            donor: DonorInfo {
                email: Some("asha@example.com".to_string()),
                full_name: Some("Rao, Asha".to_string()),
                phone: None,
            },
        }
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape_field("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_formula_triggers_are_neutralised() {
        assert_eq!(escape_field("=HYPERLINK(\"x\")"), "\"'=HYPERLINK(\"\"x\"\")\"");
        assert_eq!(escape_field("+91 98450 12345"), "'+91 98450 12345");
        assert_eq!(escape_field("-2+3"), "'-2+3");
        assert_eq!(escape_field("@SUM(A1)"), "'@SUM(A1)");
        assert_eq!(escape_field("a=b"), "a=b");

        let mut hostile = record(Some("=cmd|' /C calc'!A0"));
        hostile.donor.full_name = Some("@evil".to_string());
        let csv = donations_csv(&[hostile], "INR");
        let row = csv.lines().nth(1).unwrap_or_default();
        assert!(row.contains(",'@evil,"));
        assert!(row.ends_with(",'=cmd|' /C calc'!A0"));
    }

    #[test]
    fn test_donations_csv_has_one_row_per_record() {
        let records: Vec<_> = (0..3).map(|_| record(Some("for the school"))).collect();
        let csv = donations_csv(&records, "INR");

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], DONATION_HEADERS.join(","));
        assert!(lines[1].contains("\"Rao, Asha\""));
        assert!(lines[1].contains(",1000.50,INR,success,"));
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(donations_csv(&[], "INR").lines().count(), 1);
        assert_eq!(profiles_csv(&[]).lines().count(), 1);
    }

    #[test]
    fn test_profiles_csv() {
        let profile = Profile {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            email: "ben@example.com".to_string(),
            full_name: None,
            phone: Some("12345".to_string()),
            address: Some("1 Main St, Pune".to_string()),
            role: Role::Admin,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let csv = profiles_csv(&[profile]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(",ben@example.com,12345,\"1 Main St, Pune\",admin"));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(export_filename("donations", date), "donations_2026-10-19.csv");
    }
}
