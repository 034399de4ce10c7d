use donatrack::{
    auth::AuthService,
    config::AuthConfig,
    domain::{DonationSettlement, DonationStatus, NewDonation, Role, UpdateProfileRequest},
    error::AppError,
    repository::{
        DonationRepository, ProfileRepository, SqliteDonationRepository, SqliteProfileRepository,
    },
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::time::Duration;

async fn test_pool() -> anyhow::Result<SqlitePool> {
    // A single connection keeps every query on the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}

fn auth_service(pool: &SqlitePool) -> AuthService {
    AuthService::new(pool.clone(), &AuthConfig {
        session_duration_hours: 24,
        secure_cookies: false,
    })
}

#[tokio::test]
async fn test_sign_up_creates_profile() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let auth = auth_service(&pool);
    let profiles = SqliteProfileRepository::new(pool.clone());

    let user_id = auth.sign_up(" Asha@Example.com ", "secret1", Some("Asha Rao")).await?;

    let profile = profiles.find_by_user_id(user_id).await?.expect("profile exists");
    assert_eq!(profile.email, "asha@example.com");
    assert_eq!(profile.full_name.as_deref(), Some("Asha Rao"));
    assert_eq!(profile.role, Role::User);
    assert_eq!(profiles.count().await?, 1);

    // Same email, different casing
    let duplicate = auth.sign_up("ASHA@example.com", "secret2", None).await;
    assert!(matches!(duplicate, Err(AppError::Conflict(_))));
    assert_eq!(profiles.count().await?, 1);

    Ok(())
}

#[tokio::test]
async fn test_sign_in_and_sessions() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let auth = auth_service(&pool);

    let user_id = auth.sign_up("ben@example.com", "secret1", None).await?;

    assert!(matches!(
        auth.sign_in("ben@example.com", "wrong").await,
        Err(AppError::InvalidCredentials)
    ));
    assert!(matches!(
        auth.sign_in("nobody@example.com", "secret1").await,
        Err(AppError::InvalidCredentials)
    ));

    let (session, token) = auth.sign_in("BEN@example.com", "secret1").await?;
    assert_eq!(session.user_id, user_id);

    let resolved = auth.validate_session(&token).await?.expect("live session");
    assert_eq!(resolved.user_id, user_id);

    auth.sign_out(&token).await?;
    assert!(auth.validate_session(&token).await?.is_none());

    Ok(())
}

#[tokio::test]
async fn test_profile_update_and_role() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let auth = auth_service(&pool);
    let profiles = SqliteProfileRepository::new(pool.clone());

    let user_id = auth.sign_up("cara@example.com", "secret1", Some("Cara")).await?;

    let updated = profiles.update(user_id, UpdateProfileRequest {
        phone: Some("+91 98450 12345".to_string()),
        address: Some("12 MG Road, Pune".to_string()),
        ..Default::default()
    }).await?;
    assert_eq!(updated.full_name.as_deref(), Some("Cara"));
    assert_eq!(updated.phone.as_deref(), Some("+91 98450 12345"));

    let cleared = profiles.update(user_id, UpdateProfileRequest {
        phone: Some(String::new()),
        ..Default::default()
    }).await?;
    assert!(cleared.phone.is_none());
    assert_eq!(cleared.address.as_deref(), Some("12 MG Road, Pune"));

    let admin = profiles.set_role(user_id, Role::Admin).await?;
    assert!(admin.is_admin());

    let missing = profiles.update(uuid::Uuid::new_v4(), UpdateProfileRequest::default()).await;
    assert!(matches!(missing, Err(AppError::NotFound(_))));

    Ok(())
}

#[tokio::test]
async fn test_donation_lifecycle() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let auth = auth_service(&pool);
    let repo = SqliteDonationRepository::new(pool.clone());

    let user_id = auth.sign_up("dev@example.com", "secret1", Some("Dev")).await?;

    let first = repo.create(NewDonation {
        user_id,
        amount_minor: 50_000,
        notes: Some("For the library".to_string()),
    }).await?;
    assert_eq!(first.status, DonationStatus::Pending);
    assert!(first.payment_id.is_none());

    tokio::time::sleep(Duration::from_millis(5)).await;

    // A duplicate submission is an independent record
    let second = repo.create(NewDonation {
        user_id,
        amount_minor: 50_000,
        notes: None,
    }).await?;
    assert_ne!(first.id, second.id);

    let history = repo.find_by_user(user_id).await?;
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].id, second.id, "newest first");

    let settled = repo.settle(first.id, DonationSettlement {
        status: DonationStatus::Success,
        payment_id: Some("PAY_1_abcdefghi".to_string()),
        payment_method: Some("sandbox".to_string()),
    }).await?;
    assert_eq!(settled.status, DonationStatus::Success);
    assert_eq!(settled.payment_id.as_deref(), Some("PAY_1_abcdefghi"));

    // Terminal states never move again
    let again = repo.settle(first.id, DonationSettlement {
        status: DonationStatus::Failed,
        payment_id: None,
        payment_method: None,
    }).await;
    assert!(matches!(again, Err(AppError::Conflict(_))));
    let reloaded = repo.find_by_id(first.id).await?.expect("donation exists");
    assert_eq!(reloaded.status, DonationStatus::Success);

    let back_to_pending = repo.settle(second.id, DonationSettlement {
        status: DonationStatus::Pending,
        payment_id: None,
        payment_method: None,
    }).await;
    assert!(matches!(back_to_pending, Err(AppError::BadRequest(_))));

    let unknown = repo.settle(uuid::Uuid::new_v4(), DonationSettlement {
        status: DonationStatus::Failed,
        payment_id: None,
        payment_method: None,
    }).await;
    assert!(matches!(unknown, Err(AppError::NotFound(_))));

    let joined = repo.list_with_donors().await?;
    assert_eq!(joined.len(), 2);
    assert!(joined.iter().all(|r| r.donor.email.as_deref() == Some("dev@example.com")));

    Ok(())
}

#[tokio::test]
async fn test_schema_rejects_invalid_rows() -> anyhow::Result<()> {
    let pool = test_pool().await?;
    let auth = auth_service(&pool);
    let repo = SqliteDonationRepository::new(pool.clone());

    let user_id = auth.sign_up("eve@example.com", "secret1", None).await?;

    let zero = repo.create(NewDonation { user_id, amount_minor: 0, notes: None }).await;
    assert!(zero.is_err());

    let bad_status = sqlx::query(
        "INSERT INTO donations (id, user_id, amount_minor, status, created_at, updated_at)
         VALUES ('x', ?, 100, 'refunded', CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)"
    )
    .bind(user_id.to_string())
    .execute(&pool)
    .await;
    assert!(bad_status.is_err());

    Ok(())
}
