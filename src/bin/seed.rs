use std::sync::Arc;

use clap::Parser;
use donatrack::{
    config::Settings,
    domain::{CreateDonationRequest, Role, UpdateProfileRequest},
    error::AppError,
    payments::SandboxGateway,
    service::ServiceContext,
};
use fake::{
    faker::{
        address::en::CityName,
        internet::en::SafeEmail,
        lorem::en::Sentence,
        name::en::Name,
        phone_number::en::PhoneNumber,
    },
    Fake,
};
use rand::Rng;
use sqlx::sqlite::SqlitePoolOptions;
use uuid::Uuid;

/// Populate a database with an admin account and sample donors.
#[derive(Parser, Debug)]
#[command(name = "seed", version)]
struct Args {
    /// SQLite connection string
    #[arg(long, default_value = "sqlite://donatrack.db?mode=rwc")]
    database_url: String,

    #[arg(long, default_value = "admin@donatrack.local")]
    admin_email: String,

    #[arg(long, default_value = "admin123")]
    admin_password: String,

    /// Number of sample donors to create
    #[arg(long, default_value_t = 10)]
    donors: usize,

    /// Upper bound of donations per donor
    #[arg(long, default_value_t = 3)]
    max_donations: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = Settings::new().unwrap_or_default();

    println!("🌱 Starting database seeding...");

    let db_pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&args.database_url)
        .await?;

    println!("📋 Running migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await?;

    let ctx = ServiceContext::from_pool(db_pool, Arc::new(SandboxGateway::new()), &settings);

    // Admin account
    let admin_id = ensure_user(&ctx, &args.admin_email, &args.admin_password, "Administrator").await?;
    ctx.profile_repo.set_role(admin_id, Role::Admin).await?;
    println!("  ✅ Admin ready ({} / {})", args.admin_email, args.admin_password);

    // Donors with a spread of donation outcomes
    println!("👥 Creating {} donors...", args.donors);
    let mut rng = rand::thread_rng();
    let mut donation_count = 0;

    for _ in 0..args.donors {
        let full_name: String = Name().fake();
        let email: String = SafeEmail().fake();

        let user_id = match ctx.auth_service.sign_up(&email, "password123", Some(&full_name)).await {
            Ok(id) => id,
            Err(AppError::Conflict(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        ctx.profile_repo.update(user_id, UpdateProfileRequest {
            phone: Some(PhoneNumber().fake()),
            address: Some(CityName().fake()),
            ..Default::default()
        }).await?;

        for _ in 0..rng.gen_range(0..=args.max_donations) {
            let request = CreateDonationRequest {
                amount: (rng.gen_range(1..=50) * 100) as f64,
                notes: rng.gen_bool(0.4).then(|| Sentence(3..8).fake()),
            };
            let donation = ctx.donation_service.initiate(user_id, request).await?;

            // Leave roughly one in five pending
            if rng.gen_bool(0.8) {
                let success = rng.gen_bool(0.75);
                ctx.donation_service.settle(user_id, donation.id, success).await?;
            }
            donation_count += 1;
        }
    }

    println!("  ✅ Created {} donations", donation_count);
    println!("🎉 Seeding complete");

    Ok(())
}

async fn ensure_user(
    ctx: &ServiceContext,
    email: &str,
    password: &str,
    full_name: &str,
) -> anyhow::Result<Uuid> {
    match ctx.auth_service.sign_up(email, password, Some(full_name)).await {
        Ok(id) => Ok(id),
        Err(AppError::Conflict(_)) => {
            let (session, token) = ctx.auth_service.sign_in(email, password).await?;
            ctx.auth_service.sign_out(&token).await?;
            Ok(session.user_id)
        }
        Err(e) => Err(e.into()),
    }
}
