use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{
    api::{handlers::donations::DonationDto, state::AppState},
    domain::{format_minor_units, DonationFilter, DonationWithDonor, DonorInfo, Profile, ProfileFilter},
    error::Result,
    service::export_service,
};

#[derive(Debug, Deserialize, Default)]
pub struct DonationQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ProfileQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_registrations: i64,
    pub currency: String,
    pub total_amount: String,
    pub total_amount_minor: i64,
    pub successful_donations: u64,
    pub pending_donations: u64,
    pub failed_donations: u64,
}

#[derive(Debug, Serialize)]
pub struct AdminDonationDto {
    #[serde(flatten)]
    pub donation: DonationDto,
    pub donor: DonorInfo,
}

#[derive(Debug, Serialize)]
pub struct AdminDonationListResponse {
    pub donations: Vec<AdminDonationDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ProfileListResponse {
    pub profiles: Vec<Profile>,
    pub total: usize,
}

pub async fn stats(State(state): State<AppState>) -> Result<Json<StatsResponse>> {
    let service = &state.service_context.donation_service;

    let stats = service.stats().await?;
    let total_registrations = state.service_context.profile_repo.count().await?;

    Ok(Json(StatsResponse {
        total_registrations,
        currency: service.currency().to_string(),
        total_amount: format_minor_units(stats.total_amount_minor),
        total_amount_minor: stats.total_amount_minor,
        successful_donations: stats.successful_donations,
        pending_donations: stats.pending_donations,
        failed_donations: stats.failed_donations,
    }))
}

async fn filtered_donations(state: &AppState, query: &DonationQuery) -> Result<Vec<DonationWithDonor>> {
    let filter = DonationFilter::from_query(query.q.as_deref(), query.status.as_deref())?;

    state.service_context.donation_service
        .list_with_donors(&filter)
        .await
}

async fn filtered_profiles(state: &AppState, query: &ProfileQuery) -> Result<Vec<Profile>> {
    let filter = ProfileFilter::from_query(query.q.as_deref());
    let profiles = state.service_context.profile_repo.list().await?;

    Ok(filter.apply(profiles))
}

pub async fn list_donations(
    State(state): State<AppState>,
    Query(query): Query<DonationQuery>,
) -> Result<Json<AdminDonationListResponse>> {
    let currency = state.service_context.donation_service.currency();

    let donations: Vec<AdminDonationDto> = filtered_donations(&state, &query)
        .await?
        .into_iter()
        .map(|record| AdminDonationDto {
            donation: DonationDto::new(record.donation, currency),
            donor: record.donor,
        })
        .collect();

    let total = donations.len();
    Ok(Json(AdminDonationListResponse { donations, total }))
}

pub async fn export_donations(
    State(state): State<AppState>,
    Query(query): Query<DonationQuery>,
) -> Result<Response> {
    let records = filtered_donations(&state, &query).await?;
    let csv = export_service::donations_csv(
        &records,
        state.service_context.donation_service.currency(),
    );

    tracing::info!("Exported {} donation records", records.len());
    Ok(csv_response("donations", csv))
}

pub async fn list_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Json<ProfileListResponse>> {
    let profiles = filtered_profiles(&state, &query).await?;
    let total = profiles.len();

    Ok(Json(ProfileListResponse { profiles, total }))
}

pub async fn export_profiles(
    State(state): State<AppState>,
    Query(query): Query<ProfileQuery>,
) -> Result<Response> {
    let profiles = filtered_profiles(&state, &query).await?;
    let csv = export_service::profiles_csv(&profiles);

    tracing::info!("Exported {} registration records", profiles.len());
    Ok(csv_response("registrations", csv))
}

fn csv_response(kind: &str, csv: String) -> Response {
    let filename = export_service::export_filename(kind, Utc::now().date_naive());

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
        ],
        csv,
    ).into_response()
}
