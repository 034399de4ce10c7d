use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    domain::{format_minor_units, CreateDonationRequest, Donation, DonationStatus},
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct DonationDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: DonationStatus,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl DonationDto {
    pub fn new(donation: Donation, currency: &str) -> Self {
        Self {
            id: donation.id,
            user_id: donation.user_id,
            amount: format_minor_units(donation.amount_minor),
            amount_minor: donation.amount_minor,
            currency: currency.to_string(),
            status: donation.status,
            payment_id: donation.payment_id,
            payment_method: donation.payment_method,
            notes: donation.notes,
            created_at: donation.created_at.to_rfc3339(),
            updated_at: donation.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DonationListResponse {
    pub donations: Vec<DonationDto>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct PresetsResponse {
    pub currency: String,
    pub amounts: Vec<u32>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentOutcomeRequest {
    pub success: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> Result<Json<DonationListResponse>> {
    let service = &state.service_context.donation_service;

    let donations: Vec<DonationDto> = service
        .history(current_user.user_id())
        .await?
        .into_iter()
        .map(|d| DonationDto::new(d, service.currency()))
        .collect();

    let total = donations.len();
    Ok(Json(DonationListResponse { donations, total }))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<CreateDonationRequest>,
) -> Result<(StatusCode, Json<DonationDto>)> {
    let service = &state.service_context.donation_service;

    let donation = service
        .initiate(current_user.user_id(), request)
        .await?;

    Ok((StatusCode::CREATED, Json(DonationDto::new(donation, service.currency()))))
}

pub async fn get(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<DonationDto>> {
    let service = &state.service_context.donation_service;

    let donation = service
        .get_for_user(current_user.user_id(), id)
        .await?;

    Ok(Json(DonationDto::new(donation, service.currency())))
}

/// Sandbox checkout: the donor reports whether the payment went through.
pub async fn submit_payment(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(outcome): Json<PaymentOutcomeRequest>,
) -> Result<Json<DonationDto>> {
    let service = &state.service_context.donation_service;

    let donation = service
        .settle(current_user.user_id(), id, outcome.success)
        .await?;

    Ok(Json(DonationDto::new(donation, service.currency())))
}

pub async fn presets(
    State(state): State<AppState>,
) -> Json<PresetsResponse> {
    let service = &state.service_context.donation_service;

    Json(PresetsResponse {
        currency: service.currency().to_string(),
        amounts: service.preset_amounts().to_vec(),
    })
}
