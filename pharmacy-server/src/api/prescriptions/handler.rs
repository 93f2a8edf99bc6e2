//! Prescription API Handlers
//!
//! 开方仅限医生；状态流转仅限开方医生本人；患者只能查询自己的处方。

use axum::{
    Json,
    extract::{Path, State},
};

use shared::Role;
use shared::request::{PrescriptionCreateInput, PrescriptionStatusUpdate};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Prescription, PrescriptionCreate, PrescriptionLine};
use crate::db::repository::{PrescriptionRepository, UserRepository, parse_id};
use crate::prescriptions::PrescriptionLifecycle;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// POST /api/prescriptions - 开方 (doctor)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<PrescriptionCreateInput>,
) -> AppResult<Json<Prescription>> {
    user.require_role(Role::Doctor)?;

    if payload.medicines.is_empty() {
        return Err(AppError::validation(
            "Prescription must contain at least one medicine",
        ));
    }
    if payload.notes.len() > MAX_NOTE_LEN {
        return Err(AppError::validation("Notes are too long"));
    }

    // 患者必须存在且为 customer 角色
    let patient_id = parse_id("user", &payload.patient)
        .map_err(|_| AppError::validation(format!("Invalid patient id: {}", payload.patient)))?;
    let users = UserRepository::new(state.db.clone());
    let patient = users
        .find_by_id(&payload.patient)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Patient {}", payload.patient)))?;
    if patient.role != Role::Customer {
        return Err(AppError::validation(
            "Prescription patient must be a customer",
        ));
    }

    let mut lines = Vec::with_capacity(payload.medicines.len());
    for line in &payload.medicines {
        validate_required_text(&line.dosage, "dosage", MAX_SHORT_TEXT_LEN)?;
        validate_required_text(&line.duration, "duration", MAX_SHORT_TEXT_LEN)?;
        let medicine = parse_id("medicine", &line.medicine)
            .map_err(|_| AppError::validation(format!("Invalid medicine id: {}", line.medicine)))?;
        lines.push(PrescriptionLine {
            medicine,
            dosage: line.dosage.clone(),
            duration: line.duration.clone(),
        });
    }

    let doctor = parse_id("user", &user.id)?;
    let repo = PrescriptionRepository::new(state.db.clone());
    let prescription = repo
        .create(PrescriptionCreate {
            patient: patient_id,
            doctor,
            medicines: lines,
            notes: payload.notes,
            valid_until: payload.valid_until,
        })
        .await?;

    tracing::info!(
        prescription_id = %prescription.id.as_ref().map(|i| i.to_string()).unwrap_or_default(),
        doctor = %user.id,
        patient = %prescription.patient,
        "Prescription created"
    );

    Ok(Json(prescription))
}

/// GET /api/prescriptions/mine - 医生开出的处方，新→旧
pub async fn list_for_doctor(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Prescription>>> {
    user.require_role(Role::Doctor)?;

    let doctor = parse_id("user", &user.id)?;
    let repo = PrescriptionRepository::new(state.db.clone());
    let prescriptions = repo.find_by_doctor(&doctor).await?;
    Ok(Json(prescriptions))
}

/// GET /api/prescriptions - 患者自己的处方，新→旧
pub async fn list_for_patient(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Prescription>>> {
    user.require_role(Role::Customer)?;

    let patient = parse_id("user", &user.id)?;
    let repo = PrescriptionRepository::new(state.db.clone());
    let prescriptions = repo.find_by_patient(&patient).await?;
    Ok(Json(prescriptions))
}

/// PATCH /api/prescriptions/:id - 状态流转 (doctor, 仅限开方医生)
pub async fn update_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<PrescriptionStatusUpdate>,
) -> AppResult<Json<Prescription>> {
    user.require_role(Role::Doctor)?;

    let lifecycle = PrescriptionLifecycle::new(state.db.clone());
    let prescription = lifecycle.transition(&id, &user.id, payload.status).await?;

    tracing::info!(
        prescription_id = %id,
        doctor = %user.id,
        status = ?payload.status,
        "Prescription status updated"
    );

    Ok(Json(prescription))
}
