use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use planner_db::{MissionFilter, MissionStore};
use planner_types::api::{
    Claims, CreateMissionRequest, MissionListResponse, MissionQuery, MissionResponse,
    SuccessResponse, UpdateMissionRequest,
};
use planner_types::{Mission, Platoon};

use crate::AppState;
use crate::error::{ServiceError, ServiceResult, blocking};
use crate::extract::{ApiJson, ApiPath, ApiQuery};

/// Mission type whose stored label comes from `customType`.
pub const CUSTOM_MISSION_TYPE: &str = "Custom";

/// Platoon-scoped mission CRUD. Reads are open to any authenticated caller;
/// writes require a lieutenant of the platoon involved, judged from the
/// verified claims only.
pub struct MissionService {
    missions: Arc<dyn MissionStore>,
    /// Held across read-modify-write so concurrent edits are not lost.
    write_lock: Mutex<()>,
}

impl MissionService {
    pub fn new(missions: Arc<dyn MissionStore>) -> Self {
        Self {
            missions,
            write_lock: Mutex::new(()),
        }
    }

    /// Oldest first; empty when the platoon has no missions.
    pub fn list_missions(&self, platoon: Platoon) -> ServiceResult<Vec<Mission>> {
        Ok(self.missions.scan_missions(&MissionFilter::platoon(platoon))?)
    }

    pub fn create_mission(
        &self,
        actor: &Claims,
        req: CreateMissionRequest,
    ) -> ServiceResult<Mission> {
        let platoon = match req.platoon.as_deref().filter(|p| !p.is_empty()) {
            Some(raw) => parse_platoon(raw)?,
            None => actor.platoon,
        };
        let mission_type = resolve_mission_type(&req.mission_type, req.custom_type.as_deref())?;
        let description = require_description(req.description)?;
        let created_at = Utc::now();
        let date = parse_date(req.date.as_deref())?.unwrap_or_else(|| created_at.date_naive());

        authorize(actor, platoon)?;

        let mission = Mission {
            id: Uuid::new_v4(),
            platoon,
            mission_type,
            description,
            date,
            created_at,
        };
        self.missions.put_mission(&mission)?;

        info!(
            "Mission {} ({}) created for {} platoon by '{}'",
            mission.id, mission.mission_type, mission.platoon, actor.username
        );
        Ok(mission)
    }

    /// Merge-update: present fields overwrite, absent ones are kept.
    /// An empty `date` counts as absent.
    pub fn update_mission(
        &self,
        actor: &Claims,
        id: Uuid,
        fields: UpdateMissionRequest,
    ) -> ServiceResult<Mission> {
        let _guard = self.lock()?;

        let mut mission = self
            .missions
            .get_mission(id)?
            .ok_or_else(ServiceError::mission_not_found)?;
        authorize(actor, mission.platoon)?;

        if let Some(raw) = fields.platoon.as_deref().filter(|p| !p.is_empty()) {
            let target = parse_platoon(raw)?;
            authorize(actor, target)?;
            mission.platoon = target;
        }
        match (fields.mission_type.as_deref(), fields.custom_type.as_deref()) {
            (Some(mission_type), custom_type) => {
                mission.mission_type = resolve_mission_type(mission_type, custom_type)?;
            }
            (None, Some(custom_type)) if !custom_type.trim().is_empty() => {
                return Err(ServiceError::Validation(
                    "customType requires missionType".into(),
                ));
            }
            _ => {}
        }
        if let Some(description) = fields.description {
            mission.description = require_description(description)?;
        }
        if let Some(date) = parse_date(fields.date.as_deref())? {
            mission.date = date;
        }

        self.missions.put_mission(&mission)?;
        info!("Mission {} updated by '{}'", mission.id, actor.username);
        Ok(mission)
    }

    /// Deleting an id that is already gone is `NotFound`, not a silent no-op.
    pub fn delete_mission(&self, actor: &Claims, id: Uuid) -> ServiceResult<()> {
        let _guard = self.lock()?;

        let mission = self
            .missions
            .get_mission(id)?
            .ok_or_else(ServiceError::mission_not_found)?;
        authorize(actor, mission.platoon)?;

        if !self.missions.delete_mission(id)? {
            return Err(ServiceError::mission_not_found());
        }

        info!("Mission {} deleted by '{}'", id, actor.username);
        Ok(())
    }

    fn lock(&self) -> ServiceResult<std::sync::MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("mission lock poisoned: {}", e)))
    }
}

fn authorize(actor: &Claims, platoon: Platoon) -> ServiceResult<()> {
    if actor.is_lieutenant_of(platoon) {
        return Ok(());
    }
    warn!(
        "'{}' ({} platoon, lieutenant={}) denied write to {} platoon missions",
        actor.username, actor.platoon, actor.is_lieutenant, platoon
    );
    Err(ServiceError::Forbidden(format!(
        "Only the {} platoon lieutenant can manage its missions",
        platoon
    )))
}

/// Accepts the legacy qualified form and reduces it to the base platoon.
fn parse_platoon(raw: &str) -> ServiceResult<Platoon> {
    Platoon::parse_qualified(raw)
        .map(|(platoon, _)| platoon)
        .ok_or_else(|| ServiceError::Validation("Invalid platoon".into()))
}

fn resolve_mission_type(mission_type: &str, custom_type: Option<&str>) -> ServiceResult<String> {
    if mission_type.trim().is_empty() {
        return Err(ServiceError::Validation("Mission type required".into()));
    }
    if mission_type != CUSTOM_MISSION_TYPE {
        return Ok(mission_type.to_string());
    }
    match custom_type {
        Some(custom) if !custom.trim().is_empty() => Ok(custom.to_string()),
        _ => Err(ServiceError::Validation(
            "Custom mission type requires a custom type".into(),
        )),
    }
}

fn require_description(description: String) -> ServiceResult<String> {
    if description.trim().is_empty() {
        return Err(ServiceError::Validation("Mission description required".into()));
    }
    Ok(description)
}

/// `YYYY-MM-DD`, or a full RFC 3339 timestamp reduced to its UTC date.
fn parse_date(raw: Option<&str>) -> ServiceResult<Option<NaiveDate>> {
    let Some(raw) = raw.map(str::trim).filter(|d| !d.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|ts| ts.with_timezone(&Utc).date_naive()))
        .map(Some)
        .map_err(|_| ServiceError::Validation(format!("Invalid mission date '{}'", raw)))
}

fn parse_mission_id(raw: &str) -> ServiceResult<Uuid> {
    // Ids are always UUIDs, so anything else cannot name a stored mission.
    Uuid::parse_str(raw).map_err(|_| ServiceError::mission_not_found())
}

// -- Handlers --

/// GET /api/missions?platoon=Red. Defaults to the caller's own platoon.
pub async fn list_missions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiQuery(query): ApiQuery<MissionQuery>,
) -> ServiceResult<Json<MissionListResponse>> {
    let platoon = match query.platoon.as_deref().filter(|p| !p.is_empty()) {
        Some(raw) => parse_platoon(raw)?,
        None => claims.platoon,
    };

    let missions = blocking(move || state.missions.list_missions(platoon)).await?;
    Ok(Json(MissionListResponse { missions }))
}

pub async fn create_mission(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateMissionRequest>,
) -> ServiceResult<impl IntoResponse> {
    let mission = blocking(move || state.missions.create_mission(&claims, req)).await?;

    Ok((
        StatusCode::CREATED,
        Json(MissionResponse {
            success: true,
            mission,
        }),
    ))
}

pub async fn update_mission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    Extension(claims): Extension<Claims>,
    ApiJson(fields): ApiJson<UpdateMissionRequest>,
) -> ServiceResult<Json<MissionResponse>> {
    let id = parse_mission_id(&id)?;
    let mission = blocking(move || state.missions.update_mission(&claims, id, fields)).await?;

    Ok(Json(MissionResponse {
        success: true,
        mission,
    }))
}

pub async fn delete_mission(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    Extension(claims): Extension<Claims>,
) -> ServiceResult<Json<SuccessResponse>> {
    let id = parse_mission_id(&id)?;
    blocking(move || state.missions.delete_mission(&claims, id)).await?;

    Ok(Json(SuccessResponse { success: true }))
}
