use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use mongodb::bson::doc;
use serde_json::json;

use crate::{
    db,
    error::AppError,
    models::plan::{self, PlanName},
    state::AppState,
    utils::jwt::CurrentUser,
};

/// List the pricing plan catalog.
pub async fn list_plans() -> Result<impl IntoResponse, AppError> {
    Ok(Json(plan::CATALOG))
}

/// Get a single plan by name.
pub async fn get_plan(Path(name): Path<String>) -> Result<impl IntoResponse, AppError> {
    let plan_name: PlanName = name
        .parse()
        .map_err(|_| AppError::NotFound("Plan not found".to_string()))?;

    Ok(Json(plan::get_plan(plan_name)))
}

/// Advance the current user one step up the plan staircase.
///
/// The step is only taken once the current plan's quota is exhausted; at the
/// top of the staircase there is nowhere left to go. There is no downgrade
/// path.
pub async fn upgrade_plan(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = user.id_string();

    let count = db::properties(&state.db)
        .count_documents(doc! { "owner_id": &owner_id })
        .await?;
    let limit = plan::quota_for(user.plan);

    if count < limit {
        return Err(AppError::BadRequest(format!(
            "Your {} plan still has room for {} more properties",
            user.plan,
            limit - count
        )));
    }

    let next = user.plan.next().ok_or(AppError::BadRequest(format!(
        "You are already on the {} plan with the maximum limit of {} properties",
        user.plan, limit
    )))?;

    db::users(&state.db)
        .update_one(
            doc! { "_id": user.id },
            doc! { "$set": { "plan": next.to_string() } },
        )
        .await?;

    Ok(Json(json!({ "plan": next })))
}
