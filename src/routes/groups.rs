use actix_web::{web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::models::{
    AddMemberRequest, CreateAssignmentsResponse, CreateGroupRequest, GenerateAssignmentsRequest,
    GenerateAssignmentsResponse, HealthResponse,
};
use crate::routes::{authenticate, exchange_error, validation_error, AppState};

/// Configure health, group and assignment routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/assignments/generate", web::post().to(generate_assignments))
        .route("/groups", web::get().to(list_groups))
        .route("/groups", web::post().to(create_group))
        .route("/groups/{group_id}", web::get().to(group_detail))
        .route("/groups/{group_id}/members", web::post().to(add_member))
        .route("/groups/{group_id}/assignments", web::post().to(create_assignments))
        .route("/groups/{group_id}/assignments/me", web::get().to(my_assignment));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let backend_healthy = state.supabase.health_check().await.unwrap_or(false);

    let status = if backend_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Preview assignments for an ad-hoc member list
///
/// POST /api/v1/assignments/generate
///
/// Request body:
/// ```json
/// {
///   "members": [{"id": "string", "canGive": true}]
/// }
/// ```
async fn generate_assignments(
    state: web::Data<AppState>,
    req: web::Json<GenerateAssignmentsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.exchange.preview_assignments(&req.members) {
        Ok(assignments) => HttpResponse::Ok().json(GenerateAssignmentsResponse {
            assignments,
            strategy: state.exchange.generator().strategy().to_string(),
        }),
        Err(e) => exchange_error(e),
    }
}

async fn list_groups(state: web::Data<AppState>, http_req: HttpRequest) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.exchange.list_groups(&user).await {
        Ok(groups) => HttpResponse::Ok().json(groups),
        Err(e) => exchange_error(e),
    }
}

/// Create a group
///
/// POST /api/v1/groups
///
/// Request body:
/// ```json
/// {
///   "name": "string",
///   "description": "string"
/// }
/// ```
async fn create_group(
    state: web::Data<AppState>,
    req: web::Json<CreateGroupRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state
        .exchange
        .create_group(&user, req.name.trim(), req.description.as_deref())
        .await
    {
        Ok(group) => HttpResponse::Created().json(group),
        Err(e) => exchange_error(e),
    }
}

async fn group_detail(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.exchange.group_detail(&user, &path).await {
        Ok(detail) => HttpResponse::Ok().json(detail),
        Err(e) => exchange_error(e),
    }
}

/// Add a member to a group (creator only)
///
/// POST /api/v1/groups/{group_id}/members
///
/// Request body:
/// ```json
/// {
///   "fullName": "string",
///   "email": "string",
///   "isChild": false
/// }
/// ```
async fn add_member(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: web::Json<AddMemberRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    match state.exchange.add_member(&user, &path, &req).await {
        Ok(member) => HttpResponse::Created().json(member),
        Err(e) => exchange_error(e),
    }
}

/// Create and persist assignments (creator only, once per group)
///
/// POST /api/v1/groups/{group_id}/assignments
async fn create_assignments(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    let group_id = path.into_inner();
    tracing::info!("Creating assignments for group {} (requested by {})", group_id, user.id);

    match state.exchange.create_assignments(&user, &group_id).await {
        Ok(assignments) => HttpResponse::Ok().json(CreateAssignmentsResponse {
            group_id,
            assignments_created: assignments.len(),
            assignment_completed: true,
        }),
        Err(e) => exchange_error(e),
    }
}

async fn my_assignment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    http_req: HttpRequest,
) -> impl Responder {
    let user = match authenticate(&state, &http_req).await {
        Ok(user) => user,
        Err(response) => return response,
    };

    match state.exchange.my_assignment(&user, &path).await {
        Ok(assignment) => HttpResponse::Ok().json(assignment),
        Err(e) => exchange_error(e),
    }
}
