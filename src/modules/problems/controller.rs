use anyhow::anyhow;
use axum::extract::{Multipart, Path, State};
use campusdesk_auth::Role;
use campusdesk_core::{ApiResponse, AppError, ErrorResponse};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{RequireAdmin, RequireStudent};
use crate::modules::domains::DomainService;
use crate::state::AppState;
use crate::utils::multipart::{MultipartForm, image_from_form};
use crate::validator::ValidatedJson;

use super::model::{NewProblem, Problem, ProblemPriority, UpdateProblemDto};
use super::service::ProblemService;

/// Text fields of a complaint form, checked before any upload happens.
fn problem_fields(form: &MultipartForm) -> Result<(String, String, String, Uuid, ProblemPriority), AppError> {
    let (Some(title), Some(description), Some(department), Some(_)) = (
        form.text("title"),
        form.text("description"),
        form.text("department"),
        form.text("domain_id"),
    ) else {
        return Err(AppError::bad_request(anyhow!("All fields are required")));
    };

    let domain_id = form
        .parse::<Uuid>("domain_id", "Invalid domain id")?
        .ok_or_else(|| AppError::bad_request(anyhow!("All fields are required")))?;
    let priority = form
        .parse::<ProblemPriority>("priority", "Invalid priority")?
        .unwrap_or_default();

    Ok((title, description, department, domain_id, priority))
}

/// File a complaint
///
/// Multipart fields: `title`, `description`, `department`, `domain_id`,
/// optional `priority`, and `image` as a file or a URL.
#[utoipa::path(
    post,
    path = "/api/v1/problem/create",
    request_body(content_type = "multipart/form-data", description = "Complaint form"),
    responses(
        (status = 201, description = "Complaint filed", body = Problem),
        (status = 400, description = "Missing fields or image", body = ErrorResponse),
        (status = 404, description = "Domain not found", body = ErrorResponse),
        (status = 500, description = "Image upload failed", body = ErrorResponse)
    ),
    tag = "Problems",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, multipart))]
pub async fn create_problem(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    multipart: Multipart,
) -> Result<ApiResponse<Problem>, AppError> {
    let student_id = auth_user.user_id()?;
    let mut form = MultipartForm::collect(multipart).await?;

    let (title, description, department, domain_id, priority) = problem_fields(&form)?;
    DomainService::get_domain(&state.db, domain_id).await?;

    let image = image_from_form(state.storage.as_ref(), "problems", &mut form)
        .await?
        .ok_or_else(|| AppError::bad_request(anyhow!("Image is required")))?;

    let problem = ProblemService::create(
        &state.db,
        student_id,
        NewProblem {
            title,
            description,
            department,
            domain_id,
            priority,
            image,
        },
    )
    .await?;

    Ok(ApiResponse::created("Complaint created successfully", problem))
}

#[utoipa::path(
    get,
    path = "/api/v1/problem/student/problems",
    responses((status = 200, description = "The caller's complaints", body = Vec<Problem>)),
    tag = "Problems",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student_problems(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
) -> Result<ApiResponse<Vec<Problem>>, AppError> {
    let problems = ProblemService::list_for_student(&state.db, auth_user.user_id()?).await?;
    Ok(ApiResponse::ok("Complaints fetched successfully", problems))
}

/// Complaints in the caller's domain
///
/// Authorities see their current domain. Students see the domain of their
/// latest complaint, or nothing when they have not filed one.
#[utoipa::path(
    get,
    path = "/api/v1/problem/domain/problems",
    responses(
        (status = 200, description = "Domain complaints", body = Vec<Problem>),
        (status = 400, description = "Authority has no domain", body = ErrorResponse),
        (status = 403, description = "Role has no domain", body = ErrorResponse)
    ),
    tag = "Problems",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_domain_problems(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<Vec<Problem>>, AppError> {
    let user_id = auth_user.user_id()?;
    let domain_id = match auth_user.role()? {
        Role::Authority => Some(
            DomainService::current_domain_of(&state.db, user_id)
                .await?
                .ok_or_else(|| {
                    AppError::bad_request(anyhow!("You are not assigned to any domain"))
                })?,
        ),
        Role::Student => ProblemService::student_domain(&state.db, user_id).await?,
        _ => {
            return Err(AppError::forbidden(
                "Forbidden: Insufficient privileges",
            ));
        }
    };

    let problems = match domain_id {
        Some(domain_id) => ProblemService::list_for_domain(&state.db, domain_id).await?,
        None => Vec::new(),
    };
    Ok(ApiResponse::ok("Complaints fetched successfully", problems))
}

#[utoipa::path(
    get,
    path = "/api/v1/problem/domain/{domain_id}/problems",
    params(("domain_id" = Uuid, Path, description = "Domain ID")),
    responses((status = 200, description = "Complaints filed under the domain", body = Vec<Problem>)),
    tag = "Problems"
)]
#[instrument(skip(state))]
pub async fn get_problems_by_domain(
    State(state): State<AppState>,
    Path(domain_id): Path<Uuid>,
) -> Result<ApiResponse<Vec<Problem>>, AppError> {
    let problems = ProblemService::list_for_domain(&state.db, domain_id).await?;
    Ok(ApiResponse::ok("Complaints fetched successfully", problems))
}

#[utoipa::path(
    patch,
    path = "/api/v1/problem/update/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateProblemDto,
    responses(
        (status = 200, description = "Complaint updated", body = Problem),
        (status = 403, description = "Not the complaint's author", body = ErrorResponse),
        (status = 404, description = "Complaint not found", body = ErrorResponse)
    ),
    tag = "Problems",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_problem(
    State(state): State<AppState>,
    RequireStudent(auth_user): RequireStudent,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateProblemDto>,
) -> Result<ApiResponse<Problem>, AppError> {
    let problem = ProblemService::update_own(&state.db, id, auth_user.user_id()?, dto).await?;
    Ok(ApiResponse::ok("Complaint updated successfully", problem))
}

#[utoipa::path(
    get,
    path = "/api/v1/problem/all",
    responses(
        (status = 200, description = "Every complaint", body = Vec<Problem>),
        (status = 403, description = "Admin only", body = ErrorResponse)
    ),
    tag = "Problems",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, _admin))]
pub async fn get_all_problems(
    State(state): State<AppState>,
    _admin: RequireAdmin,
) -> Result<ApiResponse<Vec<Problem>>, AppError> {
    let problems = ProblemService::list_all(&state.db).await?;
    Ok(ApiResponse::ok("Complaints fetched successfully", problems))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_problem_fields_require_every_text_field() {
        let form = MultipartForm::from_pairs(&[
            ("title", "Broken fan"),
            ("description", "Room 204"),
            ("department", "CSE"),
        ]);
        let err = problem_fields(&form).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "All fields are required");
    }

    #[test]
    fn test_problem_fields_default_priority() {
        let domain_id = Uuid::new_v4().to_string();
        let form = MultipartForm::from_pairs(&[
            ("title", "Broken fan"),
            ("description", "Room 204"),
            ("department", "CSE"),
            ("domain_id", &domain_id),
        ]);
        let (_, _, _, parsed, priority) = problem_fields(&form).unwrap();
        assert_eq!(parsed.to_string(), domain_id);
        assert_eq!(priority, ProblemPriority::Medium);
    }

    #[test]
    fn test_problem_fields_reject_bad_domain_id() {
        let form = MultipartForm::from_pairs(&[
            ("title", "Broken fan"),
            ("description", "Room 204"),
            ("department", "CSE"),
            ("domain_id", "not-a-uuid"),
        ]);
        let err = problem_fields(&form).unwrap_err();
        assert_eq!(err.error.to_string(), "Invalid domain id");
    }
}
