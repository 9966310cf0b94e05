use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ApplicantDetails, ApplicantForm, ApplicationId, ApplicationStatus, NewPet, NewShelter, Pet,
    PetId, ReviewDecision, Shelter, ShelterId,
};
use super::repository::{
    ApplicationRepository, PetRepository, RepositoryError, ShelterRepository,
};
use super::search::PetSearch;
use super::service::{AdoptionService, AdoptionServiceError};
use super::views::{ApplicationSummary, ApplicationView, ShelterView};

type SharedService<S, P, A> = Arc<AdoptionService<S, P, A>>;

/// Router builder exposing the shelter catalog and the application workflow.
pub fn adoption_router<S, P, A>(service: SharedService<S, P, A>) -> Router
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Router::new()
        .route("/admin/shelters", get(admin_shelters_handler::<S, P, A>))
        .route(
            "/admin/applications",
            get(admin_applications_handler::<S, P, A>),
        )
        .route(
            "/admin/applications/:application_id",
            get(admin_application_handler::<S, P, A>),
        )
        .route(
            "/admin/applications/:application_id/review",
            post(review_handler::<S, P, A>),
        )
        .route("/shelters", post(create_shelter_handler::<S, P, A>))
        .route(
            "/shelters/:shelter_id",
            get(shelter_handler::<S, P, A>).delete(delete_shelter_handler::<S, P, A>),
        )
        .route(
            "/shelters/:shelter_id/pets",
            get(shelter_pets_handler::<S, P, A>).post(add_pet_handler::<S, P, A>),
        )
        .route("/pets/:pet_id", get(pet_handler::<S, P, A>))
        .route("/applications", post(open_application_handler::<S, P, A>))
        .route(
            "/applications/:application_id",
            get(application_handler::<S, P, A>).delete(delete_application_handler::<S, P, A>),
        )
        .route(
            "/applications/:application_id/pets",
            post(attach_pet_handler::<S, P, A>),
        )
        .route(
            "/applications/:application_id/pets/:pet_id",
            axum::routing::delete(detach_pet_handler::<S, P, A>),
        )
        .route(
            "/applications/:application_id/submit",
            post(submit_handler::<S, P, A>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttachPetRequest {
    pub(crate) pet_id: PetId,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    #[serde(default)]
    pub(crate) description: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReviewRequest {
    pub(crate) decision: ReviewDecision,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationFilter {
    #[serde(default)]
    pub(crate) status: Option<ApplicationStatus>,
}

pub(crate) async fn admin_shelters_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
) -> Result<Json<Vec<ShelterView>>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let shelters = service.admin_shelters()?;
    Ok(Json(shelters.iter().map(ShelterView::from).collect()))
}

pub(crate) async fn admin_applications_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<ApplicationSummary>>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let applications = service.applications(filter.status)?;
    Ok(Json(
        applications.iter().map(ApplicationSummary::from).collect(),
    ))
}

pub(crate) async fn admin_application_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(application_id): Path<ApplicationId>,
) -> Result<Json<ApplicationView>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let detail = service.application(application_id)?;
    Ok(Json(ApplicationView::from(&detail)))
}

pub(crate) async fn review_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<ReviewRequest>,
) -> Result<Json<ApplicationView>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let detail = service.review(application_id, request.decision)?;
    Ok(Json(ApplicationView::from(&detail)))
}

pub(crate) async fn create_shelter_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Json(shelter): Json<NewShelter>,
) -> Result<(StatusCode, Json<Shelter>), AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let stored = service.create_shelter(shelter)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn shelter_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(shelter_id): Path<ShelterId>,
) -> Result<Json<Shelter>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Ok(Json(service.shelter(shelter_id)?))
}

pub(crate) async fn delete_shelter_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(shelter_id): Path<ShelterId>,
) -> Result<StatusCode, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    service.delete_shelter(shelter_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn shelter_pets_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(shelter_id): Path<ShelterId>,
) -> Result<Json<Vec<Pet>>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Ok(Json(service.shelter_pets(shelter_id)?))
}

pub(crate) async fn add_pet_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(shelter_id): Path<ShelterId>,
    Json(pet): Json<NewPet>,
) -> Result<(StatusCode, Json<Pet>), AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let stored = service.add_pet(shelter_id, pet)?;
    Ok((StatusCode::CREATED, Json(stored)))
}

pub(crate) async fn pet_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(pet_id): Path<PetId>,
) -> Result<Json<Pet>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Ok(Json(service.pet(pet_id)?))
}

pub(crate) async fn open_application_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Json(form): Json<ApplicantForm>,
) -> Result<(StatusCode, Json<ApplicationView>), AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let applicant = ApplicantDetails::try_from(form)?;
    let application = service.open_application(applicant)?;
    let detail = service.application(application.id)?;
    Ok((StatusCode::CREATED, Json(ApplicationView::from(&detail))))
}

pub(crate) async fn application_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(application_id): Path<ApplicationId>,
    Query(search): Query<PetSearch>,
) -> Result<Json<ApplicationView>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    Ok(Json(service.application_view(application_id, &search)?))
}

pub(crate) async fn delete_application_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(application_id): Path<ApplicationId>,
) -> Result<StatusCode, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    service.delete_application(application_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub(crate) async fn attach_pet_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<AttachPetRequest>,
) -> Result<Json<ApplicationView>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let detail = service.attach_pet(application_id, request.pet_id)?;
    Ok(Json(ApplicationView::from(&detail)))
}

pub(crate) async fn detach_pet_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path((application_id, pet_id)): Path<(ApplicationId, PetId)>,
) -> Result<Json<ApplicationView>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let detail = service.detach_pet(application_id, pet_id)?;
    Ok(Json(ApplicationView::from(&detail)))
}

pub(crate) async fn submit_handler<S, P, A>(
    State(service): State<SharedService<S, P, A>>,
    Path(application_id): Path<ApplicationId>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<ApplicationView>, AdoptionServiceError>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let detail = service.submit(application_id, &request.description)?;
    Ok(Json(ApplicationView::from(&detail)))
}

impl AdoptionServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdoptionServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdoptionServiceError::Transition(_)
            | AdoptionServiceError::ShelterInUse { .. }
            | AdoptionServiceError::Repository(RepositoryError::Conflict)
            | AdoptionServiceError::Repository(RepositoryError::Stale) => StatusCode::CONFLICT,
            AdoptionServiceError::ShelterNotFound(_)
            | AdoptionServiceError::PetNotFound(_)
            | AdoptionServiceError::ApplicationNotFound(_)
            | AdoptionServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            AdoptionServiceError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AdoptionServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "adoption request failed");
        }
        let payload = json!({ "error": self.to_string() });
        (status, Json(payload)).into_response()
    }
}
