use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{Application, ApplicationId, Pet, PetId, Shelter, ShelterId};
use super::service::ApplicationDetail;

/// Compact pet reference linking back to the pet's own page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PetSummary {
    pub id: PetId,
    pub name: String,
    pub breed: String,
    pub href: String,
}

impl From<&Pet> for PetSummary {
    fn from(pet: &Pet) -> Self {
        Self {
            id: pet.id,
            name: pet.name.clone(),
            breed: pet.breed.clone(),
            href: format!("/pets/{}", pet.id),
        }
    }
}

/// Everything the application page shows, including which forms are available.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    pub id: ApplicationId,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub description: Option<String>,
    pub status: &'static str,
    pub status_label: &'static str,
    pub pets: Vec<PetSummary>,
    pub can_search_pets: bool,
    pub can_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<PetSummary>>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
}

impl ApplicationView {
    pub fn new(detail: &ApplicationDetail, search_results: Option<Vec<Pet>>) -> Self {
        let application = &detail.application;
        let applicant = &application.applicant;
        Self {
            id: application.id,
            name: applicant.name().to_string(),
            street_address: applicant.street_address().to_string(),
            city: applicant.city().to_string(),
            state: applicant.state().to_string(),
            zip_code: applicant.zip_code().to_string(),
            description: application.description.clone(),
            status: application.status.label(),
            status_label: application.status.display_name(),
            pets: detail.pets.iter().map(PetSummary::from).collect(),
            can_search_pets: application.can_search_pets(),
            can_submit: application.can_submit(detail.pets.len()),
            search_results: search_results
                .map(|pets| pets.iter().map(PetSummary::from).collect()),
            created_at: application.created_at,
            submitted_at: application.submitted_at,
        }
    }
}

impl From<&ApplicationDetail> for ApplicationView {
    fn from(detail: &ApplicationDetail) -> Self {
        Self::new(detail, None)
    }
}

/// Row of the admin application listing.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub name: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub href: String,
}

impl From<&Application> for ApplicationSummary {
    fn from(application: &Application) -> Self {
        Self {
            id: application.id,
            name: application.applicant.name().to_string(),
            status: application.status.label(),
            status_label: application.status.display_name(),
            href: format!("/admin/applications/{}", application.id),
        }
    }
}

/// Row of the admin shelter index.
#[derive(Debug, Clone, Serialize)]
pub struct ShelterView {
    pub id: ShelterId,
    pub dom_id: String,
    pub name: String,
    pub city: String,
    pub foster_program: bool,
    pub rank: i32,
}

impl From<&Shelter> for ShelterView {
    fn from(shelter: &Shelter) -> Self {
        Self {
            id: shelter.id,
            dom_id: format!("shelter-{}", shelter.id),
            name: shelter.name.clone(),
            city: shelter.city.clone(),
            foster_program: shelter.foster_program,
            rank: shelter.rank,
        }
    }
}
