use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::workflows::adoption::domain::{
    ApplicantDetails, Application, ApplicationId, ApplicationsPet, NewPet, NewShelter, Pet,
    PetId, Shelter, ShelterId,
};
use crate::workflows::adoption::repository::{
    ApplicationRepository, ExpectedState, RepositoryError,
};
use crate::workflows::adoption::{
    AdoptionService, InMemoryAdoptionService, InMemoryPetRepository, InMemoryShelterRepository,
};

/// Mirrors the show-page fixture: three applicants and one shelter with three dogs.
pub(super) struct Fixture {
    pub(super) service: Arc<InMemoryAdoptionService>,
    pub(super) shelter: Shelter,
    pub(super) scooby: Pet,
    pub(super) scrappy: Pet,
    pub(super) daisy: Pet,
    pub(super) alex: Application,
    pub(super) bob: Application,
    pub(super) professor: Application,
}

pub(super) fn applicant(name: &str) -> ApplicantDetails {
    ApplicantDetails::new(name, "12 Not A Real Ln", "Westminster", "CO", "80021")
        .expect("valid applicant")
}

pub(super) fn new_shelter(name: &str, rank: i32) -> NewShelter {
    NewShelter {
        name: name.to_string(),
        city: "Irvine CA".to_string(),
        foster_program: false,
        rank,
    }
}

pub(super) fn new_pet(name: &str, breed: &str, age: u32) -> NewPet {
    NewPet {
        name: name.to_string(),
        breed: breed.to_string(),
        age,
        adoptable: true,
    }
}

pub(super) fn fixture() -> Fixture {
    let service = Arc::new(InMemoryAdoptionService::in_memory());
    let shelter = service
        .create_shelter(new_shelter("Mystery Building", 9))
        .expect("shelter created");
    let scooby = service
        .add_pet(shelter.id, new_pet("Scooby", "Great Dane", 2))
        .expect("pet created");
    let scrappy = service
        .add_pet(shelter.id, new_pet("Scrappy", "Great Dane", 1))
        .expect("pet created");
    let daisy = service
        .add_pet(shelter.id, new_pet("Daisy", "American Bully", 4))
        .expect("pet created");

    let alex = service
        .open_application(applicant("Alex Horn"))
        .expect("application opened");
    let bob = service
        .open_application(applicant("Bob Ross"))
        .expect("application opened");
    let professor = service
        .open_application(applicant("Professor T"))
        .expect("application opened");

    service.attach_pet(alex.id, daisy.id).expect("attach");
    service.attach_pet(alex.id, scrappy.id).expect("attach");
    service.attach_pet(bob.id, scooby.id).expect("attach");

    Fixture {
        service,
        shelter,
        scooby,
        scrappy,
        daisy,
        alex,
        bob,
        professor,
    }
}

/// Application store that is reachable but fails every call.
pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(
        &self,
        _applicant: ApplicantDetails,
        _created_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(
        &self,
        _application: &Application,
        _expected: &ExpectedState,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _id: ApplicationId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn attach(
        &self,
        _application: &Application,
        _expected: &ExpectedState,
        _pet_id: PetId,
    ) -> Result<ApplicationsPet, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn detach(
        &self,
        _application: &Application,
        _expected: &ExpectedState,
        _pet_id: PetId,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn pet_ids(&self, _application_id: ApplicationId) -> Result<Vec<PetId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn applications_for_pet(&self, _pet_id: PetId) -> Result<Vec<ApplicationId>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn unavailable_service(
) -> AdoptionService<InMemoryShelterRepository, InMemoryPetRepository, UnavailableApplications> {
    AdoptionService::new(
        Arc::new(InMemoryShelterRepository::default()),
        Arc::new(InMemoryPetRepository::default()),
        Arc::new(UnavailableApplications),
    )
}

pub(super) fn missing_shelter() -> ShelterId {
    ShelterId(404)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
