use chrono::{DateTime, Utc};

use super::domain::{
    ApplicantDetails, Application, ApplicationId, ApplicationStatus, ApplicationsPet, NewPet,
    NewShelter, Pet, PetId, Shelter, ShelterId,
};

/// Storage for shelters. Identities are assigned by the store.
pub trait ShelterRepository: Send + Sync {
    fn insert(&self, shelter: NewShelter) -> Result<Shelter, RepositoryError>;
    fn fetch(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError>;
    fn all(&self) -> Result<Vec<Shelter>, RepositoryError>;
    fn delete(&self, id: ShelterId) -> Result<(), RepositoryError>;
}

/// Storage for pets. Callers are responsible for checking the owning shelter exists.
pub trait PetRepository: Send + Sync {
    fn insert(&self, shelter_id: ShelterId, pet: NewPet) -> Result<Pet, RepositoryError>;
    fn fetch(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;
    fn for_shelter(&self, shelter_id: ShelterId) -> Result<Vec<Pet>, RepositoryError>;
    fn all(&self) -> Result<Vec<Pet>, RepositoryError>;
    fn delete_for_shelter(&self, shelter_id: ShelterId) -> Result<usize, RepositoryError>;
}

/// Stored application state a write was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedState {
    pub status: ApplicationStatus,
    pub pet_ids: Vec<PetId>,
}

/// Storage for applications and their pet join rows.
///
/// Writes that change an existing application take the [`ExpectedState`]
/// they were computed from and fail with [`RepositoryError::Stale`] when the
/// stored status or attached pets have moved on since.
pub trait ApplicationRepository: Send + Sync {
    fn insert(
        &self,
        applicant: ApplicantDetails,
        created_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError>;
    fn update(
        &self,
        application: &Application,
        expected: &ExpectedState,
    ) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn all(&self) -> Result<Vec<Application>, RepositoryError>;
    /// Removes the application together with its join rows.
    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError>;

    /// Stores the join row and the transitioned application in one write.
    /// Fails with [`RepositoryError::Conflict`] when the pair already exists.
    fn attach(
        &self,
        application: &Application,
        expected: &ExpectedState,
        pet_id: PetId,
    ) -> Result<ApplicationsPet, RepositoryError>;
    /// Removes the join row and stores the transitioned application in one write.
    fn detach(
        &self,
        application: &Application,
        expected: &ExpectedState,
        pet_id: PetId,
    ) -> Result<(), RepositoryError>;
    fn pet_ids(&self, application_id: ApplicationId) -> Result<Vec<PetId>, RepositoryError>;
    fn applications_for_pet(&self, pet_id: PetId) -> Result<Vec<ApplicationId>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record was changed by another request")]
    Stale,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
