//! Shelter catalog, pet search, and the adoption application lifecycle.
//!
//! Persistence sits behind the repository traits so the service and router
//! can run against the bundled in-memory store or any other backend.

pub mod domain;
pub mod lifecycle;
pub mod memory;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;
pub mod validation;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicantDetails, ApplicantForm, Application, ApplicationId, ApplicationStatus,
    ApplicationsPet, ApplicationsPetId, NewPet, NewShelter, Pet, PetId, ReviewDecision, Shelter,
    ShelterId,
};
pub use lifecycle::TransitionError;
pub use memory::{InMemoryApplicationRepository, InMemoryPetRepository, InMemoryShelterRepository};
pub use repository::{
    ApplicationRepository, ExpectedState, PetRepository, RepositoryError, ShelterRepository,
};
pub use router::adoption_router;
pub use search::{search_pets, PetSearch};
pub use service::{AdoptionService, AdoptionServiceError, ApplicationDetail};
pub use validation::ValidationError;
pub use views::{ApplicationSummary, ApplicationView, PetSummary, ShelterView};

/// Service wired to the bundled in-memory repositories.
pub type InMemoryAdoptionService =
    AdoptionService<InMemoryShelterRepository, InMemoryPetRepository, InMemoryApplicationRepository>;

impl InMemoryAdoptionService {
    pub fn in_memory() -> Self {
        AdoptionService::new(
            std::sync::Arc::new(InMemoryShelterRepository::default()),
            std::sync::Arc::new(InMemoryPetRepository::default()),
            std::sync::Arc::new(InMemoryApplicationRepository::default()),
        )
    }
}
