use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use super::domain::{
    ApplicantDetails, Application, ApplicationId, ApplicationStatus, NewPet, NewShelter, Pet,
    PetId, ReviewDecision, Shelter, ShelterId,
};
use super::lifecycle::TransitionError;
use super::repository::{
    ApplicationRepository, ExpectedState, PetRepository, RepositoryError, ShelterRepository,
};
use super::search::{search_pets, PetSearch};
use super::validation::ValidationError;
use super::views::ApplicationView;

/// An application together with the pets attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDetail {
    pub application: Application,
    pub pets: Vec<Pet>,
}

impl ApplicationDetail {
    pub fn pet_ids(&self) -> Vec<PetId> {
        self.pets.iter().map(|pet| pet.id).collect()
    }
}

/// Service composing the shelter, pet, and application repositories.
pub struct AdoptionService<S, P, A> {
    shelters: Arc<S>,
    pets: Arc<P>,
    applications: Arc<A>,
}

impl<S, P, A> AdoptionService<S, P, A>
where
    S: ShelterRepository + 'static,
    P: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(shelters: Arc<S>, pets: Arc<P>, applications: Arc<A>) -> Self {
        Self {
            shelters,
            pets,
            applications,
        }
    }

    pub fn create_shelter(&self, shelter: NewShelter) -> Result<Shelter, AdoptionServiceError> {
        shelter.validate()?;
        let stored = self.shelters.insert(shelter)?;
        info!(shelter_id = %stored.id, name = %stored.name, "shelter created");
        Ok(stored)
    }

    pub fn shelter(&self, id: ShelterId) -> Result<Shelter, AdoptionServiceError> {
        self.shelters
            .fetch(id)?
            .ok_or(AdoptionServiceError::ShelterNotFound(id))
    }

    /// Shelters for the admin index, highest rank first.
    pub fn admin_shelters(&self) -> Result<Vec<Shelter>, AdoptionServiceError> {
        let mut shelters = self.shelters.all()?;
        shelters.sort_by(|a, b| b.rank.cmp(&a.rank).then(a.id.cmp(&b.id)));
        Ok(shelters)
    }

    /// Deletes a shelter and its pets unless one of them is on an application.
    pub fn delete_shelter(&self, id: ShelterId) -> Result<(), AdoptionServiceError> {
        self.shelter(id)?;
        for pet in self.pets.for_shelter(id)? {
            if !self.applications.applications_for_pet(pet.id)?.is_empty() {
                return Err(AdoptionServiceError::ShelterInUse {
                    shelter_id: id,
                    pet_id: pet.id,
                });
            }
        }

        let removed = self.pets.delete_for_shelter(id)?;
        self.shelters.delete(id)?;
        info!(shelter_id = %id, pets_removed = removed, "shelter deleted");
        Ok(())
    }

    pub fn add_pet(&self, shelter_id: ShelterId, pet: NewPet) -> Result<Pet, AdoptionServiceError> {
        pet.validate()?;
        self.shelter(shelter_id)?;
        let stored = self.pets.insert(shelter_id, pet)?;
        info!(shelter_id = %shelter_id, pet_id = %stored.id, name = %stored.name, "pet listed");
        Ok(stored)
    }

    pub fn pet(&self, id: PetId) -> Result<Pet, AdoptionServiceError> {
        self.pets
            .fetch(id)?
            .ok_or(AdoptionServiceError::PetNotFound(id))
    }

    pub fn shelter_pets(&self, shelter_id: ShelterId) -> Result<Vec<Pet>, AdoptionServiceError> {
        self.shelter(shelter_id)?;
        Ok(self.pets.for_shelter(shelter_id)?)
    }

    pub fn open_application(
        &self,
        applicant: ApplicantDetails,
    ) -> Result<Application, AdoptionServiceError> {
        let stored = self.applications.insert(applicant, Utc::now())?;
        info!(application_id = %stored.id, status = stored.status.label(), "application opened");
        Ok(stored)
    }

    pub fn application(&self, id: ApplicationId) -> Result<ApplicationDetail, AdoptionServiceError> {
        let application = self.fetch_application(id)?;
        self.detail(application)
    }

    /// Builds the view for an application, running the pet search when one was requested
    /// and the application still accepts pets.
    pub fn application_view(
        &self,
        id: ApplicationId,
        search: &PetSearch,
    ) -> Result<ApplicationView, AdoptionServiceError> {
        let detail = self.application(id)?;
        let results = if search.is_requested() && detail.application.can_search_pets() {
            Some(self.search_pool(search, &detail.pet_ids())?)
        } else {
            None
        };
        Ok(ApplicationView::new(&detail, results))
    }

    pub fn search_pets(
        &self,
        id: ApplicationId,
        search: &PetSearch,
    ) -> Result<Vec<Pet>, AdoptionServiceError> {
        let detail = self.application(id)?;
        if !detail.application.can_search_pets() {
            return Err(TransitionError::NotEditable {
                status: detail.application.status,
            }
            .into());
        }
        self.search_pool(search, &detail.pet_ids())
    }

    pub fn attach_pet(
        &self,
        id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationDetail, AdoptionServiceError> {
        let (mut application, expected) = self.load_for_write(id)?;
        self.pet(pet_id)?;

        application.attach_pet(&expected.pet_ids, pet_id)?;
        self.applications
            .attach(&application, &expected, pet_id)
            .map_err(|err| match err {
                RepositoryError::Conflict => TransitionError::AlreadyAttached { pet_id }.into(),
                other => AdoptionServiceError::from(other),
            })?;

        info!(application_id = %id, pet_id = %pet_id, status = application.status.label(), "pet attached");
        self.detail(application)
    }

    pub fn detach_pet(
        &self,
        id: ApplicationId,
        pet_id: PetId,
    ) -> Result<ApplicationDetail, AdoptionServiceError> {
        let (mut application, expected) = self.load_for_write(id)?;

        application.detach_pet(&expected.pet_ids, pet_id)?;
        self.applications.detach(&application, &expected, pet_id)?;

        info!(application_id = %id, pet_id = %pet_id, status = application.status.label(), "pet detached");
        self.detail(application)
    }

    pub fn submit(
        &self,
        id: ApplicationId,
        description: &str,
    ) -> Result<ApplicationDetail, AdoptionServiceError> {
        let (mut application, expected) = self.load_for_write(id)?;

        application.submit(expected.pet_ids.len(), description, Utc::now())?;
        self.applications.update(&application, &expected)?;

        info!(application_id = %id, pets = expected.pet_ids.len(), "application submitted");
        self.detail(application)
    }

    pub fn review(
        &self,
        id: ApplicationId,
        decision: ReviewDecision,
    ) -> Result<ApplicationDetail, AdoptionServiceError> {
        let (mut application, expected) = self.load_for_write(id)?;
        application.review(decision)?;
        self.applications.update(&application, &expected)?;

        info!(application_id = %id, status = application.status.label(), "application reviewed");
        self.detail(application)
    }

    pub fn delete_application(&self, id: ApplicationId) -> Result<(), AdoptionServiceError> {
        self.fetch_application(id)?;
        self.applications.delete(id)?;
        info!(application_id = %id, "application deleted");
        Ok(())
    }

    pub fn applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, AdoptionServiceError> {
        let mut applications: Vec<Application> = self
            .applications
            .all()?
            .into_iter()
            .filter(|application| status.map_or(true, |wanted| application.status == wanted))
            .collect();
        applications.sort_by_key(|application| application.id);
        Ok(applications)
    }

    fn fetch_application(&self, id: ApplicationId) -> Result<Application, AdoptionServiceError> {
        self.applications
            .fetch(id)?
            .ok_or(AdoptionServiceError::ApplicationNotFound(id))
    }

    /// The stored application plus the state later writes are checked against.
    fn load_for_write(
        &self,
        id: ApplicationId,
    ) -> Result<(Application, ExpectedState), AdoptionServiceError> {
        let application = self.fetch_application(id)?;
        let expected = ExpectedState {
            status: application.status,
            pet_ids: self.applications.pet_ids(id)?,
        };
        Ok((application, expected))
    }

    fn detail(&self, application: Application) -> Result<ApplicationDetail, AdoptionServiceError> {
        let mut pets = Vec::new();
        for pet_id in self.applications.pet_ids(application.id)? {
            // Join rows can outlive a pet only through an out-of-band store edit.
            if let Some(pet) = self.pets.fetch(pet_id)? {
                pets.push(pet);
            }
        }
        Ok(ApplicationDetail { application, pets })
    }

    fn search_pool(
        &self,
        search: &PetSearch,
        attached: &[PetId],
    ) -> Result<Vec<Pet>, AdoptionServiceError> {
        let pool = match search.shelter_id {
            Some(shelter_id) => self.shelter_pets(shelter_id)?,
            None => self.pets.all()?,
        };
        let exclude: HashSet<PetId> = attached.iter().copied().collect();
        let results = search_pets(&pool, search.query(), &exclude);
        debug!(query = search.query(), matches = results.len(), "pet search");
        Ok(results)
    }
}

/// Error raised by the adoption service.
#[derive(Debug, thiserror::Error)]
pub enum AdoptionServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("shelter {0} not found")]
    ShelterNotFound(ShelterId),
    #[error("pet {0} not found")]
    PetNotFound(PetId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("shelter {shelter_id} still has pet {pet_id} on an application")]
    ShelterInUse { shelter_id: ShelterId, pet_id: PetId },
}
