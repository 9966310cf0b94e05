//! Mutex-guarded in-memory repositories used by the API service and tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    ApplicantDetails, Application, ApplicationId, ApplicationsPet, ApplicationsPetId, NewPet,
    NewShelter, Pet, PetId, Shelter, ShelterId,
};
use super::repository::{
    ApplicationRepository, ExpectedState, PetRepository, RepositoryError, ShelterRepository,
};

struct Table<K, V> {
    next_id: u64,
    rows: BTreeMap<K, V>,
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<K, V> Table<K, V> {
    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, table: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{table} table lock poisoned")))
}

#[derive(Default, Clone)]
pub struct InMemoryShelterRepository {
    table: Arc<Mutex<Table<ShelterId, Shelter>>>,
}

impl ShelterRepository for InMemoryShelterRepository {
    fn insert(&self, shelter: NewShelter) -> Result<Shelter, RepositoryError> {
        let mut guard = lock(&self.table, "shelters")?;
        let record = Shelter {
            id: ShelterId(guard.allocate()),
            name: shelter.name.trim().to_string(),
            city: shelter.city.trim().to_string(),
            foster_program: shelter.foster_program,
            rank: shelter.rank,
        };
        guard.rows.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: ShelterId) -> Result<Option<Shelter>, RepositoryError> {
        let guard = lock(&self.table, "shelters")?;
        Ok(guard.rows.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Shelter>, RepositoryError> {
        let guard = lock(&self.table, "shelters")?;
        Ok(guard.rows.values().cloned().collect())
    }

    fn delete(&self, id: ShelterId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.table, "shelters")?;
        guard
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryPetRepository {
    table: Arc<Mutex<Table<PetId, Pet>>>,
}

impl PetRepository for InMemoryPetRepository {
    fn insert(&self, shelter_id: ShelterId, pet: NewPet) -> Result<Pet, RepositoryError> {
        let mut guard = lock(&self.table, "pets")?;
        let record = Pet {
            id: PetId(guard.allocate()),
            shelter_id,
            name: pet.name.trim().to_string(),
            breed: pet.breed.trim().to_string(),
            age: pet.age,
            adoptable: pet.adoptable,
        };
        guard.rows.insert(record.id, record.clone());
        Ok(record)
    }

    fn fetch(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        let guard = lock(&self.table, "pets")?;
        Ok(guard.rows.get(&id).cloned())
    }

    fn for_shelter(&self, shelter_id: ShelterId) -> Result<Vec<Pet>, RepositoryError> {
        let guard = lock(&self.table, "pets")?;
        Ok(guard
            .rows
            .values()
            .filter(|pet| pet.shelter_id == shelter_id)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<Pet>, RepositoryError> {
        let guard = lock(&self.table, "pets")?;
        Ok(guard.rows.values().cloned().collect())
    }

    fn delete_for_shelter(&self, shelter_id: ShelterId) -> Result<usize, RepositoryError> {
        let mut guard = lock(&self.table, "pets")?;
        let before = guard.rows.len();
        guard.rows.retain(|_, pet| pet.shelter_id != shelter_id);
        Ok(before - guard.rows.len())
    }
}

#[derive(Default)]
struct ApplicationTables {
    applications: Table<ApplicationId, Application>,
    joins: Table<ApplicationsPetId, ApplicationsPet>,
}

impl ApplicationTables {
    fn pet_ids(&self, application_id: ApplicationId) -> Vec<PetId> {
        self.joins
            .rows
            .values()
            .filter(|join| join.application_id == application_id)
            .map(|join| join.pet_id)
            .collect()
    }

    fn ensure_current(
        &self,
        application_id: ApplicationId,
        expected: &ExpectedState,
    ) -> Result<(), RepositoryError> {
        let stored = self
            .applications
            .rows
            .get(&application_id)
            .ok_or(RepositoryError::NotFound)?;

        let mut stored_pets = self.pet_ids(application_id);
        let mut expected_pets = expected.pet_ids.clone();
        stored_pets.sort();
        expected_pets.sort();
        if stored.status != expected.status || stored_pets != expected_pets {
            return Err(RepositoryError::Stale);
        }
        Ok(())
    }

    fn store(&mut self, application: &Application) {
        self.applications
            .rows
            .insert(application.id, application.clone());
    }
}

/// Applications and join rows share one lock, so every check and write below
/// happens against a single consistent state.
#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    tables: Arc<Mutex<ApplicationTables>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(
        &self,
        applicant: ApplicantDetails,
        created_at: DateTime<Utc>,
    ) -> Result<Application, RepositoryError> {
        let mut guard = lock(&self.tables, "applications")?;
        let id = ApplicationId(guard.applications.allocate());
        let record = Application::open(id, applicant, created_at);
        guard.applications.rows.insert(id, record.clone());
        Ok(record)
    }

    fn update(
        &self,
        application: &Application,
        expected: &ExpectedState,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "applications")?;
        guard.ensure_current(application.id, expected)?;
        guard.store(application);
        Ok(())
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = lock(&self.tables, "applications")?;
        Ok(guard.applications.rows.get(&id).cloned())
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = lock(&self.tables, "applications")?;
        Ok(guard.applications.rows.values().cloned().collect())
    }

    fn delete(&self, id: ApplicationId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "applications")?;
        if guard.applications.rows.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        guard.joins.rows.retain(|_, join| join.application_id != id);
        Ok(())
    }

    fn attach(
        &self,
        application: &Application,
        expected: &ExpectedState,
        pet_id: PetId,
    ) -> Result<ApplicationsPet, RepositoryError> {
        let mut guard = lock(&self.tables, "applications")?;
        let application_id = application.id;
        if guard.pet_ids(application_id).contains(&pet_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.ensure_current(application_id, expected)?;

        let join = ApplicationsPet {
            id: ApplicationsPetId(guard.joins.allocate()),
            application_id,
            pet_id,
        };
        guard.joins.rows.insert(join.id, join);
        guard.store(application);
        Ok(join)
    }

    fn detach(
        &self,
        application: &Application,
        expected: &ExpectedState,
        pet_id: PetId,
    ) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.tables, "applications")?;
        let application_id = application.id;
        guard.ensure_current(application_id, expected)?;

        let before = guard.joins.rows.len();
        guard
            .joins
            .rows
            .retain(|_, join| !(join.application_id == application_id && join.pet_id == pet_id));
        if guard.joins.rows.len() == before {
            return Err(RepositoryError::NotFound);
        }
        guard.store(application);
        Ok(())
    }

    fn pet_ids(&self, application_id: ApplicationId) -> Result<Vec<PetId>, RepositoryError> {
        let guard = lock(&self.tables, "applications")?;
        Ok(guard.pet_ids(application_id))
    }

    fn applications_for_pet(&self, pet_id: PetId) -> Result<Vec<ApplicationId>, RepositoryError> {
        let guard = lock(&self.tables, "applications")?;
        Ok(guard
            .joins
            .rows
            .values()
            .filter(|join| join.pet_id == pet_id)
            .map(|join| join.application_id)
            .collect())
    }
}
