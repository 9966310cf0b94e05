//! Bulk loading of shelters and their pets from a CSV roster.

mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::workflows::adoption::{
    AdoptionService, AdoptionServiceError, ApplicationRepository, Pet, PetRepository, Shelter,
    ShelterId, ShelterRepository,
};

use parser::{CatalogRecord, ParseFailure};

#[derive(Debug)]
pub enum CatalogImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidRow { line: u64, reason: String },
    Adoption { line: u64, source: AdoptionServiceError },
}

impl std::fmt::Display for CatalogImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogImportError::Io(err) => write!(f, "failed to read catalog: {}", err),
            CatalogImportError::Csv(err) => write!(f, "invalid catalog CSV data: {}", err),
            CatalogImportError::InvalidRow { line, reason } => {
                write!(f, "catalog line {}: {}", line, reason)
            }
            CatalogImportError::Adoption { line, source } => {
                write!(f, "catalog line {} was rejected: {}", line, source)
            }
        }
    }
}

impl std::error::Error for CatalogImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogImportError::Io(err) => Some(err),
            CatalogImportError::Csv(err) => Some(err),
            CatalogImportError::InvalidRow { .. } => None,
            CatalogImportError::Adoption { source, .. } => Some(source),
        }
    }
}

impl From<std::io::Error> for CatalogImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<ParseFailure> for CatalogImportError {
    fn from(failure: ParseFailure) -> Self {
        match failure {
            ParseFailure::Csv(err) => Self::Csv(err),
            ParseFailure::Row(row) => Self::InvalidRow {
                line: row.line,
                reason: row.reason,
            },
        }
    }
}

/// What an import created, in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSummary {
    pub shelters_created: Vec<Shelter>,
    pub shelters_reused: usize,
    pub pets_created: Vec<Pet>,
}

impl CatalogSummary {
    pub fn pets_for(&self, shelter_id: ShelterId) -> usize {
        self.pets_created
            .iter()
            .filter(|pet| pet.shelter_id == shelter_id)
            .count()
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P, S, R, A>(
        path: P,
        service: &AdoptionService<S, R, A>,
    ) -> Result<CatalogSummary, CatalogImportError>
    where
        P: AsRef<Path>,
        S: ShelterRepository + 'static,
        R: PetRepository + 'static,
        A: ApplicationRepository + 'static,
    {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, service)
    }

    /// Parses the whole roster before writing anything, so a malformed row
    /// leaves the store untouched. Shelters already in the store are matched
    /// by name, ignoring case and repeated whitespace.
    pub fn from_reader<Rd, S, R, A>(
        reader: Rd,
        service: &AdoptionService<S, R, A>,
    ) -> Result<CatalogSummary, CatalogImportError>
    where
        Rd: Read,
        S: ShelterRepository + 'static,
        R: PetRepository + 'static,
        A: ApplicationRepository + 'static,
    {
        let records = parser::parse_records(reader)?;
        let existing = service
            .admin_shelters()
            .map_err(|source| CatalogImportError::Adoption { line: 1, source })?;

        let mut known: HashMap<String, ShelterId> = existing
            .iter()
            .map(|shelter| (shelter_key(&shelter.name), shelter.id))
            .collect();
        let mut summary = CatalogSummary::default();
        let mut reused: Vec<ShelterId> = Vec::new();

        for record in records {
            apply_record(record, service, &mut known, &mut reused, &mut summary)?;
        }

        summary.shelters_reused = reused.len();
        info!(
            shelters_created = summary.shelters_created.len(),
            shelters_reused = summary.shelters_reused,
            pets_created = summary.pets_created.len(),
            "catalog imported"
        );
        Ok(summary)
    }
}

fn apply_record<S, R, A>(
    record: CatalogRecord,
    service: &AdoptionService<S, R, A>,
    known: &mut HashMap<String, ShelterId>,
    reused: &mut Vec<ShelterId>,
    summary: &mut CatalogSummary,
) -> Result<(), CatalogImportError>
where
    S: ShelterRepository + 'static,
    R: PetRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let line = record.line;
    let rejected = |source| CatalogImportError::Adoption { line, source };
    let key = shelter_key(&record.shelter.name);

    let shelter_id = match known.get(&key) {
        Some(id) => {
            let created_here = summary
                .shelters_created
                .iter()
                .any(|shelter| shelter.id == *id);
            if !created_here && !reused.contains(id) {
                reused.push(*id);
            }
            *id
        }
        None => {
            let shelter = service.create_shelter(record.shelter).map_err(rejected)?;
            known.insert(key, shelter.id);
            let id = shelter.id;
            summary.shelters_created.push(shelter);
            id
        }
    };

    if let Some(pet) = record.pet {
        let pet = service.add_pet(shelter_id, pet).map_err(rejected)?;
        summary.pets_created.push(pet);
    }

    Ok(())
}

fn shelter_key(name: &str) -> String {
    parser::collapse_whitespace(name).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::adoption::{InMemoryAdoptionService, NewShelter};
    use std::io::Cursor;

    const ROSTER: &str = "Shelter,City,Foster Program,Rank,Pet,Breed,Age,Adoptable\n\
Aurora shelter,\"Aurora, CO\",no,9,Mr. Pirate,tuxedo shorthair,5,yes\n\
aurora  SHELTER,\"Aurora, CO\",no,9,Clawdia,shorthair,3,yes\n\
RGV animal shelter,\"Harlingen, TX\",no,5,,,,\n\
Fancy pets of Colorado,\"Denver, CO\",yes,10,Lucille Bald,sphynx,8,yes\n";

    #[test]
    fn creates_each_shelter_once() {
        let service = InMemoryAdoptionService::in_memory();
        let summary = CatalogImporter::from_reader(Cursor::new(ROSTER), &service)
            .expect("roster imports");

        assert_eq!(summary.shelters_created.len(), 3);
        assert_eq!(summary.shelters_reused, 0);
        assert_eq!(summary.pets_created.len(), 3);

        let aurora = &summary.shelters_created[0];
        assert_eq!(aurora.name, "Aurora shelter");
        assert_eq!(summary.pets_for(aurora.id), 2);

        let ranked: Vec<_> = service
            .admin_shelters()
            .expect("listing")
            .into_iter()
            .map(|shelter| shelter.rank)
            .collect();
        assert_eq!(ranked, vec![10, 9, 5]);
    }

    #[test]
    fn matches_shelters_already_in_the_store() {
        let service = InMemoryAdoptionService::in_memory();
        service
            .create_shelter(NewShelter {
                name: "Fancy pets of Colorado".to_string(),
                city: "Denver, CO".to_string(),
                foster_program: true,
                rank: 10,
            })
            .expect("created");

        let summary = CatalogImporter::from_reader(Cursor::new(ROSTER), &service)
            .expect("roster imports");
        assert_eq!(summary.shelters_created.len(), 2);
        assert_eq!(summary.shelters_reused, 1);
        assert_eq!(service.admin_shelters().expect("listing").len(), 3);
    }

    #[test]
    fn malformed_rows_leave_the_store_untouched() {
        let service = InMemoryAdoptionService::in_memory();
        let roster = "Shelter,City,Foster Program,Rank,Pet,Breed,Age,Adoptable\n\
Aurora shelter,Aurora,no,9,Clawdia,shorthair,3,yes\n\
Aurora shelter,Aurora,no,high,Mr. Pirate,tuxedo,5,yes\n";

        match CatalogImporter::from_reader(Cursor::new(roster), &service) {
            Err(CatalogImportError::InvalidRow { line, reason }) => {
                assert_eq!(line, 3);
                assert!(reason.contains("rank"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
        assert!(service.admin_shelters().expect("listing").is_empty());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let service = InMemoryAdoptionService::in_memory();
        assert!(matches!(
            CatalogImporter::from_path("/no/such/roster.csv", &service),
            Err(CatalogImportError::Io(_))
        ));
    }
}
