use metrics_exporter_prometheus::PrometheusHandle;
use petharbor::error::AppError;
use petharbor::workflows::adoption::InMemoryAdoptionService;
use petharbor::workflows::catalog::{CatalogImporter, CatalogSummary};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Roster used by the demo when no CSV is supplied.
pub(crate) const SAMPLE_ROSTER: &str = "\
Shelter,City,Foster Program,Rank,Pet,Breed,Age,Adoptable
Mystery Building,Irvine CA,no,9,Scooby,Great Dane,2,yes
Mystery Building,Irvine CA,no,9,Scrappy,Great Dane,1,yes
Mystery Building,Irvine CA,no,9,Daisy,American Bully,4,yes
Aurora shelter,\"Aurora, CO\",no,8,Mr. Pirate,tuxedo shorthair,5,yes
Aurora shelter,\"Aurora, CO\",no,8,Clawdia,shorthair,3,yes
RGV animal shelter,\"Harlingen, TX\",no,5,,,,
Fancy pets of Colorado,\"Denver, CO\",yes,10,Lucille Bald,sphynx,8,yes
";

/// In-memory service, optionally seeded from a roster CSV on disk.
pub(crate) fn seeded_service(
    catalog: Option<&Path>,
) -> Result<Arc<InMemoryAdoptionService>, AppError> {
    let service = InMemoryAdoptionService::in_memory();
    if let Some(path) = catalog {
        let summary = CatalogImporter::from_path(path, &service)?;
        info!(
            path = %path.display(),
            shelters = summary.shelters_created.len(),
            pets = summary.pets_created.len(),
            "catalog seeded"
        );
    }
    Ok(Arc::new(service))
}

/// In-memory service seeded from `catalog`, or from [`SAMPLE_ROSTER`] when absent.
pub(crate) fn demo_service(
    catalog: Option<&Path>,
) -> Result<(InMemoryAdoptionService, CatalogSummary), AppError> {
    let service = InMemoryAdoptionService::in_memory();
    let summary = match catalog {
        Some(path) => CatalogImporter::from_path(path, &service)?,
        None => CatalogImporter::from_reader(SAMPLE_ROSTER.as_bytes(), &service)?,
    };
    Ok((service, summary))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_roster_imports_cleanly() {
        let (service, summary) = demo_service(None).expect("sample roster imports");
        assert_eq!(summary.shelters_created.len(), 4);
        assert_eq!(summary.pets_created.len(), 6);
        let top = service.admin_shelters().expect("listing");
        assert_eq!(top[0].name, "Fancy pets of Colorado");
    }

    #[test]
    fn unseeded_service_starts_empty() {
        let service = seeded_service(None).expect("service builds");
        assert!(service.admin_shelters().expect("listing").is_empty());
    }
}
