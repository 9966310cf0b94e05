use crate::infra::demo_service;
use clap::Args;
use petharbor::error::AppError;
use petharbor::workflows::adoption::{
    ApplicantDetails, ApplicationView, InMemoryAdoptionService, PetSearch, ReviewDecision,
    ShelterView,
};
use petharbor::workflows::catalog::{CatalogImporter, CatalogSummary};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    /// Shelter roster CSV (Shelter,City,Foster Program,Rank,Pet,Breed,Age,Adoptable)
    pub(crate) csv: PathBuf,
    /// Print the admin shelter listing as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Shelter roster CSV to search. Defaults to a small built-in roster.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Pet name fragment to search for
    #[arg(long, default_value = "scr")]
    pub(crate) find_pet: String,
    /// Description submitted with the application
    #[arg(
        long,
        default_value = "Fenced yard, two retired adults, and plenty of time for walks."
    )]
    pub(crate) description: String,
    /// Reject the application instead of accepting it
    #[arg(long)]
    pub(crate) reject: bool,
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let ImportArgs { csv, json } = args;

    let service = InMemoryAdoptionService::in_memory();
    let summary = CatalogImporter::from_path(&csv, &service)?;
    let shelters = service.admin_shelters()?;

    if json {
        let rows: Vec<ShelterView> = shelters.iter().map(ShelterView::from).collect();
        match serde_json::to_string_pretty(&rows) {
            Ok(payload) => println!("{payload}"),
            Err(err) => println!("Shelter listing unavailable: {err}"),
        }
        return Ok(());
    }

    println!("Imported {}", csv.display());
    render_summary(&summary);
    println!("\nAdmin shelter listing (highest rank first)");
    for shelter in &shelters {
        println!(
            "- [{}] {} ({}) foster program: {} | {} pets",
            shelter.rank,
            shelter.name,
            shelter.city,
            if shelter.foster_program { "yes" } else { "no" },
            summary.pets_for(shelter.id)
        );
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        catalog,
        find_pet,
        description,
        reject,
    } = args;

    println!("PetHarbor adoption demo");
    let (service, summary) = demo_service(catalog.as_deref())?;
    render_summary(&summary);

    let applicant = match ApplicantDetails::new(
        "Professor T",
        "123 Turing Ave",
        "Denver",
        "CO",
        "80203",
    ) {
        Ok(applicant) => applicant,
        Err(err) => {
            println!("  Applicant rejected: {err}");
            return Ok(());
        }
    };
    let application = service.open_application(applicant)?;
    let id = application.id;
    render_view("Opened application", &service.application_view(id, &PetSearch::default())?);

    let search = PetSearch::named(find_pet.clone());
    let results = service.search_pets(id, &search)?;
    println!("\nSearch for '{find_pet}': {} match(es)", results.len());
    for pet in &results {
        println!("  - #{} {} ({}, {} yrs)", pet.id, pet.name, pet.breed, pet.age);
    }

    let Some(chosen) = results.first() else {
        println!("  Nothing to adopt; try another --find-pet value");
        return Ok(());
    };

    let detail = service.attach_pet(id, chosen.id)?;
    render_view("Adopt this pet", &ApplicationView::from(&detail));

    if let Err(err) = service.submit(id, "") {
        println!("\nSubmitting without a description is refused: {err}");
    }

    let detail = service.submit(id, &description)?;
    render_view("Submitted", &ApplicationView::from(&detail));
    let after = service.application_view(id, &search)?;
    println!(
        "  Search offered after submission: {}",
        if after.search_results.is_some() { "yes" } else { "no" }
    );

    let decision = if reject {
        ReviewDecision::Reject
    } else {
        ReviewDecision::Accept
    };
    let detail = service.review(id, decision)?;
    render_view("Admin review", &ApplicationView::from(&detail));

    match serde_json::to_string_pretty(&ApplicationView::from(&detail)) {
        Ok(json) => println!("\nFinal application payload:\n{json}"),
        Err(err) => println!("\nFinal application payload unavailable: {err}"),
    }

    Ok(())
}

fn render_summary(summary: &CatalogSummary) {
    println!(
        "Catalog: {} shelters created, {} matched existing, {} pets listed",
        summary.shelters_created.len(),
        summary.shelters_reused,
        summary.pets_created.len()
    );
}

fn render_view(step: &str, view: &ApplicationView) {
    println!("\n{step}: application #{} for {}", view.id, view.name);
    println!("  Status: {}", view.status_label);
    if view.pets.is_empty() {
        println!("  Pets: none yet");
    } else {
        let names: Vec<&str> = view.pets.iter().map(|pet| pet.name.as_str()).collect();
        println!("  Pets: {}", names.join(", "));
    }
    println!(
        "  Pet search: {} | Submit form: {}",
        if view.can_search_pets { "shown" } else { "hidden" },
        if view.can_submit { "shown" } else { "hidden" }
    );
    if let Some(description) = &view.description {
        println!("  Description: {description}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_args() -> DemoArgs {
        DemoArgs {
            catalog: None,
            find_pet: "scr".to_string(),
            description: "Fenced yard".to_string(),
            reject: false,
        }
    }

    #[test]
    fn demo_runs_against_the_sample_roster() {
        run_demo(demo_args()).expect("demo completes");
    }

    #[test]
    fn demo_tolerates_searches_without_matches() {
        let mut args = demo_args();
        args.find_pet = "Moose".to_string();
        run_demo(args).expect("demo completes");
    }

    #[test]
    fn import_reports_missing_files() {
        let result = run_import(ImportArgs {
            csv: PathBuf::from("/no/such/roster.csv"),
            json: false,
        });
        assert!(matches!(result, Err(AppError::Catalog(_))));
    }
}
