use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{require, ValidationError};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a shelter record.
    ShelterId
);
record_id!(
    /// Identifier of a pet record.
    PetId
);
record_id!(
    /// Identifier of an adoption application.
    ApplicationId
);
record_id!(
    /// Identifier of an application/pet join row.
    ApplicationsPetId
);

/// Organization owning pets available for adoption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shelter {
    pub id: ShelterId,
    pub name: String,
    pub city: String,
    pub foster_program: bool,
    pub rank: i32,
}

/// Admin payload for registering a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShelter {
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub foster_program: bool,
    #[serde(default)]
    pub rank: i32,
}

impl NewShelter {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

/// An animal listed by exactly one shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub shelter_id: ShelterId,
    pub name: String,
    pub breed: String,
    pub age: u32,
    pub adoptable: bool,
}

/// Payload for listing a pet under a shelter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPet {
    pub name: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub age: u32,
    #[serde(default = "default_adoptable")]
    pub adoptable: bool,
}

fn default_adoptable() -> bool {
    true
}

impl NewPet {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("name", &self.name)
    }
}

/// Contact details of a prospective adopter.
///
/// Every field is required. The only ways to obtain a value are
/// [`ApplicantDetails::new`] and deserialization, and both validate, so an
/// incomplete applicant never reaches a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ApplicantForm")]
pub struct ApplicantDetails {
    name: String,
    street_address: String,
    city: String,
    state: String,
    zip_code: String,
}

/// Raw, unvalidated applicant input as submitted by a form or JSON body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApplicantForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub street_address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

impl ApplicantDetails {
    pub fn new(
        name: impl Into<String>,
        street_address: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::try_from(ApplicantForm {
            name: name.into(),
            street_address: street_address.into(),
            city: city.into(),
            state: state.into(),
            zip_code: zip_code.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn street_address(&self) -> &str {
        &self.street_address
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }
}

impl TryFrom<ApplicantForm> for ApplicantDetails {
    type Error = ValidationError;

    fn try_from(form: ApplicantForm) -> Result<Self, Self::Error> {
        require("name", &form.name)?;
        require("street_address", &form.street_address)?;
        require("city", &form.city)?;
        require("state", &form.state)?;
        require("zip_code", &form.zip_code)?;

        Ok(Self {
            name: form.name.trim().to_string(),
            street_address: form.street_address.trim().to_string(),
            city: form.city.trim().to_string(),
            state: form.state.trim().to_string(),
            zip_code: form.zip_code.trim().to_string(),
        })
    }
}

/// Stored adoption application. Status changes go through the lifecycle methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: ApplicationId,
    pub applicant: ApplicantDetails,
    pub status: ApplicationStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One (application, pet) pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationsPet {
    pub id: ApplicationsPetId,
    pub application_id: ApplicationId,
    pub pet_id: PetId,
}

/// Status tracked throughout the adoption application workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Unsubmitted,
    InProgress,
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Unsubmitted => "unsubmitted",
            ApplicationStatus::InProgress => "in_progress",
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ApplicationStatus::Unsubmitted => "Unsubmitted",
            ApplicationStatus::InProgress => "In Progress",
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Accepted => "Accepted",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Whether pets may still be attached or removed.
    pub const fn is_editable(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Unsubmitted | ApplicationStatus::InProgress
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Outcome chosen by an administrator for a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Accept,
    Reject,
}
