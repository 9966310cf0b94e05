//! Status transitions for adoption applications.
//!
//! The stored [`ApplicationStatus`] is the single source of truth. The number
//! of attached pets is a precondition checked at transition time and never a
//! second place the status is derived from.

use chrono::{DateTime, Utc};

use super::domain::{
    ApplicantDetails, Application, ApplicationId, ApplicationStatus, PetId, ReviewDecision,
};

/// Rejected status change. The application is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    #[error("application is {status} and can no longer be edited")]
    NotEditable { status: ApplicationStatus },
    #[error("pet {pet_id} is already on this application")]
    AlreadyAttached { pet_id: PetId },
    #[error("pet {pet_id} is not on this application")]
    NotAttached { pet_id: PetId },
    #[error("an application needs at least one pet before it can be submitted")]
    NoPetsAttached,
    #[error("a description is required to submit an application")]
    EmptyDescription,
    #[error("application is {status}; only in-progress applications can be submitted")]
    NotInProgress { status: ApplicationStatus },
    #[error("only pending applications can be reviewed (currently {status})")]
    NotPending { status: ApplicationStatus },
}

impl Application {
    /// A freshly opened application with no pets attached.
    pub fn open(id: ApplicationId, applicant: ApplicantDetails, now: DateTime<Utc>) -> Self {
        Self {
            id,
            applicant,
            status: ApplicationStatus::Unsubmitted,
            description: None,
            created_at: now,
            submitted_at: None,
        }
    }

    pub fn can_search_pets(&self) -> bool {
        self.status.is_editable()
    }

    pub fn can_submit(&self, attached_pets: usize) -> bool {
        self.status == ApplicationStatus::InProgress && attached_pets > 0
    }

    pub fn attach_pet(&mut self, attached: &[PetId], pet_id: PetId) -> Result<(), TransitionError> {
        self.ensure_editable()?;
        if attached.contains(&pet_id) {
            return Err(TransitionError::AlreadyAttached { pet_id });
        }

        if self.status == ApplicationStatus::Unsubmitted {
            self.status = ApplicationStatus::InProgress;
        }
        Ok(())
    }

    pub fn detach_pet(&mut self, attached: &[PetId], pet_id: PetId) -> Result<(), TransitionError> {
        self.ensure_editable()?;
        if !attached.contains(&pet_id) {
            return Err(TransitionError::NotAttached { pet_id });
        }

        if attached.len() == 1 {
            self.status = ApplicationStatus::Unsubmitted;
        }
        Ok(())
    }

    pub fn submit(
        &mut self,
        attached_pets: usize,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        self.ensure_editable()?;
        if attached_pets == 0 {
            return Err(TransitionError::NoPetsAttached);
        }
        if self.status != ApplicationStatus::InProgress {
            return Err(TransitionError::NotInProgress {
                status: self.status,
            });
        }

        let description = description.trim();
        if description.is_empty() {
            return Err(TransitionError::EmptyDescription);
        }

        self.status = ApplicationStatus::Pending;
        self.description = Some(description.to_string());
        self.submitted_at = Some(now);
        Ok(())
    }

    pub fn review(&mut self, decision: ReviewDecision) -> Result<(), TransitionError> {
        if self.status != ApplicationStatus::Pending {
            return Err(TransitionError::NotPending {
                status: self.status,
            });
        }

        self.status = match decision {
            ReviewDecision::Accept => ApplicationStatus::Accepted,
            ReviewDecision::Reject => ApplicationStatus::Rejected,
        };
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), TransitionError> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(TransitionError::NotEditable {
                status: self.status,
            })
        }
    }
}
