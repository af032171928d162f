//! Personal-data wizard: form, review, confirm.
//!
//! The pending draft lives in the session store between steps; the confirmed
//! record is persisted in the local store and handed back as a `data.json`
//! download.

use crate::validation::{FieldError, ValidationErrors, check_email, check_length, parse_whole_number};
use tracing::{info, warn};
use vt_storage::{KeyValueStore, load_json, save_json};
use vt_types::{LAST_SUBMISSION_KEY, PENDING_SUBMISSION_KEY, Submission, SubmissionDraft};

pub const DOWNLOAD_FILE_NAME: &str = "data.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    Form,
    Review,
    Done,
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("nothing to confirm; fill in the form first")]
    NothingPending,
    #[error("invalid data, go back and fix it")]
    Invalid(ValidationErrors),
    #[error("failed to encode submission: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub contents: String,
}

pub fn validate_submission(draft: &SubmissionDraft) -> Result<Submission, ValidationErrors> {
    let mut errors = Vec::new();
    errors.extend(check_length("nome", &draft.nome));
    errors.extend(check_length("sobrenome", &draft.sobrenome));
    errors.extend(check_email("email", &draft.email));
    let idade = parse_whole_number(&draft.idade);
    if idade.is_none() {
        errors.push(FieldError::WholeNumber {
            field: "idade",
            max: crate::validation::MAX_AGE,
        });
    }

    match idade {
        Some(idade) if errors.is_empty() => Ok(Submission {
            nome: draft.nome.trim().to_owned(),
            sobrenome: draft.sobrenome.trim().to_owned(),
            email: draft.email.trim().to_owned(),
            idade,
        }),
        _ => Err(ValidationErrors::from(errors)),
    }
}

pub struct Wizard<L, P> {
    local: L,
    session: P,
    step: WizardStep,
}

impl<L, P> Wizard<L, P>
where
    L: KeyValueStore,
    P: KeyValueStore,
{
    /// Starts on the review step when a pending draft survived a reload.
    pub fn new(local: L, session: P) -> Self {
        let pending = load_json::<SubmissionDraft, _>(&session, PENDING_SUBMISSION_KEY);
        let step = if pending.is_some() {
            WizardStep::Review
        } else {
            WizardStep::Form
        };
        Self {
            local,
            session,
            step,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Validate the form and keep the raw values for review.
    pub fn submit(&mut self, draft: &SubmissionDraft) -> Result<(), ValidationErrors> {
        validate_submission(draft)?;
        save_json(&self.session, PENDING_SUBMISSION_KEY, draft);
        self.step = WizardStep::Review;
        Ok(())
    }

    pub fn review(&self) -> Option<SubmissionDraft> {
        load_json(&self.session, PENDING_SUBMISSION_KEY)
    }

    /// Values to pre-fill the form with: the pending draft, else the last
    /// confirmed submission.
    pub fn prefill(&self) -> Option<SubmissionDraft> {
        self.review().or_else(|| {
            load_json::<Submission, _>(&self.local, LAST_SUBMISSION_KEY).map(SubmissionDraft::from)
        })
    }

    /// Back to the form, keeping the pending draft for pre-filling.
    pub fn edit(&mut self) -> Option<SubmissionDraft> {
        self.step = WizardStep::Form;
        self.prefill()
    }

    pub fn confirm(&mut self) -> Result<DownloadArtifact, WizardError> {
        let draft = self.review().ok_or(WizardError::NothingPending)?;
        let submission = validate_submission(&draft).map_err(|errors| {
            warn!(%errors, "pending submission failed validation");
            WizardError::Invalid(errors)
        })?;

        let contents = serde_json::to_string_pretty(&submission)?;
        save_json(&self.local, LAST_SUBMISSION_KEY, &submission);
        if let Err(err) = self.session.remove(PENDING_SUBMISSION_KEY) {
            warn!(error = %err, "failed to clear pending submission");
        }
        self.step = WizardStep::Done;
        info!(email = %submission.email, "submission confirmed");

        Ok(DownloadArtifact {
            file_name: DOWNLOAD_FILE_NAME.to_owned(),
            contents,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vt_storage::InMemoryStore;

    fn draft() -> SubmissionDraft {
        SubmissionDraft {
            nome: " Maria ".into(),
            sobrenome: "Oliveira".into(),
            email: "maria@example.com".into(),
            idade: "42".into(),
        }
    }

    #[test]
    fn invalid_submit_stays_on_form() {
        let mut wizard = Wizard::new(InMemoryStore::new(), InMemoryStore::new());
        let bad = SubmissionDraft {
            nome: "Jo".into(),
            idade: "".into(),
            ..draft()
        };
        let errors = wizard.submit(&bad).unwrap_err();
        assert!(errors.has_field("nome"));
        assert!(errors.has_field("idade"));
        assert_eq!(wizard.step(), WizardStep::Form);
        assert!(wizard.review().is_none());
    }

    #[test]
    fn submit_review_confirm() {
        let mut wizard = Wizard::new(InMemoryStore::new(), InMemoryStore::new());
        wizard.submit(&draft()).unwrap();
        assert_eq!(wizard.step(), WizardStep::Review);
        assert_eq!(wizard.review(), Some(draft()));

        let artifact = wizard.confirm().unwrap();
        assert_eq!(artifact.file_name, "data.json");
        let saved: Submission = serde_json::from_str(&artifact.contents).unwrap();
        assert_eq!(
            saved,
            Submission {
                nome: "Maria".into(),
                sobrenome: "Oliveira".into(),
                email: "maria@example.com".into(),
                idade: 42,
            }
        );
        assert!(artifact.contents.contains("\n  \"nome\": \"Maria\""));
        assert!(wizard.review().is_none());
        assert_eq!(wizard.step(), WizardStep::Done);
        assert_eq!(load_json::<Submission, _>(&wizard.local, LAST_SUBMISSION_KEY), Some(saved));
    }

    #[test]
    fn confirm_without_pending_fails() {
        let mut wizard = Wizard::new(InMemoryStore::new(), InMemoryStore::new());
        assert!(matches!(wizard.confirm(), Err(WizardError::NothingPending)));
    }

    #[test]
    fn confirm_revalidates_tampered_draft() {
        let session = InMemoryStore::new();
        save_json(&session, PENDING_SUBMISSION_KEY, &SubmissionDraft { idade: "200".into(), ..draft() });
        let mut wizard = Wizard::new(InMemoryStore::new(), session);
        assert_eq!(wizard.step(), WizardStep::Review);
        assert!(matches!(wizard.confirm(), Err(WizardError::Invalid(_))));
        assert!(wizard.review().is_some());
    }

    #[test]
    fn prefill_falls_back_to_last_submission() {
        let mut wizard = Wizard::new(InMemoryStore::new(), InMemoryStore::new());
        assert!(wizard.prefill().is_none());
        wizard.submit(&draft()).unwrap();
        wizard.confirm().unwrap();

        let prefill = wizard.edit().unwrap();
        assert_eq!(prefill.nome, "Maria");
        assert_eq!(prefill.idade, "42");
        assert_eq!(wizard.step(), WizardStep::Form);
    }
}
