//! Evaluation requests and their validation

use crate::error::{IcpError, Result};
use crate::input::{text_extractor, UploadedDocument};

const PROFILE_URL_NOTICE: &str = "Profile URLs cannot be read automatically yet. \
Paste the profile text as the about text or upload a resume instead.";

/// The three texts that go into one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationRequest {
    pub job_description: String,
    pub about_text: String,
    pub resume_text: String,
}

impl EvaluationRequest {
    pub fn new(
        job_description: impl Into<String>,
        about_text: impl Into<String>,
        resume_text: impl Into<String>,
    ) -> Self {
        Self {
            job_description: job_description.into(),
            about_text: about_text.into(),
            resume_text: resume_text.into(),
        }
    }

    /// Requires a job description and at least one candidate text.
    pub fn validate(&self) -> Result<()> {
        if self.job_description.trim().is_empty() {
            return Err(IcpError::Validation(
                "Please provide a Job Description (JD).".to_string(),
            ));
        }
        if self.about_text.trim().is_empty() && self.resume_text.trim().is_empty() {
            return Err(IcpError::Validation(
                "Please provide candidate about text or upload a resume.".to_string(),
            ));
        }
        Ok(())
    }
}

/// Raw user input before extraction.
#[derive(Debug, Clone, Default)]
pub struct EvaluationInputs {
    pub job_description_text: Option<String>,
    pub job_description_document: Option<UploadedDocument>,
    pub about_text: Option<String>,
    pub resume_document: Option<UploadedDocument>,
    pub profile_url: Option<String>,
}

impl EvaluationInputs {
    pub fn profile_url_notice(&self) -> Option<&'static str> {
        self.profile_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|_| PROFILE_URL_NOTICE)
    }

    /// Extracts uploads and validates. Pasted JD text wins over a JD document,
    /// which is then not read at all.
    pub fn into_request(self) -> Result<EvaluationRequest> {
        let job_description = match self.job_description_text.filter(|t| !t.trim().is_empty()) {
            Some(text) => text,
            None => text_extractor::extract(self.job_description_document.as_ref())?,
        };
        let resume_text = text_extractor::extract(self.resume_document.as_ref())?;

        let request = EvaluationRequest {
            job_description,
            about_text: self.about_text.unwrap_or_default(),
            resume_text,
        };
        request.validate()?;
        Ok(request)
    }
}
