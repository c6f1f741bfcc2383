use serde::Serialize;
use tracing::{info, warn};

use super::{guarded, or_default, ProfileGateway};
use crate::backend::Table;
use crate::errors::GatewayError;
use crate::models::{Assessment, Certificate, NewCvGenerationLog, Project};
use crate::render::{render_cv, CvDocument};

#[derive(Debug, Clone, Serialize)]
pub struct GeneratedCv {
    pub html: String,
}

impl ProfileGateway {
    /// Renders the caller's CV and appends an audit row to the generation log.
    ///
    /// Fetches run strictly in order: profile, projects, certificates,
    /// assessments, then the log write. A failed list fetch renders as an
    /// empty section; a failed log write is only logged.
    pub async fn generate_cv(&self) -> Result<GeneratedCv, GatewayError> {
        guarded("generate CV", async {
            let session = self.session().await?;
            let profile = self.require_profile(&session).await?;

            let projects: Vec<Project> =
                or_default("list projects", self.records_for(profile.id)).await;
            let certificates: Vec<Certificate> =
                or_default("list certificates", self.records_for(profile.id)).await;
            let assessments: Vec<Assessment> =
                or_default("list assessments", self.records_for(profile.id)).await;

            let html = render_cv(&CvDocument {
                profile: &profile,
                projects: &projects,
                certificates: &certificates,
                assessments: &assessments,
            });

            // summary and URL stay empty until an enrichment step fills them
            let log = NewCvGenerationLog {
                ai_summary: None,
                generated_url: None,
            };
            if let Err(e) = self
                .insert_row(Table::CvGeneratorLogs, profile.id, &log)
                .await
            {
                warn!("Could not record CV generation for {}: {e}", profile.id);
            }

            info!(
                "Generated CV for profile {} ({} projects, {} certificates, {} assessments)",
                profile.id,
                projects.len(),
                certificates.len(),
                assessments.len()
            );
            Ok(GeneratedCv { html })
        })
        .await
    }
}
