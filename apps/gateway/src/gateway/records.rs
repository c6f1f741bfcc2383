//! Child-record CRUD. Projects, certificates and assessments share one code
//! path, parameterized by `ChildRecord`.

use anyhow::anyhow;
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use super::{guarded, or_default, parse_rows, ProfileGateway};
use crate::backend::{BackendError, Filter, Query, Table};
use crate::errors::GatewayError;
use crate::models::{
    Assessment, Certificate, NewAssessment, NewCertificate, NewProject, PortfolioLink, Project,
    ProjectUpdate,
};

pub(crate) trait ChildRecord: DeserializeOwned {
    const TABLE: Table;
    /// Listing key, always descending.
    const ORDER_BY: &'static str;
    const LABEL: &'static str;
}

impl ChildRecord for Project {
    const TABLE: Table = Table::Projects;
    const ORDER_BY: &'static str = "created_at";
    const LABEL: &'static str = "project";
}

impl ChildRecord for Certificate {
    const TABLE: Table = Table::Certificates;
    const ORDER_BY: &'static str = "issued_date";
    const LABEL: &'static str = "certificate";
}

impl ChildRecord for Assessment {
    const TABLE: Table = Table::Assessments;
    const ORDER_BY: &'static str = "created_at";
    const LABEL: &'static str = "assessment";
}

impl ChildRecord for PortfolioLink {
    const TABLE: Table = Table::PortfolioLinks;
    const ORDER_BY: &'static str = "created_at";
    const LABEL: &'static str = "portfolio link";
}

impl ProfileGateway {
    /// Inserts `new` stamped with `profile_id` and the current time.
    pub(crate) async fn insert_row<N: Serialize>(
        &self,
        table: Table,
        profile_id: Uuid,
        new: &N,
    ) -> Result<Value, GatewayError> {
        let mut row = serde_json::to_value(new)?;
        let Some(fields) = row.as_object_mut() else {
            return Err(GatewayError::Internal(anyhow!(
                "{} payload is not an object",
                table.as_str()
            )));
        };
        fields.insert("profile_id".to_string(), json!(profile_id));
        fields.insert("created_at".to_string(), json!(Utc::now()));

        let stored = self.backend.insert(table, row).await?;
        stored.into_iter().next().ok_or_else(|| {
            BackendError::UnexpectedResponse(format!(
                "insert into {} returned no rows",
                table.as_str()
            ))
            .into()
        })
    }

    pub(crate) async fn insert_record<T: ChildRecord, N: Serialize>(
        &self,
        profile_id: Uuid,
        new: &N,
    ) -> Result<T, GatewayError> {
        let row = self.insert_row(T::TABLE, profile_id, new).await?;
        let record = serde_json::from_value(row)?;
        info!("Added {} for profile {profile_id}", T::LABEL);
        Ok(record)
    }

    async fn add_record<T: ChildRecord, N: Serialize>(&self, new: &N) -> Result<T, GatewayError> {
        let session = self.session().await?;
        let profile = self.require_profile(&session).await?;
        self.insert_record(profile.id, new).await
    }

    /// All records of one profile, newest (by the type's key) first.
    pub(crate) async fn records_for<T: ChildRecord>(
        &self,
        profile_id: Uuid,
    ) -> Result<Vec<T>, GatewayError> {
        let rows = self
            .backend
            .select(
                T::TABLE,
                &Query::new()
                    .eq("profile_id", profile_id)
                    .order_desc(T::ORDER_BY),
            )
            .await?;
        parse_rows(rows)
    }

    pub(crate) async fn list_records<T: ChildRecord>(&self) -> Vec<T> {
        or_default(&format!("list {}s", T::LABEL), async {
            let session = self.session().await?;
            let profile = self.require_profile(&session).await?;
            self.records_for(profile.id).await
        })
        .await
    }

    /// Fails with `Forbidden` when ownership is enforced and the row is not
    /// the caller's. Without enforcement any row id is accepted.
    async fn authorize_record(&self, table: Table, id: Uuid) -> Result<(), GatewayError> {
        if !self.options.enforce_ownership {
            return Ok(());
        }
        let session = self.session().await?;
        let profile = self.require_profile(&session).await?;
        let owned = self
            .backend
            .select(
                table,
                &Query::new()
                    .eq("id", id)
                    .eq("profile_id", profile.id)
                    .limit(1),
            )
            .await?;
        if owned.is_empty() {
            return Err(GatewayError::Forbidden);
        }
        Ok(())
    }

    async fn update_record<F: Serialize>(
        &self,
        table: Table,
        id: Uuid,
        fields: &F,
    ) -> Result<(), GatewayError> {
        self.authorize_record(table, id).await?;
        self.backend
            .update(table, serde_json::to_value(fields)?, &[Filter::eq("id", id)])
            .await?;
        info!("Updated {} row {id}", table.as_str());
        Ok(())
    }

    async fn delete_record(&self, table: Table, id: Uuid) -> Result<(), GatewayError> {
        self.authorize_record(table, id).await?;
        self.backend.delete(table, &[Filter::eq("id", id)]).await?;
        info!("Deleted {} row {id}", table.as_str());
        Ok(())
    }

    pub async fn add_project(&self, new: &NewProject) -> Result<Project, GatewayError> {
        guarded("add project", self.add_record(new)).await
    }

    pub async fn list_projects(&self) -> Vec<Project> {
        self.list_records().await
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        update: &ProjectUpdate,
    ) -> Result<(), GatewayError> {
        guarded("update project", self.update_record(Table::Projects, id, update)).await
    }

    pub async fn delete_project(&self, id: Uuid) -> Result<(), GatewayError> {
        guarded("delete project", self.delete_record(Table::Projects, id)).await
    }

    pub async fn add_certificate(&self, new: &NewCertificate) -> Result<Certificate, GatewayError> {
        guarded("add certificate", self.add_record(new)).await
    }

    pub async fn list_certificates(&self) -> Vec<Certificate> {
        self.list_records().await
    }

    pub async fn delete_certificate(&self, id: Uuid) -> Result<(), GatewayError> {
        guarded("delete certificate", self.delete_record(Table::Certificates, id)).await
    }

    pub async fn add_assessment(&self, new: &NewAssessment) -> Result<Assessment, GatewayError> {
        guarded("add assessment", self.add_record(new)).await
    }

    pub async fn list_assessments(&self) -> Vec<Assessment> {
        self.list_records().await
    }

    pub async fn delete_assessment(&self, id: Uuid) -> Result<(), GatewayError> {
        guarded("delete assessment", self.delete_record(Table::Assessments, id)).await
    }
}
