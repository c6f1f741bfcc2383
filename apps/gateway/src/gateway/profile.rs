use tracing::info;

use super::{guarded, or_default, ProfileGateway};
use crate::backend::{Filter, Table};
use crate::errors::GatewayError;
use crate::models::{Profile, ProfileUpdate};

impl ProfileGateway {
    /// The caller's profile, or `None` when signed out, missing, or unreachable.
    pub async fn get_profile(&self) -> Option<Profile> {
        or_default("get profile", async {
            let session = self.session().await?;
            self.find_profile(&session).await
        })
        .await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), GatewayError> {
        guarded("update profile", async {
            let session = self.session().await?;
            let profile = self.require_profile(&session).await?;
            self.backend
                .update(
                    Table::Profiles,
                    serde_json::to_value(update)?,
                    &[Filter::eq("id", profile.id)],
                )
                .await?;
            info!("Updated profile {}", profile.id);
            Ok(())
        })
        .await
    }
}
