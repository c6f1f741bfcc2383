use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// One row of `profiles`, keyed by the auth account's id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Row written at registration.
#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub user_id: Uuid,
    pub email: String,
    pub full_name: String,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// The five editable profile fields. All five are written on every update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProfileUpdate {
    pub full_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub interests: Vec<String>,
}

/// Postgres array columns come back as `null` when never set.
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_profile_tolerates_null_arrays_and_missing_fields() {
        let profile: Profile = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "user_id": Uuid::new_v4(),
            "email": "jane@example.com",
            "full_name": "Jane Doe",
            "skills": null
        }))
        .unwrap();
        assert!(profile.skills.is_empty());
        assert!(profile.interests.is_empty());
        assert!(profile.bio.is_none());
    }

    #[test]
    fn test_profile_update_defaults_lists_when_omitted() {
        let update: ProfileUpdate = serde_json::from_value(json!({
            "full_name": "Jane Doe",
            "bio": "Builds compilers"
        }))
        .unwrap();
        assert_eq!(update.skills, Vec::<String>::new());
        assert_eq!(update.interests, Vec::<String>::new());

        // exactly five fields go to the backend, unset ones as null
        let sent = serde_json::to_value(&update).unwrap();
        let keys: Vec<_> = sent.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys.len(), 5);
        assert!(sent["phone"].is_null());
    }
}
