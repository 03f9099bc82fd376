use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use super::Recipe;

/// Envelope returned by the catalog endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RecipesResponse {
    pub recipes: Vec<RecipeTransfer>,
}

/// A recipe as it appears on the wire.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeTransfer {
    pub cuisine: String,
    pub name: String,
    pub uuid: String,
    #[serde(default)]
    pub photo_url_large: Option<String>,
    #[serde(default)]
    pub photo_url_small: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
}

impl RecipeTransfer {
    /// Map to the domain record.
    ///
    /// Missing optional strings become empty strings. A malformed `uuid`
    /// gets a freshly generated identifier instead of failing the decode.
    pub fn to_recipe(&self) -> Recipe {
        let id = match Uuid::parse_str(&self.uuid.to_lowercase()) {
            Ok(id) => id,
            Err(e) => {
                warn!(uuid = %self.uuid, error = %e, "Malformed recipe uuid, generating a new one");
                Uuid::new_v4()
            }
        };

        Recipe {
            id,
            cuisine: self.cuisine.clone(),
            name: self.name.clone(),
            photo_url_small: self.photo_url_small.clone().unwrap_or_default(),
            photo_url_large: self.photo_url_large.clone().unwrap_or_default(),
            source_url: self.source_url.clone().unwrap_or_default(),
            youtube_url: self.youtube_url.clone().unwrap_or_default(),
            image_small: None,
            image_large: None,
        }
    }
}

impl From<RecipeTransfer> for Recipe {
    fn from(transfer: RecipeTransfer) -> Self {
        transfer.to_recipe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let json = r#"{
            "cuisine": "Italian",
            "name": "Pizza Margherita",
            "photo_url_large": "large.jpg",
            "photo_url_small": "small.jpg",
            "uuid": "123e4567-e89b-12d3-a456-426614174000",
            "source_url": "example.com/pizza",
            "youtube_url": "youtube.com/pizza"
        }"#;

        let transfer: RecipeTransfer = serde_json::from_str(json).expect("valid record");
        let recipe = transfer.to_recipe();
        assert_eq!(recipe.cuisine, "Italian");
        assert_eq!(recipe.name, "Pizza Margherita");
        assert_eq!(recipe.photo_url_large, "large.jpg");
        assert_eq!(recipe.photo_url_small, "small.jpg");
        assert_eq!(recipe.id.to_string(), "123e4567-e89b-12d3-a456-426614174000");
        assert_eq!(recipe.source_url, "example.com/pizza");
        assert_eq!(recipe.youtube_url, "youtube.com/pizza");
        assert!(recipe.image_small.is_none());
        assert!(recipe.image_large.is_none());
    }

    #[test]
    fn test_missing_optional_fields_default_to_empty() {
        let json = r#"{
            "cuisine": "British",
            "name": "Bakewell Tart",
            "uuid": "eed6005f-f8c8-451f-98d0-4088e2b40eb6",
            "photo_url_small": "https://example.com/small.jpg"
        }"#;

        let recipe = serde_json::from_str::<RecipeTransfer>(json)
            .expect("optional fields may be absent")
            .to_recipe();
        assert_eq!(recipe.source_url, "");
        assert_eq!(recipe.youtube_url, "");
        assert_eq!(recipe.photo_url_large, "");
        assert_eq!(recipe.photo_url_small, "https://example.com/small.jpg");
    }

    #[test]
    fn test_uppercase_uuid_is_accepted() {
        let transfer = RecipeTransfer {
            cuisine: "French".into(),
            name: "Crepes".into(),
            uuid: "0E65066C-AB20-4DA0-B3BF-79DFD0668049".into(),
            photo_url_large: None,
            photo_url_small: None,
            source_url: None,
            youtube_url: None,
        };
        assert_eq!(
            transfer.to_recipe().id.to_string(),
            "0e65066c-ab20-4da0-b3bf-79dfd0668049"
        );
    }

    #[test]
    fn test_malformed_uuid_gets_fresh_identifier() {
        let transfer = RecipeTransfer {
            cuisine: "Greek".into(),
            name: "Moussaka".into(),
            uuid: "not-a-uuid".into(),
            photo_url_large: None,
            photo_url_small: None,
            source_url: None,
            youtube_url: None,
        };
        let first = transfer.to_recipe();
        let second = transfer.to_recipe();
        assert!(!first.id.is_nil());
        assert_ne!(first.id, second.id);
        assert_eq!(first.name, "Moussaka");
    }

    #[test]
    fn test_missing_required_field_fails() {
        let json = r#"{"cuisine": "Polish", "uuid": "eed6005f-f8c8-451f-98d0-4088e2b40eb6"}"#;
        assert!(serde_json::from_str::<RecipeTransfer>(json).is_err());
    }
}
