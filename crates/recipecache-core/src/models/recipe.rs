use std::fmt;

use reqwest::Url;
use uuid::Uuid;

/// Which of the two photo references an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Small,
    Large,
}

impl AssetKind {
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Small => "small",
            AssetKind::Large => "large",
        }
    }
}

/// A catalog recipe.
///
/// Textual fields are never absent: a value the upstream source omitted is
/// stored as an empty string. Only the cached image payloads distinguish
/// absent from present.
#[derive(Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: Uuid,
    pub cuisine: String,
    pub name: String,
    pub photo_url_small: String,
    pub photo_url_large: String,
    pub source_url: String,
    pub youtube_url: String,
    pub image_small: Option<Vec<u8>>,
    pub image_large: Option<Vec<u8>>,
}

impl Recipe {
    pub fn new(id: Uuid, cuisine: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            cuisine: cuisine.into(),
            name: name.into(),
            photo_url_small: String::new(),
            photo_url_large: String::new(),
            source_url: String::new(),
            youtube_url: String::new(),
            image_small: None,
            image_large: None,
        }
    }

    pub fn photo_url(&self, kind: AssetKind) -> &str {
        match kind {
            AssetKind::Small => &self.photo_url_small,
            AssetKind::Large => &self.photo_url_large,
        }
    }

    pub fn image(&self, kind: AssetKind) -> Option<&[u8]> {
        match kind {
            AssetKind::Small => self.image_small.as_deref(),
            AssetKind::Large => self.image_large.as_deref(),
        }
    }

    pub fn set_image(&mut self, kind: AssetKind, payload: Vec<u8>) {
        match kind {
            AssetKind::Small => self.image_small = Some(payload),
            AssetKind::Large => self.image_large = Some(payload),
        }
    }

    pub fn row(&self) -> RecipeRow {
        RecipeRow::from(self)
    }
}

// Image payloads can be large, so only their sizes are printed.
impl fmt::Debug for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recipe")
            .field("id", &self.id)
            .field("cuisine", &self.cuisine)
            .field("name", &self.name)
            .field("photo_url_small", &self.photo_url_small)
            .field("photo_url_large", &self.photo_url_large)
            .field("source_url", &self.source_url)
            .field("youtube_url", &self.youtube_url)
            .field("image_small", &self.image_small.as_ref().map(Vec::len))
            .field("image_large", &self.image_large.as_ref().map(Vec::len))
            .finish()
    }
}

/// Read-only list projection of a [`Recipe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeRow {
    pub id: Uuid,
    pub cuisine: String,
    pub name: String,
    pub photo_url_small: String,
}

impl From<&Recipe> for RecipeRow {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id,
            cuisine: recipe.cuisine.clone(),
            name: recipe.name.clone(),
            photo_url_small: recipe.photo_url_small.clone(),
        }
    }
}

impl RecipeRow {
    /// Cuisine with the first letter of each word capitalized
    pub fn display_cuisine(&self) -> String {
        self.cuisine
            .split(' ')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => {
                        let rest: String = chars.flat_map(char::to_lowercase).collect();
                        first.to_uppercase().chain(rest.chars()).collect()
                    }
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Parsed small-photo URL, or None if the reference is not a URL
    pub fn photo_url(&self) -> Option<Url> {
        Url::parse(&self.photo_url_small).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Recipe {
        let mut recipe = Recipe::new(Uuid::new_v4(), "malaysian", "Apam Balik");
        recipe.photo_url_small = "https://example.com/photos/small.jpg".to_string();
        recipe.photo_url_large = "https://example.com/photos/large.jpg".to_string();
        recipe
    }

    #[test]
    fn test_row_projection() {
        let recipe = sample();
        let row = recipe.row();
        assert_eq!(row.id, recipe.id);
        assert_eq!(row.name, "Apam Balik");
        assert_eq!(row.photo_url_small, recipe.photo_url_small);
    }

    #[test]
    fn test_display_cuisine() {
        let mut recipe = sample();
        assert_eq!(recipe.row().display_cuisine(), "Malaysian");

        recipe.cuisine = "NEW zealand".to_string();
        assert_eq!(recipe.row().display_cuisine(), "New Zealand");

        recipe.cuisine = String::new();
        assert_eq!(recipe.row().display_cuisine(), "");
    }

    #[test]
    fn test_row_photo_url() {
        let mut recipe = sample();
        assert!(recipe.row().photo_url().is_some());

        recipe.photo_url_small = "not a url".to_string();
        assert!(recipe.row().photo_url().is_none());
    }

    #[test]
    fn test_set_image() {
        let mut recipe = sample();
        assert!(recipe.image(AssetKind::Large).is_none());
        recipe.set_image(AssetKind::Large, vec![1, 2, 3]);
        assert_eq!(recipe.image(AssetKind::Large), Some(&[1u8, 2, 3][..]));
        assert!(recipe.image(AssetKind::Small).is_none());
    }

    #[test]
    fn test_debug_hides_payload_bytes() {
        let mut recipe = sample();
        recipe.set_image(AssetKind::Small, vec![0; 4096]);
        let printed = format!("{:?}", recipe);
        assert!(printed.contains("image_small: Some(4096)"));
    }
}
