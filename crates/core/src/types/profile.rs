//! User profile as returned by the profile API and kept in local storage.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::category::Category;
use super::email::Email;

/// The authenticated user's profile.
///
/// Every field is optional: a freshly signed-up account has none of them, and
/// the profile update endpoint only ever returns a subset. Fields the client
/// does not know about are preserved in `extra` so that writing a profile back
/// to storage never drops data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    /// Date of birth, `DD-MM-YYYY` as returned by the API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    /// URL of the face photo used as the try-on model image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin_tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommended_products: Option<RecommendedProducts>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Overlay `newer` on top of `self`.
    ///
    /// Fields present in `newer` win; fields it leaves out keep their current
    /// value. Unknown fields are merged key by key the same way.
    #[must_use]
    pub fn merge(mut self, newer: Self) -> Self {
        fn overlay<T>(old: &mut Option<T>, new: Option<T>) {
            if new.is_some() {
                *old = new;
            }
        }

        overlay(&mut self.email, newer.email);
        overlay(&mut self.dob, newer.dob);
        overlay(&mut self.gender, newer.gender);
        overlay(&mut self.profile_picture, newer.profile_picture);
        overlay(&mut self.skin_tone, newer.skin_tone);
        overlay(&mut self.country, newer.country);
        overlay(&mut self.recommended_products, newer.recommended_products);
        self.extra.extend(newer.extra);
        self
    }

    /// The profile picture, if set and non-blank.
    #[must_use]
    pub fn model_image(&self) -> Option<&str> {
        self.profile_picture
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Recommended garment URLs for a category, in ranking order.
    #[must_use]
    pub fn recommendations(&self, category: Category) -> &[String] {
        self.recommended_products
            .as_ref()
            .map_or(&[], |r| r.for_category(category))
    }
}

/// Ranked garment image URLs per recommendation key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedProducts {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub wallet: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub jewellery: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub clothing: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub handbag: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub watch: Vec<String>,
}

impl RecommendedProducts {
    /// The list stored under the category's recommendation key.
    #[must_use]
    pub fn for_category(&self, category: Category) -> &[String] {
        match category {
            Category::Handbags => &self.handbag,
            Category::Wallets => &self.wallet,
            Category::Watches => &self.watch,
            Category::Jewellery => &self.jewellery,
            Category::Clothing => &self.clothing,
        }
    }

    /// Mutable access for the category's list.
    pub fn for_category_mut(&mut self, category: Category) -> &mut Vec<String> {
        match category {
            Category::Handbags => &mut self.handbag,
            Category::Wallets => &mut self.wallet,
            Category::Watches => &mut self.watch,
            Category::Jewellery => &mut self.jewellery,
            Category::Clothing => &mut self.clothing,
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_me_response() {
        let profile: UserProfile = serde_json::from_value(json!({
            "email": "shopper@example.com",
            "dob": "14-02-1994",
            "gender": "female",
            "profile_picture": "https://cdn.example.com/face.jpg",
            "recommended_products": {
                "handbag": ["https://cdn.example.com/h1.jpg"],
                "watch": null
            },
            "message": "ok"
        }))
        .unwrap();

        assert_eq!(profile.email.unwrap().as_str(), "shopper@example.com");
        assert_eq!(profile.dob.as_deref(), Some("14-02-1994"));
        let recs = profile.recommended_products.unwrap();
        assert_eq!(recs.handbag.len(), 1);
        assert!(recs.watch.is_empty());
        assert!(recs.wallet.is_empty());
        assert_eq!(profile.extra.get("message"), Some(&json!("ok")));
    }

    #[test]
    fn test_merge_newer_fields_win_and_absent_fields_survive() {
        let old = UserProfile {
            dob: Some("01-01-1990".to_owned()),
            gender: Some("male".to_owned()),
            country: Some("IN".to_owned()),
            ..UserProfile::default()
        };
        let newer = UserProfile {
            gender: Some("female".to_owned()),
            profile_picture: Some("https://cdn.example.com/new.jpg".to_owned()),
            ..UserProfile::default()
        };

        let merged = old.merge(newer);
        assert_eq!(merged.dob.as_deref(), Some("01-01-1990"));
        assert_eq!(merged.gender.as_deref(), Some("female"));
        assert_eq!(merged.country.as_deref(), Some("IN"));
        assert_eq!(
            merged.profile_picture.as_deref(),
            Some("https://cdn.example.com/new.jpg")
        );
    }

    #[test]
    fn test_model_image_ignores_blank_picture() {
        let mut profile = UserProfile {
            profile_picture: Some("  ".to_owned()),
            ..UserProfile::default()
        };
        assert_eq!(profile.model_image(), None);

        profile.profile_picture = Some("https://cdn.example.com/face.jpg".to_owned());
        assert_eq!(
            profile.model_image(),
            Some("https://cdn.example.com/face.jpg")
        );
    }

    #[test]
    fn test_recommendations_use_singular_key() {
        let mut recs = RecommendedProducts::default();
        recs.for_category_mut(Category::Handbags)
            .push("https://cdn.example.com/h1.jpg".to_owned());
        let profile = UserProfile {
            recommended_products: Some(recs),
            ..UserProfile::default()
        };

        assert_eq!(profile.recommendations(Category::Handbags).len(), 1);
        assert!(profile.recommendations(Category::Wallets).is_empty());
    }

    #[test]
    fn test_serialize_skips_absent_fields() {
        let profile = UserProfile {
            gender: Some("female".to_owned()),
            ..UserProfile::default()
        };
        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({"gender": "female"})
        );
    }
}
