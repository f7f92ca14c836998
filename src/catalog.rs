//! Drink catalog entities
//!
//! Fields the client knows about are typed; everything else the server sends is
//! kept in `extra` and written back unchanged.

use crate::resource::Resource;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const LOCALE_EN_GB: &str = "en-GB";
pub const LOCALE_ET_EE: &str = "ee-ET";
pub const LOCALE_RU_RU: &str = "ru-RU";

/// Text keyed by locale code
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text under the default locale only, the other locales left empty
    pub fn en_gb_only(text: impl Into<String>) -> Self {
        Self::new()
            .with(LOCALE_EN_GB, text)
            .with(LOCALE_ET_EE, "")
            .with(LOCALE_RU_RU, "")
    }

    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    pub fn en_gb(&self) -> Option<&str> {
        self.get(LOCALE_EN_GB)
    }

    pub fn locales(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrinkType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource for DrinkType {
    const PATH: &'static str = "drinktypes";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_path: Option<String>,
    /// Read-only usage counter; an ingredient in use cannot be deleted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredient_in_cocktails_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ingredient {
    pub fn is_in_use(&self) -> bool {
        self.ingredient_in_cocktails_count.unwrap_or(0) > 0
    }
}

impl Resource for Ingredient {
    const PATH: &'static str = "ingredients";
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailIngredient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub ingredient_name: LocalizedText,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub amount_unit_name: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailDrink {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub drink_name: LocalizedText,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub amount_unit_name: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CocktailStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub index_number: u32,
    pub description: LocalizedText,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cocktail {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_path: Option<String>,
    #[serde(default)]
    pub is_alcoholic: bool,
    #[serde(default)]
    pub ingredient_in_cocktails: Vec<CocktailIngredient>,
    #[serde(default)]
    pub drinks_in_cocktails: Vec<CocktailDrink>,
    #[serde(default)]
    pub steps: Vec<CocktailStep>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Cocktail {
    /// Steps in preparation order
    pub fn ordered_steps(&self) -> Vec<&CocktailStep> {
        let mut steps: Vec<&CocktailStep> = self.steps.iter().collect();
        steps.sort_by_key(|step| step.index_number);
        steps
    }
}

impl Resource for Cocktail {
    const PATH: &'static str = "cocktails";
}
