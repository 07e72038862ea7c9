// ABOUTME: Shared domain types for the Nutrio coaching platform
// ABOUTME: Defines Role, MacroNutrients, Ingredient, MealSlot and their string mappings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! Core data models shared across database managers, routes, and the LLM
//! normalization layer.

use serde::{Deserialize, Serialize};

/// Role of an authenticated user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Nutritionist managing clients, dishes, and menus
    Specialist,
    /// Coached client with a profile, journal, and chat access
    Client,
}

impl Role {
    /// Convert to string representation for claims and database columns
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Specialist => "specialist",
            Self::Client => "client",
        }
    }

    /// Parse from the string representation used in token claims
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "specialist" => Some(Self::Specialist),
            "client" => Some(Self::Client),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Macro-nutrient estimate for a dish or a full day
///
/// All values are per serving unless stated otherwise by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroNutrients {
    /// Energy in kilocalories
    pub kcal: Option<f64>,
    /// Protein in grams
    pub protein_g: Option<f64>,
    /// Fat in grams
    pub fat_g: Option<f64>,
    /// Carbohydrates in grams
    pub carbs_g: Option<f64>,
}

impl MacroNutrients {
    /// True when no component has a value
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kcal.is_none()
            && self.protein_g.is_none()
            && self.fat_g.is_none()
            && self.carbs_g.is_none()
    }
}

/// A single ingredient line in a dish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name
    pub name: String,
    /// Quantity in the given unit
    pub quantity: Option<f64>,
    /// Unit of measure (g, ml, piece, tbsp, ...)
    pub unit: Option<String>,
}

/// Meal slot within a menu day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    /// Stable ordering used when assembling a day's slots
    #[must_use]
    pub const fn order(&self) -> i64 {
        match self {
            Self::Breakfast => 0,
            Self::Lunch => 1,
            Self::Dinner => 2,
            Self::Snack => 3,
        }
    }

    /// Convert to the string representation stored in the database
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }

    /// Parse from the stored string representation
    #[must_use]
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "breakfast" => Some(Self::Breakfast),
            "lunch" => Some(Self::Lunch),
            "dinner" => Some(Self::Dinner),
            "snack" => Some(Self::Snack),
            _ => None,
        }
    }
}

impl std::fmt::Display for MealSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str_opt("specialist"), Some(Role::Specialist));
        assert_eq!(Role::from_str_opt("client"), Some(Role::Client));
        assert_eq!(Role::from_str_opt("admin"), None);
        assert_eq!(Role::Specialist.as_str(), "specialist");
    }

    #[test]
    fn test_meal_slot_ordering() {
        assert!(MealSlot::Breakfast.order() < MealSlot::Lunch.order());
        assert!(MealSlot::Lunch.order() < MealSlot::Dinner.order());
        assert!(MealSlot::Dinner.order() < MealSlot::Snack.order());
    }

    #[test]
    fn test_macros_is_empty() {
        assert!(MacroNutrients::default().is_empty());
        let filled = MacroNutrients {
            kcal: Some(420.0),
            ..MacroNutrients::default()
        };
        assert!(!filled.is_empty());
    }
}
