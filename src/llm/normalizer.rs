// ABOUTME: LLM output normalization - JSON extraction and field coercion
// ABOUTME: Turns raw completion text into typed drafts, nulling anything that fails checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! # Output Normalizer
//!
//! Language models return prose around their JSON more often than not. This
//! module extracts a JSON object from a raw completion and coerces its fields
//! into the application's draft types.
//!
//! Extraction runs a strategy cascade, each step cheaper to satisfy than the
//! last:
//!
//! 1. Direct parse (clean JSON output)
//! 2. Markdown fence extraction (```json ... ```)
//! 3. First-`{`-to-last-`}` span
//! 4. Depth-aware scan with truncation repair (append missing closers)
//!
//! Coercion is lenient by design: recognized fields are converted when the
//! value is usable (numbers from numeric strings, lists from single values)
//! and dropped to `None` otherwise. Extraction and coercion never panic on
//! malformed input; failures surface as [`NormalizeError`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::errors::AppError;

/// Errors produced while normalizing a completion
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NormalizeError {
    /// The completion was empty or whitespace
    #[error("completion was empty")]
    EmptyCompletion,

    /// No JSON object could be located in the completion
    #[error("no JSON object found in completion ({0} bytes analyzed)")]
    NoJsonFound(usize),

    /// A JSON document was found but it is not an object
    #[error("completion JSON is not an object")]
    NotAnObject,
}

impl From<NormalizeError> for AppError {
    fn from(error: NormalizeError) -> Self {
        Self::llm_output_invalid(error.to_string())
    }
}

// ============================================================================
// JSON Extraction
// ============================================================================

/// Extract a JSON object from raw completion text
///
/// Tolerates markdown fences, leading/trailing prose, and truncated output.
///
/// # Errors
///
/// Returns [`NormalizeError::EmptyCompletion`] for blank input,
/// [`NormalizeError::NoJsonFound`] when no balanced object can be recovered,
/// and [`NormalizeError::NotAnObject`] when the document parses to something
/// other than an object.
pub fn extract_json(raw: &str) -> Result<Value, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::EmptyCompletion);
    }

    // Strategy 1: the whole completion is already JSON
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return require_object(value);
    }

    // Strategy 2: fenced code block
    if let Some(inner) = extract_fenced_block(trimmed) {
        if let Ok(value) = serde_json::from_str::<Value>(inner.trim()) {
            return require_object(value);
        }
        // A fence may itself hold prose around the object; fall through with
        // the inner text so the span strategies see less noise.
        if let Ok(value) = extract_json_span(inner.trim()) {
            return require_object(value);
        }
    }

    // Strategy 3: first-{ to last-} span
    if let Ok(value) = extract_json_span(trimmed) {
        return require_object(value);
    }

    // Strategy 4: depth-aware scan with truncation repair
    if let Some(value) = extract_balanced_or_repaired(trimmed) {
        debug!("Completion JSON recovered by depth scan");
        return require_object(value);
    }

    Err(NormalizeError::NoJsonFound(raw.len()))
}

fn require_object(value: Value) -> Result<Value, NormalizeError> {
    if value.is_object() {
        Ok(value)
    } else {
        Err(NormalizeError::NotAnObject)
    }
}

/// Pull the contents of the first fenced code block, tolerating a missing
/// closing fence
fn extract_fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    // Skip an info string like `json` up to the first newline
    let content_start = after_fence.find('\n').map_or(0, |i| i + 1);
    let content = &after_fence[content_start..];

    match content.find("```") {
        Some(end) => Some(&content[..end]),
        None => Some(content),
    }
}

/// Parse the span between the first `{` and the last `}`
fn extract_json_span(text: &str) -> Result<Value, NormalizeError> {
    let start = text.find('{').ok_or(NormalizeError::NoJsonFound(text.len()))?;
    let end = text.rfind('}').ok_or(NormalizeError::NoJsonFound(text.len()))?;
    if end <= start {
        return Err(NormalizeError::NoJsonFound(text.len()));
    }

    serde_json::from_str::<Value>(&text[start..=end])
        .map_err(|_| NormalizeError::NoJsonFound(text.len()))
}

/// Scan from the first `{` tracking brace depth through strings and escapes.
///
/// When the object closes, parse that region. When input ends mid-object
/// (truncated completion), append the missing closers and try again.
fn extract_balanced_or_repaired(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let region = &text[start..];

    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;
    let mut stack: Vec<char> = Vec::new();

    for (i, c) in region.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' | '[' if !in_string => {
                stack.push(if c == '{' { '}' } else { ']' });
                depth += 1;
            }
            '}' | ']' if !in_string => {
                stack.pop();
                depth -= 1;
                if depth == 0 {
                    let candidate = &region[..=i];
                    return serde_json::from_str::<Value>(candidate).ok();
                }
            }
            _ => {}
        }
    }

    // Truncated: close an open string, drop a dangling partial token, and
    // append the missing closers in reverse nesting order. A region with no
    // key/value separator is noise, not a truncated object.
    if !region.contains(':') {
        return None;
    }
    let mut repaired = region.trim_end().to_owned();
    if in_string {
        repaired.push('"');
    }
    let repaired_trimmed = repaired
        .trim_end_matches(|c: char| c == ',' || c == ':' || c.is_whitespace())
        .to_owned();
    let mut candidate = repaired_trimmed;
    while let Some(closer) = stack.pop() {
        candidate.push(closer);
    }

    serde_json::from_str::<Value>(&candidate).ok()
}

// ============================================================================
// Field Coercion
// ============================================================================

/// Coerce a value into a non-empty string
///
/// Accepts strings and bare numbers; everything else is dropped.
fn coerce_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_owned())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerce a value into a finite f64
///
/// Accepts numbers and numeric strings ("420", "420 kcal" is rejected).
fn coerce_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

/// Coerce a value into an i64
fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Coerce a value into a list of strings
///
/// Accepts arrays (dropping non-string members) and single strings.
fn coerce_string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(coerce_string).collect(),
        Value::String(_) => coerce_string(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// Look up the first present key among aliases
fn field<'a>(obj: &'a serde_json::Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases.iter().find_map(|k| obj.get(*k))
}

/// A non-negative macro component; negative model output is nulled
fn coerce_macro(obj: &serde_json::Map<String, Value>, aliases: &[&str]) -> Option<f64> {
    field(obj, aliases)
        .and_then(coerce_f64)
        .filter(|v| *v >= 0.0)
}

// ============================================================================
// Draft Types
// ============================================================================

/// Macro-nutrient estimate produced by the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroEstimate {
    pub kcal: Option<f64>,
    pub protein_g: Option<f64>,
    pub fat_g: Option<f64>,
    pub carbs_g: Option<f64>,
}

impl MacroEstimate {
    /// Coerce from a JSON object, tolerating common field aliases
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        Self {
            kcal: coerce_macro(obj, &["kcal", "calories", "energy_kcal"]),
            protein_g: coerce_macro(obj, &["protein_g", "protein", "proteins"]),
            fat_g: coerce_macro(obj, &["fat_g", "fat", "fats"]),
            carbs_g: coerce_macro(obj, &["carbs_g", "carbs", "carbohydrates"]),
        }
    }

    /// True when no component survived coercion
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.kcal.is_none()
            && self.protein_g.is_none()
            && self.fat_g.is_none()
            && self.carbs_g.is_none()
    }
}

/// One ingredient line in a dish draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientDraft {
    pub name: String,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
}

impl IngredientDraft {
    /// Coerce from a JSON value: an object with name/quantity/unit fields or
    /// a bare string
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(obj) => {
                let name = field(obj, &["name", "ingredient"]).and_then(coerce_string)?;
                Some(Self {
                    name,
                    quantity: field(obj, &["quantity", "amount", "qty"])
                        .and_then(coerce_f64)
                        .filter(|v| *v >= 0.0),
                    unit: field(obj, &["unit", "measure"]).and_then(coerce_string),
                })
            }
            Value::String(_) => coerce_string(value).map(|name| Self {
                name,
                quantity: None,
                unit: None,
            }),
            _ => None,
        }
    }
}

/// A dish drafted by the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DishDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub ingredients: Vec<IngredientDraft>,
    pub macros: Option<MacroEstimate>,
    pub tags: Vec<String>,
    pub instructions: Option<String>,
}

impl DishDraft {
    /// Coerce from an extracted JSON object
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::NotAnObject`] when the value is not an
    /// object; every field failure inside an object degrades to `None`/empty.
    pub fn from_value(value: &Value) -> Result<Self, NormalizeError> {
        let obj = value.as_object().ok_or(NormalizeError::NotAnObject)?;

        let ingredients = field(obj, &["ingredients"])
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(IngredientDraft::from_value).collect())
            .unwrap_or_default();

        let macros = field(obj, &["macros", "nutrition", "nutrients"])
            .map(MacroEstimate::from_value)
            .filter(|m| !m.is_empty());

        let instructions = match field(obj, &["instructions", "steps", "preparation"]) {
            // Step lists are joined into the numbered text the UI expects
            Some(Value::Array(steps)) => {
                let joined = steps
                    .iter()
                    .filter_map(coerce_string)
                    .enumerate()
                    .map(|(i, s)| format!("{}. {s}", i + 1))
                    .collect::<Vec<_>>()
                    .join("\n");
                if joined.is_empty() {
                    None
                } else {
                    Some(joined)
                }
            }
            Some(v) => coerce_string(v),
            None => None,
        };

        Ok(Self {
            title: field(obj, &["title", "name"]).and_then(coerce_string),
            description: field(obj, &["description", "summary"]).and_then(coerce_string),
            ingredients,
            macros,
            tags: field(obj, &["tags", "labels"])
                .map(coerce_string_list)
                .unwrap_or_default(),
            instructions,
        })
    }
}

/// One substitution suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstituteDraft {
    pub name: String,
    pub reason: Option<String>,
}

/// A list of ingredient substitutes drafted by the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubstitutionList {
    pub substitutes: Vec<SubstituteDraft>,
}

impl SubstitutionList {
    /// Coerce from an extracted JSON object
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::NotAnObject`] when the value is not an
    /// object.
    pub fn from_value(value: &Value) -> Result<Self, NormalizeError> {
        let obj = value.as_object().ok_or(NormalizeError::NotAnObject)?;

        let substitutes = field(obj, &["substitutes", "suggestions", "alternatives"])
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::Object(entry) => {
                            let name = field(entry, &["name", "ingredient", "substitute"])
                                .and_then(coerce_string)?;
                            Some(SubstituteDraft {
                                name,
                                reason: field(entry, &["reason", "why", "note"])
                                    .and_then(coerce_string),
                            })
                        }
                        Value::String(_) => coerce_string(item).map(|name| SubstituteDraft {
                            name,
                            reason: None,
                        }),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self { substitutes })
    }
}

/// One meal inside a drafted plan day
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanMealDraft {
    pub slot: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub macros: Option<MacroEstimate>,
}

/// One day inside a drafted plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanDayDraft {
    pub day: Option<i64>,
    pub meals: Vec<MealPlanMealDraft>,
}

/// A multi-day meal plan drafted by the model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealPlanDraft {
    pub title: Option<String>,
    pub days: Vec<MealPlanDayDraft>,
}

impl MealPlanDraft {
    /// Coerce from an extracted JSON object
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::NotAnObject`] when the value is not an
    /// object.
    pub fn from_value(value: &Value) -> Result<Self, NormalizeError> {
        let obj = value.as_object().ok_or(NormalizeError::NotAnObject)?;

        let days = field(obj, &["days", "plan"])
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|day| {
                        let day_obj = day.as_object()?;
                        let meals = field(day_obj, &["meals", "slots"])
                            .and_then(Value::as_array)
                            .map(|meals| {
                                meals
                                    .iter()
                                    .filter_map(|meal| {
                                        let meal_obj = meal.as_object()?;
                                        Some(MealPlanMealDraft {
                                            slot: field(meal_obj, &["slot", "meal", "type"])
                                                .and_then(coerce_string)
                                                .map(|s| s.to_lowercase()),
                                            title: field(meal_obj, &["title", "name", "dish"])
                                                .and_then(coerce_string),
                                            description: field(
                                                meal_obj,
                                                &["description", "summary"],
                                            )
                                            .and_then(coerce_string),
                                            macros: field(
                                                meal_obj,
                                                &["macros", "nutrition", "nutrients"],
                                            )
                                            .map(MacroEstimate::from_value)
                                            .filter(|m| !m.is_empty()),
                                        })
                                    })
                                    .collect()
                            })
                            .unwrap_or_default();

                        Some(MealPlanDayDraft {
                            day: field(day_obj, &["day", "day_index", "index"])
                                .and_then(coerce_i64),
                            meals,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            title: field(obj, &["title", "name"]).and_then(coerce_string),
            days,
        })
    }
}
