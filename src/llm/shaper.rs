// ABOUTME: Request shaping for the drafting assistant
// ABOUTME: Builds role-based prompts with schema hints from a task and free-form brief
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! # Request Shaper
//!
//! Turns a draft task and a free-form natural-language brief into a
//! [`ChatRequest`]: the system turn carries the task-specific prompt with its
//! embedded schema hint, the user turn carries the brief plus any client
//! context (allergies, dietary preference, budget) the specialist opted to
//! include.

use serde::{Deserialize, Serialize};

use super::prompts;
use super::{ChatMessage, ChatRequest};

/// Temperature for structured drafting; low for schema compliance
const DRAFT_TEMPERATURE: f32 = 0.3;

/// Token ceiling for single-object drafts
const DRAFT_MAX_TOKENS: u32 = 1024;

/// Token ceiling for multi-day plans, which run longer
const PLAN_MAX_TOKENS: u32 = 4096;

/// The drafting task to shape a request for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "task")]
pub enum DraftTask {
    /// Draft a single dish
    DraftDish,
    /// Estimate macro nutrients for a dish or ingredient list
    EstimateMacros,
    /// Suggest substitutes for an ingredient
    SuggestSubstitutes,
    /// Draft a multi-day meal plan
    DraftMealPlan {
        /// Number of days the plan covers
        days: u8,
    },
}

impl DraftTask {
    /// The system prompt for this task
    #[must_use]
    pub const fn system_prompt(&self) -> &'static str {
        match self {
            Self::DraftDish => prompts::DISH_DRAFT_PROMPT,
            Self::EstimateMacros => prompts::MACRO_ESTIMATE_PROMPT,
            Self::SuggestSubstitutes => prompts::SUBSTITUTES_PROMPT,
            Self::DraftMealPlan { .. } => prompts::MEAL_PLAN_PROMPT,
        }
    }

    /// Token ceiling appropriate for this task's output size
    #[must_use]
    pub const fn max_tokens(&self) -> u32 {
        match self {
            Self::DraftMealPlan { .. } => PLAN_MAX_TOKENS,
            _ => DRAFT_MAX_TOKENS,
        }
    }
}

/// Client context a specialist can attach to a drafting request
///
/// Everything is optional; present fields are appended to the user turn so
/// the model can honor them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PromptContext {
    /// Known allergies to avoid
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Dietary preference (vegetarian, vegan, ...)
    #[serde(default)]
    pub dietary_preference: Option<String>,
    /// Weekly food budget in the client's currency
    #[serde(default)]
    pub weekly_budget: Option<f64>,
}

impl PromptContext {
    /// True when no field carries a value
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allergies.is_empty()
            && self.dietary_preference.is_none()
            && self.weekly_budget.is_none()
    }

    /// Render the context block appended to the user turn
    fn render(&self) -> String {
        let mut lines = Vec::new();

        if !self.allergies.is_empty() {
            lines.push(format!("Allergies to avoid: {}", self.allergies.join(", ")));
        }
        if let Some(pref) = &self.dietary_preference {
            lines.push(format!("Dietary preference: {pref}"));
        }
        if let Some(budget) = self.weekly_budget {
            lines.push(format!("Weekly food budget: {budget}"));
        }

        lines.join("\n")
    }
}

/// Build the chat request for a draft task
///
/// The brief is embedded verbatim; the task's day count (for plans) and the
/// client context are appended as labelled blocks.
#[must_use]
pub fn shape_request(task: DraftTask, brief: &str, context: &PromptContext) -> ChatRequest {
    let mut user_turn = String::from("Brief:\n");
    user_turn.push_str(brief.trim());

    if let DraftTask::DraftMealPlan { days } = task {
        user_turn.push_str(&format!("\n\nPlan length: {days} days"));
    }

    if !context.is_empty() {
        user_turn.push_str("\n\nClient context:\n");
        user_turn.push_str(&context.render());
    }

    let messages = vec![
        ChatMessage::system(task.system_prompt()),
        ChatMessage::user(user_turn),
    ];

    ChatRequest::new(messages)
        .with_temperature(DRAFT_TEMPERATURE)
        .with_max_tokens(task.max_tokens())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MessageRole;

    #[test]
    fn test_shape_embeds_brief_verbatim() {
        let request = shape_request(
            DraftTask::DraftDish,
            "A high-protein breakfast under 500 kcal",
            &PromptContext::default(),
        );

        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, MessageRole::System);
        assert_eq!(request.messages[1].role, MessageRole::User);
        assert!(request.messages[1]
            .content
            .contains("A high-protein breakfast under 500 kcal"));
        assert_eq!(request.temperature, Some(0.3));
    }

    #[test]
    fn test_system_prompt_carries_schema_hint() {
        let request = shape_request(
            DraftTask::EstimateMacros,
            "200g cooked rice with butter",
            &PromptContext::default(),
        );

        let system = &request.messages[0].content;
        assert!(system.contains("protein_g"));
        assert!(system.contains("JSON"));
    }

    #[test]
    fn test_context_appended_when_present() {
        let context = PromptContext {
            allergies: vec!["peanuts".into(), "shellfish".into()],
            dietary_preference: Some("vegetarian".into()),
            weekly_budget: Some(60.0),
        };

        let request = shape_request(DraftTask::DraftDish, "A quick dinner", &context);
        let user = &request.messages[1].content;
        assert!(user.contains("peanuts, shellfish"));
        assert!(user.contains("vegetarian"));
        assert!(user.contains("60"));
    }

    #[test]
    fn test_context_omitted_when_empty() {
        let request =
            shape_request(DraftTask::DraftDish, "A quick dinner", &PromptContext::default());
        assert!(!request.messages[1].content.contains("Client context"));
    }

    #[test]
    fn test_plan_length_included() {
        let request = shape_request(
            DraftTask::DraftMealPlan { days: 5 },
            "Cutting phase for an active client",
            &PromptContext::default(),
        );

        assert!(request.messages[1].content.contains("Plan length: 5 days"));
        assert_eq!(request.max_tokens, Some(4096));
    }
}
