// ABOUTME: System prompts for the drafting assistant loaded at compile time
// ABOUTME: One markdown prompt per draft task, each embedding its output schema hint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Nutrio Coaching

//! # System Prompts
//!
//! Prompts are loaded at compile time from markdown files for easy
//! maintenance. Each prompt instructs the model to answer with a single JSON
//! object matching the schema the normalizer expects.

/// System prompt for drafting a single dish
pub const DISH_DRAFT_PROMPT: &str = include_str!("dish_draft.md");

/// System prompt for estimating macro nutrients
pub const MACRO_ESTIMATE_PROMPT: &str = include_str!("macro_estimate.md");

/// System prompt for suggesting ingredient substitutes
pub const SUBSTITUTES_PROMPT: &str = include_str!("substitutes.md");

/// System prompt for drafting a multi-day meal plan
pub const MEAL_PLAN_PROMPT: &str = include_str!("meal_plan.md");
