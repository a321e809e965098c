//! Prompt builders for the three AI operations
//!
//! Every prompt interpolates only sanitized input and locally computed
//! context, and closes with an explicit instruction that the model must
//! respond with a JSON object of named fields and no commentary.

use crate::spending::SpendLevel;
use std::collections::BTreeMap;

/// Emotional/contextual note per known spending category
pub fn category_context(category: &str) -> &'static str {
    match category {
        "Food" => {
            "Food often reflects comfort, routine, or convenience spending. \
             High food spend can be linked to busy schedules, eating out, or emotional comfort."
        }
        "Transport" => {
            "Transport spending usually points to routine commitments, commuting, \
             or a busy season of movement."
        }
        "Entertainment" => {
            "Entertainment can signal a need for rest, joy, or stress relief after demanding weeks."
        }
        "Shopping" => {
            "Shopping may reflect planned upgrades, self-care, or impulse buys driven by mood."
        }
        _ => "This category likely reflects a mix of routine needs and emotional decisions.",
    }
}

/// Greeting prompt for the hello endpoint
pub fn greeting(user_name: &str) -> String {
    format!(
        "You are AIVA, a kind financial well-being assistant. \
         Greet {user_name} warmly in 2-3 sentences. \
         Acknowledge that money can be stressful, but you're here to help \
         them understand things step by step. Keep the tone supportive and calm."
    )
}

/// Insight prompt combining the spending summary, local classification, and
/// guidance retrieved from the knowledge base
pub fn insight(
    totals: &BTreeMap<String, f64>,
    dominant_category: &str,
    total_spend: f64,
    spend_level: SpendLevel,
    guidance_text: &str,
) -> String {
    let summary_text = totals
        .iter()
        .map(|(category, amount)| format!("{category}: \u{a3}{amount:.2}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut prompt = format!(
        "You are AIVA, an emotionally intelligent financial well-being assistant.\n\n\
         Weekly spending summary: {summary_text}.\n\
         Dominant spending category: {dominant_category}.\n\
         Approximate total weekly spend: \u{a3}{total_spend:.2} ({} level).\n\
         Emotional/contextual note about this category: {}\n\n",
        spend_level.as_str(),
        category_context(dominant_category),
    );

    if !guidance_text.is_empty() {
        prompt.push_str(&format!(
            "Here are additional coaching guidelines and reflections you should follow \
             when speaking to the user about this situation:\n{guidance_text}\n\n"
        ));
    }

    prompt.push_str(
        "TASK 1 - Identify the category with the highest total spending.\n\
         TASK 2 - Choose the emotional tone the user needs. Options:\n\
         - reassuring\n- motivating\n- grounding\n\n\
         TASK 3 - Give ONE gentle and actionable financial suggestion.\n\n\
         TASK 4 - Write a short (3-4 sentences) narrative insight using the chosen tone.\n\
         Include empathy, clarity, and emotional awareness.\n\n\
         FORMAT the response STRICTLY as JSON with keys:\n\
         \"top_category\", \"emotional_tone\", \"suggested_action\", \"aiva_insight\".\n\
         Return only JSON. No commentary.",
    );

    prompt
}

/// Check-in follow-up prompt for a user's selected reflection option
pub fn checkin(user_name: &str, category: &str, selected_option: &str) -> String {
    format!(
        "You are AIVA, an emotionally intelligent financial well-being assistant.\n\n\
         User name: {user_name}.\n\
         Their dominant spending category is: {category}.\n\
         They chose this reflection option: \"{selected_option}\".\n\n\
         TASK 1 - Acknowledge their feelings with genuine empathy.\n\
         TASK 2 - Reflect briefly on how this feeling might be connected to their spending.\n\
         TASK 3 - Offer 1-2 gentle, realistic next steps that support both emotions and budget.\n\
         TASK 4 - Keep the tone warm, non-judgmental, and grounded.\n\n\
         FORMAT the response STRICTLY as JSON with keys:\n\
         \"aiva_followup\", \"detected_emotion\", \"supportive_reframe\", \"next_step_suggestion\".\n\
         Return only JSON. No commentary."
    )
}
