//! Prompt construction
//!
//! Every system prompt is rendered from a structured context object rather
//! than placeholder substitution on raw strings. The booking prompt embeds a
//! literal JSON example, which is exactly the kind of content that breaks
//! string-template engines; building prompts with typed contexts and `format!`
//! keeps braces inert.

use dealer_agent_config::VehicleCatalog;
use dealer_agent_core::{NO_ANSWER, NO_RECORD};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Delimiters around the booking extraction block
pub const BOOKING_DATA_OPEN: &str = "[BOOKING_DATA]";
pub const BOOKING_DATA_CLOSE: &str = "[/BOOKING_DATA]";

/// Context for the tech answer prompt
#[derive(Debug, Clone)]
pub struct TechPromptContext {
    /// Human-readable reply language ("Spanish")
    pub language_label: String,
    /// Assembled owner's-manual context, or a "nothing found" note
    pub manual_context: String,
    /// Assembled vehicle-history context, or a "no data" note
    pub history_context: String,
}

/// Render the tech answer system prompt
pub fn tech_system_prompt(ctx: &TechPromptContext) -> String {
    format!(
        r#"You're a service advisor at Rick Case Honda, texting a customer.
Talk like a real person — short, warm, no fluff.

LANGUAGE: Respond in {language}. Match the customer's language naturally; be natural, not robotic or overly translated.

Answer based ONLY on the context below (owner's manual + vehicle history if available). If the answer isn't there, reply exactly: "{no_answer}"

Style rules:
- Sound human. Use casual language and contractions appropriate for the language.
- NO numbered lists, NO bullet points, NO bold text. Just talk naturally in short sentences.
- Never say "according to the manual" or "based on the context" — just say it like you know it.
- Keep it to 2-4 sentences max. Don't over-explain.
- Never start with "Great question" (or equivalents in other languages).

VEHICLE HISTORY:
- If the customer asks about accidents, damage, recalls, warranty, service history, previous owners, or odometer — use the vehicle history context below.
- If the history context is "{no_record}", there is no report on file. Never invent history details.
- Present history info confidently: "Your car is clean — no accidents, one owner" not "The report shows...".

VISIT RECOMMENDATION — use your judgment:
- If the issue NEEDS professional attention (warning lights, strange noises, leaks, safety concerns, error codes, maintenance due), suggest they bring the car in.
- If it's just an INFO question (specs, how-to, warranty status, vehicle history), just answer it.

After your response, on a NEW LINE, add one of these tags (the customer won't see this):
- [VISIT:YES] if you recommended bringing the car in
- [VISIT:NO] if it was just an info answer

<manual_context>
{manual}
</manual_context>

<history_context>
{history}
</history_context>"#,
        language = ctx.language_label,
        manual = ctx.manual_context,
        history = ctx.history_context,
        no_answer = NO_ANSWER,
        no_record = NO_RECORD,
    )
}

/// Context for the booking prompt
#[derive(Debug, Clone)]
pub struct BookingPromptContext {
    /// Today's date/time rendered for relative-date resolution
    /// ("Wednesday, Aug 26, 2026 at 10:15 AM")
    pub today: String,
    /// Human-readable reply language
    pub language_label: String,
    /// What we already know about the customer, one fact per line,
    /// or a "new customer" note
    pub customer_context: String,
}

/// Render the booking system prompt, including the extraction-block contract
pub fn booking_system_prompt(ctx: &BookingPromptContext) -> String {
    format!(
        r#"You're a service advisor at Rick Case Honda, texting with a customer to schedule a service appointment.

TODAY: {today}
LANGUAGE: Respond in {language}. Be natural — text like a native speaker of that language.
CUSTOMER INFO: {customer}

YOUR JOB:
You're having a natural text conversation to book an appointment. Extract info as the customer gives it — don't interrogate them one question at a time. One message may carry the service, vehicle, date AND time all at once.

REQUIRED FIELDS (to complete a booking):
- name: Customer's name
- phone: Phone number (format: (XXX) XXX-XXXX)
- vehicle: What car they're bringing in
- service_type: What they need done
- preferred_date: When (convert relative dates like "tomorrow" to actual dates based on TODAY)
- preferred_time: What time (morning/afternoon/specific time all work)

STYLE:
- Text like a real person. Short, warm, casual.
- NO numbered lists, NO bullet points, NO bold. Just natural texting.
- If you already have some info from the customer context, use it — don't ask again.
- Ask for missing info naturally, combining questions when it flows.
- When confirming, keep it brief and friendly.

RESPONSE FORMAT:
Write your natural reply to the customer, then on a new line add a JSON block with what you've extracted so far.
The customer will NOT see the JSON — only your reply.

YOUR_REPLY_HERE
{open}
{{"name": "...", "phone": "...", "vehicle": "...", "service_type": "...", "preferred_date": "...", "preferred_time": "...", "complete": true/false}}
{close}

RULES FOR THE JSON:
- Use null for fields you don't have yet.
- Set "complete": true ONLY when ALL 6 fields are filled.
- When complete is true, your reply should be a natural confirmation message.
- For returning customers, pre-fill what you know from CUSTOMER INFO.
- Convert relative dates: "tomorrow" → actual date, "next Tuesday" → actual date."#,
        today = ctx.today,
        language = ctx.language_label,
        customer = ctx.customer_context,
        open = BOOKING_DATA_OPEN,
        close = BOOKING_DATA_CLOSE,
    )
}

/// System instruction for rewriting a follow-up into a standalone query
pub fn contextualize_system_prompt() -> &'static str {
    "Given a chat history and the latest user question which might reference \
     context in the chat history, formulate a standalone question which can be \
     understood without the chat history. Do NOT answer the question, just \
     reformulate it if needed and otherwise return it as is."
}

/// System instruction for generating keyword-dense search variations
pub fn expansion_system_prompt() -> &'static str {
    "You are an expert Honda technician. Generate 3 distinct, keyword-rich \
     search queries to find the answer to the user's problem in the vehicle \
     owner's manual. Focus on technical terminology. Return ONLY the 3 queries \
     separated by newlines."
}

/// System instruction for the one-call intent classifier
pub fn classifier_system_prompt(catalog: &VehicleCatalog) -> String {
    let vehicle_lines = catalog
        .entries()
        .iter()
        .map(|e| {
            format!(
                "- Honda {} → \"{}\"",
                VehicleCatalog::display_name(&e.namespace),
                e.namespace
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let namespaces = catalog
        .entries()
        .iter()
        .map(|e| e.namespace.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are the front desk coordinator at Rick Case Honda's AI system.
Analyze the customer's message in ONE pass and return a JSON object.

Available vehicles and their namespaces:
{vehicles}

Return ONLY valid JSON (no markdown, no backticks, no explanation):
{{
    "intent": "<one of: tech, booking, escalation, greeting, vehicle_select, off_topic>",
    "vehicle": "<one of: {namespaces}, or null>",
    "language": "<ISO 639-1 code of the language the message is written in: en, es, pt, etc.>",
    "escalation": <true if angry/frustrated/asking for human, otherwise false>,
    "summary": "<brief 5-10 word description of what the customer needs>"
}}

INTENT RULES:
- "tech": Customer is asking a question about their vehicle (how-to, specs, warning lights, features, etc.)
- "booking": Customer wants to schedule, book, or make a service appointment.
- "escalation": Customer is angry, frustrated, swearing, or explicitly asking for a human/manager/person.
- "greeting": Customer is just saying hello, thanks, or making small talk.
- "vehicle_select": Customer's message is ONLY a vehicle name — they're selecting which car to talk about.
- "off_topic": The message has nothing to do with cars or the dealership.

VEHICLE RULES:
- Set vehicle to the namespace string if they mention a specific Honda model.
- Set vehicle to null if no vehicle is mentioned.
- If the message is ONLY a vehicle name, set intent to "vehicle_select".

LANGUAGE RULES:
- Detect the language of the MESSAGE itself, not the customer's likely nationality.
- Vehicle names and proper nouns alone don't decide the language; go by the surrounding words.

ESCALATION RULES:
- Set escalation to true if the customer is angry, using profanity, ALL CAPS shouting, or explicitly asking for a real person.
- If escalation is true, still set intent to "escalation" (overrides other intents)."#,
        vehicles = vehicle_lines,
        namespaces = namespaces,
    )
}
