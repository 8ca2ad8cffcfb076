//! Message dispatcher
//!
//! One entry point per inbound message: load the session, settle any pending
//! booking offer, classify, run the matching flow, persist the session, and
//! always hand back something sayable. Internal failures degrade to localized
//! retry or escalation-offer messages.

use std::sync::Arc;

use dealer_agent_config::constants::conversation::{
    BOOKING_TRANSCRIPT_KEEP, BOOKING_TRANSCRIPT_MAX, TECH_HISTORY_TURNS,
};
use dealer_agent_config::{RetrievalSettings, VehicleCatalog};
use dealer_agent_core::{
    language_label, BookingRecord, BookingSession, ConversationWindow, Intent, SessionRecord,
    SessionStore, Turn, NO_ANSWER, NO_RECORD,
};
use dealer_agent_llm::{tech_system_prompt, LlmBackend, TechPromptContext};
use dealer_agent_rag::{
    AdaptiveRetriever, HistoryLookup, HistoryOutcome, RetrievalOutcome, SearchGateway,
};

use crate::booking::BookingAgent;
use crate::classifier::IntentClassifier;
use crate::phone::PhoneExtractor;
use crate::responses;

const VISIT_YES: &str = "[VISIT:YES]";
const VISIT_NO: &str = "[VISIT:NO]";

pub struct Dispatcher {
    classifier: IntentClassifier,
    retriever: AdaptiveRetriever,
    history: HistoryLookup,
    booking: BookingAgent,
    phone: PhoneExtractor,
    llm: Arc<dyn LlmBackend>,
    store: Arc<dyn SessionStore>,
    catalog: VehicleCatalog,
}

impl Dispatcher {
    pub fn new(
        llm: Arc<dyn LlmBackend>,
        gateway: Arc<dyn SearchGateway>,
        store: Arc<dyn SessionStore>,
        catalog: VehicleCatalog,
        retrieval: RetrievalSettings,
    ) -> Self {
        let history = HistoryLookup::new(
            Arc::clone(&gateway),
            retrieval.namespace_top_k,
            retrieval.history_floor,
        );
        let retriever = AdaptiveRetriever::new(gateway, Arc::clone(&llm), retrieval);

        Self {
            classifier: IntentClassifier::new(Arc::clone(&llm), catalog.clone()),
            retriever,
            history,
            booking: BookingAgent::new(Arc::clone(&llm)),
            phone: PhoneExtractor::new(Arc::clone(&llm)),
            llm,
            store,
            catalog,
        }
    }

    /// Handle one inbound message and return the reply to send
    pub async fn handle(&self, user_id: u64, message: &str) -> String {
        let mut session = self
            .store
            .get(user_id)
            .unwrap_or_else(|| SessionRecord::new(TECH_HISTORY_TURNS));

        // Phone numbers are worth capturing from any message
        if session.phone.is_none() {
            if let Some(phone) = self.phone.extract(message).await {
                tracing::debug!(user_id, "captured phone from message");
                session.phone = Some(phone);
            }
        }

        let reply = self.route(user_id, message, &mut session).await;

        self.store.put(user_id, session);
        reply
    }

    async fn route(&self, user_id: u64, message: &str, session: &mut SessionRecord) -> String {
        // A bare affirmative after a visit offer starts the booking directly
        if session.pending_booking && responses::is_affirmative(message) {
            session.pending_booking = false;
            self.start_booking(session, None);
            return self.booking_turn(user_id, message, session).await;
        }
        session.pending_booking = false;

        if session.booking.is_some() {
            return self.booking_turn(user_id, message, session).await;
        }

        let decision = self.classifier.classify(message).await;
        tracing::debug!(
            user_id,
            intent = %decision.intent,
            vehicle = decision.vehicle.as_deref(),
            language = decision.language.as_deref(),
            "classified message"
        );

        // Every message re-detects the customer's language; replies follow it
        if let Some(language) = &decision.language {
            if session.language != *language {
                tracing::debug!(user_id, language, "switching reply language");
                session.language = language.clone();
            }
        }

        match decision.intent {
            Intent::Greeting => responses::greeting(&session.language).to_string(),
            Intent::OffTopic => responses::off_topic(&session.language).to_string(),
            Intent::Escalation => {
                tracing::info!(user_id, summary = %decision.summary, "escalating to human advisor");
                responses::escalation(&session.language).to_string()
            }
            Intent::VehicleSelect => {
                // decision.vehicle is always set for this intent
                match decision.vehicle {
                    Some(namespace) => {
                        let label = VehicleCatalog::display_name(&namespace);
                        // Picking a vehicle starts a fresh conversation: the
                        // previous car's Q&A history and history report must
                        // not leak into this one
                        session.history.clear();
                        session.vin = None;
                        session.history_namespace = None;
                        session.namespace = Some(namespace);
                        session.vehicle_label = Some(label.clone());
                        responses::vehicle_selected(&session.language, &label)
                    }
                    None => responses::vehicle_prompt(&session.language).to_string(),
                }
            }
            Intent::Booking => {
                self.start_booking(session, decision.vehicle);
                self.booking_turn(user_id, message, session).await
            }
            Intent::Tech => {
                if let Some(namespace) = decision.vehicle {
                    session.vehicle_label = Some(VehicleCatalog::display_name(&namespace));
                    session.namespace = Some(namespace);
                }
                self.tech_turn(user_id, message, session).await
            }
        }
    }

    /// Manual-grounded Q&A flow
    async fn tech_turn(&self, user_id: u64, message: &str, session: &mut SessionRecord) -> String {
        let Some(namespace) = session.namespace.clone() else {
            return responses::vehicle_prompt(&session.language).to_string();
        };

        let outcome = self
            .retriever
            .retrieve(message, &namespace, &[], &session.history)
            .await;

        let history_outcome = match &session.vin {
            Some(vin) => self.history.lookup(message, vin).await,
            None => HistoryOutcome::NoRecord,
        };

        if outcome == RetrievalOutcome::NoAnswer
            && history_outcome == HistoryOutcome::NoRecord
        {
            tracing::info!(user_id, namespace, "no retrievable answer, offering visit");
            return self.offer_visit(message, session);
        }

        let prompt = tech_system_prompt(&TechPromptContext {
            language_label: language_label(&session.language).to_string(),
            manual_context: match outcome {
                RetrievalOutcome::Context(ctx) => ctx,
                RetrievalOutcome::NoAnswer => "No relevant manual content found.".to_string(),
            },
            history_context: match history_outcome {
                HistoryOutcome::Context(ctx) => ctx,
                // The prompt tells the model what this sentinel means
                HistoryOutcome::NoRecord => NO_RECORD.to_string(),
            },
        });

        let raw = match self.llm.complete(&prompt, message).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "tech answer generation failed");
                return responses::error_retry(&session.language).to_string();
            }
        };

        // The model can still conclude the context doesn't answer the question
        if raw.contains(NO_ANSWER) {
            return self.offer_visit(message, session);
        }

        let visit_recommended = raw.contains(VISIT_YES);
        let reply = raw
            .replace(VISIT_YES, "")
            .replace(VISIT_NO, "")
            .trim()
            .to_string();

        if visit_recommended {
            session.pending_booking = true;
        }

        session.history.push(Turn::customer(message));
        session.history.push(Turn::advisor(reply.clone()));
        reply
    }

    /// Reply with the visit offer and arm the pending-booking flag
    fn offer_visit(&self, message: &str, session: &mut SessionRecord) -> String {
        let reply = responses::no_answer(&session.language).to_string();
        session.pending_booking = true;
        session.history.push(Turn::customer(message));
        session.history.push(Turn::advisor(reply.clone()));
        reply
    }

    /// Attach a fresh booking conversation, pre-filled from the session
    fn start_booking(&self, session: &mut SessionRecord, vehicle: Option<String>) {
        if session.booking.is_some() {
            return;
        }

        let mut record = BookingRecord::new();
        record.name = session.customer_name.clone();
        record.phone = session.phone.clone();
        record.vehicle = vehicle
            .as_deref()
            .map(VehicleCatalog::display_name)
            .or_else(|| session.vehicle_label.clone());

        if let Some(namespace) = vehicle {
            session.vehicle_label = Some(VehicleCatalog::display_name(&namespace));
            session.namespace = Some(namespace);
        }

        session.booking = Some(BookingSession {
            record,
            transcript: ConversationWindow::with_trim(
                BOOKING_TRANSCRIPT_MAX,
                BOOKING_TRANSCRIPT_KEEP,
            ),
        });
    }

    /// Run one booking turn and flush the record if it completed
    async fn booking_turn(
        &self,
        user_id: u64,
        message: &str,
        session: &mut SessionRecord,
    ) -> String {
        let customer_context = customer_context(session);
        let language = session.language.clone();

        // route() only calls this with a booking attached
        let Some(booking) = session.booking.as_mut() else {
            return responses::error_retry(&language).to_string();
        };

        let turn = self
            .booking
            .take_turn(message, booking, &language, &customer_context)
            .await;

        if turn.completed {
            let record = booking.record.clone();
            tracing::info!(
                user_id,
                name = record.name.as_deref(),
                phone = record.phone.as_deref(),
                vehicle = record.vehicle.as_deref(),
                service = record.service_type.as_deref(),
                date = record.preferred_date.as_deref(),
                time = record.preferred_time.as_deref(),
                "booking completed"
            );

            // The finished record is the best info we have about the customer
            session.customer_name = record.name;
            if record.phone.is_some() {
                session.phone = record.phone;
            }
            session.booking = None;
        }

        turn.reply
    }
}

/// Known customer facts rendered for the booking prompt
fn customer_context(session: &SessionRecord) -> String {
    let mut lines = Vec::new();
    if let Some(name) = &session.customer_name {
        lines.push(format!("Name: {name}"));
    }
    if let Some(phone) = &session.phone {
        lines.push(format!("Phone: {phone}"));
    }
    if let Some(vehicle) = &session.vehicle_label {
        lines.push(format!("Vehicle: {vehicle}"));
    }

    if lines.is_empty() {
        "New customer, nothing on file yet.".to_string()
    } else {
        lines.join("\n")
    }
}
