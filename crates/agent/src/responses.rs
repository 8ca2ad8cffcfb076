//! Canned customer-facing replies
//!
//! Everything the agent says without an LLM in the loop lives here, localized
//! for the languages the dealership actually serves over text. Unknown
//! language codes fall back to English.

/// Greeting / small-talk reply
pub fn greeting(language: &str) -> &'static str {
    match language {
        "es" => "¡Hola! Soy el asistente de servicio de Rick Case Honda. ¿En qué te puedo ayudar con tu carro hoy?",
        "pt" => "Oi! Sou o assistente de serviço da Rick Case Honda. Como posso ajudar com seu carro hoje?",
        _ => "Hey! I'm the service assistant at Rick Case Honda. What can I help you with today?",
    }
}

/// Message had nothing to do with cars or the dealership
pub fn off_topic(language: &str) -> &'static str {
    match language {
        "es" => "Solo puedo ayudarte con temas de tu vehículo o de servicio aquí en Rick Case Honda. ¿Hay algo de tu carro en que te pueda ayudar?",
        "pt" => "Só consigo ajudar com assuntos do seu veículo ou do serviço aqui na Rick Case Honda. Posso ajudar com alguma coisa do seu carro?",
        _ => "I can only help with your vehicle or service questions here at Rick Case Honda. Anything about your car I can help with?",
    }
}

/// Customer is being handed to a human advisor
pub fn escalation(language: &str) -> &'static str {
    match language {
        "es" => "Entiendo. Te voy a conectar con uno de nuestros asesores de servicio ahora mismo. Alguien te contactará en breve.",
        "pt" => "Entendi. Vou te conectar com um dos nossos consultores de serviço agora. Alguém vai entrar em contato em breve.",
        _ => "I understand. Let me connect you with one of our service advisors right away. Someone will reach out shortly.",
    }
}

/// Nothing relevant found in the manual or history; offer a visit instead
pub fn no_answer(language: &str) -> &'static str {
    match language {
        "es" => "No tengo una buena respuesta para eso, pero nuestros técnicos sí. ¿Quieres que te agende una cita para revisarlo?",
        "pt" => "Não tenho uma boa resposta para isso, mas nossos técnicos têm. Quer que eu marque um horário para dar uma olhada?",
        _ => "I don't have a good answer for that one, but our techs will. Want me to set up an appointment to have it looked at?",
    }
}

/// An internal failure interrupted the conversation
pub fn error_retry(language: &str) -> &'static str {
    match language {
        "es" => "Perdón, algo falló de mi lado. ¿Me lo puedes repetir?",
        "pt" => "Desculpa, algo deu errado do meu lado. Pode repetir?",
        _ => "Sorry, something went wrong on my end. Could you say that again?",
    }
}

/// No vehicle selected yet; ask which car the question is about
pub fn vehicle_prompt(language: &str) -> &'static str {
    match language {
        "es" => "¡Claro! ¿De cuál vehículo estamos hablando: Civic, Ridgeline o Passport?",
        "pt" => "Claro! De qual veículo estamos falando: Civic, Ridgeline ou Passport?",
        _ => "Sure! Which vehicle are we talking about: Civic, Ridgeline, or Passport?",
    }
}

/// Confirmation after the customer picks a vehicle
pub fn vehicle_selected(language: &str, vehicle: &str) -> String {
    match language {
        "es" => format!("¡Perfecto! Quedamos con tu {vehicle}. ¿Qué quieres saber?"),
        "pt" => format!("Perfeito! Ficamos com seu {vehicle}. O que você quer saber?"),
        _ => format!("Got it, your {vehicle} it is. What would you like to know?"),
    }
}

/// True iff the message is an affirmative reply to a pending visit offer
pub fn is_affirmative(message: &str) -> bool {
    const AFFIRMATIVES: &[&str] = &[
        "yes",
        "yeah",
        "yep",
        "yup",
        "sure",
        "ok",
        "okay",
        "yes please",
        "sounds good",
        "let's do it",
        "sí",
        "si",
        "claro",
        "dale",
        "está bien",
        "sim",
        "pode ser",
        "claro que sim",
        "bora",
    ];

    let lowered = message
        .trim()
        .trim_end_matches(['.', '!'])
        .to_lowercase();
    AFFIRMATIVES.contains(&lowered.as_str())
}
