//! Prompt catalogue shared by the HTTP backends.
//!
//! Output is always German application prose. The remote backend sends
//! [`SYSTEM_PROMPT`] and [`section_prompt`] as separate fields; the local
//! backend folds both into one Llama chat-template string.

use appligen_types::generation::GenerationRequest;
use appligen_types::section::{SectionFormat, SectionType};

/// Shared system prompt for every section.
pub const SYSTEM_PROMPT: &str = "Du bist ein Experte für deutsche Bewerbungen und hilfst dabei, \
personalisierte, professionelle Bewerbungsinhalte zu erstellen.

Deine Texte gehen konkret auf die Stellenausschreibung ein, heben die \
Qualifikationen des Bewerbers hervor und folgen deutschen Bewerbungsstandards. \
Verwende einen professionellen, natürlichen Ton ohne Floskeln.

Antworte immer nur mit dem angeforderten Text, ohne zusätzliche Erklärungen.";

/// Build the user prompt for one section request.
pub fn section_prompt(request: &GenerationRequest) -> String {
    let job = request.job_description.trim();
    let profile = request.profile.trim();
    let company = request.company_name.trim();
    let position = request.position_title.trim();

    let body = match request.section {
        SectionType::Opening => format!(
            "Erstelle einen persönlichen Einstiegstext für ein Anschreiben.\n\n\
             STELLENAUSSCHREIBUNG:\n{job}\n\n\
             PROFIL DES BEWERBERS:\n{profile}\n\n\
             POSITION: {position}\nUNTERNEHMEN: {company}\n\n\
             Schreibe 2-3 Sätze, die zeigen, warum genau diese Position interessant ist, \
             auf die konkrete Ausschreibung Bezug nehmen und die Passung andeuten."
        ),
        SectionType::QualificationsMatch => format!(
            "Erstelle einen Text über die fachliche Passung des Bewerbers zur Stelle.\n\n\
             STELLENAUSSCHREIBUNG:\n{job}\n\n\
             PROFIL DES BEWERBERS:\n{profile}\n\n\
             Schreibe 3-4 Sätze mit konkreten Übereinstimmungen zwischen Profil und \
             Anforderungen. Nenne Technologien und quantifizierte Erfahrung (Jahre, Projekte)."
        ),
        SectionType::Motivation => format!(
            "Erstelle einen Motivationstext für die Position und das Unternehmen.\n\n\
             STELLENAUSSCHREIBUNG:\n{job}\n\n\
             UNTERNEHMEN: {company}\nPOSITION: {position}\n\n\
             Schreibe 2-3 Sätze, die spezifische Aspekte der Position hervorheben, \
             Bezug zum Unternehmen zeigen und echte Begeisterung vermitteln. \
             Kein Marketing-Sprech."
        ),
        SectionType::ValueProposition => format!(
            "Erstelle einen Text über den Mehrwert, den der Bewerber dem Unternehmen bietet.\n\n\
             STELLENAUSSCHREIBUNG:\n{job}\n\n\
             PROFIL DES BEWERBERS:\n{profile}\n\n\
             UNTERNEHMEN: {company}\n\n\
             Schreibe 2-3 Sätze mit konkreten Ergebnissen des Bewerbers und den \
             direkten Vorteilen für das Unternehmen."
        ),
        SectionType::Closing => format!(
            "Erstelle einen professionellen Abschlusstext für das Anschreiben.\n\n\
             POSITION: {position}\nUNTERNEHMEN: {company}\n\n\
             Schreibe 1-2 höfliche Sätze, die Interesse an einem Gespräch ausdrücken, \
             ohne aufdringlich zu wirken."
        ),
        SectionType::ExperienceEnhanced => format!(
            "Überarbeite die Berufserfahrung des Bewerbers für diese Stelle.\n\n\
             STELLENAUSSCHREIBUNG:\n{job}\n\n\
             PROFIL DES BEWERBERS:\n{profile}\n\n\
             Hebe Stationen und Erfolge hervor, die zu den Anforderungen passen. \
             Quantifiziere Ergebnisse, wo das Profil es hergibt."
        ),
        SectionType::EducationEnhanced => format!(
            "Überarbeite den Ausbildungsabschnitt des Bewerbers für diese Stelle.\n\n\
             STELLENAUSSCHREIBUNG:\n{job}\n\n\
             PROFIL DES BEWERBERS:\n{profile}\n\n\
             Betone Abschlüsse, Schwerpunkte und Weiterbildungen mit Bezug zur Position."
        ),
        SectionType::SkillsEnhanced => format!(
            "Ordne die Fachkenntnisse des Bewerbers nach Relevanz für diese Stelle.\n\n\
             STELLENAUSSCHREIBUNG:\n{job}\n\n\
             PROFIL DES BEWERBERS:\n{profile}\n\n\
             Gruppiere die Kenntnisse in Kategorien und stelle geforderte Technologien voran."
        ),
    };

    let mut prompt = body;
    prompt.push_str("\n\n");
    if let Some(max_length) = request.max_length() {
        prompt.push_str(&format!("Maximal {max_length} Zeichen.\n"));
    }
    if let Some(tone) = request.tone() {
        prompt.push_str(&format!("Ton: {tone}.\n"));
    }
    prompt.push_str(match request.section.guidance().format {
        SectionFormat::Plain => "Format: Fließtext ohne Überschriften oder Aufzählungen.",
        SectionFormat::Markdown => "Format: Markdown mit Aufzählungspunkten.",
    });
    prompt
}

/// Wrap system and user prompt in the Llama 3 chat template.
pub fn llama_chat_prompt(system: &str, user: &str) -> String {
    format!(
        "<|begin_of_text|><|start_header_id|>system<|end_header_id|>\n\n{system}<|eot_id|>\
         <|start_header_id|>user<|end_header_id|>\n\n{user}<|eot_id|>\
         <|start_header_id|>assistant<|end_header_id|>\n\n"
    )
}
