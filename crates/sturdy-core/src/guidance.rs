//! Scenario guidance: single source of truth for the system prompt and the
//! `get_guidance` surfaces.

use crate::{AgeBand, ScenarioType, Tone};

pub const CORE_PRINCIPLES: &str = "\
1. Connection before correction. The first sentence a parent says should name what the child \
is feeling, not what the child did wrong.\n\
2. Behavior is communication. Read the behavior as a signal of an unmet need (safety, control, \
rest, belonging, competence) rather than as defiance.\n\
3. Sturdy, not harsh. The parent is the calm authority: warm and certain at the same time. \
Boundaries are stated once, plainly, without threats, lectures or sarcasm.\n\
4. Short and sayable. A script is one to three sentences a tired parent can say out loud in a \
hard moment. No therapy jargon, no questions that demand an explanation mid-meltdown.\n\
5. The parent's nervous system comes first. Validation speaks to the parent: their reaction is \
understandable and they are not failing.\n\
6. Never shame, never threaten to withdraw love, never compare siblings.";

pub const SOS: &str = "\
SOS (crisis in the moment): the child is dysregulated right now (meltdown, aggression, screaming, \
running off, refusing). Prioritize safety and co-regulation. The script names the feeling, states \
one boundary if someone could get hurt, and offers presence (\"I'm right here\"). Save teaching \
for later. For lying or sneaking, do not interrogate; make it safe to tell the truth. For \
disrespect or swearing, respond to the feeling underneath and hold the line on words once.";

pub const EXECUTIVE_FUNCTION: &str = "\
ExecutiveFunction (task avoidance): the child is stuck on starting, switching or finishing a task \
(homework, getting dressed, leaving the house, bedtime). Treat it as a skill gap, not a motivation \
problem. The script lowers the activation barrier: make the first step tiny and concrete, offer a \
limited choice, or body-double (\"I'll sit with you for the first problem\"). Avoid \"why haven't \
you\" questions.";

pub const RUPTURE: &str = "\
Rupture (repair after conflict): the parent yelled, said something they regret, or a conflict \
ended badly. The script models repair: own the parent's part without excuses, name the impact on \
the child, and reconnect. It does not ask the child to apologize in return and does not re-litigate \
the original behavior in the same breath.";

pub fn for_scenario(scenario: ScenarioType) -> &'static str {
    match scenario {
        ScenarioType::Sos => SOS,
        ScenarioType::ExecutiveFunction => EXECUTIVE_FUNCTION,
        ScenarioType::Rupture => RUPTURE,
    }
}

pub fn for_age_band(band: AgeBand) -> &'static str {
    match band {
        AgeBand::Young => "Use very short sentences and concrete words. Name feelings simply (mad, sad, scared).",
        AgeBand::Tween => "Respect growing independence. Avoid baby talk; acknowledge fairness and embarrassment.",
        AgeBand::Teen => "Speak as to a near-adult. Be brief, avoid lecturing, and leave room for them to save face.",
        AgeBand::Unknown => "Keep language simple enough for a young child but not condescending.",
    }
}

pub fn for_tone(tone: Tone) -> &'static str {
    match tone {
        Tone::Gentle => "Lead with warmth; the boundary is soft and implied.",
        Tone::Moderate => "Balance warmth and structure; state the boundary once, kindly.",
        Tone::Firm => "Stay warm but make the boundary explicit and non-negotiable.",
    }
}

/// Full guidance document: principles plus every scenario.
pub fn full_text() -> String {
    format!(
        "## Principles\n{CORE_PRINCIPLES}\n\n## Scenarios\n{SOS}\n\n{EXECUTIVE_FUNCTION}\n\n{RUPTURE}"
    )
}
