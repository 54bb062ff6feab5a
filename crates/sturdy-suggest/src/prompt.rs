use sturdy_core::{guidance, ScriptRequest};

/// Fixed closing instruction. The parser keys on these three labels.
const OUTPUT_INSTRUCTION: &str = "\
Respond with exactly three lines and nothing else:\n\
Validation: <one sentence that validates the parent's experience>\n\
Shift: <one sentence that reframes the child's behavior as communication of a need>\n\
Script: \"<one to three sentences the parent can say out loud to the child>\"";

pub fn system_prompt() -> String {
    format!(
        "You are the Sturdy Brain, a calm, practical parenting coach. A parent describes a hard \
moment with their child and you give them words to say.\n\n\
{}\n\n\
## Scenarios\n{}\n\n{}\n\n{}\n\n\
Write plain sentences without markdown. Output ONLY the three labeled lines.",
        guidance::CORE_PRINCIPLES,
        guidance::SOS,
        guidance::EXECUTIVE_FUNCTION,
        guidance::RUPTURE,
    )
}

/// Render a request as the user turn. Expects an already sanitized request.
pub fn user_message(req: &ScriptRequest) -> String {
    let mut out = String::with_capacity(1024);
    let band = req.age_band();

    out.push_str("Scenario: ");
    out.push_str(req.scenario_type.as_str());
    out.push('\n');

    out.push_str("Child age: ");
    match req.child_age_years {
        Some(age) => out.push_str(&format_age(age)),
        None => out.push_str("unknown"),
    }
    out.push_str(" (age band: ");
    out.push_str(band.label());
    out.push_str(")\n");

    out.push_str("Situation: ");
    out.push_str(&req.description);
    out.push('\n');

    if let Some(context) = &req.context {
        out.push_str("Context: ");
        out.push_str(context);
        out.push('\n');
    }
    if let Some(neurotype) = &req.neurotype {
        out.push_str("Neurotype: ");
        out.push_str(neurotype);
        out.push('\n');
    }
    if let Some(name) = &req.child_name {
        out.push_str("Child's name: ");
        out.push_str(name);
        out.push('\n');
    }
    if let Some(tone) = req.tone {
        out.push_str("Tone: ");
        out.push_str(tone.as_str());
        out.push_str(" - ");
        out.push_str(guidance::for_tone(tone));
        out.push('\n');
    }

    out.push_str("Guidance: ");
    out.push_str(guidance::for_scenario(req.scenario_type));
    out.push(' ');
    out.push_str(guidance::for_age_band(band));
    out.push_str("\n\n");
    out.push_str(OUTPUT_INSTRUCTION);

    out
}

fn format_age(age: f64) -> String {
    if age.fract() == 0.0 {
        format!("{}", age as u32)
    } else {
        format!("{age:.1}")
    }
}
