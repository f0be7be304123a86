use crate::core::vocabulary::SymptomVocabulary;
use crate::domain::model::{ConditionInfo, Diagnosis, DiagnosisReport};
use crate::utils::error::Result;
use serde::Serialize;
use std::fmt::Write;

pub const NO_SYMPTOMS_MESSAGE: &str = "⚠️ Please select at least one symptom!";
pub const NO_MATCH_MESSAGE: &str = "⚠️ No strong condition match found with the selected symptoms. Please consult a doctor for proper diagnosis.";
pub const DISCLAIMER: &str = "💙 This is an educational tool, not a diagnosis. For accurate diagnosis and treatment, please consult a qualified healthcare professional.";

const DOS: [&str; 6] = [
    "Stay hydrated - drink plenty of water",
    "Get adequate rest (7-9 hours sleep)",
    "Maintain good hygiene",
    "Eat nutritious, balanced meals",
    "Monitor your symptoms",
    "Follow medication instructions carefully",
];

const SEEK_HELP: [&str; 6] = [
    "Difficulty breathing or chest pain",
    "High fever (>103°F/39.4°C)",
    "Severe pain or discomfort",
    "Symptoms worsen or don't improve",
    "Signs of dehydration",
    "Confusion or altered mental state",
];

#[derive(Debug, Serialize)]
struct JsonOut<'a, T: Serialize> {
    ok: bool,
    data: &'a T,
}

pub fn render_json<T: Serialize>(data: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonOut { ok: true, data })?)
}

fn push_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "   {}", title);
    for item in items {
        let _ = writeln!(out, "     - {}", item);
    }
}

fn push_info(out: &mut String, info: &ConditionInfo) {
    let _ = writeln!(out, "   📖 {}", info.description);
    push_list(out, "💊 Over-the-counter medicines:", &info.otc_medicines);
    push_list(
        out,
        "⚕️ Prescription medicines (require doctor consultation):",
        &info.prescription_medicines,
    );
    push_list(out, "🏠 Home remedies & self-care:", &info.home_remedies);
    push_list(out, "🥗 Recommended foods & diet:", &info.diet);
}

fn push_match(out: &mut String, diagnosis: &Diagnosis) {
    if diagnosis.rank == 1 {
        let _ = writeln!(out, "🥇 Most likely: {}", diagnosis.condition);
    } else {
        let _ = writeln!(out, "#{}: {}", diagnosis.rank, diagnosis.condition);
    }
    let _ = writeln!(out, "   Confidence: {:.1}%", diagnosis.score);
    if let Some(info) = &diagnosis.info {
        push_info(out, info);
    }
    out.push('\n');
}

/// Human readable report.
pub fn render_text(report: &DiagnosisReport, vocabulary: &SymptomVocabulary) -> String {
    let mut out = String::new();

    if report.selected.is_empty() {
        let _ = writeln!(out, "{}", NO_SYMPTOMS_MESSAGE);
        if !report.ignored.is_empty() {
            let _ = writeln!(out, "Unknown symptoms: {}", report.ignored.join(", "));
        }
        return out;
    }

    let labels: Vec<&str> = report
        .selected
        .iter()
        .map(|s| vocabulary.label(s).unwrap_or(s.as_str()))
        .collect();
    let _ = writeln!(out, "📝 Selected symptoms: {}", labels.join(", "));
    if !report.ignored.is_empty() {
        let _ = writeln!(out, "   Ignored (unknown): {}", report.ignored.join(", "));
    }
    out.push('\n');

    if !report.has_matches() {
        let _ = writeln!(out, "{}", NO_MATCH_MESSAGE);
        return out;
    }

    let _ = writeln!(
        out,
        "🏥 Possible conditions (ranked by confidence, {} strategy)\n",
        report.strategy
    );
    for diagnosis in &report.matches {
        push_match(&mut out, diagnosis);
    }

    let _ = writeln!(out, "✅ Do's");
    for item in DOS {
        let _ = writeln!(out, "   - {}", item);
    }
    let _ = writeln!(out, "⚠️ When to seek immediate medical help");
    for item in SEEK_HELP {
        let _ = writeln!(out, "   - {}", item);
    }
    out.push('\n');
    let _ = writeln!(out, "{}", DISCLAIMER);
    out
}

pub fn render_symptoms(vocabulary: &SymptomVocabulary) -> String {
    let mut out = String::new();
    for symptom in vocabulary.symptoms() {
        let _ = writeln!(
            out,
            "{:<22} {}",
            symptom.as_str(),
            vocabulary.label(symptom).unwrap_or_default()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{SelectedSymptomSet, Symptom};

    fn vocabulary() -> SymptomVocabulary {
        SymptomVocabulary::with_labels(
            vec![Symptom::new("fever"), Symptom::new("chills")],
            vec!["Fever".to_string(), "Chills".to_string()],
        )
        .unwrap()
    }

    fn report(matches: Vec<Diagnosis>) -> DiagnosisReport {
        DiagnosisReport {
            strategy: "profile".to_string(),
            selected: ["fever", "chills"].into_iter().collect(),
            ignored: vec![],
            matches,
        }
    }

    #[test]
    fn test_render_ranked_matches() {
        let text = render_text(
            &report(vec![
                Diagnosis {
                    rank: 1,
                    condition: "Influenza (Flu)".to_string(),
                    score: 44.6153,
                    info: Some(ConditionInfo {
                        name: "Influenza (Flu)".to_string(),
                        description: "A contagious respiratory illness.".to_string(),
                        otc_medicines: vec!["Paracetamol".to_string()],
                        prescription_medicines: vec![],
                        home_remedies: vec![],
                        diet: vec![],
                    }),
                },
                Diagnosis {
                    rank: 2,
                    condition: "COVID-19".to_string(),
                    score: 18.0,
                    info: None,
                },
            ]),
            &vocabulary(),
        );

        assert!(text.contains("Selected symptoms: Chills, Fever"));
        assert!(text.contains("🥇 Most likely: Influenza (Flu)"));
        assert!(text.contains("Confidence: 44.6%"));
        assert!(text.contains("     - Paracetamol"));
        assert!(!text.contains("Prescription medicines"));
        assert!(text.contains("#2: COVID-19"));
        assert!(text.contains(DISCLAIMER));
    }

    #[test]
    fn test_render_no_match_and_no_symptoms() {
        let text = render_text(&report(vec![]), &vocabulary());
        assert!(text.contains(NO_MATCH_MESSAGE));

        let empty = DiagnosisReport {
            strategy: "profile".to_string(),
            selected: SelectedSymptomSet::new(),
            ignored: vec!["glowing_skin".to_string()],
            matches: vec![],
        };
        let text = render_text(&empty, &vocabulary());
        assert!(text.starts_with(NO_SYMPTOMS_MESSAGE));
        assert!(text.contains("glowing_skin"));
    }

    #[test]
    fn test_render_json_wraps_data() {
        let json = render_json(&report(vec![])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(value["data"]["strategy"], "profile");
        assert_eq!(value["data"]["selected"][0], "chills");
    }
}
