//! Prompt templates, rendered with Tera.
//!
//! Templates are compiled into the binary. The render context is built from
//! the validated flow input, so template variables use the wire (camelCase)
//! field names; flows may add fixed values such as the canonical disclaimer.

use tera::{Context, Tera};

/// Template name and source for each flow prompt.
const TEMPLATES: &[(&str, &str)] = &[
    (
        "symptom_analysis",
        include_str!("../../templates/prompts/symptom_analysis.txt"),
    ),
    (
        "extract_health_data",
        include_str!("../../templates/prompts/extract_health_data.txt"),
    ),
    (
        "analyze_health_data",
        include_str!("../../templates/prompts/analyze_health_data.txt"),
    ),
    (
        "xray_analysis",
        include_str!("../../templates/prompts/xray_analysis.txt"),
    ),
    (
        "find_doctors",
        include_str!("../../templates/prompts/find_doctors.txt"),
    ),
    (
        "app_guide_chat",
        include_str!("../../templates/prompts/app_guide_chat.txt"),
    ),
];

pub struct PromptRenderer {
    tera: Tera,
}

impl PromptRenderer {
    /// Compile the built-in prompt templates.
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        // Prompts are plain text; HTML escaping would mangle user input.
        tera.autoescape_on(vec![]);
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, tera::Error> {
        let rendered = self.tera.render(template, context)?;
        Ok(collapse_blank_lines(&rendered))
    }

    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.tera.get_template_names()
    }
}

/// Squash runs of blank lines left behind by skipped template blocks.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0;
    for line in text.trim().lines() {
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
