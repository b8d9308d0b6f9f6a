//! The ATS evaluation prompt and its placeholder substitution

use crate::error::{Result, SmartAtsError};
use crate::processing::normalizer::NormalizedText;
use serde::{Deserialize, Serialize};

/// Bumped whenever the wording of [`ATS_EVALUATION_TEMPLATE`] changes; a new
/// wording changes how responses are scored.
pub const TEMPLATE_VERSION: &str = "1.0.0";

pub const JOB_DESCRIPTION_PLACEHOLDER: &str = "job_description";
pub const RESUME_PLACEHOLDER: &str = "resume";

/// Values substituted into the template for one request.
#[derive(Debug, Clone, Copy)]
pub struct PromptParams<'a> {
    pub job_description: &'a str,
    pub resume: &'a NormalizedText,
}

/// A fully rendered prompt, ready for the generation client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDocument {
    pub text: String,
    pub template_version: String,
}

impl PromptDocument {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub ats_evaluation: &'static str,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            ats_evaluation: ATS_EVALUATION_TEMPLATE,
        }
    }
}

impl PromptTemplates {
    pub fn render_ats_evaluation(&self, params: &PromptParams<'_>) -> Result<PromptDocument> {
        let text = substitute(self.ats_evaluation, |name| match name {
            JOB_DESCRIPTION_PLACEHOLDER => Some(params.job_description),
            RESUME_PLACEHOLDER => Some(params.resume.as_str()),
            _ => None,
        })?;

        log::debug!(
            "Rendered prompt v{}: {} chars (job description {} chars, resume {} chars)",
            TEMPLATE_VERSION,
            text.len(),
            params.job_description.len(),
            params.resume.as_str().len()
        );

        Ok(PromptDocument {
            text,
            template_version: TEMPLATE_VERSION.to_string(),
        })
    }
}

/// Single left-to-right pass over `template`.
///
/// `{{` and `}}` produce literal braces and `{name}` is replaced by
/// `lookup(name)`. Substituted values are copied as-is and never scanned, so
/// braces inside them are inert. Every placeholder `lookup` knows about must
/// appear at least once.
fn substitute<'v, F>(template: &str, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<&'v str>,
{
    let mut out = String::with_capacity(template.len());
    let mut seen = Vec::new();
    let mut rest = template;

    while let Some(pos) = rest.find(['{', '}']) {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];

        if let Some(after) = tail.strip_prefix("{{") {
            out.push('{');
            rest = after;
        } else if let Some(after) = tail.strip_prefix("}}") {
            out.push('}');
            rest = after;
        } else if tail.starts_with('}') {
            return Err(SmartAtsError::TemplateSubstitution(format!(
                "single '}}' at byte {} of the template",
                template.len() - tail.len()
            )));
        } else {
            let close = tail.find('}').ok_or_else(|| {
                SmartAtsError::TemplateSubstitution("unclosed '{' in the template".to_string())
            })?;
            let name = &tail[1..close];
            if name.contains('{') {
                return Err(SmartAtsError::TemplateSubstitution(format!(
                    "nested '{{' inside placeholder '{}'",
                    name
                )));
            }
            let value = lookup(name).ok_or_else(|| {
                SmartAtsError::TemplateSubstitution(format!("unknown placeholder '{{{}}}'", name))
            })?;
            out.push_str(value);
            if !seen.contains(&name) {
                seen.push(name);
            }
            rest = &tail[close + 1..];
        }
    }
    out.push_str(rest);

    for required in [JOB_DESCRIPTION_PLACEHOLDER, RESUME_PLACEHOLDER] {
        if lookup(required).is_some() && !seen.contains(&required) {
            return Err(SmartAtsError::TemplateSubstitution(format!(
                "template never uses placeholder '{{{}}}'",
                required
            )));
        }
    }

    Ok(out)
}

const ATS_EVALUATION_TEMPLATE: &str = r#"
Act as a highly advanced Applicant Tracking System (ATS) with deep expertise in Software Engineering, Data Science, Big Data, and Frontend/Backend Development. Your goal is to provide a nuanced and accurate assessment of a candidate's resume against a given job description.

You will receive:

A job description (JD) in the format of a text string:
jd: {job_description}

A resume (extracted text from a PDF):
resume: {resume}

Your tasks:

1. **Analyze the Resume against the JD based on the following key criteria:**

   * **Keyword Matching:** Conduct a thorough comparison of both technical (e.g., programming languages, frameworks, tools) and non-technical (e.g., methodologies, soft skills, role-specific verbs) keywords present in both the resume and the job description. Pay close attention to the presence and frequency of essential keywords highlighted in the JD.
   * **Experience Relevance:** Evaluate the alignment of the candidate's work experience with the specific requirements outlined in the job description. Consider the technologies used, methodologies applied, and the nature of the projects and responsibilities in relation to the JD's demands. For example, strong experience with "React.js" is more relevant for a JD explicitly requiring it than general "JavaScript" experience.
   * **JD & Industry Fit:** Assess the overall compatibility of the candidate's background, including domain knowledge, industry experience (if specified), and the general trajectory of their career, with the context and requirements of the job description.

2. **Assign an Accurate JD Match Percentage:**

   * Calculate this percentage based on a weighted evaluation of keyword matches (prioritizing critical technical skills and industry terms), the depth and directness of experience relevance, and the overall industry fit. The percentage should reflect genuine alignment, decreasing significantly for tangential skills or a lack of key requirements.

3. **List Missing Keywords:**

   * Identify keywords present in the job description but absent from the resume. Prioritize listing technical skills, industry-specific terminology, and crucial tools or frameworks that are explicitly mentioned and appear central to the role's responsibilities.

4. **Generate a Concise and Relevant Profile Summary:**

   * Based *solely* on the information presented in the resume, create a brief summary (2-3 sentences maximum) that highlights the candidate's key skills, relevant experience, and strengths that directly align with the requirements and preferences stated in the job description. Avoid introducing any external information or making assumptions.

5. **Handle Invalid Resumes:**

   * If the content of `resume` does not clearly resemble a professional resume (e.g., it's too short, lacks standard resume sections like "Experience" or "Skills," or contains gibberish), return the following error message:

     ```
     Error: The uploaded document does not appear to be a valid resume. Please upload a professional resume in PDF format.
     ```

**Important Notes (Reinforced):**

* The JD Match Percentage must be dynamic and reflect the actual degree of alignment. Avoid static or inflated scores.
* Your analysis should clearly differentiate between direct matches, related skills, and significant mismatches to ensure the accuracy of the match percentage and missing keywords.
Directly Incorporates "Key Points": The prompt now explicitly instructs the ATS to analyze based on the provided "Key Points," ensuring they are central to the evaluation process.
Weighted Evaluation: The instruction to use a "weighted evaluation" for the match percentage emphasizes the importance of prioritizing critical skills and direct experience.
Specificity in Missing Keywords: The prompt clarifies the prioritization of missing keywords, focusing on technical, industry-specific, and crucial terms.
Strict Profile Summary Constraint: The instruction to base the profile summary solely on the resume and to keep it concise prevents the AI from making assumptions or including extraneous details.
Clearer Error Handling: The error message for invalid resumes is more specific about the expected format.
Reinforced Important Notes: The crucial aspects of dynamic percentage and accurate discrepancy analysis are reiterated for emphasis.

**Format your response exactly as below:**

JD Match Percentage: XX%

Missing Keywords:
  - keyword1
  - keyword2


Profile Summary:
  [Summary here]
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::normalizer::TextNormalizer;

    fn lookup<'a>(jd: &'a str, resume: &'a str) -> impl Fn(&str) -> Option<&'a str> {
        move |name: &str| match name {
            JOB_DESCRIPTION_PLACEHOLDER => Some(jd),
            RESUME_PLACEHOLDER => Some(resume),
            _ => None,
        }
    }

    #[test]
    fn placeholders_are_filled_and_template_text_kept() {
        let templates = PromptTemplates::default();
        let resume = TextNormalizer::new().normalize("Built UIs with React");
        let prompt = templates
            .render_ats_evaluation(&PromptParams {
                job_description: "React.js required",
                resume: &resume,
            })
            .unwrap();

        assert!(prompt.text.contains("jd: React.js required\n"));
        assert!(prompt.text.contains("resume: Built UIs with React\n"));
        assert_eq!(prompt.template_version, TEMPLATE_VERSION);

        let expected = ATS_EVALUATION_TEMPLATE
            .replace("{job_description}", "React.js required")
            .replace("{resume}", "Built UIs with React");
        assert_eq!(prompt.text, expected);
    }

    #[test]
    fn empty_resume_still_renders() {
        let templates = PromptTemplates::default();
        let resume = NormalizedText::default();
        let prompt = templates
            .render_ats_evaluation(&PromptParams {
                job_description: "Rust engineer",
                resume: &resume,
            })
            .unwrap();

        assert!(prompt.text.contains("resume: \n"));
        assert!(prompt.text.contains("JD Match Percentage: XX%"));
    }

    #[test]
    fn braces_in_values_are_inserted_literally() {
        let out = substitute("a {job_description} b {resume} c", lookup("{resume} {{x}}", "}{")).unwrap();
        assert_eq!(out, "a {resume} {{x}} b }{ c");
    }

    #[test]
    fn doubled_braces_in_template_are_literal() {
        let out = substitute("{{literal}} {job_description} {resume}", lookup("J", "R")).unwrap();
        assert_eq!(out, "{literal} J R");
    }

    #[test]
    fn unknown_placeholder_is_rejected() {
        let err = substitute("{job_description} {resume} {company}", lookup("J", "R")).unwrap_err();
        assert!(matches!(err, SmartAtsError::TemplateSubstitution(_)));
        assert!(err.to_string().contains("company"));
    }

    #[test]
    fn unbalanced_braces_are_rejected() {
        for template in ["{job_description} {resume} }", "{job_description} {resume", "{job_{description}"] {
            let err = substitute(template, lookup("J", "R")).unwrap_err();
            assert!(
                matches!(err, SmartAtsError::TemplateSubstitution(_)),
                "accepted {:?}",
                template
            );
        }
    }

    #[test]
    fn missing_placeholder_is_rejected() {
        let err = substitute("only {job_description}", lookup("J", "R")).unwrap_err();
        assert!(err.to_string().contains("resume"));
    }

    #[test]
    fn shipped_template_has_exactly_the_two_placeholders() {
        assert_eq!(ATS_EVALUATION_TEMPLATE.matches("{job_description}").count(), 1);
        assert_eq!(ATS_EVALUATION_TEMPLATE.matches("{resume}").count(), 1);
        assert_eq!(ATS_EVALUATION_TEMPLATE.matches('{').count(), 2);
        assert_eq!(ATS_EVALUATION_TEMPLATE.matches('}').count(), 2);
    }
}
