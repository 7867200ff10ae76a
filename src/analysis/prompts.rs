// src/analysis/prompts.rs
//! Prompt templates sent to the completion service

/// Ask for a condensed, contact-free summary of the CV
pub fn cv_summary_prompt(cv_text: &str) -> String {
    format!(
        r#"You are a professional recruiter preparing a CV for keyword matching.

CV TEXT:
{}

TASK: Write a condensed structured summary of this CV. Leave out names, emails, phone numbers and addresses. Use these sections:

SKILLS: comma-separated technical and soft skills
EXPERIENCE: one line per role with title, duration and key technologies
EDUCATION: degrees and institutions
PROJECTS: one line per project with the technologies used
CERTIFICATIONS: if any

Keep every skill, tool and technology that appears in the CV. Answer with the summary only."#,
        cv_text
    )
}

/// Ask for the match analysis as one JSON object
pub fn scoring_prompt(cv_content: &str, job_description: &str) -> String {
    format!(
        r#"You are an applicant tracking system comparing a CV against a job description.

CV:
{}

JOB DESCRIPTION:
{}

TASK: Extract the important keywords (skills, tools, qualifications) from the job description, check which of them the CV covers, and respond with ONLY a JSON object in exactly this format:

{{
  "match_percentage": <integer from 0 to 100>,
  "matched_keywords": ["keywords from the job description found in the CV"],
  "missing_keywords": ["keywords from the job description missing from the CV"],
  "suggestions": ["specific, actionable improvements to the CV"],
  "strengths": ["aspects of the CV that fit the job well"],
  "jd_keywords_count": <total number of keywords extracted from the job description>
}}

Do not add any text before or after the JSON object."#,
        cv_content, job_description
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_prompt_embeds_inputs_and_keys() {
        let prompt = scoring_prompt("React, CSS", "React, Node.js, CSS");
        assert!(prompt.contains("CV:\nReact, CSS\n"));
        assert!(prompt.contains("JOB DESCRIPTION:\nReact, Node.js, CSS\n"));
        for key in [
            "\"match_percentage\"",
            "\"matched_keywords\"",
            "\"missing_keywords\"",
            "\"suggestions\"",
            "\"strengths\"",
            "\"jd_keywords_count\"",
        ] {
            assert!(prompt.contains(key), "missing {}", key);
        }
    }

    #[test]
    fn test_summary_prompt_embeds_cv() {
        let prompt = cv_summary_prompt("John Doe\nSKILLS: Rust");
        assert!(prompt.contains("John Doe\nSKILLS: Rust"));
        assert!(prompt.contains("SKILLS:"));
    }
}
