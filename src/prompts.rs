//! Instruction templates sent to the backend's completion endpoint, plus the
//! parsing helpers for what comes back.

/// Instruction for structured profile extraction. The backend returns model
/// text, so the contract is "JSON only" and the caller still parses
/// defensively.
pub fn profile_extraction_instruction(cv_text: &str) -> String {
    format!(
        "You are an expert technical recruiter.\n\
        Extract the key skills, work experience and education from the CV below.\n\
        Return only a JSON object with this exact shape:\n\
        {{ \"skills\": [\"...\"], \
        \"experience\": [ {{ \"title\": \"...\", \"company\": \"...\", \"duration\": \"...\", \"description\": \"...\" }} ], \
        \"education\": [ {{ \"degree\": \"...\", \"institution\": \"...\", \"year\": \"...\" }} ] }}\n\
        No explanation, no markdown.\n\n\
        CV:\n{}",
        cv_text
    )
}

pub fn interview_questions_instruction(cv_text: &str) -> String {
    format!(
        "You are an expert technical recruiter.\n\
        Please extract the key skills, experience and education from the CV below.\n\
        Then, based on that, generate exactly 15 professional interview questions.\n\n\
        {}\n\n\
        Return only the list of questions, clearly numbered. No explanation.",
        cv_text
    )
}

/// Strips a markdown code fence (``` or ```json) wrapping model output.
pub fn strip_code_blocks(s: &str) -> String {
    let s = s.trim();
    if s.starts_with("```json") {
        s.trim_start_matches("```json")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else if s.starts_with("```") {
        s.trim_start_matches("```")
            .trim_end_matches("```")
            .trim()
            .to_string()
    } else {
        s.to_string()
    }
}

/// Parses a numbered question list out of free model text. Lines that start
/// with "1." / "2)" etc. are taken in order with the numbering stripped. If no
/// line is numbered, every non-empty line is kept instead.
pub fn parse_question_list(response: &str) -> Vec<String> {
    let mut questions = Vec::new();
    for line in response.lines() {
        let line = line.trim();
        if let Some(q) = strip_leading_number(line) {
            if !q.is_empty() {
                questions.push(q.to_string());
            }
        }
    }

    if questions.is_empty() {
        return response
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
    }
    questions
}

fn strip_leading_number(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    Some(rest.trim())
}
