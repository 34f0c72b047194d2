//! Prompt construction.

/// Prompt asking for a JSON-only explanation of `word` as used in `context`.
pub fn explain_prompt(word: &str, context: &str) -> String {
    format!(
        r#"Analyze the word "{word}" in this context: "{context}".

Return ONLY a valid JSON object (no markdown, no extra text) with EXACTLY these keys:
- "meaning": string (brief definition in this context)
- "synonyms": string[] (3-5 items)
- "antonyms": string[] (3-5 items)
- "simplifiedExplanation": string (simple explanation)

Rules:
- Use double quotes for all keys and string values.
- Do not include trailing commas.
- Ensure the JSON is complete and ends with a closing curly brace.
"#
    )
}
