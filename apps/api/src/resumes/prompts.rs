// Resume extraction prompt templates.

pub const RESUME_FORMAT_INSTRUCTIONS: &str = r#"The output should be formatted as a JSON object that conforms to the schema below.

OUTPUT SCHEMA (every field may be null or omitted when the text does not mention it):
{
  "contact": {
    "name": "string" | null,
    "email": "string" | null,
    "phone": "string" | null,
    "location": "string" | null
  } | null,
  "summary": "string" | null,
  "experience": [
    {
      "company": "string" | null,
      "role": "string" | null,
      "start_date": "string" | null,
      "end_date": "string" | null,
      "duration": "string" | null,
      "responsibilities": ["string"]
    }
  ],
  "education": [
    {
      "degree": "string" | null,
      "institution": "string" | null,
      "year": "string" | null
    }
  ],
  "skills": ["string"],
  "certifications": ["string"]
}"#;

pub const RESUME_PARSE_PROMPT: &str = r#"Extract structured resume fields from the text below and return JSON exactly matching the requested schema.

Text:
"""{raw_text}"""
"#;

/// Format instructions followed by the document text.
pub fn build_resume_prompt(raw_text: &str) -> String {
    format!(
        "{RESUME_FORMAT_INSTRUCTIONS}\n\n{}",
        RESUME_PARSE_PROMPT.replace("{raw_text}", raw_text)
    )
}
