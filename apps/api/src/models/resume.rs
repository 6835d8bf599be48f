use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum number of characters of extracted text kept on a stored record.
pub const RAW_TEXT_CAP: usize = 5000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub duration: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub responsibilities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub institution: Option<String>,
    /// Models frequently emit this as a number; it is stored as text.
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
}

/// The fields the model is asked to fill. Any identifier the model invents is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub contact: Option<ContactInfo>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub experience: Vec<JobEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub education: Vec<EducationEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certifications: Vec<String>,
}

/// The persisted unit, keyed by `document_id` in the metadata store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub document_id: String,
    pub contact: Option<ContactInfo>,
    pub summary: Option<String>,
    #[serde(default)]
    pub experience: Vec<JobEntry>,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub raw_text: String,
    /// Set only when no structure could be recovered from the model output.
    #[serde(rename = "_raw", default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl ResumeRecord {
    pub fn new(document_id: String, parsed: ParsedResume, extracted_text: &str) -> Self {
        let ParsedResume {
            contact,
            summary,
            experience,
            education,
            skills,
            certifications,
        } = parsed;

        Self {
            document_id,
            contact,
            summary,
            experience,
            education,
            skills,
            certifications,
            raw_text: truncate_chars(extracted_text, RAW_TEXT_CAP),
            raw_response: None,
        }
    }

    /// Record for a model response that could not be coerced into the schema.
    pub fn unstructured(document_id: String, raw_response: String, extracted_text: &str) -> Self {
        Self {
            raw_response: Some(raw_response),
            ..Self::new(document_id, ParsedResume::default(), extracted_text)
        }
    }

    pub fn is_unstructured(&self) -> bool {
        self.raw_response.is_some()
    }
}

/// Prefix truncation on character boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}

/// Accepts strings, numbers and booleans; everything else becomes `None`.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| scalar_to_string(&v)))
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
