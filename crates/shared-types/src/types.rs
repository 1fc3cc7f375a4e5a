use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned template identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub u64);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TemplateId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(TemplateId)
    }
}

impl From<u64> for TemplateId {
    fn from(id: u64) -> Self {
        TemplateId(id)
    }
}

/// Value type of a template variable.
///
/// Anything the analyzer returns outside the four known kinds is read as `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    Date,
    Number,
    Duration,
    #[default]
    #[serde(other)]
    String,
}

impl VariableType {
    /// Short format hint shown next to questions
    pub fn format_hint(&self) -> Option<&'static str> {
        match self {
            VariableType::String => None,
            VariableType::Date => Some("YYYY-MM-DD"),
            VariableType::Number => Some("digits only"),
            VariableType::Duration => Some("e.g. 12 months"),
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableType::String => write!(f, "string"),
            VariableType::Date => write!(f, "date"),
            VariableType::Number => write!(f, "number"),
            VariableType::Duration => write!(f, "duration"),
        }
    }
}

/// Declared metadata for one `{{key}}` placeholder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Literal value as it appeared in the source text (ingestion only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub dtype: VariableType,
}

impl VariableSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: None,
            example: None,
            required: false,
            dtype: VariableType::String,
        }
    }

    /// Mark the variable as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_dtype(mut self, dtype: VariableType) -> Self {
        self.dtype = dtype;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// Label for display, falling back to the key when the label is blank
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.key
        } else {
            &self.label
        }
    }

    /// Trimmed example, if one is present and non-blank
    pub fn example_text(&self) -> Option<&str> {
        self.example
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Fill blank labels from the key and collapse blank optionals to `None`
    pub fn normalized(mut self) -> Self {
        self.key = self.key.trim().to_string();
        if self.label.trim().is_empty() {
            self.label = self.key.clone();
        }
        self.description = self.description.filter(|d| !d.trim().is_empty());
        self.example = self.example.filter(|e| !e.trim().is_empty());
        self
    }
}

/// Stored document skeleton with named placeholders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub variables: Vec<VariableSpec>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub embedding: Option<Vec<f32>>,
}

impl Template {
    /// Look up a declared variable by key
    pub fn variable(&self, key: &str) -> Option<&VariableSpec> {
        self.variables.iter().find(|v| v.key == key)
    }

    pub fn required_variables(&self) -> impl Iterator<Item = &VariableSpec> {
        self.variables.iter().filter(|v| v.required)
    }

    /// Text the embedding is derived from
    pub fn embedding_text(&self) -> String {
        embedding_text(&self.title, &self.tags)
    }
}

/// A template that has not been assigned an id yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub title: String,
    pub body: String,
    pub variables: Vec<VariableSpec>,
    pub tags: Vec<String>,
    pub embedding: Option<Vec<f32>>,
}

impl NewTemplate {
    /// Build a new template, keeping the first declaration of each key and
    /// dropping blank or repeated tags.
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        variables: Vec<VariableSpec>,
        tags: Vec<String>,
    ) -> Self {
        let mut unique_vars: Vec<VariableSpec> = Vec::with_capacity(variables.len());
        for var in variables {
            if var.key.is_empty() || unique_vars.iter().any(|v| v.key == var.key) {
                continue;
            }
            unique_vars.push(var);
        }

        let mut unique_tags: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_string();
            if !tag.is_empty() && !unique_tags.contains(&tag) {
                unique_tags.push(tag);
            }
        }

        Self {
            title: title.into(),
            body: body.into(),
            variables: unique_vars,
            tags: unique_tags,
            embedding: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Text the embedding is derived from
    pub fn embedding_text(&self) -> String {
        embedding_text(&self.title, &self.tags)
    }

    pub fn into_template(self, id: TemplateId) -> Template {
        Template {
            id,
            title: self.title,
            body: self.body,
            variables: self.variables,
            tags: self.tags,
            embedding: self.embedding,
        }
    }
}

fn embedding_text(title: &str, tags: &[String]) -> String {
    let mut text = title.trim().to_string();
    for tag in tags {
        text.push(' ');
        text.push_str(tag);
    }
    text
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
