//! Structural checks on templates before they are stored
//!
//! Findings are advisory. The pipeline logs them and stores the template
//! regardless, so a slightly inconsistent synthesized template is still usable.

use lazy_static::lazy_static;
use regex::Regex;
use shared_types::NewTemplate;
use std::fmt;

use crate::render::placeholders;

lazy_static! {
    static ref SNAKE_CASE_KEY: Regex = Regex::new(r"^[a-z][a-z0-9]*(_[a-z0-9]+)*$").unwrap();
}

/// One structural issue found in a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationFinding {
    /// Placeholder in the body with no declared variable
    UndeclaredPlaceholder(String),
    /// Declared variable never referenced by the body
    UnusedVariable(String),
    /// Declared key that is not snake_case
    InvalidKey(String),
}

impl fmt::Display for VerificationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndeclaredPlaceholder(key) => write!(f, "Undeclared placeholder: {{{{{}}}}}", key),
            Self::UnusedVariable(key) => write!(f, "Declared variable not used in body: {}", key),
            Self::InvalidKey(key) => write!(f, "Variable key is not snake_case: {}", key),
        }
    }
}

/// Result of verifying one template
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VerificationResult {
    pub findings: Vec<VerificationFinding>,
}

impl VerificationResult {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// A single structural check
pub trait Verifier: Send + Sync {
    fn verify(&self, template: &NewTemplate) -> Vec<VerificationFinding>;

    fn name(&self) -> &str;
}

/// Body placeholders and declared variables must agree
pub struct PlaceholderVerifier;

impl Verifier for PlaceholderVerifier {
    fn verify(&self, template: &NewTemplate) -> Vec<VerificationFinding> {
        let used = placeholders(&template.body);
        let mut findings: Vec<VerificationFinding> = used
            .iter()
            .filter(|key| !template.variables.iter().any(|v| &v.key == *key))
            .map(|key| VerificationFinding::UndeclaredPlaceholder(key.clone()))
            .collect();

        findings.extend(
            template
                .variables
                .iter()
                .filter(|v| !used.contains(&v.key))
                .map(|v| VerificationFinding::UnusedVariable(v.key.clone())),
        );
        findings
    }

    fn name(&self) -> &str {
        "placeholders"
    }
}

/// Declared keys must be snake_case
pub struct KeyFormatVerifier;

impl Verifier for KeyFormatVerifier {
    fn verify(&self, template: &NewTemplate) -> Vec<VerificationFinding> {
        template
            .variables
            .iter()
            .filter(|v| !SNAKE_CASE_KEY.is_match(&v.key))
            .map(|v| VerificationFinding::InvalidKey(v.key.clone()))
            .collect()
    }

    fn name(&self) -> &str {
        "key-format"
    }
}

/// Runs every registered verifier over a template
pub struct TemplateVerifier {
    verifiers: Vec<Box<dyn Verifier>>,
}

impl Default for TemplateVerifier {
    fn default() -> Self {
        Self::empty()
            .add_verifier(Box::new(PlaceholderVerifier))
            .add_verifier(Box::new(KeyFormatVerifier))
    }
}

impl TemplateVerifier {
    /// Verifier with no checks registered
    pub fn empty() -> Self {
        Self {
            verifiers: Vec::new(),
        }
    }

    pub fn add_verifier(mut self, verifier: Box<dyn Verifier>) -> Self {
        self.verifiers.push(verifier);
        self
    }

    pub fn verify(&self, template: &NewTemplate) -> VerificationResult {
        VerificationResult {
            findings: self
                .verifiers
                .iter()
                .flat_map(|verifier| verifier.verify(template))
                .collect(),
        }
    }

    /// Verify and log each finding as a warning, tagged with the check that raised it
    pub fn verify_and_log(&self, template: &NewTemplate) -> VerificationResult {
        let mut findings = Vec::new();
        for verifier in &self.verifiers {
            for finding in verifier.verify(template) {
                tracing::warn!(
                    "Template '{}' failed {} check: {}",
                    template.title,
                    verifier.name(),
                    finding
                );
                findings.push(finding);
            }
        }
        VerificationResult { findings }
    }
}
