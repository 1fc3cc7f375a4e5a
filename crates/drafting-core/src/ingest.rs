//! Turn raw document text into a parametrized template body
//!
//! Each detected variable's literal example is replaced by its `{{key}}`
//! placeholder. Substitution only touches text outside placeholders that are
//! already in the body, so a later variable can never rewrite an earlier one.

use regex::{NoExpand, Regex, RegexBuilder};
use shared_types::VariableSpec;

use crate::render::PLACEHOLDER_PATTERN;

/// Examples shorter than this are too ambiguous to substitute
const MIN_EXAMPLE_CHARS: usize = 2;

/// Replace every example occurrence with its placeholder.
///
/// Pass one matches each example case-insensitively on word boundaries, in
/// declaration order. Pass two retargets `Name: <example>` signature lines.
pub fn parametrize_body(raw_text: &str, variables: &[VariableSpec]) -> String {
    let mut body = raw_text.to_string();

    for var in variables {
        let Some(example) = usable_example(var) else {
            continue;
        };
        let Some(pattern) = build_pattern(&format!(r"\b{}\b", regex::escape(example))) else {
            continue;
        };
        let (next, count) = replace_outside_placeholders(&body, &pattern, &placeholder(&var.key));
        if count > 0 {
            tracing::debug!("Parametrized {} occurrence(s) of '{}'", count, var.key);
        }
        body = next;
    }

    for var in variables {
        let Some(example) = usable_example(var) else {
            continue;
        };
        let (next, _) = replace_signature(&body, &var.key, example, "");
        body = next;
    }

    body
}

/// Rewrite `Name: <example>` to `Name: {{key}}` where the example ends on a
/// word boundary, returning the new body and the number of lines changed.
///
/// Stricter than the ingestion pass so a maintenance run over stored
/// templates never cuts a longer name short.
pub fn retarget_signature(body: &str, key: &str, example: &str) -> (String, usize) {
    replace_signature(body, key, example, r"\b")
}

fn replace_signature(body: &str, key: &str, example: &str, suffix: &str) -> (String, usize) {
    let example = example.trim();
    if example.chars().count() < MIN_EXAMPLE_CHARS {
        return (body.to_string(), 0);
    }
    let pattern = format!(r"Name:\s*{}{}", regex::escape(example), suffix);
    let Some(pattern) = build_pattern(&pattern) else {
        return (body.to_string(), 0);
    };
    replace_outside_placeholders(body, &pattern, &format!("Name: {}", placeholder(key)))
}

fn usable_example(var: &VariableSpec) -> Option<&str> {
    var.example_text()
        .filter(|e| e.chars().count() >= MIN_EXAMPLE_CHARS)
}

fn placeholder(key: &str) -> String {
    format!("{{{{{}}}}}", key)
}

fn build_pattern(pattern: &str) -> Option<Regex> {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!("Skipping example pattern: {}", e);
            None
        }
    }
}

/// Apply `pattern` to the text between existing placeholders only
fn replace_outside_placeholders(body: &str, pattern: &Regex, replacement: &str) -> (String, usize) {
    let mut out = String::with_capacity(body.len());
    let mut count = 0;
    let mut last = 0;

    for existing in PLACEHOLDER_PATTERN.find_iter(body) {
        let segment = &body[last..existing.start()];
        count += pattern.find_iter(segment).count();
        out.push_str(&pattern.replace_all(segment, NoExpand(replacement)));
        out.push_str(existing.as_str());
        last = existing.end();
    }

    let tail = &body[last..];
    count += pattern.find_iter(tail).count();
    out.push_str(&pattern.replace_all(tail, NoExpand(replacement)));

    (out, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn var(key: &str, example: &str) -> VariableSpec {
        VariableSpec::new(key, key).with_example(example)
    }

    #[test]
    fn test_substitutes_whole_phrase() {
        let body = parametrize_body("Paid to John Smith on Jan 1", &[var("payer", "John Smith")]);
        assert_eq!(body, "Paid to {{payer}} on Jan 1");
    }

    #[test]
    fn test_respects_word_boundaries() {
        let body = parametrize_body("Paid to Johnson Smith", &[var("payer", "John Smith")]);
        assert_eq!(body, "Paid to Johnson Smith");
    }

    #[test]
    fn test_case_insensitive() {
        let body = parametrize_body("ACME CORP shall pay acme corp", &[var("party_a_name", "Acme Corp")]);
        assert_eq!(body, "{{party_a_name}} shall pay {{party_a_name}}");
    }

    #[test]
    fn test_short_and_missing_examples_are_skipped() {
        let vars = vec![
            var("initial", "J"),
            var("blank", "   "),
            VariableSpec::new("no_example", "No example"),
        ];
        let body = parametrize_body("J signed", &vars);
        assert_eq!(body, "J signed");
    }

    #[test]
    fn test_regex_metacharacters_are_literal() {
        let body = parametrize_body(
            "Fee is 1,000.00 (USD) payable",
            &[var("fee", "1,000.00"), var("paren", "(USD)")],
        );
        assert_eq!(body, "Fee is {{fee}} (USD) payable");
    }

    #[test]
    fn test_later_variable_cannot_rewrite_earlier_placeholder() {
        let vars = vec![var("party_a_name", "Acme"), var("word", "party_a_name")];
        let body = parametrize_body("Acme and party_a_name", &vars);
        assert_eq!(body, "{{party_a_name}} and {{word}}");
    }

    #[test]
    fn test_signature_pass_after_body_pass_is_noop() {
        let body = parametrize_body(
            "Signed by Jane Doe\nName: Jane Doe",
            &[var("receiving_party_name", "Jane Doe")],
        );
        assert_eq!(
            body,
            "Signed by {{receiving_party_name}}\nName: {{receiving_party_name}}"
        );
    }

    #[test]
    fn test_signature_pass_catches_names_ending_in_punctuation() {
        let body = parametrize_body(
            "Acme Inc. agrees.\nName: Acme Inc.",
            &[var("disclosing_party_name", "Acme Inc.")],
        );
        assert_eq!(body, "Acme Inc. agrees.\nName: {{disclosing_party_name}}");
    }

    #[test]
    fn test_retarget_signature_requires_word_end() {
        let (body, count) = retarget_signature("Name: Acme Incorporated", "party", "Acme Inc");
        assert_eq!(count, 0);
        assert_eq!(body, "Name: Acme Incorporated");
    }

    #[test]
    fn test_retarget_signature_counts_lines() {
        let (body, count) = retarget_signature(
            "Name: Acme Inc\nName:   acme inc\nAcme Inc",
            "disclosing_party_name",
            "Acme Inc",
        );
        assert_eq!(count, 2);
        assert_eq!(
            body,
            "Name: {{disclosing_party_name}}\nName: {{disclosing_party_name}}\nAcme Inc"
        );
    }

    #[test]
    fn test_replacement_value_is_not_expanded() {
        let body = parametrize_body("Pay Bob", &[var("$payee", "Bob")]);
        assert_eq!(body, "Pay {{$payee}}");
    }
}
