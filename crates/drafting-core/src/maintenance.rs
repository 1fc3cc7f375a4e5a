//! Administrative maintenance over stored templates

use serde::Serialize;

use crate::error::DraftingError;
use crate::ingest::retarget_signature;
use crate::storage::TemplateStore;

/// Keys retargeted when the caller does not name any
pub const DEFAULT_SIGNATURE_KEYS: &[&str] = &["disclosing_party_name", "receiving_party_name"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RetargetReport {
    pub templates_updated: usize,
    pub replacements: usize,
}

/// Rewrite `Name: <example>` signature lines to placeholders for `keys`.
///
/// Bodies are updated in place; embeddings are left untouched.
pub async fn retarget_signature_lines(
    store: &dyn TemplateStore,
    keys: &[&str],
) -> Result<RetargetReport, DraftingError> {
    let mut report = RetargetReport::default();

    for template in store.list().await? {
        let mut body = template.body.clone();
        let mut replaced = 0;

        for var in template.variables.iter().filter(|v| keys.contains(&v.key.as_str())) {
            let Some(example) = var.example_text() else {
                continue;
            };
            let (next, count) = retarget_signature(&body, &var.key, example);
            body = next;
            replaced += count;
        }

        if replaced > 0 {
            store.update_body(template.id, body).await?;
            tracing::info!("Retargeted {} signature line(s) in template {}", replaced, template.id);
            report.templates_updated += 1;
            report.replacements += replaced;
        }
    }

    Ok(report)
}
