mod common;

use std::sync::Arc;

use common::{embedder, pipeline, Oracle, Search};
use drafting_core::prompts;
use drafting_core::{
    seed_store, Answers, DraftingError, MemoryStore, NewTemplate, TemplateStore, VariableSpec,
};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn store_with_nda() -> (Arc<MemoryStore>, drafting_core::TemplateId) {
    let store = Arc::new(MemoryStore::new());
    let id = store
        .create(
            NewTemplate::new(
                "Mutual NDA",
                "NDA between {{party_a_name}} and {{party_b_name}} effective {{effective_date}}",
                vec![
                    VariableSpec::new("party_a_name", "Your company").required(),
                    VariableSpec::new("party_b_name", "Counterparty").required(),
                    VariableSpec::new("effective_date", "Effective date"),
                ],
                vec!["nda".into(), "confidentiality".into()],
            )
            .with_embedding(vec![1.0, 0.0, 0.0, 0.1]),
        )
        .await
        .unwrap();
    store
        .create(
            NewTemplate::new("Flat Lease", "Lease", vec![], vec!["lease".into()])
                .with_embedding(vec![0.0, 1.0, 0.0, 0.1]),
        )
        .await
        .unwrap();
    (store, id)
}

#[tokio::test]
async fn nda_request_reuses_stored_template() {
    let (store, nda_id) = store_with_nda().await;
    let oracle = Arc::new(Oracle {
        selection: Some(json!({
            "best_template_id": nda_id.0,
            "confidence": 0.82,
            "reason": "User asked for an NDA",
            "title": "Non-Disclosure Agreement"
        })),
        prefill: Some(json!({ "party_b_name": "Acme" })),
        questions: Some(json!({
            "party_a_name": "What is the name of your company?",
            "effective_date": "When should the NDA take effect?"
        })),
        ..Default::default()
    });
    let search = Arc::new(Search::default());
    let p = pipeline(store.clone(), oracle.clone(), search.clone());

    let resolution = p.resolve_template("I need an NDA with Acme").await.unwrap();

    assert_eq!(resolution.template.id, nda_id);
    assert_eq!(resolution.confidence, Some(0.82));
    assert_eq!(resolution.reason.as_deref(), Some("User asked for an NDA"));
    assert!(!resolution.newly_synthesized);
    assert_eq!(resolution.prefilled.get("party_b_name").map(String::as_str), Some("Acme"));
    assert_eq!(resolution.missing_keys, vec!["party_a_name", "effective_date"]);
    assert_eq!(resolution.missing_questions.len(), 2);

    assert!(search.queries.lock().unwrap().is_empty());
    assert_eq!(oracle.prompts_with(prompts::NORMALIZE_ROLE), 0);
    assert_eq!(store.list().await.unwrap().len(), 2);

    let mut answers = Answers::new();
    answers.insert("party_a_name".into(), "Globex".into());
    let rendered = p
        .render(nda_id, &answers, &resolution.prefilled)
        .await
        .unwrap();
    assert_eq!(
        rendered.output_text,
        "NDA between Globex and Acme effective {{effective_date}}"
    );
}

#[tokio::test]
async fn render_requires_every_required_field() {
    let (store, nda_id) = store_with_nda().await;
    let p = pipeline(store, Arc::new(Oracle::default()), Arc::new(Search::default()));

    let mut prefilled = Answers::new();
    prefilled.insert("party_a_name".into(), "Globex".into());
    let err = p.render(nda_id, &Answers::new(), &prefilled).await.unwrap_err();

    match err {
        DraftingError::ValidationFailure { key, label } => {
            assert_eq!(key, "party_b_name");
            assert_eq!(label, "Counterparty");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn answers_override_prefilled_values() {
    let (store, nda_id) = store_with_nda().await;
    let p = pipeline(store, Arc::new(Oracle::default()), Arc::new(Search::default()));

    let mut prefilled = Answers::new();
    prefilled.insert("party_a_name".into(), "Old Name".into());
    prefilled.insert("party_b_name".into(), "Acme".into());
    let mut answers = Answers::new();
    answers.insert("party_a_name".into(), "New Name".into());

    let rendered = p.render(nda_id, &answers, &prefilled).await.unwrap();
    assert_eq!(rendered.filled_variables["party_a_name"], "New Name");
    assert!(rendered.output_text.starts_with("NDA between New Name and Acme"));
}

#[tokio::test]
async fn seeded_catalog_is_selectable() {
    let store = Arc::new(MemoryStore::new());
    let inserted = seed_store(store.as_ref(), embedder().as_ref()).await.unwrap();
    assert_eq!(inserted, 3);

    let nda = store
        .find_by_title("Mutual Non-Disclosure Agreement")
        .await
        .unwrap()
        .unwrap();
    let oracle = Arc::new(Oracle {
        selection: Some(json!({
            "best_template_id": nda.id.0,
            "confidence": 0.6,
            "reason": "boundary",
            "title": "NDA"
        })),
        ..Default::default()
    });
    let p = pipeline(store, oracle, Arc::new(Search::default()));

    let resolution = p.resolve_template("mutual nda please").await.unwrap();
    assert_eq!(resolution.template.id, nda.id);
    assert!(resolution.prefilled.is_empty());
    assert_eq!(resolution.missing_keys.len(), nda.variables.len());
    assert_eq!(resolution.missing_questions.len(), nda.variables.len());
}
