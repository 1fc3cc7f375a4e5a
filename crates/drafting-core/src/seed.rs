//! Built-in starter catalog

use shared_types::{NewTemplate, VariableSpec, VariableType};

use crate::embeddings::{embed_new_template, Embedder};
use crate::error::DraftingError;
use crate::storage::TemplateStore;

const MUTUAL_NDA_BODY: &str = r#"# MUTUAL NON-DISCLOSURE AGREEMENT

This Mutual Non-Disclosure Agreement ("Agreement") is entered into as of **{{effective_date}}** (the "Effective Date") by and between:

**DISCLOSING PARTY:**
{{disclosing_party_name}}
Located at {{disclosing_party_address}}

**RECEIVING PARTY:**
{{receiving_party_name}}
Located at {{receiving_party_address}}

## 1. Purpose
The parties wish to explore a business relationship regarding **{{purpose_of_agreement}}**.

## 2. Confidential Information
All technical, business and proprietary information disclosed under this Agreement shall be treated as confidential and protected for a period of **{{confidentiality_period}}**.

## 3. Governing Law
This Agreement shall be governed by and construed in accordance with the laws of **{{governing_law}}**.

---

**Signature:** __________________________
**Name:** {{disclosing_party_name}}
**Date:** __________________________

**Signature:** __________________________
**Name:** {{receiving_party_name}}
**Date:** __________________________
"#;

const EMPLOYMENT_BODY: &str = r#"# EMPLOYMENT AGREEMENT

This Employment Agreement is made on **{{effective_date}}** between {{employer_name}} (the "Employer") and {{employee_name}} (the "Employee").

## 1. Position
The Employer employs the Employee as **{{job_title}}**, starting on {{start_date}}.

## 2. Compensation
The Employee shall receive an annual gross salary of **{{annual_salary}}**, payable in accordance with the Employer's payroll practice.

## 3. Probation
The first {{probation_period}} of employment are a probationary period.

## 4. Governing Law
This Agreement is governed by the laws of **{{governing_law}}**.

---

**Employer:** {{employer_name}}
**Employee:** {{employee_name}}
"#;

const SERVICE_BODY: &str = r#"# SERVICE AGREEMENT

This Service Agreement is entered into on **{{effective_date}}** between {{party_a_name}} (the "Client") and {{party_b_name}} (the "Provider").

## 1. Services
The Provider shall perform the following services: {{service_description}}.

## 2. Fees
The Client shall pay the Provider **{{service_fee}}** for the services.

## 3. Term
This Agreement remains in force for {{agreement_term}} from the Effective Date.

## 4. Governing Law
This Agreement is governed by the laws of **{{governing_law}}**.

---

**Client:** {{party_a_name}}
**Provider:** {{party_b_name}}
"#;

fn var(
    key: &str,
    label: &str,
    description: &str,
    example: &str,
    required: bool,
    dtype: VariableType,
) -> VariableSpec {
    let spec = VariableSpec::new(key, label)
        .with_description(description)
        .with_example(example)
        .with_dtype(dtype);
    if required {
        spec.required()
    } else {
        spec
    }
}

/// The starter templates, without embeddings
pub fn seed_templates() -> Vec<NewTemplate> {
    use VariableType as T;

    vec![
        NewTemplate::new(
            "Mutual Non-Disclosure Agreement",
            MUTUAL_NDA_BODY,
            vec![
                var("effective_date", "Effective Date", "The date on which the agreement becomes legally binding.", "January 20, 2026", true, T::Date),
                var("disclosing_party_name", "Disclosing Party Name", "The party disclosing confidential information.", "Acme Tech Solutions", true, T::String),
                var("disclosing_party_address", "Disclosing Party Address", "Address of the disclosing party.", "456 Innovation Way", false, T::String),
                var("receiving_party_name", "Receiving Party Name", "The party receiving confidential information.", "Arjun Mehra", true, T::String),
                var("receiving_party_address", "Receiving Party Address", "Address of the receiving party.", "789 Maple Street", false, T::String),
                var("purpose_of_agreement", "Purpose of Agreement", "The business relationship or project the information is shared for.", "Project CyberCore", true, T::String),
                var("confidentiality_period", "Confidentiality Period", "How long the shared information stays confidential.", "3 years", true, T::Duration),
                var("governing_law", "Governing Law", "The jurisdiction whose laws interpret the agreement.", "India", true, T::String),
            ],
            vec!["nda".into(), "confidentiality".into(), "business relationship".into()],
        ),
        NewTemplate::new(
            "Employment Agreement",
            EMPLOYMENT_BODY,
            vec![
                var("effective_date", "Effective Date", "The date the agreement is signed.", "March 1, 2026", true, T::Date),
                var("employer_name", "Employer Name", "The hiring company.", "Globex Ltd", true, T::String),
                var("employee_name", "Employee Name", "The person being hired.", "Priya Shah", true, T::String),
                var("job_title", "Job Title", "The role the employee is hired into.", "Software Engineer", true, T::String),
                var("start_date", "Start Date", "First working day.", "April 1, 2026", true, T::Date),
                var("annual_salary", "Annual Salary", "Gross yearly compensation.", "1200000", true, T::Number),
                var("probation_period", "Probation Period", "Length of the probationary period.", "6 months", false, T::Duration),
                var("governing_law", "Governing Law", "The jurisdiction whose laws interpret the agreement.", "India", true, T::String),
            ],
            vec!["employment".into(), "hr".into(), "job offer".into()],
        ),
        NewTemplate::new(
            "Service Agreement",
            SERVICE_BODY,
            vec![
                var("effective_date", "Effective Date", "The date the services agreement starts.", "May 5, 2026", true, T::Date),
                var("party_a_name", "Client Name", "The party receiving the services.", "Initech", true, T::String),
                var("party_b_name", "Provider Name", "The party performing the services.", "Hooli Consulting", true, T::String),
                var("service_description", "Service Description", "What the provider will deliver.", "website maintenance", true, T::String),
                var("service_fee", "Service Fee", "Amount payable for the services.", "50000", true, T::Number),
                var("agreement_term", "Agreement Term", "How long the agreement lasts.", "12 months", false, T::Duration),
                var("governing_law", "Governing Law", "The jurisdiction whose laws interpret the agreement.", "India", true, T::String),
            ],
            vec!["services".into(), "contractor".into(), "consulting".into()],
        ),
    ]
}

/// Insert every starter template whose title is not stored yet.
///
/// Returns how many templates were inserted.
pub async fn seed_store(
    store: &dyn TemplateStore,
    embedder: &dyn Embedder,
) -> Result<usize, DraftingError> {
    let mut inserted = 0;

    for template in seed_templates() {
        if store.find_by_title(&template.title).await?.is_some() {
            tracing::debug!("Seed template '{}' already present", template.title);
            continue;
        }
        let template = embed_new_template(embedder, template).await?;
        let id = store.create(template).await?;
        tracing::info!("Seeded template {}", id);
        inserted += 1;
    }

    Ok(inserted)
}
