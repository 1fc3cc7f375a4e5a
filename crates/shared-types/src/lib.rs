pub mod types;

pub use types::{NewTemplate, Template, TemplateId, VariableSpec, VariableType};
