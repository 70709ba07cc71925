use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{owner} references unknown rule set '{name}'")]
    UnknownRuleSet { owner: String, name: String },
    #[error("{owner}: {field} must be a finite number, got {value}")]
    NotFinite {
        owner: String,
        field: &'static str,
        value: f32,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
