use metrics::Label;

/// Deployment environment, used to pick the constant tags sent with every metric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Prod,
    Test,
    /// Any other label, including the empty string.
    Other(String),
}

impl From<&str> for Environment {
    fn from(label: &str) -> Self {
        match label {
            "prod" => Self::Prod,
            "test" => Self::Test,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Environment {
    /// The `account` and `environment` tags for this environment.
    #[must_use]
    pub fn tags(&self) -> Vec<Label> {
        let (account, environment) = match self {
            Self::Prod => ("mmcken3-demos".to_string(), "prod".to_string()),
            Self::Test => ("mmcken3-demos-dev".to_string(), "test".to_string()),
            Self::Other(label) => (label.clone(), label.clone()),
        };
        vec![
            Label::new("account", account),
            Label::new("environment", environment),
        ]
    }
}
