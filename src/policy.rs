//! Session policy documents.
//!
//! A session policy narrows the permissions of the issued credentials to the
//! intersection with the role's own policy. Action and resource syntax is not
//! checked locally; the server is authoritative.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StsError};

/// Policy language version accepted by the server.
pub const POLICY_VERSION: &str = "1";

/// Condition block: operator → (key → value or values).
pub type Condition = BTreeMap<String, BTreeMap<String, OneOrMany>>;

/// A permission policy document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            version: POLICY_VERSION.to_string(),
            statement: Vec::new(),
        }
    }
}

impl Policy {
    /// Creates an empty policy with the current version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a statement.
    pub fn with_statement(mut self, statement: Statement) -> Self {
        self.statement.push(statement);
        self
    }

    /// Serializes the policy to the compact JSON sent on the wire.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| StsError::Encoding(format!("cannot serialize policy: {}", e)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// One statement of a [`Policy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub effect: Effect,
    pub action: OneOrMany,
    pub resource: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl Statement {
    pub fn new(effect: Effect, action: impl Into<OneOrMany>, resource: impl Into<OneOrMany>) -> Self {
        Self {
            effect,
            action: action.into(),
            resource: resource.into(),
            condition: None,
        }
    }

    pub fn allow(action: impl Into<OneOrMany>, resource: impl Into<OneOrMany>) -> Self {
        Self::new(Effect::Allow, action, resource)
    }

    pub fn deny(action: impl Into<OneOrMany>, resource: impl Into<OneOrMany>) -> Self {
        Self::new(Effect::Deny, action, resource)
    }

    /// Adds a condition entry, e.g. `("IpAddress", "acs:SourceIp", "10.0.0.0/8")`.
    pub fn with_condition(
        mut self,
        operator: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<OneOrMany>,
    ) -> Self {
        self.condition
            .get_or_insert_with(BTreeMap::new)
            .entry(operator.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }
}

/// A single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_pascal_case() {
        let policy = Policy::new().with_statement(Statement::allow(
            vec!["oss:GetObject", "oss:ListObjects"],
            "acs:oss:*:*:bucket/*",
        ));
        assert_eq!(
            policy.to_json().unwrap(),
            r#"{"Version":"1","Statement":[{"Effect":"Allow","Action":["oss:GetObject","oss:ListObjects"],"Resource":"acs:oss:*:*:bucket/*"}]}"#
        );
    }

    #[test]
    fn serializes_conditions() {
        let policy = Policy::new().with_statement(
            Statement::deny("ecs:*", "*")
                .with_condition("IpAddress", "acs:SourceIp", vec!["10.0.0.0/8", "192.168.0.0/16"]),
        );
        assert_eq!(
            policy.to_json().unwrap(),
            r#"{"Version":"1","Statement":[{"Effect":"Deny","Action":"ecs:*","Resource":"*","Condition":{"IpAddress":{"acs:SourceIp":["10.0.0.0/8","192.168.0.0/16"]}}}]}"#
        );
    }

    #[test]
    fn parses_server_style_document() {
        let json = r#"{
            "Version": "1",
            "Statement": [{
                "Effect": "Allow",
                "Action": "sts:AssumeRole",
                "Resource": ["acs:ram::123456789012:role/a", "acs:ram::123456789012:role/b"],
                "Condition": {"StringEquals": {"acs:MFAPresent": "true"}}
            }]
        }"#;
        let policy: Policy = serde_json::from_str(json).unwrap();
        let statement = &policy.statement[0];
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.action, OneOrMany::from("sts:AssumeRole"));
        assert!(matches!(statement.resource, OneOrMany::Many(ref r) if r.len() == 2));
        let condition = statement.condition.as_ref().unwrap();
        assert_eq!(
            condition["StringEquals"]["acs:MFAPresent"],
            OneOrMany::from("true")
        );
    }

    #[test]
    fn default_version() {
        assert_eq!(Policy::new().version, "1");
        assert!(Policy::new().statement.is_empty());
    }
}
