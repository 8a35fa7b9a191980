use std::collections::HashSet;

use serde::Deserialize;

use crate::engine::MergePlan;
use crate::error::MergeError;
use crate::join::{CollisionPolicy, JoinKey, JoinPolicy};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    pub name: String,
    pub key: Vec<String>,
    /// Policy applied at every step. Mutually exclusive with `policies`.
    #[serde(default)]
    pub policy: Option<JoinPolicy>,
    /// One policy per pairwise step.
    #[serde(default)]
    pub policies: Option<Vec<JoinPolicy>>,
    #[serde(default)]
    pub collisions: CollisionConfig,
    pub tables: Vec<TableSpec>,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSpec {
    pub name: String,
    /// CSV path, resolved relative to the config file by the caller.
    pub file: String,
}

// ---------------------------------------------------------------------------
// Collisions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    Reject,
    #[default]
    Suffix,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollisionConfig {
    #[serde(default)]
    pub mode: CollisionMode,
    #[serde(default = "default_left_suffix")]
    pub left_suffix: String,
    #[serde(default = "default_right_suffix")]
    pub right_suffix: String,
}

fn default_left_suffix() -> String {
    "_x".into()
}

fn default_right_suffix() -> String {
    "_y".into()
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            mode: CollisionMode::default(),
            left_suffix: default_left_suffix(),
            right_suffix: default_right_suffix(),
        }
    }
}

impl CollisionConfig {
    pub fn policy(&self) -> CollisionPolicy {
        match self.mode {
            CollisionMode::Reject => CollisionPolicy::Reject,
            CollisionMode::Suffix => CollisionPolicy::Suffix {
                left: self.left_suffix.clone(),
                right: self.right_suffix.clone(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub json: Option<String>,
    #[serde(default)]
    pub csv: Option<String>,
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl MergeConfig {
    pub fn from_toml(input: &str) -> Result<Self, MergeError> {
        let config: MergeConfig =
            toml::from_str(input).map_err(|e| MergeError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MergeError> {
        if self.tables.is_empty() {
            return Err(MergeError::ConfigValidation("at least 1 table is required".into()));
        }

        let mut names = HashSet::new();
        for t in &self.tables {
            if !names.insert(t.name.as_str()) {
                return Err(MergeError::ConfigValidation(format!(
                    "duplicate table name '{}'",
                    t.name
                )));
            }
        }

        self.join_key()
            .map_err(|e| MergeError::ConfigValidation(format!("key: {e}")))?;

        match (&self.policy, &self.policies) {
            (Some(_), Some(_)) => {
                return Err(MergeError::ConfigValidation(
                    "set either `policy` or `policies`, not both".into(),
                ));
            }
            (None, Some(steps)) if steps.len() != self.tables.len() - 1 => {
                return Err(MergeError::ConfigValidation(format!(
                    "{} table(s) need {} policy(ies), found {}",
                    self.tables.len(),
                    self.tables.len() - 1,
                    steps.len()
                )));
            }
            _ => {}
        }

        if self.collisions.mode == CollisionMode::Suffix {
            let (l, r) = (&self.collisions.left_suffix, &self.collisions.right_suffix);
            if l.is_empty() || r.is_empty() || l == r {
                return Err(MergeError::ConfigValidation(
                    "collision suffixes must be non-empty and distinct".into(),
                ));
            }
        }

        Ok(())
    }

    pub fn join_key(&self) -> Result<JoinKey, MergeError> {
        JoinKey::new(self.key.iter().cloned())
    }

    /// Step policies; `outer` everywhere when neither field is set.
    pub fn plan(&self) -> Result<MergePlan, MergeError> {
        match (&self.policy, &self.policies) {
            (Some(_), Some(_)) => Err(MergeError::ConfigValidation(
                "set either `policy` or `policies`, not both".into(),
            )),
            (Some(p), None) => Ok(MergePlan::Uniform(*p)),
            (None, Some(steps)) => Ok(MergePlan::Steps(steps.clone())),
            (None, None) => Ok(MergePlan::Uniform(JoinPolicy::Outer)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
