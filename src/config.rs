use std::str::FromStr;

use crate::error::{AssignError, ConfigError};
use crate::models::RoleRequirement;

/// Environment variable consulted for a reshuffle seed when `--seed` is absent.
pub const SEED_ENV: &str = "TEAM_MATCHER_SEED";

impl FromStr for RoleRequirement {
    type Err = ConfigError;

    /// Parses `ROLE=COUNT`, e.g. `Scrum Master=1`.
    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (role, count) = spec
            .rsplit_once('=')
            .ok_or_else(|| ConfigError::MalformedRole(spec.to_string()))?;

        let role = role.trim();
        if role.is_empty() {
            return Err(ConfigError::EmptyRoleName(spec.to_string()));
        }

        let count = count.trim();
        let count: usize = count.parse().map_err(|_| ConfigError::InvalidCount {
            role: role.to_string(),
            value: count.to_string(),
        })?;

        Ok(RoleRequirement::new(role, count))
    }
}

/// Reads a JSON array of `{"role": ..., "count": ...}` objects.
pub fn roles_from_json(text: &str) -> Result<Vec<RoleRequirement>, ConfigError> {
    Ok(serde_json::from_str(text)?)
}

/// Validated inputs for one matching run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentConfig {
    pub properties: Vec<String>,
    pub roles: Vec<RoleRequirement>,
}

impl AssignmentConfig {
    /// Checks the selection and role list up front. Repeated properties are
    /// dropped; repeated roles are merged into the first occurrence with their
    /// counts summed.
    pub fn new(properties: Vec<String>, roles: Vec<RoleRequirement>) -> Result<Self, ConfigError> {
        let mut selected: Vec<String> = Vec::with_capacity(properties.len());
        for prop in properties {
            let prop = prop.trim().to_string();
            if prop.is_empty() || selected.contains(&prop) {
                continue;
            }
            selected.push(prop);
        }
        if selected.is_empty() {
            return Err(AssignError::NoProperties.into());
        }

        let mut merged: Vec<RoleRequirement> = Vec::with_capacity(roles.len());
        for req in roles {
            if req.role.trim().is_empty() {
                return Err(ConfigError::EmptyRoleName(req.role));
            }
            if req.count == 0 {
                return Err(AssignError::ZeroCount(req.role).into());
            }
            match merged.iter_mut().find(|existing| existing.role == req.role) {
                Some(existing) => {
                    tracing::debug!(role = %req.role, "merging repeated role requirement");
                    existing.count += req.count;
                }
                None => merged.push(req),
            }
        }
        if merged.is_empty() {
            return Err(AssignError::NoRoles.into());
        }

        Ok(Self {
            properties: selected,
            roles: merged,
        })
    }

    pub fn team_size(&self) -> usize {
        self.roles.iter().map(|req| req.count).sum()
    }
}

/// Picks the explicit seed if given, otherwise falls back to [`SEED_ENV`].
pub fn resolve_seed(explicit: Option<u64>) -> Result<Option<u64>, ConfigError> {
    if explicit.is_some() {
        return Ok(explicit);
    }
    match std::env::var(SEED_ENV) {
        Ok(value) => parse_seed(&value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_seed(value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidSeed {
        var: SEED_ENV,
        value: value.to_string(),
    })
}
