//! Survivor records.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::types::Location;

/// Oldest age accepted at registration.
pub const MAX_AGE: i64 = 120;

// ============================================================================
// SurvivorId
// ============================================================================

/// Opaque survivor identifier, assigned by the record store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SurvivorId(u64);

impl SurvivorId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurvivorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Sex
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Sex {
    pub fn code(self) -> char {
        match self {
            Sex::Male => 'M',
            Sex::Female => 'F',
        }
    }
}

impl FromStr for Sex {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" => Ok(Sex::Male),
            "F" | "f" => Ok(Sex::Female),
            other => Err(RegistryError::validation(
                "sex",
                format!("expected `M` or `F`, got `{other}`"),
            )),
        }
    }
}

// ============================================================================
// InfectionStatus
// ============================================================================

/// `Healthy` is initial, `Infected` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfectionStatus {
    Healthy,
    Infected,
}

impl InfectionStatus {
    #[inline]
    pub fn is_infected(self) -> bool {
        self == InfectionStatus::Infected
    }
}

// ============================================================================
// NewSurvivor
// ============================================================================

/// Registration request, as received from the API layer.
///
/// `age` is signed so that negative input can be reported as a validation
/// error instead of failing to parse upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurvivor {
    pub name: String,
    pub age: i64,
    pub sex: Sex,
    pub location: Location,
}

impl NewSurvivor {
    pub fn new(name: impl Into<String>, age: i64, sex: Sex, location: Location) -> Self {
        Self {
            name: name.into(),
            age,
            sex,
            location,
        }
    }

    /// Check field rules and return the trimmed name and the age.
    pub(crate) fn validate(&self, max_name_len: usize) -> Result<(String, u8), RegistryError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(RegistryError::validation("name", "must not be empty"));
        }
        if name.chars().count() > max_name_len {
            return Err(RegistryError::validation(
                "name",
                format!("longer than {max_name_len} characters"),
            ));
        }
        if !(0..=MAX_AGE).contains(&self.age) {
            return Err(RegistryError::validation(
                "age",
                format!("{} is outside 0..={MAX_AGE}", self.age),
            ));
        }
        // MAX_AGE < 256
        let age = self.age as u8;
        Ok((name.to_owned(), age))
    }
}

// ============================================================================
// Survivor
// ============================================================================

/// A registered survivor.
///
/// The infection flag is private: it can only move from `false` to `true`
/// through [`Survivor::mark_infected`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Survivor {
    pub id: SurvivorId,
    pub name: String,
    pub age: u8,
    pub sex: Sex,
    pub location: Location,
    infected: bool,
    pub created_at: DateTime<Utc>,
}

impl Survivor {
    pub(crate) fn register(
        id: SurvivorId,
        name: String,
        age: u8,
        sex: Sex,
        location: Location,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            age,
            sex,
            location,
            infected: false,
            created_at,
        }
    }

    #[inline]
    pub fn is_infected(&self) -> bool {
        self.infected
    }

    pub fn status(&self) -> InfectionStatus {
        if self.infected {
            InfectionStatus::Infected
        } else {
            InfectionStatus::Healthy
        }
    }

    /// Flip to infected. Returns `true` only on the first call.
    pub(crate) fn mark_infected(&mut self) -> bool {
        let transitioned = !self.infected;
        self.infected = true;
        transitioned
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
