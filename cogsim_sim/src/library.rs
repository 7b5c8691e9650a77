//! Library of predefined high/low variants for manipulable variables.

use crate::error::InputError;
use cogsim_core::{Variable, VariableError};
use std::collections::BTreeMap;

/// Manipulation level chosen for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    High,
    Low,
}

impl Level {
    pub fn name(&self) -> &'static str {
        match self {
            Level::High => "h",
            Level::Low => "l",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h" | "high" => Ok(Level::High),
            "l" | "low" => Ok(Level::Low),
            other => Err(other.to_string()),
        }
    }
}

/// Predefined variants, keyed by variable name.
#[derive(Debug, Clone)]
pub struct VariableLibrary {
    variants: BTreeMap<String, (Variable, Variable)>,
}

impl VariableLibrary {
    /// The standard library.
    ///
    /// | variable         | high            | low              |
    /// |------------------|-----------------|------------------|
    /// | TI               | Fixed(2)        | Fixed(0)         |
    /// | SA, PI           | Fixed(1)        | Fixed(-1)        |
    /// | skill, effort    | Normal(1, 1)    | Normal(-1, 1)    |
    /// | external, luck   | Normal(1, 1)    | Normal(-1, 1)    |
    pub fn standard() -> Result<Self, VariableError> {
        let mut library = Self {
            variants: BTreeMap::new(),
        };
        library.add(Variable::fixed(1, "TI", 2.0)?, Variable::fixed(1, "TI", 0.0)?);
        for name in ["SA", "PI"] {
            library.add(Variable::fixed(0, name, 1.0)?, Variable::fixed(0, name, -1.0)?);
        }
        for name in ["skill", "effort"] {
            library.add(Variable::normal(1, name, 1.0, 1.0)?, Variable::normal(1, name, -1.0, 1.0)?);
        }
        for name in ["external", "luck"] {
            library.add(Variable::normal(0, name, 1.0, 1.0)?, Variable::normal(0, name, -1.0, 1.0)?);
        }
        Ok(library)
    }

    /// Registers a high/low pair under the high variant's name.
    pub fn add(&mut self, high: Variable, low: Variable) {
        self.variants.insert(high.name().to_string(), (high, low));
    }

    /// Returns the variant of `variable` at `level`.
    pub fn get(&self, variable: &str, level: Level) -> Option<Variable> {
        self.variants.get(variable).map(|(high, low)| match level {
            Level::High => high.clone(),
            Level::Low => low.clone(),
        })
    }

    /// Like [`get`](Self::get) but parses the level and reports bad input.
    pub fn lookup(&self, variable: &str, level: &str) -> Result<Variable, InputError> {
        if !self.contains(variable) {
            return Err(InputError::UnknownVariable(variable.to_string()));
        }
        let parsed: Level = level.parse().map_err(|_| InputError::InvalidLevel {
            variable: variable.to_string(),
            level: level.trim().to_string(),
        })?;
        self.get(variable, parsed)
            .ok_or_else(|| InputError::UnknownVariable(variable.to_string()))
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.variants.contains_key(variable)
    }

    /// Names of every manipulable variable.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variants.keys().map(String::as_str)
    }
}
