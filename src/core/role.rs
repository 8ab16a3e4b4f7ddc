//! Caller roles - a presentation-time capability check only
//!
//! Calculators never look at the role; the CLI uses it to decide which
//! figures to print.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Who is operating the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Office staff: sees prices, costs and totals
    #[default]
    Admin,
    /// Shop-floor supervisor: sees stock and capacity, not money
    Encargado,
}

impl Role {
    /// Whether prices and costs may be shown to this role
    pub fn can_view_prices(self) -> bool {
        self == Role::Admin
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Encargado => write!(f, "encargado"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "encargado" | "supervisor" => Ok(Role::Encargado),
            _ => Err(format!("Unknown role: {}. Use admin or encargado", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_visibility() {
        assert!(Role::Admin.can_view_prices());
        assert!(!Role::Encargado.can_view_prices());
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("ENCARGADO".parse::<Role>().unwrap(), Role::Encargado);
        assert_eq!("supervisor".parse::<Role>().unwrap(), Role::Encargado);
        assert!("guest".parse::<Role>().is_err());
    }
}
