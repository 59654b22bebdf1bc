//! Runtime configuration, read from the environment (and `.env`).

use std::env;
use std::str::FromStr;

use log::warn;

use crate::domain::solver_factory::SolverType;

pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_JSON_LIMIT: usize = 2 * 1024 * 1024;
pub const DEFAULT_NODE_LIMIT: u64 = 100_000;
pub const DEFAULT_ENUMERATION_LIMIT: u64 = 250_000;
pub const DEFAULT_CACHE_CAPACITY: usize = 1024;

/// Strategy and search budgets for the integer program solvers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    pub solver: SolverType,
    /// Branch-and-bound nodes before giving up with `ResourceExhausted`.
    pub node_limit: u64,
    /// Candidates the null-space enumeration may examine.
    pub enumeration_limit: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            solver: SolverType::Auto,
            node_limit: DEFAULT_NODE_LIMIT,
            enumeration_limit: DEFAULT_ENUMERATION_LIMIT,
        }
    }
}

impl SolverConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read `SOLVER`, `NODE_LIMIT` and `ENUMERATION_LIMIT`, falling back to defaults.
    pub fn from_env() -> Self {
        let solver = match env::var("SOLVER") {
            Ok(name) => SolverType::from_str(&name).unwrap_or_else(|| {
                warn!("unknown SOLVER {:?}, using auto", name);
                SolverType::Auto
            }),
            Err(_) => SolverType::Auto,
        };

        SolverConfig {
            solver,
            node_limit: env_or("NODE_LIMIT", DEFAULT_NODE_LIMIT),
            enumeration_limit: env_or("ENUMERATION_LIMIT", DEFAULT_ENUMERATION_LIMIT),
        }
    }

    pub fn with_solver(mut self, solver: SolverType) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_node_limit(mut self, limit: u64) -> Self {
        self.node_limit = limit;
        self
    }

    pub fn with_enumeration_limit(mut self, limit: u64) -> Self {
        self.enumeration_limit = limit;
        self
    }
}

/// Settings of the HTTP service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub json_limit: usize,
    /// Switchboards remembered across requests; 0 disables the cache.
    pub cache_capacity: usize,
    pub sentry_dsn: Option<String>,
    pub solver: SolverConfig,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        ServerConfig {
            port: env_or("PORT", DEFAULT_PORT),
            json_limit: env_or("JSON_PAYLOAD_LIMIT", DEFAULT_JSON_LIMIT),
            cache_capacity: env_or("CACHE_CAPACITY", DEFAULT_CACHE_CAPACITY),
            sentry_dsn: env::var("SENTRY_DSN").ok().filter(|dsn| !dsn.is_empty()),
            solver: SolverConfig::from_env(),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SolverConfig::new();
        assert_eq!(config.solver, SolverType::Auto);
        assert_eq!(config.node_limit, DEFAULT_NODE_LIMIT);
        assert_eq!(config.enumeration_limit, DEFAULT_ENUMERATION_LIMIT);
    }

    #[test]
    fn test_config_builder_pattern() {
        let config = SolverConfig::new()
            .with_solver(SolverType::BranchAndBound)
            .with_node_limit(42)
            .with_enumeration_limit(7);
        assert_eq!(config.solver, SolverType::BranchAndBound);
        assert_eq!(config.node_limit, 42);
        assert_eq!(config.enumeration_limit, 7);
    }

    #[test]
    fn test_env_or_falls_back_on_unparsable_values() {
        env::set_var("JOLTAGE_TEST_BAD_NUMBER", "many");
        assert_eq!(env_or("JOLTAGE_TEST_BAD_NUMBER", 5u64), 5);
        env::set_var("JOLTAGE_TEST_GOOD_NUMBER", "17");
        assert_eq!(env_or("JOLTAGE_TEST_GOOD_NUMBER", 5u64), 17);
        assert_eq!(env_or("JOLTAGE_TEST_MISSING_NUMBER", 3usize), 3);
    }
}
