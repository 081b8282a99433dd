//! Deployment mode
//!
//! Decides how strict the startup configuration is

use crate::utils::env_var;

/// Environment variable selecting the mode
const MODE_VAR: &str = "OMEGA_ENV";

/// How the service is deployed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Local development, missing secrets fall back to fixed defaults
    Development,

    /// Hardened deployment, missing secrets abort the startup
    Production,
}

impl Mode {
    /// Detect the mode from `OMEGA_ENV`
    pub fn from_env() -> Self {
        Self::parse(env_var(MODE_VAR).as_deref())
    }

    /// Only `production` (case-insensitive) selects the hardened mode
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some(value) if value.trim().eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(Mode::Production, Mode::parse(Some("production")));
        assert_eq!(Mode::Production, Mode::parse(Some(" PRODUCTION ")));
        assert_eq!(Mode::Development, Mode::parse(Some("development")));
        assert_eq!(Mode::Development, Mode::parse(Some("prod")));
        assert_eq!(Mode::Development, Mode::parse(None));
    }
}
