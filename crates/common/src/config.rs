use std::env;

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }

    pub fn from_env() -> Self {
        match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_defaults_to_development() {
        unsafe { env::remove_var("ENVIRONMENT") };
        assert!(matches!(Environment::from_env(), Environment::Development));
    }

    #[test]
    #[serial]
    fn test_production_aliases() {
        for value in ["production", "PROD", "Production"] {
            unsafe { env::set_var("ENVIRONMENT", value) };
            assert!(
                matches!(Environment::from_env(), Environment::Production),
                "{} should select production",
                value
            );
        }
        unsafe { env::remove_var("ENVIRONMENT") };
    }
}
