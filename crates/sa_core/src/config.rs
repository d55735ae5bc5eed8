/// Runtime configuration, read from the environment once at startup and
/// passed by reference to the stages that need it.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub email_username: String,
    pub email_password: String,
    pub email_server: String,
    pub email_folder: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            openai_api_key: env_or("OPENAI_API_KEY", ""),
            email_username: env_or("EMAIL_USERNAME", ""),
            email_password: env_or("EMAIL_PASSWORD", ""),
            email_server: env_or("EMAIL_SERVER", "imap.gmail.com"),
            email_folder: env_or("EMAIL_FOLDER", "scholar_alerts"),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_for_unset_vars() {
        // Use names no other test touches so parallel runs stay stable.
        assert_eq!(env_or("SA_TEST_UNSET_VAR", "imap.example.com"), "imap.example.com");
    }
}
