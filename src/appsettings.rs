use std::env;

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use pillminder_models::settings::Settings;

/// Legacy variable that overrides `telegram.token`.
const TOKEN_VARIABLE: &str = "TELEGRAM_BOT_TOKEN";

pub fn load() -> Result<Settings, ConfigError> {
    let sources = Config::builder()
        .add_source(File::with_name("appsettings").required(true))
        .add_source(File::with_name("appsettings.local").required(false))
        .add_source(Environment::with_prefix("APP").separator("__"));

    build(sources, env::var(TOKEN_VARIABLE).ok())
}

fn build(
    sources: ConfigBuilder<DefaultState>,
    token_override: Option<String>,
) -> Result<Settings, ConfigError> {
    sources
        .set_default("database.url", "sqlite://reminder_log.db")?
        .set_default("reminders.default_timezone", "America/New_York")?
        .set_default("health.port", 8080)?
        .set_override_option("telegram.token", token_override)?
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn sources(toml: &str) -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(toml, FileFormat::Toml))
    }

    #[test]
    fn missing_sections_use_defaults() {
        let settings = build(sources("[telegram]\ntoken = \"abc\""), None).unwrap();

        assert_eq!(settings.telegram.token, "abc");
        assert_eq!(settings.database.url, "sqlite://reminder_log.db");
        assert_eq!(settings.reminders.default_timezone, "America/New_York");
        assert_eq!(settings.health.port, 8080);
    }

    #[test]
    fn file_values_win_over_defaults() {
        let toml = "[telegram]\ntoken = \"abc\"\n\
                    [database]\nurl = \"sqlite::memory:\"\n\
                    [reminders]\ndefault_timezone = \"Europe/Berlin\"\n\
                    [health]\nport = 9000";

        let settings = build(sources(toml), None).unwrap();

        assert_eq!(settings.database.url, "sqlite::memory:");
        assert_eq!(settings.reminders.default_timezone, "Europe/Berlin");
        assert_eq!(settings.health.port, 9000);
    }

    #[test]
    fn token_variable_overrides_file() {
        let settings = build(
            sources("[telegram]\ntoken = \"abc\""),
            Some("from-env".to_string()),
        )
        .unwrap();

        assert_eq!(settings.telegram.token, "from-env");
    }

    #[test]
    fn token_is_required() {
        assert!(build(sources(""), None).is_err());
    }
}
