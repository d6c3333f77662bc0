use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct TelegramSettings {
    pub token: String,
}

#[derive(Deserialize, Debug)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Debug)]
pub struct ReminderSettings {
    pub default_timezone: String,
}

#[derive(Deserialize, Debug)]
pub struct HealthSettings {
    pub port: u16,
}

#[derive(Deserialize, Debug)]
pub struct Settings {
    pub telegram: TelegramSettings,
    pub database: DatabaseSettings,
    pub reminders: ReminderSettings,
    pub health: HealthSettings,
}
