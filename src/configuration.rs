use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Credential issuance settings.
///
/// Supplied at startup and passed into the session manager and signer at
/// construction; there is no process-global signing state, so tests can run
/// with distinct keys.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub signing_key: String,
    pub password_salt: String,
    pub access_token_ttl_seconds: i64,  // e.g. 43200 for 12 hours
    pub renewal_token_ttl_seconds: i64, // e.g. 2592000 for 30 days
    pub sweep_interval_seconds: u64,    // e.g. 3600 for hourly sweeps
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .build()?;
    settings.try_deserialize::<Settings>()
}
