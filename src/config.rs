use anyhow::{bail, Context, Result};

/// Receiving address of the original deployment. Overridable through
/// RECEIVING_ADDRESS for other deployments.
pub const DEFAULT_RECEIVING_ADDRESS: &str =
    "addr1qxtne8wp4qdmc9trp7zaaj9fzvxwhpm7veykwu9cdkk7y9m7wsx98ff5dmlg7fufan2thc3uf9yz7mrq56frvhc0mmaqgyjsld";

pub const DEFAULT_BLOCKFROST_BASE_URL: &str = "https://cardano-mainnet.blockfrost.io/api/v0";
pub const DEFAULT_COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_VIDEO_API_BASE_URL: &str = "https://api.openai.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Cardano (payment network, read through Blockfrost)
    pub blockfrost_base_url: String,
    pub blockfrost_project_id: String,
    pub receiving_address: String,

    // Price oracle
    pub coingecko_base_url: String,

    // Video generation
    pub video_api_base_url: String,
    pub video_api_key: String,
    pub video_model: String,

    // Pricing
    pub base_cost_ada: f64,
    pub per_second_cost_usd: f64,

    // Payment ledger lifecycle
    pub ledger_max_age_secs: u64,
    pub ledger_sweep_interval_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;

        let config = Self {
            environment: environment.clone(),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            blockfrost_base_url: std::env::var("BLOCKFROST_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BLOCKFROST_BASE_URL.to_string()),
            blockfrost_project_id: std::env::var("BLOCKFROST_PROJECT_ID")
                .context("BLOCKFROST_PROJECT_ID required")?,
            receiving_address: std::env::var("RECEIVING_ADDRESS")
                .unwrap_or_else(|_| DEFAULT_RECEIVING_ADDRESS.to_string()),

            coingecko_base_url: std::env::var("COINGECKO_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_COINGECKO_BASE_URL.to_string()),

            video_api_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_VIDEO_API_BASE_URL.to_string()),
            video_api_key: std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY required")?,
            video_model: std::env::var("VIDEO_MODEL").unwrap_or_else(|_| "sora-2".to_string()),

            base_cost_ada: std::env::var("BASE_COST_ADA")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .context("Invalid BASE_COST_ADA")?,
            per_second_cost_usd: std::env::var("PER_SECOND_COST_USD")
                .unwrap_or_else(|_| "0.10".to_string())
                .parse()
                .context("Invalid PER_SECOND_COST_USD")?,

            ledger_max_age_secs: std::env::var("LEDGER_MAX_AGE_SECS")
                .unwrap_or_else(|_| "3600".to_string())
                .parse()
                .context("Invalid LEDGER_MAX_AGE_SECS")?,
            ledger_sweep_interval_secs: std::env::var("LEDGER_SWEEP_INTERVAL_SECS")
                .unwrap_or_else(|_| "300".to_string())
                .parse()
                .context("Invalid LEDGER_SWEEP_INTERVAL_SECS")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" | "preprod" => Ok(Environment::Testnet),
            "production" | "prod" | "mainnet" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn validate(&self) -> Result<()> {
        // Validate URLs
        if !self.blockfrost_base_url.starts_with("http") {
            bail!("BLOCKFROST_BASE_URL must be HTTP(S) URL");
        }
        if !self.coingecko_base_url.starts_with("http") {
            bail!("COINGECKO_BASE_URL must be HTTP(S) URL");
        }
        if !self.video_api_base_url.starts_with("http") {
            bail!("OPENAI_BASE_URL must be HTTP(S) URL");
        }

        // Bech32 payment address; the prefix must match the network.
        match self.environment {
            Environment::Testnet => {
                if !self.receiving_address.starts_with("addr_test1") {
                    bail!("RECEIVING_ADDRESS must be an addr_test1 address on testnet");
                }
            }
            _ => {
                if !self.receiving_address.starts_with("addr1") {
                    bail!("RECEIVING_ADDRESS must be an addr1 mainnet address");
                }
            }
        }

        if self.base_cost_ada < 0.0 || self.per_second_cost_usd < 0.0 {
            bail!("Costs must be non-negative");
        }
        if self.ledger_max_age_secs == 0 {
            bail!("LEDGER_MAX_AGE_SECS must be positive");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}
