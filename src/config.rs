use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Timing and concurrency knobs for the monitoring cycle.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub crawl_interval: Duration,
    pub store_timeout: Duration,
    pub crawl_timeout: Duration,
    pub send_timeout: Duration,
    pub max_concurrent_products: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            crawl_interval: Duration::from_secs(600),
            store_timeout: Duration::from_secs(10),
            crawl_timeout: Duration::from_secs(30),
            send_timeout: Duration::from_secs(15),
            max_concurrent_products: 8,
        }
    }
}

/// Optional HTTP mail relay. Without it notifications are only logged.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub shopee_base_url: String,
    pub monitor: MonitorConfig,
    pub mail: Option<MailConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL")?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = Self::parse_or("SERVER_PORT", 8000)?;

        let shopee_base_url = env::var("SHOPEE_BASE_URL")
            .unwrap_or_else(|_| "https://shopee.vn".to_string())
            .trim_end_matches('/')
            .to_string();

        let defaults = MonitorConfig::default();
        let monitor = MonitorConfig {
            crawl_interval: Self::secs_or("CRAWL_INTERVAL_SECS", defaults.crawl_interval)?,
            store_timeout: Self::secs_or("STORE_TIMEOUT_SECS", defaults.store_timeout)?,
            crawl_timeout: Self::secs_or("CRAWL_TIMEOUT_SECS", defaults.crawl_timeout)?,
            send_timeout: Self::secs_or("SEND_TIMEOUT_SECS", defaults.send_timeout)?,
            max_concurrent_products: Self::parse_or(
                "MAX_CONCURRENT_PRODUCTS",
                defaults.max_concurrent_products
            )?,
        };

        if monitor.max_concurrent_products == 0 {
            return Err("MAX_CONCURRENT_PRODUCTS must be at least 1".into());
        }

        let mail = match env::var("MAIL_API_URL") {
            Ok(api_url) if !api_url.trim().is_empty() => {
                let from = env::var("MAIL_FROM").map_err(
                    |_| "MAIL_FROM is required when MAIL_API_URL is set"
                )?;
                Some(MailConfig {
                    api_url,
                    api_key: env::var("MAIL_API_KEY").ok(),
                    from,
                })
            }
            _ => None,
        };

        Ok(Config {
            database_url,
            server_host,
            server_port,
            shopee_base_url,
            monitor,
            mail,
        })
    }

    fn parse_or<T>(key: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
        where T: FromStr, T::Err: std::error::Error + 'static
    {
        match env::var(key) {
            Ok(raw) => Ok(raw.trim().parse::<T>()?),
            Err(_) => Ok(default),
        }
    }

    fn secs_or(key: &str, default: Duration) -> Result<Duration, Box<dyn std::error::Error>> {
        let secs: u64 = Self::parse_or(key, default.as_secs())?;
        if secs == 0 {
            return Err(format!("{} must be greater than zero", key).into());
        }
        Ok(Duration::from_secs(secs))
    }
}
