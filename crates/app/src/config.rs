//! Configuration shared by the CLI subcommands.

use clap::{Args, ValueEnum};
use nexus::pricing::{
    DEFAULT_BASE_DELIVERY_FEE, DEFAULT_SERVICE_FEE_RATE, DEFAULT_TAX_RATE, PricingConfig,
};
use rust_decimal::Decimal;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact,
        global = true
    )]
    pub log_format: LogFormat,
}

/// Database settings.
#[derive(Debug, Clone, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
}

/// Checkout pricing settings.
#[derive(Debug, Clone, Args)]
pub struct PricingArgs {
    /// Flat delivery fee, also the base of the distance tiers
    #[arg(long, env = "BASE_DELIVERY_FEE", default_value_t = DEFAULT_BASE_DELIVERY_FEE)]
    pub base_delivery_fee: Decimal,

    /// Service fee as a fraction of the subtotal
    #[arg(long, env = "SERVICE_FEE_RATE", default_value_t = DEFAULT_SERVICE_FEE_RATE)]
    pub service_fee_rate: Decimal,

    /// Tax as a fraction of the subtotal
    #[arg(long, env = "TAX_RATE", default_value_t = DEFAULT_TAX_RATE)]
    pub tax_rate: Decimal,
}

impl From<&PricingArgs> for PricingConfig {
    fn from(args: &PricingArgs) -> Self {
        PricingConfig {
            base_delivery_fee: args.base_delivery_fee,
            service_fee_rate: args.service_fee_rate,
            tax_rate: args.tax_rate,
        }
    }
}
