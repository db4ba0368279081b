use clap::{Parser, Subcommand};
use nexus_app::config::LoggingConfig;

mod carts;
mod db;
mod orders;

#[derive(Debug, Parser)]
#[command(name = "nexus-app", about = "Nexus ordering CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Orders(orders::OrdersCommand),
    Carts(carts::CartsCommand),
}

impl Cli {
    pub(crate) fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Orders(command) => orders::run(command).await,
            Commands::Carts(command) => carts::run(command).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_order_lookup() -> TestResult {
        let cli = Cli::try_parse_from([
            "nexus-app",
            "orders",
            "show",
            "--order-number",
            "ORD-20260301-AB12",
            "--database-url",
            "postgres://localhost/nexus",
        ])?;

        assert!(matches!(cli.command, Commands::Orders(_)));

        Ok(())
    }

    #[test]
    fn rejects_malformed_order_number() {
        let result = Cli::try_parse_from([
            "nexus-app",
            "orders",
            "show",
            "--order-number",
            "ORD-2026-AB12",
            "--database-url",
            "postgres://localhost/nexus",
        ]);

        assert!(result.is_err());
    }
}
