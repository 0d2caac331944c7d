//! CLI subcommand definitions

use clap::{Args, Subcommand};

#[derive(Debug, Args, Default)]
pub(crate) struct TimelineArgs {
    /// Rebuild the cached report from all orders
    #[arg(long)]
    pub(crate) regenerate: bool,
}

/// Main CLI commands
#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Show the daily profit timeline (default)
    Daily(TimelineArgs),
    /// Show today's live numbers
    Today,
    /// Show weekly profit
    Weekly(TimelineArgs),
    /// Show monthly profit
    Monthly(TimelineArgs),
    /// Show sales and costs per product
    Products,
    /// List reportable orders
    Orders,
    /// Inspect or edit product costs
    Cost {
        #[command(subcommand)]
        command: CostCommands,
    },
    /// Edit product SKUs
    Sku {
        #[command(subcommand)]
        command: SkuCommands,
    },
    /// Show or edit monthly overhead (fixed costs, marketing, rent)
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// Inspect or clear the report cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum CostCommands {
    /// Show resolved costs of a product or variation
    Show {
        /// Product or variation id
        id: u64,
    },
    /// Set one cost field (empty value leaves it unchanged)
    Set {
        /// Product or variation id
        id: u64,
        /// cogs_price, packing_cost, work_time_minutes, development_cost or development_months
        field: String,
        /// New value; a decimal comma is accepted
        value: String,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum SkuCommands {
    /// Assign a SKU to one or more products
    Set {
        sku: String,
        /// Product or variation ids
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum SettingsCommands {
    /// Show the overhead settings
    Show,
    /// Set one monthly figure
    Set {
        /// costs, marketing or rent
        kind: String,
        year: i32,
        /// 1-12
        month: u32,
        /// Monthly amount; a decimal comma is accepted
        amount: String,
    },
}

#[derive(Debug, Subcommand)]
pub(crate) enum CacheCommands {
    /// Show cache state and age
    Status,
    /// Remove the cached report
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> Option<Commands> {
        let mut argv = vec!["profitstats"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn default_command_is_none() {
        assert!(parse(&[]).is_none());
    }

    #[test]
    fn daily_regenerate_flag() {
        assert!(matches!(
            parse(&["daily", "--regenerate"]),
            Some(Commands::Daily(TimelineArgs { regenerate: true }))
        ));
    }

    #[test]
    fn cost_set_takes_three_arguments() {
        match parse(&["cost", "set", "11", "cogs_price", "4,5"]) {
            Some(Commands::Cost {
                command: CostCommands::Set { id, field, value },
            }) => {
                assert_eq!(id, 11);
                assert_eq!(field, "cogs_price");
                assert_eq!(value, "4,5");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sku_set_needs_ids() {
        assert!(Cli::try_parse_from(["profitstats", "sku", "set", "MUG"]).is_err());
        match parse(&["sku", "set", "MUG", "10", "11"]) {
            Some(Commands::Sku {
                command: SkuCommands::Set { sku, ids },
            }) => {
                assert_eq!(sku, "MUG");
                assert_eq!(ids, vec![10, 11]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn settings_set_takes_kind_year_month_amount() {
        match parse(&["settings", "set", "rent", "2025", "3", "620"]) {
            Some(Commands::Settings {
                command:
                    SettingsCommands::Set {
                        kind,
                        year,
                        month,
                        amount,
                    },
            }) => {
                assert_eq!(kind, "rent");
                assert_eq!(year, 2025);
                assert_eq!(month, 3);
                assert_eq!(amount, "620");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            parse(&["settings", "show"]),
            Some(Commands::Settings {
                command: SettingsCommands::Show
            })
        ));
        assert!(Cli::try_parse_from(["profitstats", "settings", "set", "rent", "2025"]).is_err());
    }

    #[test]
    fn cache_subcommands() {
        assert!(matches!(
            parse(&["cache", "clear"]),
            Some(Commands::Cache {
                command: CacheCommands::Clear
            })
        ));
    }
}
