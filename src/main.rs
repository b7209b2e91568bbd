//! Handset Pricing CLI
//!
//! Command-line interface for quoting and comparing handset plans against a catalog

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use handset_pricing::catalog::{
    load_subsidies_csv, CacheConfig, CachedCatalogRepository, CatalogFormat, CatalogRepository,
    FileCatalogSource, DEFAULT_CATALOG_PATH,
};
use handset_pricing::pricing::{CalculationResult, ComparisonResult, RawCalculationInput};
use handset_pricing::{Catalog, CalculationInput, ContractType, PricingEngine, QuoteRunner};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "handset_pricing")]
#[command(about = "Monthly cost quotes for carrier handset plans", long_about = None)]
struct Args {
    /// Catalog JSON file
    #[arg(long, global = true, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Read the catalog in the legacy Korean-keyed layout
    #[arg(long, global = true)]
    legacy: bool,

    /// Replace the catalog's subsidy table with an admin CSV export
    #[arg(long, global = true)]
    subsidies: Option<PathBuf>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price one device, plan and contract
    Quote {
        device: String,
        plan: String,

        /// change, transfer or new
        #[arg(long, default_value = "change")]
        join: String,

        /// subsidyDiscount or selectiveContract
        #[arg(long, default_value = "subsidyDiscount")]
        contract: String,

        /// Installment term; 0 for a cash purchase
        #[arg(long, default_value_t = 24)]
        months: i64,

        /// none, internet or internetTv
        #[arg(long)]
        bundle: Option<String>,
    },

    /// Compare subsidy discount against selective contract
    Compare {
        device: String,
        plan: String,

        #[arg(long, default_value = "change")]
        join: String,

        #[arg(long, default_value_t = 24)]
        months: i64,

        #[arg(long)]
        bundle: Option<String>,
    },

    /// Price every available device on a plan, cheapest first
    List {
        plan: String,

        #[arg(long, default_value = "change")]
        join: String,

        #[arg(long, default_value = "subsidyDiscount")]
        contract: String,

        #[arg(long, default_value_t = 24)]
        months: i64,

        #[arg(long)]
        bundle: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let catalog = load(&args)?;

    match args.command {
        Commands::Quote {
            device,
            plan,
            join,
            contract,
            months,
            bundle,
        } => {
            let input = parse_input(device, plan, join, contract, months, bundle)?;
            let result = PricingEngine::new(&catalog).calculate(&input)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_quote(&result);
            }
        }
        Commands::Compare {
            device,
            plan,
            join,
            months,
            bundle,
        } => {
            let input = parse_input(
                device,
                plan,
                join,
                ContractType::SubsidyDiscount.to_string(),
                months,
                bundle,
            )?;
            let comparison = PricingEngine::new(&catalog).compare(&input.without_contract())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&comparison)?);
            } else {
                print_comparison(&comparison);
            }
        }
        Commands::List {
            plan,
            join,
            contract,
            months,
            bundle,
        } => {
            // Device id is filled per row by the runner
            let input = parse_input(String::new(), plan, join, contract, months, bundle)?;
            let runner = QuoteRunner::new(catalog);
            let rows = runner.device_list(
                &input.plan_id,
                input.join_type,
                input.contract_type,
                input.installment_months,
                input.bundle_option,
            )?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_list(&input, &rows);
            }
        }
    }

    Ok(())
}

fn load(args: &Args) -> Result<Arc<Catalog>> {
    let format = if args.legacy {
        CatalogFormat::Legacy
    } else {
        CatalogFormat::Canonical
    };
    let repository = CachedCatalogRepository::new(
        FileCatalogSource::new(args.catalog.clone(), format),
        CacheConfig::default(),
    );
    let catalog = repository
        .load_catalog()
        .with_context(|| format!("Failed to load catalog from {}", args.catalog.display()))?;

    match &args.subsidies {
        None => Ok(catalog),
        Some(path) => {
            let table = load_subsidies_csv(path)
                .with_context(|| format!("Failed to read subsidies from {}", path.display()))?;
            let replaced = Catalog::clone(&catalog)
                .with_subsidies(table)
                .context("Subsidy table does not match the catalog")?;
            Ok(Arc::new(replaced))
        }
    }
}

fn parse_input(
    device_id: String,
    plan_id: String,
    join_type: String,
    contract_type: String,
    installment_months: i64,
    bundle_option: Option<String>,
) -> Result<CalculationInput> {
    let raw = RawCalculationInput {
        device_id,
        plan_id,
        join_type,
        contract_type,
        installment_months,
        bundle_option,
    };
    Ok(CalculationInput::try_from(raw)?)
}

fn print_quote(result: &CalculationResult) {
    println!(
        "{} on {} ({}, {}, {} months, bundle {})",
        result.device_id,
        result.plan_id,
        result.join_type,
        result.contract_type(),
        result.installment_months,
        result.bundle_option
    );
    println!("{}", "-".repeat(44));
    println!("{:<28} {:>15}", "List price", won(result.list_price));
    println!("{:<28} {:>15}", "Applied subsidy", won(result.applied_subsidy));
    println!("{:<28} {:>15}", "Principal", won(result.principal));
    println!("{:<28} {:>15}", "Monthly installment", won(result.monthly_installment));
    println!("{:<28} {:>15}", "Plan base fee", won(result.plan_base_fee));
    println!("{:<28} {:>15}", "Selective discount", won(result.plan_discount()));
    println!("{:<28} {:>15}", "Bundle discount", won(result.bundle_discount_amount));
    println!("{:<28} {:>15}", "Monthly plan fee", won(result.monthly_plan_fee));
    println!("{}", "-".repeat(44));
    println!("{:<28} {:>15}", "Total per month", won(result.total_monthly));
    if result.installment_months == 0 {
        println!("{:<28} {:>15}", "Paid upfront", won(result.upfront_payment()));
    } else {
        println!("{:<28} {:>15}", "Total interest", won_signed(result.total_interest()));
    }
}

fn print_comparison(comparison: &ComparisonResult) {
    let subsidy = &comparison.subsidy_discount;
    let selective = &comparison.selective_contract;

    println!(
        "{} on {} ({}, {} months)",
        subsidy.device_id, subsidy.plan_id, subsidy.join_type, subsidy.installment_months
    );
    println!("{:<22} {:>16} {:>18}", "", "subsidyDiscount", "selectiveContract");
    println!("{}", "-".repeat(58));
    let rows = [
        ("Applied subsidy", subsidy.applied_subsidy, selective.applied_subsidy),
        ("Monthly installment", subsidy.monthly_installment, selective.monthly_installment),
        ("Monthly plan fee", subsidy.monthly_plan_fee, selective.monthly_plan_fee),
        ("Total per month", subsidy.total_monthly, selective.total_monthly),
    ];
    for (label, a, b) in rows {
        println!("{:<22} {:>16} {:>18}", label, won(a), won(b));
    }
    println!(
        "{:<22} {:>16} {:>18}",
        format!("Total over {}m", comparison.horizon_months),
        won(comparison.subsidy_discount_total),
        won(comparison.selective_contract_total)
    );
    println!("{}", "-".repeat(58));
    println!(
        "Recommended: {} (saves {})",
        comparison.recommended,
        won(comparison.savings)
    );
}

fn print_list(input: &CalculationInput, rows: &[CalculationResult]) {
    println!(
        "Plan {} ({}, {}, {} months): {} devices",
        input.plan_id,
        input.join_type,
        input.contract_type,
        input.installment_months,
        rows.len()
    );
    println!(
        "{:<24} {:>12} {:>12} {:>12} {:>12}",
        "Device", "List", "Installment", "Plan fee", "Total"
    );
    println!("{}", "-".repeat(76));
    for row in rows {
        println!(
            "{:<24} {:>12} {:>12} {:>12} {:>12}",
            row.device_id,
            won(row.list_price),
            won(row.monthly_installment),
            won(row.monthly_plan_fee),
            won(row.total_monthly)
        );
    }
}

/// 1234567 -> "1,234,567원"
fn won(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.push('원');
    out
}

fn won_signed(amount: i64) -> String {
    if amount < 0 {
        format!("-{}", won(amount.unsigned_abs()))
    } else {
        won(amount as u64)
    }
}
