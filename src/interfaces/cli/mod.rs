//! The `storefront` binary's commands.

pub mod args;

use crate::application::catalog::CatalogService;
use crate::application::checkout::{CheckoutSequencer, PayOutcome};
use crate::application::ledger::CartLedger;
use crate::config::{CheckoutConfig, LedgerConfig, SimulationConfig};
use crate::domain::catalog::{CatalogQuery, Product, ProductStatus};
use crate::domain::checkout::CheckoutPhase;
use crate::domain::ports::{LocalStorage, LocalStorageBox, WalletIdentity};
use crate::domain::price::Price;
use crate::error::Result;
use crate::infrastructure::file::FileStorage;
use crate::infrastructure::simulated::{LoggingWalletConnector, SimulatedGateway};
use crate::interfaces::csv::listing_writer::ListingWriter;
use crate::interfaces::csv::product_reader::ProductReader;
use args::{
    AddProductArgs, CartCommand, CatalogCommand, CheckoutArgs, Cli, Command, ListArgs,
    StorageArgs,
};
use std::fs::File;
use std::io::{self, Write};
use std::process::ExitCode;
use std::time::Duration;

/// Runs one command against the configured storage.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let (catalog_storage, cart_storage) = open_storage(&cli.storage)?;
    let ledger_config = LedgerConfig {
        unit: cli.ledger.unit,
        storage_key: cli.ledger.cart_key,
    };
    ledger_config.validate()?;

    match cli.command {
        Command::Catalog { command } => {
            let catalog = CatalogService::load(catalog_storage, ledger_config.unit.clone()).await?;
            run_catalog(catalog, command, &ledger_config.unit).await
        }
        Command::Cart { command } => {
            let ledger = CartLedger::load(cart_storage, ledger_config).await?;
            run_cart(ledger, catalog_storage, command).await
        }
        Command::Checkout(args) => {
            let ledger = CartLedger::load(cart_storage, ledger_config).await?;
            run_checkout(ledger, args).await
        }
    }
}

fn open_storage(args: &StorageArgs) -> Result<(LocalStorageBox, LocalStorageBox)> {
    #[cfg(feature = "storage-rocksdb")]
    if let Some(db_path) = &args.db_path {
        let store = crate::infrastructure::rocksdb::RocksDbStorage::open(db_path)?;
        return Ok(boxed_pair(store));
    }

    #[cfg(not(feature = "storage-rocksdb"))]
    if args.db_path.is_some() {
        eprintln!(
            "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to file storage in {}.",
            args.data_dir.display()
        );
    }

    Ok(boxed_pair(FileStorage::new(&args.data_dir)))
}

fn boxed_pair<S>(storage: S) -> (LocalStorageBox, LocalStorageBox)
where
    S: LocalStorage + Clone + 'static,
{
    (Box::new(storage.clone()), Box::new(storage))
}

async fn run_catalog(
    mut catalog: CatalogService,
    command: CatalogCommand,
    unit: &str,
) -> Result<ExitCode> {
    match command {
        CatalogCommand::List(args) => {
            let products = catalog.catalog().search(&query(args));
            let mut writer = ListingWriter::new(io::stdout().lock());
            writer.write_products(products)?;
        }
        CatalogCommand::Add(args) => {
            let product = new_product(args, unit)?;
            let id = product.id.clone();
            catalog.add(product).await?;
            eprintln!("Listed product {id}");
        }
        CatalogCommand::Remove { id } => {
            let removed = catalog.remove(&id).await?;
            eprintln!("Removed product {} ({})", removed.id, removed.name);
        }
        CatalogCommand::Status { id, status } => {
            catalog.set_status(&id, status.into()).await?;
        }
        CatalogCommand::Import { path } => {
            let reader = ProductReader::new(File::open(path)?, unit);
            let products = reader.products().collect::<Result<Vec<_>>>()?;
            let summary = catalog.import(products).await?;
            eprintln!(
                "Imported {} new and {} updated products",
                summary.added, summary.updated
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn query(args: ListArgs) -> CatalogQuery {
    CatalogQuery {
        search: args.search,
        category: args.category,
        min_price: args.min,
        max_price: args.max,
        status: args.status.map(Into::into),
        sort: args.sort.into(),
    }
}

fn new_product(args: AddProductArgs, unit: &str) -> Result<Product> {
    Ok(Product {
        price: Price::parse_with_default_unit(&args.price, unit)?,
        id: args.id,
        name: args.name,
        description: args.description,
        image: args.image,
        category: args.category,
        token_id: args.token_id,
        is_private: args.private,
        status: if args.draft {
            ProductStatus::Draft
        } else {
            ProductStatus::Active
        },
    })
}

async fn run_cart(
    mut ledger: CartLedger,
    catalog_storage: LocalStorageBox,
    command: CartCommand,
) -> Result<ExitCode> {
    match command {
        CartCommand::Show => {}
        CartCommand::Add {
            product_id,
            quantity,
        } => {
            let catalog = CatalogService::load(catalog_storage, ledger.unit().to_string()).await?;
            let item = catalog.purchasable(&product_id)?.to_cart_item();
            ledger.add_item_with_quantity(item, quantity).await?;
        }
        CartCommand::Remove { id } => ledger.remove_item(&id).await,
        CartCommand::Set { id, quantity } => ledger.update_quantity(&id, quantity).await?,
        CartCommand::Clear => ledger.clear().await,
        CartCommand::Toggle => {
            ledger.toggle().await;
            eprintln!(
                "Cart panel {}",
                if ledger.is_open() { "open" } else { "closed" }
            );
        }
    }

    print_cart(&ledger)?;
    Ok(ExitCode::SUCCESS)
}

fn print_cart(ledger: &CartLedger) -> Result<()> {
    let aggregate = ledger.aggregate();
    let stdout = io::stdout();
    let mut writer = ListingWriter::new(stdout.lock());
    writer.write_cart(ledger.lines())?;
    let mut out = writer.into_inner()?;
    writeln!(out, "items: {}", aggregate.item_count)?;
    writeln!(out, "total: {}", aggregate.total)?;
    Ok(())
}

async fn run_checkout(ledger: CartLedger, args: CheckoutArgs) -> Result<ExitCode> {
    let gateway = SimulatedGateway::new(SimulationConfig {
        payment_delay: Duration::from_millis(args.payment_delay_ms),
        failure_probability: args.failure_probability,
        seed: args.seed,
    })?;
    let config = CheckoutConfig {
        tick_interval: Duration::from_millis(args.tick_ms),
        progress_step: args.progress_step,
    };

    let ledger = ledger.into_shared();
    let mut checkout = CheckoutSequencer::begin(
        ledger,
        Box::new(gateway),
        Box::new(LoggingWalletConnector),
        config,
    )
    .await?;
    eprintln!("Order total: {}", checkout.session().total);

    let wallet = args.wallet.map(WalletIdentity::new);
    match checkout.pay(wallet.as_ref()).await? {
        PayOutcome::WalletRequired => {
            eprintln!("Connect a wallet to pay (pass --wallet <ADDRESS>)");
            return Ok(ExitCode::FAILURE);
        }
        PayOutcome::Rejected { reason } => {
            eprintln!("Payment failed: {reason}");
            return Ok(ExitCode::FAILURE);
        }
        PayOutcome::Processing => eprintln!("Transaction submitted, processing..."),
    }

    let mut updates = checkout.subscribe();
    loop {
        let (phase, progress) = {
            let session = updates.borrow_and_update();
            (session.phase, session.progress)
        };
        if phase != CheckoutPhase::Processing {
            break;
        }
        if progress > 0 {
            eprintln!("processing: {progress}%");
        }
        if updates.changed().await.is_err() {
            break;
        }
    }

    let settled = checkout.wait_for_settled().await;
    if settled.phase != CheckoutPhase::Success {
        eprintln!("Checkout ended in the {} phase", settled.phase);
        return Ok(ExitCode::FAILURE);
    }

    let order = checkout.complete().await?;
    eprintln!("Payment successful, paid {}", order.total);
    println!("{}", order.transaction_ref);
    Ok(ExitCode::SUCCESS)
}
