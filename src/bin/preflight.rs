use shared_catalog::infra::config;
use shared_catalog::storage::{codec, CatalogBackend, FileBackend, LockStrategy};
use std::collections::HashSet;

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: cargo run --bin preflight\n\
         \n\
         Reads env vars (or .env):\n\
           CATALOG_PATH, CATALOG_LOCK, CATALOG_LOCK_TIMEOUT_MS\n\
         and checks that the catalog document can be decoded.\n"
    );
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        usage_and_exit();
    }

    let path = config::catalog_path();
    let strategy = config::lock_strategy()?;

    println!("> Preflight:");
    println!("  CATALOG_PATH={}", path.display());
    match &strategy {
        LockStrategy::ProcessLocal => {
            println!("  CATALOG_LOCK=process");
            println!("  Warning: writers in different processes are not coordinated; concurrent writes can be lost.");
        }
        LockStrategy::Advisory { path, timeout } => {
            println!("  CATALOG_LOCK=advisory ({}, timeout {:?})", path.display(), timeout);
        }
    }

    let backend = FileBackend::new(&path);
    let bytes = match backend.load().await? {
        Some(bytes) => bytes,
        None => {
            println!("  Document does not exist yet; it will be created by the first write.");
            println!("> Preflight OK.");
            return Ok(());
        }
    };

    let catalog = if bytes.iter().all(u8::is_ascii_whitespace) {
        Vec::new()
    } else {
        codec::decode(&bytes)?
    };
    println!("  Products: {}", catalog.len());
    println!(
        "  Max id: {}",
        catalog.iter().map(|p| p.id).max().map_or("-".to_string(), |m| m.to_string())
    );

    let mut seen = HashSet::new();
    let duplicates: Vec<u64> = catalog
        .iter()
        .map(|p| p.id)
        .filter(|id| !seen.insert(*id))
        .collect();
    if duplicates.is_empty() {
        println!("  Ids are unique.");
    } else {
        eprintln!("  Warning: duplicate ids at rest: {:?}", duplicates);
    }

    let incomplete: Vec<u64> = catalog
        .iter()
        .filter(|p| p.validate().is_err())
        .map(|p| p.id)
        .collect();
    if !incomplete.is_empty() {
        eprintln!(
            "  Warning: records missing a valid title or price (updates to them are refused until fixed): {:?}",
            incomplete
        );
    }

    println!("> Preflight OK.");
    Ok(())
}
