//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `learnhub_core` linkage, schema bootstrap and the cache path
//!   without a network or the mobile runtime.
//! - Keep output deterministic for quick local sanity checks.

use learnhub_core::db::migrations::{current_user_version, latest_version};
use learnhub_core::{
    open_db_in_memory, CachedContentRepository, ContentRepository, CoreConfig, FetchPolicy,
    InMemoryRemote,
};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    println!("learnhub_core ping={}", learnhub_core::ping());
    println!("learnhub_core version={}", learnhub_core::core_version());

    let conn = open_db_in_memory()?;
    println!(
        "schema user_version={} latest={}",
        current_user_version(&conn)?,
        latest_version()
    );

    let config = CoreConfig::default();
    let repo = CachedContentRepository::try_new(&conn, InMemoryRemote::new(), config.cache_ttl())?;
    let first = repo.classes(FetchPolicy::CacheFirst)?;
    let second = repo.classes(FetchPolicy::CacheFirst)?;
    println!(
        "cache probe first={:?} second={:?}",
        first.origin, second.origin
    );
    Ok(())
}
