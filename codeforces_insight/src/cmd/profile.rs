use crate::cmd::{api_url_from_env, env_u64};
use crate::modules::profile::aggregator;
use anyhow::{Context, Result};
use clap::Args;
use codeforces_insight_libs::codeforces::client::CodeforcesClient;
use std::time::Duration;

#[derive(Debug, Args)]
pub struct ProfileArgs {
    /// Codeforces handle to aggregate
    handle: String,
}

/// Fetch one aggregated profile and print it as pretty JSON. Goes through
/// the same rate gate and caches as the API server.
pub async fn run(args: ProfileArgs) -> Result<()> {
    let api_url = api_url_from_env();
    let min_call_interval = Duration::from_millis(env_u64("MIN_CALL_INTERVAL_MS", 2000));
    let cache_ttl = Duration::from_secs(env_u64("CACHE_TTL_SECONDS", 600));

    let client = CodeforcesClient::new(&api_url, min_call_interval, cache_ttl)
        .context("couldn't create codeforces client")?;

    let profile = aggregator::get_user_profile(&client, &args.handle)
        .await
        .with_context(|| format!("failed to aggregate profile for {}", args.handle))?;

    println!("{}", serde_json::to_string_pretty(&profile)?);

    Ok(())
}
