//! config command - Show the effective configuration

use anyhow::{Context as _, Result};

use crate::core::config::Config;
use crate::engine::Context;
use crate::git::Git;
use crate::provider::ProviderKind;

/// Load config for the repository around the context directory, if any.
fn load(ctx: &Context) -> Result<(Config, Option<std::path::PathBuf>)> {
    let cwd = ctx
        .work_dir()
        .context("Failed to determine working directory")?;
    let root = Git::find_root(&cwd).ok();
    let loaded = Config::load(root.as_deref()).context("Failed to load config")?;
    Ok((loaded.config, root))
}

/// Print the effective configuration.
pub fn show(ctx: &Context) -> Result<()> {
    let (config, _) = load(ctx)?;
    let provider = config.provider();
    let kind = provider
        .kind
        .as_deref()
        .and_then(ProviderKind::parse)
        .unwrap_or_default();

    println!("provider.kind = {}", kind);
    println!(
        "provider.model = {}",
        provider.model.as_deref().unwrap_or(kind.default_model())
    );
    if let Some(base) = &provider.api_base {
        println!("provider.api_base = {}", base);
    }
    println!(
        "provider.api_key_env = {}",
        provider
            .api_key_env
            .as_deref()
            .unwrap_or(kind.default_api_key_env())
    );
    println!("provider.timeout_secs = {}", config.provider_timeout_secs());
    println!("commit.max_message_length = {}", config.max_message_length());
    println!("commit.max_diff_chars = {}", config.max_diff_chars());
    println!("commit.recent_subjects = {}", config.recent_subjects());
    println!("commit.types = {}", config.repo.allowed_types().join("|"));
    if config.repo.has_scopes() {
        for rule in &config.repo.scopes {
            println!("scope {} -> {}", rule.path, rule.scope);
        }
    }
    if let Some(default_scope) = &config.repo.default_scope {
        println!("default_scope = {}", default_scope);
    }
    println!("interactive = {}", config.interactive());
    Ok(())
}

/// Print where configuration is read from.
pub fn path(ctx: &Context) -> Result<()> {
    let (config, root) = load(ctx)?;
    let loaded = config.global_config_loaded_from();

    println!("global config (first existing wins):");
    for candidate in Config::global_candidates() {
        let mark = if Some(candidate.as_path()) == loaded {
            " (loaded)"
        } else {
            ""
        };
        println!("  {}{}", candidate.display(), mark);
    }

    match root {
        Some(root) => {
            let repo_path = Config::repo_config_path(&root);
            let mark = if config.repo_config_loaded_from().is_some() {
                " (loaded)"
            } else {
                " (not present)"
            };
            println!("repo config:\n  {}{}", repo_path.display(), mark);
        }
        None => println!("repo config:\n  (not inside a repository)"),
    }
    Ok(())
}
