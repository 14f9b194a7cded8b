// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use ward_config::{SecretValue, WardConfig};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    let config = ward_config::load_config(config_path)
        .map_err(|source| BinError::config(config_path, source))?;

    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Listen: {}", config.server.socket_addr());
            println!(
                "  Registration: {}",
                if config.server.registration_enabled { "enabled" } else { "disabled" }
            );
            println!("  Session TTL: {}", humanize(config.security.session_ttl));
            println!("  API key TTL: {}", humanize(config.security.api_key_ttl));
            println!("  Revocation purge: every {}", humanize(config.security.purge_interval));
            println!("  Root admin: {}", config.root_admin.email);

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", to_json(&redacted(&config))?);
            }
        }
        OutputFormat::Json => {
            let redacted = redacted(&config);
            let output = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "listen": config.server.socket_addr().to_string(),
                    "registration_enabled": config.server.registration_enabled,
                    "session_ttl_secs": config.security.session_ttl.as_secs(),
                    "api_key_ttl_secs": config.security.api_key_ttl.as_secs(),
                    "purge_interval_secs": config.security.purge_interval.as_secs(),
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&redacted) } else { None },
            });
            println!("{}", to_json(&output)?);
        }
    }

    Ok(())
}

/// Non-fatal findings worth surfacing before deployment.
fn collect_warnings(config: &WardConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    if config.root_admin.password.as_ref().is_none_or(SecretValue::is_empty) {
        warnings.push("root_admin.password is not set; an empty store cannot be provisioned".to_string());
    }
    if config.server.registration_enabled {
        warnings.push("Self-service registration is enabled".to_string());
    }
    if config.server.cors.enabled && config.server.cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS allows any origin".to_string());
    }
    warnings
}

/// Copy of the configuration with secrets masked.
fn redacted(config: &WardConfig) -> WardConfig {
    let mut config = config.clone();
    let mask = |s: &mut Option<SecretValue>| {
        if s.is_some() {
            *s = Some(SecretValue::new("***"));
        }
    };
    mask(&mut config.security.secret);
    mask(&mut config.root_admin.password);
    config
}

fn to_json<T: serde::Serialize>(value: &T) -> BinResult<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn humanize(duration: std::time::Duration) -> String {
    format!("{}s", duration.as_secs())
}
