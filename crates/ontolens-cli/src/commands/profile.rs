//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, Profile};
use crate::error::{CliError, Result};
use crate::output::Formatter;

/// Execute the profile command.
pub async fn execute_profile(
    args: ProfileArgs,
    config: &mut Config,
    formatter: &Formatter,
) -> Result<()> {
    match args.action {
        ProfileAction::List => list_profiles(config, formatter),
        ProfileAction::Show => show_active_profile(config, formatter),
        ProfileAction::Switch { name } => {
            switch_profile(config, name.clone())?;
            config.save()?;
            println!("{}", formatter.success(&format!("Switched to profile '{}'", name)));
            Ok(())
        }
        ProfileAction::Set {
            name,
            url,
            token,
            batch_limit,
        } => {
            let action = set_profile(config, name.clone(), url, token, batch_limit)?;
            config.save()?;
            println!("{}", formatter.success(&format!("{} profile '{}'", action, name)));
            Ok(())
        }
        ProfileAction::Delete { name } => {
            if delete_profile(config, &name)? {
                config.save()?;
                println!("{}", formatter.success(&format!("Deleted profile '{}'", name)));
            } else {
                println!(
                    "{}",
                    formatter.warning(&format!("Profile '{}' does not exist", name))
                );
            }
            Ok(())
        }
    }
}

fn print_profile(profile: &Profile, indent: &str) {
    println!("{}URL: {}", indent, profile.api_url);
    if profile.api_token.is_some() {
        println!("{}Token: ********", indent);
    }
    if let Some(limit) = profile.batch_limit {
        println!("{}Batch limit: {}", indent, limit);
    }
    if let Some(timeout) = profile.timeout_secs {
        println!("{}Timeout: {}s", indent, timeout);
    }
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) -> Result<()> {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return Ok(());
    }

    println!("Available profiles:");
    for (name, profile) in &config.profiles {
        if name == &config.active_profile {
            println!("* {}", formatter.success(name));
        } else {
            println!("  {}", name);
        }
        print_profile(profile, "    ");
    }

    Ok(())
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;
    println!("Active profile: {}", formatter.success(&config.active_profile));
    print_profile(profile, "  ");
    Ok(())
}

fn switch_profile(config: &mut Config, name: String) -> Result<()> {
    config.switch_profile(name)
}

/// Create or update a profile, returning `"Created"` or `"Updated"`.
fn set_profile(
    config: &mut Config,
    name: String,
    url: String,
    token: Option<String>,
    batch_limit: Option<usize>,
) -> Result<&'static str> {
    if url.trim().is_empty() {
        return Err(CliError::InvalidInput("Profile URL must not be empty".to_string()));
    }
    if batch_limit == Some(0) {
        return Err(CliError::InvalidInput("Batch limit must be positive".to_string()));
    }

    let action = match config.profiles.get(&name) {
        Some(_) => "Updated",
        None => "Created",
    };
    let timeout_secs = config.profiles.get(&name).and_then(|p| p.timeout_secs);

    config.set_profile(
        name,
        Profile {
            api_url: url,
            api_token: token,
            batch_limit,
            timeout_secs,
        },
    );
    Ok(action)
}

/// Delete a profile, returning whether it existed.
fn delete_profile(config: &mut Config, name: &str) -> Result<bool> {
    if name == config.active_profile {
        return Err(CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }
    Ok(config.profiles.remove(name).is_some())
}
