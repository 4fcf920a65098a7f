use std::io::{self, Write};

use crate::account::Profile;
use crate::cli::Commands;
use crate::error::Result;
use crate::service::SocialService;

pub fn handle_command(service: &mut SocialService, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Register {
            email,
            name,
            handle,
            password,
        } => {
            let password = password_or_prompt(password)?;
            let profile = service.sign_up(&email, &password, name.as_deref().unwrap_or(""), &handle)?;
            println!("Welcome to Sinigang Social, {}!", profile.display_name);
            print_profile(&profile);
        }
        Commands::Login { email, password } => {
            let password = password_or_prompt(password)?;
            let profile = service.sign_in(&email, &password)?;
            println!("Signed in as {}", profile.handle);
        }
        Commands::Logout => {
            if service.current_user().is_none() {
                println!("Not signed in.");
            } else {
                service.sign_out()?;
                println!("Signed out.");
            }
        }
        Commands::Whoami => match service.current_user() {
            Some(profile) => print_profile(profile),
            None => println!("Not signed in."),
        },
        Commands::Follow { target } => {
            let Some(id) = resolve_target(service, &target) else {
                println!("No account with handle {}", target);
                return Ok(());
            };
            if service.follow(&id)? {
                println!("Now following {}", target);
            } else {
                println!("Already following {}", target);
            }
        }
        Commands::Unfollow { target } => {
            let Some(id) = resolve_target(service, &target) else {
                println!("No account with handle {}", target);
                return Ok(());
            };
            if service.unfollow(&id)? {
                println!("Unfollowed {}", target);
            } else {
                println!("Not following {}", target);
            }
        }
        Commands::Accounts => {
            if service.accounts().is_empty() {
                println!("No accounts registered.");
            }
            for profile in service.accounts().profiles() {
                println!(
                    "{:<20} {:<24} {} followers",
                    profile.handle, profile.display_name, profile.follower_count
                );
            }
        }
    }
    Ok(())
}

fn print_profile(profile: &Profile) {
    println!("{} ({})", profile.display_name, profile.handle);
    println!("  id:        {}", profile.id);
    println!("  bio:       {}", profile.bio);
    println!("  followers: {}", profile.follower_count);
    println!("  following: {}", profile.following_count);
}

/// `@handle` must name a stored account; anything else is taken as a profile id
fn resolve_target(service: &SocialService, target: &str) -> Option<String> {
    match service.accounts().find_by_handle(target) {
        Some(profile) => Some(profile.id.clone()),
        None if target.starts_with('@') => None,
        None => Some(target.to_string()),
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    print!("Password: ");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim_end_matches(&['\r', '\n'][..]).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SinigangConfig;
    use crate::storage::Storage;

    #[test]
    fn test_resolve_target() {
        let storage = Storage::temporary().unwrap();
        let mut service = SocialService::with_storage(storage, &SinigangConfig::default()).unwrap();
        let bob = service.sign_up("bob@x.com", "secret1", "Bob", "bob").unwrap();

        assert_eq!(resolve_target(&service, "@bob"), Some(bob.id.clone()));
        assert_eq!(resolve_target(&service, "BOB"), Some(bob.id));
        assert_eq!(resolve_target(&service, "@unknown"), None);
        assert_eq!(
            resolve_target(&service, "suggested-1"),
            Some("suggested-1".to_string())
        );
    }
}
