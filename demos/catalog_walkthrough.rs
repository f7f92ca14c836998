//! Catalog walkthrough
//!
//! Usage:
//!   POCKET_BAR_API_URL=http://localhost:5000/api/v1 \
//!   POCKET_BAR_EMAIL=admin@bar.ee POCKET_BAR_PASSWORD=secret \
//!   cargo run --example catalog_walkthrough

use pocket_bar_client::{ApiClient, ClientConfig, LoginRequest, SessionHolder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = ClientConfig::from_env()?;
    let email = std::env::var("POCKET_BAR_EMAIL").unwrap_or_else(|_| "admin@pocketbar.ee".to_string());
    let password = std::env::var("POCKET_BAR_PASSWORD").unwrap_or_default();

    println!("=== Pocket Bar Client Example ===");
    println!("API: {}", config.base_url);
    println!("Renewal: {:?}", config.renewal);
    println!();

    let api = ApiClient::new(config)?;
    let session = SessionHolder::new();

    // Log in and keep the credential in the session
    let login = api.identity().login(&LoginRequest::new(email, password)).await?;
    match login.data() {
        Some(credential) => {
            println!("✓ Logged in as {} ({:?})", credential.username(), credential.role());
            session.replace(Some(credential.clone()));
        }
        None => {
            println!("! Login failed: {} {}", login.status(), login.error_message().unwrap_or_default());
            return Ok(());
        }
    }
    println!();

    // List cocktails; a renewed credential is stored back into the session
    let cocktails = api.cocktails().get_all(session.read().as_deref()).await?;
    if session.absorb(&cocktails) {
        println!("✓ Credential was renewed during the call");
    }
    match cocktails.data() {
        Some(list) => {
            println!("Cocktails ({}):", list.len());
            for cocktail in list {
                println!("  - {}", cocktail.name.en_gb().unwrap_or("<unnamed>"));
            }
        }
        None => println!("! Could not list cocktails: {}", cocktails.error_message().unwrap_or_default()),
    }
    println!();

    // Admin-only listing
    let is_admin = session
        .read()
        .and_then(|credential| credential.role().map(|role| role.can_administer()))
        .unwrap_or(false);
    if is_admin {
        let ingredients = api.ingredients().get_all(session.read().as_deref()).await?;
        session.absorb(&ingredients);
        for ingredient in ingredients.data().into_iter().flatten() {
            println!(
                "  ingredient {} used in {} cocktails",
                ingredient.name.en_gb().unwrap_or("<unnamed>"),
                ingredient.ingredient_in_cocktails_count.unwrap_or(0)
            );
        }
    }

    session.logout();
    println!("Done!");

    Ok(())
}
