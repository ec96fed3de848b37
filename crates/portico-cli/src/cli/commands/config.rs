//! Config command handlers.

use anyhow::{Context, Result};
use portico_core::config::AuthConfig;

pub fn check() -> Result<()> {
    let config = AuthConfig::from_env().context("validate environment")?;

    println!("Configuration OK");
    println!("  authorize: {}", config.authorize_endpoint());
    println!("  token:     {}", config.token_endpoint());
    println!("  userinfo:  {}", config.userinfo_endpoint());
    println!("  logout:    {}", config.logout_endpoint());
    println!("  redirect:  {}", config.redirect_uri);
    println!("  scopes:    {}", config.scope_param());
    println!("  api:       {}", config.api_uri);
    Ok(())
}
