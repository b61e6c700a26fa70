//! Session inspection commands

use anyhow::Result;

use super::{explain, Ctx};

pub async fn run_whoami(ctx: &Ctx) -> Result<()> {
    let (_, session) = ctx.signed_in()?;
    println!("Welcome, {}!", session.display_name());
    if let Some(user) = &session.user {
        println!("  id:    {}", user.id);
        if let Some(email) = &user.email {
            println!("  email: {}", email);
        }
    }
    Ok(())
}

pub async fn run_profile(ctx: &Ctx) -> Result<()> {
    let (client, _) = ctx.signed_in()?;
    match client.profile().await.map_err(explain)? {
        Some(profile) => {
            println!("Name:          {}", profile.name);
            println!("Date of birth: {}", profile.dob);
        }
        None => println!("No profile saved."),
    }
    Ok(())
}

pub async fn run_logout(ctx: &Ctx) -> Result<()> {
    if ctx.sessions.clear()? {
        println!("Signed out.");
    } else {
        println!("No saved session.");
    }
    Ok(())
}
