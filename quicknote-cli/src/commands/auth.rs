//! Sign-up, sign-in and Google OAuth commands

use anyhow::{bail, Context, Result};
use clap::Args;
use inquire::{Password, PasswordDisplayMode};
use quicknote_core::wire::VerifyOtpRequest;
use quicknote_core::{AuthUser, DateOfBirth, EmailAddress, OtpCode, ProfileName};
use serde_json::Value;

use super::Ctx;
use crate::session::Session;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Email address to send the one-time code to
    #[arg(long)]
    pub email: String,

    /// Your name (stored in your profile)
    #[arg(long)]
    pub name: String,

    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub dob: String,

    /// One-time code (prompted for when omitted)
    #[arg(long)]
    pub otp: Option<String>,
}

#[derive(Args, Debug)]
pub struct SigninArgs {
    /// Email address to send the one-time code to
    #[arg(long)]
    pub email: String,

    /// One-time code (prompted for when omitted)
    #[arg(long)]
    pub otp: Option<String>,
}

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Email address the code was sent to
    #[arg(long)]
    pub email: String,

    /// One-time code from the email
    #[arg(long)]
    pub otp: String,

    /// Name to store in the profile
    #[arg(long, requires = "dob")]
    pub name: Option<String>,

    /// Date of birth to store in the profile, YYYY-MM-DD
    #[arg(long, requires = "name")]
    pub dob: Option<String>,
}

#[derive(Args, Debug)]
pub struct GoogleUrlArgs {
    /// Where Google should send the browser after consent
    #[arg(long)]
    pub redirect_to: Option<String>,
}

#[derive(Args, Debug)]
pub struct GoogleCallbackArgs {
    /// Authorization code from the redirect
    #[arg(long)]
    pub code: String,

    /// OAuth state parameter from the redirect
    #[arg(long)]
    pub state: Option<String>,
}

pub async fn run_signup(ctx: &Ctx, args: SignupArgs) -> Result<()> {
    let email = EmailAddress::new(&args.email)?;
    let name = ProfileName::new(&args.name)?;
    DateOfBirth::parse(&args.dob)?;
    if let Some(otp) = &args.otp {
        OtpCode::new(otp)?;
    }

    let client = ctx.client();
    let sent = client.signup(email.as_str()).await?;
    eprintln!("{}", sent.message);

    let otp = match args.otp {
        Some(otp) => otp,
        None => prompt_otp(email.as_str())?,
    };
    let request = VerifyOtpRequest {
        email: Some(email.to_string()),
        otp: Some(otp),
        name: Some(name.as_str().to_owned()),
        dob: Some(args.dob),
    };
    let verified = client.verify_otp(&request).await?;

    let session = Session {
        token: verified.token,
        user: Some(verified.user),
        name: Some(name.into_string()),
    };
    ctx.sessions.save(&session)?;
    println!("Welcome, {}!", session.display_name());
    Ok(())
}

pub async fn run_signin(ctx: &Ctx, args: SigninArgs) -> Result<()> {
    let email = EmailAddress::new(&args.email)?;
    if let Some(otp) = &args.otp {
        OtpCode::new(otp)?;
    }

    let client = ctx.client();
    let sent = client.signin(email.as_str()).await?;
    eprintln!("{}", sent.message);

    let otp = match args.otp {
        Some(otp) => otp,
        None => prompt_otp(email.as_str())?,
    };
    verify_and_save(
        ctx,
        VerifyOtpRequest {
            email: Some(email.to_string()),
            otp: Some(otp),
            name: None,
            dob: None,
        },
    )
    .await
}

/// Verify a code received out of band (e.g. after `signin` was interrupted).
pub async fn run_verify(ctx: &Ctx, args: VerifyArgs) -> Result<()> {
    let email = EmailAddress::new(&args.email)?;
    OtpCode::new(&args.otp)?;
    if let (Some(name), Some(dob)) = (&args.name, &args.dob) {
        ProfileName::new(name)?;
        DateOfBirth::parse(dob)?;
    }

    verify_and_save(
        ctx,
        VerifyOtpRequest {
            email: Some(email.to_string()),
            otp: Some(args.otp),
            name: args.name,
            dob: args.dob,
        },
    )
    .await
}

async fn verify_and_save(ctx: &Ctx, request: VerifyOtpRequest) -> Result<()> {
    let name = request.name.clone();
    let verified = ctx.client().verify_otp(&request).await?;
    let session = Session {
        token: verified.token,
        user: Some(verified.user),
        name,
    };
    ctx.sessions.save(&session)?;
    println!("Welcome, {}!", session.display_name());
    Ok(())
}

pub async fn run_google_url(ctx: &Ctx, args: GoogleUrlArgs) -> Result<()> {
    let url = ctx.client().google_url(args.redirect_to.as_deref()).await?;
    println!("{}", url);
    Ok(())
}

pub async fn run_google_callback(ctx: &Ctx, args: GoogleCallbackArgs) -> Result<()> {
    let value = ctx
        .client()
        .google_callback(&args.code, args.state.as_deref())
        .await?;
    let session = session_from_oauth(&value)?;
    ctx.sessions.save(&session)?;
    println!("Welcome, {}!", session.display_name());
    Ok(())
}

/// Pull the access token and user out of a relayed provider session.
fn session_from_oauth(value: &Value) -> Result<Session> {
    let Some(token) = value.get("access_token").and_then(Value::as_str) else {
        bail!("OAuth response did not include an access token");
    };
    let user = value
        .get("user")
        .cloned()
        .and_then(|u| serde_json::from_value::<AuthUser>(u).ok());
    Ok(Session {
        token: token.to_owned(),
        user,
        name: None,
    })
}

fn prompt_otp(email: &str) -> Result<String> {
    let otp = Password::new("One-time code:")
        .with_help_message(&format!("Sent to {}", email))
        .with_display_mode(PasswordDisplayMode::Masked)
        .with_display_toggle_enabled()
        .without_confirmation()
        .prompt()
        .context("No one-time code entered")?;
    OtpCode::new(&otp)?;
    Ok(otp)
}
