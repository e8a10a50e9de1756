//! Auth subcommand implementations.

mod logout;
mod refresh;
mod register;
mod send_otp;
mod verify_otp;
mod whoami;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use bazaar_core::{ApiUrl, PhoneNumber};

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Text a login code to a phone number
    SendOtp(send_otp::SendOtpArgs),

    /// Log in with a code received by SMS
    VerifyOtp(verify_otp::VerifyOtpArgs),

    /// Create an account with a code received by SMS
    Register(register::RegisterArgs),

    /// Refresh the stored access token
    Refresh(refresh::RefreshArgs),

    /// Forget the stored session
    Logout(logout::LogoutArgs),

    /// Display the logged-in user
    Whoami(whoami::WhoamiArgs),
}

pub async fn handle(cmd: AuthCommand, api: ApiUrl) -> Result<()> {
    match cmd.command {
        AuthSubcommand::SendOtp(args) => send_otp::run(args, api).await,
        AuthSubcommand::VerifyOtp(args) => verify_otp::run(args, api).await,
        AuthSubcommand::Register(args) => register::run(args, api).await,
        AuthSubcommand::Refresh(args) => refresh::run(args, api).await,
        AuthSubcommand::Logout(args) => logout::run(args, api),
        AuthSubcommand::Whoami(args) => whoami::run(args, api).await,
    }
}

fn parse_phone(raw: &str) -> Result<PhoneNumber> {
    PhoneNumber::new(raw).with_context(|| format!("Invalid phone number '{}'", raw))
}
