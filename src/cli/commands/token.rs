use clap::Subcommand;
use serde_json::json;

use crate::auth::{fingerprint, AuthError, AuthServiceClient, TokenValidator};
use crate::cli::output::{output_error, output_fields};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Subcommand)]
pub enum TokenCommands {
    #[command(about = "Validate a bearer token against the auth service")]
    Validate {
        #[arg(help = "Access token")]
        token: String,
    },
}

pub async fn handle(cmd: TokenCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TokenCommands::Validate { token } => validate(&token, output_format).await,
    }
}

async fn validate(token: &str, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = AuthServiceClient::new(&config::config().auth)?;

    match client.validate(token).await {
        Ok(validated) => output_fields(
            output_format,
            &json!({
                "valid": true,
                "token": fingerprint(token),
                "user_id": validated.user_id,
                "expires_at": validated.expires_at.to_rfc3339(),
            }),
        ),
        Err(AuthError::Rejected { message, details }) => {
            output_fields(
                output_format,
                &json!({
                    "valid": false,
                    "token": fingerprint(token),
                    "error": message,
                    "details": details,
                }),
            )?;
            anyhow::bail!("token rejected")
        }
        Err(e) => {
            output_error(output_format, &e.to_string(), Some("AUTH_SERVICE_ERROR"))?;
            Err(e.into())
        }
    }
}
