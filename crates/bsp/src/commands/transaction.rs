//! `bsp transaction`: transaction-document submit and lookup.

use bsp_api::{BspClient, TransactionClient};

use crate::cli::{GlobalOpts, TransactionArgs, TransactionCommand};
use crate::config;
use crate::error::CliError;
use crate::output;

pub async fn handle(args: TransactionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (target, transport) = config::resolve_target(global)?;
    let transactions = TransactionClient::from_client(BspClient::new(target, &transport)?);

    match args.command {
        TransactionCommand::Submit { file } => {
            let xml = std::fs::read_to_string(&file).map_err(|source| CliError::Io {
                path: file.display().to_string(),
                source,
            })?;
            let created = transactions.submit_transaction(&xml).await?;
            let out = output::render_single(
                &global.output,
                &created,
                |v| serde_json::to_string_pretty(v).unwrap_or_default(),
                |v| {
                    v.get("id")
                        .and_then(serde_json::Value::as_str)
                        .unwrap_or_default()
                        .to_owned()
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TransactionCommand::Get { id } => {
            let document = transactions.get_transaction(&id).await?;
            let out = output::render_single(
                &global.output,
                &document,
                |v| serde_json::to_string_pretty(v).unwrap_or_default(),
                |_| id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TransactionCommand::Exists { id } => {
            if !transactions.transaction_exists(&id).await? {
                return Err(CliError::NotFound {
                    resource_type: "Transaction document".into(),
                    identifier: id,
                });
            }
            output::status_line(
                true,
                &format!("Transaction document '{id}' exists"),
                output::should_color(&global.color),
                global.quiet,
            );
            Ok(())
        }
    }
}
