//! Resource commands - list, add, delete.

use console::style;

use hostctl_api::{AddParams, OperationResponse, RequestContext};
use hostctl_core::config::ConfigHandle;
use hostctl_core::error::HcResult;
use crate::OutputFormat;

/// Run the list command.
pub async fn list(config: ConfigHandle, format: OutputFormat) -> HcResult<()> {
    let api = super::create_api_client(&config).await?;
    let entries = api.list(&RequestContext::background()).await?;

    match format {
        OutputFormat::Json => super::print_json(&entries)?,
        OutputFormat::Text => {
            if entries.is_empty() {
                println!("{}", style("No resources.").dim());
                return Ok(());
            }
            let mut table = super::new_table();
            table.set_header(vec!["ID", "Name"]);
            for entry in &entries {
                table.add_row(vec![entry.id.clone(), entry.name.to_string()]);
            }
            println!("{table}");
            println!("{} resource(s)", entries.len());
        }
    }
    Ok(())
}

/// Run the add command.
pub async fn add(
    config: ConfigHandle,
    id: String,
    ip_address: String,
    port: u16,
    format: OutputFormat,
) -> HcResult<()> {
    let api = super::create_api_client(&config).await?;
    let params = AddParams { ip_address, port };
    let resp = api.add(&RequestContext::background(), &id, &params).await?;
    print_operation("Added", &id, &resp, api.is_async(), format)
}

/// Run the delete command.
pub async fn delete(config: ConfigHandle, id: String, format: OutputFormat) -> HcResult<()> {
    let api = super::create_api_client(&config).await?;
    let resp = api.delete(&RequestContext::background(), &id).await?;
    print_operation("Deleted", &id, &resp, api.is_async(), format)
}

fn print_operation(
    verb: &str,
    id: &str,
    resp: &OperationResponse,
    waited: bool,
    format: OutputFormat,
) -> HcResult<()> {
    match format {
        OutputFormat::Json => super::print_json(&serde_json::json!({
            "id": id,
            "job_id": resp.job_id,
            "job_status": resp.job_status,
            "completed": waited,
        })),
        OutputFormat::Text => {
            let state = if waited {
                style("done").green().to_string()
            } else {
                style("submitted").yellow().to_string()
            };
            println!(
                "{} {} (job {}, {state})",
                style(verb).bold(),
                id,
                style(&resp.job_id).cyan()
            );
            Ok(())
        }
    }
}
