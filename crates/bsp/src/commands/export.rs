//! `bsp export`: snapshot everything visible to the credentials.

use std::fmt::Write;

use bsp_core::{ExportSummary, Services, export_all};

use crate::cli::{ExportArgs, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

fn detail(summary: &ExportSummary) -> String {
    let mut out = format!(
        "Sites:       {}\nUsers:       {}\nGroups:      {}\nGroup roles: {}{}\n",
        summary.sites,
        summary.users,
        summary.groups,
        summary.group_roles,
        if summary.roles_skipped {
            " (stopped: no permission)"
        } else {
            ""
        },
    );
    for file in &summary.files {
        let _ = writeln!(out, "  {}", file.display());
    }
    out.trim_end().to_owned()
}

pub async fn handle(args: ExportArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (target, transport) = config::resolve_target(global)?;
    let services = Services::new(target, &transport)?;

    let summary = export_all(&services, &args.output_dir).await?;

    let out = output::render_single(&global.output, &summary, detail, |s| {
        s.files
            .iter()
            .map(|f| f.display().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
