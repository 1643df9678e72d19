//! `bsp verify`: offline comparison of input and state files.

use tabled::Tabled;

use bsp_core::{Verification, verify_files};

use crate::cli::{GlobalOpts, OutputFormat, VerifyArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct VerdictRow {
    #[tabled(rename = "")]
    label: &'static str,
    #[tabled(rename = "value")]
    value: &'static str,
    #[tabled(rename = "count")]
    count: usize,
}

fn verdict(ok: bool) -> &'static str {
    if ok { "TRUE" } else { "FALSE" }
}

fn rows(v: &Verification) -> [VerdictRow; 2] {
    [
        VerdictRow {
            label: "Sites Verified",
            value: verdict(v.sites_verified),
            count: v.sites_count,
        },
        VerdictRow {
            label: "Users Verified",
            value: verdict(v.users_verified),
            count: v.users_count,
        },
    ]
}

pub fn handle(args: &VerifyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let verification = verify_files(&args.input, &args.state)?;

    let out = match global.output {
        OutputFormat::Table => output::render_table(&rows(&verification)),
        OutputFormat::Plain => rows(&verification)
            .iter()
            .map(|r| format!("{}\t{}\t{}", r.label, r.value, r.count))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => output::render_single(
            &global.output,
            &verification,
            |_| String::new(),
            |_| String::new(),
        )?,
    };
    output::print_output(&out, global.quiet);

    let color = output::should_color(&global.color);
    for check in verification.sites.iter().filter(|c| !c.site_verified()) {
        let reason = if check.matched.is_none() {
            "not in state file".to_owned()
        } else {
            format!("missing {}", check.missing.join(", "))
        };
        output::status_line(
            false,
            &format!("{}: {reason}", check.site_name),
            color,
            global.quiet,
        );
    }
    Ok(())
}
