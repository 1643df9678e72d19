//! `bsp provision`: run the provisioning workflow over an input file.

use tabled::Tabled;

use bsp_core::{InputFile, Provisioner, Services, SiteReport};

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SiteReportRow {
    #[tabled(rename = "Site")]
    site: String,
    #[tabled(rename = "Created")]
    created: &'static str,
    #[tabled(rename = "Updated")]
    updated: &'static str,
    #[tabled(rename = "EU")]
    eu: &'static str,
    #[tabled(rename = "User")]
    user: &'static str,
    #[tabled(rename = "Keys")]
    keys: &'static str,
}

fn mark(done: bool) -> &'static str {
    if done { "yes" } else { "-" }
}

impl From<&SiteReport> for SiteReportRow {
    fn from(r: &SiteReport) -> Self {
        Self {
            site: r.site_name.clone(),
            created: mark(r.site_created),
            updated: mark(r.site_updated),
            eu: mark(r.eu_resolved),
            user: mark(r.user_created),
            keys: mark(r.keys_issued),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: ProvisionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let input = InputFile::load(&args.input)?;
    let (target, transport) = config::resolve_target(global)?;
    let services = Services::new(target, &transport)?;

    let mut provisioner = Provisioner::in_dir(services, &args.output_dir)?;
    let report = provisioner.run(&input).await?;

    let out = output::render_list(
        &global.output,
        &report.sites,
        |r| SiteReportRow::from(r),
        |r| r.site_name.clone(),
    )?;
    output::print_output(&out, global.quiet);

    let changed = report.sites.iter().filter(|s| s.changed()).count();
    output::status_line(
        true,
        &format!(
            "{} site(s) processed, {changed} changed; state in {}",
            report.sites.len(),
            provisioner.state().path().display()
        ),
        output::should_color(&global.color),
        global.quiet,
    );
    Ok(())
}
