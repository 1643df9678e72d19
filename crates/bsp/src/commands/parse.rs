//! `bsp parse`: CSV export to provisioning input file.

use bsp_core::convert_csv_file;

use crate::cli::{GlobalOpts, ParseArgs};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ParseArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let count = convert_csv_file(&args.csv, &args.out)?;
    output::status_line(
        true,
        &format!("Wrote {count} site(s) to {}", args.out.display()),
        output::should_color(&global.color),
        global.quiet,
    );
    Ok(())
}
