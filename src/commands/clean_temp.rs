//! # Clean-Temp Command Implementation
//!
//! Deletes the working directories `mergerepo` leaves behind under the merge
//! temp root (`yum-<user>*` entries), the same cleanup every merge performs
//! before and after running the tool.

use anyhow::Result;
use clap::Args;

use yum_metadata::config::ServerConfig;
use yum_metadata::output::{emoji, OutputConfig};
use yum_metadata::tempdirs::TempDirCleaner;

use super::ConfigArgs;

/// Delete leftover merge working directories
#[derive(Args, Debug)]
pub struct CleanTempArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Execute the `clean-temp` command.
pub fn execute(args: CleanTempArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let cleaner = cleaner_for(&args.config)?;
    let deleted = cleaner.clean();
    println!(
        "{} Deleted {} temp director{} matching {}* in {}",
        emoji(&out, "🧹", "[CLEAN]"),
        deleted,
        if deleted == 1 { "y" } else { "ies" },
        cleaner.prefix(),
        cleaner.root().display()
    );
    Ok(())
}

/// Cleaner for the configured merge temp root, or the default root when
/// there is no configuration file.
fn cleaner_for(args: &ConfigArgs) -> Result<TempDirCleaner> {
    let config = if args.config.exists() {
        args.load()?
    } else {
        ServerConfig::default()
    };
    Ok(TempDirCleaner::for_current_user(&config.merge_temp_root))
}
