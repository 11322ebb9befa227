use crate::output::UserOutput;
use sttctl::Config;

/// Print the effective configuration, defaults included, as YAML.
pub fn run_config(config: &Config, out: &dyn UserOutput) -> anyhow::Result<()> {
    out.status(&format!("# base directory: {}", config.base_dir.display()));
    out.status(serde_yaml::to_string(config)?.trim_end());
    Ok(())
}
