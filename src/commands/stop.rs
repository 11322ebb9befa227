use crate::output::UserOutput;
use sttctl::{docker::ContainerRuntime, Config, LifecycleManager, Removal};

pub async fn run_stop<R: ContainerRuntime>(
    manager: &LifecycleManager<R>,
    config: &Config,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let instance = config.service_instance()?;

    out.progress(&format!("Stopping {}...", instance.name));
    let removal = match manager.stop(&instance, config.stop_grace_period).await {
        Ok(removal) => removal,
        Err(e) => {
            out.finish_progress(" failed");
            return Err(e.into());
        }
    };

    match removal {
        Removal::Removed => out.finish_progress(" done"),
        Removal::NotFound => out.finish_progress(" not running"),
    }
    Ok(())
}
