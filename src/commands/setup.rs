use crate::output::UserOutput;
use sttctl::{
    setup::{build_image, create_data_dirs, has_env_file, BuildMethod},
    Config, DockerClient,
};

pub async fn run_setup(
    client: &DockerClient,
    config: &Config,
    no_build: bool,
    out: &dyn UserOutput,
) -> anyhow::Result<()> {
    let dirs = config.data_dirs();
    let created = create_data_dirs(&dirs)?;
    for dir in &dirs {
        let marker = if created.contains(dir) { "created" } else { "exists" };
        out.status(&format!("  {:<8} {}", marker, dir.display()));
    }

    if config.env_file.is_none() && !has_env_file(&config.base_dir) {
        out.warning(&format!(
            "No .env file in {}; the container will start without one",
            config.base_dir.display()
        ));
    }

    if no_build {
        out.success("Data directories ready");
        return Ok(());
    }

    let method = BuildMethod::for_config(config);
    out.status(&format!("Building image: {}", method.describe()));
    build_image(client, &method).await?;

    out.success("Setup complete. Start the service with `sttctl start`.");
    Ok(())
}
