use crate::config::{ClientConfig, config_path};

pub fn run_config_set_server(url: String) -> anyhow::Result<()> {
    let url = url.trim().trim_end_matches('/').to_string();
    if !url.starts_with("http://") && !url.starts_with("https://") {
        anyhow::bail!("Server URL must start with http:// or https://");
    }

    let path = config_path()?;
    ClientConfig::new(url.clone()).save(&path)?;

    println!();
    println!("Server set to {url}");
    println!("Saved to {}", path.display());
    println!();

    Ok(())
}

pub fn run_config_show(server: Option<&str>) -> anyhow::Result<()> {
    let config = ClientConfig::resolve(server)?;
    let path = config_path()?;

    println!();
    println!("Server:      {}", config.server_url);
    println!("Config file: {}", path.display());
    println!();

    Ok(())
}
