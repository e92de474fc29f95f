use crate::config::generate::generate_starter_config;
use crate::config::user_config_path;
use std::fs;
use std::path::PathBuf;

pub fn init(stdout: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_content = generate_starter_config();

    if stdout {
        print!("{}", config_content);
        return Ok(());
    }

    let config_path = match user_config_path() {
        Some(path) => path,
        None => {
            eprintln!("Warning: could not determine home directory");
            eprintln!("Falling back to /etc/cooccur/config.yml");
            PathBuf::from("/etc/cooccur/config.yml")
        }
    };

    if config_path.exists() {
        return Err(format!(
            "config already exists at {}; remove it or use --stdout",
            config_path.display()
        )
        .into());
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
    }

    fs::write(&config_path, config_content)
        .map_err(|e| format!("failed to write {}: {}", config_path.display(), e))?;

    println!("Config written to {}", config_path.display());
    Ok(())
}
