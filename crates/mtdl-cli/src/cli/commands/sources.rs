//! `mtdl sources` – show configured sources.

use mtdl_core::config::MtdlConfig;

pub fn run_sources(cfg: &MtdlConfig) {
    if cfg.sources.is_empty() {
        match mtdl_core::config::config_path() {
            Ok(path) => println!("No sources configured. Add [sources.<name>] tables to {}", path.display()),
            Err(_) => println!("No sources configured."),
        }
        return;
    }
    println!("{:<16} {:<10} {}", "NAME", "AUTH", "URL");
    for (name, source) in &cfg.sources {
        let auth = if source.username.is_some() { "user" } else { "-" };
        println!("{:<16} {:<10} {}", name, auth, source.url);
    }
}
