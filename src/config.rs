use std::path::PathBuf;

use clap::Parser;

/// Server settings. Every flag falls back to an environment variable.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 3000)]
    pub port: u16,
    /// Directory holding the browser client (`index.html` plus assets).
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
    /// Fixed seed for spawn and scatter rolls. Random when omitted.
    #[arg(long, env = "MATCH_SEED")]
    pub seed: Option<u32>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        if let Some(path) = self.static_dir.as_ref() {
            if path.join("index.html").is_file() {
                return Some(path.clone());
            }
        }

        let candidates = [PathBuf::from("public"), PathBuf::from("../public")];
        candidates
            .into_iter()
            .find(|path| path.join("index.html").is_file())
    }
}
