use std::sync::Arc;

use anyhow::{Context, Result};

use crate::chat;
use crate::config;
use crate::news;
use crate::session::Session;
use crate::ui;

pub fn run() -> Result<()> {
    let cfg = config::load(config::LoadOptions::default()).context("load config")?;
    let config_path = config::default_path();
    let display_path = friendly_path(config_path.as_ref());

    let session = Session::new(news::seed_store());

    // Chat stays disabled without a configured key; the key lives in the
    // config file or environment, never in source.
    let mut chat_client: Option<Arc<chat::Client>> = None;
    let status: String;
    if cfg.chat.api_key.trim().is_empty() {
        status = format!(
            "Menjelajah berita sekolah. Chat nonaktif: isi chat.api_key di {} untuk mengaktifkan.",
            display_path
        );
    } else {
        let client = chat::Client::new(chat::ClientConfig {
            api_key: cfg.chat.api_key.clone(),
            model: cfg.chat.model.clone(),
            endpoint: cfg.chat.endpoint.clone(),
            user_agent: cfg.chat.user_agent.clone(),
            timeout: cfg.chat.timeout,
        })
        .context("build chat client")?;
        chat_client = Some(Arc::new(client));
        status =
            "Menjelajah berita sekolah. j/k navigasi, Enter buka, / cari, t chat, q keluar."
                .to_string();
    }

    let options = ui::Options {
        status_message: status,
        session,
        chat_client,
        config_path: display_path,
        theme: cfg.ui.theme,
    };

    let mut model = ui::Model::new(options);
    model.run()
}

fn friendly_path(path: Option<&std::path::PathBuf>) -> String {
    if let Some(path) = path {
        if let Some(home) = dirs::home_dir() {
            if let Ok(stripped) = path.strip_prefix(&home) {
                let mut display = String::from("~");
                if !stripped.as_os_str().is_empty() {
                    display.push_str(&format!("/{}", stripped.display()));
                }
                return display;
            }
        }
        path.display().to_string()
    } else {
        "~/.config/kabar-tui/config.yaml".to_string()
    }
}
