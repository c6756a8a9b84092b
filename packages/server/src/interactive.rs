//! Interactive mode for the server.
//!
//! Prompts the user for bind address and port before starting the server.

use carbon_dash_dashboard::DashboardConfig;
use dialoguer::{Confirm, Input};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks the user for a bind address and port, sets the corresponding
/// environment variables (`BIND_ADDR`, `PORT`), and delegates to
/// [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run(config: DashboardConfig) -> std::io::Result<()> {
    println!("Carbon Emission Dashboard Server");
    println!();

    let (default_addr, default_port) = super::bind_address();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(default_addr.clone())
        .interact_text()
        .unwrap_or(default_addr);

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default(default_port.to_string())
        .interact_text()
        .unwrap_or_else(|_| default_port.to_string());

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
    }

    if !Confirm::new()
        .with_prompt(format!(
            "Serve {} on {bind_addr}:{port_str}?",
            config.data.dataset.display()
        ))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server(config).await
}
