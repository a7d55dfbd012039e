mod actions;
mod channel;
mod config;
mod error;
mod models;
mod utils;
mod view;

use log::{error, info, warn};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use actions::{parse_command, perform, OperatorCommand, UnwiredCommandPort, HELP};
use channel::spawn_channel;
use config::DashboardConfig;
use view::activity::{render_activity_chart, WEEKLY_STEPS};
use view::{render_panel, TelemetryView};

const INPUT_BUFFER: usize = 8;

/// Read operator commands from stdin, one line each
fn spawn_operator_input() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(INPUT_BUFFER);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}

fn redraw(view: &TelemetryView) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", render_panel(view.state()))?;
    stdout.flush()
}

async fn main_loop(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting SenseBand telemetry dashboard");

    // Static weekly activity, drawn once
    println!("{}", render_activity_chart(&WEEKLY_STEPS));
    println!("{}", HELP);

    let mut view = TelemetryView::new();
    redraw(&view)?;

    let (mut events, channel) = spawn_channel(config.endpoint.clone(), config.reconnect.clone());
    let mut commands = spawn_operator_input();
    let port = UnwiredCommandPort;

    let mut channel_open = true;
    let mut input_open = true;

    loop {
        tokio::select! {
            event = events.recv(), if channel_open => match event {
                Some(event) => {
                    if view.handle_event(event) {
                        redraw(&view)?;
                    }
                }
                None => {
                    channel_open = false;
                    warn!("Telemetry channel finished; view frozen at last known values");
                }
            },
            line = commands.recv(), if input_open => match line.as_deref().map(parse_command) {
                Some(OperatorCommand::Action(action)) => println!("{}", perform(&port, &action)),
                Some(OperatorCommand::Help) => println!("{}", HELP),
                Some(OperatorCommand::Quit) => break,
                Some(OperatorCommand::Ignore) => {}
                Some(OperatorCommand::Unknown(input)) => {
                    println!("Unknown command '{}'. {}", input, HELP)
                }
                None => {
                    input_open = false;
                    info!("Operator input closed");
                }
            },
            else => std::future::pending::<()>().await,
        }
    }

    channel.abort();
    info!(
        "Applied {} telemetry messages, dropped {}",
        view.state().messages_applied(),
        view.state().messages_dropped()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp_secs()
        .init();

    // Load configuration
    let config = match DashboardConfig::new() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle Ctrl+C gracefully
    let (tx, mut rx) = tokio::sync::oneshot::channel();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(());
            }
            Err(e) => {
                error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    });

    // Run main loop or wait for shutdown signal
    tokio::select! {
        result = main_loop(config) => {
            match result {
                Ok(_) => info!("Dashboard closed"),
                Err(e) => error!("Fatal error: {}", e),
            }
        }
        _ = &mut rx => {
            info!("Dashboard terminated by user. Exiting gracefully.");
        }
    }

    Ok(())
}
