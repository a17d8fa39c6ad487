use commands::parse;
use config::Config;
use contactsd_telepathy::{MemoryAccount, Plugin, TelepathyPlugin};
use daemon::Daemon;
use env_logger::Env;
use log::{error, info};
use report::ChangeReport;
use std::rc::Rc;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdout},
    sync::mpsc,
    task::LocalSet,
};

mod commands;
mod config;
mod daemon;
mod errors;
mod report;

/// Scheduler turns given to listeners and flushes after stdin closes.
const SETTLE_TURNS: usize = 4;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let config = Config::from_env();
    env_logger::Builder::from_env(Env::default().default_filter_or(config.log_filter.as_str()))
        .init();

    LocalSet::new().run_until(run(config)).await;
}

async fn run(config: Config) {
    let mut plugin = TelepathyPlugin::new();
    if let Err(error) = plugin.init() {
        error!("{error}");
        return;
    }

    let metadata = plugin.metadata();
    info!("Loaded plugin {} {}", metadata.name, metadata.version);

    let account_source = Rc::new(MemoryAccount::new(&config.account_path));
    let account = match plugin.add_account(account_source.clone()) {
        Ok(account) => account,
        Err(error) => {
            error!("{error}");
            return;
        }
    };

    account.connect_account_changed(|account, changes| {
        info!("Account {} changed: {:?}", account.path(), changes.names());
    });

    let (report_tx, mut report_rx) = mpsc::unbounded_channel::<ChangeReport>();
    let mut daemon = Daemon::new(account, account_source, report_tx);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    info!("Reading commands from stdin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(error) => {
                        error!("Could not read from stdin: {error}");
                        break;
                    }
                };

                if line.trim().is_empty() {
                    continue;
                }

                match parse(&line).and_then(|command| daemon.execute(command)) {
                    Ok(replies) => {
                        for reply in replies {
                            write_line(&mut stdout, &reply).await;
                        }
                    }
                    Err(error) => error!("{line}: {error}"),
                }
            }

            report = report_rx.recv() => {
                let Some(report) = report else {
                    break;
                };

                write_report(&mut stdout, &report).await;
            }
        }
    }

    // Let flushes queued by the last commands run before exiting
    for _ in 0..SETTLE_TURNS {
        tokio::task::yield_now().await;
    }

    while let Ok(report) = report_rx.try_recv() {
        write_report(&mut stdout, &report).await;
    }
}

async fn write_report(stdout: &mut Stdout, report: &ChangeReport) {
    match serde_json::to_string(report) {
        Ok(json) => write_line(stdout, &json).await,
        Err(error) => error!("Could not serialize report for {}: {error}", report.contact),
    }
}

async fn write_line(stdout: &mut Stdout, line: &str) {
    if let Err(error) = stdout.write_all(format!("{line}\n").as_bytes()).await {
        error!("Could not write to stdout: {error}");
        return;
    }

    if let Err(error) = stdout.flush().await {
        error!("Could not flush stdout: {error}");
    }
}
