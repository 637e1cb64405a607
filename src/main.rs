use clap::Parser;
use std::panic::{self, PanicHookInfo};
use wave_listener::app::{self, IntervalPacer, Options, RunError};
use wave_listener::gatt::BluerConnector;
use wave_listener::publish::RumqttcBroker;

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_PANIC: i32 = 2;

/// Wire the real connector, broker and pacer into the run loop.
async fn run(options: Options) -> Result<(), RunError> {
    let connector = BluerConnector::new().await?;
    let broker = RumqttcBroker;
    let mut pacer = IntervalPacer::new(options.wait);

    let mut out = std::io::stdout();
    let mut err = std::io::stderr();
    app::run_with_io(
        options,
        &connector,
        Some(&broker),
        &mut pacer,
        &mut out,
        &mut err,
    )
    .await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook to ensure clean exit codes for process managers
    // (e.g., systemd) that monitor exit status
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_PANIC);
    }));

    let options = Options::parse();

    match run(options).await {
        Ok(_) => std::process::exit(EXIT_SUCCESS),
        Err(why) => {
            eprintln!("error: {}", why);
            std::process::exit(EXIT_ERROR);
        }
    }
}
