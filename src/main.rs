use rustls::crypto::CryptoProvider;
use std::fmt::{Debug, Display};
use tokio::task::JoinError;

use blog_engagement::{
    configuration::get_configuration,
    remote::RestRemoteStore,
    startup::Application,
    telemetry::{get_subscriber, init_subscriber},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // reqwest and the rustls listener both need a process-wide provider
    let _ = CryptoProvider::install_default(rustls::crypto::aws_lc_rs::default_provider());

    // start logging (or console?)
    #[cfg(feature = "console")]
    let use_console = std::env::var("TOKIO_CONSOLE").is_ok();
    #[cfg(not(feature = "console"))]
    let use_console = false;

    if use_console {
        #[cfg(feature = "console")]
        console_subscriber::init();
    } else {
        let subscriber = get_subscriber("blog_engagement".into(), "info".into(), std::io::stdout);
        init_subscriber(subscriber);
    }

    let configuration = get_configuration()?;
    let remote = RestRemoteStore::new(&configuration.remote)?;
    let application = Application::build(configuration, remote)?;
    let application_task = tokio::spawn(application.run_until_stopped());

    tokio::select! {
        o = application_task => report_exit("API", o)
    }

    Ok(())
}

// return when the provided task exits
fn report_exit(task_name: &str, outcome: Result<Result<(), impl Debug + Display>, JoinError>) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{} has exited", task_name);
        }
        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} failed",
                task_name
            );
        }
        Err(e) => {
            tracing::error!(
                error.cause_chain = ?e,
                error.message = %e,
                "{} task failed to complete",
                task_name
            );
        }
    }
}
