use crate::demo::{run_demo, DemoArgs};
use crate::server;
use aid_intake::error::AppError;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Assistance Application Intake",
    about = "Serve or demonstrate the three-step assistance application wizard",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Walk a sample applicant through all three steps and submit
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["aid-intake-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn demo_accepts_a_pinned_date() {
        let cli = Cli::try_parse_from(["aid-intake-api", "demo", "--today", "2025-06-01"])
            .expect("parses");
        match cli.command {
            Some(Command::Demo(args)) => assert_eq!(
                args.today,
                chrono::NaiveDate::from_ymd_opt(2025, 6, 1)
            ),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
