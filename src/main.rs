use clap::Parser;
use healthsim::cli::{
    handle_completions, handle_config_init, remote, serve, Cli, Commands, ConfigCommands,
};

/// Print a command's output, passing its error through.
fn print_output(
    result: Result<String, Box<dyn std::error::Error>>,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = result?;
    println!("{}", output);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve(args) => serve::run_serve(args).await,
        Commands::Status(args) => print_output(remote::handle_status(&args).await),
        Commands::Probe(args) => print_output(remote::handle_probe(&args).await),
        Commands::SetHealth(args) => print_output(remote::handle_set_health(&args).await),
        Commands::SetReadiness(args) => print_output(remote::handle_set_readiness(&args).await),
        Commands::Config(config_cmd) => match config_cmd {
            ConfigCommands::Init(args) => handle_config_init(&args),
        },
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
