use brick_cli::commands::{
    exec_id_command, exec_sign_command, exec_verify_command, print_random_keypair, run_demo,
};
use brick_cli::config::{CliCommand, Config, DemoCommand};
use brick_cli::formatting::format_report;
use clap::Parser;
use log::*;

fn main() {
    env_logger::init();
    let config: Config = Config::parse();
    let (global_options, command) = config.to_parts();

    let result = match command {
        CliCommand::Id(id_command) => exec_id_command(id_command, global_options),
        CliCommand::Sign(message) => exec_sign_command(message, global_options),
        CliCommand::Verify(verify) => exec_verify_command(verify),
        CliCommand::Keygen => print_random_keypair(),
        CliCommand::Demo(demo) => exec_demo(demo),
    };

    match result {
        Ok(()) => {
            println!("Bye :)")
        }
        Err(err) => {
            eprintln!("** Error ** \n {err}");
            std::process::exit(1);
        }
    }
}

fn exec_demo(cmd: DemoCommand) -> Result<(), anyhow::Error> {
    info!("Running a {:?} close with {} watchtowers", cmd.mode, cmd.watchtowers);
    let report = run_demo(&cmd)?;
    for event in &report.events {
        debug!("{event}");
    }
    println!("{}", format_report(&report));
    Ok(())
}
