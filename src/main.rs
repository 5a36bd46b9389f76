use clap::Parser;
use cruise_dateparse::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    // Dataset and cruise level failures are logged and counted; only
    // startup and fatal configuration errors reach this point
    if let Err(error) = commands::run(args) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("cruise-dateparse - acquisition dates from raw cruise filenames");
    println!("==============================================================");
    println!();
    println!("USAGE:");
    println!("    cruise-dateparse <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    dataset     Process one instrument directory");
    println!("    cruise      Process every instrument of one or more cruises");
    println!("    fleet       Process every cruise of a vessel");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OUTPUT FLAGS (all three when none given):");
    println!("    -u, --print-sql    Print SQL to standard output");
    println!("    -m, --range-sql    Write the date range SQL file");
    println!("    -l, --file-sql     Write the per-file SQL file");
    println!("        --csv          Append date ranges to the run CSV log");
    println!();
    println!("EXAMPLES:");
    println!("    cruise-dateparse dataset RR1905 multibeam /data/RR1905/data/multibeam/rawdata -u");
    println!("    cruise-dateparse cruise RR1905 SR1901 --csv");
    println!("    cruise-dateparse cruise --list cruises.txt -m");
    println!("    cruise-dateparse fleet SKQ --serial --multibeam --log-dir /var/tmp/dates");
    println!();
    println!("For detailed help on any command, use:");
    println!("    cruise-dateparse <COMMAND> --help");
}
