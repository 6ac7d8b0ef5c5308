#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "packdoc", about = "Pack binary value format tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Info {
		path: PathBuf,
		#[arg(long)]
		json: bool,
	},
	Print {
		path: PathBuf,
	},
	Encode {
		input: PathBuf,
		output: PathBuf,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> packdoc::pack::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Info { path, json } => cmd::info::run(path, json),
		Commands::Print { path } => cmd::print::run(path),
		Commands::Encode { input, output } => cmd::encode::run(input, output),
	}
}
