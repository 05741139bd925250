mod commands;
mod logging;

use clap::Parser;
use commands::train::TrainArgs;

/// Train a BPE tokenizer vocabulary from a text corpus.
#[derive(clap::Parser, Debug)]
#[command(name = "bpe-trainer", version, about)]
pub struct Args {
    #[clap(flatten)]
    pub train: TrainArgs,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = args.train.run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
