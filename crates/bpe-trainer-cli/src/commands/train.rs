use std::path::PathBuf;

use bpe_trainer::Trainer;

use crate::logging::LogArgs;

/// Args for the train command.
#[derive(clap::Args, Debug)]
pub struct TrainArgs {
    /// Corpus file to train on.
    #[arg(short, long)]
    input: PathBuf,

    /// Target vocabulary size.
    #[arg(short = 'N', long = "vocab-size")]
    vocab_size: usize,

    /// Special token strings, treated atomically and never split.
    #[arg(short, long = "special-tokens", num_args = 0..)]
    special_tokens: Vec<String>,

    /// Directory to write the trained tokenizer state into.
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Basename for the written state file; defaults to the input file stem.
    #[arg(short, long)]
    prefix: Option<String>,

    #[clap(flatten)]
    pub logging: LogArgs,
}

impl TrainArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.setup_logging(3)?;

        let prefix = self.resolve_prefix()?;

        log::info!("training on {}", self.input.display());
        let mut trainer = Trainer::new();
        trainer.train_from_file(&self.input, self.vocab_size, &self.special_tokens)?;

        log::info!(
            "trained {} merges, {} vocab entries",
            trainer.merges().len(),
            trainer.vocab().len()
        );

        let path = bpe_trainer::state::save_state(
            trainer.merges(),
            trainer.vocab(),
            &prefix,
            &self.output_dir,
        )?;
        log::info!("wrote {}", path.display());

        Ok(())
    }

    fn resolve_prefix(&self) -> Result<String, Box<dyn std::error::Error>> {
        if let Some(prefix) = &self.prefix {
            return Ok(prefix.clone());
        }
        self.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .ok_or_else(|| "input path has no file stem to derive a prefix from".into())
    }
}
