use std::{env, path::PathBuf, process};

use anyhow::{Context, Result, bail};
use log::{info, warn};

use rating_recommender::{
    Dataset, DatasetLoader, Recommender, TrainingConfig,
    data::{FileSource, HttpSource},
    training::LogProgress,
};

const USAGE: &str = "usage: recommender <user_id> <item_id> [--config PATH] [--data-dir DIR]";

/// The command line of the binary.
struct Args {
    user_id: usize,
    item_id: usize,
    config: Option<PathBuf>,
    data_dir: Option<PathBuf>,
}

impl Args {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Result<Self> {
        let mut positional = Vec::with_capacity(2);
        let mut config: Option<PathBuf> = None;
        let mut data_dir: Option<PathBuf> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => config = Some(args.next().context("--config needs a path")?.into()),
                "--data-dir" => {
                    data_dir = Some(args.next().context("--data-dir needs a path")?.into())
                }
                flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
                _ => positional.push(arg),
            }
        }

        let [user_id, item_id] = positional.as_slice() else {
            bail!("expected a user id and an item id");
        };

        Ok(Self {
            user_id: user_id.parse().context("user_id must be a number")?,
            item_id: item_id.parse().context("item_id must be a number")?,
            config,
            data_dir,
        })
    }
}

fn load(data_dir: Option<PathBuf>) -> Dataset {
    match data_dir {
        Some(dir) => DatasetLoader::new(FileSource::in_dir(dir)).load(),
        None => match HttpSource::movielens() {
            Ok(source) => DatasetLoader::new(source).load(),
            Err(e) => {
                warn!("can't build the http client, using fallback data: {e}");
                Dataset::fallback()
            }
        },
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let args = match Args::parse(env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e:#}\n{USAGE}");
            process::exit(2);
        }
    };

    let config = match &args.config {
        Some(path) => TrainingConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => TrainingConfig::default(),
    };

    let dataset = load(args.data_dir);
    let recommender = Recommender::new(dataset, config)?;
    let trained = recommender.train(&mut LogProgress)?;

    info!(
        "trained {} epochs, final loss {:?}",
        trained.report.epochs(),
        trained.report.final_loss()
    );

    let rating = recommender.predict(args.user_id, args.item_id)?;
    let title = recommender
        .dataset()
        .title(args.item_id)
        .unwrap_or("unknown title");

    println!(
        "user {} would rate {} \"{title}\" {rating:.2} / 5",
        args.user_id, args.item_id
    );

    Ok(())
}
