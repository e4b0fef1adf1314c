use std::path::PathBuf;

use clap::Parser;
use rust_backprop::{
    data::{normalize_matrix, one_hot, CsvLoader, MinMax},
    Network, Trainer,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "iris")]
#[command(about = "Classify the Iris dataset with a tanh network")]
struct Args {
    /// CSV with numeric features and the species name in the last column
    path: PathBuf,

    /// Skip the first line of the file
    #[arg(long)]
    headers: bool,

    #[arg(long, default_value_t = 2_000)]
    epochs: usize,

    #[arg(long, default_value_t = 0.01)]
    rate: f64,

    #[arg(long, default_value_t = 8)]
    hidden: usize,

    #[arg(long, default_value_t = 100)]
    log_every: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();

    let data = CsvLoader::new()
        .has_headers(args.headers)
        .load_labelled(&args.path)?;
    tracing::info!(
        rows = data.features.rows(),
        features = data.features.cols(),
        classes = data.classes.len(),
        "loaded {}",
        args.path.display()
    );

    let inputs = normalize_matrix(&data.features);
    let targets = one_hot(&data.labels, data.classes.len())?;

    let mut net = Network::new(
        &[inputs.cols(), args.hidden, data.classes.len()],
        args.rate,
    )?;
    let report = Trainer::new(args.epochs)
        .with_log(Some(args.log_every))
        .train(&mut net, &inputs, &targets)?;

    println!("------------------");
    println!("Final error: {}", report.final_error().unwrap_or(f64::NAN));

    let scaler = MinMax::fit(&data.features)?;
    let mut correct = 0;
    for (row, &label) in data.features.iter_rows().zip(&data.labels) {
        let input = scaler.transform_row(row)?;
        let predicted = net.predict_class(&input)?;
        if predicted == label {
            correct += 1;
        } else {
            println!(
                "{row:?}: predicted {}, actual {}",
                data.classes[predicted], data.classes[label]
            );
        }
    }

    println!(
        "Accuracy = {}",
        correct as f64 / data.labels.len() as f64
    );
    Ok(())
}
