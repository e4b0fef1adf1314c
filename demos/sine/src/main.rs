use std::f64::consts::PI;

use clap::Parser;
use rust_backprop::{matrix::Matrix2, Network, Trainer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sine")]
#[command(about = "Approximate sin(x) on [-pi, pi) with a tanh network")]
struct Args {
    #[arg(long, default_value_t = 10_000)]
    epochs: usize,

    #[arg(long, default_value_t = 0.01)]
    rate: f64,

    #[arg(long, default_value_t = 6)]
    hidden: usize,

    /// Evenly spaced training points
    #[arg(long, default_value_t = 50)]
    samples: usize,

    #[arg(long, default_value_t = 500)]
    log_every: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.samples > 0, "need at least one sample");

    let xs: Vec<f64> = (0..args.samples)
        .map(|i| -PI + i as f64 * (2.0 * PI / args.samples as f64))
        .collect();
    let inputs = Matrix2::from_vec(xs.iter().map(|&x| vec![x]).collect())?;
    let targets = Matrix2::from_vec(xs.iter().map(|&x| vec![x.sin()]).collect())?;

    tracing::info!(
        hidden = args.hidden,
        rate = args.rate,
        samples = args.samples,
        "training sine network"
    );
    let mut net = Network::new(&[1, args.hidden, 1], args.rate)?;
    let report = Trainer::new(args.epochs)
        .with_log(Some(args.log_every))
        .train(&mut net, &inputs, &targets)?;

    println!("------------------");
    if let Some(error) = report.final_error() {
        tracing::info!("final error: {error}");
    }

    println!("Sine Function Approximation Results:");
    for (input, target) in inputs.iter_rows().zip(targets.iter_rows()).step_by(5) {
        let output = net.predict(input)?;
        println!(
            "Input: {:.4}, Predicted: {:.4}, Target: {:.4}",
            input[0], output[0], target[0]
        );
    }
    Ok(())
}
