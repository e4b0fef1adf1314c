use clap::Parser;
use rust_backprop::{matrix::Matrix2, Network, Trainer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "xor")]
#[command(about = "Train a tanh network on XOR")]
struct Args {
    #[arg(long, default_value_t = 6_000)]
    epochs: usize,

    #[arg(long, default_value_t = 0.01)]
    rate: f64,

    #[arg(long, default_value_t = 4)]
    hidden: usize,

    #[arg(long, default_value_t = 500)]
    log_every: usize,

    /// Plot the error curve while training
    #[cfg(feature = "gui")]
    #[arg(long)]
    gui: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let args = Args::parse();

    tracing::info!(
        hidden = args.hidden,
        rate = args.rate,
        epochs = args.epochs,
        "training xor network"
    );

    let mut net = Network::new(&[2, args.hidden, 1], args.rate)?;

    let inputs: Matrix2<f64> = Matrix2::from_array([[0, 0], [0, 1], [1, 0], [1, 1]]).into();
    let targets: Matrix2<f64> = Matrix2::from_array([[0], [1], [1], [0]]).into();

    let trainer = Trainer::new(args.epochs).with_log(Some(args.log_every));

    #[cfg(feature = "gui")]
    let report = if args.gui {
        trainer.train_gui::<rust_backprop::viz::ErrorPlot>(&mut net, &inputs, &targets)?
    } else {
        trainer.train(&mut net, &inputs, &targets)?
    };
    #[cfg(not(feature = "gui"))]
    let report = trainer.train(&mut net, &inputs, &targets)?;

    println!("------------------");
    if let Some(error) = report.final_error() {
        tracing::info!("final error: {error}");
    }

    println!("XOR Test Results:");
    for (input, target) in inputs.iter_rows().zip(targets.iter_rows()) {
        let output = net.predict(input)?;
        println!(
            "Input: {input:?}, Predicted: {:.4}, Target: {}",
            output[0], target[0]
        );
    }
    Ok(())
}
