use xor_nn::{train_until_solved, xor_architecture, Dataset, Network, TrainConfig};

fn format_input(input: &[f64]) -> String {
    let values: Vec<String> = input.iter().map(|x| format!("{x}")).collect();
    format!("[{}]", values.join(", "))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Preparing data...");
    let dataset = Dataset::xor();

    println!("Defining model structure...");
    let config = TrainConfig::default();
    let layers = xor_architecture();
    println!("{}", Network::from_specs(&layers, config.seed)?.summary());

    println!("\nCompiling model...");
    println!(
        "optimizer: {:?}, learning rate: {}, loss: binary cross-entropy, metrics: accuracy",
        config.optimizer, config.learning_rate
    );

    println!("Starting training...");
    let run = train_until_solved(&dataset, &layers, &config)?;
    for stalled in &run.stalled {
        println!(
            "Seed {} stalled at {:.2}% accuracy (loss {:.4})",
            stalled.seed,
            stalled.accuracy * 100.0,
            stalled.loss
        );
    }
    println!("Training complete!");

    println!("\nEvaluating model...");
    let evaluation = &run.evaluation;
    println!("Final accuracy: {:.2}%", evaluation.accuracy * 100.0);

    println!("\nPredictions for the four inputs:");
    for sample in &evaluation.predictions {
        println!(
            "Input: {}, True: {}, Probability: {:.4}, Predicted: {}",
            format_input(&sample.input),
            sample.target as u8,
            sample.probability,
            sample.label
        );
    }

    Ok(())
}
