//! A card-draw style bag next to plain weighted draws, with self-tuning
//! weights driven by selection counts. Run with `RUST_LOG=debug` to see refills.

use weighted_bag::{BagSampler, SamplerConfig, WeightTable, WeightedSampler};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let hand = [("attack", 4.0), ("defend", 3.0), ("heal", 2.0), ("special", 1.0)];
    let mut rng = rand::rng();

    let mut deck = BagSampler::from_pairs(hand)?;
    let mut dice = WeightedSampler::from_pairs(hand)?;
    println!("deck cycle: {} cards", deck.cycle_len());

    for round in 0..2 {
        let from_deck: Vec<_> = deck
            .generate_multiple(10, &mut rng)?
            .map(|v| v.map(|v| v.get().copied().unwrap_or("?")))
            .collect::<Result<_, _>>()?;
        let from_dice: Vec<_> = dice
            .generate_multiple(10, &mut rng)?
            .map(|v| v.map(|v| v.get().copied().unwrap_or("?")))
            .collect::<Result<_, _>>()?;
        println!("round {round} deck: {from_deck:?}");
        println!("round {round} dice: {from_dice:?}");
    }

    // favour whatever has been neglected
    let mut tuned = WeightedSampler::from_table(
        WeightTable::from_pairs(hand)?,
        SamplerConfig::default().with_selection_tracking(true),
    );
    for value in tuned.generate_multiple(1_000, &mut rng)? {
        value?;
    }
    tuned.table_mut().auto_adjust_weights(0.5)?;
    for entry in tuned.table().entries() {
        println!("{:?}: {:.3}", entry.value().get(), entry.weight());
    }

    Ok(())
}
