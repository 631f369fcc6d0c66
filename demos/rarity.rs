use std::collections::HashMap;
use weighted_bag::WeightedEnum;

#[derive(Copy, Eq, PartialEq, Clone, Debug, Hash, WeightedEnum)]
enum Rarity {
    #[weight(1/1000)]
    Mythic,
    #[weight(1/100)]
    Legendary,
    #[weight(20/100)]
    Uncommon,
    #[weight(50/100)]
    Common,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Build straight from the enum:
    let mut sampler = Rarity::sampler()?; // uses the macro-provided ENTRIES
    let mut hist: HashMap<Rarity, u64> = HashMap::default();

    let mut rng = rand::rng();
    for value in sampler.generate_multiple(2_000_000, &mut rng)? {
        let rarity = *value?.get().ok_or("enum tables only hold scalars")?;
        hist.entry(rarity)
            .and_modify(|acc| {
                *acc += 1;
            })
            .or_insert(1);
    }

    let mut values: Vec<(Rarity, u64)> = hist.into_iter().collect();
    values.sort_by(|(_, ca), (_, cb)| cb.cmp(ca));

    for (rarity, count) in values {
        let p = sampler.probability_of(&rarity.into())?;
        println!("{count: >7} {rarity:?} (expected {:.4})", p);
    }
    println!("entropy: {:.3} bits", sampler.table().entropy()?);

    Ok(())
}
