//! Groups and nested samplers: an encounter table whose "boss" slot is its
//! own fair bag, and whose "pack" slot is a group of beasts.

use std::cell::RefCell;
use std::rc::Rc;

use weighted_bag::{BagSampler, UniformEnum, Value, WeightedSampler};

#[derive(Copy, Clone, Debug, PartialEq, UniformEnum)]
enum Beast {
    Wolf,
    Bear,
    Lion,
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Encounter {
    Nothing,
    Merchant,
    Pack(Beast),
    Boss(&'static str),
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // every boss shows up once before any repeats
    let bosses = Rc::new(RefCell::new(BagSampler::from_pairs(
        ["Hydra", "Lich", "Wyrm"].map(|b| (Encounter::Boss(b), 1.0)),
    )?));

    let mut encounters = WeightedSampler::<Encounter>::new();
    encounters.register(Encounter::Nothing, 50.0)?;
    encounters.register(Encounter::Merchant, 10.0)?;
    encounters.register_group(Beast::VARIANTS.iter().copied().map(Encounter::Pack), 30.0)?;
    let boss_slot: Value<Encounter> = Value::Nested(bosses.clone());
    encounters.register(boss_slot, 10.0)?;

    let mut rng = rand::rng();
    for (turn, value) in encounters.generate_multiple(20, &mut rng)?.enumerate() {
        match value?.get() {
            Some(e) => println!("turn {turn:>2}: {e:?}"),
            None => unreachable!("draws always resolve to a leaf"),
        }
    }

    println!("\ndistribution:");
    for (value, p) in encounters.table().normalized_distribution()? {
        println!("  {:<24} {:.3}", format!("{:?}", value), p);
    }
    println!("bosses left this cycle: {}", bosses.borrow().remaining_in_cycle());

    Ok(())
}
