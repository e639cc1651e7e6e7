use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::catalog::model::{Layer, VariantSource};

fn catalog(layers: &[(&str, &[&str])]) -> Catalog {
    Catalog::from_layers(
        layers
            .iter()
            .map(|(name, variants)| {
                Layer::new(
                    *name,
                    variants
                        .iter()
                        .map(|v| VariantSource::from_bytes(*v, Vec::<u8>::new()))
                        .collect(),
                )
            })
            .collect(),
    )
    .unwrap()
}

fn two_by_two() -> Catalog {
    catalog(&[
        ("Background", &["red.png", "blue.png"]),
        ("Eyes", &["open.png", "closed.png"]),
    ])
}

#[test]
fn full_space_is_covered_exactly_once() {
    let cat = two_by_two();
    let mut sampler = CombinationSampler::new(&cat, 4, 10_000, StdRng::seed_from_u64(1)).unwrap();
    let mut keys = HashSet::new();
    for _ in 0..4 {
        let combo = sampler.next_unique().unwrap();
        assert_eq!(combo.picks().len(), 2);
        assert!(keys.insert(combo.key(&cat)));
    }
    assert_eq!(keys.len(), 4);
    assert_eq!(sampler.accepted(), 4);
    assert!(sampler.next_unique().unwrap_err().is_capacity());
}

#[test]
fn requesting_more_than_space_fails_up_front() {
    let cat = two_by_two();
    let err = CombinationSampler::new(&cat, 5, 10_000, StdRng::seed_from_u64(1))
        .err()
        .unwrap();
    assert!(err.is_capacity());
    assert!(err.to_string().contains("only has 4 distinct combinations (2 x 2)"));
}

#[test]
fn invalid_catalog_is_validation_error() {
    let empty = Catalog::default();
    let err = CombinationSampler::new(&empty, 1, 10, StdRng::seed_from_u64(1))
        .err()
        .unwrap();
    assert!(err.is_validation());

    let hollow = catalog(&[("A", &["a.png"]), ("B", &[])]);
    let err = CombinationSampler::new(&hollow, 1, 10, StdRng::seed_from_u64(1))
        .err()
        .unwrap();
    assert!(err.is_validation());
}

#[test]
fn tiny_attempt_budget_falls_back_to_enumeration() {
    let cat = catalog(&[("A", &["1", "2", "3"]), ("B", &["1", "2", "3"]), ("C", &["1", "2"])]);
    let mut sampler = CombinationSampler::new(&cat, 18, 1, StdRng::seed_from_u64(7)).unwrap();
    let mut all = HashSet::new();
    for _ in 0..18 {
        all.insert(sampler.next_unique().unwrap());
    }
    assert_eq!(all.len(), 18);
}

#[test]
fn same_seed_same_sequence() {
    let cat = catalog(&[("A", &["1", "2", "3", "4"]), ("B", &["1", "2", "3", "4"])]);
    let run = |seed| {
        let mut s = CombinationSampler::new(&cat, 10, 10_000, StdRng::seed_from_u64(seed)).unwrap();
        (0..10)
            .map(|_| s.next_unique().unwrap())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(99), run(99));
}

#[test]
fn key_joins_variant_names_in_layer_order() {
    let cat = two_by_two();
    let combo = Combination::new(vec![1, 0]);
    assert_eq!(combo.key(&cat), "blue.png|open.png");

    let stack = combo.stack(&cat);
    assert_eq!(stack.len(), 2);
    assert_eq!(stack[0].layer, 0);
    assert_eq!(stack[0].source.name, "blue.png");
    assert_eq!(stack[1].variant, 0);
    assert_eq!(stack[1].source.name, "open.png");
}

#[test]
fn odometer_last_layer_varies_fastest_and_wraps() {
    let radices = [2, 3];
    let mut cursor = vec![0, 0];
    let mut visited = vec![cursor.clone()];
    for _ in 0..6 {
        advance_odometer(&mut cursor, &radices);
        visited.push(cursor.clone());
    }
    assert_eq!(
        visited,
        vec![
            vec![0, 0],
            vec![0, 1],
            vec![0, 2],
            vec![1, 0],
            vec![1, 1],
            vec![1, 2],
            vec![0, 0],
        ]
    );
}

#[test]
fn full_space_above_enumeration_limit_yields_every_combination_once() {
    let layer = |name: &str, n: usize| {
        Layer::new(
            name,
            (0..n)
                .map(|i| VariantSource::from_bytes(format!("{i}.png"), Vec::<u8>::new()))
                .collect(),
        )
    };
    let cat = Catalog::from_layers(vec![layer("A", 1025), layer("B", 1024)]).unwrap();
    let space = cat.combination_space();
    assert!(space > ENUMERATION_LIMIT);

    // One draw per slot forces most slots through the odometer walk.
    let mut sampler =
        CombinationSampler::new(&cat, space as u32, 1, StdRng::seed_from_u64(5)).unwrap();
    let mut hit = vec![false; space as usize];
    for _ in 0..space {
        let picks = sampler.next_unique().unwrap().picks().to_vec();
        let idx = picks[0] * 1024 + picks[1];
        assert!(!hit[idx], "combination {picks:?} handed out twice");
        hit[idx] = true;
    }
    assert!(hit.iter().all(|h| *h));
    assert!(sampler.next_unique().unwrap_err().is_capacity());
}

#[test]
fn single_variant_single_layer() {
    let cat = catalog(&[("Only", &["one.png"])]);
    let mut s = CombinationSampler::new(&cat, 1, 10, StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(s.space(), 1);
    assert_eq!(s.next_unique().unwrap().picks(), &[0]);
    assert_eq!(s.last_attempts(), 1);
}
