use std::{
    cmp::Ordering,
    time::{SystemTime, UNIX_EPOCH},
};

use rand::prelude::random;
use rand::{rngs::SmallRng, seq::SliceRandom, SeedableRng};

use crate::config::{Config, Duplicates};
use crate::error::Error;
use crate::rbt::{Color, Rbt};
use crate::render::Side;

#[test]
fn test_id() {
    let rbt: Rbt<i64> = Rbt::new("test-rbt");
    assert_eq!(rbt.id(), "test-rbt".to_string());
}

#[test]
fn test_len() {
    let rbt: Rbt<i64> = Rbt::new("test-rbt");
    assert_eq!(rbt.len(), 0);
    assert!(rbt.is_empty());
    assert!(rbt.validate().is_ok());
    assert!(rbt.iter().next().is_none());
    assert!(rbt.walk().next().is_none());
    assert_eq!(rbt.render(), "".to_string());
}

#[test]
fn test_config() {
    let config: Config = Default::default();
    assert_eq!(config.duplicates(), Duplicates::Allow);
    assert_eq!(config.capacity(), 0);

    let config = config
        .set_capacity(1024)
        .set_duplicates(Duplicates::Overwrite);
    let rbt: Rbt<i64> = Rbt::with_config("test-rbt", config.clone());
    assert_eq!(rbt.config(), &config);
}

#[test]
fn test_insert() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    let mut refns = RefKeys::new(10);

    for key in [2, 1, 3, 6, 5, 4, 8, 0, 9, 7].iter() {
        let handle = rbt.insert(*key);
        assert_eq!(rbt.get(handle), Some(key));
        refns.insert(*key);
        assert!(rbt.validate().is_ok());
    }

    assert_eq!(rbt.len(), 10);
    let stats = rbt.validate().unwrap();
    assert_eq!(stats.entries(), 10);
    assert!(stats.blacks().unwrap() >= 2);

    // test search
    for key in 0..10 {
        let handle = rbt.search(&key).unwrap();
        assert_eq!(rbt.get(handle), Some(&key));
    }
    assert!(rbt.search(&10).is_none());
    assert!(rbt.search(&-1).is_none());

    // test iter
    let (mut iter, mut iter_ref) = (rbt.iter(), refns.iter());
    loop {
        match (iter.next(), iter_ref.next()) {
            (Some(key), Some(ref_key)) => assert_eq!(*key, ref_key),
            (None, None) => break,
            (_, _) => panic!("invalid"),
        }
    }
}

#[test]
fn test_create() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    for key in 0..100 {
        assert!(rbt.create(key).is_ok());
    }
    assert_eq!(rbt.create(42), Err(Error::DuplicateKey));
    assert_eq!(rbt.len(), 100);
    assert!(rbt.validate().is_ok());
}

#[test]
fn test_duplicates_allow() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    for key in [5, 3, 5, 8, 5, 3].iter() {
        rbt.insert(*key);
        assert!(rbt.validate().is_ok());
    }
    assert_eq!(rbt.len(), 6);
    assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), vec![3, 3, 5, 5, 5, 8]);

    for _ in 0..3 {
        assert_eq!(rbt.delete(&5), Some(5));
        assert!(rbt.validate().is_ok());
    }
    assert_eq!(rbt.delete(&5), None);
    assert!(rbt.search(&5).is_none());
    assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), vec![3, 3, 8]);
}

#[derive(Clone, Debug)]
struct Entry(i64, &'static str);

impl PartialEq for Entry {
    fn eq(&self, other: &Entry) -> bool {
        self.0 == other.0
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Entry) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Entry) -> Ordering {
        self.0.cmp(&other.0)
    }
}

#[test]
fn test_duplicates_overwrite() {
    let config = Config::default().set_duplicates(Duplicates::Overwrite);
    let mut rbt: Rbt<Entry> = Rbt::with_config("test-rbt", config);

    let first = rbt.insert(Entry(1, "one"));
    rbt.insert(Entry(2, "two"));
    let second = rbt.insert(Entry(1, "uno"));
    assert_eq!(first, second);
    assert_eq!(rbt.len(), 2);
    assert!(rbt.validate().is_ok());

    let handle = rbt.search(&Entry(1, "")).unwrap();
    assert_eq!(rbt.get(handle).unwrap().1, "uno");
}

#[test]
fn test_delete_scenario() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    for key in [10, 20, 30, 35, 25].iter() {
        rbt.insert(*key);
    }
    assert_eq!(rbt.delete(&30), Some(30));

    assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), vec![10, 20, 25, 35]);
    assert!(rbt.validate().is_ok());
    let root = rbt.walk().next().unwrap();
    assert_eq!(root.side, Side::Root);
    assert_eq!(root.color, Color::Black);

    let visits: Vec<(i64, Color, usize, Side)> = rbt
        .walk()
        .map(|v| (*v.key, v.color, v.depth, v.side))
        .collect();
    let refvs = vec![
        (20, Color::Black, 0, Side::Root),
        (10, Color::Black, 1, Side::Left),
        (35, Color::Black, 1, Side::Right),
        (25, Color::Red, 2, Side::Left),
    ];
    assert_eq!(visits, refvs);

    let text = "\\-- 20 (B)\n  |-- 10 (B)\n  \\-- 35 (B)\n    |-- 25 (R)\n";
    assert_eq!(rbt.render(), text.to_string());

    for key in [5, 3, 8, 1, 6, 9, 2, 7, 4].iter() {
        rbt.insert(*key);
        assert!(rbt.validate().is_ok());
    }
    assert_eq!(rbt.len(), 13);

    let mut refns: Vec<i64> = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 20, 25, 35];
    for key in [6, 2, 8].iter() {
        assert_eq!(rbt.delete(key), Some(*key));
        refns.retain(|k| k != key);
        assert!(rbt.validate().is_ok());
        assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), refns);
    }
    assert_eq!(rbt.len(), 10);
}

#[test]
fn test_delete_single_child() {
    // 10 is left with only a left child.
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    for key in [20, 10, 30, 5].iter() {
        rbt.insert(*key);
    }
    assert_eq!(rbt.delete(&10), Some(10));
    assert!(rbt.validate().is_ok());
    assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), vec![5, 20, 30]);

    // 30 is left with only a right child.
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    for key in [20, 10, 30, 35].iter() {
        rbt.insert(*key);
    }
    assert_eq!(rbt.delete(&30), Some(30));
    assert!(rbt.validate().is_ok());
    assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), vec![10, 20, 35]);

    // root with a single child.
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    rbt.insert(1);
    rbt.insert(0);
    assert_eq!(rbt.delete(&1), Some(1));
    assert!(rbt.validate().is_ok());
    assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), vec![0]);
    assert_eq!(rbt.delete(&0), Some(0));
    assert!(rbt.is_empty());
}

#[test]
fn test_delete_missing() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    assert!(rbt.delete(&10).is_none());

    for key in 0..10 {
        rbt.insert(key);
    }
    assert!(rbt.delete(&10).is_none());
    assert!(rbt.delete(&10).is_none());
    assert_eq!(rbt.len(), 10);
    assert!(rbt.validate().is_ok());
    assert_eq!(rbt.iter().cloned().collect::<Vec<i64>>(), (0..10).collect::<Vec<i64>>());
}

#[test]
fn test_handles() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    let h1 = rbt.insert(1);
    assert_eq!(rbt.color(h1), Some(Color::Black));
    let h2 = rbt.insert(2);
    assert_eq!(rbt.color(h2), Some(Color::Red));
    let h3 = rbt.insert(3);
    assert_eq!(rbt.search(&2), Some(h2));

    // 2 has two children, its successor's slot is released.
    assert_eq!(rbt.delete(&2), Some(2));
    assert_eq!(rbt.get(h2), Some(&3));
    assert_eq!(rbt.get(h3), None);
    assert_eq!(rbt.color(h3), None);

    // released slot is reused.
    assert_eq!(rbt.insert(4), h3);
    assert_eq!(rbt.get(h3), Some(&4));
    assert!(rbt.validate().is_ok());
}

#[test]
fn test_round_trip() {
    let seed = make_seed();
    println!("test_round_trip seed {}", seed);
    let mut rng = SmallRng::from_seed(seed.to_le_bytes());

    for n in [0, 1, 2, 3, 10, 100, 1000].iter() {
        let mut keys: Vec<i64> = (0..*n).collect();
        keys.shuffle(&mut rng);
        let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
        for key in keys.iter() {
            rbt.insert(*key);
        }
        assert!(rbt.validate().is_ok());

        keys.shuffle(&mut rng);
        for key in keys.iter() {
            assert_eq!(rbt.delete(key), Some(*key));
            assert!(rbt.validate().is_ok());
        }
        assert!(rbt.is_empty());
        assert!(rbt.iter().next().is_none());
        assert!(rbt.walk().next().is_none());
    }
}

#[test]
fn test_height() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    for key in 0..10_000 {
        rbt.insert(key);
        if key % 1000 == 999 {
            let stats = rbt.validate().unwrap();
            let n = rbt.len() as f64;
            let height = stats.depths().unwrap().height() as f64;
            assert!(height <= 2.0 * (n + 1.0).log2(), "{} {}", height, n);
        }
    }
    for key in (0..10_000).step_by(2) {
        rbt.delete(&key);
    }
    let stats = rbt.validate().unwrap();
    let n = rbt.len() as f64;
    let height = stats.depths().unwrap().height() as f64;
    assert!(height <= 2.0 * (n + 1.0).log2(), "{} {}", height, n);
}

#[test]
fn test_depth() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    assert!(rbt.validate().unwrap().depths().is_none());
    assert!(rbt.stats().depths().is_none());

    for key in [2, 1, 3].iter() {
        rbt.insert(*key);
    }
    let depths = rbt.validate().unwrap().depths().unwrap();
    assert_eq!(depths.samples(), 4);
    assert_eq!(depths.min(), 2);
    assert_eq!(depths.max(), 2);
    assert_eq!(depths.height(), 2);
    assert_eq!(depths.mean(), 2);
    assert_eq!(depths.percentiles(), vec![(100, 2)]);

    rbt.insert(4);
    let depths = rbt.validate().unwrap().depths().unwrap();
    assert_eq!(depths.samples(), 5);
    assert_eq!(depths.min(), 2);
    assert_eq!(depths.height(), 3);
}

#[test]
fn test_random() {
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    let mut rng = SmallRng::from_seed(make_seed().to_le_bytes());

    assert_eq!(rbt.random(&mut rng), None);

    rbt.insert(0);
    assert_eq!(rbt.random(&mut rng), Some(&0));
    assert_eq!(rbt.random(&mut rng), Some(&0));

    for key in 1..100_000 {
        rbt.insert(key);
    }
    for _i in 0..200_000 {
        let key = *rbt.random(&mut rng).unwrap();
        assert!(key >= 0 && key < 100_000);
    }
}

#[test]
fn test_crud() {
    let size = 1000;
    let mut rbt: Rbt<i64> = Rbt::new("test-rbt");
    let mut refns = RefKeys::new(size);

    for _ in 0..20_000 {
        let key: i64 = (random::<i64>() % (size as i64)).abs();
        let op: i64 = (random::<i64>() % 4).abs();
        match op {
            0 => {
                let ok1 = rbt.search(&key).is_none();
                let ok2 = rbt.create(key).is_ok();
                if ok2 {
                    refns.insert(key);
                }
                assert_eq!(ok1, ok2);
            }
            1 => {
                rbt.insert(key);
                refns.insert(key);
            }
            2 => {
                let val = rbt.delete(&key);
                let refval = refns.delete(key);
                assert_eq!(val, refval);
            }
            3 => {
                let handle = rbt.search(&key);
                assert_eq!(handle.is_some(), refns.contains(key));
                if let Some(handle) = handle {
                    assert_eq!(rbt.get(handle), Some(&key));
                }
            }
            op => panic!("unreachable {}", op),
        };

        assert!(rbt.validate().is_ok());
        assert_eq!(rbt.len(), refns.len());
    }

    println!("index-length {}", rbt.len());

    // test iter
    let (mut iter, mut iter_ref) = (rbt.iter(), refns.iter());
    loop {
        match (iter.next(), iter_ref.next()) {
            (Some(key), Some(ref_key)) => assert_eq!(*key, ref_key),
            (None, None) => break,
            (key, ref_key) => panic!("invalid {:?} {:?}", key, ref_key),
        }
    }
}

#[test]
fn test_error_display() {
    let err: Error<i64> = Error::DuplicateKey;
    assert_eq!(err.to_string(), "key already present".to_string());
    let err: Error<i64> = Error::SortError(1, 2);
    assert_eq!(err.to_string(), "key 1 out of order against 2".to_string());
}

fn make_seed() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

include!("./ref_test.rs");
