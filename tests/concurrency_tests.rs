use ringshard::RingShardMap;
use std::sync::Arc;
use std::thread;

fn key32(thread_id: u32, i: u32) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..4].copy_from_slice(&thread_id.to_le_bytes());
    key[4..8].copy_from_slice(&i.to_le_bytes());
    key
}

#[test]
fn test_concurrent_inserts() {
    // Deep enough that nothing is evicted.
    let map = Arc::new(RingShardMap::new(16, 1000, 32).unwrap());
    let mut handles = vec![];

    // Spawn 10 threads, each inserting 100 items
    for thread_id in 0..10 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                map.get_and_swap(&key32(thread_id, i), Some(i)).unwrap();
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(map.len(), 1000);
}

#[test]
fn test_concurrent_reads() {
    let map = Arc::new(RingShardMap::new(16, 1000, 32).unwrap());

    for i in 0..100 {
        map.get_and_swap(&key32(0, i), Some(i)).unwrap();
    }

    let mut handles = vec![];

    // Spawn 20 threads, each reading all items
    for _ in 0..20 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                let value = map.get(&key32(0, i)).unwrap().unwrap();
                assert_eq!(*value, i);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_disjoint_shards() {
    let shard_count = 8;
    let map = Arc::new(RingShardMap::new(shard_count, 10_000, 32).unwrap());

    // Bucket candidate keys by shard so every thread owns one shard.
    let mut per_shard: Vec<Vec<[u8; 32]>> = vec![Vec::new(); shard_count];
    let mut i = 0;
    while per_shard.iter().any(|keys| keys.len() < 500) {
        let key = key32(u32::MAX, i);
        let keys = &mut per_shard[map.shard_index(&key).unwrap()];
        if keys.len() < 500 {
            keys.push(key);
        }
        i += 1;
    }

    let mut handles = vec![];
    for keys in per_shard.clone() {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            for round in 0..10u32 {
                for key in &keys {
                    map.get_and_swap_if(key, round, |current| {
                        current.map(|c| *c + 1) == Some(round)
                    })
                    .unwrap();
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    // Every key saw every round.
    for keys in &per_shard {
        for key in keys {
            assert_eq!(*map.get(key).unwrap().unwrap(), 9);
        }
    }
    assert_eq!(map.len(), shard_count * 500);
}

#[test]
fn test_concurrent_counter_no_lost_updates() {
    let map = Arc::new(RingShardMap::new(4, 16, 16).unwrap());
    let id = [1u8; 16];
    map.get_and_swap(&id, Some(0u64)).unwrap();

    let mut handles = vec![];
    for _ in 0..8 {
        let map = Arc::clone(&map);
        handles.push(thread::spawn(move || {
            let mut done = 0;
            while done < 100 {
                let current = *map.get(&id).unwrap().unwrap();
                // Compare-and-swap through the predicate.
                let previous = map
                    .get_and_swap_if(&id, current + 1, |v| v == Some(&current))
                    .unwrap()
                    .unwrap();
                if *previous == current {
                    done += 1;
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(*map.get(&id).unwrap().unwrap(), 800);
}

#[test]
fn test_concurrent_contains_with_add_single_winner() {
    let map: Arc<RingShardMap<()>> = Arc::new(RingShardMap::new(16, 64, 20).unwrap());
    let address = [9u8; 20];

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let map = Arc::clone(&map);
            thread::spawn(move || !map.contains_with_add(&address).unwrap())
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .filter(|added| *added)
        .count();
    assert_eq!(winners, 1);
}

#[test]
fn test_concurrent_mixed_operations() {
    let map = Arc::new(RingShardMap::new(16, 32, 32).unwrap());
    let mut handles = vec![];

    // Spawn writers
    for thread_id in 0..5 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for i in 0..1000 {
                map.get_and_swap(&key32(thread_id, i), Some(i)).unwrap();
                if i % 3 == 0 {
                    map.remove(&key32(thread_id, i / 2)).unwrap();
                }
            }
        });
        handles.push(handle);
    }

    // Spawn readers
    for _ in 0..5 {
        let map = Arc::clone(&map);
        let handle = thread::spawn(move || {
            for _ in 0..100 {
                for i in 0..10 {
                    // May or may not exist, that's ok
                    map.get(&key32(i % 5, i)).unwrap();
                    map.contains(&key32(i % 5, i + 500)).unwrap();
                }
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert!(map.len() > 0);
    assert!(map.len() <= map.capacity());
}
