use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use gwlist::{trace, List};

#[test]
fn single_producer_single_consumer_fifo() {
    trace::init_tracing();
    let list = Arc::new(List::new());
    let n = 1000;

    list.add_producer();
    let producer = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            for i in 0..n {
                list.produce(Arc::new(i));
            }
            list.remove_producer();
        })
    };

    let mut received = Vec::with_capacity(n);
    while let Some(item) = list.consume() {
        received.push(*item);
    }

    producer.join().unwrap();
    assert_eq!(received, (0..n).collect::<Vec<_>>());
    // The (N+1)-th call keeps returning the empty result
    assert!(list.consume().is_none());
}

#[test]
fn many_producers_many_consumers_no_loss_no_duplicates() {
    trace::init_tracing();
    let list = Arc::new(List::new());
    let num_producers = 4;
    let items_per_producer = 500;
    let num_consumers = 3;

    // Register up front so no consumer sees an empty list with zero producers
    for _ in 0..num_producers {
        list.add_producer();
    }

    let producers: Vec<_> = (0..num_producers)
        .map(|p| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for i in 0..items_per_producer {
                    list.produce(Arc::new((p, i)));
                }
                list.remove_producer();
            })
        })
        .collect();

    let consumers: Vec<_> = (0..num_consumers)
        .map(|_| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                let mut got = Vec::new();
                while let Some(item) = list.consume() {
                    got.push(*item);
                }
                got
            })
        })
        .collect();

    for handle in producers {
        handle.join().unwrap();
    }

    let mut all = Vec::new();
    for handle in consumers {
        let got = handle.join().unwrap();

        // Each producer's items stay in order within one consumer's view
        for p in 0..num_producers {
            let from_p: Vec<_> = got.iter().filter(|(q, _)| *q == p).map(|(_, i)| *i).collect();
            assert!(from_p.windows(2).all(|w| w[0] < w[1]));
        }
        all.extend(got);
    }

    assert_eq!(all.len(), num_producers * items_per_producer);
    let unique: HashSet<_> = all.into_iter().collect();
    assert_eq!(unique.len(), num_producers * items_per_producer);
    assert!(list.is_empty());
    assert_eq!(list.producer_count(), 0);
}

#[test]
fn all_blocked_consumers_wake_when_last_producer_leaves() {
    let list: Arc<List<u32>> = Arc::new(List::new());
    list.add_producer();
    list.add_producer();

    let woken = Arc::new(AtomicUsize::new(0));
    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let list = Arc::clone(&list);
            let woken = Arc::clone(&woken);
            thread::spawn(move || {
                let item = list.consume();
                woken.fetch_add(1, Ordering::SeqCst);
                item
            })
        })
        .collect();

    thread::sleep(Duration::from_millis(50));
    list.remove_producer();
    thread::sleep(Duration::from_millis(50));
    // One producer is still registered
    assert_eq!(woken.load(Ordering::SeqCst), 0);

    list.remove_producer();
    for handle in consumers {
        assert!(handle.join().unwrap().is_none());
    }
    assert_eq!(woken.load(Ordering::SeqCst), 4);
}

#[test]
fn wait_until_nonempty_returns_even_if_item_is_taken() {
    let list: Arc<List<u32>> = Arc::new(List::new());
    let ready = Arc::new(Barrier::new(2));

    let waiter = {
        let list = Arc::clone(&list);
        let ready = Arc::clone(&ready);
        thread::spawn(move || {
            // Hold the lock across the barrier; it is only released once the
            // waiter is parked on the condvar.
            let mut guard = list.lock();
            ready.wait();
            guard.wait_until_nonempty()
        })
    };

    ready.wait();
    {
        // Append and take the item back inside one critical section; the
        // waiter only gets the lock after the list is empty again.
        let mut guard = list.lock();
        guard.append(Arc::new(1));
        assert_eq!(*guard.extract_first().unwrap(), 1);
    }

    assert!(!waiter.join().unwrap());
    assert!(list.is_empty());
}

#[test]
fn wait_until_nonempty_wakes_on_plain_append() {
    let list: Arc<List<u32>> = Arc::new(List::new());
    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let list = Arc::clone(&list);
            thread::spawn(move || list.wait_until_nonempty())
        })
        .collect();

    thread::sleep(Duration::from_millis(20));
    list.append(Arc::new(7));
    for handle in waiters {
        assert!(handle.join().unwrap());
    }
    assert_eq!(list.len(), 1);
}

#[test]
fn critical_section_is_atomic_across_threads() {
    let list: Arc<List<usize>> = Arc::new(List::new());
    let threads = 8;
    let rounds = 200;

    // Each round reads the last value and appends its successor; without the
    // guard two threads could append the same successor.
    list.append(Arc::new(0));
    let workers: Vec<_> = (0..threads)
        .map(|_| {
            let list = Arc::clone(&list);
            thread::spawn(move || {
                for _ in 0..rounds {
                    let mut guard = list.lock();
                    let last = *guard.get(guard.len() - 1);
                    guard.append(Arc::new(last + 1));
                }
            })
        })
        .collect();

    for handle in workers {
        handle.join().unwrap();
    }

    let values: Vec<usize> = list.snapshot().iter().map(|item| **item).collect();
    assert_eq!(values, (0..=threads * rounds).collect::<Vec<_>>());
}

#[test]
fn concatenate_consumes_other_list() {
    let a: List<&str> = ["a0", "a1"].into_iter().map(Arc::new).collect();
    let b: List<&str> = ["b0", "b1"].into_iter().map(Arc::new).collect();

    let a = a.concatenate(b);
    let values: Vec<&str> = a.snapshot().iter().map(|item| **item).collect();
    assert_eq!(values, vec!["a0", "a1", "b0", "b1"]);
}
