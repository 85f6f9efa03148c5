use csp_channel::{select, Channel, Intent};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

fn main() {
    println!("csp-channel basic example");
    println!("==========================\n");

    let channel = Arc::new(Channel::<u64>::new(1024));

    const N_PRODUCERS: usize = 4;
    const ITEMS_PER_PRODUCER: usize = 100_000;

    println!("Configuration:");
    println!("  Producers: {N_PRODUCERS}");
    println!("  Items per producer: {ITEMS_PER_PRODUCER}");
    println!("  Total items: {}\n", N_PRODUCERS * ITEMS_PER_PRODUCER);

    let start = Instant::now();

    let mut handles = vec![];
    for id in 0..N_PRODUCERS {
        let ch = Arc::clone(&channel);
        handles.push(thread::spawn(move || {
            for i in 0..ITEMS_PER_PRODUCER {
                ch.send((id * ITEMS_PER_PRODUCER + i) as u64).unwrap();
            }
        }));
    }

    let mut received = 0usize;
    while received < N_PRODUCERS * ITEMS_PER_PRODUCER {
        channel.receive().unwrap();
        received += 1;
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let elapsed = start.elapsed();
    println!("Received {received} items in {elapsed:?}");

    println!("\nselect example:");
    let urgent = Channel::<&str>::new(1);
    let normal = Channel::<&str>::new(1);
    normal.send("routine update").unwrap();

    let intents = [Intent::recv(&urgent), Intent::recv(&normal)];
    let won = select(&intents).unwrap();
    println!(
        "  select chose intent {won}: {:?}",
        intents[won].take_received()
    );
}
