use framesplit::{Config, Frame, Splitter, Wait};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    env_logger::init();

    println!("Framesplit Basic Example");
    println!("========================\n");

    const N_CLIENTS: usize = 3;
    const N_FRAMES: u8 = 20;

    let splitter = Arc::new(Splitter::new(Config::new(8, N_CLIENTS)));

    let ids: Vec<_> = (0..N_CLIENTS)
        .map(|_| splitter.add_client().unwrap())
        .collect();
    println!("Registered clients: {ids:?}\n");

    // One consumer thread per client, each draining at its own pace.
    let mut handles = vec![];
    for (n, id) in ids.iter().copied().enumerate() {
        let splitter = Arc::clone(&splitter);
        handles.push(thread::spawn(move || {
            let mut received = Vec::new();
            while received.len() < N_FRAMES as usize {
                match splitter.get(id, Wait::Millis(500)) {
                    Ok(frame) => received.push(frame[0]),
                    Err(err) => {
                        println!("client {id}: {err}");
                        break;
                    }
                }
                // Stagger consumption speeds.
                thread::sleep(Duration::from_millis(5 * n as u64));
            }
            println!("client {id} received {} frames", received.len());
            received
        }));
    }

    // Produce the stream; every frame is the same shared buffer.
    for n in 0..N_FRAMES {
        splitter
            .put(Frame::copy_from_slice(&[n]), Wait::Forever)
            .unwrap();
        thread::sleep(Duration::from_millis(10));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    for id in ids {
        let stats = splitter.client_by_id(id).unwrap();
        println!(
            "client {}: latency = {}, dropped = {}",
            stats.id, stats.latency, stats.dropped
        );
    }
}
