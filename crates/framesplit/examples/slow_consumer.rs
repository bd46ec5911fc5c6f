//! Demonstrates the drop-oldest overflow policy: a slow client loses the
//! oldest frames while a fast client sees the complete stream.

use framesplit::{Config, Frame, Splitter, SplitterError, Wait};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    env_logger::init();

    let splitter = Arc::new(Splitter::new(Config::new(2, 2)));
    let slow = splitter.add_client().unwrap();
    let fast = splitter.add_client().unwrap();

    let fast_consumer = {
        let splitter = Arc::clone(&splitter);
        thread::spawn(move || {
            let mut frames = Vec::new();
            while let Ok(frame) = splitter.get(fast, Wait::Millis(300)) {
                frames.push(frame[0]);
            }
            frames
        })
    };

    let slow_consumer = {
        let splitter = Arc::clone(&splitter);
        thread::spawn(move || {
            let mut frames = Vec::new();
            loop {
                thread::sleep(Duration::from_millis(400));
                match splitter.get(slow, Wait::Millis(200)) {
                    Ok(frame) => frames.push(frame[0]),
                    Err(SplitterError::NoNewData) => break,
                    Err(err) => {
                        println!("slow client: {err}");
                        break;
                    }
                }
            }
            frames
        })
    };

    // A 50 ms put budget against a 2-frame buffer: the slow client will
    // shed the oldest frames to keep up.
    for n in 1..=12u8 {
        match splitter.put(Frame::copy_from_slice(&[n]), Wait::Millis(50)) {
            Ok(()) => println!("put {n}: delivered to all"),
            Err(err) => println!("put {n}: {err}"),
        }
        thread::sleep(Duration::from_millis(80));
    }

    let slow_stats = splitter.client_by_id(slow).unwrap();
    println!("\nslow client stats before drain: dropped = {}", slow_stats.dropped);

    println!("fast client saw: {:?}", fast_consumer.join().unwrap());
    println!("slow client saw: {:?}", slow_consumer.join().unwrap());
}
