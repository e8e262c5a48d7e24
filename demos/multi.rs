use multibar::Container;
use rand::Rng;
use rayon::prelude::*;
use std::time::Duration;

const BAR_MAX: u64 = 1234;

fn main() {
    println!("Starting bars...");

    let container = Container::new();

    // Every bar has to exist before the listener starts.
    let bars: Vec<_> = (0..10)
        .map(|n| container.bar(BAR_MAX, format!("Downloading #{}", n)))
        .collect::<Result<_, _>>()
        .unwrap();

    let listener = container.clone();
    let handle = std::thread::spawn(move || listener.listen());

    // Each `Updater` moves into its own task. Dropping it at the end of the
    // closure tells the listener that bar is done.
    bars.into_par_iter().for_each(|bar| {
        // Determine how fast our task progresses.
        let wait = rand::thread_rng().gen_range(1..10);

        for n in 0..=BAR_MAX as i64 {
            bar.update(n);
            std::thread::sleep(Duration::from_millis(wait));
        }
    });

    handle.join().unwrap().unwrap();
    container.println("Complete!").unwrap();
}
