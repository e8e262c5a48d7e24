use multibar::Container;
use rand::Rng;
use std::thread;
use std::time::Duration;

const NUM_IMAGES: u64 = 124;

fn main() {
    let container = Container::new();
    container.println("Starting bars...").unwrap();

    let download = container.bar(NUM_IMAGES, "Downloading Images").unwrap();
    let process = container.bar(NUM_IMAGES, "Post-processing Images").unwrap();

    let listener = container.clone();
    let listen_thread = thread::spawn(move || listener.listen());

    // Messages go through the container, so they land below the bars and
    // push them up once the screen fills, instead of drawing over them.
    let out = container.clone();
    let downl_thread = thread::spawn(move || {
        for i in 0..NUM_IMAGES {
            thread::sleep(Duration::from_millis(10));

            // Simulate our download failing
            if rand::thread_rng().gen_ratio(1, 20) {
                out.printf(format_args!("Image #{:03}: Downloading failed.\n", i))
                    .unwrap();
            }

            download.update(i as i64 + 1);
        }
    });

    let out = container.clone();
    let process_thread = thread::spawn(move || {
        for i in 0..NUM_IMAGES {
            thread::sleep(Duration::from_millis(17));

            // Simulate our resizing failing
            // because we expected a square image.
            if rand::thread_rng().gen_ratio(1, 25) {
                out.printf(format_args!("Image #{:03}: Not square.\n", i))
                    .unwrap();
            }

            if i == NUM_IMAGES / 2 {
                process.set_label("Post-processing (halfway)");
            }
            process.update(i as i64 + 1);
        }
    });

    downl_thread.join().unwrap();
    process_thread.join().unwrap();
    listen_thread.join().unwrap().unwrap();

    container.println("Complete!").unwrap();
}
