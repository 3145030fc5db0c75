// Example: a simulated scroll session driven through the adapter controller.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazysweep::SchedulerOptions;
use lazysweep_adapter::{Controller, Extent, Viewport};

const ROWS: usize = 1_000;
const ROW_HEIGHT: u32 = 24;

fn main() {
    let prepared = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicUsize::new(0));

    let mut c = Controller::new(SchedulerOptions::default());
    c.on_viewport(Viewport::new(0, 600));

    for i in 0..ROWS {
        c.observe(i, i, Extent::new(i as u64 * ROW_HEIGHT as u64, ROW_HEIGHT));
        let prepared = Arc::clone(&prepared);
        let released = Arc::clone(&released);
        c.add_task(i, move |in_buffer, _| {
            if in_buffer {
                prepared.fetch_add(1, Ordering::Relaxed);
            } else {
                released.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    // Simulate a 60fps fling down, then a short scroll back up.
    let mut offset = 0u64;
    for frame in 0..240u64 {
        if frame < 120 {
            offset += 96;
        } else if frame < 150 {
            offset = offset.saturating_sub(64);
        }
        c.on_scroll(offset);
        let ran = c.tick();

        if frame % 30 == 0 {
            let stats = c.stats();
            println!(
                "frame={frame} offset={offset} ran={ran} visible={} in_flight={} sweeps={}",
                stats.visible, stats.in_flight, stats.active_sweeps
            );
        }
    }

    println!(
        "prepared={} released={}",
        prepared.load(Ordering::Relaxed),
        released.load(Ordering::Relaxed)
    );
}
