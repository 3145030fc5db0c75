// Example: register per-row work, report visibility, and drive frames by hand.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use lazysweep::{Scheduler, SchedulerOptions};

fn main() {
    let mut s = Scheduler::new(SchedulerOptions::default());
    let heavy = Arc::new(AtomicUsize::new(0));

    for i in 0..200usize {
        s.observe(i, i);
        let heavy = Arc::clone(&heavy);
        s.add_task(i, move |in_buffer, _direction| {
            if in_buffer {
                heavy.fetch_add(1, Ordering::Relaxed);
            }
        });
    }

    // Rows 40..50 scroll into view.
    let direction = s.apply_intersections((40..50).map(|i| (i, true)));
    println!("direction={direction:?} stats={:?}", s.stats());

    let mut frames = 0;
    while !s.pacer().is_empty() {
        let ran = s.tick();
        frames += 1;
        println!("frame={frames} ran={ran} in_flight={}", s.stats().in_flight);
    }
    println!("rows prepared near the viewport: {}", heavy.load(Ordering::Relaxed));

    s.dispose();
    println!("after dispose: {:?}", s.stats());
}
