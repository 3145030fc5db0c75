// Example: plug the scheduler into a host-owned frame clock.
use std::collections::VecDeque;

use lazysweep::{FrameHandle, FrameJob, FramePacer, Scheduler, SchedulerOptions};

/// A pacer that hands out a bounded number of jobs per frame, e.g. to respect a frame budget.
#[derive(Debug, Default)]
struct BudgetPacer {
    next: u64,
    queue: VecDeque<(FrameHandle, FrameJob)>,
}

impl FramePacer for BudgetPacer {
    fn request_tick(&mut self, job: FrameJob) -> FrameHandle {
        self.next += 1;
        let handle = FrameHandle::new(self.next);
        self.queue.push_back((handle, job));
        handle
    }

    fn cancel_tick(&mut self, handle: FrameHandle) -> bool {
        let Some(pos) = self.queue.iter().position(|&(h, _)| h == handle) else {
            return false;
        };
        self.queue.remove(pos);
        true
    }
}

fn main() {
    let options = SchedulerOptions::new().with_chunk_size(4).with_buffer_size(2);
    let mut s = Scheduler::with_pacer(options, BudgetPacer::default());

    for i in 0..16usize {
        s.observe(i, i);
        s.add_task(i, move |in_buffer, direction| {
            println!("  task {i}: in_buffer={in_buffer} direction={direction:?}");
        });
    }
    s.apply_intersections((6..8).map(|i| (i, true)));

    let budget = 3;
    let mut frame = 0;
    while !s.pacer().queue.is_empty() {
        frame += 1;
        println!("frame {frame}");
        let due: Vec<_> = {
            let queue = &mut s.pacer_mut().queue;
            let n = budget.min(queue.len());
            queue.drain(..n).collect()
        };
        for (handle, job) in due {
            s.run_frame(handle, job);
        }
    }
}
