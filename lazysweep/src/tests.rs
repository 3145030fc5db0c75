use crate::*;

use alloc::sync::Arc;
use alloc::vec::Vec;
use core::ops::Range;
use std::sync::Mutex;

type Calls = Arc<Mutex<Vec<(TaskIndex, bool, Direction)>>>;

#[derive(Clone, Copy, Debug)]
struct Lcg(u64);

impl Lcg {
    fn new(seed: u64) -> Self {
        Self(seed)
    }

    fn next_u64(&mut self) -> u64 {
        // Deterministic, dependency-free PRNG for tests.
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 11
    }

    fn gen_range_usize(&mut self, start: usize, end_exclusive: usize) -> usize {
        debug_assert!(start < end_exclusive);
        let span = (end_exclusive - start) as u64;
        start + (self.next_u64() % span) as usize
    }

    fn gen_bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

fn recorder() -> Calls {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(calls: &Calls, index: TaskIndex) -> impl Fn(bool, Direction) + Send + Sync + 'static {
    let calls = Arc::clone(calls);
    move |in_buffer, direction| calls.lock().unwrap().push((index, in_buffer, direction))
}

fn taken(calls: &Calls) -> Vec<(TaskIndex, bool, Direction)> {
    core::mem::take(&mut *calls.lock().unwrap())
}

/// Handles are the indices themselves.
fn setup(
    options: SchedulerOptions,
    observed: Range<usize>,
    tasks: Range<usize>,
) -> (Scheduler<usize>, Calls) {
    let mut s = Scheduler::new(options);
    let calls = recorder();
    for i in observed {
        s.observe(i, i);
    }
    for i in tasks {
        assert!(s.add_task(i, record(&calls, i)));
    }
    (s, calls)
}

fn show(s: &mut Scheduler<usize>, range: Range<usize>) -> Option<Direction> {
    s.apply_intersections(range.map(|i| (i, true)))
}

fn hide(s: &mut Scheduler<usize>, range: Range<usize>) -> Option<Direction> {
    s.apply_intersections(range.map(|i| (i, false)))
}

/// Ticks until the frame queue is empty; returns the number of frames run.
fn drain(s: &mut Scheduler<usize>) -> usize {
    let mut frames = 0;
    while !s.pacer().is_empty() {
        s.tick();
        frames += 1;
        assert!(frames < 10_000, "frame queue never drained");
    }
    frames
}

fn queued_fires(s: &Scheduler<usize>, index: TaskIndex) -> usize {
    s.pacer()
        .iter()
        .filter(|&(_, job)| job == FrameJob::Fire(index))
        .count()
}

#[test]
fn default_options() {
    let o = SchedulerOptions::default();
    assert_eq!(o.buffer_size, 20);
    assert_eq!(o.chunk_size, 10);
    assert_eq!(o.viewport_margin, 200);
    assert_eq!(o.sweep_overlap, SweepOverlap::Interleave);

    let o = SchedulerOptions::new()
        .with_buffer_size(3)
        .with_chunk_size(4)
        .with_viewport_margin(5)
        .with_sweep_overlap(SweepOverlap::Supersede);
    assert_eq!(
        (o.buffer_size, o.chunk_size, o.viewport_margin, o.sweep_overlap),
        (3, 4, 5, SweepOverlap::Supersede)
    );
}

#[test]
fn option_changes_apply_to_later_sweeps() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..30, 0..30);
    show(&mut s, 10..11);
    s.set_buffer_size(2);
    s.set_chunk_size(30);
    s.set_viewport_margin(0);
    s.set_sweep_overlap(SweepOverlap::Supersede);
    assert_eq!(s.options().viewport_margin, 0);

    // The running sweep keeps its window of [0, 30].
    drain(&mut s);
    assert!(taken(&calls).iter().all(|&(_, in_buffer, _)| in_buffer));

    show(&mut s, 11..12);
    assert_eq!(s.stats().in_flight, 30);
    assert_eq!(s.stats().active_sweeps, 0);
    drain(&mut s);
    let in_buffer: Vec<_> = taken(&calls).into_iter().filter(|c| c.1).map(|c| c.0).collect();
    assert_eq!(in_buffer, (8..=13).collect::<Vec<_>>());

    s.update_options(|o| o.buffer_size = 0);
    assert_eq!(s.options().buffer_size, 0);
    s.set_options(SchedulerOptions::default());
    assert_eq!(*s.options(), SchedulerOptions::default());
}

#[test]
fn shared_tasks_register_like_closures() {
    let calls = recorder();
    let task: Task = Arc::new(record(&calls, 2));
    let mut s = Scheduler::new(SchedulerOptions::default());
    s.observe(2usize, 2);
    assert!(s.add_shared_task(2, Arc::clone(&task)));
    assert!(!s.add_shared_task(2, task));
    show(&mut s, 2..3);
    drain(&mut s);
    assert_eq!(taken(&calls), [(2, true, Direction::Down)]);
}

#[test]
fn first_registration_wins() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 3..4, 3..4);
    let other = recorder();
    assert!(!s.add_task(3, record(&other, 3)));
    assert_eq!(s.registry().len(), 1);

    assert_eq!(show(&mut s, 3..4), Some(Direction::Down));
    drain(&mut s);
    assert_eq!(taken(&calls), [(3, true, Direction::Down)]);
    assert!(taken(&other).is_empty());
}

#[test]
fn remove_then_add_replaces_task() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 3..4, 3..4);
    let other = recorder();
    assert!(s.remove_task(3));
    assert!(!s.remove_task(3));
    assert!(s.add_task(3, record(&other, 3)));

    show(&mut s, 3..4);
    drain(&mut s);
    assert!(taken(&calls).is_empty());
    assert_eq!(taken(&other), [(3, true, Direction::Down)]);
}

#[test]
fn direction_from_extremes() {
    let seen = ScheduleState {
        max_visible: Some(10),
        min_visible: Some(5),
    };

    let mut st = seen;
    assert_eq!(st.advance(5, 14), Some(Direction::Down));

    let mut st = seen;
    assert_eq!(st.advance(0, 9), Some(Direction::Up));

    let mut st = seen;
    assert_eq!(st.advance(6, 9), None);
    // Extremes follow the latest range even when it narrowed.
    assert_eq!(
        st,
        ScheduleState {
            max_visible: Some(9),
            min_visible: Some(6),
        }
    );
    assert_eq!(st.advance(5, 10), Some(Direction::Down));

    let mut fresh = ScheduleState::new();
    assert_eq!(fresh.advance(20, 29), Some(Direction::Down));

    // Growth in both directions reports Down.
    let mut st = seen;
    assert_eq!(st.advance(0, 20), Some(Direction::Down));
}

#[test]
fn empty_visible_set_skips_inference() {
    let (mut s, _calls) = setup(SchedulerOptions::default(), 0..10, 0..10);
    show(&mut s, 0..5);
    drain(&mut s);
    let before = s.schedule_state();
    assert_eq!(before.max_visible, Some(4));
    assert_eq!(before.min_visible, Some(0));

    assert_eq!(hide(&mut s, 0..5), None);
    assert_eq!(s.visible_indices().count(), 0);
    assert_eq!(s.schedule_state(), before);
    assert_eq!(s.stats().active_sweeps, 0);
    assert!(s.pacer().is_empty());
    assert_eq!(s.sweep(Direction::Down), None);
}

#[test]
fn buffer_window_bounds() {
    let w = BufferWindow::around(100, 110, 20);
    assert_eq!((w.start, w.end), (80, 130));
    assert!(w.contains(89));
    assert!(w.contains(80));
    assert!(!w.contains(79));
    assert!(w.contains(130));
    assert!(!w.contains(131));

    let w = BufferWindow::around(5, usize::MAX - 1, 20);
    assert_eq!((w.start, w.end), (0, usize::MAX));
}

#[test]
fn sweep_reports_buffer_membership() {
    let mut s = Scheduler::new(SchedulerOptions::default());
    let calls = recorder();
    for i in 100..=110 {
        s.observe(i, i);
    }
    for i in [79, 89, 130, 131] {
        s.add_task(i, record(&calls, i));
    }

    s.apply_intersections((100..=110).map(|i| (i, true)));
    drain(&mut s);
    assert_eq!(
        taken(&calls),
        [
            (79, false, Direction::Down),
            (89, true, Direction::Down),
            (130, true, Direction::Down),
            (131, false, Direction::Down),
        ]
    );
}

#[test]
fn leaving_cancels_pending_task() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 7..8, 7..8);
    show(&mut s, 7..8);
    assert!(s.is_scheduled(7));
    assert_eq!(queued_fires(&s, 7), 1);

    assert_eq!(hide(&mut s, 7..8), None);
    assert!(!s.is_scheduled(7));
    assert_eq!(queued_fires(&s, 7), 0);

    drain(&mut s);
    assert!(taken(&calls).is_empty());
}

#[test]
fn sweep_walks_registry_in_chunks() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..1, 0..25);

    // Round 1 runs with the visibility batch.
    show(&mut s, 0..1);
    assert_eq!(s.stats().in_flight, 10);
    assert_eq!(s.stats().active_sweeps, 1);
    assert_eq!(s.pacer().len(), 11);

    // Round 2.
    assert_eq!(s.tick(), 11);
    assert_eq!(calls.lock().unwrap().len(), 10);
    assert_eq!(s.stats().in_flight, 10);
    assert_eq!(s.stats().active_sweeps, 1);

    // Round 3 covers the last 5 and ends the sweep.
    assert_eq!(s.tick(), 11);
    assert_eq!(calls.lock().unwrap().len(), 20);
    assert_eq!(s.stats().in_flight, 5);
    assert_eq!(s.stats().active_sweeps, 0);

    assert_eq!(s.tick(), 5);
    assert!(s.pacer().is_empty());
    assert_eq!(s.pacer().frame(), 3);

    let order: Vec<_> = taken(&calls).into_iter().map(|(i, _, _)| i).collect();
    assert_eq!(order, (0..25).collect::<Vec<_>>());
}

#[test]
fn zero_chunk_size_processes_one_index_per_frame() {
    let (mut s, calls) = setup(SchedulerOptions::new().with_chunk_size(0), 0..1, 0..3);
    show(&mut s, 0..1);
    assert_eq!(s.stats().in_flight, 1);
    assert_eq!(drain(&mut s), 3);
    assert_eq!(taken(&calls).len(), 3);
}

#[test]
fn first_event_notifies_every_task_in_buffer() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..100, 0..50);
    assert_eq!(show(&mut s, 20..30), Some(Direction::Down));
    drain(&mut s);

    let got = taken(&calls);
    assert_eq!(got.len(), 50);
    for (pos, &(index, in_buffer, direction)) in got.iter().enumerate() {
        assert_eq!(index, pos);
        assert!(in_buffer, "index {index} should be in buffer");
        assert_eq!(direction, Direction::Down);
    }
}

#[test]
fn far_scroll_notifies_tasks_out_of_buffer() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..100, 0..50);
    show(&mut s, 20..30);
    drain(&mut s);
    taken(&calls);

    let batch = (20..30).map(|i| (i, false)).chain((80..90).map(|i| (i, true)));
    assert_eq!(s.apply_intersections(batch), Some(Direction::Down));
    drain(&mut s);

    let got = taken(&calls);
    assert_eq!(got.len(), 50);
    assert!(got.iter().all(|&(_, in_buffer, d)| !in_buffer && d == Direction::Down));
}

#[test]
fn overlapping_sweeps_cancel_stale_work() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..100, 0..50);
    show(&mut s, 20..30);
    assert_eq!(s.stats().in_flight, 10);

    let batch = (20..30).map(|i| (i, false)).chain((80..90).map(|i| (i, true)));
    assert_eq!(s.apply_intersections(batch), Some(Direction::Down));
    // The new sweep's first chunk dropped the first sweep's queued tasks.
    assert_eq!(s.stats().in_flight, 0);
    assert_eq!(s.stats().active_sweeps, 2);

    // Both sweeps advance in lockstep: every chunk the first one queues, the second one cancels.
    drain(&mut s);
    assert!(taken(&calls).is_empty());
    assert_eq!(s.stats().active_sweeps, 0);
}

#[test]
fn supersede_stops_older_sweeps() {
    let options = SchedulerOptions::new().with_sweep_overlap(SweepOverlap::Supersede);
    let (mut s, calls) = setup(options, 0..100, 0..50);
    show(&mut s, 20..30);

    let batch = (20..30).map(|i| (i, false)).chain((80..90).map(|i| (i, true)));
    s.apply_intersections(batch);
    assert_eq!(s.stats().active_sweeps, 1);
    drain(&mut s);

    let got = taken(&calls);
    let indices: Vec<_> = got.iter().map(|&(i, _, _)| i).collect();
    assert_eq!(indices, (10..50).collect::<Vec<_>>());
    assert!(got.iter().all(|&(_, in_buffer, _)| !in_buffer));
}

#[test]
fn requeue_replaces_pending_dispatch() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..1, 0..1);
    show(&mut s, 0..1);
    let first = s.scheduled(0).unwrap();
    assert_eq!(first.direction, Direction::Down);

    assert!(s.sweep(Direction::Up).is_some());
    let second = s.scheduled(0).unwrap();
    assert_ne!(first.handle, second.handle);
    assert!(!s.pacer().contains(first.handle));
    assert_eq!(queued_fires(&s, 0), 1);

    drain(&mut s);
    assert_eq!(taken(&calls), [(0, true, Direction::Up)]);
}

#[test]
fn removing_task_cancels_pending_dispatch() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..5, 0..5);
    show(&mut s, 0..5);
    assert!(s.is_scheduled(2));

    assert!(s.remove_task(2));
    assert!(!s.is_scheduled(2));
    assert_eq!(queued_fires(&s, 2), 0);

    drain(&mut s);
    let indices: Vec<_> = taken(&calls).into_iter().map(|(i, _, _)| i).collect();
    assert_eq!(indices, [0, 1, 3, 4]);
}

#[test]
fn unobserve_acts_like_leave_without_sweep() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..10, 0..10);
    show(&mut s, 5..6);
    assert!(s.is_scheduled(5));
    let state = s.schedule_state();
    drain(&mut s);
    taken(&calls);

    s.sweep(Direction::Down);
    assert!(s.is_scheduled(5));
    assert_eq!(s.unobserve(&5), Some(5));
    assert!(!s.is_visible(5));
    assert!(!s.is_scheduled(5));
    assert_eq!(s.unobserve(&5), None);
    assert_eq!(s.schedule_state(), state);
    assert_eq!(s.stats().observed, 9);

    // Transitions for the unobserved handle are dropped.
    assert_eq!(show(&mut s, 5..6), None);
    assert!(!s.is_visible(5));
}

#[test]
fn observe_rebinds_handle() {
    let (mut s, _calls) = setup(SchedulerOptions::default(), 0..1, 0..1);
    show(&mut s, 0..1);
    assert!(s.is_visible(0));

    s.observe(0, 40);
    assert!(!s.is_visible(0));
    assert!(!s.is_scheduled(0));
    assert_eq!(s.tracker().index_of(&0), Some(40));
    assert_eq!(s.stats().observed, 1);

    assert_eq!(show(&mut s, 0..1), Some(Direction::Down));
    assert!(s.is_visible(40));
}

#[test]
fn unknown_handles_are_ignored() {
    let (mut s, _calls) = setup(SchedulerOptions::default(), 0..5, 0..5);
    assert_eq!(s.apply_intersections([(42, true)]), None);
    assert_eq!(s.visible_indices().count(), 0);
    assert!(s.pacer().is_empty());
}

#[test]
fn revisiting_seen_range_does_not_sweep() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..100, 0..100);
    show(&mut s, 50..60);
    drain(&mut s);
    taken(&calls);

    let batch = (50..60).map(|i| (i, false)).chain((52..58).map(|i| (i, true)));
    assert_eq!(s.apply_intersections(batch), None);
    assert!(s.pacer().is_empty());
    assert!(taken(&calls).is_empty());

    let batch = (52..58).map(|i| (i, false)).chain((40..46).map(|i| (i, true)));
    assert_eq!(s.apply_intersections(batch), Some(Direction::Up));
    drain(&mut s);
    let got = taken(&calls);
    assert_eq!(got.len(), 100);
    assert!(got.iter().all(|&(_, _, d)| d == Direction::Up));
    let in_buffer: Vec<_> = got.iter().filter(|c| c.1).map(|c| c.0).collect();
    assert_eq!(in_buffer, (20..=65).collect::<Vec<_>>());
}

#[test]
fn stale_frames_are_ignored() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..1, 0..1);
    show(&mut s, 0..1);
    let pending = s.scheduled(0).unwrap();

    assert!(!s.run_frame(FrameHandle::new(pending.handle.get() + 1000), FrameJob::Fire(0)));
    assert!(s.is_scheduled(0));
    assert!(!s.run_frame(pending.handle, FrameJob::Chunk(pending.sweep)));

    assert!(s.run_frame(pending.handle, FrameJob::Fire(0)));
    assert!(!s.is_scheduled(0));
    assert!(!s.run_frame(pending.handle, FrameJob::Fire(0)));
    assert_eq!(taken(&calls).len(), 1);
}

#[test]
fn dispose_cancels_everything() {
    let (mut s, calls) = setup(SchedulerOptions::default(), 0..100, 0..50);
    show(&mut s, 20..30);
    assert!(!s.pacer().is_empty());

    s.dispose();
    assert!(s.pacer().is_empty());
    assert_eq!(s.stats(), SchedulerStats::default());
    assert_eq!(s.schedule_state(), ScheduleState::default());
    assert_eq!(s.tick(), 0);
    assert!(taken(&calls).is_empty());

    // Still usable.
    s.observe(1, 1);
    s.add_task(1, record(&calls, 1));
    assert_eq!(show(&mut s, 1..2), Some(Direction::Down));
    drain(&mut s);
    assert_eq!(taken(&calls), [(1, true, Direction::Down)]);
}

#[test]
fn panicking_task_keeps_rest_of_frame_queued() {
    let mut s = Scheduler::new(SchedulerOptions::default());
    let calls = recorder();
    s.observe(0usize, 0);
    s.add_task(0, |_, _| panic!("task failed"));
    s.add_task(1, record(&calls, 1));
    show(&mut s, 0..1);

    let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| s.tick()));
    assert!(res.is_err());
    assert!(!s.is_scheduled(0));
    assert!(s.is_scheduled(1));
    assert_eq!(queued_fires(&s, 1), 1);

    assert_eq!(s.tick(), 1);
    assert_eq!(taken(&calls), [(1, true, Direction::Down)]);
}

#[test]
fn tasks_added_mid_sweep_wait_for_next_sweep() {
    let (mut s, calls) = setup(SchedulerOptions::new().with_chunk_size(2), 0..10, 0..4);
    show(&mut s, 0..1);
    s.add_task(5, record(&calls, 5));
    drain(&mut s);
    let indices: Vec<_> = taken(&calls).into_iter().map(|(i, _, _)| i).collect();
    assert_eq!(indices, [0, 1, 2, 3]);

    show(&mut s, 1..2);
    drain(&mut s);
    let indices: Vec<_> = taken(&calls).into_iter().map(|(i, _, _)| i).collect();
    assert_eq!(indices, [0, 1, 2, 3, 5]);
}

#[test]
fn single_flight_holds_under_random_operations() {
    const N: usize = 40;

    for seed in 1..=16u64 {
        let mut rng = Lcg::new(seed);
        let overlap = if rng.gen_bool() {
            SweepOverlap::Interleave
        } else {
            SweepOverlap::Supersede
        };
        let options = SchedulerOptions::new()
            .with_buffer_size(rng.gen_range_usize(0, 8))
            .with_chunk_size(rng.gen_range_usize(1, 6))
            .with_sweep_overlap(overlap);
        let (mut s, calls) = setup(options, 0..N, 0..0);

        for _ in 0..400 {
            match rng.gen_range_usize(0, 6) {
                0 => {
                    let i = rng.gen_range_usize(0, N);
                    s.add_task(i, record(&calls, i));
                }
                1 => {
                    s.remove_task(rng.gen_range_usize(0, N));
                }
                2 | 3 => {
                    let len = rng.gen_range_usize(1, 6);
                    let batch: Vec<_> = (0..len)
                        .map(|_| (rng.gen_range_usize(0, N + 2), rng.gen_bool()))
                        .collect();
                    s.apply_intersections(batch);
                }
                4 => {
                    s.tick();
                }
                _ => {
                    let d = if rng.gen_bool() { Direction::Up } else { Direction::Down };
                    s.sweep(d);
                }
            }

            let mut fires = 0;
            let mut chunks = 0;
            for (handle, job) in s.pacer().iter() {
                match job {
                    FrameJob::Fire(i) => {
                        fires += 1;
                        let pending = s.scheduled(i).expect("queued fire without entry");
                        assert_eq!(pending.handle, handle, "seed={seed}");
                    }
                    FrameJob::Chunk(id) => {
                        chunks += 1;
                        assert!(s.dispatcher().is_sweep_active(id), "seed={seed}");
                    }
                }
            }
            let stats = s.stats();
            assert_eq!(fires, stats.in_flight, "seed={seed}");
            assert_eq!(chunks, stats.active_sweeps, "seed={seed}");
            for pending in s.dispatcher().in_flight() {
                assert!(s.has_task(pending.index), "seed={seed}");
                assert!(s.pacer().contains(pending.handle), "seed={seed}");
            }
        }

        drain(&mut s);
        assert_eq!(s.stats().in_flight, 0);
        assert_eq!(s.stats().active_sweeps, 0);
    }
}
