//! Asynchronous page rescaling.
//!
//! A [`PageScaler`] owns one background worker that performs expensive
//! high-quality page rescales off the interactive thread, one at a time.
//! Jobs are de-duplicated by page identity: rescheduling a page that is
//! already queued either overwrites the target resolution in place (normal
//! priority) or promotes the job to the queue head (high priority), so rapid
//! interactive zooming never piles up stale work.
//!
//! Listeners are invoked on the worker thread after each successful rescale
//! and must marshal to the UI themselves (e.g. by requesting a repaint
//! through a thread-safe host handle).

use preview_core::{same_page, PageRef, Size};
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};

/// A pending rescale: which page, and at what resolution.
#[derive(Clone)]
pub struct ScaleJob {
    pub page: PageRef,
    pub target: Size,
}

/// Callback invoked after a page has been rescaled successfully.
pub type ScalingListener = Box<dyn Fn(&PageRef, Size) + Send>;

struct QueueState {
    jobs: VecDeque<ScaleJob>,
    shutdown: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    wakeup: Condvar,
    listeners: Mutex<Vec<ScalingListener>>,
}

/// Single-worker background scale queue with priority promotion and
/// per-page de-duplication.
pub struct PageScaler {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl PageScaler {
    /// Create the scaler and start its worker thread.
    pub fn new() -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            wakeup: Condvar::new(),
            listeners: Mutex::new(Vec::new()),
        });

        let worker_shared = shared.clone();
        let worker = thread::Builder::new()
            .name("page-scaler".into())
            .spawn(move || Self::run(worker_shared))
            .expect("failed to spawn scaler worker");

        Self {
            shared,
            worker: Some(worker),
        }
    }

    fn run(shared: Arc<Shared>) {
        loop {
            let job = {
                let mut state = shared.state.lock().expect("scale queue poisoned");
                loop {
                    if state.shutdown {
                        return;
                    }
                    if let Some(job) = state.jobs.pop_front() {
                        break job;
                    }
                    state = shared.wakeup.wait(state).expect("scale queue poisoned");
                }
            };

            match job.page.hi_quality_scale(job.target) {
                Ok(()) => {
                    let listeners = shared.listeners.lock().expect("listener list poisoned");
                    for listener in listeners.iter() {
                        listener(&job.page, job.target);
                    }
                }
                Err(err) => {
                    // non-fatal: the page keeps its previous raster or placeholder
                    log::warn!("rescale to {:?} failed: {err}", job.target);
                }
            }
        }
    }

    /// Schedule a rescale of `page` to `target`.
    ///
    /// At most one job per page is ever pending: if the page is already
    /// queued, a high-priority request moves its job to the queue head and a
    /// normal request merely overwrites the target resolution in place.
    /// Fire-and-forget; never blocks on the worker.
    pub fn enqueue(&self, page: PageRef, target: Size, high_priority: bool) {
        let mut state = self.shared.state.lock().expect("scale queue poisoned");
        if state.shutdown {
            return;
        }

        match state.jobs.iter().position(|job| same_page(&job.page, &page)) {
            None => {
                let job = ScaleJob { page, target };
                if high_priority {
                    state.jobs.push_front(job);
                } else {
                    state.jobs.push_back(job);
                }
            }
            Some(index) => {
                if high_priority {
                    let mut job = state.jobs.remove(index).expect("job index out of range");
                    job.target = target;
                    state.jobs.push_front(job);
                } else {
                    state.jobs[index].target = target;
                }
            }
        }

        self.shared.wakeup.notify_one();
    }

    /// Register a listener for successful rescales. Invoked on the worker
    /// thread.
    pub fn add_listener(&self, listener: ScalingListener) {
        self.shared
            .listeners
            .lock()
            .expect("listener list poisoned")
            .push(listener);
    }

    /// Drop all pending jobs without stopping the worker.
    pub fn clear(&self) {
        self.shared
            .state
            .lock()
            .expect("scale queue poisoned")
            .jobs
            .clear();
    }

    /// Number of jobs currently pending (not counting one in progress).
    pub fn queue_len(&self) -> usize {
        self.shared
            .state
            .lock()
            .expect("scale queue poisoned")
            .jobs
            .len()
    }

    /// The pending target resolution for `page`, if it is queued.
    pub fn queued_target(&self, page: &PageRef) -> Option<Size> {
        self.shared
            .state
            .lock()
            .expect("scale queue poisoned")
            .jobs
            .iter()
            .find(|job| same_page(&job.page, page))
            .map(|job| job.target)
    }

    /// Snapshot of the pending queue, front first.
    pub fn queued_jobs(&self) -> Vec<ScaleJob> {
        self.shared
            .state
            .lock()
            .expect("scale queue poisoned")
            .jobs
            .iter()
            .cloned()
            .collect()
    }

    /// Stop the worker: drops all unstarted jobs, lets an in-progress rescale
    /// finish, and joins the thread. No listener fires after this returns.
    /// Idempotent.
    pub fn disable(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        {
            let mut state = self.shared.state.lock().expect("scale queue poisoned");
            state.shutdown = true;
            state.jobs.clear();
        }
        self.shared.wakeup.notify_all();

        if worker.join().is_err() {
            log::error!("scaler worker panicked during shutdown");
        }
    }
}

impl Default for PageScaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for PageScaler {
    fn drop(&mut self) {
        self.disable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preview_core::{DrawSurface, Page, Rect, ScaleError};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    /// Test page whose rescale blocks until the gate is opened.
    struct GatedPage {
        open: Mutex<bool>,
        gate: Condvar,
        scaled_at: Mutex<Vec<Size>>,
    }

    impl GatedPage {
        fn new(open: bool) -> Arc<Self> {
            Arc::new(Self {
                open: Mutex::new(open),
                gate: Condvar::new(),
                scaled_at: Mutex::new(Vec::new()),
            })
        }

        fn release(&self) {
            *self.open.lock().unwrap() = true;
            self.gate.notify_all();
        }

        fn scaled_at(&self) -> Vec<Size> {
            self.scaled_at.lock().unwrap().clone()
        }
    }

    impl Page for GatedPage {
        fn draw(&self, _surface: &mut dyn DrawSurface, _rect: Rect) {}

        fn is_scaled(&self, _resolution: Size) -> bool {
            false
        }

        fn hi_quality_scale(&self, resolution: Size) -> Result<(), ScaleError> {
            let mut open = self.open.lock().unwrap();
            while !*open {
                open = self.gate.wait(open).unwrap();
            }
            drop(open);
            self.scaled_at.lock().unwrap().push(resolution);
            Ok(())
        }

        fn nominal_size(&self) -> Size {
            Size::new(100, 100)
        }

        fn free_resources(&self) {}
    }

    struct FailingPage;

    impl Page for FailingPage {
        fn draw(&self, _surface: &mut dyn DrawSurface, _rect: Rect) {}

        fn is_scaled(&self, _resolution: Size) -> bool {
            false
        }

        fn hi_quality_scale(&self, _resolution: Size) -> Result<(), ScaleError> {
            Err(ScaleError::Render("broken page".into()))
        }

        fn nominal_size(&self) -> Size {
            Size::new(100, 100)
        }

        fn free_resources(&self) {}
    }

    fn wait_until(deadline: Duration, mut check: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        check()
    }

    /// Block the worker on `blocker` so the queue behind it can be inspected.
    fn occupy_worker(scaler: &PageScaler, blocker: &Arc<GatedPage>) {
        let page: PageRef = blocker.clone();
        scaler.enqueue(page, Size::new(10, 10), false);
        assert!(wait_until(Duration::from_secs(2), || scaler.queue_len() == 0));
    }

    #[test]
    fn executes_jobs_and_notifies_listeners() {
        let mut scaler = PageScaler::new();
        let completed = Arc::new(AtomicUsize::new(0));
        let completed_clone = completed.clone();
        scaler.add_listener(Box::new(move |_page, _target| {
            completed_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let page = GatedPage::new(true);
        scaler.enqueue(page.clone(), Size::new(50, 60), false);

        assert!(wait_until(Duration::from_secs(2), || {
            completed.load(Ordering::SeqCst) == 1
        }));
        assert_eq!(page.scaled_at(), vec![Size::new(50, 60)]);

        scaler.disable();
    }

    #[test]
    fn reenqueue_overwrites_target_in_place() {
        let mut scaler = PageScaler::new();
        let blocker = GatedPage::new(false);
        occupy_worker(&scaler, &blocker);

        let page = GatedPage::new(true);
        let page_ref: PageRef = page.clone();
        scaler.enqueue(page_ref.clone(), Size::new(100, 100), false);
        scaler.enqueue(page_ref.clone(), Size::new(200, 200), false);

        assert_eq!(scaler.queue_len(), 1);
        assert_eq!(scaler.queued_target(&page_ref), Some(Size::new(200, 200)));

        blocker.release();
        assert!(wait_until(Duration::from_secs(2), || {
            page.scaled_at().len() == 1
        }));
        // exactly one job ran, at the most recently requested resolution
        assert_eq!(page.scaled_at(), vec![Size::new(200, 200)]);

        scaler.disable();
    }

    #[test]
    fn high_priority_promotes_existing_job_to_front() {
        let mut scaler = PageScaler::new();
        let blocker = GatedPage::new(false);
        occupy_worker(&scaler, &blocker);

        let first = GatedPage::new(true);
        let second = GatedPage::new(true);
        let first_ref: PageRef = first.clone();
        let second_ref: PageRef = second.clone();

        scaler.enqueue(first_ref.clone(), Size::new(100, 100), false);
        scaler.enqueue(second_ref.clone(), Size::new(100, 100), false);
        scaler.enqueue(second_ref.clone(), Size::new(100, 100), true);

        let queued = scaler.queued_jobs();
        assert_eq!(queued.len(), 2);
        assert!(same_page(&queued[0].page, &second_ref));
        assert!(same_page(&queued[1].page, &first_ref));

        blocker.release();
        scaler.disable();
    }

    #[test]
    fn high_priority_insert_goes_to_front() {
        let mut scaler = PageScaler::new();
        let blocker = GatedPage::new(false);
        occupy_worker(&scaler, &blocker);

        let normal = GatedPage::new(true);
        let urgent = GatedPage::new(true);
        let normal_ref: PageRef = normal.clone();
        let urgent_ref: PageRef = urgent.clone();

        scaler.enqueue(normal_ref.clone(), Size::new(100, 100), false);
        scaler.enqueue(urgent_ref.clone(), Size::new(100, 100), true);

        let queued = scaler.queued_jobs();
        assert!(same_page(&queued[0].page, &urgent_ref));

        blocker.release();
        scaler.disable();
    }

    #[test]
    fn failed_jobs_are_dropped_without_notification() {
        let mut scaler = PageScaler::new();
        let notified = Arc::new(AtomicUsize::new(0));
        let notified_clone = notified.clone();
        scaler.add_listener(Box::new(move |_page, _target| {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        }));

        scaler.enqueue(Arc::new(FailingPage), Size::new(50, 50), false);

        let ok = GatedPage::new(true);
        scaler.enqueue(ok.clone(), Size::new(60, 60), false);

        assert!(wait_until(Duration::from_secs(2), || {
            ok.scaled_at().len() == 1
        }));
        // only the successful job notified
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        scaler.disable();
    }

    #[test]
    fn disable_drops_unstarted_jobs_and_is_idempotent() {
        let mut scaler = PageScaler::new();
        let blocker = GatedPage::new(false);
        occupy_worker(&scaler, &blocker);

        let pending = GatedPage::new(true);
        scaler.enqueue(pending.clone(), Size::new(100, 100), false);
        assert_eq!(scaler.queue_len(), 1);

        // unblock the in-progress job shortly after disable starts waiting
        let release_blocker = blocker.clone();
        let releaser = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            release_blocker.release();
        });

        scaler.disable();
        releaser.join().unwrap();

        // the queued job was dropped, the in-progress one ran to completion
        assert!(pending.scaled_at().is_empty());
        assert_eq!(blocker.scaled_at().len(), 1);

        scaler.disable();
    }

    #[test]
    fn no_listener_fires_after_disable_returns() {
        let mut scaler = PageScaler::new();
        let notified = Arc::new(AtomicUsize::new(0));
        let notified_clone = notified.clone();
        scaler.add_listener(Box::new(move |_page, _target| {
            notified_clone.fetch_add(1, Ordering::SeqCst);
        }));

        for _ in 0..5 {
            scaler.enqueue(GatedPage::new(true), Size::new(100, 100), false);
        }
        scaler.disable();

        let after_disable = notified.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(notified.load(Ordering::SeqCst), after_disable);
    }
}
