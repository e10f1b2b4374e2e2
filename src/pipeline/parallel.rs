//! Fan-out/fan-in of per-object transform tasks.
//!
//! One task per renderable publishes into a bounded queue; the coordinating
//! thread drains exactly one result per task before reducing in scene order.

use std::time::{Duration, Instant};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::config::RenderSettings;
use crate::core::renderable::Renderable;
use crate::error::Result;
use crate::pipeline::record::{build_record, FrameSnapshot, RenderRecord, TaskFailure};
use crate::scene::graph;

type TaskOutcome = (usize, Result<RenderRecord>);

/// Output of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct CollectedFrame {
    /// Valid records in scene order, world matrices resolved.
    pub records: Vec<RenderRecord>,
    pub failures: Vec<TaskFailure>,
    /// Tasks dispatched; always `records.len() + failures.len()`.
    pub dispatched: usize,
}

impl CollectedFrame {
    pub fn collected(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

pub struct TransformPipeline {
    parallel_enabled: bool,
    queue_capacity: usize,
    busy_time: Mutex<Duration>,
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl std::fmt::Debug for TransformPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformPipeline")
            .field("parallel_enabled", &self.parallel_enabled)
            .field("queue_capacity", &self.queue_capacity)
            .field("workers", &self.worker_count())
            .finish()
    }
}

impl TransformPipeline {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            parallel_enabled: settings.parallel,
            queue_capacity: settings.queue_capacity.max(1),
            busy_time: Mutex::new(Duration::ZERO),
            #[cfg(feature = "parallel")]
            pool: build_pool(settings.worker_threads),
        }
    }

    /// Enables or disables worker dispatch. Without the `parallel` feature the
    /// pipeline always runs inline.
    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.parallel_enabled = enabled;
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled && self.worker_count() > 0
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn worker_count(&self) -> usize {
        #[cfg(feature = "parallel")]
        {
            self.pool
                .as_ref()
                .map_or(0, rayon::ThreadPool::current_num_threads)
        }
        #[cfg(not(feature = "parallel"))]
        {
            0
        }
    }

    /// Time spent inside tasks during the last run, summed over workers.
    pub fn busy_time(&self) -> Duration {
        *self.busy_time.lock()
    }

    /// Runs one task per object and reduces the results.
    ///
    /// Blocks until every task has reported. Failed tasks are counted and
    /// returned as [`TaskFailure`]s; they never abort the frame.
    pub fn run(
        &self,
        objects: &mut [Box<dyn Renderable>],
        snapshot: &FrameSnapshot,
    ) -> CollectedFrame {
        let dispatched = objects.len();
        *self.busy_time.lock() = Duration::ZERO;
        if dispatched == 0 {
            return CollectedFrame::default();
        }

        let mut outcomes = self.map(objects, snapshot);
        outcomes.sort_unstable_by_key(|(index, _)| *index);

        let mut records = Vec::with_capacity(dispatched);
        let mut failures = Vec::new();
        for (index, outcome) in outcomes {
            match outcome {
                Ok(record) => records.push(record),
                Err(error) => {
                    let name = objects[index].name().to_string();
                    warn!("skipping '{name}' this frame: {error}");
                    failures.push(TaskFailure {
                        source: index,
                        name,
                        error,
                    });
                }
            }
        }

        graph::resolve_world_matrices(objects, &mut records);
        debug!(
            "pipeline: {dispatched} dispatched, {} records, {} failed",
            records.len(),
            failures.len()
        );
        CollectedFrame {
            records,
            failures,
            dispatched,
        }
    }

    fn map(&self, objects: &[Box<dyn Renderable>], snapshot: &FrameSnapshot) -> Vec<TaskOutcome> {
        #[cfg(feature = "parallel")]
        {
            if let (true, Some(pool)) = (self.parallel_enabled, &self.pool) {
                return self.map_parallel(pool, objects, snapshot);
            }
        }
        self.map_sequential(objects, snapshot)
    }

    fn map_sequential(
        &self,
        objects: &[Box<dyn Renderable>],
        snapshot: &FrameSnapshot,
    ) -> Vec<TaskOutcome> {
        objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                let started = Instant::now();
                let outcome = build_record(index, object.as_ref(), snapshot);
                *self.busy_time.lock() += started.elapsed();
                (index, outcome)
            })
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn map_parallel(
        &self,
        pool: &rayon::ThreadPool,
        objects: &[Box<dyn Renderable>],
        snapshot: &FrameSnapshot,
    ) -> Vec<TaskOutcome> {
        let expected = objects.len();
        let (sender, receiver) = crossbeam_channel::bounded::<TaskOutcome>(self.queue_capacity);
        let busy_time = &self.busy_time;

        // Runs on the calling thread so the drain below never occupies a worker.
        pool.in_place_scope(|scope| {
            for (index, object) in objects.iter().enumerate() {
                let sender = sender.clone();
                scope.spawn(move |_| {
                    let started = Instant::now();
                    let outcome = build_record(index, object.as_ref(), snapshot);
                    *busy_time.lock() += started.elapsed();
                    if sender.send((index, outcome)).is_err() {
                        warn!("result queue closed before task {index} reported");
                    }
                });
            }
            drop(sender);

            let mut outcomes = Vec::with_capacity(expected);
            while outcomes.len() < expected {
                match receiver.recv() {
                    Ok(outcome) => outcomes.push(outcome),
                    // Every sender is gone: a task panicked and the scope will rethrow.
                    Err(_) => break,
                }
            }
            outcomes
        })
    }
}

#[cfg(feature = "parallel")]
fn build_pool(threads: usize) -> Option<rayon::ThreadPool> {
    let mut builder =
        rayon::ThreadPoolBuilder::new().thread_name(|index| format!("prism-transform-{index}"));
    if threads > 0 {
        builder = builder.num_threads(threads);
    }
    match builder.build() {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!("worker pool unavailable, transforms run inline: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::camera::Camera;
    use crate::core::cube::Cube;
    use crate::core::types::{Material, Transform};
    use crate::device::{BuiltinShaderProvider, RecordingDevice};
    use glam::Vec3;

    fn scene(count: usize, with_raw: bool) -> Vec<Box<dyn Renderable>> {
        let mut device = RecordingDevice::new();
        let mut shaders = BuiltinShaderProvider::new();
        let mut objects: Vec<Box<dyn Renderable>> = Vec::new();
        for i in 0..count {
            let mut cube = Cube::new(format!("cube-{i}"));
            cube.setup(
                &mut device,
                &mut shaders,
                Material::default(),
                Transform::from_position(Vec3::new(i as f32, 0.0, -3.0)),
            )
            .unwrap();
            objects.push(Box::new(cube));
        }
        if with_raw {
            objects.push(Box::new(Cube::new("raw")));
        }
        objects
    }

    fn snapshot() -> FrameSnapshot {
        FrameSnapshot::new(&Camera::default(), &RenderSettings::default())
    }

    #[test]
    fn empty_frame_is_a_no_op() {
        let pipeline = TransformPipeline::new(&RenderSettings::default());
        let frame = pipeline.run(&mut [], &snapshot());
        assert_eq!(frame.dispatched, 0);
        assert_eq!(frame.collected(), 0);
    }

    #[test]
    fn collects_one_result_per_task_beyond_queue_capacity() {
        let settings = RenderSettings {
            queue_capacity: 2,
            worker_threads: 3,
            ..RenderSettings::default()
        };
        let pipeline = TransformPipeline::new(&settings);
        let mut objects = scene(25, true);
        let frame = pipeline.run(&mut objects, &snapshot());
        assert_eq!(frame.dispatched, 26);
        assert_eq!(frame.collected(), 26);
        assert_eq!(frame.failures.len(), 1);
        assert_eq!(frame.failures[0].name, "raw");
        let sources: Vec<usize> = frame.records.iter().map(|r| r.source).collect();
        assert_eq!(sources, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn sequential_and_parallel_agree() {
        let mut sequential = TransformPipeline::new(&RenderSettings::default());
        sequential.set_parallel_enabled(false);
        let parallel = TransformPipeline::new(&RenderSettings::default());

        let mut a = scene(12, false);
        let mut b = scene(12, false);
        let left = sequential.run(&mut a, &snapshot());
        let right = parallel.run(&mut b, &snapshot());
        assert_eq!(left.records, right.records);
    }
}
