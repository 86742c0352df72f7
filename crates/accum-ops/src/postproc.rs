//! Host-side driver for the filter, mean and pack stages.
//!
//! [`Postproc`] owns every buffer the pipeline needs for one image size:
//!
//! ```text
//! pass buffer ──filter──► scratch ──mean──► running mean ──pack──► image
//!  (caller)                (pass)            (n passes)          (u8 RGB)
//! ```
//!
//! The running mean keeps its pass count across calls, so a renderer can
//! feed passes as they arrive and present an image at any point.
//!
//! # Configuration
//!
//! ```rust
//! use accum_core::{ColorBuffer, Pos, Size};
//! use accum_ops::dispatch::Launch;
//! use accum_ops::filter::IdentityFilter;
//! use accum_ops::postproc::Postproc;
//!
//! let size = Size::new(2, 1);
//! let mut post = Postproc::<IdentityFilter>::builder()
//!     .launch(Launch::Serial)
//!     .build(size, ())?;
//!
//! let a = ColorBuffer::from_data(size, vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0], 1)?;
//! let b = ColorBuffer::from_data(size, vec![1.0, 1.0, 1.0, 0.0, 0.0, 0.0], 1)?;
//! post.process([&a, &b])?;
//! post.make_image()?;
//!
//! assert_eq!(post.passes(), 2);
//! assert_eq!(post.image().pixel(Pos::new(0, 0)), [127, 127, 127]);
//! # Ok::<(), accum_ops::OpsError>(())
//! ```
//!
//! Settings can also come from YAML:
//!
//! ```rust
//! use accum_ops::postproc::PostprocConfig;
//! use accum_ops::dispatch::Launch;
//!
//! let cfg = PostprocConfig::from_yaml("launch: serial\n")?;
//! assert_eq!(cfg.launch, Launch::Serial);
//! assert_eq!(cfg.threads, None);
//! # Ok::<(), accum_ops::OpsError>(())
//! ```

use std::marker::PhantomData;

use accum_core::{ColorBuffer, PackedImage, Size};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::dispatch::Launch;
use crate::error::{OpsError, OpsResult, ensure_same_size};
use crate::filter::{self, Filter};
use crate::{mean, pack};

// ============================================================================
// Configuration
// ============================================================================

/// Post-processing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostprocConfig {
    /// Scheduling of each stage sweep.
    pub launch: Launch,
    /// Size of a dedicated worker pool (None = rayon's global pool).
    /// Ignored for serial launches.
    pub threads: Option<usize>,
}

impl PostprocConfig {
    /// Parses a configuration from YAML. Missing keys take their defaults.
    pub fn from_yaml(text: &str) -> OpsResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml(&self) -> OpsResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Worker threads backing parallel launches.
struct Workers {
    #[cfg(feature = "parallel")]
    pool: Option<rayon::ThreadPool>,
}

impl Workers {
    fn new(config: &PostprocConfig) -> OpsResult<Self> {
        if config.threads == Some(0) {
            return Err(OpsError::InvalidParameter("threads must be > 0".into()));
        }
        Ok(Self {
            #[cfg(feature = "parallel")]
            pool: Self::pool(config)?,
        })
    }

    #[cfg(feature = "parallel")]
    fn pool(config: &PostprocConfig) -> OpsResult<Option<rayon::ThreadPool>> {
        match config.threads {
            Some(n) if config.launch.is_parallel() => rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .thread_name(|i| format!("accum-worker-{i}"))
                .build()
                .map(Some)
                .map_err(|e| OpsError::ThreadPool(e.to_string())),
            _ => Ok(None),
        }
    }

    /// Runs `op` inside the dedicated pool, if there is one.
    fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        #[cfg(feature = "parallel")]
        if let Some(pool) = &self.pool {
            return pool.install(op);
        }
        op()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Postproc`].
#[derive(Debug, Clone)]
pub struct PostprocBuilder<F: Filter> {
    config: PostprocConfig,
    _filter: PhantomData<F>,
}

impl<F: Filter> Default for PostprocBuilder<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Filter> PostprocBuilder<F> {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            config: PostprocConfig::default(),
            _filter: PhantomData,
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: PostprocConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the launch mode.
    pub fn launch(mut self, launch: Launch) -> Self {
        self.config.launch = launch;
        self
    }

    /// Uses a dedicated pool of `n` worker threads.
    pub fn threads(mut self, n: usize) -> Self {
        self.config.threads = Some(n);
        self
    }

    /// Allocates buffers for `size` and binds the filter parameters.
    pub fn build(self, size: Size, params: F::Params) -> OpsResult<Postproc<F>> {
        Postproc::new(size, params, self.config)
    }
}

// ============================================================================
// Postproc
// ============================================================================

/// Progressive filtering, accumulation and packing for one image size.
pub struct Postproc<F: Filter> {
    config: PostprocConfig,
    workers: Workers,
    size: Size,
    scratch: ColorBuffer,
    mean: ColorBuffer,
    image: PackedImage,
    /// Filter parameters applied to every pass accumulated from now on.
    pub params: F::Params,
}

impl<F: Filter> Postproc<F> {
    /// Returns a builder.
    pub fn builder() -> PostprocBuilder<F> {
        PostprocBuilder::new()
    }

    /// Creates a post-processor with all buffers black and zero passes.
    ///
    /// # Errors
    ///
    /// Fails if the buffer length for `size` overflows or the worker pool
    /// cannot be created.
    pub fn new(size: Size, params: F::Params, config: PostprocConfig) -> OpsResult<Self> {
        size.checked_len()?;
        let workers = Workers::new(&config)?;
        debug!(%size, filter = F::NAME, launch = ?config.launch, threads = ?config.threads, "postproc created");
        Ok(Self {
            config,
            workers,
            size,
            scratch: ColorBuffer::new(size),
            mean: ColorBuffer::new(size),
            image: PackedImage::new(size),
            params,
        })
    }

    /// Reallocates every buffer for `size`. Accumulated passes are dropped.
    pub fn resize(&mut self, size: Size) -> OpsResult<()> {
        self.scratch.resize(size)?;
        self.mean.resize(size)?;
        self.image.resize(size)?;
        self.size = size;
        debug!(%size, "postproc resized");
        Ok(())
    }

    /// Drops the accumulated history.
    pub fn reset(&mut self) {
        self.mean.clear();
        debug!("postproc reset");
    }

    /// Filters one pass buffer and merges the result into the running mean.
    ///
    /// A buffer with zero passes holds no data and is skipped.
    ///
    /// # Errors
    ///
    /// Returns [`OpsError::SizeMismatch`] if `pass` has a different size, or
    /// [`OpsError::InvalidParameter`] if the filter rejects
    /// [`params`](Self::params). The running mean is untouched on error.
    pub fn accumulate(&mut self, pass: &ColorBuffer) -> OpsResult<()> {
        ensure_same_size(self.size, pass.size())?;
        if !pass.is_valid() {
            warn!(size = %pass.size(), "skipping pass buffer with zero passes");
            return Ok(());
        }
        let launch = self.config.launch;
        let (scratch, mean_buf, params) = (&mut self.scratch, &mut self.mean, &self.params);
        self.workers.install(|| -> OpsResult<()> {
            filter::filter::<F>(launch, &mut scratch.view_mut(), &pass.view(), params)?;
            scratch.set_passes(pass.passes());
            mean::accumulate(launch, mean_buf, scratch)
        })?;
        trace!(added = pass.passes(), total = self.mean.passes(), "accumulated");
        Ok(())
    }

    /// Filters and accumulates every buffer of `passes`, in order.
    pub fn process<'a, I>(&mut self, passes: I) -> OpsResult<()>
    where
        I: IntoIterator<Item = &'a ColorBuffer>,
    {
        let mut merged = 0usize;
        for pass in passes {
            self.accumulate(pass)?;
            merged += 1;
        }
        debug!(buffers = merged, passes = self.mean.passes(), "processed");
        Ok(())
    }

    /// Filters and accumulates a single buffer.
    pub fn process_one(&mut self, pass: &ColorBuffer) -> OpsResult<()> {
        self.accumulate(pass)
    }

    /// Packs the running mean into the 8-bit image.
    pub fn make_image(&mut self) -> OpsResult<()> {
        let launch = self.config.launch;
        let (src, image) = (&self.mean, &mut self.image);
        self.workers
            .install(|| pack::pack(launch, &mut image.view_mut(), &src.view()))
    }

    /// Number of passes in the running mean.
    pub fn passes(&self) -> u32 {
        self.mean.passes()
    }

    /// Current image size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Running mean of all filtered passes, the input of
    /// [`make_image`](Self::make_image).
    pub fn buffer(&self) -> &ColorBuffer {
        &self.mean
    }

    /// Last packed image.
    pub fn image(&self) -> &PackedImage {
        &self.image
    }

    /// Active configuration.
    pub fn config(&self) -> &PostprocConfig {
        &self.config
    }
}
