//! Environment bake: sky state to filtered IBL map.
//!
//! The baker owns at most one live bake. A new bake always disposes the
//! previous map before the render target for the next one is allocated.
//! Bakes happen on setup and on sun/sky edits, never inside the frame loop.

use anyhow::Result;

use crate::sky::{Sh9Irradiance, SkyEnvironment};

/// Render-target capability the baker needs from the renderer.
pub trait BakeBackend {
    /// Filtered environment map handle
    type Map;

    /// Render `sky` into a fresh offscreen target and filter it.
    fn render_to_target(&mut self, sky: &SkyEnvironment) -> Result<Self::Map>;

    /// Release a map produced by `render_to_target`.
    fn dispose(&mut self, map: Self::Map);
}

/// One baked environment: filtered radiance map plus diffuse SH.
#[derive(Debug)]
pub struct EnvironmentBake<M> {
    pub map: M,
    pub irradiance: Sh9Irradiance,
    /// Increments with every successful bake
    pub generation: u64,
}

/// Owns the backend and the single live bake.
pub struct EnvironmentBaker<B: BakeBackend> {
    backend: B,
    current: Option<EnvironmentBake<B::Map>>,
    generation: u64,
}

impl<B: BakeBackend> EnvironmentBaker<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            generation: 0,
        }
    }

    /// Re-bake for a new sky state.
    ///
    /// On failure no bake is live and the error goes to the caller; the
    /// scene cannot continue without ambient lighting, so nothing retries.
    pub fn bake(&mut self, sky: &SkyEnvironment) -> Result<&EnvironmentBake<B::Map>> {
        if let Some(previous) = self.current.take() {
            self.backend.dispose(previous.map);
        }

        let map = self.backend.render_to_target(sky)?;
        let irradiance = Sh9Irradiance::project(sky);
        self.generation += 1;
        log::info!(
            "Environment baked (generation {}, sun {:.3?})",
            self.generation,
            sky.sun_direction
        );

        Ok(self.current.insert(EnvironmentBake {
            map,
            irradiance,
            generation: self.generation,
        }))
    }

    /// The live bake, if any
    pub fn current(&self) -> Option<&EnvironmentBake<B::Map>> {
        self.current.as_ref()
    }

    /// Number of bakes holding render-target resources (0 or 1)
    pub fn live_bakes(&self) -> usize {
        usize::from(self.current.is_some())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Dispose the live bake, if any
    pub fn release(&mut self) {
        if let Some(previous) = self.current.take() {
            self.backend.dispose(previous.map);
        }
    }
}

impl<B: BakeBackend> Drop for EnvironmentBaker<B> {
    fn drop(&mut self) {
        self.release();
    }
}
