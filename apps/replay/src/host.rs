use veil_overlay::{
    DisplayMetrics, InMemorySurfaceHost, OverlayError, OverlaySurfaceSpec, SurfaceHandle,
    SurfaceHost,
};

/// Surface host that logs every call and keeps the live set in memory.
#[derive(Clone)]
pub struct TracingSurfaceHost {
    inner: InMemorySurfaceHost,
}

impl TracingSurfaceHost {
    pub fn new(display: DisplayMetrics) -> Self {
        Self {
            inner: InMemorySurfaceHost::new(display),
        }
    }

    pub fn live(&self) -> Vec<OverlaySurfaceSpec> {
        self.inner.live()
    }
}

impl SurfaceHost for TracingSurfaceHost {
    fn display(&self) -> DisplayMetrics {
        self.inner.display()
    }

    fn create(&mut self, spec: &OverlaySurfaceSpec) -> Result<SurfaceHandle, OverlayError> {
        let handle = self.inner.create(spec)?;
        tracing::info!(kind = %spec.kind, geometry = %spec.geometry, %handle, "show surface");
        Ok(handle)
    }

    fn remove(&mut self, handle: SurfaceHandle) -> Result<(), OverlayError> {
        self.inner.remove(handle)?;
        tracing::info!(%handle, "hide surface");
        Ok(())
    }
}
